// src/copy/mod.rs

//! Deep copy engine for elements and components

mod component;
mod element;
mod naming;

pub use component::ComponentCopyOptions;
pub use element::{CompositeTarget, CopyOptions, ElementCopier};
pub use naming::{DEFAULT_COPY_LABEL, unique_copy_name};
