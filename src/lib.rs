// src/lib.rs

//! Material assembly model for building life cycle assessment
//!
//! Building elements (walls, roofs, floors) are either composites made of
//! other elements or leaves made of material components, optionally as
//! layers in a stack. This crate keeps that tree consistent, copies it
//! deeply and audits which unit conversions a material needs.
//!
//! # Architecture
//!
//! - `assembly`: elements, components, sibling layers, composite membership
//! - `copy`: transactional deep copy of elements and components
//! - `conversion`: required conversion resolution and factor lookup
//! - `store`: the persistence seam; `db` implements it over SQLite

pub mod assembly;
pub mod cache;
pub mod config;
pub mod conversion;
pub mod copy;
pub mod db;
mod error;
pub mod store;
pub mod units;

pub use assembly::{
    Component, CompositeAssignment, Element, ElementType, Layer, SiblingPair, create_sibling,
    has_extants, is_extant, reindex_composite_assignments, reindex_layers, set_all_extant,
    surface_area,
};
pub use config::Config;
pub use conversion::{
    Conversion, ConversionMatrix, ConversionResolution, LcaProcess, Material,
    resolve_required_conversions,
};
pub use copy::{ComponentCopyOptions, CompositeTarget, CopyOptions, ElementCopier};
pub use db::SqliteStore;
pub use error::{Error, Result};
pub use store::{AssemblyStore, Clock, Context, EntityKind, FixedClock, IdAllocator, SystemClock};
pub use units::{LifeCyclePhase, Unit};
