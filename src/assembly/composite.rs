// src/assembly/composite.rs

//! Composite assignments - ordered membership of elements in a composite

use serde::{Deserialize, Serialize};

/// Membership of a sub-element inside a composite element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeAssignment {
    pub composite_element_id: i64,
    pub element_id: i64,
    /// 1-based, dense within the composite
    pub position: i32,
}

impl CompositeAssignment {
    pub fn new(composite_element_id: i64, element_id: i64, position: i32) -> Self {
        Self {
            composite_element_id,
            element_id,
            position,
        }
    }
}
