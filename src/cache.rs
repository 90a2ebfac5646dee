// src/cache.rs

//! Cached computation results
//!
//! Indicator computation itself happens elsewhere; this crate only needs
//! the cached rows so that a deep copy can carry them over to the copy.

use crate::units::Unit;
use serde::{Deserialize, Serialize};

/// Cached totals of an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheElement {
    pub item_id: i64,
    pub element_id: i64,
    /// Cache item of the composite element this element's results roll up into
    pub composite_item_id: Option<i64>,
    pub mass: Option<f64>,
    pub quantity: Option<f64>,
    pub ref_unit: Option<Unit>,
}

/// Cached totals of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheComponent {
    pub item_id: i64,
    pub component_id: i64,
    pub mass: Option<f64>,
    pub quantity: Option<f64>,
    pub ref_unit: Option<Unit>,
    pub num_replacements: Option<i32>,
}

/// One indicator value of a cache item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheIndicator {
    pub item_id: i64,
    pub indicator_id: i64,
    pub life_cycle_ident: String,
    pub value: f64,
}
