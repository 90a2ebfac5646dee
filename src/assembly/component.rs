// src/assembly/component.rs

//! Component model - material usages inside a leaf element
//!
//! A component references a material (and the conversion used to express
//! its quantity). Layer components additionally carry geometry and a slot
//! position; two layer components may share one slot as siblings, each
//! covering a fraction of the slot's area.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Layer geometry of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub position: Option<i32>,
    /// Thickness in m
    pub size: Option<f64>,
    pub length: f64,
    pub width: f64,
    /// Fraction of the slot's area covered by this component
    pub area_ratio: f64,
    pub(crate) sibling_id: Option<i64>,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            position: None,
            size: None,
            length: 1.0,
            width: 1.0,
            area_ratio: 1.0,
            sibling_id: None,
        }
    }
}

impl Layer {
    pub fn new(size: f64) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    /// Builder: fix the slot position
    pub fn at_position(mut self, position: i32) -> Self {
        self.position = Some(position);
        self
    }

    /// Builder: set length and width
    pub fn with_dimensions(mut self, length: f64, width: f64) -> Self {
        self.length = length;
        self.width = width;
        self
    }

    pub fn sibling_id(&self) -> Option<i64> {
        self.sibling_id
    }

    pub fn surface(&self) -> f64 {
        self.length * self.width
    }

    pub fn area(&self) -> f64 {
        self.length * self.width * self.area_ratio
    }
}

/// A material usage within a non-composite element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: Option<i64>,
    pub element_id: i64,
    pub material_id: i64,
    pub conversion_id: i64,
    pub quantity: f64,
    pub life_time: i32,
    /// Delay before the first replacement, for extant components
    pub life_time_delay: i32,
    pub life_time_info: Option<String>,
    pub calc_lca: bool,
    pub is_extant: bool,
    pub layer: Option<Layer>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

impl Component {
    /// Create a new non-layer component
    pub fn new(element_id: i64, material_id: i64, conversion_id: i64, life_time: i32) -> Self {
        Self {
            id: None,
            element_id,
            material_id,
            conversion_id,
            quantity: 1.0,
            life_time,
            life_time_delay: 0,
            life_time_info: None,
            calc_lca: true,
            is_extant: false,
            layer: None,
            created: None,
            modified: None,
        }
    }

    /// Create a new layer component
    pub fn new_layer(
        element_id: i64,
        material_id: i64,
        conversion_id: i64,
        life_time: i32,
        layer: Layer,
    ) -> Self {
        Self {
            layer: Some(layer),
            ..Self::new(element_id, material_id, conversion_id, life_time)
        }
    }

    /// Builder: set the quantity
    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Builder: mark as extant
    pub fn extant(mut self, life_time_delay: i32) -> Self {
        self.is_extant = true;
        self.life_time_delay = life_time_delay;
        self
    }

    pub fn is_layer(&self) -> bool {
        self.layer.is_some()
    }

    pub fn layer_position(&self) -> Option<i32> {
        self.layer.as_ref().and_then(|l| l.position)
    }

    pub fn layer_area_ratio(&self) -> Option<f64> {
        self.layer.as_ref().map(|l| l.area_ratio)
    }

    pub fn sibling_id(&self) -> Option<i64> {
        self.layer.as_ref().and_then(|l| l.sibling_id)
    }

    pub fn has_sibling(&self) -> bool {
        self.sibling_id().is_some()
    }

    /// `length × width × area_ratio`; `None` for non-layer components
    pub fn layer_area(&self) -> Option<f64> {
        self.layer.as_ref().map(Layer::area)
    }

    pub fn require_id(&self) -> Result<i64> {
        self.id
            .ok_or_else(|| Error::InitError("Component has no ID".to_string()))
    }

    pub(crate) fn set_sibling(&mut self, sibling_id: Option<i64>) {
        if let Some(layer) = self.layer.as_mut() {
            layer.sibling_id = sibling_id;
        }
    }

    pub(crate) fn set_area_ratio(&mut self, ratio: f64) {
        if let Some(layer) = self.layer.as_mut() {
            layer.area_ratio = ratio;
        }
    }

    pub(crate) fn set_layer_position(&mut self, position: i32) {
        if let Some(layer) = self.layer.as_mut() {
            layer.position = Some(position);
        }
    }
}

/// Two layer components sharing one slot
///
/// `first` is the component with the lower id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SiblingPair {
    pub first: i64,
    pub second: i64,
}

impl SiblingPair {
    pub fn new(a: i64, b: i64) -> Self {
        Self {
            first: a.min(b),
            second: a.max(b),
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.first == id || self.second == id
    }

    pub fn partner_of(&self, id: i64) -> Option<i64> {
        if id == self.first {
            Some(self.second)
        } else if id == self.second {
            Some(self.first)
        } else {
            None
        }
    }

    /// Collect the sibling pairs of one element's components
    ///
    /// Fails if a sibling link is not mirrored by its partner.
    pub fn resolve(components: &[Component]) -> Result<Vec<SiblingPair>> {
        let links: HashMap<i64, Option<i64>> = components
            .iter()
            .filter_map(|c| c.id.map(|id| (id, c.sibling_id())))
            .collect();

        let mut pairs = Vec::new();
        for component in components {
            let (Some(id), Some(sibling_id)) = (component.id, component.sibling_id()) else {
                continue;
            };

            if links.get(&sibling_id).copied().flatten() != Some(id) {
                return Err(Error::AsymmetricSibling {
                    component_id: id,
                    sibling_id,
                });
            }

            let pair = SiblingPair::new(id, sibling_id);
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }

        Ok(pairs)
    }
}
