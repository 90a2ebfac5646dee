// src/conversion/material.rs

//! Materials, their LCA processes and stored unit conversions

use super::matrix::ConversionMatrix;
use crate::error::{Error, Result};
use crate::store::AssemblyStore;
use crate::units::{LifeCyclePhase, Unit};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A stored factor between two units of one material
///
/// One `in_unit` equals `factor` `out_unit`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    /// `None` for placeholders that were never stored
    pub id: Option<i64>,
    pub material_id: i64,
    pub in_unit: Unit,
    pub out_unit: Unit,
    pub factor: Option<f64>,
    pub ident: Option<String>,
    pub flow_reference: Option<String>,
}

impl Conversion {
    pub fn new(material_id: i64, in_unit: Unit, out_unit: Unit, factor: f64) -> Self {
        Self {
            id: None,
            material_id,
            in_unit,
            out_unit,
            factor: Some(factor),
            ident: None,
            flow_reference: None,
        }
    }

    /// A required conversion without a known factor
    pub fn placeholder(material_id: i64, in_unit: Unit, out_unit: Unit) -> Self {
        Self {
            factor: None,
            ..Self::new(material_id, in_unit, out_unit, 0.0)
        }
    }

    /// Builder: set the ident
    pub fn with_ident(mut self, ident: impl Into<String>) -> Self {
        self.ident = Some(ident.into());
        self
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_none() && self.factor.is_none()
    }

    pub fn is_identity(&self) -> bool {
        self.in_unit == self.out_unit
    }

    /// A factor that can be used in both directions
    pub fn usable_factor(&self) -> Option<f64> {
        self.factor.filter(|f| *f != 0.0 && f.is_finite())
    }

    /// Whether this conversion connects the two units in either direction
    pub fn connects(&self, a: &Unit, b: &Unit) -> bool {
        (self.in_unit == *a && self.out_unit == *b) || (self.in_unit == *b && self.out_unit == *a)
    }
}

/// An LCA process attached to a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LcaProcess {
    pub id: Option<i64>,
    pub material_id: i64,
    pub name: String,
    pub ref_unit: Unit,
    pub phase: LifeCyclePhase,
}

impl LcaProcess {
    pub fn new(
        material_id: i64,
        name: impl Into<String>,
        ref_unit: Unit,
        phase: LifeCyclePhase,
    ) -> Self {
        Self {
            id: None,
            material_id,
            name: name.into(),
            ref_unit,
            phase,
        }
    }
}

/// A material (process configuration) components refer to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: Option<i64>,
    pub name: String,
    #[serde(skip)]
    conversion_matrix: Option<ConversionMatrix>,
}

impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name
    }
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            conversion_matrix: None,
        }
    }

    pub(crate) fn with_id(id: i64, name: String) -> Self {
        Self {
            id: Some(id),
            name,
            conversion_matrix: None,
        }
    }

    pub fn require_id(&self) -> Result<i64> {
        self.id
            .ok_or_else(|| Error::InitError(format!("Material '{}' has no ID", self.name)))
    }

    /// Bidirectional factor lookup over this material's stored conversions
    ///
    /// Built on first use and kept on this instance; `force` rebuilds it.
    pub fn conversion_matrix(
        &mut self,
        store: &dyn AssemblyStore,
        force: bool,
    ) -> Result<&ConversionMatrix> {
        let matrix = match self.conversion_matrix.take() {
            Some(matrix) if !force => matrix,
            _ => {
                let id = self.require_id()?;
                let conversions = store.find_conversions(id)?;
                debug!(
                    "Building conversion matrix for material {} from {} conversions",
                    id,
                    conversions.len()
                );
                ConversionMatrix::from_conversions(&conversions)
            }
        };

        Ok(self.conversion_matrix.insert(matrix))
    }
}

/// Load a material or fail with `NotFoundError`
pub fn load_material(store: &dyn AssemblyStore, id: i64) -> Result<Material> {
    store
        .find_material(id)?
        .ok_or_else(|| Error::not_found("material", id))
}
