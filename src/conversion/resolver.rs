// src/conversion/resolver.rs

//! Required conversion resolution
//!
//! Every LCA process of a material expects quantities in its own reference
//! unit. To carry a component's quantity through all of them, each pair of
//! distinct reference units needs a conversion in one direction or the
//! other. This module matches the stored conversions against those pairs.

use super::material::{Conversion, LcaProcess, Material};
use crate::error::Result;
use crate::store::AssemblyStore;
use crate::units::{LifeCyclePhase, Unit};
use serde::Serialize;
use tracing::debug;

/// Outcome of matching a material's conversions against its required units
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionResolution {
    /// Stored conversions satisfying a required pair, directly or inverted
    pub required: Vec<Conversion>,
    /// Placeholders for required pairs without a stored conversion
    pub missing: Vec<Conversion>,
    /// Stored conversions no required pair asked for
    pub additional: Vec<Conversion>,
}

impl ConversionResolution {
    /// Required conversions followed by the placeholders for missing ones
    pub fn required_with_missing(&self) -> impl Iterator<Item = &Conversion> {
        self.required.iter().chain(self.missing.iter())
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Reference units of all processes, in process order, without duplicates
///
/// Processes of the operation phase only count when `include_operation` is set.
pub fn required_units(processes: &[LcaProcess], include_operation: bool) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();

    for process in processes {
        if !include_operation && process.phase == LifeCyclePhase::Operation {
            continue;
        }
        if !units.contains(&process.ref_unit) {
            units.push(process.ref_unit.clone());
        }
    }

    units
}

/// Match `conversions` against every unordered pair of `required_units`
pub fn resolve(
    material_id: i64,
    required_units: &[Unit],
    conversions: &[Conversion],
) -> ConversionResolution {
    if required_units.len() < 2 {
        return ConversionResolution::default();
    }

    // Each unordered pair once; self pairs never
    let mut pending: Vec<(Unit, Unit)> = Vec::new();
    for (i, in_unit) in required_units.iter().enumerate() {
        for out_unit in &required_units[i + 1..] {
            if in_unit != out_unit {
                pending.push((in_unit.clone(), out_unit.clone()));
            }
        }
    }

    let mut ordered: Vec<&Conversion> = conversions.iter().collect();
    ordered.sort_by(|a, b| {
        (a.ident.is_none(), &a.ident, a.id).cmp(&(b.ident.is_none(), &b.ident, b.id))
    });

    let mut resolution = ConversionResolution::default();
    for conversion in ordered {
        let direct = pending
            .iter()
            .position(|(i, o)| *i == conversion.in_unit && *o == conversion.out_unit);
        let slot = direct.or_else(|| {
            pending
                .iter()
                .position(|(i, o)| *i == conversion.out_unit && *o == conversion.in_unit)
        });

        match slot {
            Some(idx) => {
                pending.remove(idx);
                resolution.required.push(conversion.clone());
            }
            None => resolution.additional.push(conversion.clone()),
        }
    }

    resolution.missing = pending
        .into_iter()
        .map(|(in_unit, out_unit)| Conversion::placeholder(material_id, in_unit, out_unit))
        .collect();

    resolution
}

/// Resolve the required conversions of a stored material
pub fn resolve_required_conversions(
    store: &dyn AssemblyStore,
    material: &Material,
    include_operation: bool,
) -> Result<ConversionResolution> {
    let material_id = material.require_id()?;
    let processes = store.find_processes(material_id)?;
    let units = required_units(&processes, include_operation);
    let conversions = store.find_conversions(material_id)?;

    let resolution = resolve(material_id, &units, &conversions);
    debug!(
        "Material {}: {} required units, {} required, {} missing, {} additional conversions",
        material_id,
        units.len(),
        resolution.required.len(),
        resolution.missing.len(),
        resolution.additional.len()
    );

    Ok(resolution)
}
