// src/assembly/reindex.rs

//! Dense renumbering of layer positions and composite member positions

use super::component::Component;
use super::element::Element;
use crate::error::Result;
use crate::store::Context;
use std::collections::HashMap;
use tracing::debug;

/// Renumber the layers of a leaf element to 1..N
///
/// Layers keep their relative order. Both layers of a sibling pair share
/// one position: the first of the pair encountered claims the next slot and
/// its partner takes the same one. Returns the number of rows rewritten;
/// running it twice rewrites nothing the second time.
pub fn reindex_layers(ctx: &Context<'_>, element: &Element) -> Result<usize> {
    if element.is_composite() {
        return Ok(0);
    }
    let element_id = element.require_id()?;

    let mut layers: Vec<Component> = ctx
        .store
        .find_components(element_id)?
        .into_iter()
        .filter(Component::is_layer)
        .collect();
    layers.sort_by_key(|c| (c.layer_position().unwrap_or(i32::MAX), c.id));

    ctx.transaction(|| {
        let mut reserved: HashMap<i64, i32> = HashMap::new();
        let mut next = 1;
        let mut changed = 0;

        for mut layer in layers {
            let id = layer.require_id()?;
            let position = match reserved.remove(&id) {
                Some(position) => position,
                None => {
                    let position = next;
                    next += 1;
                    if let Some(sibling_id) = layer.sibling_id() {
                        reserved.insert(sibling_id, position);
                    }
                    position
                }
            };

            if layer.layer_position() != Some(position) {
                layer.set_layer_position(position);
                layer.modified = Some(ctx.timestamp());
                ctx.store.update_component(&layer)?;
                changed += 1;
            }
        }

        debug!("Reindexed layers of element {}: {} changed", element_id, changed);
        Ok(changed)
    })
}

/// Renumber the members of a composite element to 1..N in current order
pub fn reindex_composite_assignments(ctx: &Context<'_>, composite: &Element) -> Result<usize> {
    if !composite.is_composite() {
        return Ok(0);
    }
    let composite_id = composite.require_id()?;
    let assignments = ctx.store.find_assignments(composite_id)?;

    ctx.transaction(|| {
        let mut changed = 0;
        for (index, mut assignment) in assignments.into_iter().enumerate() {
            let position = index as i32 + 1;
            if assignment.position != position {
                assignment.position = position;
                ctx.store.update_assignment(&assignment)?;
                changed += 1;
            }
        }

        debug!(
            "Reindexed members of composite {}: {} changed",
            composite_id, changed
        );
        Ok(changed)
    })
}
