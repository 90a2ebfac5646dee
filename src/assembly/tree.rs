// src/assembly/tree.rs

//! Structural operations on the assembly tree
//!
//! These keep the element/component/assignment rows consistent with each
//! other: components only in leaf elements, sibling links always mirrored,
//! composite members in a dense order.

use super::component::{Component, SiblingPair};
use super::composite::CompositeAssignment;
use super::element::{Element, ElementType};
use super::reindex::{reindex_composite_assignments, reindex_layers};
use crate::error::{Error, Result};
use crate::store::{AssemblyStore, Context, EntityKind};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// Load an element or fail with `NotFoundError`
pub fn load_element(store: &dyn AssemblyStore, id: i64) -> Result<Element> {
    store
        .find_element(id)?
        .ok_or_else(|| Error::not_found("element", id))
}

/// Load a component or fail with `NotFoundError`
pub fn load_component(store: &dyn AssemblyStore, id: i64) -> Result<Component> {
    store
        .find_component(id)?
        .ok_or_else(|| Error::not_found("component", id))
}

/// The type node of an element
pub fn element_type_of(store: &dyn AssemblyStore, element: &Element) -> Result<ElementType> {
    store
        .find_element_type(element.element_type_node_id)?
        .ok_or_else(|| Error::not_found("element type", element.element_type_node_id))
}

/// Persist a new element, assigning id, uuid and creation time
pub fn insert_element(ctx: &Context<'_>, element: &mut Element) -> Result<i64> {
    element.validate()?;

    let id = ctx.next_id(EntityKind::Element)?;
    let mut row = element.clone();
    row.id = Some(id);
    if row.uuid.is_none() {
        row.uuid = Some(Uuid::new_v4().to_string());
    }
    row.created = Some(ctx.timestamp());
    row.modified = None;

    ctx.store.insert_element(&row)?;
    debug!("Inserted element {} '{}'", id, row.name);

    *element = row;
    Ok(id)
}

/// Append a component to a leaf element
///
/// A layer without a position is placed behind the last layer.
pub fn add_component(
    ctx: &Context<'_>,
    element: &Element,
    component: &mut Component,
) -> Result<i64> {
    let element_id = element.require_id()?;
    if element.is_composite() {
        return Err(Error::CompositeCannotHoldComponents(element_id));
    }
    if !component.quantity.is_finite() {
        return Err(Error::validation("quantity", "must be a finite number"));
    }

    let mut row = component.clone();
    row.element_id = element_id;

    if row.is_layer() && row.layer_position().is_none() {
        let max = ctx
            .store
            .find_components(element_id)?
            .iter()
            .filter_map(Component::layer_position)
            .max()
            .unwrap_or(0);
        row.set_layer_position(max + 1);
    }

    let id = ctx.next_id(EntityKind::Component)?;
    row.id = Some(id);
    row.created = Some(ctx.timestamp());
    row.modified = None;
    ctx.store.insert_component(&row)?;

    *component = row;
    Ok(id)
}

/// Split a layer's slot with a new sibling component
///
/// The twin copies every field of `component`; both end up covering half
/// of the slot and point at each other. On success `component` reflects the
/// updated row and the new sibling is returned.
pub fn create_sibling(ctx: &Context<'_>, component: &mut Component) -> Result<Component> {
    let id = component.require_id()?;
    let current = load_component(ctx.store, id)?;

    if !current.is_layer() {
        return Err(Error::NotALayer(id));
    }
    if current.has_sibling() {
        return Err(Error::AlreadyHasSibling(id));
    }

    let (original, sibling) = ctx.transaction(|| {
        let now = ctx.timestamp();

        let mut sibling = current.clone();
        sibling.id = Some(ctx.next_id(EntityKind::Component)?);
        sibling.set_sibling(Some(id));
        sibling.set_area_ratio(0.5);
        sibling.created = Some(now.clone());
        sibling.modified = None;
        ctx.store.insert_component(&sibling)?;

        let mut original = current.clone();
        original.set_sibling(sibling.id);
        original.set_area_ratio(0.5);
        original.modified = Some(now);
        ctx.store.update_component(&original)?;

        Ok((original, sibling))
    })?;

    info!(
        "Created sibling {} for component {}",
        sibling.id.unwrap_or_default(),
        id
    );
    *component = original;
    Ok(sibling)
}

/// Cross-link two layer components of the same element as siblings
pub fn link_siblings(
    ctx: &Context<'_>,
    a: &mut Component,
    b: &mut Component,
) -> Result<SiblingPair> {
    let a_id = a.require_id()?;
    let b_id = b.require_id()?;

    for (c, id, other) in [(&*a, a_id, b_id), (&*b, b_id, a_id)] {
        if !c.is_layer() {
            return Err(Error::NotALayer(id));
        }
        if c.sibling_id().is_some_and(|s| s != other) {
            return Err(Error::AlreadyHasSibling(id));
        }
    }
    if a.element_id != b.element_id || a_id == b_id {
        return Err(Error::validation(
            "layer_sibling_id",
            "siblings must be two distinct layers of the same element",
        ));
    }

    let now = ctx.timestamp();
    let mut new_a = a.clone();
    let mut new_b = b.clone();
    new_a.set_sibling(Some(b_id));
    new_b.set_sibling(Some(a_id));
    new_a.modified = Some(now.clone());
    new_b.modified = Some(now);

    ctx.transaction(|| {
        ctx.store.update_component(&new_a)?;
        ctx.store.update_component(&new_b)
    })?;

    *a = new_a;
    *b = new_b;
    Ok(SiblingPair::new(a_id, b_id))
}

/// Change the share of the slot a layer covers
///
/// For a paired layer the sibling receives the complement so that both
/// ratios always add up to one.
pub fn set_layer_area_ratio(
    ctx: &Context<'_>,
    component: &mut Component,
    ratio: f64,
) -> Result<()> {
    let id = component.require_id()?;
    if !component.is_layer() {
        return Err(Error::NotALayer(id));
    }
    if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
        return Err(Error::validation(
            "layer_area_ratio",
            format!("{} is not within (0, 1]", ratio),
        ));
    }

    let now = ctx.timestamp();
    let mut row = component.clone();
    row.set_area_ratio(ratio);
    row.modified = Some(now.clone());

    match component.sibling_id() {
        None => ctx.store.update_component(&row)?,
        Some(sibling_id) => {
            if ratio >= 1.0 {
                return Err(Error::validation(
                    "layer_area_ratio",
                    "a paired layer must leave area to its sibling",
                ));
            }
            let mut sibling = load_component(ctx.store, sibling_id)?;
            sibling.set_area_ratio(1.0 - ratio);
            sibling.modified = Some(now);

            ctx.transaction(|| {
                ctx.store.update_component(&row)?;
                ctx.store.update_component(&sibling)
            })?;
        }
    }

    *component = row;
    Ok(())
}

/// Delete a component
///
/// A surviving sibling takes over the whole slot again, and the remaining
/// layers are renumbered.
pub fn remove_component(ctx: &Context<'_>, component_id: i64) -> Result<()> {
    let component = load_component(ctx.store, component_id)?;
    let element = load_element(ctx.store, component.element_id)?;

    ctx.transaction(|| {
        if let Some(sibling_id) = component.sibling_id()
            && let Some(mut sibling) = ctx.store.find_component(sibling_id)?
        {
            sibling.set_sibling(None);
            sibling.set_area_ratio(1.0);
            sibling.modified = Some(ctx.timestamp());
            ctx.store.update_component(&sibling)?;
        }

        ctx.store.delete_component(component_id)?;
        reindex_layers(ctx, &element)?;
        Ok(())
    })?;

    info!(
        "Removed component {} from element {}",
        component_id, component.element_id
    );
    Ok(())
}

/// Members of a composite element in position order
pub fn members(
    store: &dyn AssemblyStore,
    composite: &Element,
) -> Result<Vec<(CompositeAssignment, Element)>> {
    let composite_id = composite.require_id()?;
    if !composite.is_composite() {
        return Ok(Vec::new());
    }

    store
        .find_assignments(composite_id)?
        .into_iter()
        .map(|assignment| {
            let element = load_element(store, assignment.element_id)?;
            Ok((assignment, element))
        })
        .collect()
}

/// Largest `length × width` over the element's layers, 0 without layers
pub fn max_surface(store: &dyn AssemblyStore, element: &Element) -> Result<f64> {
    let element_id = element.require_id()?;
    let surface = store
        .find_components(element_id)?
        .iter()
        .filter_map(|c| c.layer.as_ref().map(|l| l.surface()))
        .fold(0.0, f64::max);

    Ok(surface)
}

/// Surface area covered by an element
///
/// Area-measured elements report their quantity. Otherwise the surface is
/// the largest layer surface, for composites the largest among opaque
/// members, scaled by the element's quantity.
pub fn surface_area(store: &dyn AssemblyStore, element: &Element) -> Result<f64> {
    if element.ref_unit.is_area() {
        return Ok(element.quantity);
    }

    let surface = if element.is_composite() {
        let mut surface: f64 = 0.0;
        for (_, member) in members(store, element)? {
            if element_type_of(store, &member)?.is_non_opaque() {
                continue;
            }
            surface = surface.max(max_surface(store, &member)?);
        }
        surface
    } else {
        max_surface(store, element)?
    };

    Ok(surface * element.quantity)
}

/// Summed surface of the non-opaque members (windows, doors) of a composite
pub fn non_opaque_area(store: &dyn AssemblyStore, element: &Element) -> Result<f64> {
    let mut area = 0.0;
    for (_, member) in members(store, element)? {
        if element_type_of(store, &member)?.is_non_opaque() {
            area += max_surface(store, &member)? * member.quantity;
        }
    }
    Ok(area)
}

/// Remaining opaque area of an area-measured composite
///
/// `None` for leaf elements and for composites not measured in area.
pub fn opaque_area(store: &dyn AssemblyStore, element: &Element) -> Result<Option<f64>> {
    if !element.ref_unit.is_area() || !element.is_composite() {
        return Ok(None);
    }
    if element.is_template() {
        return Ok(Some(element.quantity));
    }

    let area = element.quantity - non_opaque_area(store, element)?;
    Ok(Some(area.max(0.0)))
}

/// `Some(true)` when every component is extant
///
/// `None` for composites and for elements without components.
pub fn is_extant(store: &dyn AssemblyStore, element: &Element) -> Result<Option<bool>> {
    extant_flags(store, element).map(|flags| flags.map(|f| f.iter().all(|e| *e)))
}

/// `Some(true)` when at least one component is extant
pub fn has_extants(store: &dyn AssemblyStore, element: &Element) -> Result<Option<bool>> {
    extant_flags(store, element).map(|flags| flags.map(|f| f.iter().any(|e| *e)))
}

fn extant_flags(store: &dyn AssemblyStore, element: &Element) -> Result<Option<Vec<bool>>> {
    if element.is_composite() {
        return Ok(None);
    }

    let flags: Vec<bool> = store
        .find_components(element.require_id()?)?
        .iter()
        .map(|c| c.is_extant)
        .collect();

    Ok((!flags.is_empty()).then_some(flags))
}

/// Mark every component of a leaf element as extant or not
///
/// Clearing the flag also clears the life time delay. Returns whether any
/// component changed.
pub fn set_all_extant(ctx: &Context<'_>, element: &Element, extant: bool) -> Result<bool> {
    if element.is_composite() {
        return Ok(false);
    }
    let element_id = element.require_id()?;

    ctx.transaction(|| {
        let mut updated = false;
        for mut component in ctx.store.find_components(element_id)? {
            if component.is_extant == extant {
                continue;
            }

            component.is_extant = extant;
            if !extant {
                component.life_time_delay = 0;
            }
            component.modified = Some(ctx.timestamp());
            ctx.store.update_component(&component)?;
            updated = true;
        }
        Ok(updated)
    })
}

/// Fail if `candidate` is `composite_id` or contains it somewhere below
pub(crate) fn ensure_not_nested_in(
    store: &dyn AssemblyStore,
    candidate: &Element,
    composite_id: i64,
) -> Result<()> {
    let mut visited = HashSet::new();
    let mut stack = vec![candidate.clone()];

    while let Some(element) = stack.pop() {
        let id = element.require_id()?;
        if id == composite_id {
            return Err(Error::CyclicAssembly(composite_id));
        }
        if !visited.insert(id) {
            continue;
        }
        for (_, member) in members(store, &element)? {
            stack.push(member);
        }
    }

    Ok(())
}

/// Add `member` to a composite element
///
/// Without an explicit position opaque members go behind the last opaque
/// member (non-opaque members move down one), non-opaque members go to the
/// end. Opaque members take over the composite's reference unit and
/// quantity (the opaque area for area-measured composites).
pub fn assign_member(
    ctx: &Context<'_>,
    composite: &Element,
    member: &mut Element,
    position: Option<i32>,
) -> Result<CompositeAssignment> {
    let composite_id = composite.require_id()?;
    let member_id = member.require_id()?;
    if !composite.is_composite() {
        return Err(Error::NotAComposite(composite_id));
    }
    ensure_not_nested_in(ctx.store, member, composite_id)?;

    let member_type = element_type_of(ctx.store, member)?;

    let updated = ctx.transaction(|| {
        let current = members(ctx.store, composite)?;

        let position = match position {
            Some(p) => p.max(1),
            None if member_type.is_non_opaque() => {
                current.iter().map(|(a, _)| a.position).max().unwrap_or(0) + 1
            }
            None => {
                let mut max_opaque = 0;
                for (assignment, element) in &current {
                    if !element_type_of(ctx.store, element)?.is_non_opaque() {
                        max_opaque = max_opaque.max(assignment.position);
                    }
                }
                max_opaque + 1
            }
        };

        for (mut assignment, _) in current {
            if assignment.position >= position {
                assignment.position += 1;
                ctx.store.update_assignment(&assignment)?;
            }
        }

        let assignment = CompositeAssignment::new(composite_id, member_id, position);
        ctx.store.insert_assignment(&assignment)?;

        let mut row = member.clone();
        if !member_type.is_non_opaque() {
            row.quantity = if composite.ref_unit.is_area() {
                let area = opaque_area(ctx.store, composite)?.unwrap_or(composite.quantity);
                (area * 1000.0).round() / 1000.0
            } else {
                composite.quantity
            };
            row.ref_unit = composite.ref_unit.clone();
        }
        if composite.is_public {
            row.is_public = true;
        }
        if composite.is_reference {
            row.is_reference = true;
        }
        row.modified = Some(ctx.timestamp());
        ctx.store.update_element(&row)?;

        Ok((assignment, row))
    })?;

    let (assignment, row) = updated;
    *member = row;
    info!(
        "Assigned element {} to composite {} at position {}",
        member_id, composite_id, assignment.position
    );
    Ok(assignment)
}

/// Remove a member from a composite and close the gap
pub fn unassign_member(ctx: &Context<'_>, composite: &Element, element_id: i64) -> Result<()> {
    let composite_id = composite.require_id()?;
    if !composite.is_composite() {
        return Err(Error::NotAComposite(composite_id));
    }

    ctx.transaction(|| {
        ctx.store.delete_assignment(composite_id, element_id)?;
        reindex_composite_assignments(ctx, composite)?;
        Ok(())
    })
}

/// Sanity check between layer geometry and reference unit
///
/// Area-measured constructional leaf elements with layers describe one
/// square metre, so their largest layer surface must be 1.
pub fn geometry_and_ref_unit_matches(store: &dyn AssemblyStore, element: &Element) -> Result<bool> {
    if element.is_composite() || !element.ref_unit.is_area() {
        return Ok(true);
    }

    let element_id = element.require_id()?;
    let has_layers = store.find_components(element_id)?.iter().any(Component::is_layer);
    if !has_layers || !element_type_of(store, element)?.is_constructional {
        return Ok(true);
    }

    Ok((max_surface(store, element)? - 1.0).abs() < 1e-9)
}
