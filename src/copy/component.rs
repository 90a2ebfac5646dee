// src/copy/component.rs

//! Copying single components

use super::element::ElementCopier;
use crate::assembly::{Component, link_siblings, load_component, load_element};
use crate::cache::{CacheComponent, CacheIndicator};
use crate::error::{Error, Result};
use crate::store::EntityKind;
use tracing::debug;

/// How a component is copied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentCopyOptions {
    /// Unpaired layer of the target element the copy is paired with
    pub sibling_id: Option<i64>,
    pub copy_cache_items: bool,
    /// Cover the whole slot again, for copies leaving their pair
    pub reset_area_ratio: bool,
    /// Place the copy at this layer position instead of the source's
    pub layer_position: Option<i32>,
}

impl ComponentCopyOptions {
    pub fn with_cache_items(mut self) -> Self {
        self.copy_cache_items = true;
        self
    }

    pub fn linked_to(mut self, sibling_id: i64) -> Self {
        self.sibling_id = Some(sibling_id);
        self
    }

    pub fn with_full_area(mut self) -> Self {
        self.reset_area_ratio = true;
        self
    }

    pub fn at_position(mut self, layer_position: i32) -> Self {
        self.layer_position = Some(layer_position);
        self
    }
}

impl ElementCopier<'_> {
    /// Duplicate `source` under `target_element_id`
    ///
    /// Composite targets are rejected. All scalar fields and component
    /// attributes are carried over. The copy never inherits the source's
    /// sibling link. With `options.sibling_id` it is paired with that layer
    /// instead, which must be an unpaired layer of the target element.
    pub fn copy_component(
        &self,
        source: &Component,
        target_element_id: i64,
        options: &ComponentCopyOptions,
    ) -> Result<Component> {
        let source_id = source.require_id()?;
        let ctx = self.context();
        if load_element(ctx.store, target_element_id)?.is_composite() {
            return Err(Error::CompositeCannotHoldComponents(target_element_id));
        }

        ctx.transaction(|| {
            let mut copy = source.clone();
            copy.id = Some(ctx.next_id(EntityKind::Component)?);
            copy.element_id = target_element_id;
            copy.created = Some(ctx.timestamp());
            copy.modified = None;
            copy.set_sibling(None);
            if options.reset_area_ratio {
                copy.set_area_ratio(1.0);
            }
            if let Some(position) = options.layer_position {
                copy.set_layer_position(position);
            }
            ctx.store.insert_component(&copy)?;

            let copy_id = copy.require_id()?;
            if let Some(sibling_id) = options.sibling_id {
                let mut sibling = load_component(ctx.store, sibling_id)?;
                link_siblings(ctx, &mut copy, &mut sibling)?;
            }

            if options.copy_cache_items
                && let Some(cache) = ctx.store.find_cache_component(source_id)?
            {
                let item_id = ctx.next_id(EntityKind::CacheItem)?;
                ctx.store.insert_cache_component(&CacheComponent {
                    item_id,
                    component_id: copy_id,
                    ..cache.clone()
                })?;
                self.copy_indicators(cache.item_id, item_id)?;
            }

            for attribute in ctx.store.find_component_attributes(source_id)? {
                let mut duplicate = attribute.duplicate_for(copy_id);
                duplicate.id = Some(ctx.next_id(EntityKind::ComponentAttribute)?);
                ctx.store.insert_component_attribute(&duplicate)?;
            }

            debug!(
                "Copied component {} to {} under element {}",
                source_id, copy_id, target_element_id
            );
            Ok(copy)
        })
    }

    /// Duplicate the indicator values of one cache item onto another
    pub(crate) fn copy_indicators(&self, from_item_id: i64, to_item_id: i64) -> Result<usize> {
        let store = self.context().store;
        let indicators = store.find_cache_indicators(from_item_id)?;

        for indicator in &indicators {
            store.insert_cache_indicator(&CacheIndicator {
                item_id: to_item_id,
                ..indicator.clone()
            })?;
        }

        Ok(indicators.len())
    }
}
