// src/copy/element.rs

//! Deep copy of elements
//!
//! A copy reproduces the whole tree below an element: members of a
//! composite are copied recursively and re-linked at their positions,
//! components of a leaf are copied with their sibling pairs rebuilt on the
//! new ids. Attributes, classification links and cached results follow.
//! The entire copy runs in one transaction scope.

use super::component::ComponentCopyOptions;
use super::naming::{DEFAULT_COPY_LABEL, unique_copy_name};
use crate::assembly::{
    CompositeAssignment, Element, SiblingPair, element_type_of, ensure_not_nested_in,
    insert_element, load_element, members,
};
use crate::cache::CacheElement;
use crate::error::{Error, Result};
use crate::store::{Context, EntityKind};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Composite the copy becomes a member of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeTarget {
    pub element_id: i64,
    /// Behind the last member when `None`
    pub position: Option<i32>,
}

/// Where a copy goes and what it takes along
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyOptions {
    /// Falls back to the acting user
    pub owner_id: Option<i64>,
    /// `None` copies into template scope
    pub project_variant_id: Option<i64>,
    /// Falls back to the source's access group
    pub access_group_id: Option<i64>,
    /// Keep the source name instead of deriving a numbered copy name
    pub copy_name: bool,
    pub copy_cache_items: bool,
    pub composite: Option<CompositeTarget>,
}

impl CopyOptions {
    pub fn into_project_variant(mut self, project_variant_id: i64) -> Self {
        self.project_variant_id = Some(project_variant_id);
        self
    }

    pub fn owned_by(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn in_access_group(mut self, access_group_id: i64) -> Self {
        self.access_group_id = Some(access_group_id);
        self
    }

    pub fn keep_name(mut self) -> Self {
        self.copy_name = true;
        self
    }

    pub fn with_cache_items(mut self) -> Self {
        self.copy_cache_items = true;
        self
    }

    pub fn nested_in(mut self, composite_element_id: i64, position: Option<i32>) -> Self {
        self.composite = Some(CompositeTarget {
            element_id: composite_element_id,
            position,
        });
        self
    }
}

/// Copies elements and components on behalf of one user
pub struct ElementCopier<'a> {
    ctx: Context<'a>,
    acting_user_id: i64,
    copy_label: String,
}

impl<'a> ElementCopier<'a> {
    pub fn new(ctx: Context<'a>, acting_user_id: i64) -> Self {
        Self {
            ctx,
            acting_user_id,
            copy_label: DEFAULT_COPY_LABEL.to_string(),
        }
    }

    /// Use another label in derived copy names
    pub fn with_copy_label(mut self, label: impl Into<String>) -> Self {
        self.copy_label = label.into();
        self
    }

    pub(crate) fn context(&self) -> &Context<'a> {
        &self.ctx
    }

    /// Deep-copy the element `source_id`
    ///
    /// Either the whole tree is copied or, on error, nothing is left behind
    /// and the error is returned as raised.
    pub fn copy_element(&self, source_id: i64, options: &CopyOptions) -> Result<Element> {
        let source = load_element(self.ctx.store, source_id)?;
        if let Some(target) = options.composite {
            let composite = load_element(self.ctx.store, target.element_id)?;
            if !composite.is_composite() {
                return Err(Error::NotAComposite(target.element_id));
            }
            // The target must not be the source or sit anywhere below it
            ensure_not_nested_in(self.ctx.store, &source, target.element_id)?;
        }

        let copy = self.ctx.transaction(|| {
            let mut path = HashSet::new();
            self.copy_tree(&source, options, &mut path)
        })?;

        info!(
            "Copied element {} '{}' to {} '{}'",
            source_id,
            source.name,
            copy.id.unwrap_or_default(),
            copy.name
        );
        Ok(copy)
    }

    /// Copy one element and everything below it
    ///
    /// `path` holds the elements currently being copied above this one.
    fn copy_tree(
        &self,
        source: &Element,
        options: &CopyOptions,
        path: &mut HashSet<i64>,
    ) -> Result<Element> {
        let source_id = source.require_id()?;
        if !path.insert(source_id) {
            return Err(Error::CyclicAssembly(source_id));
        }

        let mut copy = self.new_element_from(source, options)?;
        let copy_id = insert_element(&self.ctx, &mut copy)?;

        if options.copy_cache_items {
            self.copy_element_cache(source_id, copy_id, options.composite)?;
        }

        let source_members = members(self.ctx.store, source)?;
        if let Some(target) = options.composite {
            self.link_into(target, copy_id)?;
        }

        if source.is_composite() {
            for (assignment, member) in source_members {
                let member_options = CopyOptions {
                    copy_name: true,
                    composite: Some(CompositeTarget {
                        element_id: copy_id,
                        position: Some(assignment.position),
                    }),
                    ..options.clone()
                };
                self.copy_tree(&member, &member_options, path)?;
            }
        } else {
            self.copy_components(source_id, copy_id, options.copy_cache_items)?;
        }

        if copy.is_template() {
            for catalog_id in self.ctx.store.find_constr_catalog_ids(source_id)? {
                self.ctx.store.assign_constr_catalog(copy_id, catalog_id)?;
            }
            for design_id in self.ctx.store.find_constr_design_ids(source_id)? {
                self.ctx.store.assign_constr_design(copy_id, design_id)?;
            }
        }

        for attribute in self.ctx.store.find_element_attributes(source_id)? {
            let mut duplicate = attribute.duplicate_for(copy_id);
            duplicate.id = Some(self.ctx.next_id(EntityKind::ElementAttribute)?);
            self.ctx.store.insert_element_attribute(&duplicate)?;
        }

        path.remove(&source_id);
        Ok(copy)
    }

    /// The unsaved copy of `source` with name, quantity and scope applied
    fn new_element_from(&self, source: &Element, options: &CopyOptions) -> Result<Element> {
        let source_id = source.require_id()?;

        let quantity = match options.project_variant_id {
            Some(_) => {
                let nested_template_opening = source.is_template()
                    && options.composite.is_some()
                    && element_type_of(self.ctx.store, source)?.is_non_opaque();
                if nested_template_opening { 0.0 } else { source.quantity }
            }
            None => 1.0,
        };

        let name = if options.copy_name {
            source.name.clone()
        } else {
            unique_copy_name(self.ctx.store, source, &self.copy_label)?
        };

        let mut copy = source.clone();
        copy.id = None;
        copy.set_name(name)?;
        copy.quantity = quantity;
        copy.project_variant_id = options.project_variant_id;
        copy.access_group_id = options.access_group_id.or(source.access_group_id);
        copy.owner_id = Some(options.owner_id.unwrap_or(self.acting_user_id));
        copy.is_public = false;
        copy.is_reference = false;
        copy.copy_of_element_id = options.project_variant_id.map(|_| source_id);
        copy.uuid = None;
        copy.created = None;
        copy.modified = None;

        Ok(copy)
    }

    fn link_into(&self, target: CompositeTarget, copy_id: i64) -> Result<()> {
        let position = match target.position {
            Some(position) => position,
            None => {
                self.ctx
                    .store
                    .find_assignments(target.element_id)?
                    .iter()
                    .map(|a| a.position)
                    .max()
                    .unwrap_or(0)
                    + 1
            }
        };

        self.ctx
            .store
            .insert_assignment(&CompositeAssignment::new(target.element_id, copy_id, position))
    }

    /// Copy the components of a leaf, rebuilding sibling pairs on the new ids
    fn copy_components(&self, source_id: i64, copy_id: i64, copy_cache_items: bool) -> Result<()> {
        let components = self.ctx.store.find_components(source_id)?;
        let pairs = SiblingPair::resolve(&components)?;
        let by_id: HashMap<i64, usize> = components
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| c.id.map(|id| (id, idx)))
            .collect();

        let options = ComponentCopyOptions {
            copy_cache_items,
            ..ComponentCopyOptions::default()
        };

        let mut copied: HashSet<i64> = HashSet::new();
        for component in &components {
            let id = component.require_id()?;
            if copied.contains(&id) {
                continue;
            }

            let partner = pairs
                .iter()
                .find_map(|pair| pair.partner_of(id))
                .and_then(|partner_id| by_id.get(&partner_id).map(|idx| &components[*idx]));

            match partner {
                Some(partner) => {
                    let partner_id = partner.require_id()?;
                    let first = self.copy_component(component, copy_id, &options)?;
                    let paired = options.clone().linked_to(first.require_id()?);
                    self.copy_component(partner, copy_id, &paired)?;

                    copied.insert(partner_id);
                }
                None => {
                    self.copy_component(component, copy_id, &options)?;
                }
            }
            copied.insert(id);
        }

        debug!(
            "Copied {} components ({} sibling pairs) from element {} to {}",
            copied.len(),
            pairs.len(),
            source_id,
            copy_id
        );
        Ok(())
    }

    /// Carry the cached element results over, bound to the target composite's cache item
    fn copy_element_cache(
        &self,
        source_id: i64,
        copy_id: i64,
        composite: Option<CompositeTarget>,
    ) -> Result<()> {
        let Some(cache) = self.ctx.store.find_cache_element(source_id)? else {
            return Ok(());
        };

        let composite_item_id = match composite {
            Some(target) => self
                .ctx
                .store
                .find_cache_element(target.element_id)?
                .map(|c| c.item_id),
            None => None,
        };

        let item_id = self.ctx.next_id(EntityKind::CacheItem)?;
        self.ctx.store.insert_cache_element(&CacheElement {
            item_id,
            element_id: copy_id,
            composite_item_id,
            ..cache.clone()
        })?;
        let indicators = self.copy_indicators(cache.item_id, item_id)?;

        debug!(
            "Copied cache item {} to {} with {} indicator values",
            cache.item_id, item_id, indicators
        );
        Ok(())
    }
}
