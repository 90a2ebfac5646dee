// src/store.rs

//! Persistence collaborator
//!
//! Domain operations never talk to a database directly. They read and
//! write through [`AssemblyStore`], draw new ids from an [`IdAllocator`]
//! and take timestamps from a [`Clock`]. The three are bundled in a
//! [`Context`] that is passed into every mutating operation.

use crate::assembly::{
    CompositeAssignment, Component, ComponentAttribute, Element, ElementAttribute, ElementType,
};
use crate::cache::{CacheComponent, CacheElement, CacheIndicator};
use crate::conversion::{Conversion, LcaProcess, Material};
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use strum_macros::AsRefStr;
use tracing::warn;

/// Load, save and transaction primitives for the assembly model
///
/// Finders return `Ok(None)` / an empty list when nothing matches.
pub trait AssemblyStore {
    // Element types
    fn find_element_type(&self, node_id: i64) -> Result<Option<ElementType>>;
    fn insert_element_type(&self, element_type: &ElementType) -> Result<()>;

    // Elements
    fn find_element(&self, id: i64) -> Result<Option<Element>>;
    /// Names of all elements of one type and variant scope
    fn find_element_names_in_scope(
        &self,
        element_type_node_id: i64,
        project_variant_id: Option<i64>,
    ) -> Result<Vec<String>>;
    fn insert_element(&self, element: &Element) -> Result<()>;
    fn update_element(&self, element: &Element) -> Result<()>;
    fn delete_element(&self, id: i64) -> Result<()>;

    // Components
    fn find_component(&self, id: i64) -> Result<Option<Component>>;
    /// Components of an element ordered by layer position, then id
    fn find_components(&self, element_id: i64) -> Result<Vec<Component>>;
    fn insert_component(&self, component: &Component) -> Result<()>;
    fn update_component(&self, component: &Component) -> Result<()>;
    fn delete_component(&self, id: i64) -> Result<()>;

    // Composite assignments
    /// Members of a composite ordered by position, then element id
    fn find_assignments(&self, composite_element_id: i64) -> Result<Vec<CompositeAssignment>>;
    /// Composites an element is a member of
    fn find_assignments_of_member(&self, element_id: i64) -> Result<Vec<CompositeAssignment>>;
    fn insert_assignment(&self, assignment: &CompositeAssignment) -> Result<()>;
    fn update_assignment(&self, assignment: &CompositeAssignment) -> Result<()>;
    fn delete_assignment(&self, composite_element_id: i64, element_id: i64) -> Result<()>;

    // Attributes
    fn find_element_attributes(&self, element_id: i64) -> Result<Vec<ElementAttribute>>;
    fn insert_element_attribute(&self, attribute: &ElementAttribute) -> Result<()>;
    fn find_component_attributes(&self, component_id: i64) -> Result<Vec<ComponentAttribute>>;
    fn insert_component_attribute(&self, attribute: &ComponentAttribute) -> Result<()>;

    // Classification links
    fn find_constr_catalog_ids(&self, element_id: i64) -> Result<Vec<i64>>;
    fn assign_constr_catalog(&self, element_id: i64, constr_catalog_id: i64) -> Result<()>;
    fn find_constr_design_ids(&self, element_id: i64) -> Result<Vec<i64>>;
    fn assign_constr_design(&self, element_id: i64, constr_design_id: i64) -> Result<()>;

    // Cached results
    fn find_cache_element(&self, element_id: i64) -> Result<Option<CacheElement>>;
    fn insert_cache_element(&self, cache: &CacheElement) -> Result<()>;
    fn find_cache_component(&self, component_id: i64) -> Result<Option<CacheComponent>>;
    fn insert_cache_component(&self, cache: &CacheComponent) -> Result<()>;
    fn find_cache_indicators(&self, item_id: i64) -> Result<Vec<CacheIndicator>>;
    fn insert_cache_indicator(&self, indicator: &CacheIndicator) -> Result<()>;

    // Materials
    fn find_material(&self, id: i64) -> Result<Option<Material>>;
    fn insert_material(&self, material: &Material) -> Result<()>;
    /// Processes of a material ordered by id
    fn find_processes(&self, material_id: i64) -> Result<Vec<LcaProcess>>;
    fn insert_process(&self, process: &LcaProcess) -> Result<()>;
    /// Conversions of a material ordered by ident (missing idents last), then id
    fn find_conversions(&self, material_id: i64) -> Result<Vec<Conversion>>;
    fn insert_conversion(&self, conversion: &Conversion) -> Result<()>;

    // Transactions; scopes may nest
    fn begin(&self) -> Result<()>;
    fn commit(&self) -> Result<()>;
    fn rollback(&self) -> Result<()>;
}

/// Entities that draw ids from an [`IdAllocator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Element,
    Component,
    ElementAttribute,
    ComponentAttribute,
    CacheItem,
    Material,
    Process,
    Conversion,
}

/// Source of fresh row ids
pub trait IdAllocator {
    fn next_id(&self, kind: EntityKind) -> Result<i64>;
}

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The collaborators a mutating operation works with
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub store: &'a dyn AssemblyStore,
    pub ids: &'a dyn IdAllocator,
    pub clock: &'a dyn Clock,
}

impl<'a> Context<'a> {
    pub fn new(
        store: &'a dyn AssemblyStore,
        ids: &'a dyn IdAllocator,
        clock: &'a dyn Clock,
    ) -> Self {
        Self { store, ids, clock }
    }

    pub fn next_id(&self, kind: EntityKind) -> Result<i64> {
        self.ids.next_id(kind)
    }

    /// Current time as stored in created/modified columns
    pub fn timestamp(&self) -> String {
        self.clock.now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Run `f` in a transaction scope of this context's store
    pub fn transaction<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        transaction(self.store, |_| f())
    }
}

/// Rolls back an open scope unless it was finished explicitly
struct ScopeGuard<'s, S: AssemblyStore + ?Sized> {
    store: &'s S,
    finished: bool,
}

impl<S: AssemblyStore + ?Sized> Drop for ScopeGuard<'_, S> {
    fn drop(&mut self) {
        if !self.finished && let Err(e) = self.store.rollback() {
            warn!("Rollback after aborted transaction scope failed: {}", e);
        }
    }
}

/// Execute `f` in one transaction scope
///
/// Commits when `f` returns `Ok`. On `Err` the scope is rolled back and the
/// original error is returned unchanged; a panic inside `f` rolls back too.
pub fn transaction<S, T, F>(store: &S, f: F) -> Result<T>
where
    S: AssemblyStore + ?Sized,
    F: FnOnce(&S) -> Result<T>,
{
    store.begin()?;
    let mut guard = ScopeGuard {
        store,
        finished: false,
    };

    match f(store) {
        Ok(value) => {
            store.commit()?;
            guard.finished = true;
            Ok(value)
        }
        Err(e) => {
            guard.finished = true;
            if let Err(rollback_err) = store.rollback() {
                warn!("Rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}
