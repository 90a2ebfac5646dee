// src/db/mod.rs

//! SQLite persistence
//!
//! `init` creates and migrates a database file, `open` connects to an
//! existing one. [`SqliteStore`] implements [`AssemblyStore`] and
//! [`IdAllocator`] over a single connection; nested transaction scopes map
//! to SQLite savepoints.

pub mod models;
pub mod schema;

use crate::assembly::{
    CompositeAssignment, Component, ComponentAttribute, Element, ElementAttribute, ElementType,
};
use crate::cache::{CacheComponent, CacheElement, CacheIndicator};
use crate::conversion::{Conversion, LcaProcess, Material};
use crate::error::{Error, Result};
use crate::store::{AssemblyStore, Clock, Context, EntityKind, IdAllocator};
use models::ConstrLink;
use rusqlite::{Connection, OptionalExtension, params};
use std::cell::Cell;
use std::path::Path;
use tracing::{debug, info};

/// Create the database file (and parent directory) and bring the schema up to date
pub fn init(db_path: &str) -> Result<()> {
    let path = Path::new(db_path);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    configure(&conn)?;
    schema::migrate(&conn)?;

    info!("Initialized database at {}", db_path);
    Ok(())
}

/// Open an existing database
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        return Err(Error::InitError(format!(
            "Database not found at {} (run `init` first)",
            db_path
        )));
    }

    let conn = Connection::open(db_path)?;
    configure(&conn)?;
    schema::migrate(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(())
}

/// [`AssemblyStore`] backed by one SQLite connection
pub struct SqliteStore {
    conn: Connection,
    depth: Cell<u32>,
}

impl SqliteStore {
    /// Wrap an already configured and migrated connection
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            depth: Cell::new(0),
        }
    }

    pub fn open(db_path: &str) -> Result<Self> {
        open(db_path).map(Self::new)
    }

    /// A fresh, migrated in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        configure(&conn)?;
        schema::migrate(&conn)?;
        Ok(Self::new(conn))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// A [`Context`] using this store for persistence and ids
    pub fn context<'a>(&'a self, clock: &'a dyn Clock) -> Context<'a> {
        Context::new(self, self, clock)
    }

    fn savepoint_name(depth: u32) -> String {
        format!("sp_{}", depth)
    }
}

impl IdAllocator for SqliteStore {
    fn next_id(&self, kind: EntityKind) -> Result<i64> {
        let name = kind.as_ref();
        let current: Option<i64> = self
            .conn
            .query_row(
                "SELECT next_value FROM id_sequences WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;

        let id = current.unwrap_or(1);
        self.conn.execute(
            "INSERT INTO id_sequences (name, next_value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET next_value = excluded.next_value",
            params![name, id + 1],
        )?;

        Ok(id)
    }
}

impl AssemblyStore for SqliteStore {
    fn find_element_type(&self, node_id: i64) -> Result<Option<ElementType>> {
        ElementType::find_by_node_id(&self.conn, node_id)
    }

    fn insert_element_type(&self, element_type: &ElementType) -> Result<()> {
        element_type.insert(&self.conn)
    }

    fn find_element(&self, id: i64) -> Result<Option<Element>> {
        Element::find_by_id(&self.conn, id)
    }

    fn find_element_names_in_scope(
        &self,
        element_type_node_id: i64,
        project_variant_id: Option<i64>,
    ) -> Result<Vec<String>> {
        Element::find_names_in_scope(&self.conn, element_type_node_id, project_variant_id)
    }

    fn insert_element(&self, element: &Element) -> Result<()> {
        element.insert(&self.conn)
    }

    fn update_element(&self, element: &Element) -> Result<()> {
        element.update(&self.conn)
    }

    fn delete_element(&self, id: i64) -> Result<()> {
        Element::delete(&self.conn, id)
    }

    fn find_component(&self, id: i64) -> Result<Option<Component>> {
        Component::find_by_id(&self.conn, id)
    }

    fn find_components(&self, element_id: i64) -> Result<Vec<Component>> {
        Component::find_by_element(&self.conn, element_id)
    }

    fn insert_component(&self, component: &Component) -> Result<()> {
        component.insert(&self.conn)
    }

    fn update_component(&self, component: &Component) -> Result<()> {
        component.update(&self.conn)
    }

    fn delete_component(&self, id: i64) -> Result<()> {
        Component::delete(&self.conn, id)
    }

    fn find_assignments(&self, composite_element_id: i64) -> Result<Vec<CompositeAssignment>> {
        CompositeAssignment::find_by_composite(&self.conn, composite_element_id)
    }

    fn find_assignments_of_member(&self, element_id: i64) -> Result<Vec<CompositeAssignment>> {
        CompositeAssignment::find_by_member(&self.conn, element_id)
    }

    fn insert_assignment(&self, assignment: &CompositeAssignment) -> Result<()> {
        assignment.insert(&self.conn)
    }

    fn update_assignment(&self, assignment: &CompositeAssignment) -> Result<()> {
        assignment.update(&self.conn)
    }

    fn delete_assignment(&self, composite_element_id: i64, element_id: i64) -> Result<()> {
        CompositeAssignment::delete(&self.conn, composite_element_id, element_id)
    }

    fn find_element_attributes(&self, element_id: i64) -> Result<Vec<ElementAttribute>> {
        ElementAttribute::find_by_element(&self.conn, element_id)
    }

    fn insert_element_attribute(&self, attribute: &ElementAttribute) -> Result<()> {
        attribute.insert(&self.conn)
    }

    fn find_component_attributes(&self, component_id: i64) -> Result<Vec<ComponentAttribute>> {
        ComponentAttribute::find_by_component(&self.conn, component_id)
    }

    fn insert_component_attribute(&self, attribute: &ComponentAttribute) -> Result<()> {
        attribute.insert(&self.conn)
    }

    fn find_constr_catalog_ids(&self, element_id: i64) -> Result<Vec<i64>> {
        ConstrLink::Catalog.find_ids(&self.conn, element_id)
    }

    fn assign_constr_catalog(&self, element_id: i64, constr_catalog_id: i64) -> Result<()> {
        ConstrLink::Catalog.assign(&self.conn, element_id, constr_catalog_id)
    }

    fn find_constr_design_ids(&self, element_id: i64) -> Result<Vec<i64>> {
        ConstrLink::Design.find_ids(&self.conn, element_id)
    }

    fn assign_constr_design(&self, element_id: i64, constr_design_id: i64) -> Result<()> {
        ConstrLink::Design.assign(&self.conn, element_id, constr_design_id)
    }

    fn find_cache_element(&self, element_id: i64) -> Result<Option<CacheElement>> {
        CacheElement::find_by_element(&self.conn, element_id)
    }

    fn insert_cache_element(&self, cache: &CacheElement) -> Result<()> {
        cache.insert(&self.conn)
    }

    fn find_cache_component(&self, component_id: i64) -> Result<Option<CacheComponent>> {
        CacheComponent::find_by_component(&self.conn, component_id)
    }

    fn insert_cache_component(&self, cache: &CacheComponent) -> Result<()> {
        cache.insert(&self.conn)
    }

    fn find_cache_indicators(&self, item_id: i64) -> Result<Vec<CacheIndicator>> {
        CacheIndicator::find_by_item(&self.conn, item_id)
    }

    fn insert_cache_indicator(&self, indicator: &CacheIndicator) -> Result<()> {
        indicator.insert(&self.conn)
    }

    fn find_material(&self, id: i64) -> Result<Option<Material>> {
        Material::find_by_id(&self.conn, id)
    }

    fn insert_material(&self, material: &Material) -> Result<()> {
        material.insert(&self.conn)
    }

    fn find_processes(&self, material_id: i64) -> Result<Vec<LcaProcess>> {
        LcaProcess::find_by_material(&self.conn, material_id)
    }

    fn insert_process(&self, process: &LcaProcess) -> Result<()> {
        process.insert(&self.conn)
    }

    fn find_conversions(&self, material_id: i64) -> Result<Vec<Conversion>> {
        Conversion::find_by_material(&self.conn, material_id)
    }

    fn insert_conversion(&self, conversion: &Conversion) -> Result<()> {
        conversion.insert(&self.conn)
    }

    fn begin(&self) -> Result<()> {
        let depth = self.depth.get() + 1;
        self.conn
            .execute_batch(&format!("SAVEPOINT {}", Self::savepoint_name(depth)))?;
        self.depth.set(depth);
        debug!("Opened transaction scope {}", depth);
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let depth = self.depth.get();
        if depth == 0 {
            return Err(Error::InitError("No open transaction scope to commit".to_string()));
        }

        self.conn
            .execute_batch(&format!("RELEASE {}", Self::savepoint_name(depth)))?;
        self.depth.set(depth - 1);
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let depth = self.depth.get();
        if depth == 0 {
            return Err(Error::InitError("No open transaction scope to roll back".to_string()));
        }

        let name = Self::savepoint_name(depth);
        self.depth.set(depth - 1);
        self.conn
            .execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name};"))?;
        debug!("Rolled back transaction scope {}", depth);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::transaction;
    use tempfile::TempDir;

    #[test]
    fn test_init_and_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("assembly.db");
        let path = path.to_str().unwrap();

        assert!(open(path).is_err());
        init(path).unwrap();
        let conn = open(path).unwrap();

        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_id_sequences_are_per_kind() {
        let store = SqliteStore::open_in_memory().unwrap();

        assert_eq!(store.next_id(EntityKind::Element).unwrap(), 1);
        assert_eq!(store.next_id(EntityKind::Element).unwrap(), 2);
        assert_eq!(store.next_id(EntityKind::Component).unwrap(), 1);
        assert_eq!(store.next_id(EntityKind::Element).unwrap(), 3);
    }

    #[test]
    fn test_nested_scope_rolls_back_alone() {
        let store = SqliteStore::open_in_memory().unwrap();

        transaction(&store, |s| {
            s.insert_material(&Material::with_id(1, "Concrete".to_string()))?;

            let inner: Result<()> = transaction(s, |s| {
                s.insert_material(&Material::with_id(2, "Steel".to_string()))?;
                Err(Error::InitError("abort inner".to_string()))
            });
            assert!(inner.is_err());
            Ok(())
        })
        .unwrap();

        assert!(store.find_material(1).unwrap().is_some());
        assert!(store.find_material(2).unwrap().is_none());
        assert_eq!(store.depth.get(), 0);
    }
}
