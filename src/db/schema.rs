// src/db/schema.rs

//! Database schema definitions and migrations
//!
//! The schema is versioned through a `schema_version` table; `migrate`
//! applies every migration newer than the recorded version in order.

use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

fn init_schema_version(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    init_schema_version(conn)?;

    let version = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Apply all pending migrations to bring the database up to date
pub fn migrate(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    debug!("Current schema version: {}", current_version);

    if current_version >= SCHEMA_VERSION {
        return Ok(());
    }

    for version in (current_version + 1)..=SCHEMA_VERSION {
        info!("Applying migration to version {}", version);
        apply_migration(conn, version)?;
        set_schema_version(conn, version)?;
    }

    info!("Schema migration complete. Now at version {}", SCHEMA_VERSION);
    Ok(())
}

fn apply_migration(conn: &Connection, version: i32) -> Result<()> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(Error::InitError(format!(
            "Unknown migration version: {}",
            version
        ))),
    }
}

/// Initial schema - Version 1
///
/// - element_types: classification nodes with DIN 276 codes
/// - elements / element_components / composite_elements: the assembly tree
/// - materials / processes / conversions: unit conversion data
/// - *_attributes, element_constr_*: per-element extras carried by copies
/// - cache_*: cached results carried by copies
/// - id_sequences: id allocation per entity kind
fn migrate_v1(conn: &Connection) -> Result<()> {
    debug!("Creating schema version 1");

    conn.execute_batch(
        "
        CREATE TABLE element_types (
            node_id INTEGER PRIMARY KEY,
            din_code INTEGER NOT NULL,
            name TEXT NOT NULL,
            is_constructional INTEGER NOT NULL DEFAULT 1,
            is_opaque INTEGER,
            pref_ref_unit TEXT
        );

        CREATE TABLE elements (
            id INTEGER PRIMARY KEY,
            element_type_node_id INTEGER NOT NULL REFERENCES element_types(node_id),
            name TEXT NOT NULL,
            description TEXT,
            quantity REAL NOT NULL DEFAULT 1,
            ref_unit TEXT NOT NULL,
            is_composite INTEGER NOT NULL DEFAULT 0,
            project_variant_id INTEGER,
            access_group_id INTEGER,
            owner_id INTEGER,
            is_public INTEGER NOT NULL DEFAULT 0,
            is_reference INTEGER NOT NULL DEFAULT 0,
            copy_of_element_id INTEGER REFERENCES elements(id) ON DELETE SET NULL,
            uuid TEXT UNIQUE,
            created TEXT,
            modified TEXT
        );

        CREATE INDEX idx_elements_type ON elements(element_type_node_id, project_variant_id);

        CREATE TABLE element_components (
            id INTEGER PRIMARY KEY,
            element_id INTEGER NOT NULL REFERENCES elements(id) ON DELETE CASCADE,
            material_id INTEGER NOT NULL,
            conversion_id INTEGER NOT NULL,
            quantity REAL NOT NULL,
            life_time INTEGER NOT NULL,
            life_time_delay INTEGER NOT NULL DEFAULT 0,
            life_time_info TEXT,
            calc_lca INTEGER NOT NULL DEFAULT 1,
            is_extant INTEGER NOT NULL DEFAULT 0,
            is_layer INTEGER NOT NULL DEFAULT 0,
            layer_position INTEGER,
            layer_size REAL,
            layer_length REAL,
            layer_width REAL,
            layer_area_ratio REAL,
            layer_sibling_id INTEGER REFERENCES element_components(id) ON DELETE SET NULL,
            created TEXT,
            modified TEXT
        );

        CREATE INDEX idx_element_components_element ON element_components(element_id);

        CREATE TABLE composite_elements (
            composite_element_id INTEGER NOT NULL REFERENCES elements(id) ON DELETE CASCADE,
            element_id INTEGER NOT NULL REFERENCES elements(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            PRIMARY KEY (composite_element_id, element_id)
        );

        CREATE INDEX idx_composite_elements_member ON composite_elements(element_id);

        CREATE TABLE materials (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE processes (
            id INTEGER PRIMARY KEY,
            material_id INTEGER NOT NULL REFERENCES materials(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            ref_unit TEXT NOT NULL,
            phase TEXT NOT NULL CHECK(phase IN ('production', 'maintenance', 'operation', 'end_of_life'))
        );

        CREATE TABLE conversions (
            id INTEGER PRIMARY KEY,
            material_id INTEGER NOT NULL REFERENCES materials(id) ON DELETE CASCADE,
            in_unit TEXT NOT NULL,
            out_unit TEXT NOT NULL,
            factor REAL,
            ident TEXT,
            flow_reference TEXT
        );

        CREATE INDEX idx_conversions_material ON conversions(material_id);

        CREATE TABLE element_attributes (
            id INTEGER PRIMARY KEY,
            element_id INTEGER NOT NULL REFERENCES elements(id) ON DELETE CASCADE,
            ident TEXT NOT NULL,
            caption TEXT NOT NULL,
            numeric_value REAL,
            text_value TEXT
        );

        CREATE TABLE component_attributes (
            id INTEGER PRIMARY KEY,
            component_id INTEGER NOT NULL REFERENCES element_components(id) ON DELETE CASCADE,
            ident TEXT NOT NULL,
            numeric_value REAL,
            text_value TEXT
        );

        CREATE TABLE element_constr_catalogs (
            element_id INTEGER NOT NULL REFERENCES elements(id) ON DELETE CASCADE,
            constr_catalog_id INTEGER NOT NULL,
            PRIMARY KEY (element_id, constr_catalog_id)
        );

        CREATE TABLE element_constr_designs (
            element_id INTEGER NOT NULL REFERENCES elements(id) ON DELETE CASCADE,
            constr_design_id INTEGER NOT NULL,
            PRIMARY KEY (element_id, constr_design_id)
        );

        CREATE TABLE cache_elements (
            item_id INTEGER PRIMARY KEY,
            element_id INTEGER NOT NULL UNIQUE REFERENCES elements(id) ON DELETE CASCADE,
            composite_item_id INTEGER,
            mass REAL,
            quantity REAL,
            ref_unit TEXT
        );

        CREATE TABLE cache_components (
            item_id INTEGER PRIMARY KEY,
            component_id INTEGER NOT NULL UNIQUE REFERENCES element_components(id) ON DELETE CASCADE,
            mass REAL,
            quantity REAL,
            ref_unit TEXT,
            num_replacements INTEGER
        );

        CREATE TABLE cache_indicators (
            item_id INTEGER NOT NULL,
            indicator_id INTEGER NOT NULL,
            life_cycle_ident TEXT NOT NULL,
            value REAL NOT NULL,
            PRIMARY KEY (item_id, indicator_id, life_cycle_ident)
        );

        CREATE TABLE id_sequences (
            name TEXT PRIMARY KEY,
            next_value INTEGER NOT NULL
        );
        ",
    )?;

    info!("Schema version 1 applied successfully");
    Ok(())
}
