// src/db/models/attribute.rs

//! Attribute rows and construction catalog/design links

use crate::assembly::{ComponentAttribute, ElementAttribute};
use crate::error::Result;
use rusqlite::{Connection, Row, params};

impl ElementAttribute {
    /// Insert this attribute with its preassigned id
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO element_attributes (id, element_id, ident, caption, numeric_value, text_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.id,
                self.element_id,
                &self.ident,
                &self.caption,
                self.numeric_value,
                &self.text_value,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_element(conn: &Connection, element_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, element_id, ident, caption, numeric_value, text_value
             FROM element_attributes WHERE element_id = ?1 ORDER BY id",
        )?;

        let attributes = stmt
            .query_map([element_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(attributes)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            element_id: row.get(1)?,
            ident: row.get(2)?,
            caption: row.get(3)?,
            numeric_value: row.get(4)?,
            text_value: row.get(5)?,
        })
    }
}

impl ComponentAttribute {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO component_attributes (id, component_id, ident, numeric_value, text_value)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.id,
                self.component_id,
                &self.ident,
                self.numeric_value,
                &self.text_value,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_component(conn: &Connection, component_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, component_id, ident, numeric_value, text_value
             FROM component_attributes WHERE component_id = ?1 ORDER BY id",
        )?;

        let attributes = stmt
            .query_map([component_id], |row: &Row| {
                Ok(Self {
                    id: row.get(0)?,
                    component_id: row.get(1)?,
                    ident: row.get(2)?,
                    numeric_value: row.get(3)?,
                    text_value: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(attributes)
    }
}

/// Classification tables linking an element to external ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstrLink {
    Catalog,
    Design,
}

impl ConstrLink {
    fn table_and_column(self) -> (&'static str, &'static str) {
        match self {
            Self::Catalog => ("element_constr_catalogs", "constr_catalog_id"),
            Self::Design => ("element_constr_designs", "constr_design_id"),
        }
    }

    pub fn find_ids(self, conn: &Connection, element_id: i64) -> Result<Vec<i64>> {
        let (table, column) = self.table_and_column();
        let mut stmt = conn.prepare(&format!(
            "SELECT {column} FROM {table} WHERE element_id = ?1 ORDER BY {column}"
        ))?;

        let ids = stmt
            .query_map([element_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;

        Ok(ids)
    }

    /// Link an id; linking twice is a no-op
    pub fn assign(self, conn: &Connection, element_id: i64, id: i64) -> Result<()> {
        let (table, column) = self.table_and_column();
        conn.execute(
            &format!("INSERT OR IGNORE INTO {table} (element_id, {column}) VALUES (?1, ?2)"),
            [element_id, id],
        )?;
        Ok(())
    }
}
