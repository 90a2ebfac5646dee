// src/db/models/composite.rs

//! Composite membership rows

use crate::assembly::CompositeAssignment;
use crate::error::Result;
use rusqlite::{Connection, Row, params};

impl CompositeAssignment {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO composite_elements (composite_element_id, element_id, position)
             VALUES (?1, ?2, ?3)",
            params![self.composite_element_id, self.element_id, self.position],
        )?;
        Ok(())
    }

    /// Persist a changed position
    pub fn update(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "UPDATE composite_elements SET position = ?3
             WHERE composite_element_id = ?1 AND element_id = ?2",
            params![self.composite_element_id, self.element_id, self.position],
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, composite_element_id: i64, element_id: i64) -> Result<()> {
        conn.execute(
            "DELETE FROM composite_elements WHERE composite_element_id = ?1 AND element_id = ?2",
            [composite_element_id, element_id],
        )?;
        Ok(())
    }

    pub fn find_by_composite(conn: &Connection, composite_element_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT composite_element_id, element_id, position FROM composite_elements
             WHERE composite_element_id = ?1 ORDER BY position, element_id",
        )?;

        let assignments = stmt
            .query_map([composite_element_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(assignments)
    }

    pub fn find_by_member(conn: &Connection, element_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT composite_element_id, element_id, position FROM composite_elements
             WHERE element_id = ?1 ORDER BY composite_element_id",
        )?;

        let assignments = stmt
            .query_map([element_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(assignments)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            composite_element_id: row.get(0)?,
            element_id: row.get(1)?,
            position: row.get(2)?,
        })
    }
}
