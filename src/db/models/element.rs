// src/db/models/element.rs

//! Element and element type rows

use crate::assembly::{Element, ElementType};
use crate::error::Result;
use crate::units::Unit;
use rusqlite::{Connection, OptionalExtension, Row, params};

const ELEMENT_COLUMNS: &str = "id, element_type_node_id, name, description, quantity, ref_unit,
     is_composite, project_variant_id, access_group_id, owner_id, is_public, is_reference,
     copy_of_element_id, uuid, created, modified";

impl ElementType {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO element_types (node_id, din_code, name, is_constructional, is_opaque, pref_ref_unit)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.node_id,
                self.din_code,
                &self.name,
                self.is_constructional,
                self.is_opaque,
                &self.pref_ref_unit,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_node_id(conn: &Connection, node_id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT node_id, din_code, name, is_constructional, is_opaque, pref_ref_unit
             FROM element_types WHERE node_id = ?1",
        )?;

        let element_type = stmt.query_row([node_id], Self::from_row).optional()?;
        Ok(element_type)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            node_id: row.get(0)?,
            din_code: row.get(1)?,
            name: row.get(2)?,
            is_constructional: row.get(3)?,
            is_opaque: row.get(4)?,
            pref_ref_unit: row.get(5)?,
        })
    }
}

impl Element {
    /// Insert this element with its preassigned id
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO elements ({ELEMENT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                self.id,
                self.element_type_node_id,
                &self.name,
                &self.description,
                self.quantity,
                &self.ref_unit,
                self.is_composite,
                self.project_variant_id,
                self.access_group_id,
                self.owner_id,
                self.is_public,
                self.is_reference,
                self.copy_of_element_id,
                &self.uuid,
                &self.created,
                &self.modified,
            ],
        )?;
        Ok(())
    }

    pub fn update(&self, conn: &Connection) -> Result<()> {
        let id = self.require_id()?;
        conn.execute(
            "UPDATE elements SET element_type_node_id = ?2, name = ?3, description = ?4,
                 quantity = ?5, ref_unit = ?6, is_composite = ?7, project_variant_id = ?8,
                 access_group_id = ?9, owner_id = ?10, is_public = ?11, is_reference = ?12,
                 copy_of_element_id = ?13, uuid = ?14, modified = ?15
             WHERE id = ?1",
            params![
                id,
                self.element_type_node_id,
                &self.name,
                &self.description,
                self.quantity,
                &self.ref_unit,
                self.is_composite,
                self.project_variant_id,
                self.access_group_id,
                self.owner_id,
                self.is_public,
                self.is_reference,
                self.copy_of_element_id,
                &self.uuid,
                &self.modified,
            ],
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        conn.execute("DELETE FROM elements WHERE id = ?1", [id])?;
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {ELEMENT_COLUMNS} FROM elements WHERE id = ?1"
        ))?;

        let element = stmt.query_row([id], Self::from_row).optional()?;
        Ok(element)
    }

    /// Names of all elements in one type and variant scope
    pub fn find_names_in_scope(
        conn: &Connection,
        element_type_node_id: i64,
        project_variant_id: Option<i64>,
    ) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT name FROM elements
             WHERE element_type_node_id = ?1 AND project_variant_id IS ?2
             ORDER BY id",
        )?;

        let names = stmt
            .query_map(params![element_type_node_id, project_variant_id], |row| {
                row.get(0)
            })?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(names)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let ref_unit: Unit = row.get(5)?;
        Ok(Self {
            id: row.get(0)?,
            element_type_node_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            quantity: row.get(4)?,
            ref_unit,
            is_composite: row.get(6)?,
            project_variant_id: row.get(7)?,
            access_group_id: row.get(8)?,
            owner_id: row.get(9)?,
            is_public: row.get(10)?,
            is_reference: row.get(11)?,
            copy_of_element_id: row.get(12)?,
            uuid: row.get(13)?,
            created: row.get(14)?,
            modified: row.get(15)?,
        })
    }
}
