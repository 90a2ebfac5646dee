// src/db/models/material.rs

//! Material, process and conversion rows

use crate::conversion::{Conversion, LcaProcess, Material};
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

impl Material {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO materials (id, name) VALUES (?1, ?2)",
            params![self.id, &self.name],
        )?;
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare("SELECT id, name FROM materials WHERE id = ?1")?;

        let material = stmt
            .query_row([id], |row| Ok(Self::with_id(row.get(0)?, row.get(1)?)))
            .optional()?;

        Ok(material)
    }
}

impl LcaProcess {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO processes (id, material_id, name, ref_unit, phase)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.id,
                self.material_id,
                &self.name,
                &self.ref_unit,
                self.phase,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_material(conn: &Connection, material_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, material_id, name, ref_unit, phase
             FROM processes WHERE material_id = ?1 ORDER BY id",
        )?;

        let processes = stmt
            .query_map([material_id], |row: &Row| {
                Ok(Self {
                    id: row.get(0)?,
                    material_id: row.get(1)?,
                    name: row.get(2)?,
                    ref_unit: row.get(3)?,
                    phase: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(processes)
    }
}

impl Conversion {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO conversions (id, material_id, in_unit, out_unit, factor, ident, flow_reference)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                self.id,
                self.material_id,
                &self.in_unit,
                &self.out_unit,
                self.factor,
                &self.ident,
                &self.flow_reference,
            ],
        )?;
        Ok(())
    }

    /// Conversions of a material ordered by ident (missing idents last), then id
    pub fn find_by_material(conn: &Connection, material_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, material_id, in_unit, out_unit, factor, ident, flow_reference
             FROM conversions WHERE material_id = ?1
             ORDER BY ident IS NULL, ident, id",
        )?;

        let conversions = stmt
            .query_map([material_id], |row: &Row| {
                Ok(Self {
                    id: row.get(0)?,
                    material_id: row.get(1)?,
                    in_unit: row.get(2)?,
                    out_unit: row.get(3)?,
                    factor: row.get(4)?,
                    ident: row.get(5)?,
                    flow_reference: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(conversions)
    }
}
