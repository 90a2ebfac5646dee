// src/db/models/element_component.rs

//! Component rows
//!
//! Layer data is flattened into `layer_*` columns; `is_layer` decides
//! whether they are read back into a [`Layer`].

use crate::assembly::{Component, Layer};
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COMPONENT_COLUMNS: &str = "id, element_id, material_id, conversion_id, quantity, life_time,
     life_time_delay, life_time_info, calc_lca, is_extant, is_layer, layer_position, layer_size,
     layer_length, layer_width, layer_area_ratio, layer_sibling_id, created, modified";

impl Component {
    /// Insert this component with its preassigned id
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        let layer = self.layer.as_ref();
        conn.execute(
            &format!(
                "INSERT INTO element_components ({COMPONENT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
            ),
            params![
                self.id,
                self.element_id,
                self.material_id,
                self.conversion_id,
                self.quantity,
                self.life_time,
                self.life_time_delay,
                &self.life_time_info,
                self.calc_lca,
                self.is_extant,
                layer.is_some(),
                layer.and_then(|l| l.position),
                layer.and_then(|l| l.size),
                layer.map(|l| l.length),
                layer.map(|l| l.width),
                layer.map(|l| l.area_ratio),
                layer.and_then(|l| l.sibling_id()),
                &self.created,
                &self.modified,
            ],
        )?;
        Ok(())
    }

    pub fn update(&self, conn: &Connection) -> Result<()> {
        let id = self.require_id()?;
        let layer = self.layer.as_ref();
        conn.execute(
            "UPDATE element_components SET element_id = ?2, material_id = ?3, conversion_id = ?4,
                 quantity = ?5, life_time = ?6, life_time_delay = ?7, life_time_info = ?8,
                 calc_lca = ?9, is_extant = ?10, is_layer = ?11, layer_position = ?12,
                 layer_size = ?13, layer_length = ?14, layer_width = ?15, layer_area_ratio = ?16,
                 layer_sibling_id = ?17, modified = ?18
             WHERE id = ?1",
            params![
                id,
                self.element_id,
                self.material_id,
                self.conversion_id,
                self.quantity,
                self.life_time,
                self.life_time_delay,
                &self.life_time_info,
                self.calc_lca,
                self.is_extant,
                layer.is_some(),
                layer.and_then(|l| l.position),
                layer.and_then(|l| l.size),
                layer.map(|l| l.length),
                layer.map(|l| l.width),
                layer.map(|l| l.area_ratio),
                layer.and_then(|l| l.sibling_id()),
                &self.modified,
            ],
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        conn.execute("DELETE FROM element_components WHERE id = ?1", [id])?;
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COMPONENT_COLUMNS} FROM element_components WHERE id = ?1"
        ))?;

        let component = stmt.query_row([id], Self::from_row).optional()?;
        Ok(component)
    }

    /// Components of an element; layers by position, plain components last
    pub fn find_by_element(conn: &Connection, element_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COMPONENT_COLUMNS} FROM element_components
             WHERE element_id = ?1
             ORDER BY layer_position IS NULL, layer_position, id"
        ))?;

        let components = stmt
            .query_map([element_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(components)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let is_layer: bool = row.get(10)?;
        let layer = if is_layer {
            Some(Layer {
                position: row.get(11)?,
                size: row.get(12)?,
                length: row.get::<_, Option<f64>>(13)?.unwrap_or(1.0),
                width: row.get::<_, Option<f64>>(14)?.unwrap_or(1.0),
                area_ratio: row.get::<_, Option<f64>>(15)?.unwrap_or(1.0),
                sibling_id: row.get(16)?,
            })
        } else {
            None
        };

        Ok(Self {
            id: row.get(0)?,
            element_id: row.get(1)?,
            material_id: row.get(2)?,
            conversion_id: row.get(3)?,
            quantity: row.get(4)?,
            life_time: row.get(5)?,
            life_time_delay: row.get(6)?,
            life_time_info: row.get(7)?,
            calc_lca: row.get(8)?,
            is_extant: row.get(9)?,
            layer,
            created: row.get(17)?,
            modified: row.get(18)?,
        })
    }
}
