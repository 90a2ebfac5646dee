// src/db/models/cache.rs

//! Cached result rows

use crate::cache::{CacheComponent, CacheElement, CacheIndicator};
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

impl CacheElement {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO cache_elements (item_id, element_id, composite_item_id, mass, quantity, ref_unit)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.item_id,
                self.element_id,
                self.composite_item_id,
                self.mass,
                self.quantity,
                &self.ref_unit,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_element(conn: &Connection, element_id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT item_id, element_id, composite_item_id, mass, quantity, ref_unit
             FROM cache_elements WHERE element_id = ?1",
        )?;

        let cache = stmt
            .query_row([element_id], |row: &Row| {
                Ok(Self {
                    item_id: row.get(0)?,
                    element_id: row.get(1)?,
                    composite_item_id: row.get(2)?,
                    mass: row.get(3)?,
                    quantity: row.get(4)?,
                    ref_unit: row.get(5)?,
                })
            })
            .optional()?;

        Ok(cache)
    }
}

impl CacheComponent {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO cache_components (item_id, component_id, mass, quantity, ref_unit, num_replacements)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.item_id,
                self.component_id,
                self.mass,
                self.quantity,
                &self.ref_unit,
                self.num_replacements,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_component(conn: &Connection, component_id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT item_id, component_id, mass, quantity, ref_unit, num_replacements
             FROM cache_components WHERE component_id = ?1",
        )?;

        let cache = stmt
            .query_row([component_id], |row: &Row| {
                Ok(Self {
                    item_id: row.get(0)?,
                    component_id: row.get(1)?,
                    mass: row.get(2)?,
                    quantity: row.get(3)?,
                    ref_unit: row.get(4)?,
                    num_replacements: row.get(5)?,
                })
            })
            .optional()?;

        Ok(cache)
    }
}

impl CacheIndicator {
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO cache_indicators (item_id, indicator_id, life_cycle_ident, value)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                self.item_id,
                self.indicator_id,
                &self.life_cycle_ident,
                self.value,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_item(conn: &Connection, item_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT item_id, indicator_id, life_cycle_ident, value
             FROM cache_indicators WHERE item_id = ?1
             ORDER BY indicator_id, life_cycle_ident",
        )?;

        let indicators = stmt
            .query_map([item_id], |row: &Row| {
                Ok(Self {
                    item_id: row.get(0)?,
                    indicator_id: row.get(1)?,
                    life_cycle_ident: row.get(2)?,
                    value: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(indicators)
    }
}
