// src/db/models/mod.rs

//! Row mapping for the assembly tables
//!
//! Each domain type gets `insert` / `update` / `find_*` methods taking a
//! `&Connection`. Ids are allocated before insertion, so inserts write the
//! id column explicitly.

mod attribute;
mod cache;
mod composite;
mod element;
mod element_component;
mod material;

pub use attribute::ConstrLink;

use crate::units::{LifeCyclePhase, Unit};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use std::str::FromStr;

impl ToSql for Unit {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Unit {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Unit::new)
    }
}

impl ToSql for LifeCyclePhase {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_ref()))
    }
}

impl FromSql for LifeCyclePhase {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        LifeCyclePhase::from_str(s).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
