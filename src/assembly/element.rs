// src/assembly/element.rs

//! Element and element type
//!
//! An element is a distinct constructible thing: a wall, a ceiling, a
//! window. It is either a leaf holding components or a composite holding
//! other elements. Which of the two is decided by its node in the element
//! type taxonomy and never changes afterwards.

use crate::error::{Error, Result};
use crate::units::{MAX_UNIT_LEN, Unit};
use serde::{Deserialize, Serialize};

/// Maximum length of an element name
pub const MAX_NAME_LEN: usize = 250;

/// A node of the element type taxonomy (DIN 276 cost groups)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementType {
    pub node_id: i64,
    pub din_code: i32,
    pub name: String,
    /// Constructional types carry layered geometry
    pub is_constructional: bool,
    /// `Some(false)` marks non-opaque types such as windows; `None` is unknown
    pub is_opaque: Option<bool>,
    pub pref_ref_unit: Option<Unit>,
}

impl ElementType {
    pub fn new(node_id: i64, din_code: i32, name: impl Into<String>) -> Self {
        Self {
            node_id,
            din_code,
            name: name.into(),
            is_constructional: true,
            is_opaque: None,
            pref_ref_unit: None,
        }
    }

    /// Builder: mark the type as explicitly opaque or non-opaque
    pub fn with_opaque(mut self, opaque: bool) -> Self {
        self.is_opaque = Some(opaque);
        self
    }

    /// Builder: mark the type as non-constructional
    pub fn non_constructional(mut self) -> Self {
        self.is_constructional = false;
        self
    }

    /// Composite elements live on the tens of the cost group code (330, 340, ...)
    pub fn is_composite_level(&self) -> bool {
        self.din_code % 10 == 0
    }

    /// Only an explicit `false` counts; unknown opacity is treated as opaque
    pub fn is_non_opaque(&self) -> bool {
        self.is_opaque == Some(false)
    }
}

/// A building element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: Option<i64>,
    pub element_type_node_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub ref_unit: Unit,
    pub(crate) is_composite: bool,
    /// `None` marks a template element
    pub project_variant_id: Option<i64>,
    pub access_group_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub is_public: bool,
    pub is_reference: bool,
    pub copy_of_element_id: Option<i64>,
    pub uuid: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

impl Element {
    /// Create a new element of the given type
    ///
    /// The composite flag is taken from the type node.
    pub fn new(
        element_type: &ElementType,
        name: impl Into<String>,
        ref_unit: Unit,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        validate_ref_unit(&ref_unit)?;

        Ok(Self {
            id: None,
            element_type_node_id: element_type.node_id,
            name,
            description: None,
            quantity: 1.0,
            ref_unit,
            is_composite: element_type.is_composite_level(),
            project_variant_id: None,
            access_group_id: None,
            owner_id: None,
            is_public: false,
            is_reference: false,
            copy_of_element_id: None,
            uuid: None,
            created: None,
            modified: None,
        })
    }

    /// Builder: set the quantity
    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Builder: place the element in a project variant
    pub fn in_project_variant(mut self, project_variant_id: i64) -> Self {
        self.project_variant_id = Some(project_variant_id);
        self
    }

    /// Builder: set the owner
    pub fn owned_by(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn is_composite(&self) -> bool {
        self.is_composite
    }

    pub fn is_template(&self) -> bool {
        self.project_variant_id.is_none()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_ref_unit(&mut self, ref_unit: Unit) -> Result<()> {
        validate_ref_unit(&ref_unit)?;
        self.ref_unit = ref_unit;
        Ok(())
    }

    /// Re-check every constrained field, e.g. after direct field edits
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_ref_unit(&self.ref_unit)?;
        if !self.quantity.is_finite() {
            return Err(Error::validation("quantity", "must be a finite number"));
        }
        Ok(())
    }

    /// The id of a persisted element
    pub fn require_id(&self) -> Result<i64> {
        self.id
            .ok_or_else(|| Error::InitError(format!("Element '{}' has no ID", self.name)))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("name", "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::validation(
            "name",
            format!("must not exceed {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(())
}

fn validate_ref_unit(unit: &Unit) -> Result<()> {
    if unit.as_str().chars().count() > MAX_UNIT_LEN {
        return Err(Error::validation(
            "ref_unit",
            format!("must not exceed {} characters", MAX_UNIT_LEN),
        ));
    }
    Ok(())
}
