// src/assembly/attribute.rs

//! Free-form attributes attached to elements and components

use serde::{Deserialize, Serialize};

/// An ident/caption/value triple attached to an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementAttribute {
    pub id: Option<i64>,
    pub element_id: i64,
    pub ident: String,
    pub caption: String,
    pub numeric_value: Option<f64>,
    pub text_value: Option<String>,
}

impl ElementAttribute {
    pub fn new(element_id: i64, ident: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            id: None,
            element_id,
            ident: ident.into(),
            caption: caption.into(),
            numeric_value: None,
            text_value: None,
        }
    }

    pub fn with_numeric(mut self, value: f64) -> Self {
        self.numeric_value = Some(value);
        self
    }

    pub fn with_text(mut self, value: impl Into<String>) -> Self {
        self.text_value = Some(value.into());
        self
    }

    /// The same attribute re-targeted to another element, not yet persisted
    pub fn duplicate_for(&self, element_id: i64) -> Self {
        Self {
            id: None,
            element_id,
            ..self.clone()
        }
    }
}

/// An ident/value pair attached to a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentAttribute {
    pub id: Option<i64>,
    pub component_id: i64,
    pub ident: String,
    pub numeric_value: Option<f64>,
    pub text_value: Option<String>,
}

impl ComponentAttribute {
    pub fn new(component_id: i64, ident: impl Into<String>) -> Self {
        Self {
            id: None,
            component_id,
            ident: ident.into(),
            numeric_value: None,
            text_value: None,
        }
    }

    pub fn with_numeric(mut self, value: f64) -> Self {
        self.numeric_value = Some(value);
        self
    }

    pub fn duplicate_for(&self, component_id: i64) -> Self {
        Self {
            id: None,
            component_id,
            ..self.clone()
        }
    }
}
