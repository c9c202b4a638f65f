//! Validation collaborator seam
//!
//! The create path hands the parsed attributes to a [`Validator`] and only
//! consumes pass/fail plus the per-field messages. Rule execution belongs to
//! the validator, not to this crate.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Field-level validation messages
///
/// Fields iterate in name order; messages keep insertion order per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Whether no message was recorded
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of messages
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Messages of one field
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// Every `(field, message)` pair
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().flat_map(|(field, messages)| {
            messages
                .iter()
                .map(move |message| (field.as_str(), message.as_str()))
        })
    }

    /// `Ok` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Attribute validator consulted before a record is created
pub trait Validator: Send + Sync {
    /// Check attributes destined for a new record of `resource_type`
    fn validate(
        &self,
        resource_type: &str,
        attributes: &Map<String, Value>,
    ) -> Result<(), ValidationErrors>;
}

impl<F> Validator for F
where
    F: Fn(&str, &Map<String, Value>) -> Result<(), ValidationErrors> + Send + Sync,
{
    fn validate(
        &self,
        resource_type: &str,
        attributes: &Map<String, Value>,
    ) -> Result<(), ValidationErrors> {
        self(resource_type, attributes)
    }
}

/// Validator that accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _: &str, _: &Map<String, Value>) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Rejects attribute maps missing any of the listed fields, or holding `null`
#[derive(Debug, Clone, Default)]
pub struct RequiredAttributes {
    fields: Vec<String>,
}

impl RequiredAttributes {
    /// Require the given fields
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for RequiredAttributes {
    fn validate(&self, _: &str, attributes: &Map<String, Value>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for field in &self.fields {
            if attributes.get(field).map_or(true, Value::is_null) {
                errors.add(field.clone(), format!("The {} field is required.", field));
            }
        }
        errors.into_result()
    }
}
