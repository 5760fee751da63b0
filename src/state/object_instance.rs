use std::sync::Arc;

use super::attribute::Value;
use super::object_class::ObjectClass;
use crate::error::{PlanningError, Result};

/// A named record whose values follow its class schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInstance {
    name: String,
    class: Arc<ObjectClass>,
    values: Vec<Value>,
}

impl ObjectInstance {
    /// Creates an instance with every attribute at its type's default.
    pub fn new(name: impl Into<String>, class: Arc<ObjectClass>) -> Self {
        let values = class
            .attributes()
            .iter()
            .map(|a| a.kind.default_value())
            .collect();
        Self {
            name: name.into(),
            class,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &Arc<ObjectClass> {
        &self.class
    }

    pub fn class_name(&self) -> &str {
        &self.class.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, attribute: &str) -> Result<&Value> {
        let index = self.index_of(attribute)?;
        Ok(&self.values[index])
    }

    /// Reads a discrete attribute, failing on unknown names or other types.
    pub fn discrete(&self, attribute: &str) -> Result<i64> {
        self.value(attribute)?
            .as_discrete()
            .ok_or_else(|| self.mismatch(attribute, "discrete"))
    }

    pub fn real(&self, attribute: &str) -> Result<f64> {
        self.value(attribute)?
            .as_real()
            .ok_or_else(|| self.mismatch(attribute, "real"))
    }

    pub fn set_value(&mut self, attribute: &str, value: impl Into<Value>) -> Result<()> {
        let index = self.index_of(attribute)?;
        let value = value.into();
        let expected = self.class.attributes()[index].kind;
        if value.kind() != expected {
            return Err(self.mismatch(attribute, expected.label()));
        }
        self.values[index] = value;
        Ok(())
    }

    pub fn with_value(mut self, attribute: &str, value: impl Into<Value>) -> Result<Self> {
        self.set_value(attribute, value)?;
        Ok(self)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    fn index_of(&self, attribute: &str) -> Result<usize> {
        self.class
            .attribute_index(attribute)
            .ok_or_else(|| PlanningError::UnknownAttribute {
                class: self.class.name.clone(),
                attribute: attribute.to_string(),
            })
    }

    fn mismatch(&self, attribute: &str, expected: &'static str) -> PlanningError {
        PlanningError::TypeMismatch {
            class: self.class.name.clone(),
            attribute: attribute.to_string(),
            expected,
        }
    }
}
