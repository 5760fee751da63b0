use std::sync::Arc;

use super::attribute::{Attribute, AttributeType};

/// Schema shared by every instance of one kind of object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectClass {
    pub name: String,
    attributes: Vec<Attribute>,
}

impl ObjectClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style attribute declaration. Redeclaring a name replaces its type.
    pub fn with_attribute(mut self, name: impl Into<String>, kind: AttributeType) -> Self {
        let attribute = Attribute::new(name, kind);
        match self.attributes.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
        self
    }

    pub fn build(self) -> Arc<ObjectClass> {
        Arc::new(self)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }
}
