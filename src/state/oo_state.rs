use std::collections::{BTreeMap, HashMap};

use super::object_instance::ObjectInstance;
use crate::error::{PlanningError, Result};

/// An unordered collection of uniquely named object instances.
///
/// Objects are kept in name order so iteration is deterministic; equality here is
/// structural (names included). Name-independent comparison is the job of
/// [`crate::hashing::HashableState`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OOState {
    objects: BTreeMap<String, ObjectInstance>,
}

impl OOState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: impl IntoIterator<Item = ObjectInstance>) -> Result<Self> {
        let mut state = Self::new();
        for object in objects {
            state.add_object(object)?;
        }
        Ok(state)
    }

    pub fn add_object(&mut self, object: ObjectInstance) -> Result<()> {
        if self.objects.contains_key(object.name()) {
            return Err(PlanningError::DuplicateObject(object.name().to_string()));
        }
        self.objects.insert(object.name().to_string(), object);
        Ok(())
    }

    pub fn remove_object(&mut self, name: &str) -> Result<ObjectInstance> {
        self.objects
            .remove(name)
            .ok_or_else(|| PlanningError::UnknownObject(name.to_string()))
    }

    pub fn object(&self, name: &str) -> Result<&ObjectInstance> {
        self.objects
            .get(name)
            .ok_or_else(|| PlanningError::UnknownObject(name.to_string()))
    }

    pub fn object_mut(&mut self, name: &str) -> Result<&mut ObjectInstance> {
        self.objects
            .get_mut(name)
            .ok_or_else(|| PlanningError::UnknownObject(name.to_string()))
    }

    pub fn objects(&self) -> impl Iterator<Item = &ObjectInstance> {
        self.objects.values()
    }

    pub fn objects_of_class<'a, 'c>(
        &'a self,
        class: &'c str,
    ) -> impl Iterator<Item = &'a ObjectInstance> + use<'a, 'c> {
        self.objects.values().filter(move |o| o.class_name() == class)
    }

    /// First object of `class` in name order, the usual accessor for singleton classes.
    pub fn first_of_class(&self, class: &str) -> Result<&ObjectInstance> {
        self.objects
            .values()
            .find(|o| o.class_name() == class)
            .ok_or_else(|| PlanningError::UnknownObject(format!("<any {}>", class)))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Applies a name permutation. Names missing from `mapping` are kept, and relational
    /// references are rewritten along with the objects they point at.
    pub fn renamed(&self, mapping: &HashMap<String, String>) -> Result<Self> {
        let mut renamed = Self::new();
        for object in self.objects.values() {
            let mut copy = object.clone();
            if let Some(new_name) = mapping.get(object.name()) {
                copy.set_name(new_name.clone());
            }
            for value in copy.values_mut() {
                value.rename_references(|target| mapping.get(target).cloned());
            }
            renamed.add_object(copy)?;
        }
        Ok(renamed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AttributeType, ObjectClass, Value};

    fn block_class() -> std::sync::Arc<ObjectClass> {
        ObjectClass::new("block")
            .with_attribute("height", AttributeType::Discrete)
            .with_attribute("on", AttributeType::Relational)
            .build()
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let class = block_class();
        let mut state = OOState::new();
        state.add_object(ObjectInstance::new("a", class.clone())).unwrap();
        let err = state.add_object(ObjectInstance::new("a", class)).unwrap_err();
        assert!(matches!(err, PlanningError::DuplicateObject(name) if name == "a"));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut block = ObjectInstance::new("a", block_class());
        assert!(block.set_value("height", 2.5).is_err());
        assert!(block.set_value("missing", 1).is_err());
        block.set_value("height", 3).unwrap();
        assert_eq!(block.discrete("height").unwrap(), 3);
    }

    #[test]
    fn test_renamed_rewrites_references() {
        let class = block_class();
        let a = ObjectInstance::new("a", class.clone());
        let b = ObjectInstance::new("b", class)
            .with_value("on", Value::Relational(Some("a".to_string())))
            .unwrap();
        let state = OOState::from_objects([a, b]).unwrap();

        let mapping: HashMap<String, String> = [("a", "x"), ("b", "y")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let renamed = state.renamed(&mapping).unwrap();

        let y = renamed.object("y").unwrap();
        assert_eq!(
            y.value("on").unwrap(),
            &Value::Relational(Some("x".to_string()))
        );
        assert!(renamed.object("a").is_err());
    }

    #[test]
    fn test_remove_object() {
        let class = block_class();
        let mut state = OOState::from_objects([
            ObjectInstance::new("a", class.clone()),
            ObjectInstance::new("b", class),
        ])
        .unwrap();
        assert_eq!(state.remove_object("a").unwrap().name(), "a");
        assert_eq!(state.len(), 1);
        assert!(matches!(
            state.remove_object("a"),
            Err(PlanningError::UnknownObject(_))
        ));
    }

    #[test]
    fn test_class_lookup_outlives_query_string() {
        let table = ObjectClass::new("table").build();
        let state = OOState::from_objects([
            ObjectInstance::new("t", table),
            ObjectInstance::new("b", block_class()),
            ObjectInstance::new("a", block_class()),
        ])
        .unwrap();

        let first = {
            let class = String::from("block");
            state.first_of_class(&class).unwrap()
        };
        assert_eq!(first.name(), "a");

        let blocks: Vec<&ObjectInstance> = {
            let class = String::from("block");
            state.objects_of_class(&class).collect()
        };
        assert_eq!(blocks.len(), 2);
        assert!(matches!(
            state.first_of_class("robot"),
            Err(PlanningError::UnknownObject(_))
        ));
    }
}
