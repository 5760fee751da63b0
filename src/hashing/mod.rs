//! State canonicalization: hashable states and the factories that build them.

mod canonical;
mod factory;
mod hashable_state;

pub use canonical::Discretization;
pub use factory::{HashableStateFactory, StateHashFactory};
pub use hashable_state::HashableState;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanningError;
    use crate::state::{AttributeType, OOState, ObjectClass, ObjectInstance, Value};
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    fn classes() -> (Arc<ObjectClass>, Arc<ObjectClass>) {
        let block = ObjectClass::new("block")
            .with_attribute("height", AttributeType::Discrete)
            .with_attribute("color", AttributeType::String)
            .build();
        let robot = ObjectClass::new("robot")
            .with_attribute("x", AttributeType::Real)
            .build();
        (block, robot)
    }

    fn blocks(names: [&str; 3], robot_name: &str) -> OOState {
        let (block, robot) = classes();
        let layout = [(1i64, "red"), (2, "blue"), (1, "green")];
        let mut state = OOState::new();
        for (name, (h, c)) in names.iter().zip(layout) {
            let obj = ObjectInstance::new(*name, block.clone())
                .with_value("height", h)
                .unwrap()
                .with_value("color", c)
                .unwrap();
            state.add_object(obj).unwrap();
        }
        state
            .add_object(
                ObjectInstance::new(robot_name, robot)
                    .with_value("x", 0.4)
                    .unwrap(),
            )
            .unwrap();
        state
    }

    #[test]
    fn test_identifier_independent_permutation_invariance() {
        let factory = HashableStateFactory::identifier_independent();
        let original = factory.hash_state(blocks(["a", "b", "c"], "r")).unwrap();

        for names in [["c", "a", "b"], ["b", "c", "a"], ["x", "y", "z"]] {
            let permuted = factory.hash_state(blocks(names, "bot")).unwrap();
            assert_eq!(original.hash_code(), permuted.hash_code());
            assert_eq!(original, permuted);
        }

        let mut set = HashSet::new();
        set.insert(original.clone());
        assert!(set.contains(&factory.hash_state(blocks(["q", "w", "e"], "r2")).unwrap()));
    }

    #[test]
    fn test_identifier_independent_detects_value_change() {
        let factory = HashableStateFactory::identifier_independent();
        let a = factory.hash_state(blocks(["a", "b", "c"], "r")).unwrap();

        let mut changed = blocks(["a", "b", "c"], "r");
        changed.object_mut("b").unwrap().set_value("height", 5).unwrap();
        let b = factory.hash_state(changed).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_identifier_dependent_distinguishes_names() {
        let factory = HashableStateFactory::identifier_dependent();
        let a = factory.hash_state(blocks(["a", "b", "c"], "r")).unwrap();
        let same = factory.hash_state(blocks(["a", "b", "c"], "r")).unwrap();
        let renamed = factory.hash_state(blocks(["b", "a", "c"], "r")).unwrap();
        assert_eq!(a, same);
        assert_ne!(a, renamed);
    }

    #[test]
    fn test_relational_attribute_requires_identifier_dependence() {
        let class = ObjectClass::new("block")
            .with_attribute("on", AttributeType::Relational)
            .build();
        let a = ObjectInstance::new("a", class.clone());
        let b = ObjectInstance::new("b", class)
            .with_value("on", Value::Relational(Some("a".to_string())))
            .unwrap();
        let state = OOState::from_objects([a, b]).unwrap();

        let err = HashableStateFactory::identifier_independent()
            .hash_state(state.clone())
            .unwrap_err();
        assert!(matches!(err, PlanningError::UnsupportedAttribute { .. }));

        assert!(
            HashableStateFactory::identifier_dependent()
                .hash_state(state)
                .is_ok()
        );
    }

    #[test]
    fn test_discretization_buckets() {
        let factory = HashableStateFactory::identifier_independent()
            .with_discretization(Discretization::uniform(0.5).unwrap());
        let robot = ObjectClass::new("robot")
            .with_attribute("x", AttributeType::Real)
            .build();
        let at = |x: f64| {
            OOState::from_objects([ObjectInstance::new("r", robot.clone())
                .with_value("x", x)
                .unwrap()])
            .unwrap()
        };

        let low = factory.hash_state(at(1.05)).unwrap();
        let high = factory.hash_state(at(1.45)).unwrap();
        let next = factory.hash_state(at(1.55)).unwrap();
        assert_eq!(low, high);
        assert_ne!(high, next);
    }

    #[test]
    fn test_discretization_attribute_override() {
        let discretization = Discretization::uniform(10.0)
            .unwrap()
            .with_attribute("height", 2.0)
            .unwrap();
        let factory =
            HashableStateFactory::identifier_independent().with_discretization(discretization);
        let class = ObjectClass::new("tower")
            .with_attribute("height", AttributeType::Discrete)
            .build();
        let at = |h: i64| {
            OOState::from_objects([ObjectInstance::new("t", class.clone())
                .with_value("height", h)
                .unwrap()])
            .unwrap()
        };
        assert_eq!(
            factory.hash_state(at(4)).unwrap(),
            factory.hash_state(at(5)).unwrap()
        );
        assert_ne!(
            factory.hash_state(at(5)).unwrap(),
            factory.hash_state(at(6)).unwrap()
        );
        assert!(Discretization::uniform(0.0).is_err());
    }

    #[test]
    fn test_object_matching_pairs_equal_values() {
        let factory = HashableStateFactory::identifier_independent();
        let a = factory.hash_state(blocks(["a", "b", "c"], "r")).unwrap();
        let b = factory.hash_state(blocks(["x", "y", "z"], "bot")).unwrap();

        let matching = a.object_matching(&b).unwrap();
        let expected: HashMap<String, String> =
            [("a", "x"), ("b", "y"), ("c", "z"), ("r", "bot")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
        assert_eq!(matching, expected);
        assert!(!a.same_bindings(&b));
    }

    #[test]
    fn test_swapped_objects_need_renaming() {
        let factory = HashableStateFactory::identifier_independent();
        let a = factory.hash_state(blocks(["a", "b", "c"], "r")).unwrap();
        let swapped = factory.hash_state(blocks(["c", "b", "a"], "r")).unwrap();

        assert_eq!(a, swapped);
        assert!(!a.same_bindings(&swapped));
        let matching = a.object_matching(&swapped).unwrap();
        assert_eq!(matching["a"], "c");
        assert_eq!(matching["c"], "a");
        assert_eq!(matching["b"], "b");
        assert!(a.same_bindings(&factory.hash_state(blocks(["a", "b", "c"], "r")).unwrap()));
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        let factory = HashableStateFactory::identifier_independent();
        let robot = ObjectClass::new("robot")
            .with_attribute("x", AttributeType::Real)
            .build();
        let at = |x: f64| {
            OOState::from_objects([ObjectInstance::new("r", robot.clone())
                .with_value("x", x)
                .unwrap()])
            .unwrap()
        };
        assert_eq!(
            factory.hash_state(at(0.0)).unwrap(),
            factory.hash_state(at(-0.0)).unwrap()
        );
    }
}
