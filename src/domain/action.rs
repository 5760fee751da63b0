use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::option::OptionPolicy;
use crate::state::OOState;

/// Whether a grounded action is a single primitive step or a temporally-extended option.
#[derive(Clone)]
pub enum ActionKind {
    Primitive,
    Option(Arc<dyn OptionPolicy>),
}

/// An action template bound to concrete object parameters.
///
/// Equality and hashing ignore the order of parameters that share an order group, so
/// `stack(a, b)` equals `stack(b, a)` when both positions are in the same group.
#[derive(Clone)]
pub struct GroundedAction {
    name: Arc<str>,
    params: Vec<String>,
    order_groups: Arc<[usize]>,
    kind: ActionKind,
}

impl GroundedAction {
    /// A parameterless primitive action.
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            params: Vec::new(),
            order_groups: Arc::from([]),
            kind: ActionKind::Primitive,
        }
    }

    /// A primitive action whose parameters are each in their own order group.
    pub fn with_params(name: &str, params: Vec<String>) -> Self {
        let groups: Vec<usize> = (0..params.len()).collect();
        Self::grouped(Arc::from(name), params, Arc::from(groups))
    }

    pub(crate) fn grouped(name: Arc<str>, params: Vec<String>, order_groups: Arc<[usize]>) -> Self {
        Self {
            name,
            params,
            order_groups,
            kind: ActionKind::Primitive,
        }
    }

    pub(crate) fn for_option(option: Arc<dyn OptionPolicy>) -> Self {
        Self {
            name: Arc::from(option.name()),
            params: Vec::new(),
            order_groups: Arc::from([]),
            kind: ActionKind::Option(option),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn is_option(&self) -> bool {
        matches!(self.kind, ActionKind::Option(_))
    }

    pub fn is_parameterized(&self) -> bool {
        !self.params.is_empty()
    }

    /// Renames parameters through `mapping`; unmapped parameters are kept.
    pub fn translate(&self, mapping: &HashMap<String, String>) -> GroundedAction {
        let mut translated = self.clone();
        for param in translated.params.iter_mut() {
            if let Some(renamed) = mapping.get(param.as_str()) {
                *param = renamed.clone();
            }
        }
        translated
    }

    fn group_of(&self, position: usize) -> usize {
        self.order_groups.get(position).copied().unwrap_or(position)
    }

    /// Parameters ordered by (group, name), the form compared by `Eq`.
    fn canonical_params(&self) -> Vec<(usize, &str)> {
        let mut keyed: Vec<(usize, &str)> = self
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| (self.group_of(i), p.as_str()))
            .collect();
        keyed.sort();
        keyed
    }
}

impl PartialEq for GroundedAction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.params.len() == other.params.len()
            && self.canonical_params() == other.canonical_params()
    }
}

impl Eq for GroundedAction {}

impl Hash for GroundedAction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.canonical_params().hash(state);
    }
}

impl fmt::Display for GroundedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}({})", self.name, self.params.join(", "))
        }
    }
}

impl fmt::Debug for GroundedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_option() {
            write!(f, "option:{}", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// A primitive action template that can enumerate its groundings in a state.
pub trait ActionType: Send + Sync {
    fn name(&self) -> &str;

    fn is_parameterized(&self) -> bool {
        false
    }

    fn applicable_actions(&self, state: &OOState) -> Vec<GroundedAction>;
}

type StatePrecondition = Arc<dyn Fn(&OOState) -> bool + Send + Sync>;
type ParamPrecondition = Arc<dyn Fn(&OOState, &[String]) -> bool + Send + Sync>;

/// Parameterless action, optionally guarded by a precondition.
#[derive(Clone)]
pub struct SimpleAction {
    name: String,
    precondition: Option<StatePrecondition>,
}

impl SimpleAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            precondition: None,
        }
    }

    pub fn with_precondition(
        mut self,
        precondition: impl Fn(&OOState) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.precondition = Some(Arc::new(precondition));
        self
    }
}

impl ActionType for SimpleAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn applicable_actions(&self, state: &OOState) -> Vec<GroundedAction> {
        match &self.precondition {
            Some(pre) if !pre(state) => Vec::new(),
            _ => vec![GroundedAction::new(&self.name)],
        }
    }
}

/// Action whose parameters are objects of declared classes.
///
/// Positions sharing an order group are interchangeable; only one grounding per
/// group permutation is produced.
#[derive(Clone)]
pub struct ObjectParameterizedAction {
    name: Arc<str>,
    parameter_classes: Vec<String>,
    order_groups: Arc<[usize]>,
    precondition: Option<ParamPrecondition>,
}

impl ObjectParameterizedAction {
    pub fn new(name: &str, parameter_classes: &[&str]) -> Self {
        let groups: Vec<usize> = (0..parameter_classes.len()).collect();
        Self {
            name: Arc::from(name),
            parameter_classes: parameter_classes.iter().map(|c| c.to_string()).collect(),
            order_groups: Arc::from(groups),
            precondition: None,
        }
    }

    /// Declares the order group of each parameter position.
    pub fn with_order_groups(mut self, groups: &[usize]) -> Self {
        self.order_groups = Arc::from(groups.to_vec());
        self
    }

    pub fn with_precondition(
        mut self,
        precondition: impl Fn(&OOState, &[String]) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.precondition = Some(Arc::new(precondition));
        self
    }

    fn bindings(&self, state: &OOState) -> Vec<Vec<String>> {
        let mut bindings: Vec<Vec<String>> = vec![Vec::new()];
        for class in &self.parameter_classes {
            let candidates: Vec<&str> = state.objects_of_class(class).map(|o| o.name()).collect();
            bindings = bindings
                .into_iter()
                .flat_map(|partial| {
                    candidates
                        .iter()
                        .filter(|c| !partial.iter().any(|p| p == *c))
                        .map(|c| {
                            let mut next = partial.clone();
                            next.push(c.to_string());
                            next
                        })
                        .collect::<Vec<_>>()
                })
                .collect();
        }
        bindings
    }
}

impl ActionType for ObjectParameterizedAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_parameterized(&self) -> bool {
        !self.parameter_classes.is_empty()
    }

    fn applicable_actions(&self, state: &OOState) -> Vec<GroundedAction> {
        let mut seen = HashSet::new();
        let mut actions = Vec::new();
        for params in self.bindings(state) {
            if let Some(pre) = &self.precondition {
                if !pre(state, &params) {
                    continue;
                }
            }
            let action =
                GroundedAction::grouped(self.name.clone(), params, self.order_groups.clone());
            if seen.insert(action.clone()) {
                actions.push(action);
            }
        }
        actions
    }
}

/// An entry of a domain's action set.
#[derive(Clone)]
pub enum Action {
    Primitive(Arc<dyn ActionType>),
    Option(Arc<dyn OptionPolicy>),
}

impl Action {
    pub fn primitive(action: impl ActionType + 'static) -> Self {
        Action::Primitive(Arc::new(action))
    }

    pub fn option(option: impl OptionPolicy + 'static) -> Self {
        Action::Option(Arc::new(option))
    }

    pub fn name(&self) -> &str {
        match self {
            Action::Primitive(a) => a.name(),
            Action::Option(o) => o.name(),
        }
    }

    pub fn is_parameterized(&self) -> bool {
        match self {
            Action::Primitive(a) => a.is_parameterized(),
            Action::Option(_) => false,
        }
    }

    pub fn applicable_actions(&self, state: &OOState) -> Vec<GroundedAction> {
        match self {
            Action::Primitive(a) => a.applicable_actions(state),
            Action::Option(o) if o.can_initiate(state) => {
                vec![GroundedAction::for_option(o.clone())]
            }
            Action::Option(_) => Vec::new(),
        }
    }
}
