//! Error types shared by every planner in the crate.

/// Errors raised while defining a domain, planning over it, or querying a planner.
#[derive(Debug, thiserror::Error)]
pub enum PlanningError {
    /// The hashing mode cannot canonicalize this attribute.
    #[error("attribute {class}.{attribute} cannot be hashed: {reason}")]
    UnsupportedAttribute {
        class: String,
        attribute: String,
        reason: &'static str,
    },

    /// A value does not match the attribute type declared by its class.
    #[error("attribute {class}.{attribute} expects a {expected} value")]
    TypeMismatch {
        class: String,
        attribute: String,
        expected: &'static str,
    },

    #[error("class {class} has no attribute {attribute}")]
    UnknownAttribute { class: String, attribute: String },

    #[error("an object named {0} already exists in this state")]
    DuplicateObject(String),

    #[error("no object named {0} in this state")]
    UnknownObject(String),

    /// A primitive transition distribution does not sum to one.
    #[error("transition probabilities for {action} sum to {sum}, expected 1.0")]
    InvalidDistribution { action: String, sum: f64 },

    /// Forward search needs exactly one outcome per action.
    #[error("action {action} produced {outcomes} outcomes in a deterministic planner")]
    NonDeterministicTransition { action: String, outcomes: usize },

    #[error("option {option} selected another option as its one-step action")]
    NestedOption { option: String },

    /// The goal could not be reached from the start state.
    #[error("{planner} failed to reach the goal after {expansions} expansions")]
    PlanningFailed {
        planner: &'static str,
        expansions: usize,
    },

    #[error("state has not been indexed by this planner")]
    StateNotIndexed,

    #[error("no cached transitions for action {action} in this state")]
    NoCachedTransitions { action: String },

    #[error("no plan has been cached for this state")]
    NoCachedPlan,

    /// A policy was asked to act in a state where nothing is applicable.
    #[error("no action is available in this state")]
    NoApplicableActions,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl PlanningError {
    /// True when the error reports an unreachable goal rather than a malformed query.
    pub fn is_planning_failure(&self) -> bool {
        matches!(self, PlanningError::PlanningFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, PlanningError>;
