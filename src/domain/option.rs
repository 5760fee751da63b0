use std::sync::Arc;

use super::action::GroundedAction;
use crate::error::Result;
use crate::state::OOState;

/// Capability interface of a temporally-extended action.
///
/// An option runs its own one-step selection until its termination test fires. Planners
/// never branch on concrete option types, only on these three queries.
pub trait OptionPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Initiation set membership.
    fn can_initiate(&self, state: &OOState) -> bool;

    /// The primitive action the option takes in `state`.
    fn select_action(&self, state: &OOState) -> Result<GroundedAction>;

    /// Probability of terminating on arrival in `state`.
    fn termination_probability(&self, state: &OOState) -> f64;
}

type Initiation = Arc<dyn Fn(&OOState) -> bool + Send + Sync>;
type Selection = Arc<dyn Fn(&OOState) -> Result<GroundedAction> + Send + Sync>;
type Termination = Arc<dyn Fn(&OOState) -> f64 + Send + Sync>;

/// Option assembled from closures, for domains that do not need a dedicated type.
#[derive(Clone)]
pub struct ClosureOption {
    name: String,
    initiation: Initiation,
    selection: Selection,
    termination: Termination,
}

impl ClosureOption {
    pub fn new(
        name: impl Into<String>,
        initiation: impl Fn(&OOState) -> bool + Send + Sync + 'static,
        selection: impl Fn(&OOState) -> Result<GroundedAction> + Send + Sync + 'static,
        termination: impl Fn(&OOState) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            initiation: Arc::new(initiation),
            selection: Arc::new(selection),
            termination: Arc::new(termination),
        }
    }
}

impl OptionPolicy for ClosureOption {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_initiate(&self, state: &OOState) -> bool {
        (self.initiation)(state)
    }

    fn select_action(&self, state: &OOState) -> Result<GroundedAction> {
        (self.selection)(state)
    }

    fn termination_probability(&self, state: &OOState) -> f64 {
        (self.termination)(state)
    }
}
