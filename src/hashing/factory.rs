use super::canonical::{CanonicalForm, Discretization};
use super::hashable_state::HashableState;
use crate::error::Result;
use crate::state::OOState;

/// Turns states into [`HashableState`] keys under some notion of equivalence.
///
/// Equivalent states must produce equal hash codes and compare equal.
pub trait StateHashFactory: Send + Sync {
    fn hash_state(&self, state: OOState) -> Result<HashableState>;

    /// True when object names are ignored by equality.
    fn object_identifier_independent(&self) -> bool;
}

/// Hashing factory covering identifier-independent, identifier-dependent and
/// discretizing modes.
#[derive(Debug, Clone)]
pub struct HashableStateFactory {
    identifier_independent: bool,
    discretization: Option<Discretization>,
}

impl HashableStateFactory {
    pub fn identifier_independent() -> Self {
        Self {
            identifier_independent: true,
            discretization: None,
        }
    }

    pub fn identifier_dependent() -> Self {
        Self {
            identifier_independent: false,
            discretization: None,
        }
    }

    pub fn with_discretization(mut self, discretization: Discretization) -> Self {
        self.discretization = Some(discretization);
        self
    }
}

impl Default for HashableStateFactory {
    fn default() -> Self {
        Self::identifier_independent()
    }
}

impl StateHashFactory for HashableStateFactory {
    fn hash_state(&self, state: OOState) -> Result<HashableState> {
        let canonical = CanonicalForm::build(
            &state,
            self.identifier_independent,
            self.discretization.as_ref(),
        )?;
        Ok(HashableState::new(state, canonical))
    }

    fn object_identifier_independent(&self) -> bool {
        self.identifier_independent
    }
}
