use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use super::{ActionProb, Policy};
use crate::error::Result;
use crate::hashing::{HashableState, StateHashFactory};
use crate::state::OOState;

/// Memoizes another policy's action distributions per state.
///
/// The memo belongs to this wrapper; the wrapped policy and whatever planner it reads are
/// never touched beyond their read-only queries. States that are equal under the hashing
/// factory share an entry, with action parameters renamed to the caller's objects.
pub struct CachedPolicy<P: Policy> {
    inner: P,
    factory: Arc<dyn StateHashFactory>,
    memo: RefCell<HashMap<HashableState, Vec<ActionProb>>>,
}

impl<P: Policy> CachedPolicy<P> {
    pub fn new(inner: P, factory: Arc<dyn StateHashFactory>) -> Self {
        Self {
            inner,
            factory,
            memo: RefCell::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.memo.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.memo.borrow_mut().clear();
    }
}

impl<P: Policy> Policy for CachedPolicy<P> {
    fn action_distribution(&self, state: &OOState) -> Result<Vec<ActionProb>> {
        let hashed = self.factory.hash_state(state.clone())?;

        if let Some((stored, distribution)) = self.memo.borrow().get_key_value(&hashed) {
            if stored.same_bindings(&hashed) {
                return Ok(distribution.clone());
            }
            let Some(mapping) = stored.object_matching(&hashed) else {
                return Ok(distribution.clone());
            };
            return Ok(distribution
                .iter()
                .map(|p| ActionProb::new(p.action.translate(&mapping), p.probability))
                .collect());
        }

        let distribution = self.inner.action_distribution(state)?;
        self.memo
            .borrow_mut()
            .insert(hashed, distribution.clone());
        Ok(distribution)
    }

    fn is_stochastic(&self) -> bool {
        self.inner.is_stochastic()
    }

    fn is_defined_for(&self, state: &OOState) -> bool {
        self.inner.is_defined_for(state)
    }
}
