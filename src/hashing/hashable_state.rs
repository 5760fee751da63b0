use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use super::canonical::CanonicalForm;
use crate::state::OOState;

struct Inner {
    state: OOState,
    canonical: CanonicalForm,
    hash: OnceLock<u64>,
}

/// A state paired with its canonical form, usable as a map or set key.
///
/// Clones share the same state and canonical form. The hash code is folded from the
/// canonical form on first use and memoized. Equality compares canonical forms, so two
/// states that differ only in object names are equal under identifier-independent hashing.
#[derive(Clone)]
pub struct HashableState {
    inner: Arc<Inner>,
}

impl HashableState {
    pub(crate) fn new(state: OOState, canonical: CanonicalForm) -> Self {
        Self {
            inner: Arc::new(Inner {
                state,
                canonical,
                hash: OnceLock::new(),
            }),
        }
    }

    pub fn state(&self) -> &OOState {
        &self.inner.state
    }

    pub fn hash_code(&self) -> u64 {
        *self
            .inner
            .hash
            .get_or_init(|| self.inner.canonical.fingerprint())
    }

    /// Maps each object name in `self` to the name of its counterpart in `other`.
    ///
    /// Returns `None` when the states are not equal.
    pub fn object_matching(&self, other: &HashableState) -> Option<HashMap<String, String>> {
        if self != other {
            return None;
        }
        Some(self.inner.canonical.matching(&other.inner.canonical))
    }

    /// True when every object name is bound to the same object in both states.
    ///
    /// Sharing a name set is not enough: swapping two objects' values keeps the names.
    pub fn same_bindings(&self, other: &HashableState) -> bool {
        self.state() == other.state()
    }
}

impl PartialEq for HashableState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.hash_code() == other.hash_code()
                && self.inner.canonical.equivalent(&other.inner.canonical))
    }
}

impl Eq for HashableState {}

impl Hash for HashableState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl fmt::Debug for HashableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashableState")
            .field("hash", &format_args!("{:016x}", self.hash_code()))
            .field("state", &self.inner.state)
            .finish()
    }
}
