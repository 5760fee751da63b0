use super::{ActionProb, Policy};
use crate::error::{PlanningError, Result};
use crate::planners::{QProvider, QValue};
use crate::state::OOState;

const TIE_TOLERANCE: f64 = 1e-9;

fn max_q(qs: &[QValue]) -> f64 {
    qs.iter().map(|q| q.q).fold(f64::NEG_INFINITY, f64::max)
}

fn is_max(q: &QValue, best: f64) -> bool {
    (q.q - best).abs() <= TIE_TOLERANCE
}

fn non_empty_q<Q: QProvider + ?Sized>(provider: &Q, state: &OOState) -> Result<Vec<QValue>> {
    let qs = provider.q_values(state)?;
    if qs.is_empty() {
        return Err(PlanningError::NoApplicableActions);
    }
    Ok(qs)
}

fn defined_for<Q: QProvider + ?Sized>(provider: &Q, state: &OOState) -> bool {
    provider.q_values(state).is_ok_and(|qs| !qs.is_empty())
}

/// Uniform over the actions with maximal Q.
pub struct GreedyQPolicy<'a, Q: QProvider + ?Sized> {
    provider: &'a Q,
}

impl<'a, Q: QProvider + ?Sized> GreedyQPolicy<'a, Q> {
    pub fn new(provider: &'a Q) -> Self {
        Self { provider }
    }
}

impl<Q: QProvider + ?Sized> Policy for GreedyQPolicy<'_, Q> {
    fn action_distribution(&self, state: &OOState) -> Result<Vec<ActionProb>> {
        let qs = non_empty_q(self.provider, state)?;
        let best = max_q(&qs);
        let ties: Vec<QValue> = qs.into_iter().filter(|q| is_max(q, best)).collect();
        let p = 1.0 / ties.len() as f64;
        Ok(ties
            .into_iter()
            .map(|q| ActionProb::new(q.action, p))
            .collect())
    }

    fn is_stochastic(&self) -> bool {
        true
    }

    fn is_defined_for(&self, state: &OOState) -> bool {
        defined_for(self.provider, state)
    }
}

/// The first action, in applicable-action order, with maximal Q.
pub struct GreedyDeterministicQPolicy<'a, Q: QProvider + ?Sized> {
    provider: &'a Q,
}

impl<'a, Q: QProvider + ?Sized> GreedyDeterministicQPolicy<'a, Q> {
    pub fn new(provider: &'a Q) -> Self {
        Self { provider }
    }
}

impl<Q: QProvider + ?Sized> Policy for GreedyDeterministicQPolicy<'_, Q> {
    fn action_distribution(&self, state: &OOState) -> Result<Vec<ActionProb>> {
        let qs = non_empty_q(self.provider, state)?;
        let best = max_q(&qs);
        let chosen = qs
            .into_iter()
            .find(|q| is_max(q, best))
            .ok_or(PlanningError::NoApplicableActions)?;
        Ok(vec![ActionProb::new(chosen.action, 1.0)])
    }

    fn is_stochastic(&self) -> bool {
        false
    }

    fn is_defined_for(&self, state: &OOState) -> bool {
        defined_for(self.provider, state)
    }
}

/// Spreads `epsilon` uniformly over all actions and the rest over the maximal ones.
pub struct EpsilonGreedy<'a, Q: QProvider + ?Sized> {
    provider: &'a Q,
    epsilon: f64,
}

impl<'a, Q: QProvider + ?Sized> EpsilonGreedy<'a, Q> {
    pub fn new(provider: &'a Q, epsilon: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(PlanningError::InvalidParameter(format!(
                "epsilon must lie in [0, 1], got {}",
                epsilon
            )));
        }
        Ok(Self { provider, epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl<Q: QProvider + ?Sized> Policy for EpsilonGreedy<'_, Q> {
    fn action_distribution(&self, state: &OOState) -> Result<Vec<ActionProb>> {
        let qs = non_empty_q(self.provider, state)?;
        let best = max_q(&qs);
        let n = qs.len() as f64;
        let ties = qs.iter().filter(|q| is_max(q, best)).count() as f64;
        Ok(qs
            .into_iter()
            .map(|q| {
                let mut p = self.epsilon / n;
                if is_max(&q, best) {
                    p += (1.0 - self.epsilon) / ties;
                }
                ActionProb::new(q.action, p)
            })
            .collect())
    }

    fn is_stochastic(&self) -> bool {
        true
    }

    fn is_defined_for(&self, state: &OOState) -> bool {
        defined_for(self.provider, state)
    }
}

/// Soft-max over Q-values: `p(a) ∝ exp(Q(s, a) / temperature)`.
pub struct BoltzmannQPolicy<'a, Q: QProvider + ?Sized> {
    provider: &'a Q,
    temperature: f64,
}

impl<'a, Q: QProvider + ?Sized> BoltzmannQPolicy<'a, Q> {
    pub fn new(provider: &'a Q, temperature: f64) -> Result<Self> {
        if temperature <= 0.0 || !temperature.is_finite() {
            return Err(PlanningError::InvalidParameter(format!(
                "temperature must be positive, got {}",
                temperature
            )));
        }
        Ok(Self {
            provider,
            temperature,
        })
    }
}

impl<Q: QProvider + ?Sized> Policy for BoltzmannQPolicy<'_, Q> {
    fn action_distribution(&self, state: &OOState) -> Result<Vec<ActionProb>> {
        let qs = non_empty_q(self.provider, state)?;
        // Shift by the maximum so the largest exponent is zero.
        let best = max_q(&qs);
        let weights: Vec<f64> = qs
            .iter()
            .map(|q| ((q.q - best) / self.temperature).exp())
            .collect();
        let total: f64 = weights.iter().sum();
        Ok(qs
            .into_iter()
            .zip(weights)
            .map(|(q, w)| ActionProb::new(q.action, w / total))
            .collect())
    }

    fn is_stochastic(&self) -> bool {
        true
    }

    fn is_defined_for(&self, state: &OOState) -> bool {
        defined_for(self.provider, state)
    }
}
