//! Collaborator interfaces: actions, options, transition model, reward, termination.

mod action;
mod model;
mod option;

pub use action::{
    Action, ActionKind, ActionType, GroundedAction, ObjectParameterizedAction, SimpleAction,
};
pub use model::{
    Domain, NullTermination, RewardFunction, StateConditionTest, TerminalFunction,
    TransitionModel, TransitionProbability, sample_index,
};
pub use option::{ClosureOption, OptionPolicy};
