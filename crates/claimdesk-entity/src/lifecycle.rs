//! Status transition rules shared by tickets and tasks.
//!
//! A transition request is identified by `(entity id, target status)` and
//! is idempotent: asking for the status an entity already has is a
//! successful no-op. Targets outside the status domain never get this far,
//! they fail to parse with a validation error.

use std::fmt;
use std::str::FromStr;

use claimdesk_core::{AppError, AppResult};

pub use claimdesk_core::config::TransitionPolicy;

/// A status type with a directed transition graph.
pub trait Lifecycle: Copy + Eq + fmt::Display + FromStr<Err = AppError> {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    /// Whether the graph has an edge from `self` to `next`.
    fn can_transition_to(self, next: Self) -> bool;

    /// Whether no edge leaves this status.
    fn is_terminal(self) -> bool;
}

/// What applying a transition request would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome<S> {
    /// The entity already has the target status.
    Unchanged(S),
    /// The status changes from `from` to `to`.
    Apply {
        /// Current status.
        from: S,
        /// Requested status.
        to: S,
    },
}

impl<S: Copy> TransitionOutcome<S> {
    /// Status the entity ends up in.
    pub fn target(&self) -> S {
        match *self {
            Self::Unchanged(s) => s,
            Self::Apply { to, .. } => to,
        }
    }

    /// Whether a write to the backend is needed.
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Apply { .. })
    }
}

/// Decide whether moving from `current` to `target` is allowed.
pub fn plan_transition<S: Lifecycle>(
    current: S,
    target: S,
    policy: TransitionPolicy,
) -> AppResult<TransitionOutcome<S>> {
    if current == target {
        return Ok(TransitionOutcome::Unchanged(current));
    }

    if policy == TransitionPolicy::Strict && !current.can_transition_to(target) {
        let reason = if current.is_terminal() {
            format!("{} status '{current}' is terminal", S::ENTITY)
        } else {
            format!(
                "{} cannot move from '{current}' to '{target}'",
                S::ENTITY
            )
        };
        return Err(AppError::validation(reason));
    }

    Ok(TransitionOutcome::Apply {
        from: current,
        to: target,
    })
}

/// Parse a raw target status and plan the transition.
pub fn plan_transition_str<S: Lifecycle>(
    current: S,
    raw_target: &str,
    policy: TransitionPolicy,
) -> AppResult<TransitionOutcome<S>> {
    let target = raw_target.parse::<S>()?;
    plan_transition(current, target, policy)
}
