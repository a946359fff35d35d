//! Per-user wizard progress: the live step plus a LIFO history of the steps
//! the user came through.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use shared::domain::UserId;
use tracing::debug;

/// Step vocabulary of one wizard family.
pub trait WizardFlow {
    type Mode: Copy + PartialEq + fmt::Debug + Send + Sync;
    type Step: Clone + fmt::Debug + Send + Sync;

    fn first_step(mode: Self::Mode) -> Self::Step;

    /// Whether `step` belongs to the step graph of `mode`.
    fn is_legal(mode: Self::Mode, step: &Self::Step) -> bool;
}

#[derive(Debug)]
pub struct Session<F: WizardFlow> {
    pub user_id: UserId,
    pub mode: F::Mode,
    pub current: F::Step,
    pub stack: Vec<F::Step>,
    pub touched_at: DateTime<Utc>,
}

impl<F: WizardFlow> Clone for Session<F> {
    fn clone(&self) -> Self {
        Self {
            user_id: self.user_id,
            mode: self.mode,
            current: self.current.clone(),
            stack: self.stack.clone(),
            touched_at: self.touched_at,
        }
    }
}

impl<F: WizardFlow> Session<F> {
    pub fn can_go_back(&self) -> bool {
        !self.stack.is_empty()
    }
}

/// In-memory session map keyed by user. Only `start`, `set_step`, `go_back`
/// and `end` change a session.
pub struct SessionStore<F: WizardFlow> {
    sessions: DashMap<UserId, Session<F>>,
}

impl<F: WizardFlow> Default for SessionStore<F> {
    fn default() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }
}

impl<F: WizardFlow> SessionStore<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or overwrites the user's session at the mode's first step.
    pub fn start(&self, user_id: UserId, mode: F::Mode) -> Session<F> {
        let session = Session {
            user_id,
            mode,
            current: F::first_step(mode),
            stack: Vec::new(),
            touched_at: Utc::now(),
        };
        self.sessions.insert(user_id, session.clone());
        session
    }

    pub fn get(&self, user_id: UserId) -> Option<Session<F>> {
        self.sessions.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Replaces the current step, pushing the old one when `push_current`.
    /// Returns `None` without touching anything when the user has no session
    /// or the step is not part of the session's mode.
    pub fn set_step(
        &self,
        user_id: UserId,
        step: F::Step,
        push_current: bool,
    ) -> Option<Session<F>> {
        let mut entry = self.sessions.get_mut(&user_id)?;
        if !F::is_legal(entry.mode, &step) {
            debug!(
                user_id = %user_id,
                mode = ?entry.mode,
                step = ?step,
                "rejected step outside session mode"
            );
            return None;
        }
        let previous = std::mem::replace(&mut entry.current, step);
        if push_current {
            entry.stack.push(previous);
        }
        entry.touched_at = Utc::now();
        Some(entry.value().clone())
    }

    /// Pops the last visited step into `current`, or falls back to the mode's
    /// first step when the history is empty.
    pub fn go_back(&self, user_id: UserId) -> Option<Session<F>> {
        let mut entry = self.sessions.get_mut(&user_id)?;
        let previous = match entry.stack.pop() {
            Some(step) => step,
            None => F::first_step(entry.mode),
        };
        entry.current = previous;
        entry.touched_at = Utc::now();
        Some(entry.value().clone())
    }

    pub fn end(&self, user_id: UserId) -> Option<Session<F>> {
        self.sessions.remove(&user_id).map(|(_, session)| session)
    }

    /// Drops sessions untouched for longer than `ttl`; returns how many went.
    pub fn sweep_idle(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, session| {
            let keep = now.signed_duration_since(session.touched_at) <= ttl;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
