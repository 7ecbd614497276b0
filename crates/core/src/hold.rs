// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ResourceHold`] and [`TransientResourceManager`] — scoped transactional
//! cleanup around externally visible side effects (spec.md §2 item 4, §4.1).
//!
//! Rust has no context-manager `__exit__`, so the exit contract in spec.md
//! §4.1 is modeled as the free function [`run_scoped`], called by the
//! caller once the fallible body inside the scope has produced its
//! `Result`. The manager itself never holds a reference to its parent
//! (spec.md §9 "cyclic parent/child transaction managers": a non-owning
//! handle, parent outlives child by lexical nesting) — the caller passes
//! the parent in explicitly at the single point where the scope ends.
//!
//! Commit and rollback are `async` because the holds that matter in
//! practice (volume attachments, Route 53 changesets) undo themselves with
//! cloud API calls; nothing else in this crate touches the network, but
//! pretending these two methods are synchronous would just push a
//! `block_on` into every real implementation instead.

use async_trait::async_trait;

use crate::error::HoldError;

/// An object representing responsibility to either commit (finalize) or
/// roll back (undo) one externally visible side effect.
#[async_trait]
pub trait ResourceHold: Send {
    async fn commit(&mut self) -> Result<(), HoldError>;
    async fn rollback(&mut self) -> Result<(), HoldError>;
}

/// Ordered stack of holds, with a `critical` flag controlling the exit
/// contract (spec.md §4.1).
pub struct TransientResourceManager {
    holds: Vec<Box<dyn ResourceHold>>,
    critical: bool,
}

impl TransientResourceManager {
    pub fn new(critical: bool) -> Self {
        Self {
            holds: Vec::new(),
            critical,
        }
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    pub fn is_empty(&self) -> bool {
        self.holds.is_empty()
    }

    pub fn push(&mut self, hold: Box<dyn ResourceHold>) {
        self.holds.push(hold);
    }

    pub fn push_many(&mut self, holds: Vec<Box<dyn ResourceHold>>) {
        self.holds.extend(holds);
    }

    /// Commit every held resource in push order, clearing the stack.
    pub async fn commit(&mut self) {
        for mut hold in self.holds.drain(..) {
            if let Err(e) = hold.commit().await {
                tracing::warn!(error = %e, "resource hold commit failed");
            }
        }
    }

    /// Roll back every held resource in LIFO order. Each rollback is
    /// attempted even if an earlier one failed; failures are logged, never
    /// propagated (spec.md §4.1: "rollback is best-effort").
    pub async fn rollback(&mut self) {
        while let Some(mut hold) = self.holds.pop() {
            if let Err(e) = hold.rollback().await {
                tracing::warn!(error = %e, "resource hold rollback failed");
            }
        }
    }

    /// Append every held resource onto `parent` in the same order and clear
    /// self.
    pub fn move_to(&mut self, parent: &mut TransientResourceManager) {
        parent.holds.append(&mut self.holds);
    }
}

/// Outcome of [`run_scoped`]: whether the error was re-raised to the
/// caller or swallowed by a non-critical manager.
pub enum ScopedOutcome<T, E> {
    /// The body succeeded (holds committed or moved to the parent).
    Ok(T),
    /// The body failed and the manager re-raises (critical, or no parent to
    /// swallow into).
    Raised(E),
    /// The body failed but this non-critical manager swallowed it after
    /// rolling back locally (any holds accumulated by children before the
    /// failure were still moved to the parent, if one exists).
    Swallowed,
}

/// Apply the TransientResourceManager exit contract (spec.md §4.1) to the
/// result of the fallible body that ran inside `mgr`'s scope.
pub async fn run_scoped<T, E>(
    mgr: &mut TransientResourceManager,
    parent: Option<&mut TransientResourceManager>,
    result: Result<T, E>,
) -> ScopedOutcome<T, E> {
    match (result, parent) {
        (Ok(v), Some(parent)) => {
            mgr.move_to(parent);
            ScopedOutcome::Ok(v)
        }
        (Ok(v), None) => {
            mgr.commit().await;
            ScopedOutcome::Ok(v)
        }
        (Err(e), Some(parent)) if mgr.critical() => {
            mgr.move_to(parent);
            ScopedOutcome::Raised(e)
        }
        (Err(e), None) if mgr.critical() => {
            mgr.rollback().await;
            ScopedOutcome::Raised(e)
        }
        (Err(_), Some(parent)) => {
            mgr.rollback().await;
            mgr.move_to(parent);
            ScopedOutcome::Swallowed
        }
        (Err(_), None) => {
            mgr.rollback().await;
            ScopedOutcome::Swallowed
        }
    }
}

#[cfg(test)]
#[path = "hold_tests.rs"]
mod tests;
