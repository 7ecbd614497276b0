// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ExecMatrix`] — the two-tier unconditional/by-event Exec collection
//! (spec.md §2 item 3, §4.3).

use crate::config::ExecSpec;
use crate::error::ExecError;
use crate::exec::{Exec, ExitCodeSet};
use std::collections::HashMap;

/// Unconditional Execs plus a mapping from event name to an ordered list of
/// Execs that run only for that event.
#[derive(Debug, Default, Clone)]
pub struct ExecMatrix {
    unconditional: Vec<Exec>,
    by_event: HashMap<String, Vec<Exec>>,
}

impl ExecMatrix {
    /// Build a matrix from parsed specs, applying `transform` (macro
    /// substitution) to every argv token.
    ///
    /// Append-only: a spec whose `on` lists an event already seen appends
    /// its line-Execs to that event's list rather than replacing it
    /// (spec.md §9 open question 1).
    pub fn build<F>(specs: &[ExecSpec], mut transform: F) -> Result<Self, ExecError>
    where
        F: FnMut(&str) -> String,
    {
        let mut unconditional = Vec::new();
        let mut by_event: HashMap<String, Vec<Exec>> = HashMap::new();

        for spec in specs {
            let mut line_execs = Vec::with_capacity(spec.lines.len());
            for line in &spec.lines {
                let argv = line.argv.iter().map(|a| transform(a)).collect();
                let ec = ExitCodeSet::parse(line.ec.as_deref().unwrap_or("0"))?;
                line_execs.push(Exec::new(argv, ec));
            }

            match &spec.on {
                None => unconditional.extend(line_execs),
                Some(events) => {
                    for event in events {
                        by_event
                            .entry(event.clone())
                            .or_default()
                            .extend(line_execs.clone());
                    }
                }
            }
        }

        Ok(Self {
            unconditional,
            by_event,
        })
    }

    /// Run all unconditional Execs in declaration order, then all Execs
    /// registered for `event` in declaration order.
    pub fn run(&self, event: &str) -> Result<(), ExecError> {
        for exec in &self.unconditional {
            exec.run()?;
        }
        if let Some(execs) = self.by_event.get(event) {
            for exec in execs {
                exec.run()?;
            }
        }
        Ok(())
    }

    /// Run only the unconditional Execs, skipping every per-event list
    /// entirely. Used where the ground truth runs a matrix with no event
    /// (`evt=None` in `__main__.py`), e.g. the per-volume exec matrix run
    /// during attach (spec.md §4.5).
    pub fn run_unconditional(&self) -> Result<(), ExecError> {
        for exec in &self.unconditional {
            exec.run()?;
        }
        Ok(())
    }

    pub fn unconditional(&self) -> &[Exec] {
        &self.unconditional
    }

    pub fn for_event(&self, event: &str) -> &[Exec] {
        self.by_event.get(event).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
#[path = "exec_matrix_tests.rs"]
mod tests;
