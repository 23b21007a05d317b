use rayon::prelude::*;

use crate::error::{Goal, UnsolvedMachines};
use crate::machine::Machine;

/// Per-run outcome: the summed presses of every solved machine, plus the
/// machines the solver gave up on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub total: usize,
    /// Zero-based indices, ascending.
    pub unsolved: Vec<usize>,
}

impl Tally {
    pub fn is_complete(&self) -> bool {
        self.unsolved.is_empty()
    }

    /// The total, provided every machine was solved.
    pub fn into_total(self, goal: Goal) -> Result<usize, UnsolvedMachines> {
        if self.is_complete() {
            return Ok(self.total);
        }
        Err(UnsolvedMachines {
            goal,
            machines: self.unsolved.into_iter().map(|i| i + 1).collect(),
        })
    }
}

/// Solves every machine independently and sums the press counts.
///
/// Machines run in parallel; each solve owns its own search state. A `None`
/// from the solver is recorded in [`Tally::unsolved`] and never added.
pub fn tally<F>(machines: &[Machine], solve: F) -> Tally
where
    F: Fn(&Machine) -> Option<usize> + Sync,
{
    let results: Vec<Option<usize>> = machines.par_iter().map(&solve).collect();

    results
        .into_iter()
        .enumerate()
        .fold(Tally::default(), |mut tally, (i, result)| {
            match result {
                Some(presses) => tally.total += presses,
                None => {
                    tracing::warn!(machine = %machines[i], "machine has no solution");
                    tally.unsolved.push(i);
                }
            }
            tally
        })
}
