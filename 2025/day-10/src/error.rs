use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Which of the two machine readings a run solves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Toggle the indicator lights into the diagram pattern.
    Indicators,
    /// Count joltage up to the requirement vector.
    Joltage,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Indicators => f.write_str("indicator lights"),
            Goal::Joltage => f.write_str("joltage requirements"),
        }
    }
}

/// Some machines have no press sequence for the goal, so there is no
/// meaningful total.
#[derive(Debug, Error, Diagnostic)]
#[error("{} machine(s) cannot meet their {goal}: machines {machines:?}", .machines.len())]
#[diagnostic(
    code(button_machines::unsolved),
    help("machines are numbered from 1 in input order; check their buttons against the target")
)]
pub struct UnsolvedMachines {
    pub goal: Goal,
    /// 1-based machine numbers.
    pub machines: Vec<usize>,
}
