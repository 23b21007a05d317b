use miette::*;

use crate::aggregate::tally;
use crate::error::Goal;
use crate::linear::{min_joltage_solution, SearchLimits};
use crate::parser::parse_machines;

#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    process_with_limits(input, SearchLimits::default())
}

/// Same as [`process`], with a custom free-button search ceiling.
#[tracing::instrument(skip(input))]
pub fn process_with_limits(input: &str, limits: SearchLimits) -> Result<String> {
    let machines = parse_machines(input)?;

    let total = tally(&machines, |machine| {
        min_joltage_solution(machine, &limits).map(|solution| solution.total)
    })
    .into_total(Goal::Joltage)?;

    Ok(total.to_string())
}
