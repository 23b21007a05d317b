use chumsky::prelude::*;
use itertools::Itertools;
use miette::{miette, Result};

use crate::machine::{Machine, Mask, MAX_SLOTS};

/// Parses one machine per line:
///
/// ```text
/// [.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
/// ```
///
/// Number tokens that fail to parse (or name a slot past [`MAX_SLOTS`]) are
/// dropped instead of failing the whole input.
pub fn parser<'a>() -> impl Parser<'a, &'a str, Vec<Machine>, extra::Err<Rich<'a, char>>> {
    // Custom whitespace parser that excludes newlines
    let hspace = one_of(" \t").repeated();

    // [.##.]
    let diagram = none_of("]\r\n")
        .repeated()
        .collect::<Vec<char>>()
        .delimited_by(just('['), just(']'))
        .try_map(|lights, span| {
            if lights.len() > MAX_SLOTS {
                return Err(Rich::custom(
                    span,
                    format!(
                        "diagram has {} lights, at most {MAX_SLOTS} are supported",
                        lights.len()
                    ),
                ));
            }
            let target = Mask::from_slots(lights.iter().positions(|&c| c == '#'));
            Ok((lights.len(), target))
        });

    // Comma separated tokens, each stopping at any char in `stop`.
    // Unparseable tokens become `None`.
    let numbers = |stop: &'static str| {
        none_of(stop)
            .repeated()
            .to_slice()
            .map(|token: &str| token.trim().parse::<u32>().ok())
            .separated_by(just(','))
            .collect::<Vec<Option<u32>>>()
    };

    // (0,2,3)
    let button = numbers("),\r\n")
        .delimited_by(just('('), just(')'))
        .map(|slots| Mask::from_slots(slots.into_iter().flatten().map(|s| s as usize)));

    // {3,5,4,7}
    let joltages = numbers("},\r\n")
        .delimited_by(just('{'), just('}'))
        .map(|values| values.into_iter().flatten().collect::<Vec<u32>>());

    let machine = diagram
        .then_ignore(hspace.clone())
        .then(button.padded_by(hspace.clone()).repeated().collect::<Vec<_>>())
        .then(joltages.or_not().then_ignore(hspace))
        .map(|(((lights, target), buttons), joltages)| {
            Machine::new(lights, target, buttons, joltages.unwrap_or_default())
        });

    machine
        .separated_by(text::newline().repeated().at_least(1))
        .allow_leading()
        .allow_trailing()
        .collect()
}

/// Parses the whole puzzle input into machines.
#[tracing::instrument(skip(input))]
pub fn parse_machines(input: &str) -> Result<Vec<Machine>> {
    let machines = parser()
        .parse(input)
        .into_result()
        .map_err(|e| miette!("Parse failed: {:?}", e))?;

    tracing::debug!(machines = machines.len(), "parsed input");
    Ok(machines)
}
