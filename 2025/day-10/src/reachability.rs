use std::collections::{HashSet, VecDeque};

use crate::machine::{Machine, Mask};

/// Fewest presses needed to turn an all-dark diagram into the machine's
/// target pattern, where each press XORs one button into the lights.
///
/// Breadth-first over light states: every press costs one, so the first time
/// the target is dequeued its press count is minimal. The state space has at
/// most `2^32` nodes and each is expanded once.
///
/// Returns `None` when no combination of buttons produces the target.
#[tracing::instrument(level = "trace", skip_all, fields(buttons = machine.buttons().len()))]
pub fn fewest_toggle_presses(machine: &Machine) -> Option<usize> {
    let target = machine.target();

    let mut visited = HashSet::from([Mask::EMPTY]);
    let mut queue = VecDeque::from([(Mask::EMPTY, 0usize)]);

    while let Some((lights, presses)) = queue.pop_front() {
        if lights == target {
            return Some(presses);
        }

        for &button in machine.buttons() {
            let next = lights ^ button;
            if visited.insert(next) {
                queue.push_back((next, presses + 1));
            }
        }
    }

    tracing::trace!(%machine, "target pattern is unreachable");
    None
}
