use nalgebra::DMatrix;

use crate::machine::Machine;

// -----------------------------------------------------------------------------
// Constants & Configuration
// -----------------------------------------------------------------------------

/// Highest press count tried for any single free button.
pub const DEFAULT_MAX_PRESSES: usize = 500;

/// Numerical epsilon for zero and integrality comparisons.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Bounds for the free-variable search.
///
/// The search is exhaustive only up to `max_presses` per free button. An
/// optimum needing a free button pressed more often than that is missed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchLimits {
    pub max_presses: usize,
    pub epsilon: f64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_presses: DEFAULT_MAX_PRESSES,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

/// Press count per button, in button order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub presses: Vec<usize>,
    pub total: usize,
}

// -----------------------------------------------------------------------------
// Elimination
// -----------------------------------------------------------------------------

/// Augmented matrix `[A | b]` with one row per joltage counter and one column
/// per button, reduced in place to Reduced Row Echelon Form.
struct ReducedSystem {
    matrix: DMatrix<f64>,
    num_vars: usize,
    /// `pivots[r]` is the column whose pivot sits in row `r`.
    pivots: Vec<usize>,
    /// Columns without a pivot, ascending.
    free_vars: Vec<usize>,
}

impl ReducedSystem {
    fn new(machine: &Machine) -> Self {
        let num_eqs = machine.joltages().len();
        let num_vars = machine.buttons().len();

        let mut matrix = DMatrix::<f64>::zeros(num_eqs, num_vars + 1);
        for (c, button) in machine.buttons().iter().enumerate() {
            // Counters past the requirement list have nothing to satisfy
            for r in button.slots().take_while(|&r| r < num_eqs) {
                matrix[(r, c)] = 1.0;
            }
        }
        for (r, &joltage) in machine.joltages().iter().enumerate() {
            matrix[(r, num_vars)] = f64::from(joltage);
        }

        Self {
            matrix,
            num_vars,
            pivots: Vec::new(),
            free_vars: Vec::new(),
        }
    }

    /// Gauss-Jordan elimination with partial pivoting.
    ///
    /// Returns `false` when a row reduces to `0 = c` with `c != 0`.
    fn rref(&mut self, epsilon: f64) -> bool {
        let num_eqs = self.matrix.nrows();
        let rhs = self.num_vars;
        let mut pivot_row = 0;

        for c in 0..self.num_vars {
            if pivot_row >= num_eqs {
                self.free_vars.push(c);
                continue;
            }

            // Largest magnitude among rows without a pivot yet; topmost wins ties
            let (best_row, best_abs) = (pivot_row..num_eqs)
                .map(|r| (r, self.matrix[(r, c)].abs()))
                .fold((pivot_row, 0.0), |best, cand| {
                    if cand.1 > best.1 {
                        cand
                    } else {
                        best
                    }
                });

            if best_abs < epsilon {
                self.free_vars.push(c);
                continue;
            }

            self.matrix.swap_rows(pivot_row, best_row);

            // Normalize pivot row
            let pivot = self.matrix[(pivot_row, c)];
            for j in 0..=rhs {
                self.matrix[(pivot_row, j)] /= pivot;
            }

            // Eliminate above and below
            for r in 0..num_eqs {
                if r == pivot_row {
                    continue;
                }
                let factor = self.matrix[(r, c)];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..=rhs {
                    let v = self.matrix[(pivot_row, j)];
                    self.matrix[(r, j)] -= factor * v;
                }
                self.matrix[(r, c)] = 0.0;
            }

            self.pivots.push(c);
            pivot_row += 1;
        }

        (pivot_row..num_eqs).all(|r| self.matrix[(r, rhs)].abs() <= epsilon)
    }

    /// Fills in the pivot variables for one assignment of the free ones and
    /// keeps the result only if every press count is a non-negative integer
    /// that reproduces the requirements exactly.
    fn complete(&self, machine: &Machine, free_values: &[usize], epsilon: f64) -> Option<Solution> {
        debug_assert_eq!(free_values.len(), self.free_vars.len());

        let mut x = vec![0.0; self.num_vars];
        for (&f, &v) in self.free_vars.iter().zip(free_values) {
            x[f] = v as f64;
        }

        // Other pivot columns are zero in this row, only free columns contribute
        for (r, &p) in self.pivots.iter().enumerate() {
            let value = self
                .free_vars
                .iter()
                .fold(self.matrix[(r, self.num_vars)], |acc, &f| {
                    acc - self.matrix[(r, f)] * x[f]
                });
            x[p] = value;
        }

        let presses = x
            .iter()
            .map(|&v| {
                let rounded = v.round();
                (v >= -epsilon && (v - rounded).abs() <= epsilon).then_some(rounded as usize)
            })
            .collect::<Option<Vec<usize>>>()?;

        if !satisfies(machine, &presses) {
            return None;
        }

        let total = presses.iter().sum();
        Some(Solution { presses, total })
    }
}

/// Integer check of `A·x = b`.
fn satisfies(machine: &Machine, presses: &[usize]) -> bool {
    machine
        .joltages()
        .iter()
        .enumerate()
        .all(|(channel, &required)| {
            let reached: u64 = machine
                .buttons()
                .iter()
                .zip(presses)
                .filter(|(button, _)| button.contains(channel))
                .map(|(_, &n)| n as u64)
                .sum();
            reached == u64::from(required)
        })
}

/// A button can't be pressed more often than its smallest counter needs.
/// A button feeding no counter is never worth pressing.
fn press_cap(machine: &Machine, column: usize, limits: &SearchLimits) -> usize {
    let joltages = machine.joltages();
    machine.buttons()[column]
        .slots()
        .take_while(|&ch| ch < joltages.len())
        .map(|ch| joltages[ch] as usize)
        .min()
        .map_or(0, |need| need.min(limits.max_presses))
}

// -----------------------------------------------------------------------------
// Branch & Bound over free variables
// -----------------------------------------------------------------------------

struct BranchAndBound<'a> {
    system: &'a ReducedSystem,
    machine: &'a Machine,
    epsilon: f64,
    /// Inclusive upper bound per free variable.
    caps: Vec<usize>,
    /// Current value per free variable; slots at and past the current depth are stale.
    assignment: Vec<usize>,
    best: Option<Solution>,
}

impl<'a> BranchAndBound<'a> {
    fn new(
        system: &'a ReducedSystem,
        machine: &'a Machine,
        caps: Vec<usize>,
        epsilon: f64,
    ) -> Self {
        Self {
            system,
            machine,
            epsilon,
            assignment: vec![0; caps.len()],
            caps,
            best: None,
        }
    }

    fn descend(&mut self, depth: usize, partial: usize) {
        if depth == self.assignment.len() {
            self.evaluate();
            return;
        }

        for value in 0..=self.caps[depth] {
            let sum = partial + value;
            // Press counts are non-negative, larger values only cost more
            if self.best.as_ref().is_some_and(|best| sum >= best.total) {
                break;
            }
            self.assignment[depth] = value;
            self.descend(depth + 1, sum);
        }
    }

    fn evaluate(&mut self) {
        let Some(candidate) = self
            .system
            .complete(self.machine, &self.assignment, self.epsilon)
        else {
            return;
        };

        if self
            .best
            .as_ref()
            .map_or(true, |best| candidate.total < best.total)
        {
            tracing::trace!(total = candidate.total, "improved joltage solution");
            self.best = Some(candidate);
        }
    }
}

// -----------------------------------------------------------------------------
// Entry points
// -----------------------------------------------------------------------------

/// Cheapest non-negative integer press vector `x` with `A·x = b`, where
/// `A[i][j]` is 1 when button `j` feeds counter `i` and `b` holds the joltage
/// requirements.
///
/// Reduces `[A | b]` to RREF, then enumerates the free buttons depth-first in
/// column order (each within its cap), solving the pivot buttons for every
/// complete assignment. Returns `None` if the system is inconsistent or no
/// assignment within `limits` yields a valid press vector.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(buttons = machine.buttons().len(), counters = machine.joltages().len())
)]
pub fn min_joltage_solution(machine: &Machine, limits: &SearchLimits) -> Option<Solution> {
    let mut system = ReducedSystem::new(machine);
    if !system.rref(limits.epsilon) {
        tracing::debug!("joltage system is inconsistent");
        return None;
    }

    tracing::debug!(
        pivots = system.pivots.len(),
        free = system.free_vars.len(),
        "reduced joltage system"
    );

    let caps = system
        .free_vars
        .iter()
        .map(|&c| press_cap(machine, c, limits))
        .collect();

    let mut search = BranchAndBound::new(&system, machine, caps, limits.epsilon);
    search.descend(0, 0);
    search.best
}

/// Fewest total presses meeting the joltage requirements, with default limits.
pub fn fewest_joltage_presses(machine: &Machine) -> Option<usize> {
    min_joltage_solution(machine, &SearchLimits::default()).map(|s| s.total)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::machine::Mask;
    use miette::Result;
    use rstest::rstest;

    #[rstest]
    #[case("[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}", Some(10))]
    #[case("[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}", Some(12))]
    #[case("[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}", Some(11))]
    #[case("[#] (0) {5}", Some(5))]
    #[case("[#] (0) (0) {10}", Some(10))]
    #[case("[##] (0) (1) (0,1) {8,8}", Some(8))]
    #[case("[##] (0,1) {1,2}", None)]
    #[case("[##] (0) {1,1}", None)]
    #[case("[##] (0) {1,0}", Some(1))]
    #[case("[#] (0) {0}", Some(0))]
    fn fewest_presses(#[case] line: &str, #[case] expected: Option<usize>) -> Result<()> {
        let machine: Machine = line.parse()?;
        assert_eq!(fewest_joltage_presses(&machine), expected);
        Ok(())
    }

    #[rstest]
    #[case("[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}")]
    #[case("[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}")]
    #[case("[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}")]
    #[case("[...] (0,1) (1,2) (0,2) (0,1,2) {6,9,7}")]
    fn solution_reproduces_requirements(#[case] line: &str) -> Result<()> {
        let machine: Machine = line.parse()?;
        let solution = min_joltage_solution(&machine, &SearchLimits::default())
            .ok_or_else(|| miette::miette!("no solution for {line}"))?;

        assert_eq!(solution.presses.len(), machine.buttons().len());
        assert_eq!(solution.total, solution.presses.iter().sum::<usize>());
        for (channel, &required) in machine.joltages().iter().enumerate() {
            let reached: usize = machine
                .buttons()
                .iter()
                .zip(&solution.presses)
                .filter(|(button, _)| button.contains(channel))
                .map(|(_, &n)| n)
                .sum();
            assert_eq!(reached, required as usize, "counter {channel}");
        }
        Ok(())
    }

    #[test]
    fn duplicate_buttons_prefer_first_found() -> Result<()> {
        let machine: Machine = "[#] (0) (0) {10}".parse()?;
        let solution = min_joltage_solution(&machine, &SearchLimits::default());
        assert_eq!(
            solution,
            Some(Solution {
                presses: vec![10, 0],
                total: 10
            })
        );
        Ok(())
    }

    #[test]
    fn ceiling_limits_free_buttons() -> Result<()> {
        // Optimum presses the shared (0,1) button 8 times, which is a free column
        let machine: Machine = "[##] (0) (1) (0,1) {8,8}".parse()?;

        let tight = SearchLimits {
            max_presses: 3,
            ..SearchLimits::default()
        };
        let solution = min_joltage_solution(&machine, &tight).map(|s| s.total);
        assert_eq!(solution, Some(13));

        let loose = SearchLimits::default();
        assert_eq!(min_joltage_solution(&machine, &loose).map(|s| s.total), Some(8));
        Ok(())
    }

    #[test]
    fn degenerate_machines() {
        let empty = Machine::new(0, Mask::EMPTY, vec![], vec![]);
        assert_eq!(fewest_joltage_presses(&empty), Some(0));

        let no_buttons = Machine::new(2, Mask::EMPTY, vec![], vec![3, 0]);
        assert_eq!(fewest_joltage_presses(&no_buttons), None);

        let no_requirements = Machine::new(2, Mask::EMPTY, vec![Mask::from_slots([0, 1])], vec![]);
        assert_eq!(fewest_joltage_presses(&no_requirements), Some(0));
    }

    #[test]
    fn ignores_counters_without_requirement() -> Result<()> {
        // Slot 2 has no requirement entry, so (1,2) only feeds counter 1
        let machine: Machine = "[...] (0) (1,2) {2,3}".parse()?;
        assert_eq!(fewest_joltage_presses(&machine), Some(5));
        Ok(())
    }

    #[test]
    fn repeated_calls_agree() -> Result<()> {
        let machine: Machine = "[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}".parse()?;
        let first = min_joltage_solution(&machine, &SearchLimits::default());
        for _ in 0..3 {
            assert_eq!(min_joltage_solution(&machine, &SearchLimits::default()), first);
        }
        Ok(())
    }
}
