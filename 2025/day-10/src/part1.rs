use miette::*;

use crate::aggregate::tally;
use crate::error::Goal;
use crate::parser::parse_machines;
use crate::reachability::fewest_toggle_presses;

#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let machines = parse_machines(input)?;

    let total_presses = tally(&machines, fewest_toggle_presses).into_total(Goal::Indicators)?;

    Ok(total_presses.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() -> Result<()> {
        let input = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";
        assert_eq!("7", process(input)?);
        Ok(())
    }

    #[test]
    fn combined_button_wins() -> Result<()> {
        assert_eq!("1", process("[##] (0) (1) (0,1) {1,1}")?);
        Ok(())
    }

    #[test]
    fn unreachable_machine_fails_the_run() {
        let input = "[#] (0) {1}\n[#..] (0,1) (1,2) {1,1,1}";
        let err = process(input).unwrap_err();
        assert!(err.to_string().contains("machines [2]"), "{err}");
    }

    #[test]
    fn empty_input_is_zero() -> Result<()> {
        assert_eq!("0", process("")?);
        Ok(())
    }
}
