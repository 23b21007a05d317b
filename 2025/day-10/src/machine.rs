use bitvec::prelude::*;
use itertools::Itertools;
use miette::{miette, Result};
use std::fmt;
use std::ops::{BitXor, BitXorAssign};
use std::str::FromStr;

/// Number of slots a [`Mask`] can address.
pub const MAX_SLOTS: usize = u32::BITS as usize;

/// Fixed-width set of slot indices, one bit per slot (bit `i` is slot `i`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mask(u32);

impl Mask {
    pub const EMPTY: Mask = Mask(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Builds a mask from slot indices. Indices outside `0..MAX_SLOTS` are ignored.
    pub fn from_slots<I: IntoIterator<Item = usize>>(slots: I) -> Self {
        let mut bits = 0u32;
        let view = bits.view_bits_mut::<Lsb0>();
        for slot in slots.into_iter().filter(|&s| s < MAX_SLOTS) {
            view.set(slot, true);
        }
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, slot: usize) -> bool {
        slot < MAX_SLOTS && self.0.view_bits::<Lsb0>()[slot]
    }

    /// Set slots in ascending order.
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.view_bits::<Lsb0>().iter_ones()
    }

    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitXor for Mask {
    type Output = Mask;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Mask(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for Mask {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

/// One factory machine: an indicator light pattern, its buttons and the
/// joltage each counter must reach.
///
/// The same slot numbering serves both readings of a button: the lights it
/// toggles and the joltage counters it bumps by one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    /// Width of the indicator diagram, only used for rendering.
    lights: usize,
    target: Mask,
    buttons: Vec<Mask>,
    joltages: Vec<u32>,
}

impl Machine {
    pub fn new(lights: usize, target: Mask, buttons: Vec<Mask>, joltages: Vec<u32>) -> Self {
        Self {
            lights,
            target,
            buttons,
            joltages,
        }
    }

    pub fn lights(&self) -> usize {
        self.lights
    }

    pub fn target(&self) -> Mask {
        self.target
    }

    pub fn buttons(&self) -> &[Mask] {
        &self.buttons
    }

    pub fn joltages(&self) -> &[u32] {
        &self.joltages
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diagram: String = (0..self.lights)
            .map(|i| if self.target.contains(i) { '#' } else { '.' })
            .collect();
        write!(f, "[{diagram}]")?;
        for button in &self.buttons {
            write!(f, " ({})", button.slots().join(","))?;
        }
        write!(f, " {{{}}}", self.joltages.iter().join(","))
    }
}

impl FromStr for Machine {
    type Err = miette::Report;

    fn from_str(line: &str) -> Result<Self> {
        let mut machines = crate::parser::parse_machines(line)?;
        match machines.len() {
            1 => Ok(machines.remove(0)),
            n => Err(miette!("Expected exactly one machine, found {n}")),
        }
    }
}
