pub mod aggregate;
pub mod error;
pub mod linear;
pub mod machine;
pub mod parser;
pub mod part1;
pub mod part2;
pub mod reachability;
