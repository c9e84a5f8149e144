pub use raffle::*;
pub use treasury::*;

pub mod raffle;
pub mod treasury;

#[cfg(test)]
pub(crate) use raffle::tests;
