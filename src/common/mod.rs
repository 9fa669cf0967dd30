//! Common, shared types.

pub mod clock;
pub mod state;
pub mod tags;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
