//! Rent-a-car library exports

pub mod cli;
pub mod core;

#[cfg(test)]
pub mod test_support;
