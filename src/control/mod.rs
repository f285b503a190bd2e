//! Charge / power arbitration and indicator policy.

pub mod indicators;
pub mod mode;
