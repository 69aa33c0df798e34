//! Open vSwitch ODL agent CLI
//!
//! Entry point for orchestration hooks (`dispatch`) and for operators who
//! need to run a single step by hand.

pub mod commands;
pub mod context;
