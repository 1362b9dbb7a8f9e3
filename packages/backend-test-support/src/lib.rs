//! Backend test support utilities
//!
//! Shared helpers for the shed backend test suites: unified logging
//! initialization and assertions over problem-details error bodies.

pub mod problem_details;
pub mod test_logging;
