//! Shared utilities for tally.

pub mod format;
pub mod logging;
pub mod time;

pub use format::{format_amount, DEFAULT_DECIMALS};
pub use logging::{init_logging, LogFormat};
pub use time::format_duration;
