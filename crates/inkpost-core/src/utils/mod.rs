//! Utility functions for display formatting and form input checks.

pub mod format;
pub mod input;

pub use format::{excerpt, format_date, format_remaining, truncate_string};
pub use input::looks_like_email;
