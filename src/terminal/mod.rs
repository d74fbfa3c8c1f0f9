//! Terminal management: raw mode guard and screen drawing.

mod raw_mode;
mod screen;

pub use raw_mode::RawModeGuard;
pub use screen::{canvas_budget, compose, fit_to_terminal, present};
