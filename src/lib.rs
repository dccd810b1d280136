//! keycalc: a pocket calculator engine driven by discrete key presses.
//!
//! The [`calculator`] module holds the engine itself; [`session`] is a thin
//! line-oriented host around it used by the `keycalc` binary.

pub mod calculator;
pub mod config;
pub mod error;
pub mod session;

pub use calculator::{CalculatorEngine, Readout, Symbol};
pub use config::Config;
pub use error::{Error, Result};
pub use session::Session;
