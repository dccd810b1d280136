//! Button-style calculator engine.
//!
//! This module provides functionality to:
//! - Classify key labels into input symbols
//! - Interpret symbols into a running display value and operation trace
//! - Format results for the display
//! - Copy results to the clipboard

mod clipboard;
mod engine;
mod format;
mod symbol;

pub use clipboard::{copy_readout, copy_to_clipboard};
pub use engine::{Buffer, CalcError, CalculatorEngine, ERROR_MARKER, Pending, Phase, Readout};
pub use format::{format_number, group_thousands, parse_numeral, settle};
pub use symbol::{Digit, Operator, Symbol, tokenize};
