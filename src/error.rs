//! Error types for the keycalc library.
//!
//! Calculation failures (division by zero, overflow) are not errors in this
//! sense: the engine records them in its state and keeps running. These types
//! cover the surfaces around the engine.

use std::path::PathBuf;
use thiserror::Error;

/// A raw input line could not be classified into calculator symbols.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("unrecognized input `{0}`")]
    Unrecognized(String),
    #[error("`{0}` is not a decimal digit")]
    NotADigit(char),
    #[error("`{0}` is not an operator (expected one of + − × ÷)")]
    NotAnOperator(String),
}

/// The configuration file exists but could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("failed to access clipboard")]
    Access(#[source] arboard::Error),
    #[error("failed to copy to clipboard")]
    Copy(#[source] arboard::Error),
    #[error("nothing to copy while an error is shown")]
    NothingToCopy,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
