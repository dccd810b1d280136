//! Line-oriented host for the calculator engine.
//!
//! A [`Session`] owns one [`CalculatorEngine`] for its whole lifetime. Each
//! input line is either a command (`copy`, `tape`, `quit`) or a run of key
//! labels that is tokenized and fed to the engine in order.

use crate::calculator::{
    CalculatorEngine, Phase, Readout, Symbol, copy_readout, group_thousands, tokenize,
};
use crate::config::{Config, DisplayConfig};
use crate::error::{Result, SymbolError};
use serde::Serialize;
use std::collections::VecDeque;
use std::str::FromStr;
use tracing::{debug, warn};

/// A parsed input line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Keys(Vec<Symbol>),
    Copy,
    Tape,
    Quit,
}

impl FromStr for Command {
    type Err = SymbolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        match line.trim().to_lowercase().as_str() {
            "copy" => Ok(Self::Copy),
            "tape" => Ok(Self::Tape),
            "quit" | "exit" => Ok(Self::Quit),
            _ => tokenize(line).map(Self::Keys),
        }
    }
}

/// A completed calculation kept on the tape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TapeEntry {
    pub trace: String,
    pub result: String,
}

/// What the host should show after a line was handled.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Readout(Readout),
    Tape(Vec<TapeEntry>),
    Copied(String),
    Quit,
}

pub struct Session {
    engine: CalculatorEngine,
    config: Config,
    tape: VecDeque<TapeEntry>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            engine: CalculatorEngine::new(),
            config,
            tape: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &CalculatorEngine {
        &self.engine
    }

    pub fn tape(&self) -> impl Iterator<Item = &TapeEntry> {
        self.tape.iter()
    }

    /// Handle one input line.
    ///
    /// A line with an unknown key is rejected as a whole; the engine is
    /// left untouched.
    pub fn handle_line(&mut self, line: &str) -> Result<Response> {
        let command = line.parse::<Command>().inspect_err(|err| {
            warn!("Rejected input line {:?}: {}", line, err);
        })?;

        match command {
            Command::Keys(symbols) => Ok(Response::Readout(self.feed(symbols))),
            Command::Copy => {
                let readout = self.engine.readout();
                copy_readout(&readout)?;
                Ok(Response::Copied(readout.display))
            }
            Command::Tape => Ok(Response::Tape(self.tape.iter().cloned().collect())),
            Command::Quit => Ok(Response::Quit),
        }
    }

    /// Feed symbols to the engine in order and return the final readout.
    pub fn feed(&mut self, symbols: impl IntoIterator<Item = Symbol>) -> Readout {
        let mut readout = self.engine.readout();
        for symbol in symbols {
            let before = self.engine.phase();
            readout = self.engine.apply(symbol);
            if symbol == Symbol::Equals
                && before != Phase::ResultShown
                && self.engine.phase() == Phase::ResultShown
            {
                self.record(&readout);
            }
        }
        readout
    }

    fn record(&mut self, readout: &Readout) {
        debug!(trace = %readout.trace, result = %readout.display, "calculation completed");

        if self.config.clipboard.auto_copy
            && let Err(err) = copy_readout(readout)
        {
            warn!("Auto-copy failed: {}", err);
        }

        let limit = self.config.tape.limit;
        if limit == 0 {
            return;
        }
        while self.tape.len() >= limit {
            self.tape.pop_front();
        }
        self.tape.push_back(TapeEntry {
            trace: readout.trace.clone(),
            result: readout.display.clone(),
        });
    }

    pub fn render(&self, readout: &Readout) -> String {
        render_readout(readout, &self.config.display)
    }
}

/// Format the display value for presentation.
pub fn display_value(readout: &Readout, display: &DisplayConfig) -> String {
    if readout.is_error() {
        display.error_label.clone()
    } else if display.thousands_separators {
        group_thousands(&readout.display)
    } else {
        readout.display.clone()
    }
}

/// Render a readout as text: the trace (if any) above the display value.
pub fn render_readout(readout: &Readout, display: &DisplayConfig) -> String {
    let value = display_value(readout, display);
    if display.show_trace && !readout.trace.is_empty() {
        format!("{}\n{}", readout.trace, value)
    } else {
        value
    }
}
