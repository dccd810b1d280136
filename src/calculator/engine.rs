//! The calculator's input interpreter.
//!
//! [`CalculatorEngine`] consumes one [`Symbol`] at a time and keeps two
//! observable strings up to date: the display (the numeral being edited or
//! the last result) and the trace (the expression confirmed so far, e.g.
//! `"12 + 3 ="`). Operators chain strictly left to right with no precedence.

use super::format::{format_number, parse_numeral, settle};
use super::symbol::{Digit, Operator, Symbol};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Shown on the display in place of a numeral after a failed calculation.
pub const ERROR_MARKER: &str = "Error";

/// Why a calculation failed.
///
/// Failures are recorded in the engine state rather than returned to the
/// caller; the session keeps running and the display shows [`ERROR_MARKER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum CalcError {
    #[error("division by zero")]
    DivisionByZero,
    /// The result does not fit in a finite number.
    #[error("result out of range")]
    Overflow,
}

/// Contents of the display buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum Buffer {
    /// A decimal numeral, possibly still being typed (e.g. `"12."`).
    Numeral(String),
    Error(CalcError),
}

impl Buffer {
    fn zero() -> Self {
        Self::Numeral("0".to_string())
    }
}

/// A left operand waiting for its right-hand side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pending {
    pub left: f64,
    pub operator: Operator,
}

/// Where the engine is in building an expression.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// Nothing pending. The next digit starts a fresh numeral.
    Idle,
    /// Digits are being appended to the buffer. `pending` is set when the
    /// buffer is the right-hand operand of an operation.
    EnteringOperand { pending: Option<Pending> },
    /// An operator was just pressed; the buffer still shows its left operand.
    OperatorPending(Pending),
    /// A completed `=` is on display.
    ResultShown,
    /// A failed calculation is on display.
    ErrorShown,
}

/// Snapshot of the two observable outputs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Readout {
    pub display: String,
    pub trace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CalcError>,
}

impl Readout {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Interactive calculator state machine.
///
/// Owned by the host that feeds it input; there is no shared instance.
#[derive(Clone, Debug)]
pub struct CalculatorEngine {
    buffer: Buffer,
    phase: Phase,
    trace: String,
}

impl Default for CalculatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorEngine {
    pub fn new() -> Self {
        Self {
            buffer: Buffer::zero(),
            phase: Phase::Idle,
            trace: String::new(),
        }
    }

    /// Dispatch a symbol to its input operation and return the new outputs.
    pub fn apply(&mut self, symbol: Symbol) -> Readout {
        debug!(?symbol, phase = ?self.phase, "applying symbol");
        match symbol {
            Symbol::Digit(digit) => self.input_digit(digit),
            Symbol::Operator(op) => self.input_operator(op),
            Symbol::Equals => self.input_equals(),
            Symbol::Clear => self.input_clear(),
            Symbol::SignToggle => self.input_sign_toggle(),
            Symbol::Percent => self.input_percent(),
            Symbol::DecimalPoint => self.input_decimal_point(),
        }
        self.readout()
    }

    pub fn input_digit(&mut self, digit: Digit) {
        if let (Phase::EnteringOperand { .. }, Buffer::Numeral(numeral)) =
            (self.phase, &mut self.buffer)
        {
            if *numeral == "0" {
                numeral.clear();
            }
            numeral.push(digit.as_char());
        } else {
            self.start_operand(digit.as_char().to_string());
        }
    }

    pub fn input_decimal_point(&mut self) {
        if let (Phase::EnteringOperand { .. }, Buffer::Numeral(numeral)) =
            (self.phase, &mut self.buffer)
        {
            if !numeral.contains('.') {
                numeral.push('.');
            }
        } else {
            self.start_operand("0.".to_string());
        }
    }

    pub fn input_operator(&mut self, operator: Operator) {
        match self.phase {
            Phase::ErrorShown => {
                debug!(%operator, "operator ignored while an error is shown");
                return;
            }
            Phase::EnteringOperand {
                pending: Some(pending),
            } => {
                // Chained operator: settle the pending operation first.
                if self.calculate(pending).is_err() {
                    return;
                }
            }
            _ => {}
        }

        let Buffer::Numeral(numeral) = &self.buffer else {
            return;
        };
        self.trace = format!("{numeral} {operator}");
        self.phase = Phase::OperatorPending(Pending {
            left: parse_numeral(numeral),
            operator,
        });
    }

    pub fn input_equals(&mut self) {
        let pending = match self.phase {
            Phase::OperatorPending(pending)
            | Phase::EnteringOperand {
                pending: Some(pending),
            } => pending,
            Phase::EnteringOperand { pending: None } => {
                self.phase = Phase::Idle;
                return;
            }
            Phase::Idle | Phase::ResultShown | Phase::ErrorShown => return,
        };

        if let Buffer::Numeral(numeral) = &self.buffer {
            self.trace.push(' ');
            self.trace.push_str(numeral);
            self.trace.push_str(" =");
        }

        if self.calculate(pending).is_ok() {
            self.phase = Phase::ResultShown;
        }
    }

    pub fn input_clear(&mut self) {
        *self = Self::new();
    }

    /// Negate the buffer. A literal `"0"` is left alone.
    pub fn input_sign_toggle(&mut self) {
        if self.display_text() != "0" {
            self.rewrite_numeral(|value| -value);
        }
    }

    /// Divide the buffer by 100.
    pub fn input_percent(&mut self) {
        self.rewrite_numeral(|value| value / 100.0);
    }

    pub fn display_text(&self) -> &str {
        match &self.buffer {
            Buffer::Numeral(numeral) => numeral,
            Buffer::Error(_) => ERROR_MARKER,
        }
    }

    pub fn trace_text(&self) -> &str {
        &self.trace
    }

    pub fn error(&self) -> Option<CalcError> {
        match self.buffer {
            Buffer::Error(err) => Some(err),
            Buffer::Numeral(_) => None,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn readout(&self) -> Readout {
        Readout {
            display: self.display_text().to_string(),
            trace: self.trace.clone(),
            error: self.error(),
        }
    }

    /// Begin a new numeral in place of whatever the buffer shows.
    fn start_operand(&mut self, numeral: String) {
        let pending = match self.phase {
            Phase::OperatorPending(pending) => Some(pending),
            Phase::ResultShown | Phase::ErrorShown => {
                self.trace.clear();
                None
            }
            Phase::Idle | Phase::EnteringOperand { .. } => None,
        };
        self.buffer = Buffer::Numeral(numeral);
        self.phase = Phase::EnteringOperand { pending };
    }

    /// Apply `pending` with the buffer as the right-hand operand.
    ///
    /// On failure the engine is already in [`Phase::ErrorShown`].
    fn calculate(&mut self, pending: Pending) -> Result<(), CalcError> {
        let Buffer::Numeral(numeral) = &self.buffer else {
            return Ok(());
        };
        let right_text = numeral.clone();
        let right = parse_numeral(&right_text);
        let left = format_number(pending.left);

        if pending.operator == Operator::Divide && right == 0.0 {
            self.fail(CalcError::DivisionByZero, format!("{left} ÷ 0 ="));
            return Err(CalcError::DivisionByZero);
        }

        let result = pending.operator.apply(pending.left, right);
        if !result.is_finite() {
            let trace = format!("{left} {} {right_text} =", pending.operator);
            self.fail(CalcError::Overflow, trace);
            return Err(CalcError::Overflow);
        }

        self.buffer = Buffer::Numeral(format_number(settle(result)));
        Ok(())
    }

    /// Re-stringify the buffer through `f`, leaving the trace and any
    /// pending operation alone. A typed numeral beyond f64 range has no
    /// finite rendering, so it becomes an overflow error instead.
    fn rewrite_numeral(&mut self, f: impl FnOnce(f64) -> f64) {
        let Buffer::Numeral(numeral) = &self.buffer else {
            return;
        };
        let value = f(parse_numeral(numeral));
        if value.is_finite() {
            self.buffer = Buffer::Numeral(format_number(value));
        } else {
            let trace = self.trace.clone();
            self.fail(CalcError::Overflow, trace);
        }
    }

    fn fail(&mut self, err: CalcError, trace: String) {
        warn!(error = %err, %trace, "calculation failed");
        self.buffer = Buffer::Error(err);
        self.trace = trace;
        self.phase = Phase::ErrorShown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::symbol::tokenize;

    fn press(engine: &mut CalculatorEngine, keys: &str) -> Readout {
        for symbol in tokenize(keys).unwrap() {
            engine.apply(symbol);
        }
        engine.readout()
    }

    fn run(keys: &str) -> Readout {
        press(&mut CalculatorEngine::new(), keys)
    }

    #[test]
    fn test_initial_state() {
        let engine = CalculatorEngine::new();
        assert_eq!(engine.display_text(), "0");
        assert_eq!(engine.trace_text(), "");
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.error().is_none());
    }

    #[test]
    fn test_digits_build_numeral() {
        assert_eq!(run("123").display, "123");
        assert_eq!(run("007").display, "7");
        assert_eq!(run("0").display, "0");
        assert_eq!(run("105").display, "105");
    }

    #[test]
    fn test_single_decimal_point() {
        assert_eq!(run(".").display, "0.");
        assert_eq!(run("..").display, "0.");
        assert_eq!(run("1.2.3").display, "1.23");
        assert_eq!(run("0.05").display, "0.05");
    }

    #[test]
    fn test_binary_operations() {
        let add = run("12+3=");
        assert_eq!(add.display, "15");
        assert_eq!(add.trace, "12 + 3 =");

        let sub = run("10-4=");
        assert_eq!(sub.display, "6");
        assert_eq!(sub.trace, "10 − 4 =");

        let mul = run("6×7=");
        assert_eq!(mul.display, "42");
        assert_eq!(mul.trace, "6 × 7 =");

        let div = run("9÷3=");
        assert_eq!(div.display, "3");
        assert_eq!(div.trace, "9 ÷ 3 =");
    }

    #[test]
    fn test_subtraction_order() {
        assert_eq!(run("3-10=").display, "-7");
    }

    #[test]
    fn test_trace_excludes_unconfirmed_operand() {
        let mut engine = CalculatorEngine::new();
        let readout = press(&mut engine, "12+34");
        assert_eq!(readout.display, "34");
        assert_eq!(readout.trace, "12 +");
    }

    #[test]
    fn test_chaining_is_left_to_right() {
        let mut engine = CalculatorEngine::new();
        let readout = press(&mut engine, "5+3+");
        assert_eq!(readout.display, "8");
        assert_eq!(readout.trace, "8 +");

        let readout = press(&mut engine, "2=");
        assert_eq!(readout.display, "10");
        assert_eq!(readout.trace, "8 + 2 =");

        assert_eq!(run("2+3×4=").display, "20");
    }

    #[test]
    fn test_division_by_zero() {
        let mut engine = CalculatorEngine::new();
        let readout = press(&mut engine, "8÷0=");
        assert_eq!(readout.display, ERROR_MARKER);
        assert_eq!(readout.trace, "8 ÷ 0 =");
        assert_eq!(readout.error, Some(CalcError::DivisionByZero));
        assert_eq!(engine.phase(), Phase::ErrorShown);
        assert_eq!(engine.buffer(), &Buffer::Error(CalcError::DivisionByZero));
    }

    #[test]
    fn test_division_by_zero_point_zero() {
        let readout = run("8÷0.0=");
        assert_eq!(readout.display, ERROR_MARKER);
        assert_eq!(readout.trace, "8 ÷ 0 =");
    }

    #[test]
    fn test_chained_division_by_zero_absorbs_operator() {
        let mut engine = CalculatorEngine::new();
        let readout = press(&mut engine, "8÷0+");
        assert_eq!(readout.display, ERROR_MARKER);
        assert_eq!(readout.trace, "8 ÷ 0 =");
        assert_eq!(engine.phase(), Phase::ErrorShown);

        let readout = press(&mut engine, "=");
        assert_eq!(readout.display, ERROR_MARKER);
        assert_eq!(readout.trace, "8 ÷ 0 =");
    }

    #[test]
    fn test_error_is_absorbing() {
        let mut engine = CalculatorEngine::new();
        press(&mut engine, "8÷0=");
        let readout = press(&mut engine, "+ ± %");
        assert_eq!(readout.display, ERROR_MARKER);
        assert_eq!(readout.trace, "8 ÷ 0 =");
    }

    #[test]
    fn test_digit_recovers_from_error() {
        let mut engine = CalculatorEngine::new();
        press(&mut engine, "8÷0=");
        let readout = press(&mut engine, "5");
        assert_eq!(readout.display, "5");
        assert_eq!(readout.trace, "");
        assert!(!readout.is_error());

        assert_eq!(press(&mut engine, "+1=").display, "6");
    }

    #[test]
    fn test_percent_and_sign_leave_trace_alone() {
        let mut engine = CalculatorEngine::new();
        let readout = press(&mut engine, "5+2%");
        assert_eq!(readout.display, "0.02");
        assert_eq!(readout.trace, "5 +");

        let readout = press(&mut engine, "±");
        assert_eq!(readout.display, "-0.02");
        assert_eq!(readout.trace, "5 +");
        assert_eq!(
            engine.phase(),
            Phase::EnteringOperand {
                pending: Some(Pending {
                    left: 5.0,
                    operator: Operator::Add,
                })
            }
        );

        assert_eq!(press(&mut engine, "=").display, "4.98");
    }

    #[test]
    fn test_sign_toggle() {
        assert_eq!(run("±").display, "0");
        assert_eq!(run("5±").display, "-5");
        assert_eq!(run("5±±").display, "5");
        assert_eq!(run("5±3").display, "-53");
        assert_eq!(run("0.±").display, "0");
    }

    #[test]
    fn test_percent() {
        assert_eq!(run("%").display, "0");
        assert_eq!(run("50%").display, "0.5");
        assert_eq!(run("5%").display, "0.05");
    }

    #[test]
    fn test_out_of_range_numeral_cannot_be_negated() {
        let huge = "9".repeat(400);

        let mut engine = CalculatorEngine::new();
        let readout = press(&mut engine, &format!("{huge}±"));
        assert_eq!(readout.display, ERROR_MARKER);
        assert_eq!(readout.error, Some(CalcError::Overflow));
        assert_eq!(readout.trace, "");
        assert_eq!(engine.phase(), Phase::ErrorShown);

        // A fresh digit replaces the error instead of appending to it.
        assert_eq!(press(&mut engine, "5").display, "5");
    }

    #[test]
    fn test_out_of_range_numeral_percent() {
        let huge = "9".repeat(400);
        let readout = run(&format!("1+{huge}%"));
        assert_eq!(readout.display, ERROR_MARKER);
        assert_eq!(readout.error, Some(CalcError::Overflow));
        assert_eq!(readout.trace, "1 +");
    }

    #[test]
    fn test_negative_long_result_is_rounded() {
        let readout = run("1-3÷3=");
        assert_eq!(readout.display, "-0.6666666667");
        assert_eq!(readout.trace, "-2 ÷ 3 =");
    }

    #[test]
    fn test_tiny_long_result_is_rounded() {
        assert_eq!(run("1÷30000000=").display, "3.33e-8");
    }

    #[test]
    fn test_rounding_ties_go_up() {
        assert_eq!(run("1÷2048=").display, "0.0004882813");
    }

    #[test]
    fn test_clear_from_any_state() {
        for keys in ["", "12", "12+", "12+3", "12+3=", "8÷0=", "5.", "7±%"] {
            let mut engine = CalculatorEngine::new();
            press(&mut engine, keys);
            let readout = press(&mut engine, "AC");
            assert_eq!(readout.display, "0", "after {keys:?}");
            assert_eq!(readout.trace, "", "after {keys:?}");
            assert_eq!(engine.phase(), Phase::Idle);
        }
    }

    #[test]
    fn test_long_results_are_rounded() {
        assert_eq!(run("1÷3=").display, "0.3333333333");
        assert_eq!(run("0.1+0.2=").display, "0.3");
        assert_eq!(run("2÷3=").display, "0.6666666667");
    }

    #[test]
    fn test_continue_from_result_with_operator() {
        let mut engine = CalculatorEngine::new();
        press(&mut engine, "2+3=");
        let readout = press(&mut engine, "×");
        assert_eq!(readout.display, "5");
        assert_eq!(readout.trace, "5 ×");

        let readout = press(&mut engine, "4=");
        assert_eq!(readout.display, "20");
        assert_eq!(readout.trace, "5 × 4 =");
    }

    #[test]
    fn test_digit_after_result_starts_fresh() {
        let mut engine = CalculatorEngine::new();
        press(&mut engine, "2+3=");
        let readout = press(&mut engine, "7");
        assert_eq!(readout.display, "7");
        assert_eq!(readout.trace, "");
        assert_eq!(engine.phase(), Phase::EnteringOperand { pending: None });
    }

    #[test]
    fn test_decimal_after_result_starts_fresh() {
        let mut engine = CalculatorEngine::new();
        press(&mut engine, "2+3=");
        let readout = press(&mut engine, ".5");
        assert_eq!(readout.display, "0.5");
        assert_eq!(readout.trace, "");
    }

    #[test]
    fn test_equals_without_pending_is_noop() {
        let mut engine = CalculatorEngine::new();
        let readout = press(&mut engine, "=");
        assert_eq!(readout.display, "0");
        assert_eq!(readout.trace, "");

        let readout = press(&mut engine, "12=");
        assert_eq!(readout.display, "12");
        assert_eq!(readout.trace, "");
        assert_eq!(engine.phase(), Phase::Idle);

        // The next digit replaces rather than appends.
        assert_eq!(press(&mut engine, "3").display, "3");
    }

    #[test]
    fn test_repeated_equals_is_noop() {
        let mut engine = CalculatorEngine::new();
        press(&mut engine, "2+3=");
        let readout = press(&mut engine, "=");
        assert_eq!(readout.display, "5");
        assert_eq!(readout.trace, "2 + 3 =");
    }

    #[test]
    fn test_operator_replaced_without_new_operand() {
        let mut engine = CalculatorEngine::new();
        let readout = press(&mut engine, "5+×");
        assert_eq!(readout.trace, "5 ×");
        assert_eq!(press(&mut engine, "2=").display, "10");
    }

    #[test]
    fn test_equals_right_after_operator_reuses_operand() {
        let readout = run("5+=");
        assert_eq!(readout.display, "10");
        assert_eq!(readout.trace, "5 + 5 =");
    }

    #[test]
    fn test_trace_keeps_typed_operand_text() {
        assert_eq!(run("5.+").trace, "5. +");
        assert_eq!(run("1+2.=").trace, "1 + 2. =");
    }

    #[test]
    fn test_overflow_is_an_error() {
        let big = format!("1{}", "0".repeat(200));
        let readout = run(&format!("{big}×{big}="));
        assert_eq!(readout.display, ERROR_MARKER);
        assert_eq!(readout.error, Some(CalcError::Overflow));
        assert!(readout.trace.starts_with("1e+200 × 1"));
        assert!(readout.trace.ends_with(" ="));
    }

    #[test]
    fn test_readout_serializes() {
        let json = serde_json::to_string(&run("8÷0=")).unwrap();
        assert_eq!(
            json,
            r#"{"display":"Error","trace":"8 ÷ 0 =","error":"division_by_zero"}"#
        );

        let json = serde_json::to_string(&run("1+1=")).unwrap();
        assert_eq!(json, r#"{"display":"2","trace":"1 + 1 ="}"#);
    }
}
