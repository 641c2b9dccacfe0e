//! The value expressions of table cells.
//!
//! Expressions are JSON objects with a single key naming the operation:
//!
//! - `{"value": {"name": N, "type": "int"|"float"}}` looks up statistic `N`,
//!   optionally converting it to a number (the raw text otherwise);
//! - `{"divide": {<expression>, "by": D}}` divides by a literal or an expression;
//! - `{"round": {<expression>, "decimal": d}}` truncates to `d` decimal places;
//! - `{"percent": {<expression>, "of": D}}` gives the truncated percentage of `D`;
//! - `{"readable": <expression>}` formats a count with a k/M/G suffix.
//!
//! Operations nest, e.g. `{"round": {"decimal": 1, "divide": {"by": 1024, "value": {"name": "MEM"}}}}`.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use xtools_core::Named;

/// The error type for evaluating [`Expression`]s.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The statistic is not among the reported ones.
    #[error("unknown value name {0}")]
    UnknownValue(String),
    /// The statistic cannot be converted to the requested type.
    #[error("value {name} = '{value}' is not of type {ty}")]
    InvalidNumber {
        /// Name of the statistic.
        name: String,
        /// Its reported value.
        value: String,
        /// The requested type.
        ty: ValueType,
    },
    /// Arithmetic on text that is not a number.
    #[error("'{0}' is not a number")]
    NotNumeric(String),
    /// A divisor or a percentage base evaluated to zero.
    #[error("division by 0")]
    DivisionByZero,
}

/// Numeric types statistics can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// 64-bit signed integers.
    Int,
    /// Double-precision floating point.
    Float,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int => f.write_str("int"),
            ValueType::Float => f.write_str("float"),
        }
    }
}

/// A cell value expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Expression {
    /// Statistic lookup.
    Value(ValueRef),
    /// Floating-point division.
    Divide(Divide),
    /// Truncation to a number of decimal places.
    Round(Round),
    /// Truncated percentage.
    Percent(Percent),
    /// Count with a k/M/G suffix.
    Readable(Box<Expression>),
}

/// Reference to a reported statistic.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValueRef {
    /// Name of the statistic.
    pub name: String,
    /// Conversion to apply to the reported text.
    #[serde(default, rename = "type")]
    pub ty: Option<ValueType>,
}

/// Operand of a division or percentage: a number or a nested expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    /// A constant.
    Literal(f64),
    /// An expression evaluating to a number.
    Expression(Box<Expression>),
}

/// `value / by`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Divide {
    /// The dividend.
    #[serde(flatten)]
    pub value: Box<Expression>,
    /// The divisor.
    pub by: Operand,
}

/// `floor(value * 10^decimal) / 10^decimal`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Round {
    /// The truncated value.
    #[serde(flatten)]
    pub value: Box<Expression>,
    /// Number of decimal places kept.
    pub decimal: i32,
}

/// `floor(100 * value / of * 100) / 100`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Percent {
    /// The part.
    #[serde(flatten)]
    pub value: Box<Expression>,
    /// The whole.
    pub of: Operand,
}

/// Result of evaluating an [`Expression`].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Unconverted statistic or formatted text.
    Text(String),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
}

impl Scalar {
    /// The numeric value, parsing text if needed.
    pub fn to_f64(&self) -> Result<f64, EvalError> {
        match self {
            Scalar::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| EvalError::NotNumeric(text.clone())),
            Scalar::Int(i) => Ok(*i as f64),
            Scalar::Float(x) => Ok(*x),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write_float(f, *x),
        }
    }
}

impl ValueRef {
    fn evaluate(&self, stats: &Named<String>) -> Result<Scalar, EvalError> {
        let value = stats
            .get(&self.name)
            .ok_or_else(|| EvalError::UnknownValue(self.name.clone()))?;
        let invalid = |ty| EvalError::InvalidNumber {
            name: self.name.clone(),
            value: value.clone(),
            ty,
        };
        match self.ty {
            None => Ok(Scalar::Text(value.clone())),
            Some(ValueType::Int) => value
                .trim()
                .parse()
                .map(Scalar::Int)
                .map_err(|_| invalid(ValueType::Int)),
            Some(ValueType::Float) => value
                .trim()
                .parse()
                .map(Scalar::Float)
                .map_err(|_| invalid(ValueType::Float)),
        }
    }
}

impl Operand {
    fn evaluate(&self, stats: &Named<String>) -> Result<f64, EvalError> {
        match self {
            Operand::Literal(x) => Ok(*x),
            Operand::Expression(expr) => expr.evaluate(stats)?.to_f64(),
        }
    }
}

impl Expression {
    /// Evaluates the expression over the statistics of a run.
    pub fn evaluate(&self, stats: &Named<String>) -> Result<Scalar, EvalError> {
        match self {
            Expression::Value(value) => value.evaluate(stats),
            Expression::Divide(divide) => {
                let value = divide.value.evaluate(stats)?.to_f64()?;
                let by = divide.by.evaluate(stats)?;
                if by == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Scalar::Float(value / by))
            }
            Expression::Round(round) => {
                let value = round.value.evaluate(stats)?.to_f64()?;
                Ok(Scalar::Float(truncate(value, round.decimal)))
            }
            Expression::Percent(percent) => {
                let value = percent.value.evaluate(stats)?.to_f64()?;
                let of = percent.of.evaluate(stats)?;
                self::percent(value, of).map(Scalar::Float)
            }
            Expression::Readable(expr) => {
                let value = expr.evaluate(stats)?.to_f64()?;
                Ok(Scalar::Text(readable(value)))
            }
        }
    }
}

/// Shortest round-trip rendering, in exponent notation below `1e-4` and from `1e16` on
/// (`1e+16`, `1.5e-05`), with a fractional part on whole numbers otherwise (`2.0`).
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("nan");
    }
    if x.is_infinite() || x == 0.0 {
        return write!(f, "{x:.1}");
    }
    let scientific = format!("{x:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or_default();
    if (-4..16).contains(&exponent) {
        if x.fract() == 0.0 {
            write!(f, "{x:.1}")
        } else {
            write!(f, "{x}")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

/// Truncates `value` to `decimal` decimal places (rounding down, not to nearest).
pub fn truncate(value: f64, decimal: i32) -> f64 {
    let factor = 10f64.powi(decimal);
    (value * factor).floor() / factor
}

/// Percentage of `num` over `den` truncated to two decimal places.
///
/// `0` out of `0` is a full 100%.
pub fn percent(num: f64, den: f64) -> Result<f64, EvalError> {
    if den == 0.0 {
        if num == 0.0 {
            Ok(100.0)
        } else {
            Err(EvalError::DivisionByZero)
        }
    } else {
        Ok((100.0 * num / den * 100.0).floor() / 100.0)
    }
}

/// Formats a count: with one (truncated) decimal and a k/M/G suffix from a thousand on,
/// as the bare integer below.
pub fn readable(count: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "G"), (1e6, "M"), (1e3, "k")];
    let count = count.trunc();
    for (unit, suffix) in UNITS {
        if count.abs() >= unit {
            let tenths = (count * 10.0 / unit).trunc();
            return format!("{:.1} {suffix}", tenths / 10.0);
        }
    }
    // below a thousand in magnitude, or NaN
    format!("{}", count as i64)
}
