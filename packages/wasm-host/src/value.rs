use std::{
    fmt::{self, Display},
    num::{ParseFloatError, ParseIntError},
};

use thiserror::Error;
use wasmtime::{Val, ValType};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("'{text}' is not an integer: {source}")]
    InvalidInteger { text: String, source: ParseIntError },
    #[error("'{text}' is not a number: {source}")]
    InvalidFloat {
        text: String,
        source: ParseFloatError,
    },
    #[error("'{text}' is not a finite number")]
    NotFinite { text: String },
    #[error("parameters of type `{ty}` can't be passed from the command line")]
    UnsupportedType { ty: String },
    #[error("`{name}` expects {expected} argument(s), but {actual} were given")]
    Arity {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Parse a decimal `i32`, with an optional sign.
pub fn parse_int(text: &str) -> Result<i32, ArgumentError> {
    parse_integer(text)
}

/// Parse a finite decimal `f64`.
///
/// `NaN` and the infinities are rejected, even though `f64::from_str` accepts
/// them.
pub fn parse_float(text: &str) -> Result<f64, ArgumentError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|source| ArgumentError::InvalidFloat {
            text: text.to_string(),
            source,
        })?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ArgumentError::NotFinite {
            text: text.to_string(),
        })
    }
}

fn parse_integer<T>(text: &str) -> Result<T, ArgumentError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    text.trim()
        .parse()
        .map_err(|source| ArgumentError::InvalidInteger {
            text: text.to_string(),
            source,
        })
}

/// A numeric value crossing the host/guest boundary.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Number {
    /// Parse `text` as a value of the wasm type `ty`.
    pub fn parse(text: &str, ty: &ValType) -> Result<Self, ArgumentError> {
        Ok(match ty {
            ValType::I32 => Self::I32(parse_integer(text)?),
            ValType::I64 => Self::I64(parse_integer(text)?),
            // Narrowing happens after the finiteness check, so large values
            // still fail below.
            ValType::F32 => {
                let value = parse_float(text)? as f32;

                if !value.is_finite() {
                    return Err(ArgumentError::NotFinite {
                        text: text.to_string(),
                    });
                }

                Self::F32(value)
            }
            ValType::F64 => Self::F64(parse_float(text)?),
            ty => {
                return Err(ArgumentError::UnsupportedType {
                    ty: ty.to_string(),
                })
            }
        })
    }

    pub fn is_numeric(ty: &ValType) -> bool {
        matches!(ty, ValType::I32 | ValType::I64 | ValType::F32 | ValType::F64)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(value) => value.fmt(f),
            Self::I64(value) => value.fmt(f),
            Self::F32(value) => fmt_float(f64::from(*value), f),
            Self::F64(value) => fmt_float(*value, f),
        }
    }
}

/// Format a float the way a JavaScript console prints a number.
///
/// `f32`s are widened first, as they are when a JavaScript host receives
/// them.
fn fmt_float(value: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("NaN");
    }

    if value.is_infinite() {
        return f.write_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
    }

    // Covers `-0` too.
    if value == 0.0 {
        return f.write_str("0");
    }

    let magnitude = value.abs();

    if (1e-6..1e21).contains(&magnitude) {
        return value.fmt(f);
    }

    let exponential = format!("{value:e}");

    match exponential.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            write!(f, "{mantissa}e+{exponent}")
        }
        _ => f.write_str(&exponential),
    }
}

impl From<Number> for Val {
    fn from(value: Number) -> Self {
        match value {
            Number::I32(value) => Val::I32(value),
            Number::I64(value) => Val::I64(value),
            Number::F32(value) => Val::F32(value.to_bits()),
            Number::F64(value) => Val::F64(value.to_bits()),
        }
    }
}

impl TryFrom<&Val> for Number {
    type Error = anyhow::Error;

    fn try_from(value: &Val) -> anyhow::Result<Self> {
        Ok(match value {
            Val::I32(value) => Self::I32(*value),
            Val::I64(value) => Self::I64(*value),
            Val::F32(bits) => Self::F32(f32::from_bits(*bits)),
            Val::F64(bits) => Self::F64(f64::from_bits(*bits)),
            Val::V128(_) => anyhow::bail!("`v128` values are not supported"),
            Val::FuncRef(_) | Val::ExternRef(_) | Val::AnyRef(_) => {
                anyhow::bail!("Reference values are not supported")
            }
        })
    }
}
