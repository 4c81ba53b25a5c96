//! Conversion between raw register words and the values they represent.

use crate::registers::{DataType, RegisterIndex};
use crate::snapshot::Snapshot;

/// Raw words above this are negative when the register is signed.
///
/// The same 16-bit threshold applies to 32-bit quantities composed from two registers.
const SIGN_THRESHOLD: i64 = i16::MAX as i64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
}

impl Value {
    /// Parse user input for a write to `register`.
    ///
    /// Numbers are in the register's domain units (e.g. degrees, not tenths of a degree).
    pub fn parse_for(register: RegisterIndex, input: &str) -> Result<Value, InvalidValue> {
        let input = input.trim();
        if register.data_type().is_boolean() {
            return match input.to_ascii_lowercase().as_str() {
                "true" | "on" | "1" => Ok(Value::Boolean(true)),
                "false" | "off" | "0" => Ok(Value::Boolean(false)),
                _ => Err(InvalidValue::NotBoolean(register)),
            };
        }
        input
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| InvalidValue::NotNumeric(register, input.to_string()))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Value::Number(n) => f.write_fmt(format_args!("{}", n)),
            Value::Boolean(b) => f.write_fmt(format_args!("{}", b)),
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Value::Number(n) => serializer.serialize_f64(n),
            Value::Boolean(b) => serializer.serialize_bool(b),
        }
    }
}

/// The snapshot does not have the words necessary to decode a register.
///
/// Usually this means the register is not implemented by the unit, or has not been read yet.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingData {
    #[error("register {0} ({addr}) is missing from the snapshot", addr = .0.address())]
    Register(RegisterIndex),
    #[error("high word {0} ({addr}) is missing from the snapshot", addr = .0.address())]
    HighWord(RegisterIndex),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InvalidValue {
    #[error("register {0} only accepts boolean values")]
    NotBoolean(RegisterIndex),
    #[error("register {0} needs a number, got `{1}`")]
    NotNumeric(RegisterIndex, String),
    #[error("{1} cannot be written to register {0}")]
    NotFinite(RegisterIndex, f64),
}

/// Decode the value of `register` from the raw words in `snapshot`.
pub fn decode(register: RegisterIndex, snapshot: &Snapshot) -> Result<Value, MissingData> {
    let low = snapshot.value_of(register).ok_or(MissingData::Register(register))?;
    let high = match register.high_word() {
        Some(high_register) => {
            Some(snapshot.value_of(high_register).ok_or(MissingData::HighWord(high_register))?)
        }
        None => None,
    };
    Ok(decode_words(register.data_type(), low, high))
}

/// Decode a value of `data_type` from its low word and, for 32-bit quantities, its high word.
///
/// The sign correction uses the 16-bit threshold even when a high word is present.
fn decode_words(data_type: DataType, low: u16, high: Option<u16>) -> Value {
    if data_type.is_boolean() {
        return Value::Boolean(low != 0);
    }
    let mut value = i64::from(low);
    if let Some(high) = high {
        value += i64::from(high) << 16;
    }
    if data_type.is_signed() && value > SIGN_THRESHOLD {
        value = -(65536 - value);
    }
    Value::Number(value as f64 / f64::from(data_type.scale_factor()))
}

/// Encode `value` into the raw integer to write to `register`.
///
/// The value is truncated to an integer before it is scaled, then clamped to whichever of the
/// register's bounds are defined.
pub fn encode(register: RegisterIndex, value: Value) -> Result<i32, InvalidValue> {
    let data_type = register.data_type();
    let integer = match (data_type.is_boolean(), value) {
        (true, Value::Boolean(b)) => return Ok(i32::from(b)),
        (true, Value::Number(_)) => return Err(InvalidValue::NotBoolean(register)),
        (false, Value::Boolean(b)) => i64::from(b),
        (false, Value::Number(n)) if !n.is_finite() => {
            return Err(InvalidValue::NotFinite(register, n));
        }
        (false, Value::Number(n)) => n.trunc() as i64,
    };
    let mut raw = integer.saturating_mul(i64::from(data_type.scale_factor()));
    if let Some(min) = register.minimum() {
        raw = raw.max(i64::from(min));
    }
    if let Some(max) = register.maximum() {
        raw = raw.min(i64::from(max));
    }
    Ok(raw.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}
