//! Observability trait for inspecting and patching core state.
//!
//! Every core exposes its architectural state by path. Queries never affect
//! emulation state; pokes write a single register the way a debugger would.

use std::fmt;

use thiserror::Error;

/// A dynamically-typed value for state queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// String value.
    String(String),
}

impl Value {
    /// Widen any numeric or boolean value to `u64`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Bool(v) => Some(u64::from(*v)),
            Value::U8(v) => Some(u64::from(*v)),
            Value::U16(v) => Some(u64::from(*v)),
            Value::U32(v) => Some(u64::from(*v)),
            Value::U64(v) => Some(*v),
            Value::String(_) => None,
        }
    }

    /// Interpret the value as a boolean. Numbers are true when non-zero.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_u64().map(|v| v != 0)
    }

    /// Narrow the value to a register of type `T` poked through `path`.
    pub fn to_register<T: TryFrom<u64>>(&self, path: &str) -> Result<T, StateError> {
        self.as_u64()
            .and_then(|v| T::try_from(v).ok())
            .ok_or_else(|| StateError::mismatch(path, std::any::type_name::<T>()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U32(v) => write!(f, "{v:#010X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// Failure to patch state through [`Observable::poke`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// No state lives at this path.
    #[error("unknown state path `{0}`")]
    UnknownPath(String),
    /// The path exists but can only be queried.
    #[error("state path `{0}` is read-only")]
    ReadOnly(String),
    /// The value does not fit the register behind the path.
    #[error("state path `{path}` expects {expected}")]
    TypeMismatch {
        /// Path that was written.
        path: String,
        /// Description of the accepted values.
        expected: &'static str,
    },
}

impl StateError {
    /// Shorthand for a [`StateError::TypeMismatch`].
    #[must_use]
    pub fn mismatch(path: &str, expected: &'static str) -> Self {
        Self::TypeMismatch {
            path: path.to_string(),
            expected,
        }
    }
}

/// A component whose state can be inspected and patched.
pub trait Observable {
    /// Query a specific property by path.
    ///
    /// Paths are hierarchical, separated by dots:
    /// - `pc` - Program counter
    /// - `r3` - General register 3
    /// - `flags.c` - Carry flag
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// List all available query paths.
    ///
    /// Returns paths that can be passed to `query()`.
    fn query_paths(&self) -> &'static [&'static str];

    /// Write a register by path.
    ///
    /// A value wider than the register is a [`StateError::TypeMismatch`].
    fn poke(&mut self, path: &str, value: Value) -> Result<(), StateError>;
}

#[cfg(test)]
mod tests {
    use super::{StateError, Value};

    #[test]
    fn to_register_rejects_values_wider_than_the_register() {
        assert_eq!(Value::U32(0xFFFF).to_register::<u16>("t"), Ok(0xFFFF));
        assert_eq!(
            Value::U32(0x1_0000).to_register::<u16>("t"),
            Err(StateError::mismatch("t", "u16"))
        );
        assert_eq!(Value::Bool(true).to_register::<u8>("rptc"), Ok(1));
        assert!(Value::from("x").to_register::<u8>("rptc").is_err());
    }

    #[test]
    fn errors_render_the_path() {
        let err = StateError::UnknownPath("r99".into());
        assert_eq!(err.to_string(), "unknown state path `r99`");
    }
}
