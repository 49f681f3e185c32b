// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed arguments attached to trace events.

/// Wire tag identifying how an argument's 64-bit value slot is interpreted.
///
/// The numeric tags match the Chrome trace-event value types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ArgType {
    /// `0` or `1`.
    Bool = 1,
    /// Unsigned 64-bit integer.
    Uint = 2,
    /// Signed 64-bit integer, two's complement.
    Int = 3,
    /// IEEE 754 double, stored by bit pattern.
    Double = 4,
    /// Address-like value rendered in hex.
    Pointer = 5,
    /// Reference to a string that outlives the tracer.
    Str = 6,
    /// String copied into the event record.
    CopyStr = 7,
}

impl ArgType {
    /// Returns the wire tag.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses a wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            1 => Self::Bool,
            2 => Self::Uint,
            3 => Self::Int,
            4 => Self::Double,
            5 => Self::Pointer,
            6 => Self::Str,
            7 => Self::CopyStr,
            _ => return None,
        })
    }
}

/// The value half of an [`Arg`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArgValue<'a> {
    /// A boolean.
    Bool(bool),
    /// An unsigned integer.
    Uint(u64),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Double(f64),
    /// An address or opaque identity, emitted as a hex string.
    Pointer(u64),
    /// A string that lives for the whole program; recorded by reference.
    Str(&'static str),
    /// A borrowed string; recorded by copying its bytes into the event.
    CopyStr(&'a str),
}

impl ArgValue<'_> {
    /// The wire tag for this value.
    #[must_use]
    pub const fn arg_type(&self) -> ArgType {
        match self {
            Self::Bool(_) => ArgType::Bool,
            Self::Uint(_) => ArgType::Uint,
            Self::Int(_) => ArgType::Int,
            Self::Double(_) => ArgType::Double,
            Self::Pointer(_) => ArgType::Pointer,
            Self::Str(_) => ArgType::Str,
            Self::CopyStr(_) => ArgType::CopyStr,
        }
    }

    /// Number of bytes this value needs in a record's string table,
    /// including the NUL terminator.
    #[must_use]
    pub const fn copied_len(&self) -> usize {
        match self {
            Self::CopyStr(s) => s.len() + 1,
            _ => 0,
        }
    }
}

impl From<bool> for ArgValue<'_> {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u32> for ArgValue<'_> {
    fn from(v: u32) -> Self {
        Self::Uint(v.into())
    }
}

impl From<u64> for ArgValue<'_> {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<i32> for ArgValue<'_> {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for ArgValue<'_> {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ArgValue<'_> {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&'static str> for ArgValue<'_> {
    fn from(v: &'static str) -> Self {
        Self::Str(v)
    }
}

/// A named argument attached to an event.
///
/// Names starting with `#` mark the value as a reference to another event's
/// id; serializers wrap such values as `{"id_ref": value}`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arg<'a> {
    /// Argument name; recorded by reference, never copied.
    pub name: &'static str,
    /// Argument value.
    pub value: ArgValue<'a>,
}

impl<'a> Arg<'a> {
    /// Creates an argument.
    #[inline]
    #[must_use]
    pub fn new(name: &'static str, value: impl Into<ArgValue<'a>>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// Creates an argument whose string value is copied into the event.
    #[inline]
    #[must_use]
    pub const fn copy_str(name: &'static str, value: &'a str) -> Self {
        Self {
            name,
            value: ArgValue::CopyStr(value),
        }
    }

    /// Creates an argument rendered as a hex address.
    #[inline]
    #[must_use]
    pub const fn pointer(name: &'static str, value: u64) -> Self {
        Self {
            name,
            value: ArgValue::Pointer(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_wire_values() {
        for tag in 1..=7 {
            let ty = ArgType::from_tag(tag).expect("tags 1..=7 are defined");
            assert_eq!(ty.tag(), tag);
        }
        assert_eq!(ArgType::from_tag(0), None);
        assert_eq!(ArgType::from_tag(8), None);
    }

    #[test]
    fn copied_len_counts_terminator() {
        assert_eq!(ArgValue::CopyStr("abc").copied_len(), 4);
        assert_eq!(ArgValue::CopyStr("").copied_len(), 1);
        assert_eq!(ArgValue::Str("abc").copied_len(), 0);
        assert_eq!(ArgValue::Uint(3).copied_len(), 0);
    }

    #[test]
    fn conversions_pick_expected_type() {
        assert_eq!(Arg::new("a", true).value.arg_type(), ArgType::Bool);
        assert_eq!(Arg::new("a", 3_u32).value, ArgValue::Uint(3));
        assert_eq!(Arg::new("a", -3_i32).value, ArgValue::Int(-3));
        assert_eq!(Arg::new("a", 0.5).value, ArgValue::Double(0.5));
        assert_eq!(Arg::new("a", "x").value.arg_type(), ArgType::Str);
        assert_eq!(Arg::pointer("a", 16).value.arg_type(), ArgType::Pointer);
    }
}
