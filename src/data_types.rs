//! Plaintext payloads exchanged with a graph through promises and futures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The ring `Z_{2^k}` a tensor's values live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitWidth {
    /// Values modulo `2^32`.
    W32,
    /// Values modulo `2^64`.
    W64,
}

impl BitWidth {
    /// The number of bits `k`.
    pub fn bits(self) -> u32 {
        match self {
            BitWidth::W32 => 32,
            BitWidth::W64 => 64,
        }
    }

    /// Reduces a value modulo `2^k`.
    pub(crate) fn reduce(self, value: u64) -> u64 {
        match self {
            BitWidth::W32 => value & u64::from(u32::MAX),
            BitWidth::W64 => value,
        }
    }

    /// Interprets a ring element as a two's-complement signed integer.
    pub(crate) fn to_signed(self, value: u64) -> i64 {
        match self {
            BitWidth::W32 => i64::from(value as u32 as i32),
            BitWidth::W64 => value as i64,
        }
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// The plaintext values of a tensor, in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegerValues {
    /// 32 bit ring elements.
    U32(Vec<u32>),
    /// 64 bit ring elements.
    U64(Vec<u64>),
}

impl IntegerValues {
    /// All-zero values of the given width.
    pub fn zeros(bit_width: BitWidth, len: usize) -> Self {
        match bit_width {
            BitWidth::W32 => IntegerValues::U32(vec![0; len]),
            BitWidth::W64 => IntegerValues::U64(vec![0; len]),
        }
    }

    /// The ring these values live in.
    pub fn bit_width(&self) -> BitWidth {
        match self {
            IntegerValues::U32(_) => BitWidth::W32,
            IntegerValues::U64(_) => BitWidth::W64,
        }
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        match self {
            IntegerValues::U32(v) => v.len(),
            IntegerValues::U64(v) => v.len(),
        }
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widens every element to `u64` without changing its ring value.
    pub(crate) fn to_ring(&self) -> Vec<u64> {
        match self {
            IntegerValues::U32(v) => v.iter().copied().map(u64::from).collect(),
            IntegerValues::U64(v) => v.clone(),
        }
    }

    /// Narrows ring elements (already reduced modulo `2^k`) back into typed values.
    pub(crate) fn from_ring(bit_width: BitWidth, values: Vec<u64>) -> Self {
        match bit_width {
            BitWidth::W32 => IntegerValues::U32(values.into_iter().map(|v| v as u32).collect()),
            BitWidth::W64 => IntegerValues::U64(values),
        }
    }
}

impl From<Vec<u32>> for IntegerValues {
    fn from(values: Vec<u32>) -> Self {
        IntegerValues::U32(values)
    }
}

impl From<Vec<u64>> for IntegerValues {
    fn from(values: Vec<u64>) -> Self {
        IntegerValues::U64(values)
    }
}
