//! Identifiers for the MPC protocols a backend can implement.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The protocol in which a tensor is secret-shared.
///
/// Every tensor node is affiliated with exactly one protocol for its whole lifetime. Moving a
/// value into another protocol always goes through [`conversion`] and yields a new handle.
///
/// [`conversion`]: crate::factory::TensorOpFactory::conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MpcProtocol {
    /// Additive secret sharing over `Z_{2^k}` with multiplication triples (GMW).
    ArithmeticGmw,
    /// XOR secret sharing of single bits (GMW).
    BooleanGmw,
    /// Multi-party garbled circuits (Beaver-Micali-Rogaway).
    Bmr,
    /// Arithmetic BEAVY sharing with function-dependent preprocessing.
    ArithmeticBeavy,
    /// Boolean BEAVY sharing with function-dependent preprocessing.
    BooleanBeavy,
    /// Two-party Yao garbled circuits.
    Yao,
}

impl MpcProtocol {
    /// All known protocols, in declaration order.
    pub const ALL: [MpcProtocol; 6] = [
        MpcProtocol::ArithmeticGmw,
        MpcProtocol::BooleanGmw,
        MpcProtocol::Bmr,
        MpcProtocol::ArithmeticBeavy,
        MpcProtocol::BooleanBeavy,
        MpcProtocol::Yao,
    ];

    /// Whether values in this protocol are shared bitwise rather than over a ring.
    pub fn is_boolean(self) -> bool {
        !matches!(self, MpcProtocol::ArithmeticGmw | MpcProtocol::ArithmeticBeavy)
    }
}

impl fmt::Display for MpcProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MpcProtocol::ArithmeticGmw => "ArithmeticGMW",
            MpcProtocol::BooleanGmw => "BooleanGMW",
            MpcProtocol::Bmr => "BMR",
            MpcProtocol::ArithmeticBeavy => "ArithmeticBEAVY",
            MpcProtocol::BooleanBeavy => "BooleanBEAVY",
            MpcProtocol::Yao => "Yao",
        })
    }
}
