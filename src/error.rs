//! The error type shared by factories, the builder and the plaintext backend.

use crate::{
    data_types::BitWidth, exchange::ExchangeError, factory::Unsupported, graph::TensorHandle,
    protocol::MpcProtocol,
};

/// Errors raised while building or running a tensor graph.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend does not implement the requested operation.
    #[error(transparent)]
    Unsupported(#[from] Unsupported),
    /// A secret exchange channel was misused or its other end is gone.
    #[error("broken channel: {0}")]
    BrokenChannel(#[from] ExchangeError),
    /// The handle was not issued by this graph.
    #[error("tensor {0:?} does not belong to this graph")]
    UnknownTensor(TensorHandle),
    /// No backend is registered for the protocol.
    #[error("no backend registered for the {0} protocol")]
    MissingFactory(MpcProtocol),
    /// An operand lives in a different protocol than the backend it was passed to.
    #[error("expected a tensor shared in {expected}, found one shared in {actual}")]
    ProtocolMismatch {
        /// The protocol of the backend.
        expected: MpcProtocol,
        /// The protocol of the operand.
        actual: MpcProtocol,
    },
    /// An operand has a shape the operation cannot accept.
    #[error("expected a tensor of shape {expected:?}, found {actual:?}")]
    ShapeMismatch {
        /// The shape required by the operation.
        expected: Vec<usize>,
        /// The shape of the operand.
        actual: Vec<usize>,
    },
    /// An operation descriptor is internally inconsistent.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    /// The number of provided values does not match the tensor.
    #[error("wrong input, expected {expected} values, found {actual}")]
    WrongInputSize {
        /// The number of elements of the tensor.
        expected: usize,
        /// The number of values provided.
        actual: usize,
    },
    /// Values or tensors of different ring sizes were combined.
    #[error("expected {expected} bit values, found {actual} bit values")]
    BitWidthMismatch {
        /// The bit width of the tensor.
        expected: BitWidth,
        /// The bit width that was provided.
        actual: BitWidth,
    },
}

impl Error {
    /// Whether this is an unsupported operation reported by a backend.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported(_))
    }

    /// Whether this is a broken or misused secret exchange channel.
    pub fn is_broken_channel(&self) -> bool {
        matches!(self, Error::BrokenChannel(_))
    }
}
