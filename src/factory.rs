//! The contract between a tensor graph builder and the backends implementing MPC protocols.
//!
//! [`TensorOpFactory`] lists every graph construction operation a backend may support. Each
//! operation has a default implementation that fails with [`Unsupported`], so a backend opts in
//! to exactly the operations it overrides. Anything else is rejected immediately with a message
//! naming the backend and the operation, never silently ignored and never routed to another
//! protocol behind the caller's back.
//!
//! Factory calls are synchronous: they only allocate result tensors in the [`TensorGraph`] and
//! record data dependencies. The cryptographic work happens later in the backend's execution
//! engine. Plaintext enters and leaves the graph through the [`SecretPromise`] and
//! [`SecretFuture`] halves returned by the input and output operations.

use std::fmt;

use tracing::debug;

use crate::{
    data_types::{BitWidth, IntegerValues},
    error::Error,
    exchange::{SecretFuture, SecretPromise},
    graph::{TensorGraph, TensorHandle},
    ops::{AveragePoolOp, Conv2DOp, GemmOp, HammOp, JoinOp, MaxPoolOp, TensorDimensions},
    protocol::MpcProtocol,
};

/// Promise through which the caller supplies the plaintext of an input tensor.
pub type InputPromise = SecretPromise<IntegerValues>;

/// Future through which the caller receives the reconstructed plaintext of an output tensor.
pub type OutputFuture = SecretFuture<IntegerValues>;

/// Identifies a factory operation in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`TensorOpFactory::input_my`]
    InputMy(BitWidth),
    /// [`TensorOpFactory::input_other`]
    InputOther(BitWidth),
    /// [`TensorOpFactory::input_shares`]
    InputShares(BitWidth),
    /// [`TensorOpFactory::output_my`]
    OutputMy(BitWidth),
    /// [`TensorOpFactory::output_other`]
    OutputOther,
    /// [`TensorOpFactory::conversion`] into the given protocol.
    Conversion(MpcProtocol),
    /// [`TensorOpFactory::flatten`]
    Flatten,
    /// [`TensorOpFactory::conv2d`]
    Conv2D,
    /// [`TensorOpFactory::gemm`]
    Gemm,
    /// [`TensorOpFactory::hamm`]
    Hamm,
    /// [`TensorOpFactory::sqr`]
    Sqr,
    /// [`TensorOpFactory::relu`]
    Relu,
    /// [`TensorOpFactory::relu_gated`]
    ReluGated,
    /// [`TensorOpFactory::maxpool`]
    MaxPool,
    /// [`TensorOpFactory::gt`]
    Gt,
    /// [`TensorOpFactory::avgpool`]
    AveragePool,
    /// [`TensorOpFactory::negate`]
    Negate,
    /// [`TensorOpFactory::const_mul`]
    ConstMul,
    /// [`TensorOpFactory::const_matrix_mul`]
    ConstMatrixMul,
    /// [`TensorOpFactory::const_add`]
    ConstAdd,
    /// [`TensorOpFactory::add`]
    Add,
    /// [`TensorOpFactory::split`]
    Split,
    /// [`TensorOpFactory::join`]
    Join,
}

impl Operation {
    /// The human-readable name of a tensor operation, `None` for inputs, outputs and conversions.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Operation::InputMy(_)
            | Operation::InputOther(_)
            | Operation::InputShares(_)
            | Operation::OutputMy(_)
            | Operation::OutputOther
            | Operation::Conversion(_) => return None,
            Operation::Flatten => "Flatten",
            Operation::Conv2D => "Conv2D",
            Operation::Gemm => "Gemm",
            Operation::Hamm => "Hamm",
            Operation::Sqr => "Sqr",
            Operation::Relu => "ReLU",
            Operation::ReluGated => "ReLU (arith x Bool)",
            Operation::MaxPool => "MaxPool",
            Operation::Gt => "GT",
            Operation::AveragePool => "AveragePool",
            Operation::Negate => "Negate",
            Operation::ConstMul => "Const Multiplication",
            Operation::ConstMatrixMul => "Const Matrix Multiplication",
            Operation::ConstAdd => "Const Addition",
            Operation::Add => "Tensor addition",
            Operation::Split => "Split",
            Operation::Join => "Join",
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::InputMy(w) => write!(f, "arithmetic {w} bit inputs"),
            Operation::InputOther(w) => write!(f, "arithmetic {w} bit inputs from other parties"),
            Operation::InputShares(w) => write!(f, "arithmetic {w} bit share inputs"),
            Operation::OutputMy(w) => write!(f, "arithmetic {w} bit outputs"),
            Operation::OutputOther => f.write_str("arithmetic outputs for other parties"),
            Operation::Conversion(p) => write!(f, "conversions to the {p} protocol"),
            op => write!(f, "the {} operation", op.name().unwrap_or_default()),
        }
    }
}

/// A backend rejected an operation it does not implement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{provider} does not support {operation}")]
pub struct Unsupported {
    /// The [`TensorOpFactory::provider_name`] of the rejecting backend.
    pub provider: String,
    /// The rejected operation.
    pub operation: Operation,
}

/// Builds the error returned by every operation a backend does not override.
pub fn unsupported<F: TensorOpFactory + ?Sized>(factory: &F, operation: Operation) -> Error {
    let provider = factory.provider_name();
    debug!(provider, %operation, "unsupported tensor operation");
    Error::Unsupported(Unsupported {
        provider: provider.to_string(),
        operation,
    })
}

/// Graph construction operations of one MPC protocol backend.
///
/// Implementors only have to provide [`provider_name`](Self::provider_name) and override the
/// operations the protocol supports. Every method taking a graph appends the result tensor(s) to
/// it and returns immediately; none of them waits for communication.
///
/// Operations with a `truncate_bits` parameter multiply fixed-point values and remove that many
/// fractional bits from the product afterwards.
pub trait TensorOpFactory {
    /// Name of the backend, used in diagnostics.
    fn provider_name(&self) -> &str;

    /// Allocates an input tensor whose plaintext this party provides.
    ///
    /// The caller fulfills the returned promise with the values to secret-share.
    fn input_my(
        &mut self,
        _graph: &mut TensorGraph,
        _dims: TensorDimensions,
        bit_width: BitWidth,
    ) -> Result<(InputPromise, TensorHandle), Error> {
        Err(unsupported(self, Operation::InputMy(bit_width)))
    }

    /// Allocates an input tensor whose plaintext another party provides.
    fn input_other(
        &mut self,
        _graph: &mut TensorGraph,
        _dims: TensorDimensions,
        bit_width: BitWidth,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::InputOther(bit_width)))
    }

    /// Allocates an input tensor from locally held shares, one promise per share.
    fn input_shares(
        &mut self,
        _graph: &mut TensorGraph,
        _dims: TensorDimensions,
        bit_width: BitWidth,
    ) -> Result<(Vec<InputPromise>, TensorHandle), Error> {
        Err(unsupported(self, Operation::InputShares(bit_width)))
    }

    /// Schedules reconstruction of a tensor towards this party.
    fn output_my(
        &mut self,
        _graph: &mut TensorGraph,
        _input: TensorHandle,
        bit_width: BitWidth,
    ) -> Result<OutputFuture, Error> {
        Err(unsupported(self, Operation::OutputMy(bit_width)))
    }

    /// Schedules reconstruction of a tensor towards the other parties only.
    fn output_other(
        &mut self,
        _graph: &mut TensorGraph,
        _input: TensorHandle,
    ) -> Result<(), Error> {
        Err(unsupported(self, Operation::OutputOther))
    }

    /// Carries a tensor into the representation of another protocol.
    ///
    /// The result is a new tensor affiliated with `target`, the input is left untouched.
    fn conversion(
        &mut self,
        _graph: &mut TensorGraph,
        target: MpcProtocol,
        _input: TensorHandle,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::Conversion(target)))
    }

    /// Flattens the tensor into 2D, splitting the dimensions at `axis`.
    fn flatten(
        &mut self,
        _graph: &mut TensorGraph,
        _input: TensorHandle,
        _axis: usize,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::Flatten))
    }

    /// 2D convolution, adding `bias` per output channel if present.
    fn conv2d(
        &mut self,
        _graph: &mut TensorGraph,
        _op: &Conv2DOp,
        _input: TensorHandle,
        _kernel: TensorHandle,
        _bias: Option<TensorHandle>,
        _truncate_bits: usize,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::Conv2D))
    }

    /// 2D convolution without bias.
    ///
    /// Always equivalent to [`conv2d`](Self::conv2d) with `bias = None`.
    fn conv2d_without_bias(
        &mut self,
        graph: &mut TensorGraph,
        op: &Conv2DOp,
        input: TensorHandle,
        kernel: TensorHandle,
        truncate_bits: usize,
    ) -> Result<TensorHandle, Error> {
        self.conv2d(graph, op, input, kernel, None, truncate_bits)
    }

    /// Matrix multiplication.
    fn gemm(
        &mut self,
        _graph: &mut TensorGraph,
        _op: &GemmOp,
        _input_a: TensorHandle,
        _input_b: TensorHandle,
        _truncate_bits: usize,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::Gemm))
    }

    /// Elementwise (Hadamard) product.
    fn hamm(
        &mut self,
        _graph: &mut TensorGraph,
        _op: &HammOp,
        _input_a: TensorHandle,
        _input_b: TensorHandle,
        _truncate_bits: usize,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::Hamm))
    }

    /// Elementwise square.
    fn sqr(
        &mut self,
        _graph: &mut TensorGraph,
        _input: TensorHandle,
        _truncate_bits: usize,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::Sqr))
    }

    /// Elementwise `max(x, 0)`.
    fn relu(
        &mut self,
        _graph: &mut TensorGraph,
        _input: TensorHandle,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::Relu))
    }

    /// ReLU of an arithmetic tensor, gated by the sign bits held in a Boolean tensor.
    fn relu_gated(
        &mut self,
        _graph: &mut TensorGraph,
        _input_bool: TensorHandle,
        _input_arith: TensorHandle,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::ReluGated))
    }

    /// Max pooling.
    fn maxpool(
        &mut self,
        _graph: &mut TensorGraph,
        _op: &MaxPoolOp,
        _input: TensorHandle,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::MaxPool))
    }

    /// Windowed greater-than comparison, laid out like a max pooling.
    fn gt(
        &mut self,
        _graph: &mut TensorGraph,
        _op: &MaxPoolOp,
        _input: TensorHandle,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::Gt))
    }

    /// Average pooling.
    fn avgpool(
        &mut self,
        _graph: &mut TensorGraph,
        _op: &AveragePoolOp,
        _input: TensorHandle,
        _truncate_bits: usize,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::AveragePool))
    }

    /// Elementwise negation.
    fn negate(
        &mut self,
        _graph: &mut TensorGraph,
        _input: TensorHandle,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::Negate))
    }

    /// Multiplication by public constants, one per element or a single one for all.
    fn const_mul(
        &mut self,
        _graph: &mut TensorGraph,
        _input: TensorHandle,
        _k: &[u64],
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::ConstMul))
    }

    /// Matrix product of a public matrix `w` with a secret matrix `x`.
    fn const_matrix_mul(
        &mut self,
        _graph: &mut TensorGraph,
        _op: &GemmOp,
        _w: &[u64],
        _x: TensorHandle,
        _fractional_bits: usize,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::ConstMatrixMul))
    }

    /// Addition of a public constant to every element.
    fn const_add(
        &mut self,
        _graph: &mut TensorGraph,
        _input: TensorHandle,
        _k: u64,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::ConstAdd))
    }

    /// Elementwise addition.
    fn add(
        &mut self,
        _graph: &mut TensorGraph,
        _input_a: TensorHandle,
        _input_b: TensorHandle,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::Add))
    }

    /// Splits a tensor into its parts.
    fn split(
        &mut self,
        _graph: &mut TensorGraph,
        _input: TensorHandle,
    ) -> Result<Vec<TensorHandle>, Error> {
        Err(unsupported(self, Operation::Split))
    }

    /// Concatenates two tensors along the axis of `op`.
    fn join(
        &mut self,
        _graph: &mut TensorGraph,
        _op: &JoinOp,
        _input_a: TensorHandle,
        _input_b: TensorHandle,
        _truncate_bits: usize,
    ) -> Result<TensorHandle, Error> {
        Err(unsupported(self, Operation::Join))
    }
}
