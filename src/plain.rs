//! A cleartext backend for testing graph builders without any cryptography.
//!
//! [`PlainTensorOpFactory`] records the operations it supports, and its [`PlainProgram`] evaluates
//! them over `Z_{2^k}`. Inputs wait for their promises to be fulfilled, every other node runs as
//! soon as its operands are known, and outputs fulfill the futures handed out by
//! [`TensorOpFactory::output_my`]. Values are never hidden, so this backend offers no security
//! whatsoever.

use std::{
    collections::HashMap,
    mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use futures::{
    StreamExt,
    future::try_join_all,
    stream::FuturesUnordered,
};
use tracing::{Level, debug, instrument, trace};

use crate::{
    data_types::{BitWidth, IntegerValues},
    error::Error,
    exchange::{ExchangeError, SecretFuture, SecretPromise, secret_channel},
    factory::{InputPromise, OutputFuture, TensorOpFactory},
    graph::{TensorGraph, TensorHandle},
    ops::{GemmOp, HammOp, TensorDimensions},
    protocol::MpcProtocol,
};

#[derive(Debug)]
enum PlainNode {
    Input {
        output: TensorHandle,
        bit_width: BitWidth,
        len: usize,
        shares: Vec<SecretFuture<IntegerValues>>,
    },
    Output {
        input: TensorHandle,
        promise: SecretPromise<IntegerValues>,
    },
    Unary {
        output: TensorHandle,
        input: TensorHandle,
        op: UnaryOp,
    },
    Binary {
        output: TensorHandle,
        input_a: TensorHandle,
        input_b: TensorHandle,
        op: BinaryOp,
    },
    Gemm {
        output: TensorHandle,
        input_a: TensorHandle,
        input_b: TensorHandle,
        op: GemmOp,
        truncate_bits: usize,
    },
}

#[derive(Debug)]
enum UnaryOp {
    /// Same values, new shape.
    Reshape,
    Negate,
    Relu,
    Sqr { truncate_bits: usize },
    ConstAdd(u64),
    ConstMul(Vec<u64>),
}

#[derive(Debug)]
enum BinaryOp {
    Add,
    Mul { truncate_bits: usize },
}

#[derive(Debug, Default)]
struct ProgramState {
    nodes: Vec<PlainNode>,
}

fn lock(state: &Mutex<ProgramState>) -> MutexGuard<'_, ProgramState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The nodes recorded by a [`PlainTensorOpFactory`], ready to be evaluated.
///
/// The recorded nodes are owned by the factory. Dropping the factory before the program runs,
/// e.g. by tearing down the [`GraphBuilder`](crate::builder::GraphBuilder) it is registered
/// with, drops them and breaks every channel of the recorded inputs and outputs.
#[derive(Debug)]
pub struct PlainProgram {
    state: Weak<Mutex<ProgramState>>,
}

/// A [`TensorOpFactory`] computing on plaintext, for a single protocol.
#[derive(Debug)]
pub struct PlainTensorOpFactory {
    name: String,
    protocol: MpcProtocol,
    num_shares: usize,
    widths: HashMap<TensorHandle, BitWidth>,
    state: Arc<Mutex<ProgramState>>,
}

impl PlainTensorOpFactory {
    /// Creates a factory whose tensors are affiliated with `protocol`, plus the program it
    /// records into.
    ///
    /// By default, [`TensorOpFactory::input_shares`] expects two shares per tensor.
    pub fn new(protocol: MpcProtocol) -> (Self, PlainProgram) {
        let state = Arc::new(Mutex::new(ProgramState::default()));
        let factory = Self {
            name: format!("Plain{protocol}"),
            protocol,
            num_shares: 2,
            widths: HashMap::new(),
            state: Arc::clone(&state),
        };
        let program = PlainProgram {
            state: Arc::downgrade(&state),
        };
        (factory, program)
    }

    /// Sets the number of shares [`TensorOpFactory::input_shares`] hands out promises for.
    pub fn with_num_shares(mut self, num_shares: usize) -> Self {
        self.num_shares = num_shares.max(1);
        self
    }

    fn operand<'g>(
        &self,
        graph: &'g TensorGraph,
        handle: TensorHandle,
    ) -> Result<(BitWidth, &'g TensorDimensions), Error> {
        let actual = graph.protocol(handle)?;
        if actual != self.protocol {
            return Err(Error::ProtocolMismatch {
                expected: self.protocol,
                actual,
            });
        }
        let bit_width = *self
            .widths
            .get(&handle)
            .ok_or(Error::UnknownTensor(handle))?;
        Ok((bit_width, graph.dimensions(handle)?))
    }

    fn record(
        &mut self,
        graph: &mut TensorGraph,
        dims: TensorDimensions,
        bit_width: BitWidth,
        node: impl FnOnce(TensorHandle) -> PlainNode,
    ) -> TensorHandle {
        let output = graph.add_tensor(dims, self.protocol);
        self.widths.insert(output, bit_width);
        lock(&self.state).nodes.push(node(output));
        output
    }

    fn input(
        &mut self,
        graph: &mut TensorGraph,
        dims: TensorDimensions,
        bit_width: BitWidth,
        num_shares: usize,
    ) -> (Vec<InputPromise>, TensorHandle) {
        let len = dims.num_elements();
        let (promises, shares): (Vec<_>, Vec<_>) =
            (0..num_shares).map(|_| secret_channel()).unzip();
        let output = self.record(graph, dims, bit_width, |output| PlainNode::Input {
            output,
            bit_width,
            len,
            shares,
        });
        (promises, output)
    }

    fn unary(
        &mut self,
        graph: &mut TensorGraph,
        input: TensorHandle,
        op: UnaryOp,
    ) -> Result<TensorHandle, Error> {
        let (bit_width, dims) = self.operand(graph, input)?;
        if let UnaryOp::Sqr { truncate_bits } = op {
            check_truncation(bit_width, truncate_bits)?;
        }
        if let UnaryOp::ConstMul(k) = &op {
            if k.len() != 1 && k.len() != dims.num_elements() {
                return Err(Error::ShapeMismatch {
                    expected: vec![dims.num_elements()],
                    actual: vec![k.len()],
                });
            }
        }
        let dims = dims.clone();
        Ok(self.record(graph, dims, bit_width, |output| PlainNode::Unary {
            output,
            input,
            op,
        }))
    }

    fn binary(
        &mut self,
        graph: &mut TensorGraph,
        input_a: TensorHandle,
        input_b: TensorHandle,
        op: BinaryOp,
    ) -> Result<TensorHandle, Error> {
        let (bit_width, dims_a) = self.operand(graph, input_a)?;
        let (bit_width_b, dims_b) = self.operand(graph, input_b)?;
        if bit_width != bit_width_b {
            return Err(Error::BitWidthMismatch {
                expected: bit_width,
                actual: bit_width_b,
            });
        }
        expect_shape(dims_a.as_slice(), dims_b)?;
        if let BinaryOp::Mul { truncate_bits } = op {
            check_truncation(bit_width, truncate_bits)?;
        }
        let dims = dims_a.clone();
        Ok(self.record(graph, dims, bit_width, |output| PlainNode::Binary {
            output,
            input_a,
            input_b,
            op,
        }))
    }
}

fn expect_shape(expected: &[usize], actual: &TensorDimensions) -> Result<(), Error> {
    if expected == actual.as_slice() {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.as_slice().to_vec(),
        })
    }
}

fn check_truncation(bit_width: BitWidth, truncate_bits: usize) -> Result<(), Error> {
    if truncate_bits < bit_width.bits() as usize {
        Ok(())
    } else {
        Err(Error::InvalidDescriptor(format!(
            "cannot truncate {truncate_bits} bits of a {bit_width} bit value"
        )))
    }
}

impl TensorOpFactory for PlainTensorOpFactory {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn input_my(
        &mut self,
        graph: &mut TensorGraph,
        dims: TensorDimensions,
        bit_width: BitWidth,
    ) -> Result<(InputPromise, TensorHandle), Error> {
        let (mut promises, output) = self.input(graph, dims, bit_width, 1);
        let promise = promises
            .pop()
            .ok_or(Error::WrongInputSize {
                expected: 1,
                actual: 0,
            })?;
        Ok((promise, output))
    }

    fn input_shares(
        &mut self,
        graph: &mut TensorGraph,
        dims: TensorDimensions,
        bit_width: BitWidth,
    ) -> Result<(Vec<InputPromise>, TensorHandle), Error> {
        Ok(self.input(graph, dims, bit_width, self.num_shares))
    }

    fn output_my(
        &mut self,
        graph: &mut TensorGraph,
        input: TensorHandle,
        bit_width: BitWidth,
    ) -> Result<OutputFuture, Error> {
        let (actual, _) = self.operand(graph, input)?;
        if actual != bit_width {
            return Err(Error::BitWidthMismatch {
                expected: actual,
                actual: bit_width,
            });
        }
        let (promise, future) = secret_channel();
        lock(&self.state)
            .nodes
            .push(PlainNode::Output { input, promise });
        Ok(future)
    }

    fn flatten(
        &mut self,
        graph: &mut TensorGraph,
        input: TensorHandle,
        axis: usize,
    ) -> Result<TensorHandle, Error> {
        let (bit_width, dims) = self.operand(graph, input)?;
        let flat = dims.flatten(axis).ok_or_else(|| {
            Error::InvalidDescriptor(format!(
                "Flatten: axis {axis} out of range for rank {}",
                dims.rank()
            ))
        })?;
        Ok(self.record(graph, flat, bit_width, |output| PlainNode::Unary {
            output,
            input,
            op: UnaryOp::Reshape,
        }))
    }

    fn gemm(
        &mut self,
        graph: &mut TensorGraph,
        op: &GemmOp,
        input_a: TensorHandle,
        input_b: TensorHandle,
        truncate_bits: usize,
    ) -> Result<TensorHandle, Error> {
        op.verify()?;
        let (bit_width, dims_a) = self.operand(graph, input_a)?;
        expect_shape(&op.input_a_shape, dims_a)?;
        let (bit_width_b, dims_b) = self.operand(graph, input_b)?;
        expect_shape(&op.input_b_shape, dims_b)?;
        if bit_width != bit_width_b {
            return Err(Error::BitWidthMismatch {
                expected: bit_width,
                actual: bit_width_b,
            });
        }
        check_truncation(bit_width, truncate_bits)?;
        let dims = TensorDimensions::new(op.output_shape);
        Ok(self.record(graph, dims, bit_width, |output| PlainNode::Gemm {
            output,
            input_a,
            input_b,
            op: op.clone(),
            truncate_bits,
        }))
    }

    fn hamm(
        &mut self,
        graph: &mut TensorGraph,
        op: &HammOp,
        input_a: TensorHandle,
        input_b: TensorHandle,
        truncate_bits: usize,
    ) -> Result<TensorHandle, Error> {
        op.verify()?;
        let (_, dims_a) = self.operand(graph, input_a)?;
        expect_shape(&op.input_a_shape, dims_a)?;
        self.binary(graph, input_a, input_b, BinaryOp::Mul { truncate_bits })
    }

    fn sqr(
        &mut self,
        graph: &mut TensorGraph,
        input: TensorHandle,
        truncate_bits: usize,
    ) -> Result<TensorHandle, Error> {
        self.unary(graph, input, UnaryOp::Sqr { truncate_bits })
    }

    fn relu(
        &mut self,
        graph: &mut TensorGraph,
        input: TensorHandle,
    ) -> Result<TensorHandle, Error> {
        self.unary(graph, input, UnaryOp::Relu)
    }

    fn negate(
        &mut self,
        graph: &mut TensorGraph,
        input: TensorHandle,
    ) -> Result<TensorHandle, Error> {
        self.unary(graph, input, UnaryOp::Negate)
    }

    fn const_mul(
        &mut self,
        graph: &mut TensorGraph,
        input: TensorHandle,
        k: &[u64],
    ) -> Result<TensorHandle, Error> {
        self.unary(graph, input, UnaryOp::ConstMul(k.to_vec()))
    }

    fn const_add(
        &mut self,
        graph: &mut TensorGraph,
        input: TensorHandle,
        k: u64,
    ) -> Result<TensorHandle, Error> {
        self.unary(graph, input, UnaryOp::ConstAdd(k))
    }

    fn add(
        &mut self,
        graph: &mut TensorGraph,
        input_a: TensorHandle,
        input_b: TensorHandle,
    ) -> Result<TensorHandle, Error> {
        self.binary(graph, input_a, input_b, BinaryOp::Add)
    }
}

/// Removes `bits` fractional bits from a two's-complement fixed-point value.
fn truncate(bit_width: BitWidth, value: u64, bits: usize) -> u64 {
    bit_width.reduce((bit_width.to_signed(value) >> bits) as u64)
}

fn mul(bit_width: BitWidth, a: u64, b: u64, truncate_bits: usize) -> u64 {
    truncate(bit_width, bit_width.reduce(a.wrapping_mul(b)), truncate_bits)
}

fn apply_unary(bit_width: BitWidth, op: &UnaryOp, values: &[u64]) -> Vec<u64> {
    let w = bit_width;
    match op {
        UnaryOp::Reshape => values.to_vec(),
        UnaryOp::Negate => values.iter().map(|v| w.reduce(v.wrapping_neg())).collect(),
        UnaryOp::Relu => values
            .iter()
            .map(|&v| if w.to_signed(v) < 0 { 0 } else { v })
            .collect(),
        UnaryOp::Sqr { truncate_bits } => values
            .iter()
            .map(|&v| mul(w, v, v, *truncate_bits))
            .collect(),
        UnaryOp::ConstAdd(k) => values.iter().map(|v| w.reduce(v.wrapping_add(*k))).collect(),
        UnaryOp::ConstMul(k) => values
            .iter()
            .zip(k.iter().cycle())
            .map(|(v, k)| w.reduce(v.wrapping_mul(*k)))
            .collect(),
    }
}

fn apply_gemm(
    bit_width: BitWidth,
    op: &GemmOp,
    a: &[u64],
    b: &[u64],
    truncate_bits: usize,
) -> Result<Vec<u64>, Error> {
    let [m, k, n] = op.dimensions()?;
    let a_cols = op.input_a_shape[1];
    let b_cols = op.input_b_shape[1];
    let a_at = |i: usize, l: usize| {
        if op.transpose_a { a[l * a_cols + i] } else { a[i * a_cols + l] }
    };
    let b_at = |l: usize, j: usize| {
        if op.transpose_b { b[j * b_cols + l] } else { b[l * b_cols + j] }
    };
    let mut output = Vec::with_capacity(m * n);
    for i in 0..m {
        for j in 0..n {
            let sum = (0..k).fold(0_u64, |acc, l| {
                acc.wrapping_add(a_at(i, l).wrapping_mul(b_at(l, j)))
            });
            output.push(truncate(bit_width, bit_width.reduce(sum), truncate_bits));
        }
    }
    Ok(output)
}

struct Values(HashMap<TensorHandle, (BitWidth, Vec<u64>)>);

impl Values {
    fn get(&self, handle: TensorHandle) -> Result<&(BitWidth, Vec<u64>), Error> {
        self.0.get(&handle).ok_or(Error::UnknownTensor(handle))
    }

    fn contains(&self, handle: TensorHandle) -> bool {
        self.0.contains_key(&handle)
    }
}

impl PlainNode {
    /// Whether every operand of a non-input node has a value.
    fn is_ready(&self, values: &Values) -> bool {
        match self {
            PlainNode::Input { .. } => false,
            PlainNode::Output { input, .. } | PlainNode::Unary { input, .. } => {
                values.contains(*input)
            }
            PlainNode::Binary {
                input_a, input_b, ..
            }
            | PlainNode::Gemm {
                input_a, input_b, ..
            } => values.contains(*input_a) && values.contains(*input_b),
        }
    }

    /// Evaluates a ready node, storing its result or revealing it.
    fn evaluate(self, values: &mut Values) -> Result<(), Error> {
        match self {
            PlainNode::Input { output, .. } => Err(Error::UnknownTensor(output)),
            PlainNode::Output { input, mut promise } => {
                let (bit_width, v) = values.get(input)?;
                let revealed = IntegerValues::from_ring(*bit_width, v.clone());
                match promise.fulfill(revealed) {
                    Ok(()) => trace!(index = input.index(), "revealed output"),
                    Err(ExchangeError::Disconnected) => {
                        debug!(index = input.index(), "output future was dropped, skipping")
                    }
                    Err(e) => return Err(e.into()),
                }
                Ok(())
            }
            PlainNode::Unary { output, input, op } => {
                let (bit_width, v) = values.get(input)?;
                let w = *bit_width;
                let result = apply_unary(w, &op, v);
                values.0.insert(output, (w, result));
                Ok(())
            }
            PlainNode::Binary {
                output,
                input_a,
                input_b,
                op,
            } => {
                let (bit_width, a) = values.get(input_a)?;
                let (_, b) = values.get(input_b)?;
                let w = *bit_width;
                let result = a
                    .iter()
                    .zip(b)
                    .map(|(&a, &b)| match &op {
                        BinaryOp::Add => w.reduce(a.wrapping_add(b)),
                        BinaryOp::Mul { truncate_bits } => mul(w, a, b, *truncate_bits),
                    })
                    .collect();
                values.0.insert(output, (w, result));
                Ok(())
            }
            PlainNode::Gemm {
                output,
                input_a,
                input_b,
                op,
                truncate_bits,
            } => {
                let (bit_width, a) = values.get(input_a)?;
                let (_, b) = values.get(input_b)?;
                let w = *bit_width;
                let result = apply_gemm(w, &op, a, b, truncate_bits)?;
                values.0.insert(output, (w, result));
                Ok(())
            }
        }
    }
}

/// Sums the shares of an input, checking their width and length.
fn reconstruct(
    bit_width: BitWidth,
    len: usize,
    shares: Vec<IntegerValues>,
) -> Result<Vec<u64>, Error> {
    let mut sum = vec![0_u64; len];
    for share in shares {
        if share.bit_width() != bit_width {
            return Err(Error::BitWidthMismatch {
                expected: bit_width,
                actual: share.bit_width(),
            });
        }
        if share.len() != len {
            return Err(Error::WrongInputSize {
                expected: len,
                actual: share.len(),
            });
        }
        for (acc, v) in sum.iter_mut().zip(share.to_ring()) {
            *acc = bit_width.reduce(acc.wrapping_add(v));
        }
    }
    Ok(sum)
}

/// Evaluates, in construction order, every pending node whose operands are available.
///
/// Operands are always created before the nodes using them, so one pass resolves whole chains.
fn evaluate_ready(pending: &mut Vec<PlainNode>, values: &mut Values) -> Result<(), Error> {
    let mut waiting = Vec::with_capacity(pending.len());
    for node in pending.drain(..) {
        if node.is_ready(values) {
            node.evaluate(values)?;
        } else {
            waiting.push(node);
        }
    }
    *pending = waiting;
    Ok(())
}

impl PlainProgram {
    /// The number of recorded nodes that have not been evaluated yet.
    ///
    /// Zero once the factory was dropped.
    pub fn len(&self) -> usize {
        self.state
            .upgrade()
            .map_or(0, |state| lock(&state).nodes.len())
    }

    /// Whether nothing is left to evaluate.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evaluates all recorded nodes.
    ///
    /// Nodes are evaluated as soon as the inputs they depend on have arrived, so an output is
    /// revealed without waiting for unrelated inputs. Outputs whose future was dropped are
    /// skipped. Fails if an input receives values of the wrong width or length, if an input
    /// promise is dropped, or if the factory (and with it the graph) was already torn down.
    #[instrument(level = Level::DEBUG, skip_all, err)]
    pub async fn run(self) -> Result<(), Error> {
        let state = self.state.upgrade().ok_or(ExchangeError::Disconnected)?;
        let nodes = mem::take(&mut lock(&state).nodes);
        drop(state);
        debug!("evaluating {} plaintext nodes", nodes.len());

        let mut inputs = FuturesUnordered::new();
        let mut pending = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                PlainNode::Input {
                    output,
                    bit_width,
                    len,
                    mut shares,
                } => inputs.push(async move {
                    trace!(index = output.index(), "waiting for {} input shares", shares.len());
                    let shares = try_join_all(shares.iter_mut().map(|share| share.get())).await;
                    (output, bit_width, len, shares)
                }),
                node => pending.push(node),
            }
        }

        let mut values = Values(HashMap::new());
        evaluate_ready(&mut pending, &mut values)?;
        while let Some((output, bit_width, len, shares)) = inputs.next().await {
            let sum = reconstruct(bit_width, len, shares?)?;
            values.0.insert(output, (bit_width, sum));
            evaluate_ready(&mut pending, &mut values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_arithmetic() {
        // -8 >> 2 == -2
        let minus_eight = BitWidth::W32.reduce((-8_i64) as u64);
        assert_eq!(
            truncate(BitWidth::W32, minus_eight, 2),
            BitWidth::W32.reduce((-2_i64) as u64)
        );
        assert_eq!(truncate(BitWidth::W64, 40, 3), 5);
    }

    #[test]
    fn relu_zeroes_negative_values() {
        let w = BitWidth::W64;
        let values = [3, w.reduce((-3_i64) as u64), 0];
        assert_eq!(apply_unary(w, &UnaryOp::Relu, &values), vec![3, 0, 0]);
    }

    #[test]
    fn gemm_with_transposed_operand() {
        // A = [[1, 2], [3, 4]] stored transposed, B = [[5], [6]]
        let op = GemmOp {
            input_a_shape: [2, 2],
            input_b_shape: [2, 1],
            output_shape: [2, 1],
            transpose_a: true,
            transpose_b: false,
        };
        let a_stored = [1, 3, 2, 4];
        let result = apply_gemm(BitWidth::W32, &op, &a_stored, &[5, 6], 0).unwrap();
        assert_eq!(result, vec![17, 39]);
    }

    #[test]
    fn rejects_operands_of_other_protocols() {
        let mut graph = TensorGraph::new();
        let (mut factory, _program) = PlainTensorOpFactory::new(MpcProtocol::ArithmeticGmw);
        let foreign = graph.add_tensor(TensorDimensions::new([2]), MpcProtocol::BooleanGmw);
        let e = factory.relu(&mut graph, foreign).unwrap_err();
        assert!(matches!(
            e,
            Error::ProtocolMismatch {
                expected: MpcProtocol::ArithmeticGmw,
                actual: MpcProtocol::BooleanGmw,
            }
        ));
    }

    #[test]
    fn rejects_mismatched_shapes_and_widths() {
        let mut graph = TensorGraph::new();
        let (mut factory, _program) = PlainTensorOpFactory::new(MpcProtocol::ArithmeticGmw);
        let (_, a) = factory
            .input_my(&mut graph, TensorDimensions::new([2]), BitWidth::W32)
            .unwrap();
        let (_, b) = factory
            .input_my(&mut graph, TensorDimensions::new([3]), BitWidth::W32)
            .unwrap();
        let (_, c) = factory
            .input_my(&mut graph, TensorDimensions::new([2]), BitWidth::W64)
            .unwrap();
        assert!(matches!(
            factory.add(&mut graph, a, b),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            factory.add(&mut graph, a, c),
            Err(Error::BitWidthMismatch { .. })
        ));
        assert!(matches!(
            factory.output_my(&mut graph, a, BitWidth::W64),
            Err(Error::BitWidthMismatch { .. })
        ));
        assert!(matches!(
            factory.sqr(&mut graph, a, 32),
            Err(Error::InvalidDescriptor(_))
        ));
        assert!(matches!(
            factory.const_mul(&mut graph, a, &[1, 2, 3]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn unimplemented_operations_keep_default_diagnostics() {
        let mut graph = TensorGraph::new();
        let (mut factory, _program) = PlainTensorOpFactory::new(MpcProtocol::ArithmeticGmw);
        let (_, a) = factory
            .input_my(&mut graph, TensorDimensions::new([2]), BitWidth::W64)
            .unwrap();
        let e = factory.split(&mut graph, a).unwrap_err();
        assert_eq!(
            e.to_string(),
            "PlainArithmeticGMW does not support the Split operation"
        );
        let e = factory.output_other(&mut graph, a).unwrap_err();
        assert_eq!(
            e.to_string(),
            "PlainArithmeticGMW does not support arithmetic outputs for other parties"
        );
    }
}
