//! Backend-agnostic construction of tensor graphs for secure multi-party computation (MPC).
//!
//! A graph builder growing a neural network or other tensor computation should not need to know
//! how a protocol multiplies secret-shared matrices or garbles a comparison. This crate defines
//! the contract in between: [`factory::TensorOpFactory`] lists every tensor-level operation a
//! backend may implement, from secret inputs and outputs over protocol conversions to
//! convolutions, matrix products, pooling and ReLU.
//!
//! ## Main Components
//!
//! * [`factory`]: The [`factory::TensorOpFactory`] trait. Each operation fails with
//!   [`factory::Unsupported`] unless a backend overrides it, so missing support is always
//!   reported with the backend's name and the rejected operation.
//! * [`exchange`]: Single-shot promise/future channels through which plaintext enters and
//!   leaves the graph without blocking graph construction.
//! * [`graph`]: The arena of tensor nodes and the `Copy` handles referring to them.
//! * [`builder`]: A builder holding one backend per [`protocol::MpcProtocol`] that converts
//!   tensors between protocols only when asked to.
//! * [`ops`]: Shape descriptors for convolutions, matrix products, pooling and joins.
//! * [`plain`]: A cleartext backend for testing builders. It offers no security.
//!
//! ## Example
//!
//! ```ignore
//! use mpc_tensor::{
//!     builder::GraphBuilder,
//!     data_types::{BitWidth, IntegerValues},
//!     ops::TensorDimensions,
//!     plain::PlainTensorOpFactory,
//!     protocol::MpcProtocol,
//! };
//!
//! # async fn example() -> Result<(), mpc_tensor::error::Error> {
//! let (factory, program) = PlainTensorOpFactory::new(MpcProtocol::ArithmeticGmw);
//! let mut builder = GraphBuilder::new();
//! builder.register(MpcProtocol::ArithmeticGmw, factory);
//!
//! let (mut promise, mut future) = builder.with_factory(MpcProtocol::ArithmeticGmw, |f, g| {
//!     let (promise, x) = f.input_my(g, TensorDimensions::new([3]), BitWidth::W64)?;
//!     let y = f.relu(g, x)?;
//!     Ok((promise, f.output_my(g, y, BitWidth::W64)?))
//! })?;
//!
//! promise.fulfill(IntegerValues::U64(vec![1, u64::MAX, 3]))?;
//! program.run().await?;
//! assert_eq!(future.get().await?, IntegerValues::U64(vec![1, 0, 3]));
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod builder;
pub mod data_types;
pub mod error;
pub mod exchange;
pub mod factory;
pub mod graph;
pub mod ops;
pub mod plain;
pub mod protocol;

pub use error::Error;
