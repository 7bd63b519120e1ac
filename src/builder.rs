//! A graph builder holding one backend per protocol, with explicit conversion fallback.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::{
    error::Error,
    factory::{Operation, TensorOpFactory},
    graph::{TensorGraph, TensorHandle},
    protocol::MpcProtocol,
};

/// Owns the tensor arena and the backends that grow it.
///
/// All factory calls go through `&mut self`, so the graph is only ever mutated from one builder
/// context. Dropping the builder (or calling [`GraphBuilder::teardown`]) drops the arena and the
/// backends together with every channel half they still hold.
#[derive(Default)]
pub struct GraphBuilder {
    graph: TensorGraph,
    factories: BTreeMap<MpcProtocol, Box<dyn TensorOpFactory>>,
}

impl GraphBuilder {
    /// Creates a builder with an empty graph and no backends.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the backend for `protocol`, returning the one it replaces.
    pub fn register(
        &mut self,
        protocol: MpcProtocol,
        factory: impl TensorOpFactory + 'static,
    ) -> Option<Box<dyn TensorOpFactory>> {
        debug!(%protocol, provider = factory.provider_name(), "registering backend");
        let previous = self.factories.insert(protocol, Box::new(factory));
        if let Some(previous) = &previous {
            warn!(
                %protocol,
                provider = previous.provider_name(),
                "replaced previously registered backend"
            );
        }
        previous
    }

    /// The protocols that have a backend.
    pub fn protocols(&self) -> impl Iterator<Item = MpcProtocol> + '_ {
        self.factories.keys().copied()
    }

    /// The graph built so far.
    pub fn graph(&self) -> &TensorGraph {
        &self.graph
    }

    /// Runs `f` with the backend of `protocol` and the graph.
    pub fn with_factory<R>(
        &mut self,
        protocol: MpcProtocol,
        f: impl FnOnce(&mut dyn TensorOpFactory, &mut TensorGraph) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let factory = self
            .factories
            .get_mut(&protocol)
            .ok_or(Error::MissingFactory(protocol))?;
        f(factory.as_mut(), &mut self.graph)
    }

    /// Runs `f` with the backend of the protocol `input` is shared in.
    pub fn with_factory_of<R>(
        &mut self,
        input: TensorHandle,
        f: impl FnOnce(&mut dyn TensorOpFactory, &mut TensorGraph) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let protocol = self.graph.protocol(input)?;
        self.with_factory(protocol, f)
    }

    /// Returns a handle to the value of `input` shared in `target`.
    ///
    /// If `input` already lives in `target` it is returned as is. Otherwise the backend of the
    /// current protocol is asked for a conversion. An unsupported conversion fails, no other
    /// protocol is tried in its place.
    pub fn ensure_protocol(
        &mut self,
        input: TensorHandle,
        target: MpcProtocol,
    ) -> Result<TensorHandle, Error> {
        let source = self.graph.protocol(input)?;
        if source == target {
            return Ok(input);
        }
        debug!(%source, %target, index = input.index(), "converting tensor");
        self.with_factory(source, |factory, graph| {
            factory.conversion(graph, target, input)
        })
    }

    /// Applies `op` to `input` in its own protocol, falling back to `fallback` if unsupported.
    ///
    /// Only an [`Unsupported`](crate::factory::Unsupported) tensor operation triggers the
    /// fallback: `input` is then converted with [`GraphBuilder::ensure_protocol`] and `op` is
    /// retried once with the backend of `fallback`. Every other error is returned as is.
    pub fn apply_with_fallback<R>(
        &mut self,
        input: TensorHandle,
        fallback: MpcProtocol,
        mut op: impl FnMut(
            &mut dyn TensorOpFactory,
            &mut TensorGraph,
            TensorHandle,
        ) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let first = self.with_factory_of(input, |factory, graph| op(factory, graph, input));
        match first {
            Err(Error::Unsupported(e)) if !matches!(e.operation, Operation::Conversion(_)) => {
                debug!(provider = %e.provider, operation = %e.operation, %fallback, "falling back");
                let converted = self.ensure_protocol(input, fallback)?;
                self.with_factory(fallback, |factory, graph| op(factory, graph, converted))
            }
            result => result,
        }
    }

    /// Drops the graph and all backends.
    ///
    /// Every input future and output promise still held by a backend is dropped, so callers
    /// awaiting them are woken with a broken channel error.
    pub fn teardown(self) {
        debug!(
            tensors = self.graph.len(),
            backends = self.factories.len(),
            "tearing down graph"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::TensorDimensions;

    /// Arithmetic backend that can only convert into the Boolean protocol.
    struct ArithmeticStub;

    impl TensorOpFactory for ArithmeticStub {
        fn provider_name(&self) -> &str {
            "ArithmeticStub"
        }

        fn conversion(
            &mut self,
            graph: &mut TensorGraph,
            target: MpcProtocol,
            input: TensorHandle,
        ) -> Result<TensorHandle, Error> {
            if target != MpcProtocol::BooleanGmw {
                return Err(crate::factory::unsupported(self, Operation::Conversion(target)));
            }
            let dims = graph.dimensions(input)?.clone();
            Ok(graph.add_tensor(dims, target))
        }
    }

    /// Boolean backend that only knows ReLU.
    struct BooleanStub;

    impl TensorOpFactory for BooleanStub {
        fn provider_name(&self) -> &str {
            "BooleanStub"
        }

        fn relu(
            &mut self,
            graph: &mut TensorGraph,
            input: TensorHandle,
        ) -> Result<TensorHandle, Error> {
            let dims = graph.dimensions(input)?.clone();
            Ok(graph.add_tensor(dims, MpcProtocol::BooleanGmw))
        }
    }

    fn builder_with_input() -> (GraphBuilder, TensorHandle) {
        let mut builder = GraphBuilder::new();
        builder.register(MpcProtocol::ArithmeticGmw, ArithmeticStub);
        builder.register(MpcProtocol::BooleanGmw, BooleanStub);
        let input = builder
            .graph
            .add_tensor(TensorDimensions::new([2, 3]), MpcProtocol::ArithmeticGmw);
        (builder, input)
    }

    #[test]
    fn same_protocol_is_a_no_op() -> Result<(), Error> {
        let (mut builder, input) = builder_with_input();
        assert_eq!(builder.ensure_protocol(input, MpcProtocol::ArithmeticGmw)?, input);
        assert_eq!(builder.graph().len(), 1);
        Ok(())
    }

    #[test]
    fn conversion_creates_a_new_handle() -> Result<(), Error> {
        let (mut builder, input) = builder_with_input();
        let converted = builder.ensure_protocol(input, MpcProtocol::BooleanGmw)?;
        assert_ne!(converted, input);
        assert_eq!(builder.graph().protocol(input)?, MpcProtocol::ArithmeticGmw);
        assert_eq!(builder.graph().protocol(converted)?, MpcProtocol::BooleanGmw);
        assert_eq!(
            builder.graph().dimensions(converted)?,
            builder.graph().dimensions(input)?
        );
        Ok(())
    }

    #[test]
    fn unsupported_conversion_is_not_rerouted() {
        let (mut builder, input) = builder_with_input();
        builder.register(MpcProtocol::Yao, BooleanStub);
        let e = builder.ensure_protocol(input, MpcProtocol::Yao).unwrap_err();
        assert_eq!(
            e.to_string(),
            "ArithmeticStub does not support conversions to the Yao protocol"
        );
        assert_eq!(builder.graph().len(), 1);
    }

    #[test]
    fn missing_backend() {
        let mut builder = GraphBuilder::new();
        builder.register(MpcProtocol::BooleanGmw, BooleanStub);
        let input = builder
            .graph
            .add_tensor(TensorDimensions::new([1]), MpcProtocol::Bmr);
        let e = builder
            .ensure_protocol(input, MpcProtocol::BooleanGmw)
            .unwrap_err();
        assert!(matches!(e, Error::MissingFactory(MpcProtocol::Bmr)));
    }

    #[test]
    fn fallback_converts_and_retries() -> Result<(), Error> {
        let (mut builder, input) = builder_with_input();
        let output = builder.apply_with_fallback(input, MpcProtocol::BooleanGmw, |f, g, h| {
            f.relu(g, h)
        })?;
        assert_eq!(builder.graph().protocol(output)?, MpcProtocol::BooleanGmw);
        // input, converted input, relu output
        assert_eq!(builder.graph().len(), 3);
        Ok(())
    }

    #[test]
    fn fallback_fails_when_target_lacks_the_operation() {
        let (mut builder, input) = builder_with_input();
        let e = builder
            .apply_with_fallback(input, MpcProtocol::BooleanGmw, |f, g, h| f.negate(g, h))
            .unwrap_err();
        assert_eq!(e.to_string(), "BooleanStub does not support the Negate operation");
    }

    #[test]
    fn register_replaces_backend() {
        let mut builder = GraphBuilder::new();
        assert!(builder.register(MpcProtocol::Yao, BooleanStub).is_none());
        let previous = builder.register(MpcProtocol::Yao, ArithmeticStub);
        assert_eq!(previous.unwrap().provider_name(), "BooleanStub");
        assert_eq!(builder.protocols().collect::<Vec<_>>(), vec![MpcProtocol::Yao]);
    }
}
