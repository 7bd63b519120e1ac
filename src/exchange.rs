//! Single-shot promise/future channels used to move plaintext values in and out of a graph.
//!
//! A [`SecretPromise`] is the producer half: whoever holds it delivers exactly one value. The
//! paired [`SecretFuture`] is the consumer half: whoever holds it receives that value exactly
//! once. Graph construction never waits on either half. The value is handed over later, when the
//! execution engine runs, and awaiting only suspends the task that awaits.
//!
//! Dropping one half breaks the channel for the other. This is how tearing down a graph unblocks
//! every pending await: the graph owns the halves it has not handed out, and dropping it resolves
//! the counterparts with [`ExchangeError::Disconnected`].

use tokio::sync::oneshot::{self, error::TryRecvError};

/// Misuse of, or a broken, secret exchange channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    /// The promise was already fulfilled once.
    #[error("promise was already fulfilled")]
    AlreadyFulfilled,
    /// The value of the future was already taken.
    #[error("future was already awaited")]
    AlreadyConsumed,
    /// The other half of the channel was dropped before the value was handed over.
    #[error("the other end of the channel was dropped")]
    Disconnected,
}

/// Observable state of a channel from the producer's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No value was delivered yet and the consumer is still alive.
    Empty,
    /// A value was delivered.
    Fulfilled,
    /// The consumer is gone, a value can no longer be delivered.
    Broken,
}

/// Creates a connected promise/future pair for a single value.
pub fn secret_channel<T>() -> (SecretPromise<T>, SecretFuture<T>) {
    let (tx, rx) = oneshot::channel();
    (SecretPromise { tx: Some(tx) }, SecretFuture { rx: Some(rx) })
}

/// The producing half of a secret exchange channel.
#[derive(Debug)]
pub struct SecretPromise<T> {
    tx: Option<oneshot::Sender<T>>,
}

impl<T> SecretPromise<T> {
    /// Delivers the value to the paired [`SecretFuture`].
    ///
    /// Fulfilling before anybody awaits is fine, the value is buffered in the channel.
    pub fn fulfill(&mut self, value: T) -> Result<(), ExchangeError> {
        match &self.tx {
            None => return Err(ExchangeError::AlreadyFulfilled),
            Some(tx) if tx.is_closed() => return Err(ExchangeError::Disconnected),
            Some(_) => {}
        }
        let tx = self.tx.take().ok_or(ExchangeError::AlreadyFulfilled)?;
        tx.send(value).map_err(|_| ExchangeError::Disconnected)
    }

    /// Returns the current state of the channel.
    pub fn state(&self) -> ChannelState {
        match &self.tx {
            None => ChannelState::Fulfilled,
            Some(tx) if tx.is_closed() => ChannelState::Broken,
            Some(_) => ChannelState::Empty,
        }
    }
}

/// The consuming half of a secret exchange channel.
#[derive(Debug)]
pub struct SecretFuture<T> {
    rx: Option<oneshot::Receiver<T>>,
}

impl<T> SecretFuture<T> {
    /// Waits for the value of the paired [`SecretPromise`].
    ///
    /// Only the calling task is suspended. Resolves with [`ExchangeError::Disconnected`] if the
    /// promise is dropped without being fulfilled, and with [`ExchangeError::AlreadyConsumed`]
    /// on every call after the first.
    pub async fn get(&mut self) -> Result<T, ExchangeError> {
        let rx = self.rx.take().ok_or(ExchangeError::AlreadyConsumed)?;
        rx.await.map_err(|_| ExchangeError::Disconnected)
    }

    /// Takes the value if it has already been delivered, without suspending.
    ///
    /// Returns `Ok(None)` while the promise is still pending.
    pub fn try_get(&mut self) -> Result<Option<T>, ExchangeError> {
        let rx = self.rx.as_mut().ok_or(ExchangeError::AlreadyConsumed)?;
        match rx.try_recv() {
            Ok(value) => {
                self.rx = None;
                Ok(Some(value))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(ExchangeError::Disconnected),
        }
    }

    /// Whether the value was already taken out of this future.
    pub fn is_consumed(&self) -> bool {
        self.rx.is_none()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn fulfill_before_await() -> Result<(), ExchangeError> {
        let (mut promise, mut future) = secret_channel();
        promise.fulfill(vec![1_u64, 2, 3])?;
        assert_eq!(promise.state(), ChannelState::Fulfilled);
        assert_eq!(future.get().await?, vec![1, 2, 3]);
        assert!(future.is_consumed());
        Ok(())
    }

    #[tokio::test]
    async fn await_before_fulfill() {
        let (mut promise, mut future) = secret_channel::<u32>();
        let consumer = tokio::spawn(async move { future.get().await });
        tokio::task::yield_now().await;
        promise.fulfill(42).unwrap();
        assert_eq!(consumer.await.unwrap(), Ok(42));
    }

    #[tokio::test]
    async fn awaiting_does_not_block_other_tasks() {
        let (mut promise, mut future) = secret_channel::<u32>();
        let (mut other_promise, mut other_future) = secret_channel::<u32>();
        let (a, b) = tokio::join!(future.get(), async {
            other_promise.fulfill(7).unwrap();
            let b = other_future.get().await;
            promise.fulfill(8).unwrap();
            b
        });
        assert_eq!(a, Ok(8));
        assert_eq!(b, Ok(7));
    }

    #[tokio::test]
    async fn second_fulfill_fails() {
        let (mut promise, mut future) = secret_channel();
        promise.fulfill(1_u8).unwrap();
        assert_eq!(promise.fulfill(2), Err(ExchangeError::AlreadyFulfilled));
        assert_eq!(future.get().await, Ok(1));
    }

    #[tokio::test]
    async fn second_await_fails() {
        let (mut promise, mut future) = secret_channel();
        promise.fulfill("value").unwrap();
        assert_eq!(future.get().await, Ok("value"));
        assert_eq!(future.get().await, Err(ExchangeError::AlreadyConsumed));
        assert_eq!(future.try_get(), Err(ExchangeError::AlreadyConsumed));
    }

    #[tokio::test]
    async fn dropped_promise_breaks_pending_await() {
        let (promise, mut future) = secret_channel::<u64>();
        let consumer = tokio::spawn(async move { future.get().await });
        tokio::task::yield_now().await;
        drop(promise);
        let result = tokio::time::timeout(Duration::from_secs(5), consumer)
            .await
            .expect("await must not hang")
            .unwrap();
        assert_eq!(result, Err(ExchangeError::Disconnected));
    }

    #[test]
    fn dropped_future_breaks_promise() {
        let (mut promise, future) = secret_channel::<u64>();
        assert_eq!(promise.state(), ChannelState::Empty);
        drop(future);
        assert_eq!(promise.state(), ChannelState::Broken);
        assert_eq!(promise.fulfill(5), Err(ExchangeError::Disconnected));
        assert_eq!(promise.state(), ChannelState::Broken);
    }

    #[test]
    fn try_get_polls_without_suspending() {
        let (mut promise, mut future) = secret_channel::<u64>();
        assert_eq!(future.try_get(), Ok(None));
        promise.fulfill(9).unwrap();
        assert_eq!(future.try_get(), Ok(Some(9)));
        assert!(future.is_consumed());
    }

    #[test]
    fn try_get_reports_broken_channel() {
        let (promise, mut future) = secret_channel::<u64>();
        drop(promise);
        assert_eq!(future.try_get(), Err(ExchangeError::Disconnected));
        assert!(!future.is_consumed());
    }
}
