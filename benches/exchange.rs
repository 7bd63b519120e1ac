use criterion::{BatchSize, Criterion};
use mpc_tensor::{
    data_types::{BitWidth, IntegerValues},
    exchange::secret_channel,
};
use tokio::runtime::Runtime;

pub fn exchange_benchmark(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("exchange");

    group.bench_function("fulfill then await", |b| {
        b.to_async(&rt).iter(|| async {
            let (mut promise, mut future) = secret_channel();
            promise
                .fulfill(IntegerValues::zeros(BitWidth::W64, 1024))
                .expect("future is alive");
            future.get().await.expect("promise was fulfilled")
        })
    });

    group.bench_function("await then fulfill", |b| {
        b.to_async(&rt).iter_batched(
            secret_channel::<u64>,
            |(mut promise, mut future)| async move {
                let waiter = tokio::spawn(async move { future.get().await });
                promise.fulfill(42).expect("future is alive");
                waiter
                    .await
                    .expect("join failed")
                    .expect("promise was fulfilled")
            },
            BatchSize::SmallInput,
        )
    });
}
