//! # Match Lifecycle Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | propose | pair-guarded insert into the in-memory store |
//! | full lifecycle | propose → accept → complete → report → confirm |
//! | aggregation | planning and applying one confirmed outcome |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use match_consensus::{MatchConsensusApi, MatchRequest, StatisticsAggregator, TeamStatistics};
use match_tests::integration::fixtures::{World, GENESIS};
use shared_types::{MatchDecision, VerificationDecision};
use std::time::Duration;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("benchmark runtime")
}

// ============================================================================
// Negotiation
// ============================================================================

fn bench_propose_and_decline(c: &mut Criterion) {
    let rt = runtime();
    let world = World::new();

    let mut group = c.benchmark_group("negotiation");
    group.measurement_time(Duration::from_secs(5));

    // Decline frees the pair so every iteration proposes on a clean slate
    group.bench_function("propose_then_decline", |b| {
        b.iter(|| {
            rt.block_on(async {
                let request = world.propose(&world.a1, &world.b1).await;
                let declined = world
                    .service
                    .respond_to_match(world.bob, request.id, MatchDecision::Decline)
                    .await
                    .expect("decline");
                black_box(declined)
            })
        })
    });

    group.finish();
}

// ============================================================================
// Full lifecycle
// ============================================================================

async fn confirmed_match(world: &World) -> MatchRequest {
    let request = world.played(&world.a1, &world.b1).await;
    let result = world.report(&request, world.alice, world.a1.id).await;
    world
        .service
        .verify_outcome(world.bob, result.id, VerificationDecision::Confirm, None)
        .await
        .expect("confirm");
    request
}

fn bench_full_lifecycle(c: &mut Criterion) {
    let rt = runtime();

    let mut group = c.benchmark_group("lifecycle");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("confirmed_match", |b| {
        let world = World::new();
        b.iter(|| rt.block_on(async { black_box(confirmed_match(&world).await) }))
    });

    // History listing cost as the store fills up
    for played in [10usize, 100, 500] {
        let world = World::new();
        rt.block_on(async {
            for _ in 0..played {
                confirmed_match(&world).await;
            }
        });

        group.throughput(Throughput::Elements(played as u64));
        group.bench_with_input(
            BenchmarkId::new("list_history", played),
            &world,
            |b, world| {
                b.iter(|| {
                    rt.block_on(async {
                        let listed = world
                            .service
                            .list_matches(world.alice, Default::default())
                            .await
                            .expect("list");
                        black_box(listed.len())
                    })
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Aggregation
// ============================================================================

fn bench_aggregation(c: &mut Criterion) {
    let rt = runtime();
    let world = World::new();
    let (request, result) = rt.block_on(async {
        let request = world.played(&world.a1, &world.b1).await;
        let result = world.report(&request, world.alice, world.a1.id).await;
        (request, result)
    });

    c.bench_function("aggregation/plan_and_apply", |b| {
        let mut winner = TeamStatistics::empty(world.a1.id);
        let mut loser = TeamStatistics::empty(world.b1.id);
        b.iter(|| {
            let plan = StatisticsAggregator::plan(&request, &result).expect("plan");
            StatisticsAggregator::apply_outcome(
                &plan,
                &mut winner,
                &mut loser,
                GENESIS,
            )
            .expect("apply");
            black_box(winner.win_rate)
        })
    });
}

criterion_group!(
    benches,
    bench_propose_and_decline,
    bench_full_lifecycle,
    bench_aggregation
);
criterion_main!(benches);
