//! End-to-end pipeline scenarios: sampler -> buffer -> hub -> subscriber.
//!
//! All tests run under paused tokio time, so ticks, retries, and timeouts are
//! deterministic.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use common::{Outcome, PanickingProbe, ScriptedProbe, SlowProbe, test_config};

use syspulse_collector::collector::Collector;
use syspulse_collector::probe::Probe;
use syspulse_collector::Sampler;
use syspulse_core::{MetricFilter, MetricValue, SysPulseError};

fn gauge(v: f64) -> MetricValue {
    MetricValue::Gauge(v)
}

#[tokio::test(start_paused = true)]
async fn ring_eviction_end_to_end() {
    // capacity=3, one metric "x", probe returns 1,2,3,4 on consecutive ticks.
    let cfg = test_config(3);
    let probes: Vec<Box<dyn Probe>> =
        vec![Box::new(ScriptedProbe::values("x", [1.0, 2.0, 3.0, 4.0]))];
    let handle = Collector::new(cfg, probes).unwrap().spawn();

    let (_sub, mut rx) = handle.subscribe(MetricFilter::All);

    let mut last_ts = 0;
    for seq in 1..=4u64 {
        let b = rx.recv().await.expect("tick batch");
        assert_eq!(b.seq, seq);
        assert_eq!(b.samples.len(), 1);
        assert_eq!(b.samples[0].value, gauge(seq as f64));
        assert!(b.timestamp_ms > last_ts, "nominal timestamps must increase");
        last_ts = b.timestamp_ms;
    }

    // After tick 4 the oldest sample (1) is evicted.
    let snap = handle.snapshot(&MetricFilter::All);
    let values: Vec<f64> = snap[0].points.iter().map(|p| p.value.as_f64()).collect();
    assert_eq!(values, vec![2.0, 3.0, 4.0]);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_tick_leaves_an_explicit_gap() {
    // Probe for "y" fails on tick 2 only.
    let cfg = test_config(16);
    let probes: Vec<Box<dyn Probe>> = vec![Box::new(ScriptedProbe::gauge(
        "y",
        [Outcome::Value(10.0), Outcome::Fail("boom"), Outcome::Value(12.0)],
    ))];
    let handle = Collector::new(cfg, probes).unwrap().spawn();
    let (_sub, mut rx) = handle.subscribe(MetricFilter::All);

    // Published batches: [y=10], [error y], [y=12].
    let b1 = rx.recv().await.unwrap();
    assert_eq!(b1.samples[0].value, gauge(10.0));
    assert!(b1.errors.is_empty());

    let b2 = rx.recv().await.unwrap();
    assert!(b2.samples.is_empty());
    assert_eq!(b2.errors.len(), 1);
    assert_eq!(b2.errors[0].metric.as_str(), "y");
    assert!(b2.errors[0].reason.contains("boom"));

    let b3 = rx.recv().await.unwrap();
    assert_eq!(b3.samples[0].value, gauge(12.0));

    // Series for y = [10, 12] with a timestamp gap where tick 2 would be.
    let snap = handle.snapshot(&MetricFilter::only(["y"]));
    let points = &snap[0].points;
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].value, gauge(10.0));
    assert_eq!(points[1].value, gauge(12.0));
    assert_eq!(points[1].timestamp_ms - points[0].timestamp_ms, 2_000);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failing_probe_does_not_stop_siblings() {
    let cfg = test_config(16);
    let probes: Vec<Box<dyn Probe>> = vec![
        Box::new(ScriptedProbe::values("x", [1.0, 2.0])),
        Box::new(ScriptedProbe::gauge("y", [Outcome::Fail("dead"), Outcome::Fail("dead")])),
    ];
    let handle = Collector::new(cfg, probes).unwrap().spawn();
    let (_sub, mut rx) = handle.subscribe(MetricFilter::All);

    let b = rx.recv().await.unwrap();
    assert_eq!(b.samples.len(), 1);
    assert_eq!(b.samples[0].metric.as_str(), "x");
    assert_eq!(b.errors.len(), 1);
    assert_eq!(b.errors[0].metric.as_str(), "y");

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn retry_recovers_within_the_same_tick() {
    let mut cfg = test_config(16);
    cfg.sampler.retry.max_attempts = 3;

    let probes: Vec<Box<dyn Probe>> = vec![Box::new(ScriptedProbe::gauge(
        "x",
        [Outcome::Fail("blip"), Outcome::Fail("blip"), Outcome::Value(5.0)],
    ))];
    let mut sampler = Sampler::new(probes, &cfg.sampler);

    let batch = sampler.tick(1, 1_000).await;
    assert_eq!(batch.samples.len(), 1);
    assert_eq!(batch.samples[0].value, gauge(5.0));
    assert!(batch.errors.is_empty());
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_degrade_to_a_sample_error() {
    let mut cfg = test_config(16);
    cfg.sampler.retry.max_attempts = 2;

    let probes: Vec<Box<dyn Probe>> = vec![Box::new(ScriptedProbe::gauge(
        "x",
        [Outcome::Fail("a"), Outcome::Fail("b"), Outcome::Value(9.0)],
    ))];
    let mut sampler = Sampler::new(probes, &cfg.sampler);

    // Tick 1 burns both attempts and reports the last failure.
    let b1 = sampler.tick(1, 1_000).await;
    assert!(b1.samples.is_empty());
    assert!(b1.errors[0].reason.contains('b'));

    // Tick 2's first attempt succeeds.
    let b2 = sampler.tick(2, 2_000).await;
    assert_eq!(b2.samples[0].value, gauge(9.0));
}

#[tokio::test(start_paused = true)]
async fn stalled_probe_times_out_and_counts_as_failed() {
    let cfg = test_config(16);
    let probes: Vec<Box<dyn Probe>> = vec![Box::new(SlowProbe::new("x", 10_000))];
    let mut sampler = Sampler::new(probes, &cfg.sampler);

    let batch = sampler.tick(1, 1_000).await;
    assert!(batch.samples.is_empty());
    assert_eq!(batch.errors.len(), 1);
    assert!(batch.errors[0].reason.contains("timed out"));
}

#[tokio::test(start_paused = true)]
async fn probe_panic_is_a_fatal_scheduler_fault() {
    let cfg = test_config(16);
    let probes: Vec<Box<dyn Probe>> = vec![Box::new(PanickingProbe::new("x"))];
    let handle = Collector::new(cfg, probes).unwrap().spawn();

    let err = handle.join().await.expect_err("loop must die");
    assert!(err.is_fatal());
    assert!(matches!(err, SysPulseError::Scheduler(_)));
}

#[tokio::test(start_paused = true)]
async fn independent_collectors_share_no_state() {
    let a = Collector::new(
        test_config(8),
        vec![Box::new(ScriptedProbe::values("x", [1.0])) as Box<dyn Probe>],
    )
    .unwrap()
    .spawn();
    let b = Collector::new(
        test_config(8),
        vec![Box::new(ScriptedProbe::values("x", [100.0])) as Box<dyn Probe>],
    )
    .unwrap()
    .spawn();

    let (_sa, mut rxa) = a.subscribe(MetricFilter::All);
    let (_sb, mut rxb) = b.subscribe(MetricFilter::All);
    rxa.recv().await.unwrap();
    rxb.recv().await.unwrap();

    let sa = a.snapshot(&MetricFilter::All);
    let sb = b.snapshot(&MetricFilter::All);
    assert_eq!(sa[0].points[0].value, gauge(1.0));
    assert_eq!(sb[0].points[0].value, gauge(100.0));

    a.shutdown().await.unwrap();
    b.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn snapshot_of_unknown_metric_is_empty() {
    let cfg = test_config(8);
    let probes: Vec<Box<dyn Probe>> =
        vec![Box::new(ScriptedProbe::values("x", [1.0]))];
    let handle = Collector::new(cfg, probes).unwrap().spawn();

    let snap = handle.snapshot(&MetricFilter::only(["nope"]));
    assert!(snap.is_empty());

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_ends_subscriptions_cleanly() {
    let cfg = test_config(8);
    let probes: Vec<Box<dyn Probe>> =
        vec![Box::new(ScriptedProbe::values("x", [1.0, 2.0, 3.0]))];
    let handle = Collector::new(cfg, probes).unwrap().spawn();
    let (_sub, mut rx) = handle.subscribe(MetricFilter::All);

    rx.recv().await.unwrap();
    handle.shutdown().await.unwrap();

    // Drain whatever was queued before the halt; then end-of-stream.
    while let Some(_batch) = rx.recv().await {}
}
