//! Steer law / per-tick pipeline micro-benchmark.
//!
//! Measures throughput of the hot per-tick stages:
//! - steer() alone across all 16 sensor patterns
//! - BarDetector::poll() over a synthetic bar waveform
//! - full sense-decide-apply tick through the facade on a bench rig

use criterion::{Criterion, criterion_group, criterion_main};

use porter_common::config::{BarConfig, DriveConfig, RobotConfig};
use porter_common::consts::TICK_MS;
use porter_common::hw::types::SensorMask;
use porter_core::bar::BarDetector;
use porter_core::robot::Robot;
use porter_core::steer::steer;
use porter_hal::rig::SimRig;

fn bench_steer_law(c: &mut Criterion) {
    let drive = DriveConfig::default();
    let mut cycle = 0u64;

    c.bench_function("steer", |b| {
        b.iter(|| {
            cycle += 1;
            let mask = SensorMask::from_bits_truncate(cycle as u8 & 0x0F);
            steer(mask, &drive)
        });
    });
}

fn bench_bar_detector(c: &mut Criterion) {
    let config = BarConfig::default();
    let mut detector = BarDetector::new(&config);
    let mut cycle = 0u64;

    c.bench_function("bar_poll", |b| {
        b.iter(|| {
            cycle += 1;
            // A bar 16 ticks wide every 128 ticks, line in between.
            let coverage = if cycle % 128 < 16 { 3 } else { 1 };
            detector.poll(coverage, cycle * u64::from(TICK_MS))
        });
    });
}

fn bench_line_follow_tick(c: &mut Criterion) {
    let mut rig = SimRig::new();
    rig.line_at(0, 0b0110);
    let mut robot = Robot::new(rig, RobotConfig::default()).unwrap();

    c.bench_function("line_follow_tick", |b| {
        b.iter(|| {
            robot.update_line_sensors();
            robot.line_follow();
            robot.snapshot()
        });
    });
}

criterion_group!(
    benches,
    bench_steer_law,
    bench_bar_detector,
    bench_line_follow_tick,
);
criterion_main!(benches);
