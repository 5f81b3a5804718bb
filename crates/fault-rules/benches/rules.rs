//! Criterion benchmarks for fault rule evaluation over a day of one-minute data.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fault_rules::{
    Fc1Config, Fc4Config, Fc6Config, FaultConditionFour, FaultConditionOne, FaultConditionSix,
    FaultRule,
};
use sensor_table::{ColumnData, SensorTable};

const ROWS_PER_DAY: usize = 24 * 60;

fn synthetic_day(days: usize) -> SensorTable {
    let rows = ROWS_PER_DAY * days;
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let wave = |i: usize, period: f64| ((i as f64 / period).sin() + 1.0) / 2.0;

    SensorTable::with_regular_index(start, Duration::minutes(1), rows)
        .unwrap()
        .with_column("duct_static", ColumnData::Float((0..rows).map(|i| 0.5 + wave(i, 30.0)).collect()))
        .unwrap()
        .with_column("duct_static_setpoint", ColumnData::Float(vec![1.0; rows]))
        .unwrap()
        .with_column("supply_vfd_speed", ColumnData::Float((0..rows).map(|i| wave(i, 45.0)).collect()))
        .unwrap()
        .with_column("economizer_sig", ColumnData::Float((0..rows).map(|i| if i % 7 < 3 { 0.2 } else { wave(i, 11.0) }).collect()))
        .unwrap()
        .with_column("heating_sig", ColumnData::Float((0..rows).map(|i| if i % 13 < 4 { wave(i, 5.0) } else { 0.0 }).collect()))
        .unwrap()
        .with_column("cooling_sig", ColumnData::Float((0..rows).map(|i| if i % 13 >= 8 { wave(i, 9.0) } else { 0.0 }).collect()))
        .unwrap()
        .with_column("mat", ColumnData::Float((0..rows).map(|i| 55.0 + 10.0 * wave(i, 60.0)).collect()))
        .unwrap()
        .with_column("rat", ColumnData::Float(vec![72.0; rows]))
        .unwrap()
        .with_column("oat", ColumnData::Float((0..rows).map(|i| 40.0 + 30.0 * wave(i, 720.0)).collect()))
        .unwrap()
        .with_column("supply_fan_air_volume", ColumnData::Float((0..rows).map(|i| 8000.0 + 4000.0 * wave(i, 90.0)).collect()))
        .unwrap()
}

fn bench_rules(c: &mut Criterion) {
    let fc1 = FaultConditionOne::new(Fc1Config {
        rolling_window_size: 5,
        ..Default::default()
    })
    .unwrap();
    let fc4 = FaultConditionFour::new(Fc4Config::default()).unwrap();
    let fc6 = FaultConditionSix::new(Fc6Config::default()).unwrap();

    let mut group = c.benchmark_group("rules");
    for days in [1usize, 7] {
        let table = synthetic_day(days);
        group.bench_with_input(BenchmarkId::new("fc1", days), &table, |b, t| {
            b.iter(|| fc1.apply(black_box(t)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("fc4", days), &table, |b, t| {
            b.iter(|| fc4.apply(black_box(t)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("fc6", days), &table, |b, t| {
            b.iter(|| fc6.apply(black_box(t)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rules);
criterion_main!(benches);
