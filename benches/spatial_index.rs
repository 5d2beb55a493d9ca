use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use radiolink::{LatLon, ProjectedPoint, StationIndex, WeatherIndex, WeatherObservation};

fn first_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
}

/// Fills metropolitan France with a regular grid, roughly the SIM2 8 km spacing,
/// once per day.
fn grid(days: u64) -> Vec<WeatherObservation> {
    let mut observations = Vec::new();
    for day in 0..days {
        let date = first_day() + Days::new(day);
        for i in 0..130 {
            for j in 0..140 {
                let position = LatLon(42.0 + i as f64 * 0.072, -4.8 + j as f64 * 0.1);
                observations.push(WeatherObservation {
                    station_id: format!("{i:03}-{j:03}"),
                    date,
                    projected: ProjectedPoint { x: 0.0, y: 0.0 },
                    position,
                    precipitation_mm: 0.0,
                    snowfall_mm: 0.0,
                });
            }
        }
    }
    observations
}

fn bench_station_index(c: &mut Criterion) {
    let observations = grid(1);
    c.bench_function("station_index_build", |b| {
        b.iter(|| StationIndex::build(black_box(observations.clone())))
    });

    let index = StationIndex::build(observations);
    c.bench_function("station_index_nearest", |b| {
        b.iter(|| index.nearest(black_box(LatLon(45.4397, 4.3872))))
    });
}

fn bench_weather_index(c: &mut Criterion) {
    let observations = grid(7);
    c.bench_function("weather_index_prepare", |b| {
        b.iter(|| {
            let index = WeatherIndex::new(black_box(observations.clone()));
            index.prepare(index.dates());
            index
        })
    });

    let index = WeatherIndex::new(observations);
    index.prepare(index.dates());
    let date = first_day() + Days::new(3);
    c.bench_function("weather_index_nearest", |b| {
        b.iter(|| index.nearest(black_box(date), black_box(LatLon(45.4397, 4.3872))))
    });
}

criterion_group!(benches, bench_station_index, bench_weather_index);
criterion_main!(benches);
