use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::array;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

use turnover_insight::data::{Dataset, DatasetRecord, FeatureSchema};
use turnover_insight::inference::{LinearScaledModel, TreeEnsembleModel};
use turnover_insight::preprocessing::{Scaler, ScalerParams, ScalerType};
use turnover_insight::serving::{LoadedModel, ServingContext};
use turnover_insight::training::{LogisticRegression, RandomForest};

fn create_dataset(n_rows: usize) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let records = (0..n_rows)
        .map(|_| {
            let f1: f64 = rng.gen::<f64>() * 10.0;
            let f2: f64 = rng.gen::<f64>() * 10.0;
            DatasetRecord {
                stress_workload_amount: f1,
                stress_org_climate_grievance: f2,
                turnover_intention: if f1 + 0.3 * f2 > 6.0 { "有" } else { "沒有" }.to_string(),
            }
        })
        .collect();
    Dataset::from_records(records)
}

fn create_context(dataset: &Dataset, n_trees: usize) -> ServingContext {
    let scaler = Scaler::from_params(
        ScalerType::Standard,
        FeatureSchema::names(),
        vec![ScalerParams { center: 5.0, scale: 2.9 }, ScalerParams { center: 5.0, scale: 2.9 }],
    )
    .unwrap();
    let linear = LinearScaledModel::new(scaler, LogisticRegression::from_coefficients(array![2.0, 0.6], -0.4)).unwrap();

    let mut forest = RandomForest::new(n_trees).with_random_state(42);
    forest
        .fit_named(&dataset.features(), &dataset.targets().unwrap(), &FeatureSchema::names())
        .unwrap();
    let ensemble = TreeEnsembleModel::new(forest, FeatureSchema::names()).unwrap();

    ServingContext::from_parts(
        Some(LoadedModel::Linear(linear)),
        Some(LoadedModel::Ensemble(ensemble)),
        Some(dataset),
        PathBuf::from("unused.csv"),
    )
}

fn bench_predict(c: &mut Criterion) {
    let dataset = create_dataset(1000);
    let mut group = c.benchmark_group("predict");

    let ctx = create_context(&dataset, 10);
    group.bench_function("logistic", |b| {
        b.iter(|| ctx.logistic.predict(black_box(5.0), black_box(3.0)).unwrap())
    });

    for n_trees in [10, 100].iter() {
        let ctx = create_context(&dataset, *n_trees);
        group.bench_with_input(BenchmarkId::new("rf", n_trees), &ctx, |b, ctx| {
            b.iter(|| ctx.rf.predict(black_box(5.0), black_box(3.0)).unwrap())
        });
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("context");
    group.sample_size(10);

    for n_rows in [500, 2000].iter() {
        let dataset = create_dataset(*n_rows);
        group.bench_with_input(BenchmarkId::new("from_parts", n_rows), &dataset, |b, ds| {
            b.iter(|| create_context(black_box(ds), 20))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_predict, bench_load);
criterion_main!(benches);
