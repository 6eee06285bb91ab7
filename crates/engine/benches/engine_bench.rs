//! Benchmarks for the per-turn decision path.
//!
//! Run with: cargo bench -p lead-triage-engine

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lead_triage_config::{QualityThresholds, SlaThresholds, VocabularyConfig};
use lead_triage_engine::{next_topic, score_lead, score_quality, SessionState};
use lead_triage_core::{FieldId, FieldUpdate};
use serde_json::json;

/// Session with every critical and most preference fields answered, the
/// shape a completed triage scores on.
fn populated_session() -> SessionState {
    let vocab = VocabularyConfig::default();
    let mut state = SessionState::new("bench");
    let updates = vec![
        FieldUpdate::confirmed(FieldId::Intent, json!("comprar")),
        FieldUpdate::confirmed(FieldId::City, json!("João Pessoa")),
        FieldUpdate::confirmed(FieldId::Neighborhood, json!("Manaíra")),
        FieldUpdate::confirmed(FieldId::PropertyType, json!("apartamento")),
        FieldUpdate::confirmed(FieldId::Bedrooms, json!(3)),
        FieldUpdate::confirmed(FieldId::Parking, json!(2)),
        FieldUpdate::confirmed(FieldId::Budget, json!(800_000)),
        FieldUpdate::confirmed(FieldId::Timeline, json!("30_days")),
        FieldUpdate::confirmed(FieldId::MicroLocation, json!("beira-mar")),
        FieldUpdate::confirmed(FieldId::LeadName, json!("Marina Souza")),
        FieldUpdate::confirmed(FieldId::CondoFeeCap, json!(1_200)),
        FieldUpdate::confirmed(FieldId::PaymentMethod, json!("financiamento")),
    ];
    let conflicts = state.apply_updates(&updates, &vocab);
    assert!(conflicts.is_empty());
    state
}

fn bench_scoring(c: &mut Criterion) {
    let full = populated_session();
    let sparse = SessionState::new("bench-sparse");
    let quality = QualityThresholds::default();
    let sla = SlaThresholds::default();

    let mut group = c.benchmark_group("scoring");
    group.bench_function("quality_full_session", |b| {
        b.iter(|| black_box(score_quality(black_box(&full), &quality)));
    });
    group.bench_function("quality_empty_session", |b| {
        b.iter(|| black_box(score_quality(black_box(&sparse), &quality)));
    });
    group.bench_function("lead_full_session", |b| {
        b.iter(|| black_box(score_lead(black_box(&full), &sla.weights, &sla)));
    });
    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    let vocab = VocabularyConfig::default();
    let mut partial = SessionState::new("bench-partial");
    let conflicts = partial.apply_updates(
        &[
            FieldUpdate::confirmed(FieldId::Intent, json!("comprar")),
            FieldUpdate::confirmed(FieldId::City, json!("João Pessoa")),
        ],
        &vocab,
    );
    assert!(conflicts.is_empty());

    c.bench_function("next_topic_partial_session", |b| {
        b.iter(|| black_box(next_topic(black_box(&partial), 2)));
    });
}

fn bench_updates(c: &mut Criterion) {
    let vocab = VocabularyConfig::default();
    c.bench_function("apply_full_update_batch", |b| {
        b.iter(|| {
            let mut state = SessionState::new("bench-apply");
            let updates = vec![
                FieldUpdate::confirmed(FieldId::Intent, json!("comprar")),
                FieldUpdate::confirmed(FieldId::Budget, json!("800 mil")),
                FieldUpdate::confirmed(FieldId::Timeline, json!("este mes")),
                FieldUpdate::confirmed(FieldId::MicroLocation, json!("beira-mar")),
            ];
            black_box(state.apply_updates(&updates, &vocab));
        });
    });
}

criterion_group!(benches, bench_scoring, bench_selection, bench_updates);
criterion_main!(benches);
