use std::collections::BTreeMap;

use crate::cli::GroupingMode;
use crate::model::RawRecord;

use super::consistency::{ReconcileOptions, group_readings, reconcile_entity, sample_std_dev};
use super::extract::{
    Anchor, PRESSURE_UNIT_PRIORITY, PressureGrammar, PressureUnit, TemperatureGrammar,
};
use super::normalize::{ExtractedReading, RecordNormalizer, is_single_valued};
use super::partition::run_pipeline;

fn reading(temperature_c: f64, pressure_atm: Option<f64>) -> ExtractedReading {
    ExtractedReading {
        temperature_c,
        pressure_atm,
    }
}

fn record(reports: &[&str], identifiers: &[i64]) -> RawRecord {
    RawRecord {
        reports: reports.iter().map(ToString::to_string).collect(),
        identifiers: identifiers.to_vec(),
    }
}

#[test]
fn temperature_extracts_celsius_at_start() {
    let grammar = TemperatureGrammar::new(Anchor::Start).expect("grammar compiles");

    assert_eq!(grammar.extract("36 C"), Some(36.0));
    assert_eq!(grammar.extract("  36 c at 760 mm hg"), Some(36.0));
    assert_eq!(grammar.extract("36 °C"), Some(36.0));
    assert_eq!(grammar.extract("-12.5°c"), Some(-12.5));
}

#[test]
fn temperature_converts_fahrenheit_rounded() {
    let grammar = TemperatureGrammar::new(Anchor::Start).expect("grammar compiles");

    assert_eq!(grammar.extract("96.8 F"), Some(36.0));
    assert_eq!(grammar.extract("212 °F"), Some(100.0));
    assert_eq!(grammar.extract("100 F"), Some(37.78));
}

#[test]
fn temperature_recovers_number_without_separator() {
    let grammar = TemperatureGrammar::new(Anchor::Start).expect("grammar compiles");

    assert_eq!(grammar.extract("36.5c"), Some(36.5));
}

#[test]
fn temperature_anchor_controls_match_position() {
    let start = TemperatureGrammar::new(Anchor::Start).expect("grammar compiles");
    let anywhere = TemperatureGrammar::new(Anchor::Anywhere).expect("grammar compiles");
    let end = TemperatureGrammar::new(Anchor::End).expect("grammar compiles");

    assert_eq!(start.extract("djd 36 c djfdifj"), None);
    assert_eq!(anywhere.extract("djd 36 c djfdifj"), Some(36.0));
    assert_eq!(end.extract("melting point 36 c"), Some(36.0));
    assert_eq!(end.extract("36 c approximate"), None);
}

#[test]
fn temperature_returns_none_without_unit() {
    let grammar = TemperatureGrammar::new(Anchor::Start).expect("grammar compiles");

    assert_eq!(grammar.extract("around 36"), None);
    assert_eq!(grammar.extract("not a temperature"), None);
}

#[test]
fn pressure_normalizes_each_unit_to_atmospheres() {
    let grammar = PressureGrammar::new(Anchor::Anywhere).expect("grammar compiles");

    assert_eq!(grammar.extract("760 mm Hg"), Some(1.0));
    assert_eq!(grammar.extract("at 760 mm Hg"), Some(1.0));
    assert_eq!(grammar.extract("760 mmHg"), Some(1.0));
    assert_eq!(grammar.extract("101300 Pa"), Some(1.0));
    assert_eq!(grammar.extract("202600 pa"), Some(2.0));
    assert_eq!(grammar.extract("1.5 atm"), Some(1.5));
}

#[test]
fn pressure_priority_order_is_explicit() {
    assert_eq!(
        PRESSURE_UNIT_PRIORITY,
        [
            PressureUnit::MillimetersHg,
            PressureUnit::Atmospheres,
            PressureUnit::Pascals,
        ]
    );

    let grammar = PressureGrammar::new(Anchor::Anywhere).expect("grammar compiles");

    assert_eq!(grammar.extract("760 mm hg (1 atm)"), Some(1.0));
    assert_eq!(grammar.extract("2 atm versus 202600 pa"), Some(2.0));
}

#[test]
fn extraction_round_trips_canonical_serialization() {
    let temperature = TemperatureGrammar::new(Anchor::Start).expect("grammar compiles");
    let pressure = PressureGrammar::new(Anchor::Anywhere).expect("grammar compiles");

    for value in [36.0, -12.25, 101.1] {
        let rendered = format!("{value} c");
        assert_eq!(temperature.extract(&rendered), Some(value));
    }

    for value in [1.0, 0.97, 2.5] {
        let rendered = format!("{value} atm");
        assert_eq!(pressure.extract(&rendered), Some(value));
    }
}

#[test]
fn multi_valued_strings_are_dropped_whole() {
    let normalizer = RecordNormalizer::new().expect("normalizer builds");

    assert!(!is_single_valued("36 c; 38 c"));
    let readings = normalizer.normalize(&["36 c; 38 c".to_string()]);
    assert!(readings.is_empty());
}

#[test]
fn normalize_pairs_temperature_with_pressure_reference() {
    let normalizer = RecordNormalizer::new().expect("normalizer builds");

    let readings = normalizer.normalize(&["36 c at 760 mm hg".to_string()]);
    assert_eq!(readings, vec![reading(36.0, Some(1.0))]);
}

#[test]
fn normalize_uses_unstated_sentinel_when_pressure_missing() {
    let normalizer = RecordNormalizer::new().expect("normalizer builds");

    let readings = normalizer.normalize(&["36 c".to_string()]);
    assert_eq!(readings, vec![reading(36.0, None)]);
}

#[test]
fn normalize_requires_temperature_and_preserves_order() {
    let normalizer = RecordNormalizer::new().expect("normalizer builds");

    let reports = vec![
        "90 c".to_string(),
        "760 mm hg".to_string(),
        "no reading here".to_string(),
        "100 c at 760 mm hg".to_string(),
    ];
    let readings = normalizer.normalize(&reports);

    assert_eq!(
        readings,
        vec![reading(90.0, None), reading(100.0, Some(1.0))]
    );
}

#[test]
fn sample_std_dev_handles_small_samples() {
    assert_eq!(sample_std_dev(&[]), 0.0);
    assert_eq!(sample_std_dev(&[36.0]), 0.0);
    assert!((sample_std_dev(&[2.0, 4.0]) - 2.0_f64.sqrt()).abs() < 1e-12);
}

#[test]
fn grouping_uses_exact_pressure_equality() {
    let readings = vec![
        reading(36.0, Some(1.0)),
        reading(36.4, Some(1.0)),
        reading(37.0, Some(0.99)),
        reading(38.0, None),
    ];

    let groups = group_readings(&readings, GroupingMode::PerPressure);

    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].pressure_atm, Some(1.0));
    assert_eq!(groups[0].temperatures, vec![36.0, 36.4]);
    assert_eq!(groups[1].pressure_atm, Some(0.99));
    assert_eq!(groups[2].pressure_atm, None);
}

#[test]
fn global_grouping_collapses_to_unstated_reference() {
    let readings = vec![reading(36.0, Some(1.0)), reading(36.4, None)];

    let groups = group_readings(&readings, GroupingMode::Global);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].pressure_atm, None);
    assert_eq!(groups[0].temperatures, vec![36.0, 36.4]);
}

#[test]
fn reconcile_rejects_incoherent_group_in_full() {
    let readings = vec![
        reading(36.0, Some(1.0)),
        reading(36.4, Some(1.0)),
        reading(90.0, Some(1.0)),
    ];

    let reconciliation = reconcile_entity(&readings, &ReconcileOptions::default());

    assert_eq!(reconciliation.groups_total, 1);
    assert!(reconciliation.accepted.is_empty());
}

#[test]
fn reconcile_merges_coherent_group_to_mean() {
    let readings = vec![reading(36.0, Some(1.0)), reading(36.4, Some(1.0))];

    let reconciliation = reconcile_entity(&readings, &ReconcileOptions::default());

    assert_eq!(reconciliation.accepted.len(), 1);
    assert!((reconciliation.accepted[0].temperature_c - 36.2).abs() < 1e-9);
    assert_eq!(reconciliation.accepted[0].pressure_atm, Some(1.0));
}

#[test]
fn reconcile_accepts_singleton_group() {
    let reconciliation =
        reconcile_entity(&[reading(36.0, None)], &ReconcileOptions::default());

    assert_eq!(reconciliation.accepted, vec![reading_pair(36.0, None)]);
}

#[test]
fn reconcile_keeps_consistent_groups_and_drops_the_rest() {
    let readings = vec![
        reading(36.0, Some(1.0)),
        reading(36.4, Some(1.0)),
        reading(80.0, None),
        reading(95.0, None),
    ];

    let reconciliation = reconcile_entity(&readings, &ReconcileOptions::default());

    assert_eq!(reconciliation.groups_total, 2);
    assert_eq!(reconciliation.accepted.len(), 1);
    assert_eq!(reconciliation.accepted[0].pressure_atm, Some(1.0));
}

#[test]
fn pipeline_routes_each_entity_to_one_partition() {
    let records = sample_records();
    let normalizer = RecordNormalizer::new().expect("normalizer builds");

    let outcome = run_pipeline(&records, &normalizer, &ReconcileOptions::default());
    let partitions = &outcome.partitions;

    assert!(partitions.clean.contains_key("ethanol"));
    assert!(partitions.ambiguous_identifier.contains_key("benzene"));
    assert!(partitions.unparsable.contains_key("mystery oil"));
    assert!(partitions.inconsistent.contains_key("crude extract"));

    let clean = &partitions.clean["ethanol"];
    assert_eq!(clean.identifier, 702);
    assert_eq!(clean.readings.len(), 1);
    assert!((clean.readings[0].temperature_c - 78.3).abs() < 1e-9);
    assert_eq!(clean.readings[0].pressure_atm, Some(1.0));
}

#[test]
fn pipeline_partitions_are_disjoint_and_cover_input() {
    let records = sample_records();
    let normalizer = RecordNormalizer::new().expect("normalizer builds");

    let outcome = run_pipeline(&records, &normalizer, &ReconcileOptions::default());
    let partitions = &outcome.partitions;

    let key_sets: Vec<Vec<&String>> = vec![
        partitions.clean.keys().collect(),
        partitions.ambiguous_identifier.keys().collect(),
        partitions.unparsable.keys().collect(),
        partitions.inconsistent.keys().collect(),
    ];

    let mut all_keys: Vec<&String> = key_sets.iter().flatten().copied().collect();
    let total = all_keys.len();
    all_keys.sort();
    all_keys.dedup();

    assert_eq!(all_keys.len(), total);
    assert_eq!(all_keys.len(), records.len());
    for name in records.keys() {
        assert!(all_keys.contains(&name));
    }
}

#[test]
fn pipeline_is_idempotent_over_the_same_batch() {
    let records = sample_records();
    let normalizer = RecordNormalizer::new().expect("normalizer builds");
    let options = ReconcileOptions::default();

    let first = run_pipeline(&records, &normalizer, &options);
    let second = run_pipeline(&records, &normalizer, &options);

    assert_eq!(first.partitions, second.partitions);
}

#[test]
fn pipeline_counts_skipped_and_extracted_strings() {
    let records = sample_records();
    let normalizer = RecordNormalizer::new().expect("normalizer builds");

    let outcome = run_pipeline(&records, &normalizer, &ReconcileOptions::default());

    assert_eq!(outcome.stats.entities_ambiguous_identifier, 1);
    assert_eq!(outcome.stats.entities_single_identifier, 3);
    assert_eq!(outcome.stats.multi_valued_strings_skipped, 1);
    assert_eq!(outcome.stats.readings_extracted, 4);
    assert_eq!(outcome.stats.groups_accepted, 1);
    assert_eq!(outcome.stats.groups_rejected, 1);
}

fn reading_pair(
    temperature_c: f64,
    pressure_atm: Option<f64>,
) -> crate::model::ReconciledReading {
    crate::model::ReconciledReading {
        temperature_c,
        pressure_atm,
    }
}

fn sample_records() -> BTreeMap<String, RawRecord> {
    let mut records = BTreeMap::new();

    records.insert(
        "ethanol".to_string(),
        record(&["78.2 c at 760 mm hg", "78.4 c at 760 mm hg"], &[702]),
    );
    records.insert(
        "benzene".to_string(),
        record(&["80.1 c"], &[241, 242]),
    );
    records.insert(
        "mystery oil".to_string(),
        record(&["viscous liquid", "36 c; 40 c"], &[9001]),
    );
    records.insert(
        "crude extract".to_string(),
        record(&["10 c", "60 c"], &[9002]),
    );

    records
}
