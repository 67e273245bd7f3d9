use crate::cli::GroupingMode;
use crate::model::ReconciledReading;

use super::normalize::ExtractedReading;

pub const DEFAULT_MAX_GROUP_STD_DEV: f64 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    pub max_group_std_dev: f64,
    pub grouping: GroupingMode,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            max_group_std_dev: DEFAULT_MAX_GROUP_STD_DEV,
            grouping: GroupingMode::PerPressure,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadingGroup {
    pub pressure_atm: Option<f64>,
    pub temperatures: Vec<f64>,
}

#[derive(Debug, Default)]
pub struct EntityReconciliation {
    pub accepted: Vec<ReconciledReading>,
    pub groups_total: usize,
}

pub fn group_readings(readings: &[ExtractedReading], grouping: GroupingMode) -> Vec<ReadingGroup> {
    match grouping {
        GroupingMode::Global => {
            if readings.is_empty() {
                return Vec::new();
            }
            vec![ReadingGroup {
                pressure_atm: None,
                temperatures: readings.iter().map(|reading| reading.temperature_c).collect(),
            }]
        }
        GroupingMode::PerPressure => {
            let mut groups: Vec<ReadingGroup> = Vec::new();

            for reading in readings {
                match groups
                    .iter_mut()
                    .find(|group| group.pressure_atm == reading.pressure_atm)
                {
                    Some(group) => group.temperatures.push(reading.temperature_c),
                    None => groups.push(ReadingGroup {
                        pressure_atm: reading.pressure_atm,
                        temperatures: vec![reading.temperature_c],
                    }),
                }
            }

            groups
        }
    }
}

pub fn reconcile_entity(
    readings: &[ExtractedReading],
    options: &ReconcileOptions,
) -> EntityReconciliation {
    let groups = group_readings(readings, options.grouping);
    let mut reconciliation = EntityReconciliation {
        accepted: Vec::new(),
        groups_total: groups.len(),
    };

    for group in &groups {
        if sample_std_dev(&group.temperatures) < options.max_group_std_dev {
            reconciliation.accepted.push(ReconciledReading {
                temperature_c: mean(&group.temperatures),
                pressure_atm: group.pressure_atm,
            });
        }
    }

    reconciliation
}

pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let center = mean(values);
    let sum_of_squares: f64 = values.iter().map(|value| (value - center).powi(2)).sum();

    (sum_of_squares / (values.len() - 1) as f64).sqrt()
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
