use anyhow::Result;

use super::extract::{Anchor, PressureGrammar, TemperatureGrammar};

pub const MULTI_VALUE_SEPARATOR: char = ';';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedReading {
    pub temperature_c: f64,
    pub pressure_atm: Option<f64>,
}

pub struct RecordNormalizer {
    temperature: TemperatureGrammar,
    pressure: PressureGrammar,
}

impl RecordNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temperature: TemperatureGrammar::new(Anchor::Start)?,
            pressure: PressureGrammar::new(Anchor::Anywhere)?,
        })
    }

    pub fn normalize(&self, reports: &[String]) -> Vec<ExtractedReading> {
        let mut readings = Vec::new();

        for report in reports {
            if !is_single_valued(report) {
                continue;
            }

            let Some(temperature_c) = self.temperature.extract(report) else {
                continue;
            };

            readings.push(ExtractedReading {
                temperature_c,
                pressure_atm: self.pressure.extract(report),
            });
        }

        readings
    }
}

pub fn is_single_valued(report: &str) -> bool {
    !report.contains(MULTI_VALUE_SEPARATOR)
}
