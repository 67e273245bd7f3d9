use anyhow::{Context, Result};
use regex::Regex;

const SIGNED_NUMBER: &str = "-?[0-9]+[.]?[0-9]*";
const UNSIGNED_NUMBER: &str = "[0-9]+[.]?[0-9]*";

pub const TEMPERATURE_UNIT_PRIORITY: [TemperatureUnit; 2] =
    [TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];

pub const PRESSURE_UNIT_PRIORITY: [PressureUnit; 3] = [
    PressureUnit::MillimetersHg,
    PressureUnit::Atmospheres,
    PressureUnit::Pascals,
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Anchor {
    Start,
    Anywhere,
    End,
}

impl Anchor {
    fn prefix(self) -> &'static str {
        match self {
            Self::Start => "^",
            Self::Anywhere | Self::End => "",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::End => "$",
            Self::Start | Self::Anywhere => "",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn letter(self) -> char {
        match self {
            Self::Celsius => 'c',
            Self::Fahrenheit => 'f',
        }
    }

    fn to_celsius(self, value: f64) -> f64 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => round_two_decimals((value - 32.0) * 5.0 / 9.0),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PressureUnit {
    MillimetersHg,
    Atmospheres,
    Pascals,
}

impl PressureUnit {
    fn unit_pattern(self) -> &'static str {
        match self {
            Self::MillimetersHg => "mm[ ]*hg",
            Self::Atmospheres => "atm",
            Self::Pascals => "pa",
        }
    }

    fn to_atmospheres(self, value: f64) -> f64 {
        match self {
            Self::MillimetersHg => round_two_decimals(value / 760.0),
            Self::Atmospheres => value,
            Self::Pascals => round_two_decimals(value / 101_300.0),
        }
    }
}

pub struct TemperatureGrammar {
    variants: Vec<(TemperatureUnit, Regex)>,
}

impl TemperatureGrammar {
    pub fn new(anchor: Anchor) -> Result<Self> {
        let mut variants = Vec::with_capacity(TEMPERATURE_UNIT_PRIORITY.len());

        for unit in TEMPERATURE_UNIT_PRIORITY {
            let pattern = format!(
                "{}{}[ ]*°?[ ]*{}{}",
                anchor.prefix(),
                SIGNED_NUMBER,
                unit.letter(),
                anchor.suffix()
            );
            let regex = Regex::new(&pattern)
                .with_context(|| format!("failed to compile temperature regex: {pattern}"))?;
            variants.push((unit, regex));
        }

        Ok(Self { variants })
    }

    pub fn extract(&self, text: &str) -> Option<f64> {
        let text = text.trim().to_lowercase();

        for (unit, regex) in &self.variants {
            if let Some(found) = regex.find(&text) {
                let value = recover_leading_number(found.as_str(), unit.letter())?;
                return Some(unit.to_celsius(value));
            }
        }

        None
    }
}

pub struct PressureGrammar {
    variants: Vec<(PressureUnit, Regex)>,
}

impl PressureGrammar {
    pub fn new(anchor: Anchor) -> Result<Self> {
        let mut variants = Vec::with_capacity(PRESSURE_UNIT_PRIORITY.len());

        for unit in PRESSURE_UNIT_PRIORITY {
            let pattern = format!(
                "{}(?P<value>{})[ ]*{}{}",
                anchor.prefix(),
                UNSIGNED_NUMBER,
                unit.unit_pattern(),
                anchor.suffix()
            );
            let regex = Regex::new(&pattern)
                .with_context(|| format!("failed to compile pressure regex: {pattern}"))?;
            variants.push((unit, regex));
        }

        Ok(Self { variants })
    }

    pub fn extract(&self, text: &str) -> Option<f64> {
        let text = text.trim().to_lowercase();

        for (unit, regex) in &self.variants {
            if let Some(captures) = regex.captures(&text) {
                let value = captures.name("value")?.as_str().parse::<f64>().ok()?;
                return Some(unit.to_atmospheres(value));
            }
        }

        None
    }
}

fn recover_leading_number(matched: &str, unit_letter: char) -> Option<f64> {
    if let Some((before_glyph, _)) = matched.split_once('°') {
        return before_glyph.trim().parse().ok();
    }

    if let Some(token) = matched.split_whitespace().next() {
        if let Ok(value) = token.parse() {
            return Some(value);
        }
    }

    matched
        .split(unit_letter)
        .next()
        .and_then(|head| head.trim().parse().ok())
}

pub fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
