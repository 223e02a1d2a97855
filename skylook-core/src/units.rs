//! Unit conversions applied when normalizing provider data.
//!
//! Stored values stay unrounded; [`display_round`] is the only rounding step.

use serde::{Deserialize, Serialize};

const MPS_TO_KPH: f64 = 3.6;
const MPS_TO_MPH: f64 = 2.237;

/// Preferred temperature unit. Wind speed display follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    pub fn wind_unit(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "km/h",
            TemperatureUnit::Fahrenheit => "mph",
        }
    }

    /// Pick the field matching this unit from a dual-unit pair.
    pub fn pick(self, celsius: f64, fahrenheit: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => fahrenheit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "Celsius (°C)",
            TemperatureUnit::Fahrenheit => "Fahrenheit (°F)",
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        })
    }
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn mps_to_kph(mps: f64) -> f64 {
    mps * MPS_TO_KPH
}

pub fn mps_to_mph(mps: f64) -> f64 {
    mps * MPS_TO_MPH
}

pub fn display_round(value: f64) -> i64 {
    value.round() as i64
}
