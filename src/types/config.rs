use crate::error::PulseError;
use crate::types::scoring::HealthWeights;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PulseConfig {
    pub weights: Option<HashMap<String, f64>>,
    pub trend: Option<TrendConfig>,
    pub newcomer: Option<NewcomerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendConfig {
    pub slope_window: Option<usize>,
    pub response_hours: Option<f64>,
    pub composite_window_days: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewcomerConfig {
    pub scan_limit: Option<usize>,
    pub recall_limit: Option<usize>,
    pub min_matches: Option<usize>,
    pub return_limit: Option<usize>,
    pub low_budget_hours: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendDefaults {
    pub slope_window: usize,
    pub response_hours: f64,
    /// Trailing days of history each composite point is ranked against.
    pub composite_window_days: u32,
}

impl Default for TrendDefaults {
    fn default() -> Self {
        Self {
            slope_window: 30,
            response_hours: 48.0,
            composite_window_days: 180,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewcomerLimits {
    pub scan_limit: usize,
    pub recall_limit: usize,
    pub min_matches: usize,
    pub return_limit: usize,
    pub low_budget_hours: f64,
}

impl Default for NewcomerLimits {
    fn default() -> Self {
        Self {
            scan_limit: 150,
            recall_limit: 30,
            min_matches: 6,
            return_limit: 6,
            low_budget_hours: 3.0,
        }
    }
}

const ALLOWED_WEIGHT_KEYS: [&str; 5] = [
    "vitality",
    "responsiveness",
    "resilience",
    "governance",
    "security",
];

impl PulseConfig {
    pub fn weights(&self) -> HealthWeights {
        let defaults = HealthWeights::default();
        match &self.weights {
            Some(weights) => HealthWeights {
                vitality: *weights.get("vitality").unwrap_or(&defaults.vitality),
                responsiveness: *weights
                    .get("responsiveness")
                    .unwrap_or(&defaults.responsiveness),
                resilience: *weights.get("resilience").unwrap_or(&defaults.resilience),
                governance: *weights.get("governance").unwrap_or(&defaults.governance),
                security: *weights.get("security").unwrap_or(&defaults.security),
            },
            None => defaults,
        }
    }

    pub fn trend_defaults(&self) -> TrendDefaults {
        let defaults = TrendDefaults::default();
        match &self.trend {
            Some(trend) => TrendDefaults {
                slope_window: trend.slope_window.unwrap_or(defaults.slope_window),
                response_hours: trend.response_hours.unwrap_or(defaults.response_hours),
                composite_window_days: trend
                    .composite_window_days
                    .unwrap_or(defaults.composite_window_days),
            },
            None => defaults,
        }
    }

    pub fn newcomer_limits(&self) -> NewcomerLimits {
        let defaults = NewcomerLimits::default();
        match &self.newcomer {
            Some(newcomer) => NewcomerLimits {
                scan_limit: newcomer.scan_limit.unwrap_or(defaults.scan_limit),
                recall_limit: newcomer.recall_limit.unwrap_or(defaults.recall_limit),
                min_matches: newcomer.min_matches.unwrap_or(defaults.min_matches),
                return_limit: newcomer.return_limit.unwrap_or(defaults.return_limit),
                low_budget_hours: newcomer
                    .low_budget_hours
                    .unwrap_or(defaults.low_budget_hours),
            },
            None => defaults,
        }
    }

    pub fn validate(&self) -> Result<(), PulseError> {
        if let Some(weights) = &self.weights {
            let unknown = weights
                .keys()
                .filter(|key| !ALLOWED_WEIGHT_KEYS.contains(&key.as_str()))
                .cloned()
                .collect::<Vec<_>>();
            if !unknown.is_empty() {
                return Err(PulseError::ConfigParse(format!(
                    "weights contains unknown key(s): {}",
                    unknown.join(", ")
                )));
            }
        }

        let weights = self.weights().as_array();
        if weights.iter().any(|weight| !(0.0..=1.0).contains(weight)) {
            return Err(PulseError::ConfigParse(
                "weights values must be between 0.0 and 1.0".to_string(),
            ));
        }
        let weight_sum: f64 = weights.iter().sum();
        if (weight_sum - 1.0).abs() > 0.001 {
            return Err(PulseError::ConfigParse(format!(
                "weights must sum to 1.0 (found {:.3})",
                weight_sum
            )));
        }

        let trend = self.trend_defaults();
        if trend.slope_window < 2 {
            return Err(PulseError::ConfigParse(
                "trend.slope_window must be at least 2".to_string(),
            ));
        }
        if !(trend.response_hours > 0.0) {
            return Err(PulseError::ConfigParse(
                "trend.response_hours must be greater than 0".to_string(),
            ));
        }

        if trend.composite_window_days == 0 {
            return Err(PulseError::ConfigParse(
                "trend.composite_window_days must be greater than 0".to_string(),
            ));
        }

        let limits = self.newcomer_limits();
        for (name, value) in [
            ("scan_limit", limits.scan_limit),
            ("recall_limit", limits.recall_limit),
            ("min_matches", limits.min_matches),
            ("return_limit", limits.return_limit),
        ] {
            if value == 0 {
                return Err(PulseError::ConfigParse(format!(
                    "newcomer.{name} must be greater than 0"
                )));
            }
        }
        if limits.min_matches > limits.recall_limit {
            return Err(PulseError::ConfigParse(
                "newcomer.min_matches cannot exceed newcomer.recall_limit".to_string(),
            ));
        }
        if !(limits.low_budget_hours > 0.0) {
            return Err(PulseError::ConfigParse(
                "newcomer.low_budget_hours must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
