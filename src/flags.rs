//! Known flags, their declared defaults, and evaluation provenance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three flags this service evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlagKey {
    ShowNewDashboard,
    EnableFraudDetection,
    AdvancedAnalytics,
}

impl FlagKey {
    pub const ALL: [FlagKey; 3] = [
        FlagKey::ShowNewDashboard,
        FlagKey::EnableFraudDetection,
        FlagKey::AdvancedAnalytics,
    ];

    /// Provider-side flag key.
    pub fn as_str(self) -> &'static str {
        match self {
            FlagKey::ShowNewDashboard => "show-new-dashboard",
            FlagKey::EnableFraudDetection => "enable-fraud-detection",
            FlagKey::AdvancedAnalytics => "advanced-analytics",
        }
    }

    /// Value served whenever the provider cannot answer.
    pub fn default_value(self) -> bool {
        false
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values for the three known flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet {
    #[serde(rename = "show-new-dashboard")]
    pub show_new_dashboard: bool,
    #[serde(rename = "enable-fraud-detection")]
    pub enable_fraud_detection: bool,
    #[serde(rename = "advanced-analytics")]
    pub advanced_analytics: bool,
}

impl FlagSet {
    /// Every flag at its declared default.
    pub fn defaults() -> Self {
        Self {
            show_new_dashboard: FlagKey::ShowNewDashboard.default_value(),
            enable_fraud_detection: FlagKey::EnableFraudDetection.default_value(),
            advanced_analytics: FlagKey::AdvancedAnalytics.default_value(),
        }
    }

    pub fn get(&self, key: FlagKey) -> bool {
        match key {
            FlagKey::ShowNewDashboard => self.show_new_dashboard,
            FlagKey::EnableFraudDetection => self.enable_fraud_detection,
            FlagKey::AdvancedAnalytics => self.advanced_analytics,
        }
    }

    pub fn set(&mut self, key: FlagKey, value: bool) {
        match key {
            FlagKey::ShowNewDashboard => self.show_new_dashboard = value,
            FlagKey::EnableFraudDetection => self.enable_fraud_detection = value,
            FlagKey::AdvancedAnalytics => self.advanced_analytics = value,
        }
    }

    /// Flags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FlagKey, bool)> + '_ {
        FlagKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    /// Build from an arbitrary provider flag map. Missing or non-boolean entries take
    /// the flag's default.
    pub fn from_values(values: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut set = Self::defaults();
        for key in FlagKey::ALL {
            if let Some(value) = values.get(key.as_str()).and_then(|v| v.as_bool()) {
                set.set(key, value);
            }
        }
        set
    }
}

impl Default for FlagSet {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Where a flag set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationSource {
    #[serde(rename = "launchdarkly")]
    LaunchDarkly,
    #[serde(rename = "fallback")]
    Fallback,
    #[serde(rename = "fallback_error")]
    FallbackError,
}

impl EvaluationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationSource::LaunchDarkly => "launchdarkly",
            EvaluationSource::Fallback => "fallback",
            EvaluationSource::FallbackError => "fallback_error",
        }
    }

    pub fn is_fallback(self) -> bool {
        !matches!(self, EvaluationSource::LaunchDarkly)
    }
}

impl fmt::Display for EvaluationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
