//! Per-parameter live state, trend classification and criticality

use super::catalog::{ParameterSpec, Thresholds};
use crate::types::Layer;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of recent deltas considered for trend classification
const TREND_WINDOW: usize = 5;

/// Fraction of the walk step treated as "no change" for trend purposes
const TREND_EPSILON_FACTOR: f64 = 0.25;

/// Classification of a parameter's recent trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Recent deltas are all within epsilon
    #[default]
    Stable,
    /// Net movement upwards
    Increasing,
    /// Net movement downwards
    Decreasing,
    /// Delta signs alternate across the recent window
    Fluctuating,
}

/// Severity of a parameter's current value against its thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    /// Within normal operating range
    #[default]
    Normal,
    /// Past the warning boundary
    Warning,
    /// Past the error boundary
    Error,
    /// Past the critical boundary
    Critical,
}

/// One parameter-change notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterUpdate {
    /// Owning protocol layer
    pub layer: Layer,
    /// Parameter name from the catalog
    pub parameter_name: String,
    /// Value after this tick
    pub current_value: f64,
    /// Value before this tick
    pub previous_value: f64,
    /// Absolute change
    pub change: f64,
    /// Relative change in percent (0 when the previous value was 0)
    pub change_percent: f64,
    /// Display unit
    pub unit: String,
    /// Recent-trajectory classification
    pub trend: Trend,
    /// Severity against the parameter's thresholds
    pub criticality: Criticality,
    /// Session-virtual milliseconds of this update
    pub timestamp_ms: u64,
}

/// Live state of one simulated parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterState {
    /// Owning protocol layer
    pub layer: Layer,
    /// Parameter name from the catalog
    pub name: String,
    /// Display unit
    pub unit: String,
    /// Current value
    pub current_value: f64,
    /// Value before the last tick
    pub previous_value: f64,
    /// Initial value at session start
    pub base_value: f64,
    /// Lower clamp bound
    pub min: f64,
    /// Upper clamp bound
    pub max: f64,
    /// Recent-trajectory classification
    pub trend: Trend,
    /// Severity against thresholds
    pub criticality: Criticality,
    /// Session-virtual milliseconds of the last update
    pub last_update_ms: u64,
    /// Bounded value history (oldest first)
    pub history: VecDeque<f64>,
    #[serde(skip)]
    step: f64,
    #[serde(skip)]
    discrete: bool,
    #[serde(skip)]
    thresholds: Option<Thresholds>,
    #[serde(skip)]
    history_depth: usize,
}

impl ParameterState {
    /// Initialize from a catalog spec
    pub fn new(spec: &ParameterSpec, history_depth: usize) -> Self {
        let mut history = VecDeque::with_capacity(history_depth);
        history.push_back(spec.base);
        Self {
            layer: spec.layer,
            name: spec.name.to_string(),
            unit: spec.unit.to_string(),
            current_value: spec.base,
            previous_value: spec.base,
            base_value: spec.base,
            min: spec.min,
            max: spec.max,
            trend: Trend::Stable,
            criticality: classify_criticality(spec.base, spec.thresholds),
            last_update_ms: 0,
            history,
            step: spec.step,
            discrete: spec.discrete,
            thresholds: spec.thresholds,
            history_depth,
        }
    }

    /// Maximum random-walk step for this parameter
    pub fn step_size(&self) -> f64 {
        self.step
    }

    /// Whether walked values are rounded to integers
    pub fn is_discrete(&self) -> bool {
        self.discrete
    }

    /// Apply one random-walk step and produce the resulting update
    ///
    /// `noise` is the raw step in `[-step, step]`; the result is clamped
    /// to `[min, max]` and rounded for discrete parameters by the caller
    /// before being passed here as `next`.
    pub fn apply(&mut self, next: f64, timestamp_ms: u64) -> ParameterUpdate {
        self.previous_value = self.current_value;
        self.current_value = next;
        self.last_update_ms = timestamp_ms;

        if self.history.len() == self.history_depth {
            self.history.pop_front();
        }
        self.history.push_back(next);

        self.trend = classify_trend(&self.history, self.step * TREND_EPSILON_FACTOR);
        self.criticality = classify_criticality(next, self.thresholds);

        let change = self.current_value - self.previous_value;
        let change_percent = if self.previous_value != 0.0 {
            (change / self.previous_value) * 100.0
        } else {
            0.0
        };

        ParameterUpdate {
            layer: self.layer,
            parameter_name: self.name.clone(),
            current_value: self.current_value,
            previous_value: self.previous_value,
            change,
            change_percent,
            unit: self.unit.clone(),
            trend: self.trend,
            criticality: self.criticality,
            timestamp_ms,
        }
    }
}

/// Classify the recent trajectory from the value history
///
/// Looks at the last [`TREND_WINDOW`] deltas: all within epsilon is
/// Stable; two or more sign alternations is Fluctuating; otherwise the
/// sign of the net movement decides Increasing/Decreasing.
pub fn classify_trend(history: &VecDeque<f64>, epsilon: f64) -> Trend {
    if history.len() < 2 {
        return Trend::Stable;
    }
    let start = history.len().saturating_sub(TREND_WINDOW + 1);
    let window: Vec<f64> = history.iter().skip(start).copied().collect();
    let deltas: Vec<f64> = window.windows(2).map(|w| w[1] - w[0]).collect();

    if deltas.iter().all(|d| d.abs() <= epsilon) {
        return Trend::Stable;
    }

    let mut sign_changes = 0;
    let mut last_sign = 0i8;
    for delta in &deltas {
        if delta.abs() <= epsilon {
            continue;
        }
        let sign = if *delta > 0.0 { 1i8 } else { -1i8 };
        if last_sign != 0 && sign != last_sign {
            sign_changes += 1;
        }
        last_sign = sign;
    }
    if sign_changes >= 2 {
        return Trend::Fluctuating;
    }

    let net: f64 = deltas.iter().sum();
    if net > epsilon {
        Trend::Increasing
    } else if net < -epsilon {
        Trend::Decreasing
    } else {
        Trend::Fluctuating
    }
}

/// Classify a value against optional severity thresholds
pub fn classify_criticality(value: f64, thresholds: Option<Thresholds>) -> Criticality {
    let Some(t) = thresholds else {
        return Criticality::Normal;
    };
    if t.below_is_worse {
        if value <= t.critical {
            Criticality::Critical
        } else if value <= t.error {
            Criticality::Error
        } else if value <= t.warning {
            Criticality::Warning
        } else {
            Criticality::Normal
        }
    } else if value >= t.critical {
        Criticality::Critical
    } else if value >= t.error {
        Criticality::Error
    } else if value >= t.warning {
        Criticality::Warning
    } else {
        Criticality::Normal
    }
}
