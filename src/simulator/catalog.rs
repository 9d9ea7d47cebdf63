//! Fixed catalog of simulated layer parameters
//!
//! Base values mirror a healthy mid-cell LTE/NR connection. Each entry
//! defines the random-walk bounds and step size plus optional severity
//! thresholds. Discrete parameters (indices, counters, state codes) round
//! their walked value to the nearest integer.

use crate::types::Layer;

/// Severity thresholds for one parameter
///
/// `below_is_worse` selects the comparison direction: signal metrics
/// degrade downwards, loss rates degrade upwards.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Warning boundary
    pub warning: f64,
    /// Error boundary
    pub error: f64,
    /// Critical boundary
    pub critical: f64,
    /// When true, values at or below the boundaries are worse
    pub below_is_worse: bool,
}

/// Static definition of one simulated parameter
#[derive(Debug, Clone, Copy)]
pub struct ParameterSpec {
    /// Owning protocol layer
    pub layer: Layer,
    /// Parameter name, stable across updates
    pub name: &'static str,
    /// Display unit
    pub unit: &'static str,
    /// Initial value at session start
    pub base: f64,
    /// Lower clamp bound
    pub min: f64,
    /// Upper clamp bound
    pub max: f64,
    /// Maximum random-walk step per tick
    pub step: f64,
    /// Round walked values to the nearest integer
    pub discrete: bool,
    /// Optional severity thresholds
    pub thresholds: Option<Thresholds>,
}

const fn below(warning: f64, error: f64, critical: f64) -> Option<Thresholds> {
    Some(Thresholds {
        warning,
        error,
        critical,
        below_is_worse: true,
    })
}

const fn above(warning: f64, error: f64, critical: f64) -> Option<Thresholds> {
    Some(Thresholds {
        warning,
        error,
        critical,
        below_is_worse: false,
    })
}

/// The full parameter catalog, grouped by layer
pub const CATALOG: &[ParameterSpec] = &[
    // PHY: radio conditions
    ParameterSpec {
        layer: Layer::Phy,
        name: "rsrp",
        unit: "dBm",
        base: -95.2,
        min: -140.0,
        max: -44.0,
        step: 0.8,
        discrete: false,
        thresholds: below(-100.0, -110.0, -120.0),
    },
    ParameterSpec {
        layer: Layer::Phy,
        name: "rsrq",
        unit: "dB",
        base: -10.5,
        min: -20.0,
        max: -3.0,
        step: 0.4,
        discrete: false,
        thresholds: below(-14.0, -16.0, -18.0),
    },
    ParameterSpec {
        layer: Layer::Phy,
        name: "sinr",
        unit: "dB",
        base: 15.3,
        min: -10.0,
        max: 40.0,
        step: 0.9,
        discrete: false,
        thresholds: below(5.0, 0.0, -5.0),
    },
    ParameterSpec {
        layer: Layer::Phy,
        name: "cqi",
        unit: "index",
        base: 12.0,
        min: 0.0,
        max: 15.0,
        step: 0.6,
        discrete: true,
        thresholds: below(6.0, 3.0, 1.0),
    },
    ParameterSpec {
        layer: Layer::Phy,
        name: "timing_advance",
        unit: "us",
        base: 125.0,
        min: 0.0,
        max: 1282.0,
        step: 3.0,
        discrete: true,
        thresholds: above(600.0, 1000.0, 1200.0),
    },
    ParameterSpec {
        layer: Layer::Phy,
        name: "power_headroom",
        unit: "dB",
        base: 2.5,
        min: -23.0,
        max: 40.0,
        step: 0.3,
        discrete: false,
        thresholds: below(0.0, -10.0, -20.0),
    },
    // MAC: scheduling and throughput
    ParameterSpec {
        layer: Layer::Mac,
        name: "throughput_dl",
        unit: "Mbps",
        base: 45.2,
        min: 0.0,
        max: 150.0,
        step: 2.0,
        discrete: false,
        thresholds: below(10.0, 5.0, 1.0),
    },
    ParameterSpec {
        layer: Layer::Mac,
        name: "throughput_ul",
        unit: "Mbps",
        base: 12.8,
        min: 0.0,
        max: 50.0,
        step: 1.0,
        discrete: false,
        thresholds: below(3.0, 1.0, 0.5),
    },
    ParameterSpec {
        layer: Layer::Mac,
        name: "packet_loss_rate",
        unit: "ratio",
        base: 0.001,
        min: 0.0,
        max: 1.0,
        step: 0.0004,
        discrete: false,
        thresholds: above(0.01, 0.05, 0.1),
    },
    ParameterSpec {
        layer: Layer::Mac,
        name: "retransmission_rate",
        unit: "ratio",
        base: 0.005,
        min: 0.0,
        max: 1.0,
        step: 0.001,
        discrete: false,
        thresholds: above(0.05, 0.1, 0.2),
    },
    // RLC: buffering
    ParameterSpec {
        layer: Layer::Rlc,
        name: "buffer_occupancy",
        unit: "ratio",
        base: 0.28,
        min: 0.0,
        max: 1.0,
        step: 0.04,
        discrete: false,
        thresholds: above(0.7, 0.85, 0.95),
    },
    // PDCP: sequencing and compression
    ParameterSpec {
        layer: Layer::Pdcp,
        name: "sequence_number",
        unit: "count",
        base: 1024.0,
        min: 0.0,
        max: 65_535.0,
        step: 60.0,
        discrete: true,
        thresholds: None,
    },
    ParameterSpec {
        layer: Layer::Pdcp,
        name: "compression_ratio",
        unit: "ratio",
        base: 0.85,
        min: 0.0,
        max: 1.0,
        step: 0.02,
        discrete: false,
        thresholds: below(0.5, 0.3, 0.1),
    },
    // RRC: connection state machine (0 = idle, 1 = connected, 2 = inactive)
    ParameterSpec {
        layer: Layer::Rrc,
        name: "connection_state",
        unit: "state",
        base: 1.0,
        min: 0.0,
        max: 2.0,
        step: 0.2,
        discrete: true,
        thresholds: None,
    },
    // NAS: registration state machine (0 = deregistered, 1 = attached)
    ParameterSpec {
        layer: Layer::Nas,
        name: "attach_state",
        unit: "state",
        base: 1.0,
        min: 0.0,
        max: 1.0,
        step: 0.15,
        discrete: true,
        thresholds: None,
    },
];

/// Catalog entries for the given layers, in catalog order
pub fn specs_for_layers(layers: &[Layer]) -> Vec<ParameterSpec> {
    CATALOG
        .iter()
        .filter(|spec| layers.contains(&spec.layer))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_base_values_within_bounds() {
        for spec in CATALOG {
            assert!(
                spec.min <= spec.base && spec.base <= spec.max,
                "{} base out of bounds",
                spec.name
            );
            assert!(spec.step > 0.0, "{} has non-positive step", spec.name);
        }
    }

    #[test]
    fn test_catalog_names_unique_per_layer() {
        let mut seen = std::collections::HashSet::new();
        for spec in CATALOG {
            assert!(seen.insert((spec.layer, spec.name)), "duplicate {}", spec.name);
        }
    }

    #[test]
    fn test_specs_for_layers_filters() {
        let specs = specs_for_layers(&[Layer::Rlc, Layer::Nas]);
        assert_eq!(specs.len(), 2);
        assert!(specs.iter().all(|s| s.layer == Layer::Rlc || s.layer == Layer::Nas));
    }

    #[test]
    fn test_thresholds_are_ordered() {
        for spec in CATALOG {
            if let Some(t) = spec.thresholds {
                if t.below_is_worse {
                    assert!(t.warning > t.error && t.error > t.critical, "{}", spec.name);
                } else {
                    assert!(t.warning < t.error && t.error < t.critical, "{}", spec.name);
                }
            }
        }
    }
}
