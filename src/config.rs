use anyhow::{ensure, Result};
use clap::ValueEnum;

use crate::visual::Rgb;

pub(crate) const YEAR_MIN: i32 = 1900;
pub(crate) const YEAR_MAX: i32 = 2100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Scenario {
    Optimistic,
    Realistic,
    #[value(alias = "worst")]
    Severe,
}

impl Scenario {
    pub(crate) const ALL: [Scenario; 3] =
        [Scenario::Optimistic, Scenario::Realistic, Scenario::Severe];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Scenario::Optimistic => "optimistic",
            Scenario::Realistic => "realistic",
            Scenario::Severe => "severe",
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Scenario::Optimistic => Scenario::Realistic,
            Scenario::Realistic => Scenario::Severe,
            Scenario::Severe => Scenario::Optimistic,
        }
    }

    pub(crate) fn prev(self) -> Self {
        match self {
            Scenario::Optimistic => Scenario::Severe,
            Scenario::Realistic => Scenario::Optimistic,
            Scenario::Severe => Scenario::Realistic,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum GrowthLaw {
    Exponential,
    Linear,
}

/// Growth rate per scenario. Exponential law: yearly growth fraction.
/// Linear law: ppm per year.
#[derive(Clone, Debug)]
pub(crate) struct ScenarioTable {
    rates: [f32; 3],
}

impl ScenarioTable {
    pub(crate) fn new(optimistic: f32, realistic: f32, severe: f32) -> Self {
        Self {
            rates: [optimistic, realistic, severe],
        }
    }

    pub(crate) fn rate(&self, scenario: Scenario) -> f32 {
        self.rates[scenario as usize]
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for s in Scenario::ALL {
            let r = self.rate(s);
            ensure!(
                r.is_finite() && r > 0.0,
                "scenario {} has invalid growth rate {r}",
                s.label()
            );
        }
        for pair in Scenario::ALL.windows(2) {
            ensure!(
                self.rate(pair[0]) <= self.rate(pair[1]),
                "scenario growth rates must not decrease from {} to {}",
                pair[0].label(),
                pair[1].label()
            );
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ClimateConfig {
    pub(crate) growth_law: GrowthLaw,
    pub(crate) base_year: i32,
    pub(crate) base_co2: f32,
    pub(crate) base_ph: f32,
    pub(crate) sensitivity: f32,
    pub(crate) ph_min: f32,
    pub(crate) ph_max: f32,
    /// Linear law only: years past base_year after which growth flattens.
    pub(crate) max_years: f32,
    /// Per-frame easing factor toward the target pH; 1.0 disables smoothing.
    pub(crate) smoothing: f32,
    pub(crate) scenarios: ScenarioTable,
}

impl ClimateConfig {
    pub(crate) fn exponential() -> Self {
        Self {
            growth_law: GrowthLaw::Exponential,
            base_year: 1900,
            base_co2: 280.0,
            base_ph: 8.2,
            sensitivity: 0.001,
            ph_min: 7.6,
            ph_max: 8.2,
            max_years: (YEAR_MAX - 1900) as f32,
            smoothing: 0.02,
            scenarios: ScenarioTable::new(0.010, 0.020, 0.030),
        }
    }

    pub(crate) fn linear() -> Self {
        Self {
            growth_law: GrowthLaw::Linear,
            base_year: 1950,
            base_co2: 280.0,
            base_ph: 8.2,
            sensitivity: 0.0018,
            ph_min: 7.65,
            ph_max: 8.2,
            max_years: 150.0,
            smoothing: 0.02,
            scenarios: ScenarioTable::new(0.5, 0.8, 1.2),
        }
    }

    pub(crate) fn for_law(law: GrowthLaw) -> Self {
        match law {
            GrowthLaw::Exponential => Self::exponential(),
            GrowthLaw::Linear => Self::linear(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.ph_min < self.ph_max,
            "pH bounds are inverted: [{}, {}]",
            self.ph_min,
            self.ph_max
        );
        ensure!(
            self.sensitivity > 0.0 && self.sensitivity.is_finite(),
            "pH sensitivity must be positive, got {}",
            self.sensitivity
        );
        ensure!(
            self.smoothing > 0.0 && self.smoothing <= 1.0,
            "smoothing factor must be in (0, 1], got {}",
            self.smoothing
        );
        ensure!(
            self.max_years >= 0.0,
            "max_years must not be negative, got {}",
            self.max_years
        );
        self.scenarios.validate()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct VisualConfig {
    pub(crate) wave_layers: usize,
    /// Peak wave displacement in normalized scene units, before calmness.
    pub(crate) base_amplitude: f32,
    /// Calmness factor at ph_min (rough water) and at ph_max (calm water).
    pub(crate) rough_factor: f32,
    pub(crate) calm_factor: f32,
    /// Coral bleaches below this health fraction; exactly at it is healthy.
    pub(crate) bleach_threshold: f32,
    /// Plankton glow alpha at ph_min and ph_max.
    pub(crate) glow_min: f32,
    pub(crate) glow_max: f32,
    pub(crate) clear_water: Rgb,
    pub(crate) murky_water: Rgb,
    pub(crate) coral_healthy: Rgb,
    pub(crate) coral_bleached: Rgb,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            wave_layers: 3,
            base_amplitude: 0.11,
            rough_factor: 1.25,
            calm_factor: 0.75,
            bleach_threshold: 0.45,
            glow_min: 80.0,
            glow_max: 200.0,
            clear_water: Rgb::new(118, 186, 222),
            murky_water: Rgb::new(96, 128, 108),
            coral_healthy: Rgb::new(255, 165, 120),
            coral_bleached: Rgb::new(255, 200, 210),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_table_lookup_covers_every_scenario() {
        let table = ScenarioTable::new(0.010, 0.020, 0.030);
        assert!(table.validate().is_ok());
        assert_eq!(table.rate(Scenario::Optimistic), 0.010);
        assert_eq!(table.rate(Scenario::Realistic), 0.020);
        assert_eq!(table.rate(Scenario::Severe), 0.030);
    }

    #[test]
    fn scenario_table_rejects_bad_rates() {
        assert!(ScenarioTable::new(0.0, 0.020, 0.030).validate().is_err());
        assert!(ScenarioTable::new(-0.01, 0.020, 0.030).validate().is_err());
        assert!(ScenarioTable::new(f32::NAN, 0.020, 0.030).validate().is_err());
        // ordering inversion is a config error too
        assert!(ScenarioTable::new(0.030, 0.020, 0.010).validate().is_err());
    }

    #[test]
    fn presets_validate() {
        assert!(ClimateConfig::exponential().validate().is_ok());
        assert!(ClimateConfig::linear().validate().is_ok());
    }

    #[test]
    fn invalid_climate_config_fails_fast() {
        let mut cfg = ClimateConfig::exponential();
        cfg.smoothing = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ClimateConfig::exponential();
        cfg.ph_min = 8.3;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn scenario_cycling_wraps() {
        let mut s = Scenario::Optimistic;
        for _ in 0..3 {
            s = s.next();
        }
        assert_eq!(s, Scenario::Optimistic);
        assert_eq!(Scenario::Optimistic.prev(), Scenario::Severe);
    }
}
