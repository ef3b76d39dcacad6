use crate::config::{ClimateConfig, GrowthLaw, Scenario};

/// The year/scenario pair the user has committed. Produced by the UI,
/// consumed by the climate model each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SimulationInput {
    pub(crate) year: i32,
    pub(crate) scenario: Scenario,
}

pub(crate) fn compute_co2(cfg: &ClimateConfig, year: i32, scenario: Scenario) -> f32 {
    let rate = cfg.scenarios.rate(scenario);
    match cfg.growth_law {
        GrowthLaw::Exponential => {
            let t = (year - cfg.base_year) as f32;
            cfg.base_co2 * (1.0 + rate).powf(t)
        }
        GrowthLaw::Linear => {
            let t = ((year - cfg.base_year) as f32).clamp(0.0, cfg.max_years);
            cfg.base_co2 + t * rate
        }
    }
}

pub(crate) fn compute_ph(cfg: &ClimateConfig, co2: f32) -> f32 {
    (cfg.base_ph - cfg.sensitivity * (co2 - cfg.base_co2)).clamp(cfg.ph_min, cfg.ph_max)
}

pub(crate) fn target_ph(cfg: &ClimateConfig, input: SimulationInput) -> f32 {
    compute_ph(cfg, compute_co2(cfg, input.year, input.scenario))
}

pub(crate) fn advance_display_ph(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// The only frame-to-frame memory in the model: the eased pH actually shown.
/// Nothing outside this type writes it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ClimateState {
    display_ph: f32,
}

impl ClimateState {
    pub(crate) fn new(initial_ph: f32) -> Self {
        Self {
            display_ph: initial_ph,
        }
    }

    pub(crate) fn display_ph(&self) -> f32 {
        self.display_ph
    }

    /// Once per animation frame, feeding the previous result back.
    pub(crate) fn advance(&mut self, target: f32, factor: f32) {
        self.display_ph = advance_display_ph(self.display_ph, target, factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{YEAR_MAX, YEAR_MIN};

    fn ph_for(cfg: &ClimateConfig, year: i32, scenario: Scenario) -> f32 {
        compute_ph(cfg, compute_co2(cfg, year, scenario))
    }

    #[test]
    fn ph_stays_inside_bounds_for_every_scenario() {
        for cfg in [ClimateConfig::exponential(), ClimateConfig::linear()] {
            for s in Scenario::ALL {
                for year in [YEAR_MIN, YEAR_MAX, 2500] {
                    let ph = ph_for(&cfg, year, s);
                    assert!(
                        ph >= cfg.ph_min && ph <= cfg.ph_max,
                        "pH {ph} out of [{}, {}] for {} in {year}",
                        cfg.ph_min,
                        cfg.ph_max,
                        s.label()
                    );
                }
            }
        }
    }

    #[test]
    fn co2_is_nondecreasing_in_year() {
        for cfg in [ClimateConfig::exponential(), ClimateConfig::linear()] {
            for s in Scenario::ALL {
                let mut prev = f32::MIN;
                for year in (YEAR_MIN..=YEAR_MAX).step_by(10) {
                    let co2 = compute_co2(&cfg, year, s);
                    assert!(co2 >= prev, "CO2 fell from {prev} to {co2} at {year}");
                    prev = co2;
                }
            }
        }
    }

    #[test]
    fn ph_is_nonincreasing_in_co2() {
        let cfg = ClimateConfig::exponential();
        let mut prev = f32::MAX;
        let mut co2 = cfg.base_co2;
        while co2 < 4000.0 {
            let ph = compute_ph(&cfg, co2);
            assert!(ph <= prev, "pH rose from {prev} to {ph} at {co2} ppm");
            prev = ph;
            co2 += 50.0;
        }
    }

    #[test]
    fn severe_scenario_emits_at_least_as_much_as_milder_ones() {
        for cfg in [ClimateConfig::exponential(), ClimateConfig::linear()] {
            for year in [2000, 2050, YEAR_MAX] {
                let opt = compute_co2(&cfg, year, Scenario::Optimistic);
                let real = compute_co2(&cfg, year, Scenario::Realistic);
                let sev = compute_co2(&cfg, year, Scenario::Severe);
                assert!(sev >= real && real >= opt);
            }
        }
    }

    #[test]
    fn linear_growth_flattens_past_max_years() {
        let cfg = ClimateConfig::linear();
        let at_cap = compute_co2(&cfg, cfg.base_year + cfg.max_years as i32, Scenario::Realistic);
        let far_beyond = compute_co2(&cfg, 2500, Scenario::Realistic);
        assert_eq!(at_cap, far_beyond);
    }

    #[test]
    fn linear_growth_is_flat_before_base_year() {
        let cfg = ClimateConfig::linear();
        let before = compute_co2(&cfg, cfg.base_year - 30, Scenario::Severe);
        assert_eq!(before, cfg.base_co2);
    }

    #[test]
    fn smoothing_converges_to_target() {
        let target = 7.6;
        let mut current = 8.2;
        for _ in 0..350 {
            current = advance_display_ph(current, target, 0.02);
        }
        assert!(
            (current - target).abs() < 1e-3,
            "display pH {current} did not converge to {target}"
        );
    }

    #[test]
    fn smoothing_factor_one_is_instantaneous() {
        assert_eq!(advance_display_ph(8.2, 7.7, 1.0), 7.7);
    }

    #[test]
    fn climate_state_tracks_the_eased_value() {
        let mut state = ClimateState::new(8.2);
        state.advance(7.6, 0.02);
        let expected = 8.2 + (7.6 - 8.2) * 0.02;
        assert!((state.display_ph() - expected).abs() < 1e-6);
    }

    #[test]
    fn exponential_example_year_2000_clamps_to_floor() {
        let cfg = ClimateConfig::exponential();
        let co2 = compute_co2(&cfg, 2000, Scenario::Realistic);
        // 280 * 1.02^100 is a bit over 2000 ppm
        assert!(co2 > 1900.0 && co2 < 2200.0, "unexpected CO2 {co2}");
        let ph = compute_ph(&cfg, co2);
        assert!((ph - 7.6).abs() < 1e-6);
        assert_eq!(format!("{ph:.2}"), "7.60");
    }

    #[test]
    fn linear_example_year_2025_stays_above_floor() {
        let cfg = ClimateConfig::linear();
        let co2 = compute_co2(&cfg, 2025, Scenario::Realistic);
        assert!((co2 - 340.0).abs() < 1e-3, "unexpected CO2 {co2}");
        let ph = compute_ph(&cfg, co2);
        assert!((ph - 8.092).abs() < 1e-3, "unexpected pH {ph}");
        assert_eq!(format!("{ph:.2}"), "8.09");
    }
}
