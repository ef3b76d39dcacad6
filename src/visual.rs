use crate::config::{ClimateConfig, VisualConfig};

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub(crate) fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t + 0.5) as u8;
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

pub(crate) const WHITE: Rgb = Rgb::new(255, 255, 255);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CoralStatus {
    Healthy,
    Bleached,
}

impl CoralStatus {
    pub(crate) fn from_health(health: f32, threshold: f32) -> Self {
        if health < threshold {
            CoralStatus::Bleached
        } else {
            CoralStatus::Healthy
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            CoralStatus::Healthy => "healthy",
            CoralStatus::Bleached => "bleached",
        }
    }
}

/// Position of `ph` inside the configured bounds, clamped to [0, 1].
fn ph_unit(climate: &ClimateConfig, ph: f32) -> f32 {
    ((ph - climate.ph_min) / (climate.ph_max - climate.ph_min)).clamp(0.0, 1.0)
}

/// Amplitude multiplier: acidic water is rough, healthy water is calm.
pub(crate) fn wave_calmness(climate: &ClimateConfig, visual: &VisualConfig, ph: f32) -> f32 {
    lerp(visual.rough_factor, visual.calm_factor, ph_unit(climate, ph))
}

/// 0 for the front layer, 1 for the deepest; 0 when there is a single layer.
pub(crate) fn layer_depth(layer: usize, total: usize) -> f32 {
    if total <= 1 {
        0.0
    } else {
        layer as f32 / (total - 1) as f32
    }
}

pub(crate) fn layer_amplitude(
    visual: &VisualConfig,
    layer: usize,
    total: usize,
    calmness: f32,
) -> f32 {
    visual.base_amplitude * calmness * (1.0 - layer_depth(layer, total) * 0.4)
}

/// Parallax: farther layers move slower.
pub(crate) fn layer_speed(layer: usize, total: usize) -> f32 {
    0.6 + (1.0 - layer_depth(layer, total)) * 0.6
}

/// Per-layer horizontal offset so layers never sit in lockstep.
pub(crate) fn layer_phase(layer: usize, total: usize, time: f32) -> f32 {
    time * layer_speed(layer, total) + layer as f32
}

/// Murky at low pH, clear at high pH; the front layer picks up foam white.
pub(crate) fn wave_color(climate: &ClimateConfig, visual: &VisualConfig, ph: f32, depth: f32) -> Rgb {
    let body = visual.murky_water.lerp(visual.clear_water, ph_unit(climate, ph));
    body.lerp(WHITE, (1.0 - depth.clamp(0.0, 1.0)) * 0.55)
}

pub(crate) fn coral_health(climate: &ClimateConfig, ph: f32) -> f32 {
    ph_unit(climate, ph)
}

pub(crate) fn coral_status(climate: &ClimateConfig, visual: &VisualConfig, ph: f32) -> CoralStatus {
    CoralStatus::from_health(coral_health(climate, ph), visual.bleach_threshold)
}

pub(crate) fn coral_color(visual: &VisualConfig, health: f32) -> Rgb {
    visual.coral_bleached.lerp(visual.coral_healthy, health)
}

/// Uniform glow alpha for every plankton particle this frame.
pub(crate) fn plankton_glow_alpha(climate: &ClimateConfig, visual: &VisualConfig, ph: f32) -> f32 {
    lerp(visual.glow_min, visual.glow_max, ph_unit(climate, ph))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct WaveLayer {
    pub(crate) amplitude: f32,
    /// Cycles across the scene width.
    pub(crate) frequency: f32,
    pub(crate) phase: f32,
    /// Push toward the horizon for deeper layers.
    pub(crate) offset_y: f32,
    pub(crate) color: Rgb,
    pub(crate) alpha: u8,
}

/// Everything the renderer needs for one frame. Recomputed from scratch
/// every frame; never retained.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct VisualParams {
    pub(crate) layers: Vec<WaveLayer>,
    pub(crate) coral_health: f32,
    pub(crate) coral_status: CoralStatus,
    pub(crate) coral_color: Rgb,
    pub(crate) plankton_alpha: u8,
    pub(crate) water_surface: Rgb,
    pub(crate) water_deep: Rgb,
}

impl VisualParams {
    pub(crate) fn derive(
        climate: &ClimateConfig,
        visual: &VisualConfig,
        ph: f32,
        time: f32,
    ) -> Self {
        let total = visual.wave_layers.max(1);
        let calmness = wave_calmness(climate, visual, ph);

        let layers = (0..total)
            .map(|i| {
                let depth = layer_depth(i, total);
                WaveLayer {
                    amplitude: layer_amplitude(visual, i, total, calmness),
                    frequency: 3.8 + depth,
                    phase: layer_phase(i, total, time),
                    offset_y: depth * 0.055,
                    color: wave_color(climate, visual, ph, depth),
                    alpha: lerp(140.0, 60.0, depth) as u8,
                }
            })
            .collect();

        let health = coral_health(climate, ph);
        Self {
            layers,
            coral_health: health,
            coral_status: coral_status(climate, visual, ph),
            coral_color: coral_color(visual, health),
            plankton_alpha: plankton_glow_alpha(climate, visual, ph) as u8,
            water_surface: wave_color(climate, visual, ph, 1.0).lerp(Rgb::new(12, 34, 52), 0.35),
            water_deep: Rgb::new(8, 22, 38),
        }
    }
}
