mod app;
mod climate;
mod config;
mod input;
mod particles;
mod render;
mod visual;

use anyhow::Result;
use clap::Parser;

use crate::config::{GrowthLaw, Scenario};

#[derive(Parser, Debug, Clone)]
#[command(name = "acidtide")]
#[command(about = "Ocean acidification scenario explorer for the terminal")]
pub(crate) struct Cli {
    /// Starting year, clamped to 1900..=2100
    #[arg(long, default_value_t = 2024)]
    pub(crate) year: i32,

    /// Emissions scenario
    #[arg(long, value_enum, default_value = "realistic")]
    pub(crate) scenario: Scenario,

    /// CO2 growth law
    #[arg(long, value_enum, default_value = "exponential")]
    pub(crate) growth_law: GrowthLaw,

    /// Frame cap (10..=240)
    #[arg(long, default_value_t = 60)]
    pub(crate) fps: u32,

    /// Particle RNG seed (0 = derive from the clock)
    #[arg(long, default_value_t = 0)]
    pub(crate) seed: u64,

    /// Show the instantaneous pH instead of easing toward it
    #[arg(long, default_value_t = false)]
    pub(crate) no_smoothing: bool,
}

fn main() -> Result<()> {
    app::run(Cli::parse())
}
