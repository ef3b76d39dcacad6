use anyhow::Result;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::climate::{self, ClimateState, SimulationInput};
use crate::config::{ClimateConfig, VisualConfig, YEAR_MAX, YEAR_MIN};
use crate::input::{self, Action};
use crate::particles::ParticleField;
use crate::render::{self, Terminal};
use crate::visual::VisualParams;
use crate::Cli;

const HELP_LINES: &[&str] = &[
    "Left/Right: pending year -1/+1 (Shift: +-10)",
    "S or Up/Down: cycle pending scenario",
    "Enter: apply pending year and scenario",
    "P: pause    H: toggle HUD    ?: this help",
    "Q: quit",
    "",
    "Acidic oceans run rough and murky,",
    "and low pH bleaches the coral.",
];

/// Simulation-side application state. Owns the climate state and the staged
/// input pair; knows nothing about the terminal.
pub(crate) struct App {
    climate: ClimateConfig,
    visual: VisualConfig,
    state: ClimateState,
    applied: SimulationInput,
    pending: SimulationInput,
    pub(crate) time: f32,
    pub(crate) paused: bool,
    pub(crate) show_hud: bool,
    pub(crate) show_help: bool,
}

impl App {
    pub(crate) fn new(
        climate: ClimateConfig,
        visual: VisualConfig,
        initial: SimulationInput,
    ) -> Result<Self> {
        // configuration errors die here, never inside the frame loop
        climate.validate()?;
        let state = ClimateState::new(climate.base_ph);
        Ok(Self {
            climate,
            visual,
            state,
            applied: initial,
            pending: initial,
            time: 0.0,
            paused: false,
            show_hud: true,
            show_help: false,
        })
    }

    /// Staged policy: controls edit only the pending input; Enter commits it.
    pub(crate) fn apply_action(&mut self, action: Action) {
        match action {
            Action::YearDelta(d) => {
                self.pending.year = (self.pending.year + d).clamp(YEAR_MIN, YEAR_MAX);
            }
            Action::ScenarioNext => self.pending.scenario = self.pending.scenario.next(),
            Action::ScenarioPrev => self.pending.scenario = self.pending.scenario.prev(),
            Action::Apply => self.applied = self.pending,
            Action::TogglePause => self.paused = !self.paused,
            Action::ToggleHud => self.show_hud = !self.show_hud,
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Back => self.show_help = false,
            Action::Quit => {}
        }
    }

    pub(crate) fn target_ph(&self) -> f32 {
        climate::target_ph(&self.climate, self.applied)
    }

    /// One animation frame: ease the displayed pH and derive the frame's
    /// drawing parameters.
    pub(crate) fn advance(&mut self, dt: f32) -> VisualParams {
        self.time += dt;
        let target = self.target_ph();
        self.state.advance(target, self.climate.smoothing);
        self.params_now()
    }

    pub(crate) fn params_now(&self) -> VisualParams {
        VisualParams::derive(&self.climate, &self.visual, self.state.display_ph(), self.time)
    }

    pub(crate) fn hud_lines(&self, params: &VisualParams, fps: f32) -> (String, String) {
        let mut line1 = format!(
            "  acidtide | year {} {} | pH {:.2} | coral: {} ",
            self.applied.year,
            self.applied.scenario.label(),
            self.state.display_ph(),
            params.coral_status.label(),
        );
        if self.pending != self.applied {
            line1.push_str(&format!(
                "| pending {} {} (enter applies) ",
                self.pending.year,
                self.pending.scenario.label()
            ));
        }
        if self.paused {
            line1.push_str("| paused ");
        }
        line1.push_str(&format!("| {fps:.0} fps  "));

        let line2 =
            "  keys: arrows year/scenario  Enter apply  P pause  H hud  ? help  Q quit  ".to_string();
        (line1, line2)
    }
}

pub(crate) fn run(cli: Cli) -> Result<()> {
    let mut climate = ClimateConfig::for_law(cli.growth_law);
    if cli.no_smoothing {
        climate.smoothing = 1.0;
    }
    let initial = SimulationInput {
        year: cli.year.clamp(YEAR_MIN, YEAR_MAX),
        scenario: cli.scenario,
    };
    let mut app = App::new(climate, VisualConfig::default(), initial)?;

    let seed = if cli.seed != 0 {
        cli.seed
    } else {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0xAC1D_7EA)
    };
    let mut field = ParticleField::new(seed);

    let fps_cap = cli.fps.clamp(10, 240);
    let frame_dt = Duration::from_secs_f32(1.0 / fps_cap as f32);

    let mut term = Terminal::begin()?;

    let res = (|| -> Result<()> {
        let mut last = Instant::now();
        let mut fps_acc = 0.0f32;
        let mut fps_frames = 0u32;
        let mut fps_est = fps_cap as f32;

        loop {
            let frame_start = Instant::now();
            term.resize_if_needed()?;

            for action in input::poll_actions(frame_dt)? {
                if action == Action::Quit {
                    return Ok(());
                }
                app.apply_action(action);
            }

            let now = Instant::now();
            let dt = (now - last).as_secs_f32().min(0.05);
            last = now;

            fps_acc += dt;
            fps_frames += 1;
            if fps_acc >= 0.5 {
                fps_est = fps_frames as f32 / fps_acc;
                fps_acc = 0.0;
                fps_frames = 0;
            }

            let params = if app.paused {
                app.params_now()
            } else {
                let p = app.advance(dt);
                field.update(dt, app.time);
                p
            };

            render::draw_scene(&mut term, &params, &field);
            if app.show_hud {
                let (l1, l2) = app.hud_lines(&params, fps_est);
                render::draw_hud(&mut term, &l1, &l2);
            }
            if app.show_help {
                render::draw_center_box(&mut term, "acidtide", HELP_LINES);
            }
            term.present()?;

            let spent = frame_start.elapsed();
            if spent < frame_dt {
                std::thread::sleep(frame_dt - spent);
            }
        }
    })();

    let end_res = term.end();
    res.and(end_res)
}
