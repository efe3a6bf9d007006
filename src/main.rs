//! Scrub entry point
//!
//! Headless demo: loads (or generates) a scene, lets the autopilot clean it
//! at the fixed timestep and logs every event the simulation emits.
//!
//! ```text
//! scrub [--settings FILE] [--scene FILE] [--seed N] [--dirt N] [--ticks N]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::path::PathBuf;

    use scrub::consts::SIM_DT;
    use scrub::sim::{CleaningState, GameEvent, GameEventKind, SceneBuilder, TickInput, tick};
    use scrub::{SceneConfig, Settings};

    const DEFAULT_SEED: u64 = 0x5C2B;
    const DEFAULT_DIRT: usize = 8;
    const DEFAULT_TICK_LIMIT: u64 = 60 * 60 * 10;
    /// Give up after this many ticks without progress
    const STALL_TICKS: u64 = 60 * 30;

    #[derive(Debug)]
    struct Args {
        settings: Option<PathBuf>,
        scene: Option<PathBuf>,
        seed: u64,
        dirt: usize,
        ticks: u64,
    }

    impl Args {
        fn parse() -> Result<Self, Box<dyn Error>> {
            let mut args = Self {
                settings: None,
                scene: None,
                seed: DEFAULT_SEED,
                dirt: DEFAULT_DIRT,
                ticks: DEFAULT_TICK_LIMIT,
            };
            let mut iter = std::env::args().skip(1);
            while let Some(flag) = iter.next() {
                let mut value = || iter.next().ok_or_else(|| format!("{flag} needs a value"));
                match flag.as_str() {
                    "--settings" => args.settings = Some(value()?.into()),
                    "--scene" => args.scene = Some(value()?.into()),
                    "--seed" => args.seed = value()?.parse()?,
                    "--dirt" => args.dirt = value()?.parse()?,
                    "--ticks" => args.ticks = value()?.parse()?,
                    other => return Err(format!("unknown argument: {other}").into()),
                }
            }
            Ok(args)
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("Scrub (native) starting...");

        let args = Args::parse()?;
        let settings = match &args.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let scene = match &args.scene {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::generate(args.seed, args.dirt),
        };
        log::info!(
            "policy={} base_power={} require_correct_tool={}",
            settings.damage_policy.as_str(),
            settings.base_power,
            settings.require_correct_tool
        );

        let mut state = SceneBuilder::from_config(settings, &scene)?.bind();
        log_events(&mut state);

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut last_cleaned = state.progress.cleaned();
        let mut stalled = 0;
        while !state.all_clean() && state.time_ticks < args.ticks {
            tick(&mut state, &input, SIM_DT);
            log_events(&mut state);

            if state.progress.cleaned() == last_cleaned {
                stalled += 1;
                if stalled >= STALL_TICKS {
                    log::warn!("No progress for {STALL_TICKS} ticks, stopping");
                    break;
                }
            } else {
                last_cleaned = state.progress.cleaned();
                stalled = 0;
            }
        }

        let reclaimed = state.reclaim_destroyed();
        println!(
            "{} after {} ticks ({:.1}s): {}/{} dirt cleaned, {} reclaimed",
            if state.all_clean() { "All clean" } else { "Stopped" },
            state.time_ticks,
            state.time_ticks as f32 * SIM_DT,
            state.progress.cleaned(),
            state.progress.total(),
            reclaimed
        );
        Ok(())
    }

    /// Host side of the event bus: drain and report
    fn log_events(state: &mut CleaningState) {
        for event in state.events.drain() {
            match event.kind() {
                // Per-hit health updates are noisy
                GameEventKind::Presentation if matches!(event, GameEvent::HealthRatioChanged { .. }) => {
                    log::debug!("[t={}] {event:?}", state.time_ticks)
                }
                GameEventKind::Rejection => log::warn!("[t={}] {event:?}", state.time_ticks),
                _ => log::info!("[t={}] {event:?}", state.time_ticks),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; the host page drives `scrub::sim::tick`
}
