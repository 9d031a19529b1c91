mod assets;
mod config;
mod display;
mod exhibit;
mod input;
mod logging;
mod plot;
mod render;
mod util;

use anyhow::{anyhow, Context};
use assets::AssetSet;
use config::Config;
use display::{Display, RenderTarget};
use exhibit::Exhibit;
use input::{Controls, WheelInput};
use plot::CoordinateMapper;
use render::Compositor;
use std::time::Instant;
use util::FrameClock;

fn main() -> anyhow::Result<()> {
    let config_path = Config::locate();
    let (config, found) = Config::load_or_default(&config_path)?;
    logging::init(&config.log)?;

    if let Err(e) = run(config, found, &config_path) {
        log::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run(config: Config, found: bool, config_path: &std::path::Path) -> anyhow::Result<()> {
    if found {
        log::info!("configuration loaded from {}", config_path.display());
    } else {
        log::info!("no {}, using defaults", config_path.display());
    }
    config.validate().context("invalid configuration")?;

    let mut exhibit = Exhibit::from_config(&config)?;

    let (mut display, texture_creator) =
        Display::create(&config.display.title, config.display.fullscreen, config.display.viewport)
            .map_err(|e| anyhow!(e))
            .context("failed to open display")?;
    let viewport = display.size();
    let mut target = RenderTarget::with_size(&texture_creator, viewport.0, viewport.1)
        .map_err(|e| anyhow!(e))
        .context("failed to create render target")?;

    let assets = AssetSet::load(&config.assets.directory, &config.assets.manifest, viewport)?;
    let region = assets.sub_region(&config.assets.grid_asset)?;
    let settings = exhibit.tracker().settings();
    let mapper = CoordinateMapper::new(settings.x_range, settings.y_range, region);
    let mut compositor = Compositor::new(viewport, mapper, &config);

    log::info!(
        "{}x{}, grid {}x{} at {:?}, {} curves",
        viewport.0,
        viewport.1,
        region.width(),
        region.height(),
        region.origin(),
        exhibit.curve_count()
    );

    let mut controls = Controls::new();
    let mut wheel = WheelInput::new(config.input.clone());
    wheel.try_connect(display.joystick_subsystem());

    let mut clock = FrameClock::new(config.display.target_fps, 60);
    let mut show_stats = config.display.show_fps;
    let mut intents = Vec::new();

    loop {
        intents.clear();
        for event in display.poll_events() {
            controls.handle(&event, &mut intents);
            wheel.handle(&event);
        }
        controls.held_intents(&mut intents);
        wheel.maintain(display.joystick_subsystem(), Instant::now());
        if let Some(intent) = wheel.intent() {
            intents.push(intent);
        }

        let outcome = exhibit.step(&intents);
        if outcome.quit {
            break;
        }
        if outcome.toggle_stats {
            show_stats = !show_stats;
        }
        if outcome.lapped {
            log::debug!("new lap at {:.0} fps", clock.avg_fps());
        }
        log::trace!("score {}", outcome.score);

        let stats = show_stats.then(|| clock.summary());
        let frame = compositor.render(&assets, &exhibit, stats.as_deref());
        display
            .present(&mut target, frame)
            .map_err(|e| anyhow!(e))
            .context("failed to present frame")?;
        clock.tick();
    }

    log::info!("quit after {} laps", exhibit.laps());
    Ok(())
}
