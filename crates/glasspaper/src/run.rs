use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use glassfield::{PanelPool, Viewport};
use renderer::{Antialiasing, RenderMode, Renderer, RendererConfig};

use crate::cli::Cli;
use crate::config::{ModeSetting, Settings};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let settings =
        Settings::load(cli.config.as_deref()).context("failed to load settings file")?;
    let config = resolve(&cli, &settings);

    tracing::debug!(
        mode = ?config.mode,
        width = config.surface_size.0,
        height = config.surface_size.1,
        fps = ?config.target_fps,
        seed = config.seed,
        "resolved configuration"
    );

    if let Some(dir) = cli.dump_shards.as_deref() {
        return dump_shards(dir, &config);
    }

    Renderer::new(config).run()
}

/// Merges CLI flags over file settings over built-in defaults.
fn resolve(cli: &Cli, settings: &Settings) -> RendererConfig {
    let defaults = RendererConfig::default();

    let mode = if cli.window {
        RenderMode::Windowed
    } else {
        match settings.mode {
            Some(ModeSetting::Window) => RenderMode::Windowed,
            Some(ModeSetting::Wallpaper) | None => RenderMode::Wallpaper,
        }
    };

    let seed = cli
        .seed
        .or(settings.seed)
        .unwrap_or_else(|| rand::random());
    if cli.seed.is_none() && settings.seed.is_none() {
        tracing::info!(seed, "no seed supplied; drew one for this session");
    }

    RendererConfig {
        surface_size: cli
            .size
            .or_else(|| settings.size())
            .unwrap_or(defaults.surface_size),
        mode,
        target_fps: normalize_fps(cli.fps.or(settings.fps)),
        antialiasing: cli
            .antialias
            .or_else(|| settings.antialiasing())
            .unwrap_or(Antialiasing::Auto),
        seed,
    }
}

fn normalize_fps(value: Option<f32>) -> Option<f32> {
    value.and_then(|fps| if fps > 0.0 { Some(fps) } else { None })
}

/// Synthesizes the shard pool for the configured seed and viewport, writes
/// each texture as a PNG, and exits without touching the GPU.
fn dump_shards(dir: &Path, config: &RendererConfig) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create dump directory {}", dir.display()))?;

    let viewport = Viewport::new(config.surface_size.0 as f32, config.surface_size.1 as f32);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let pool = PanelPool::generate(viewport, &mut rng);

    for (index, panel) in pool.panels().iter().enumerate() {
        let path = dir.join(format!("shard-{index:02}.png"));
        panel
            .texture
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote shard texture");
    }

    println!(
        "Wrote {} shard textures (seed {}) to {}",
        pool.len(),
        config.seed,
        dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("glasspaper").chain(args.iter().copied()))
    }

    #[test]
    fn cli_flags_win_over_file_settings() {
        let settings = Settings::from_toml_str(
            r#"
mode = "wallpaper"
width = 800
height = 600
fps = 30
seed = 1
"#,
        )
        .unwrap();
        let config = resolve(&cli(&["--window", "--size", "1024x768", "--seed", "9"]), &settings);
        assert_eq!(config.mode, RenderMode::Windowed);
        assert_eq!(config.surface_size, (1024, 768));
        assert_eq!(config.target_fps, Some(30.0));
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn file_settings_fill_in_missing_flags() {
        let settings = Settings::from_toml_str("mode = \"window\"\nfps = 24\nseed = 3").unwrap();
        let config = resolve(&cli(&[]), &settings);
        assert_eq!(config.mode, RenderMode::Windowed);
        assert_eq!(config.target_fps, Some(24.0));
        assert_eq!(config.seed, 3);
        assert_eq!(config.surface_size, (1920, 1080));
    }

    #[test]
    fn zero_fps_is_treated_as_uncapped() {
        let config = resolve(&cli(&["--fps", "0"]), &Settings::default());
        assert_eq!(config.target_fps, None);
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = resolve(&cli(&[]), &Settings::default());
        assert_eq!(config.mode, RenderMode::Wallpaper);
        assert_eq!(config.antialiasing, Antialiasing::Auto);
        assert_eq!(config.surface_size, (1920, 1080));
    }
}
