use std::env;
use std::path::PathBuf;

use tilejump_engine::{LoopConfig, MetricsHandle, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{GameSettings, PlatformerScene, TilesetSource};

const TILESET_ENV_VAR: &str = "TILEJUMP_TILESET";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) metrics: MetricsHandle,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Tilejump Startup ===");

    let settings = GameSettings {
        tileset: tileset_source_from_env(),
        ..GameSettings::default()
    };
    info!(
        tiles_wide = settings.tiles_wide,
        tiles_high = settings.tiles_high,
        tile_size = settings.tile_size,
        tileset = ?settings.tileset,
        "game_settings"
    );

    let metrics = MetricsHandle::default();
    let scene = PlatformerScene::new(settings, metrics.clone());
    AppWiring {
        config: LoopConfig::default(),
        scene: Box::new(scene),
        metrics,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn tileset_source_from_env() -> TilesetSource {
    match env::var(TILESET_ENV_VAR) {
        Ok(raw) => parse_tileset_source(&raw),
        Err(env::VarError::NotPresent) => TilesetSource::Auto,
        Err(error) => {
            warn!(
                env_var = TILESET_ENV_VAR,
                error = %error,
                "tileset_env_unreadable_using_default"
            );
            TilesetSource::Auto
        }
    }
}

fn parse_tileset_source(raw: &str) -> TilesetSource {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        TilesetSource::Auto
    } else {
        TilesetSource::File(PathBuf::from(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tileset_override_means_auto() {
        assert_eq!(parse_tileset_source("   "), TilesetSource::Auto);
        assert_eq!(
            parse_tileset_source(" textures/custom.png "),
            TilesetSource::File(PathBuf::from("textures/custom.png"))
        );
    }
}
