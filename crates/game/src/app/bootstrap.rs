use std::path::PathBuf;

use engine::{resolve_app_paths, LoopConfig, StartupError, TileTypeLoadError, TileTypeRegistry};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::settings::{Settings, SETTINGS_FILE_NAME};
use super::states::{GameContext, StateEngine};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) asset_root: PathBuf,
    pub(crate) engine: StateEngine,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Paths(#[from] StartupError),
    #[error("tile definitions unavailable: {0}")]
    TileTypes(#[from] TileTypeLoadError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Mini Jim Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        data_dir = %paths.data_dir.display(),
        "app_paths_resolved"
    );
    let settings = Settings::load(&paths.assets_dir.join(SETTINGS_FILE_NAME));
    let registry = TileTypeRegistry::load_types(&paths.tile_defs_path)?;

    let config = LoopConfig::default();
    let asset_root = paths.assets_dir.clone();
    let engine = StateEngine::new(GameContext {
        paths,
        registry,
        settings,
        screen: (config.render_width, config.render_height),
    });

    Ok(AppWiring {
        config,
        asset_root,
        engine,
    })
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
