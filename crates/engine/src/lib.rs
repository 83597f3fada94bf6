use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod tiles;

pub use app::{
    draw_outline, draw_text, draw_text_centered, is_legal_transition, run_app, text_width,
    AppError, Camera, FrameSurface, InputAction, InputSnapshot, InputSource, LoopConfig, Rgba,
    ScreenRect, ScriptedInput, SpriteRect, SpriteSheetCache, StateHost, StateId, StateTracker,
    SubSurface, Surface, SLOW_FRAME_ENV_VAR,
};
pub use tiles::{
    Aabb, AxisMove, CycleDirection, DefinitionErrorCode, Layer, SourceLocation, Tile,
    TileAttribute, TileAttributes, TileMap, TileMapError, TileTypeDef, TileTypeId,
    TileTypeLoadError, TileTypeRegistry, TILE_SIZE_PX,
};

pub const ROOT_ENV_VAR: &str = "MINIJIM_ROOT";
pub const TILE_DEFS_FILE_NAME: &str = "tiles.xml";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    /// Level files live here; created on startup.
    pub data_dir: PathBuf,
    pub tile_defs_path: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        let data_dir = root.join("data");
        let tile_defs_path = assets_dir.join(TILE_DEFS_FILE_NAME);
        Self {
            root,
            assets_dir,
            data_dir,
            tile_defs_path,
        }
    }

    pub fn level_path(&self, level_number: u32) -> PathBuf {
        self.data_dir.join(format!("level_{level_number}.lvl"))
    }

    /// Resolves a user-typed map name under `data_dir`. Names that try to leave
    /// the directory are rejected.
    pub fn data_file(&self, name: &str) -> Option<PathBuf> {
        let name = name.trim();
        let path = Path::new(name);
        let plain = !name.is_empty()
            && path
                .components()
                .all(|part| matches!(part, std::path::Component::Normal(_)));
        plain.then(|| self.data_dir.join(path))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create level data directory at {path}: {source}")]
    CreateDataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "MINIJIM_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/minijim\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let paths = AppPaths::from_root(resolve_root()?);
    fs::create_dir_all(&paths.data_dir).map_err(|source| StartupError::CreateDataDir {
        path: paths.data_dir.clone(),
        source,
    })?;
    Ok(paths)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            exe_dir
                .ancestors()
                .find(|candidate| is_repo_marker(candidate))
                .map(normalize_path)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: normalize_path(&exe_dir),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
