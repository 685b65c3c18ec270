use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
mod atomic_io;
pub mod level;

pub use app::{
    run_app, run_app_with_metrics, AppError, Camera2D, InputAction, InputSnapshot, LoadContext,
    LoopConfig, LoopMetricsSnapshot, MetricsHandle, PointerButton, Rect, Scene, SceneCommand,
    TextureStore, Vec2, Viewport, SLOW_FRAME_ENV_VAR,
};
pub use level::{
    level_init, level_render, level_update, DrawList, Level, LevelArena, LevelConfig, LevelError,
    LevelMode, LevelSnapshot, SnapshotError, UpdateReport,
};

pub const ROOT_ENV_VAR: &str = "TILEJUMP_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub saves_dir: PathBuf,
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
    #[error("failed to create saves directory at {path}: {source}")]
    CreateSavesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "{env_var} is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot {
        path: PathBuf,
        env_var: &'static str,
    },
    #[error(
        "could not detect project root by walking upward from {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example: export {env_var}=\"/path/to/tilejump\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

/// Locates the project root and makes sure the saves directory exists.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    app_paths_under(root)
}

fn app_paths_under(root: PathBuf) -> Result<AppPaths, StartupError> {
    let assets_dir = root.join("assets");
    let saves_dir = root.join("saves");

    fs::create_dir_all(&saves_dir).map_err(|source| StartupError::CreateSavesDir {
        path: saves_dir.clone(),
        source,
    })?;

    Ok(AppPaths {
        root,
        assets_dir,
        saves_dir,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(Path::new(&value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot {
                    path: normalized,
                    env_var: ROOT_ENV_VAR,
                })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            find_root_above(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
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

fn find_root_above(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_root(temp: &TempDir) -> PathBuf {
        let root = temp.path().join("project");
        fs::create_dir_all(root.join("crates").join("game").join("target")).expect("dirs");
        fs::write(root.join("Cargo.toml"), "[workspace]\n").expect("cargo toml");
        root
    }

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let temp = TempDir::new().expect("tempdir");
        fs::create_dir_all(temp.path().join("crates")).expect("crates");
        assert!(!is_repo_marker(temp.path()));
        assert!(!is_repo_marker(&temp.path().join("definitely_not_a_marker")));
    }

    #[test]
    fn root_is_found_by_walking_up() {
        let temp = TempDir::new().expect("tempdir");
        let root = make_root(&temp);
        let nested = root.join("crates").join("game").join("target");
        assert_eq!(find_root_above(&nested), Some(normalize_path(&root)));
    }

    #[test]
    fn app_paths_create_saves_dir() {
        let temp = TempDir::new().expect("tempdir");
        let root = make_root(&temp);
        let paths = app_paths_under(root.clone()).expect("paths");
        assert_eq!(paths.assets_dir, root.join("assets"));
        assert!(paths.saves_dir.is_dir());
    }
}
