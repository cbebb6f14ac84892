//! Runtime configuration, layered from `rollcall.toml` and `ROLLCALL_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rollcall_core::{session::Session, stats::Threshold};
use serde::Deserialize;
use uuid::Uuid;

pub const DEFAULT_STORE_PATH: &str = "~/.local/share/rollcall/rollcall.db";

/// Deserialised CLI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Owner of every subject and record. Absent means no session, and
  /// anything touching the store is refused.
  #[serde(default)]
  pub user_id:    Option<Uuid>,
  #[serde(default)]
  pub threshold:  Threshold,
}

fn default_store_path() -> PathBuf { PathBuf::from(DEFAULT_STORE_PATH) }

impl CliConfig {
  /// Read `path` (optional on disk) then the environment; later sources win.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ROLLCALL"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn session(&self) -> Option<Session> { self.user_id.map(Session::new) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
