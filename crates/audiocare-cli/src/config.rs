use std::path::{Path, PathBuf};

use eyre::WrapErr;
use serde::{Deserialize, Serialize};

/// Version written by this build. Every bump needs a step in [`migrate`].
pub const CURRENT_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudiocareConfig {
    /// 0 when the file predates versioning.
    #[serde(default)]
    pub config_version: u32,
    /// Where session files and backups live.
    pub data_dir: PathBuf,
    /// Added in v1.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Names export files written into a directory. Added in v2.
    #[serde(default)]
    pub clinic_name: Option<String>,
    pub created_at: jiff::Timestamp,
}

impl AudiocareConfig {
    /// Config for a first run: data under the platform data directory.
    pub fn first_run() -> eyre::Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| eyre::eyre!("no data directory found"))?;
        Ok(Self {
            config_version: CURRENT_VERSION,
            data_dir: base.join("audiocare"),
            log_format: LogFormat::Pretty,
            clinic_name: None,
            created_at: jiff::Timestamp::now(),
        })
    }
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("audiocare"))
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub fn load_config(path: &Path) -> eyre::Result<AudiocareConfig> {
    let raw = std::fs::read(path)
        .wrap_err_with(|| format!("cannot read config at {}", path.display()))?;

    // Migrations run on the raw value, before the typed shape applies.
    let value: serde_json::Value = serde_json::from_slice(&raw)?;
    let version = value
        .get("config_version")
        .and_then(serde_json::Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0);

    Ok(serde_json::from_value(migrate(value, version)?)?)
}

/// Load the config at `path`, or write and return a first-run config when
/// none exists yet.
pub fn load_or_init(path: &Path) -> eyre::Result<AudiocareConfig> {
    if path.exists() {
        return load_config(path);
    }
    let config = AudiocareConfig::first_run()?;
    save_config(path, &config)?;
    Ok(config)
}

/// Bring a raw config written at `from_version` up to [`CURRENT_VERSION`],
/// one step at a time.
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        eyre::bail!(
            "config written by a newer audiocare (version {from_version}, this build reads up to {CURRENT_VERSION})"
        );
    }

    let obj = json
        .as_object_mut()
        .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;

    // v0 → v1: `storage_dir` renamed to `data_dir`; add log_format
    if from_version < 1 {
        if let Some(dir) = obj.remove("storage_dir") {
            obj.entry("data_dir").or_insert(dir);
        }
        obj.entry("log_format")
            .or_insert(serde_json::Value::String("pretty".to_string()));
        obj.insert("config_version".to_string(), 1.into());
        tracing::info!("migrated config v0 → v1 (data_dir, log_format)");
    }

    // v1 → v2: add clinic_name
    if from_version < 2 {
        obj.entry("clinic_name").or_insert(serde_json::Value::Null);
        obj.insert("config_version".to_string(), 2.into());
        tracing::info!("migrated config v1 → v2 (added clinic_name)");
    }

    Ok(json)
}

pub fn save_config(path: &Path, config: &AudiocareConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent", path.display()))?;
    std::fs::create_dir_all(dir)?;

    let current = AudiocareConfig {
        config_version: CURRENT_VERSION,
        ..config.clone()
    };
    let bytes = serde_json::to_vec_pretty(&current)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &bytes)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), version = CURRENT_VERSION, "config written");
    Ok(())
}
