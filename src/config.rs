//! Configuration management for agencydesk using the prefer crate.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::PurgePolicy;

/// Application settings.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Directory for uploaded candidate documents.
    pub documents_dir: PathBuf,
    /// What purge does when the record still has live dependents.
    pub purge_policy: PurgePolicy,
    /// Whether lifecycle mutations are written to the audit log.
    pub audit_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("agencydesk");

        Self {
            documents_dir: data_dir.join("documents"),
            data_dir,
            database_filename: "agencydesk.db".to_string(),
            purge_policy: PurgePolicy::default(),
            audit_enabled: true,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            documents_dir: data_dir.join("documents"),
            data_dir,
            ..Default::default()
        }
    }

    /// Get the full path to the database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// SQLite URL for the database, as taken by the migration runner.
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.database_path().display())
    }

    /// Ensure all directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(&self.documents_dir)?;
        Ok(())
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target directory for data.
    #[serde(default)]
    pub target: Option<String>,
    /// Database filename.
    #[serde(default)]
    pub database: Option<String>,
    /// `refuse_live_dependents` or `allow_orphans`.
    #[serde(default)]
    pub purge_policy: Option<PurgePolicy>,
    /// Write lifecycle mutations to the audit log.
    #[serde(default)]
    pub audit: Option<bool>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers agencydesk config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("agencydesk").await {
            Ok(pref_config) => {
                let target: Option<String> = pref_config.get("target").ok();
                let database: Option<String> = pref_config.get("database").ok();
                let purge_policy: Option<PurgePolicy> =
                    pref_config.get("purge_policy").ok();
                let audit: Option<bool> = pref_config.get("audit").ok();

                Config {
                    target,
                    database,
                    purge_policy,
                    audit,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref target) = self.target {
            let path = shellexpand::tilde(target);
            settings.data_dir = PathBuf::from(path.as_ref());
            settings.documents_dir = settings.data_dir.join("documents");
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(policy) = self.purge_policy {
            settings.purge_policy = policy;
        }
        if let Some(audit) = self.audit {
            settings.audit_enabled = audit;
        }
    }
}

/// Load settings from configuration.
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_only_set_keys() {
        let config: Config = toml::from_str(
            r#"
            database = "desk.sqlite"
            purge_policy = "allow_orphans"
            "#,
        )
        .unwrap();

        let mut settings = Settings::with_data_dir(PathBuf::from("/srv/agency"));
        config.apply_to_settings(&mut settings);

        assert_eq!(settings.data_dir, PathBuf::from("/srv/agency"));
        assert_eq!(settings.database_path(), PathBuf::from("/srv/agency/desk.sqlite"));
        assert_eq!(settings.purge_policy, PurgePolicy::AllowOrphans);
        assert!(settings.audit_enabled);
    }

    #[test]
    fn test_target_moves_documents_dir() {
        let config = Config {
            target: Some("/tmp/agency-data".to_string()),
            audit: Some(false),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings);

        assert_eq!(settings.documents_dir, PathBuf::from("/tmp/agency-data/documents"));
        assert!(!settings.audit_enabled);
        assert!(settings.database_url().starts_with("sqlite:/tmp/agency-data/"));
    }

    #[test]
    fn test_settings_render_as_toml() {
        let settings = Settings::with_data_dir(PathBuf::from("/srv/agency"));
        let rendered = toml::to_string_pretty(&settings).unwrap();
        assert!(rendered.contains("purge_policy = \"refuse_live_dependents\""));
        assert!(rendered.contains("database_filename = \"agencydesk.db\""));
    }
}
