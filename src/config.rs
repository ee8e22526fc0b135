use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::ThemeMode;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    #[serde(default = "default_seed_demo_tasks")]
    pub seed_demo_tasks: bool,
    #[serde(default = "default_theme_mode")]
    pub default_theme: ThemeMode,
    #[serde(default)]
    pub themes: Themes,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Themes {
    #[serde(default = "Theme::light")]
    pub light: Theme,
    #[serde(default = "Theme::dark")]
    pub dark: Theme,
}

/// Colors accept names ("cyan"), hex ("#1e293b") or rgb(r,g,b)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub fg: String,
    pub bg: String,
    pub highlight_bg: String,
    #[serde(default)]
    pub highlight_fg: String,
    pub accent: String,
    pub muted: String,
    #[serde(default = "default_error_color")]
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_toggle_complete")]
    pub toggle_complete: String,
    #[serde(default = "default_search")]
    pub search: String,
    #[serde(default = "default_cycle_status")]
    pub cycle_status: String,
    #[serde(default = "default_cycle_priority")]
    pub cycle_priority: String,
    #[serde(default = "default_clear_filters")]
    pub clear_filters: String,
    #[serde(default = "default_toggle_theme")]
    pub toggle_theme: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_save")]
    pub save: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            seed_demo_tasks: default_seed_demo_tasks(),
            default_theme: default_theme_mode(),
            themes: Themes::default(),
            key_bindings: KeyBindings::default(),
            log_filter: default_log_filter(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for Themes {
    fn default() -> Self {
        Self {
            light: Theme::light(),
            dark: Theme::dark(),
        }
    }
}

impl Theme {
    pub fn light() -> Self {
        Self {
            fg: "#0f172a".to_string(),
            bg: "#f8fafc".to_string(),
            highlight_bg: "#6366f1".to_string(),
            highlight_fg: String::new(),
            accent: "#4f46e5".to_string(),
            muted: "#64748b".to_string(),
            error: default_error_color(),
        }
    }

    pub fn dark() -> Self {
        Self {
            fg: "#e2e8f0".to_string(),
            bg: "#0b1120".to_string(),
            highlight_bg: "#818cf8".to_string(),
            highlight_fg: String::new(),
            accent: "#22d3ee".to_string(),
            muted: "#94a3b8".to_string(),
            error: default_error_color(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            new: default_new(),
            edit: default_edit(),
            delete: default_delete(),
            toggle_complete: default_toggle_complete(),
            search: default_search(),
            cycle_status: default_cycle_status(),
            cycle_priority: default_cycle_priority(),
            clear_filters: default_clear_filters(),
            toggle_theme: default_toggle_theme(),
            help: default_help(),
            save: default_save(),
            list_up: default_list_up(),
            list_down: default_list_down(),
        }
    }
}

// Default value functions
fn default_storage_path() -> String {
    default_storage_path_for_profile(utils::Profile::Prod)
}

fn default_storage_path_for_profile(profile: utils::Profile) -> String {
    if let Some(data_dir) = utils::get_data_dir(profile) {
        data_dir.join("taskdeck.db").to_string_lossy().to_string()
    } else {
        match profile {
            utils::Profile::Dev => "~/.local/share/taskdeck-dev/taskdeck.db".to_string(),
            utils::Profile::Prod => "~/.local/share/taskdeck/taskdeck.db".to_string(),
        }
    }
}

fn default_seed_demo_tasks() -> bool {
    true
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::Light
}

fn default_log_filter() -> String {
    "taskdeck=info".to_string()
}

fn default_error_color() -> String {
    "#ef4444".to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_toggle_complete() -> String {
    "Space".to_string()
}

fn default_search() -> String {
    "/".to_string()
}

fn default_cycle_status() -> String {
    "s".to_string()
}

fn default_cycle_priority() -> String {
    "p".to_string()
}

fn default_clear_filters() -> String {
    "c".to_string()
}

fn default_toggle_theme() -> String {
    "t".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_save() -> String {
    "Ctrl+s".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from the profile's config directory, creating it with
    /// defaults when missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from_path(&config_path, profile)
    }

    /// Load configuration from an explicit file, creating it with defaults when missing
    pub fn load_from_path(config_path: &Path, profile: utils::Profile) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let mut config: Config = toml::from_str(&contents)?;
            if config.storage_path.trim().is_empty() {
                config.storage_path = default_storage_path_for_profile(profile);
            }
            Ok(config)
        } else {
            let mut config = Config::default();
            config.storage_path = default_storage_path_for_profile(profile);
            config.save_to_path(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get the expanded storage path (with ~ expansion)
    pub fn get_storage_path(&self) -> PathBuf {
        utils::expand_path(&self.storage_path)
    }

    /// Log file sits next to the database
    pub fn get_log_path(&self) -> PathBuf {
        let storage_path = self.get_storage_path();
        match storage_path.parent() {
            Some(dir) => dir.join("taskdeck.log"),
            None => PathBuf::from("taskdeck.log"),
        }
    }

    /// Colors for the given mode. If highlight_fg is empty it is derived from highlight_bg.
    pub fn get_theme(&self, mode: ThemeMode) -> Theme {
        use crate::tui::widgets::color::{format_color_for_display, get_contrast_text_color, parse_color};

        let mut theme = match mode {
            ThemeMode::Light => self.themes.light.clone(),
            ThemeMode::Dark => self.themes.dark.clone(),
        };
        if theme.highlight_fg.is_empty() {
            let calculated = get_contrast_text_color(parse_color(&theme.highlight_bg));
            theme.highlight_fg = format_color_for_display(&calculated);
        }
        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.key_bindings.save, "Ctrl+s");
        assert_eq!(back.default_theme, ThemeMode::Light);
        assert_eq!(back.themes.dark.accent, config.themes.dark.accent);
        assert!(back.seed_demo_tasks);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            default_theme = "dark"
            seed_demo_tasks = false

            [key_bindings]
            quit = "x"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_theme, ThemeMode::Dark);
        assert!(!config.seed_demo_tasks);
        assert_eq!(config.key_bindings.quit, "x");
        assert_eq!(config.key_bindings.new, "n");
        assert_eq!(config.log_filter, "taskdeck=info");
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");
        let config = Config::load_from_path(&path, utils::Profile::Dev).unwrap();
        assert!(path.exists());
        assert!(config.storage_path.contains("taskdeck"));

        let reloaded = Config::load_from_path(&path, utils::Profile::Dev).unwrap();
        assert_eq!(reloaded.storage_path, config.storage_path);
    }

    #[test]
    fn broken_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "seed_demo_tasks = [").unwrap();
        assert!(matches!(
            Config::load_from_path(&path, utils::Profile::Prod),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn derived_highlight_foreground() {
        let config = Config::default();
        let theme = config.get_theme(ThemeMode::Dark);
        assert!(!theme.highlight_fg.is_empty());
    }
}
