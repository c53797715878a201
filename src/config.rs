use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use toml::map::Entry;
use tracing::{info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "XDP_AMBER_CONFIG";
const CONFIG_FILE_NAME: &str = "xdg-desktop-portal-amber.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Well-known name the backend owns on the session bus.
    pub bus_name: String,
    pub ui: UiConfig,
    pub timeouts: TimeoutConfig,
    pub appearance: AppearanceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus_name: "org.freedesktop.impl.portal.desktop.amber".to_string(),
            ui: UiConfig::default(),
            timeouts: TimeoutConfig::default(),
            appearance: AppearanceConfig::default(),
        }
    }
}

/// Where the UI process lives and how long to wait for it to take a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub service: String,
    pub path: String,
    pub dispatch_timeout_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            service: "org.freedesktop.impl.portal.desktop.amber.ui".to_string(),
            path: "/org/freedesktop/impl/portal/desktop/amber/ui".to_string(),
            dispatch_timeout_ms: 5_000,
        }
    }
}

impl UiConfig {
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }
}

/// Upper bounds on how long a dialog may stay open, per portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub access_secs: u64,
    pub file_chooser_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            access_secs: 120,
            file_chooser_secs: 600,
        }
    }
}

impl TimeoutConfig {
    pub fn access(&self) -> Duration {
        Duration::from_secs(self.access_secs)
    }

    pub fn file_chooser(&self) -> Duration {
        Duration::from_secs(self.file_chooser_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    None,
    Dark,
    Light,
}

impl ColorScheme {
    /// Value of `org.freedesktop.appearance` `color-scheme`.
    pub fn as_portal_value(self) -> u32 {
        match self {
            ColorScheme::None => 0,
            ColorScheme::Dark => 1,
            ColorScheme::Light => 2,
        }
    }
}

/// Static appearance data served by the Settings portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    pub color_scheme: ColorScheme,
    pub high_contrast: bool,
    pub accent_color: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub highlight_color: String,
    pub secondary_highlight_color: String,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::Dark,
            high_contrast: false,
            accent_color: "#F76039".to_string(),
            primary_color: "#ffffffff".to_string(),
            secondary_color: "#b0ffffff".to_string(),
            highlight_color: "#F76039".to_string(),
            secondary_highlight_color: "#943922".to_string(),
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn with<R>(f: impl FnOnce(&Config) -> R) -> R {
        let config = CONFIG.get_or_init(Config::init);
        f(config)
    }

    fn init() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                info!(path = %path.display(), "Loading configuration");
                Self::from_toml_str(&content)
            }
            Err(err) => {
                if std::env::var_os(CONFIG_ENV).is_some() {
                    warn!(path = %path.display(), "Failed to read config file: {err}");
                }
                Self::default()
            }
        }
    }

    /// Applies the overrides in `content` on top of the defaults.
    pub fn from_toml_str(content: &str) -> Self {
        let mut merged = match toml::Value::try_from(Self::default()) {
            Ok(value) => value,
            Err(err) => {
                warn!("Failed to serialize default config: {err}");
                return Self::default();
            }
        };

        match content.parse::<toml::Value>() {
            Ok(value) => merge_value(&mut merged, value),
            Err(err) => {
                warn!("Failed to parse config overrides: {err}");
                return Self::default();
            }
        }

        merged.try_into().unwrap_or_else(|err| {
            warn!("Falling back to default config due to invalid overrides: {err}");
            Self::default()
        })
    }
}

fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }

    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|path| path.is_absolute())
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;

    Some(base.join(CONFIG_FILE_NAME))
}

fn merge_value(base: &mut toml::Value, overrides: toml::Value) {
    match (base, overrides) {
        (toml::Value::Table(base_map), toml::Value::Table(override_map)) => {
            for (key, override_value) in override_map {
                match base_map.entry(key) {
                    Entry::Occupied(mut entry) => merge_value(entry.get_mut(), override_value),
                    Entry::Vacant(entry) => {
                        entry.insert(override_value);
                    }
                }
            }
        }
        (base_value, override_value) => {
            *base_value = override_value;
        }
    }
}
