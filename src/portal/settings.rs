//! D-Bus interface implementation for `org.freedesktop.impl.portal.Settings`.

use std::collections::HashMap;

use tracing::{debug, warn};
use zbus::fdo;
use zbus::interface;
use zbus::zvariant::{OwnedValue, Str, Value};

use crate::config::AppearanceConfig;

const NAMESPACE_FDO: &str = "org.freedesktop.appearance";
const NAMESPACE_SAILFISHOS: &str = "org.sailfishos.desktop";

/// Settings portal implementing org.freedesktop.impl.portal.Settings.
#[derive(Clone)]
pub struct SettingsPortal {
    appearance: AppearanceConfig,
}

impl SettingsPortal {
    pub fn new(appearance: AppearanceConfig) -> Self {
        Self { appearance }
    }

    /// Returns all settings as a nested HashMap.
    pub fn all_settings(&self) -> fdo::Result<HashMap<String, HashMap<String, OwnedValue>>> {
        let mut namespaces = HashMap::new();
        namespaces.insert(NAMESPACE_FDO.to_string(), self.freedesktop_appearance()?);
        namespaces.insert(NAMESPACE_SAILFISHOS.to_string(), self.sailfish_desktop());
        Ok(namespaces)
    }

    /// Returns the settings of the requested namespaces.
    ///
    /// An empty list, or one containing an empty string, selects everything.
    pub fn read_namespaces(
        &self,
        namespaces: &[String],
    ) -> fdo::Result<HashMap<String, HashMap<String, OwnedValue>>> {
        let all_settings = self.all_settings()?;

        if namespaces.is_empty() || namespaces.iter().any(|s| s.is_empty()) {
            return Ok(all_settings);
        }

        Ok(all_settings
            .into_iter()
            .filter(|(ns, _)| {
                namespaces
                    .iter()
                    .any(|requested| Self::matches_namespace(ns, requested))
            })
            .collect())
    }

    /// Gets a single setting value.
    pub fn setting(&self, namespace: &str, key: &str) -> fdo::Result<OwnedValue> {
        let mut settings = match namespace {
            NAMESPACE_FDO => self.freedesktop_appearance()?,
            NAMESPACE_SAILFISHOS => self.sailfish_desktop(),
            _ => HashMap::new(),
        };

        settings.remove(key).ok_or_else(|| {
            fdo::Error::Failed(format!("Unknown setting: {}.{}", namespace, key))
        })
    }

    fn freedesktop_appearance(&self) -> fdo::Result<HashMap<String, OwnedValue>> {
        let mut appearance = HashMap::new();
        appearance.insert(
            "color-scheme".to_string(),
            self.appearance.color_scheme.as_portal_value().into(),
        );
        appearance.insert(
            "contrast".to_string(),
            u32::from(self.appearance.high_contrast).into(),
        );

        match parse_hex_color(&self.appearance.accent_color) {
            Some(rgb) => {
                let value = OwnedValue::try_from(Value::new(rgb))
                    .map_err(|err| fdo::Error::Failed(err.to_string()))?;
                appearance.insert("accent-color".to_string(), value);
            }
            None => warn!(
                accent_color = %self.appearance.accent_color,
                "Ignoring malformed accent color"
            ),
        }

        Ok(appearance)
    }

    fn sailfish_desktop(&self) -> HashMap<String, OwnedValue> {
        let colors = [
            ("primary-color", &self.appearance.primary_color),
            ("secondary-color", &self.appearance.secondary_color),
            ("highlight-color", &self.appearance.highlight_color),
            (
                "secondary-highlight-color",
                &self.appearance.secondary_highlight_color,
            ),
        ];

        let mut desktop: HashMap<String, OwnedValue> = colors
            .into_iter()
            .map(|(key, color)| (key.to_string(), OwnedValue::from(Str::from(color.clone()))))
            .collect();
        desktop.insert(
            "color-scheme".to_string(),
            self.appearance.color_scheme.as_portal_value().into(),
        );
        desktop
    }

    /// Helper to match namespace patterns (supports trailing wildcard).
    fn matches_namespace(namespace: &str, pattern: &str) -> bool {
        if let Some(prefix) = pattern.strip_suffix(".*") {
            namespace.starts_with(prefix)
        } else {
            namespace == pattern
        }
    }
}

/// Parses `#RRGGBB` or `#AARRGGBB` into `(r, g, b)` in the 0..=1 range.
pub fn parse_hex_color(color: &str) -> Option<(f64, f64, f64)> {
    let hex = color.strip_prefix('#')?;
    let rgb = match hex.len() {
        6 => hex,
        8 => hex.get(2..)?,
        _ => return None,
    };
    let channel = |range: std::ops::Range<usize>| {
        rgb.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .map(|value| f64::from(value) / 255.0)
    };
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[interface(name = "org.freedesktop.impl.portal.Settings")]
impl SettingsPortal {
    /// Reads all settings, optionally filtered by namespace.
    async fn read_all(
        &self,
        namespaces: Vec<String>,
    ) -> fdo::Result<HashMap<String, HashMap<String, OwnedValue>>> {
        debug!(?namespaces, "ReadAll called");
        self.read_namespaces(&namespaces)
    }

    /// Reads a single setting (deprecated, but still part of the interface).
    async fn read(&self, namespace: String, key: String) -> fdo::Result<OwnedValue> {
        debug!(namespace, key, "Read called (deprecated)");
        self.setting(&namespace, &key)
    }

    #[zbus(property)]
    fn version(&self) -> u32 {
        1
    }
}
