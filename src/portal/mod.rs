//! Portal module implementing XDG Desktop Portal backends.
//!
//! This module provides D-Bus interface implementations for:
//! - `org.freedesktop.impl.portal.Access`
//! - `org.freedesktop.impl.portal.FileChooser`
//! - `org.freedesktop.impl.portal.Settings`
//! - `org.freedesktop.impl.portal.Request`

mod access;
mod file_chooser;
mod reply;
mod request;
mod settings;

pub use access::AccessPortal;
pub use file_chooser::FileChooserPortal;
pub use reply::{compose_reply, PortalResults};
pub use request::Request;
pub use settings::{parse_hex_color, SettingsPortal};

/// D-Bus object path for the portal desktop interface.
pub const DESKTOP_PATH: &str = "/org/freedesktop/portal/desktop";

/// Choices selected in an access dialog, as `(choice id, value)` pairs.
pub type Choices = Vec<(String, String)>;

/// URIs picked in a file chooser.
pub type Uris = Vec<String>;

/// Returns the D-Bus object path for the portal desktop interface.
#[inline]
pub fn desktop_path() -> &'static str {
    DESKTOP_PATH
}
