//! XDG Desktop Portal backend for Amber.
//!
//! This crate implements the `org.freedesktop.impl.portal` Access,
//! FileChooser and Settings interfaces. Dialogs are rendered by a separate UI
//! process; [`bridge`] ties each portal call to the signal that reports the
//! user's answer.

pub mod bridge;
pub mod config;
pub mod error;
pub mod portal;
pub mod ui_client;
