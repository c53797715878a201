//! XDG Desktop Portal backend for Amber.
//!
//! This binary exports the Access, FileChooser and Settings portal backends
//! on the session bus and forwards dialogs to the Amber UI process.

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;
use zbus::Connection;

use xdg_desktop_portal_amber::bridge::Bridge;
use xdg_desktop_portal_amber::config::Config;
use xdg_desktop_portal_amber::portal::{
    desktop_path, AccessPortal, FileChooserPortal, SettingsPortal,
};
use xdg_desktop_portal_amber::ui_client::{listener, Delegate, UiClient};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::with(Clone::clone);

    let connection = Connection::session().await?;
    info!("Connected to D-Bus session bus");

    let ui_client = UiClient::new(connection.clone(), &config.ui);
    let access_bridge = Bridge::new("access");
    let file_chooser_bridge = Bridge::new("file-chooser");

    let listeners =
        listener::spawn(&ui_client, access_bridge.clone(), file_chooser_bridge.clone()).await?;

    let delegate: Arc<dyn Delegate> = Arc::new(ui_client);
    let object_server = connection.object_server();
    object_server
        .at(
            desktop_path(),
            AccessPortal::new(delegate.clone(), access_bridge, config.timeouts.access()),
        )
        .await?;
    object_server
        .at(
            desktop_path(),
            FileChooserPortal::new(
                delegate,
                file_chooser_bridge,
                config.timeouts.file_chooser(),
            ),
        )
        .await?;
    object_server
        .at(desktop_path(), SettingsPortal::new(config.appearance.clone()))
        .await?;

    connection.request_name(config.bus_name.as_str()).await?;
    info!(name = %config.bus_name, "Amber portal backend running");

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutdown requested");
        }
        _ = futures::future::select_all(listeners) => {
            info!("UI signal listener terminated");
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
