//! Interface layer towards the Amber UI process.
//!
//! The UI process renders dialogs on behalf of the portal. Showing a dialog is
//! a method call that returns as soon as the dialog is up; the user's answer
//! comes back later as a signal carrying the request token.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::time::timeout;
use tracing::{debug, info};
use zbus::proxy::CacheProperties;
use zbus::Connection;

use crate::config::UiConfig;
use crate::error::BridgeError;

pub mod listener;
pub mod prompt;

pub use prompt::{ConfirmationPrompt, FilePickerPrompt};

/// D-Bus proxy for the UI process.
#[zbus::proxy(
    interface = "org.freedesktop.impl.portal.desktop.amber.ui",
    default_service = "org.freedesktop.impl.portal.desktop.amber.ui",
    default_path = "/org/freedesktop/impl/portal/desktop/amber/ui"
)]
pub(crate) trait AmberUi {
    /// Shows a confirmation dialog. Returns once the dialog is shown.
    #[zbus(name = "confirmationDialog")]
    async fn confirmation_dialog(
        &self,
        token: &str,
        title: &str,
        subtitle: &str,
        body: &str,
        options: &str,
    ) -> zbus::Result<()>;

    /// Shows a file picker. Returns once the picker is shown.
    #[zbus(name = "openFilePicker")]
    async fn open_file_picker(&self, token: &str, title: &str, options: &str) -> zbus::Result<()>;

    /// Emitted when a confirmation dialog is closed.
    #[zbus(signal, name = "confirmationDone")]
    fn confirmation_done(
        &self,
        token: String,
        response: u32,
        choices: HashMap<String, String>,
    ) -> zbus::Result<()>;

    /// Emitted when a file picker is closed.
    #[zbus(signal, name = "pickerDone")]
    fn picker_done(&self, token: String, response: u32, uris: Vec<String>) -> zbus::Result<()>;
}

/// Sends dialogs to whatever renders them.
///
/// Returned futures do nothing until polled, which lets the caller register
/// the request before anything reaches the UI.
pub trait Delegate: Send + Sync {
    fn show_confirmation<'a>(
        &'a self,
        prompt: &'a ConfirmationPrompt,
    ) -> BoxFuture<'a, Result<(), BridgeError>>;

    fn show_file_picker<'a>(
        &'a self,
        prompt: &'a FilePickerPrompt,
    ) -> BoxFuture<'a, Result<(), BridgeError>>;
}

/// Client wrapper for the UI process' D-Bus API.
#[derive(Clone)]
pub struct UiClient {
    pub(crate) connection: Connection,
    service: String,
    path: String,
    dispatch_timeout: Duration,
}

impl UiClient {
    /// Creates a new client using the given D-Bus connection.
    pub fn new(connection: Connection, config: &UiConfig) -> Self {
        Self {
            connection,
            service: config.service.clone(),
            path: config.path.clone(),
            dispatch_timeout: config.dispatch_timeout(),
        }
    }

    pub(crate) async fn proxy(&self) -> zbus::Result<AmberUiProxy<'static>> {
        AmberUiProxy::builder(&self.connection)
            .destination(self.service.clone())?
            .path(self.path.clone())?
            .cache_properties(CacheProperties::No)
            .build()
            .await
    }

    async fn acknowledged<F>(&self, call: F) -> Result<(), BridgeError>
    where
        F: Future<Output = zbus::Result<()>>,
    {
        match timeout(self.dispatch_timeout, call).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(BridgeError::DispatchFailed(err.to_string())),
            Err(_) => Err(BridgeError::DispatchFailed(format!(
                "{} did not acknowledge within {:?}",
                self.service, self.dispatch_timeout
            ))),
        }
    }
}

impl Delegate for UiClient {
    fn show_confirmation<'a>(
        &'a self,
        prompt: &'a ConfirmationPrompt,
    ) -> BoxFuture<'a, Result<(), BridgeError>> {
        async move {
            let options = prompt.options_json()?;
            let proxy = self
                .proxy()
                .await
                .map_err(|err| BridgeError::DispatchFailed(err.to_string()))?;

            info!(token = %prompt.token, "Asking UI process to show a confirmation dialog");
            self.acknowledged(proxy.confirmation_dialog(
                &prompt.token,
                &prompt.title,
                &prompt.subtitle,
                &prompt.body,
                &options,
            ))
            .await?;
            debug!(token = %prompt.token, "Confirmation dialog dispatched");
            Ok(())
        }
        .boxed()
    }

    fn show_file_picker<'a>(
        &'a self,
        prompt: &'a FilePickerPrompt,
    ) -> BoxFuture<'a, Result<(), BridgeError>> {
        async move {
            let options = prompt.options_json()?;
            let proxy = self
                .proxy()
                .await
                .map_err(|err| BridgeError::DispatchFailed(err.to_string()))?;

            info!(token = %prompt.token, "Asking UI process to show a file picker");
            self.acknowledged(proxy.open_file_picker(&prompt.token, &prompt.title, &options))
                .await?;
            debug!(token = %prompt.token, "File picker dispatched");
            Ok(())
        }
        .boxed()
    }
}
