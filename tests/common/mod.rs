#![allow(dead_code)]

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;
use xdg_desktop_portal_amber::error::BridgeError;
use xdg_desktop_portal_amber::ui_client::{ConfirmationPrompt, Delegate, FilePickerPrompt};

/// Stands in for the UI process. Reports every dialog it was asked to show.
pub struct FakeUi {
    running: bool,
    shown: mpsc::UnboundedSender<(String, String)>,
}

impl FakeUi {
    pub fn running() -> (Arc<Self>, mpsc::UnboundedReceiver<(String, String)>) {
        let (shown, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { running: true, shown }), rx)
    }

    pub fn absent() -> Arc<Self> {
        let (shown, _) = mpsc::unbounded_channel();
        Arc::new(Self {
            running: false,
            shown,
        })
    }

    fn show(&self, token: &str, options: String) -> Result<(), BridgeError> {
        if !self.running {
            return Err(BridgeError::DispatchFailed(
                "org.freedesktop.DBus.Error.ServiceUnknown".to_string(),
            ));
        }
        let _ = self.shown.send((token.to_string(), options));
        Ok(())
    }
}

impl Delegate for FakeUi {
    fn show_confirmation<'a>(
        &'a self,
        prompt: &'a ConfirmationPrompt,
    ) -> BoxFuture<'a, Result<(), BridgeError>> {
        async move { self.show(&prompt.token, prompt.options_json()?) }.boxed()
    }

    fn show_file_picker<'a>(
        &'a self,
        prompt: &'a FilePickerPrompt,
    ) -> BoxFuture<'a, Result<(), BridgeError>> {
        async move { self.show(&prompt.token, prompt.options_json()?) }.boxed()
    }
}
