//! D-Bus interface implementation for `org.freedesktop.impl.portal.FileChooser`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use zbus::fdo;
use zbus::interface;
use zbus::object_server::ObjectServer;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

use crate::bridge::Bridge;
use crate::portal::{compose_reply, PortalResults, Request, Uris};
use crate::ui_client::{Delegate, FilePickerPrompt};

/// Options the picker does not implement; they are accepted and ignored.
const UNSUPPORTED_OPTIONS: &[&str] = &["modal", "filters", "current_filter", "choices"];

/// FileChooser portal: opens the picker of the UI process.
#[derive(Clone)]
pub struct FileChooserPortal {
    bridge: Bridge<Uris>,
    delegate: Arc<dyn Delegate>,
    timeout: Duration,
}

impl FileChooserPortal {
    pub fn new(delegate: Arc<dyn Delegate>, bridge: Bridge<Uris>, timeout: Duration) -> Self {
        Self {
            bridge,
            delegate,
            timeout,
        }
    }

    pub fn bridge(&self) -> &Bridge<Uris> {
        &self.bridge
    }

    /// Opens the picker and waits for the selection.
    pub async fn pick_files(
        &self,
        handle: &str,
        app_id: &str,
        parent_window: &str,
        title: &str,
        options: &HashMap<String, OwnedValue>,
    ) -> fdo::Result<(u32, PortalResults)> {
        info!(
            request = handle,
            app_id,
            parent_window,
            title,
            ?options,
            "FileChooser.OpenFile called"
        );

        for key in UNSUPPORTED_OPTIONS.iter().filter(|key| options.contains_key(**key)) {
            info!(request = handle, option = *key, "FileChooser option not supported");
        }

        let prompt = FilePickerPrompt::new(handle, title, options);
        let outcome = self
            .bridge
            .run(handle, self.delegate.show_file_picker(&prompt), self.timeout)
            .await;

        let reply = compose_reply(outcome, encode_uris);
        match &reply {
            Ok((code, results)) => info!(request = handle, code, ?results, "OpenFile finished"),
            Err(err) => info!(request = handle, %err, "OpenFile failed"),
        }
        reply
    }

    fn not_implemented(method: &str, handle: &OwnedObjectPath, app_id: &str, title: &str) -> fdo::Error {
        info!(
            request = %handle,
            app_id,
            title,
            "FileChooser.{method} called, which is not implemented"
        );
        fdo::Error::NotSupported("This method is not implemented".to_string())
    }
}

fn encode_uris(uris: Uris) -> zbus::Result<PortalResults> {
    let mut results = HashMap::new();
    results.insert("uris".to_string(), OwnedValue::try_from(Value::new(uris))?);
    Ok(results)
}

#[interface(name = "org.freedesktop.impl.portal.FileChooser")]
impl FileChooserPortal {
    async fn open_file(
        &self,
        handle: OwnedObjectPath,
        app_id: String,
        parent_window: String,
        title: String,
        options: HashMap<String, OwnedValue>,
        #[zbus(object_server)] object_server: &ObjectServer,
    ) -> fdo::Result<(u32, HashMap<String, OwnedValue>)> {
        Request::export(object_server, &handle, Arc::new(self.bridge.clone())).await?;

        let result = self
            .pick_files(handle.as_str(), &app_id, &parent_window, &title, &options)
            .await;

        Request::unexport(object_server, &handle).await;

        result
    }

    async fn save_file(
        &self,
        handle: OwnedObjectPath,
        app_id: String,
        _parent_window: String,
        title: String,
        _options: HashMap<String, OwnedValue>,
    ) -> fdo::Result<(u32, HashMap<String, OwnedValue>)> {
        Err(Self::not_implemented("SaveFile", &handle, &app_id, &title))
    }

    async fn save_files(
        &self,
        handle: OwnedObjectPath,
        app_id: String,
        _parent_window: String,
        title: String,
        _options: HashMap<String, OwnedValue>,
    ) -> fdo::Result<(u32, HashMap<String, OwnedValue>)> {
        Err(Self::not_implemented("SaveFiles", &handle, &app_id, &title))
    }
}
