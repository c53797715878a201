//! D-Bus interface implementation for `org.freedesktop.impl.portal.Access`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use zbus::fdo;
use zbus::interface;
use zbus::object_server::ObjectServer;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

use crate::bridge::Bridge;
use crate::portal::{compose_reply, Choices, PortalResults, Request};
use crate::ui_client::{ConfirmationPrompt, Delegate};

/// Options the UI cannot honour; they are accepted and ignored.
const UNSUPPORTED_OPTIONS: &[&str] = &["modal"];

/// Access portal: shows a grant/deny dialog through the UI process.
#[derive(Clone)]
pub struct AccessPortal {
    bridge: Bridge<Choices>,
    delegate: Arc<dyn Delegate>,
    timeout: Duration,
}

impl AccessPortal {
    pub fn new(delegate: Arc<dyn Delegate>, bridge: Bridge<Choices>, timeout: Duration) -> Self {
        Self {
            bridge,
            delegate,
            timeout,
        }
    }

    pub fn bridge(&self) -> &Bridge<Choices> {
        &self.bridge
    }

    /// Shows the dialog and waits for the user's answer.
    #[allow(clippy::too_many_arguments)]
    pub async fn show_access_dialog(
        &self,
        handle: &str,
        app_id: &str,
        parent_window: &str,
        title: &str,
        subtitle: &str,
        body: &str,
        options: &HashMap<String, OwnedValue>,
    ) -> fdo::Result<(u32, PortalResults)> {
        info!(
            request = handle,
            app_id,
            parent_window,
            title,
            subtitle,
            body,
            ?options,
            "AccessDialog called"
        );

        for key in UNSUPPORTED_OPTIONS.iter().filter(|key| options.contains_key(**key)) {
            info!(request = handle, option = *key, "Access dialog option not supported");
        }

        let prompt = ConfirmationPrompt::new(handle, title, subtitle, body, options);
        let outcome = self
            .bridge
            .run(handle, self.delegate.show_confirmation(&prompt), self.timeout)
            .await;

        let reply = compose_reply(outcome, encode_choices);
        match &reply {
            Ok((code, _)) => info!(request = handle, code, "AccessDialog finished"),
            Err(err) => info!(request = handle, %err, "AccessDialog failed"),
        }
        reply
    }
}

fn encode_choices(choices: Choices) -> zbus::Result<PortalResults> {
    let mut results = HashMap::new();
    if !choices.is_empty() {
        results.insert(
            "choices".to_string(),
            OwnedValue::try_from(Value::new(choices))?,
        );
    }
    Ok(results)
}

#[interface(name = "org.freedesktop.impl.portal.Access")]
impl AccessPortal {
    #[allow(clippy::too_many_arguments)]
    async fn access_dialog(
        &self,
        handle: OwnedObjectPath,
        app_id: String,
        parent_window: String,
        title: String,
        subtitle: String,
        body: String,
        options: HashMap<String, OwnedValue>,
        #[zbus(object_server)] object_server: &ObjectServer,
    ) -> fdo::Result<(u32, HashMap<String, OwnedValue>)> {
        Request::export(object_server, &handle, Arc::new(self.bridge.clone())).await?;

        let result = self
            .show_access_dialog(
                handle.as_str(),
                &app_id,
                &parent_window,
                &title,
                &subtitle,
                &body,
                &options,
            )
            .await;

        Request::unexport(object_server, &handle).await;

        result
    }
}
