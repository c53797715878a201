//! Routes `confirmationDone` and `pickerDone` signals to pending requests.
//!
//! One match rule per signal is installed at startup and shared by all
//! requests; the token in each signal selects the request it belongs to.

use std::collections::HashMap;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bridge::{Bridge, Completion, Delivery, Response};
use crate::portal::{Choices, Uris};
use crate::ui_client::{AmberUiProxy, UiClient};

const UI_GONE: &str = "UI process left the bus";

/// Hands a `confirmationDone` notification to the access bridge.
pub fn forward_confirmation(
    bridge: &Bridge<Choices>,
    token: &str,
    response: u32,
    choices: &HashMap<String, String>,
) -> Delivery {
    let mut choices: Choices = choices
        .iter()
        .map(|(id, value)| (id.clone(), value.clone()))
        .collect();
    choices.sort();

    debug!(token, response, ?choices, "confirmationDone received");
    bridge.complete(token, Completion::new(Response::from(response), choices))
}

/// Hands a `pickerDone` notification to the file chooser bridge.
pub fn forward_picker(bridge: &Bridge<Uris>, token: &str, response: u32, uris: &[String]) -> Delivery {
    debug!(token, response, ?uris, "pickerDone received");
    bridge.complete(token, Completion::new(Response::from(response), uris.to_vec()))
}

/// Subscribes to both completion signals and spawns the routing tasks.
///
/// The match rules are in place when this returns, so requests can be served
/// right away. Also watches the UI service name and fails every waiting
/// request when its owner leaves the bus.
pub async fn spawn(
    client: &UiClient,
    access: Bridge<Choices>,
    file_chooser: Bridge<Uris>,
) -> zbus::Result<Vec<JoinHandle<()>>> {
    let proxy = client.proxy().await?;
    let mut confirmations = proxy.receive_confirmation_done().await?;
    let mut pickers = proxy.receive_picker_done().await?;

    info!(service = %client.service, "Listening for UI completion signals");

    tokio::spawn(watch_owner(
        client.proxy().await?,
        access.clone(),
        file_chooser.clone(),
    ));

    let confirmations_task = tokio::spawn(async move {
        while let Some(signal) = confirmations.next().await {
            match signal.args() {
                Ok(args) => {
                    forward_confirmation(&access, args.token(), *args.response(), args.choices());
                }
                Err(err) => warn!(?err, "Malformed confirmationDone signal"),
            }
        }
        warn!("confirmationDone stream ended");
    });

    let pickers_task = tokio::spawn(async move {
        while let Some(signal) = pickers.next().await {
            match signal.args() {
                Ok(args) => {
                    forward_picker(&file_chooser, args.token(), *args.response(), args.uris());
                }
                Err(err) => warn!(?err, "Malformed pickerDone signal"),
            }
        }
        warn!("pickerDone stream ended");
    });

    Ok(vec![confirmations_task, pickers_task])
}

async fn watch_owner(
    proxy: AmberUiProxy<'static>,
    access: Bridge<Choices>,
    file_chooser: Bridge<Uris>,
) {
    let mut owners = match proxy.inner().receive_owner_changed().await {
        Ok(owners) => owners,
        Err(err) => {
            warn!(?err, "Cannot watch the UI process on the bus");
            return;
        }
    };

    while let Some(owner) = owners.next().await {
        match owner {
            Some(owner) => debug!(%owner, "UI process appeared"),
            None => {
                let failed = access.fail_pending(UI_GONE) + file_chooser.fail_pending(UI_GONE);
                warn!(failed, "UI process left the bus");
            }
        }
    }
}
