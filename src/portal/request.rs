//! D-Bus Request object for in-flight portal calls.

use std::sync::Arc;

use tracing::{debug, info, warn};
use zbus::fdo;
use zbus::interface;
use zbus::object_server::ObjectServer;
use zbus::zvariant::OwnedObjectPath;

use crate::bridge::{Cancel, Delivery};
use crate::error::BridgeError;

/// Represents a pending portal request.
///
/// Exported at the request handle while the dialog is open. The frontend
/// calls `Close` when the calling application goes away, which ends the wait
/// for the dialog.
#[derive(Clone)]
pub struct Request {
    path: OwnedObjectPath,
    target: Arc<dyn Cancel>,
}

impl Request {
    /// Creates a new request with the given D-Bus object path.
    pub fn new(path: OwnedObjectPath, target: Arc<dyn Cancel>) -> Self {
        Self { path, target }
    }

    /// Export a Request object so the frontend can close it.
    ///
    /// Fails if a request is already exported at `path`; that object belongs to
    /// another call and is left alone.
    pub(crate) async fn export(
        object_server: &ObjectServer,
        path: &OwnedObjectPath,
        target: Arc<dyn Cancel>,
    ) -> fdo::Result<()> {
        let added = object_server
            .at(path.clone(), Request::new(path.clone(), target))
            .await
            .map_err(|err| fdo::Error::Failed(err.to_string()))?;

        if !added {
            warn!(request = %path.as_str(), "Request handle already in use");
            return Err(BridgeError::DuplicateToken(path.to_string()).into());
        }
        Ok(())
    }

    pub(crate) async fn unexport(object_server: &ObjectServer, path: &OwnedObjectPath) {
        if let Err(err) = object_server.remove::<Request, _>(path).await {
            warn!(request = %path.as_str(), ?err, "Failed to unregister request object");
        }
    }
}

#[interface(name = "org.freedesktop.impl.portal.Request")]
impl Request {
    /// Called by the frontend to cancel the request.
    async fn close(&self) -> fdo::Result<()> {
        info!(request = %self.path, "Request.Close called");

        match self.target.cancel(self.path.as_str()) {
            Delivery::Accepted => info!(request = %self.path, "Pending dialog abandoned"),
            other => debug!(request = %self.path, ?other, "Nothing left to cancel"),
        }
        Ok(())
    }
}
