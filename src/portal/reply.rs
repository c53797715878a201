//! Turns the outcome of a bridged request into the portal reply.

use std::collections::HashMap;

use zbus::fdo;
use zbus::zvariant::OwnedValue;

use crate::bridge::{Completion, Response};
use crate::error::BridgeError;

/// The `a{sv}` results dictionary of a portal reply.
pub type PortalResults = HashMap<String, OwnedValue>;

/// Builds the `(u, a{sv})` reply of a bridged request.
///
/// Results are only encoded for accepted requests. A request closed by the
/// caller answers with the cancelled response code; every other failure
/// becomes a D-Bus error.
pub fn compose_reply<P>(
    outcome: Result<Completion<P>, BridgeError>,
    encode: impl FnOnce(P) -> zbus::Result<PortalResults>,
) -> fdo::Result<(u32, PortalResults)> {
    match outcome {
        Ok(Completion {
            response: Response::Accepted,
            payload,
        }) => {
            let results = encode(payload)
                .map_err(|err| fdo::Error::Failed(format!("Failed to encode results: {err}")))?;
            Ok((Response::Accepted.into(), results))
        }
        Ok(Completion { response, .. }) => Ok((response.into(), HashMap::new())),
        Err(BridgeError::Cancelled) => Ok((Response::Cancelled.into(), HashMap::new())),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use zbus::DBusError;

    fn encode_count(payload: u32) -> zbus::Result<PortalResults> {
        let mut results = HashMap::new();
        results.insert("count".to_string(), OwnedValue::from(payload));
        Ok(results)
    }

    #[test]
    fn accepted_completion_carries_results() {
        let (code, results) =
            compose_reply(Ok(Completion::new(Response::Accepted, 7u32)), encode_count).unwrap();
        assert_eq!(code, 0);
        assert_eq!(u32::try_from(results.get("count").unwrap()).unwrap(), 7);
    }

    #[test]
    fn declined_completion_has_empty_results() {
        let (code, results) =
            compose_reply(Ok(Completion::new(Response::Cancelled, 7u32)), encode_count).unwrap();
        assert_eq!(code, 1);
        assert!(results.is_empty());

        let (code, results) =
            compose_reply(Ok(Completion::new(Response::Other, 7u32)), encode_count).unwrap();
        assert_eq!(code, 2);
        assert!(results.is_empty());
    }

    #[test]
    fn closed_request_answers_cancelled() {
        let (code, results) = compose_reply(Err(BridgeError::Cancelled), encode_count).unwrap();
        assert_eq!(code, 1);
        assert!(results.is_empty());
    }

    #[test]
    fn failures_become_dbus_errors() {
        let err = compose_reply(
            Err(BridgeError::DispatchFailed("no owner".to_string())),
            encode_count,
        )
        .expect_err("dispatch failure must not produce a success reply");
        assert_eq!(err.name().as_str(), "org.freedesktop.DBus.Error.Failed");

        let err = compose_reply(
            Err(BridgeError::Timeout(Duration::from_secs(1))),
            encode_count,
        )
        .expect_err("timeout must not produce a success reply");
        assert_eq!(err.name().as_str(), "org.freedesktop.DBus.Error.TimedOut");
    }
}
