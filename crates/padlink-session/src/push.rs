use serde::Deserialize;
use serde_json::Value;

use crate::types::ControllerStatus;

/// Payload type carrying the controller binding status.
pub const CONTROLLER_STATUS: &str = "controller_status";

#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(default)]
    plugin: Option<PluginMessage>,
}

#[derive(Debug, Deserialize)]
struct PluginMessage {
    plugin: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct TypedPayload {
    #[serde(rename = "type")]
    kind: String,
}

/// Extract a controller status from a raw push frame.
///
/// Frames addressed to another namespace, other payload types and malformed
/// frames yield `None`.
pub fn decode_push(frame: &str, namespace: &str) -> Option<ControllerStatus> {
    let frame: Frame = serde_json::from_str(frame).ok()?;
    let message = frame.plugin?;
    if message.plugin != namespace {
        return None;
    }
    let payload: TypedPayload = serde_json::from_value(message.data.clone()).ok()?;
    if payload.kind != CONTROLLER_STATUS {
        return None;
    }
    serde_json::from_value(message.data).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_active_status() {
        let frame = r#"{"plugin": {"plugin": "xbox", "data": {"type": "controller_status", "active": true, "controller_id": "Xbox Wireless"}}}"#;
        assert_eq!(
            decode_push(frame, "xbox"),
            Some(ControllerStatus {
                active: true,
                controller_id: Some("Xbox Wireless".into()),
            })
        );
    }

    #[test]
    fn null_controller_id_is_none() {
        let frame = r#"{"plugin": {"plugin": "xbox", "data": {"type": "controller_status", "active": false, "controller_id": null}}}"#;
        let status = decode_push(frame, "xbox").unwrap();
        assert!(!status.active);
        assert_eq!(status.controller_id, None);
    }

    #[test]
    fn other_namespace_is_ignored() {
        let frame = r#"{"plugin": {"plugin": "octolapse", "data": {"type": "controller_status", "active": true}}}"#;
        assert_eq!(decode_push(frame, "xbox"), None);
    }

    #[test]
    fn other_payload_type_is_ignored() {
        let frame = r#"{"plugin": {"plugin": "xbox", "data": {"type": "movement", "x": 1.0}}}"#;
        assert_eq!(decode_push(frame, "xbox"), None);
    }

    #[test]
    fn non_plugin_frames_are_ignored() {
        assert_eq!(decode_push(r#"{"current": {"state": {}}}"#, "xbox"), None);
        assert_eq!(decode_push(r#"{"connected": {"version": "1.10"}}"#, "xbox"), None);
        assert_eq!(decode_push("not json", "xbox"), None);
    }
}
