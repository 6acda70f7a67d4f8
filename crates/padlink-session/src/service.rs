use serde::Deserialize;
use thiserror::Error;

use crate::types::{ControllerDescriptor, ControllerId};

/// Transport-level failure talking to the controller service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("controller service unreachable: {0}")]
pub struct ServiceError(pub String);

/// Reply to a refresh command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RefreshReply {
    pub success: bool,
    #[serde(default)]
    pub controllers: Vec<ControllerDescriptor>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply to an activate or deactivate command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommandReply {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl RefreshReply {
    pub(crate) fn into_result(self) -> Result<Vec<ControllerDescriptor>, Option<String>> {
        if self.success {
            Ok(self.controllers)
        } else {
            Err(self.error)
        }
    }
}

impl CommandReply {
    pub(crate) fn into_result(self) -> Result<(), Option<String>> {
        if self.success {
            Ok(())
        } else {
            Err(self.error)
        }
    }
}

/// Remote component owning the physical controller binding.
///
/// Calls block; the dispatcher runs them off the event loop thread.
pub trait ControllerService: Send + Sync {
    fn refresh(&self) -> Result<RefreshReply, ServiceError>;
    fn activate(&self, id: &ControllerId) -> Result<CommandReply, ServiceError>;
    fn deactivate(&self) -> Result<CommandReply, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_reply_tolerates_extra_fields() {
        let json = r#"{
            "success": true,
            "controllers": [
                {"id": "Microsoft X-Box 360 pad", "name": "Microsoft X-Box 360 pad", "path": "/dev/input/event3"},
                {"id": "8BitDo SN30"}
            ]
        }"#;
        let reply: RefreshReply = serde_json::from_str(json).unwrap();
        assert!(reply.success);
        assert_eq!(reply.controllers.len(), 2);
        assert_eq!(reply.controllers[1].display_name(), "8BitDo SN30");
    }

    #[test]
    fn declined_refresh_keeps_error_message() {
        let json = r#"{"success": false, "error": "inputs module missing", "controllers": []}"#;
        let reply: RefreshReply = serde_json::from_str(json).unwrap();
        assert_eq!(
            reply.into_result(),
            Err(Some("inputs module missing".to_string()))
        );
    }

    #[test]
    fn command_reply_without_error_field() {
        let reply: CommandReply = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(reply.into_result(), Err(None));
    }
}
