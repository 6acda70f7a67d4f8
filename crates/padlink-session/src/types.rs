use serde::Deserialize;

/// Opaque identifier of a controller as reported by the controller service.
pub type ControllerId = String;

/// Controller meta information returned by a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ControllerDescriptor {
    pub id: ControllerId,
    #[serde(default)]
    pub name: Option<String>,
}

impl ControllerDescriptor {
    pub fn new(id: impl Into<ControllerId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Name to show to the operator, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Binding status pushed by the controller service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ControllerStatus {
    pub active: bool,
    #[serde(default)]
    pub controller_id: Option<ControllerId>,
}

/// Severity of an operator notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// Operator-visible message produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub text: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(title: impl Into<String>, text: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            severity,
        }
    }

    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(title, text, Severity::Success)
    }

    pub fn info(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(title, text, Severity::Info)
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(title, text, Severity::Error)
    }
}
