use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use padlink_session::{
    CommandReply, ControllerId, ControllerService, RefreshReply, ServiceError,
};

use crate::error::{HttpError, HttpResult};

pub(crate) const API_KEY_HEADER: &str = "X-Api-Key";

/// Where and how to reach the controller service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
    pub namespace: String,
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn validate(&self) -> HttpResult<()> {
        match self.base_url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(HttpError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Websocket address of the push endpoint.
    pub fn push_url(&self) -> HttpResult<Url> {
        let mut url = self.endpoint("sockjs/websocket")?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| HttpError::UnsupportedScheme(url.scheme().to_string()))?;
        Ok(url)
    }

    /// Resolve `path` relative to the base url, keeping any base path prefix.
    pub(crate) fn endpoint(&self, path: &str) -> HttpResult<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join(path)?)
    }

    pub(crate) fn client(&self) -> HttpResult<Client> {
        Ok(Client::builder().timeout(self.timeout).build()?)
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum ApiCommand<'a> {
    Refresh,
    Activate { controller_id: &'a str },
    Deactivate,
}

/// Controller service reached through the host's plugin command API.
pub struct HttpControllerService {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpControllerService {
    pub fn new(config: &ServiceConfig) -> HttpResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint(&format!("api/plugin/{}", config.namespace))?;
        Ok(Self {
            client: config.client()?,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn command<T: DeserializeOwned>(&self, command: &ApiCommand<'_>) -> Result<T, ServiceError> {
        debug!("POST {} {command:?}", self.endpoint);
        let mut request = self.client.post(self.endpoint.clone()).json(command);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        request
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json::<T>)
            .map_err(|err| ServiceError(err.to_string()))
    }
}

impl ControllerService for HttpControllerService {
    fn refresh(&self) -> Result<RefreshReply, ServiceError> {
        self.command(&ApiCommand::Refresh)
    }

    fn activate(&self, id: &ControllerId) -> Result<CommandReply, ServiceError> {
        self.command(&ApiCommand::Activate { controller_id: id })
    }

    fn deactivate(&self) -> Result<CommandReply, ServiceError> {
        self.command(&ApiCommand::Deactivate)
    }
}

/// Credentials for the push socket, obtained through a passive login.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PushSession {
    pub name: String,
    pub session: String,
}

impl PushSession {
    pub(crate) fn auth_frame(&self) -> String {
        serde_json::json!({ "auth": format!("{}:{}", self.name, self.session) }).to_string()
    }
}

pub(crate) fn passive_login(config: &ServiceConfig, client: &Client) -> HttpResult<Option<PushSession>> {
    let Some(key) = &config.api_key else {
        return Ok(None);
    };
    let session = client
        .post(config.endpoint("api/login")?)
        .header(API_KEY_HEADER, key)
        .json(&serde_json::json!({ "passive": true }))
        .send()?
        .error_for_status()?
        .json::<PushSession>()?;
    Ok(Some(session))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> ServiceConfig {
        ServiceConfig {
            base_url: Url::parse(base).unwrap(),
            api_key: None,
            namespace: "xbox".into(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn endpoint_from_bare_host() {
        let service = HttpControllerService::new(&config("http://octopi.local")).unwrap();
        assert_eq!(service.endpoint().as_str(), "http://octopi.local/api/plugin/xbox");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let service = HttpControllerService::new(&config("https://example.org/octoprint")).unwrap();
        assert_eq!(
            service.endpoint().as_str(),
            "https://example.org/octoprint/api/plugin/xbox"
        );
    }

    #[test]
    fn push_url_follows_base_scheme() {
        let plain = config("http://octopi.local:5000").push_url().unwrap();
        assert_eq!(plain.as_str(), "ws://octopi.local:5000/sockjs/websocket");
        let tls = config("https://example.org/octoprint/").push_url().unwrap();
        assert_eq!(tls.as_str(), "wss://example.org/octoprint/sockjs/websocket");
    }

    #[test]
    fn non_http_base_is_rejected() {
        assert!(matches!(
            HttpControllerService::new(&config("ftp://octopi.local")),
            Err(HttpError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn commands_serialize_with_tag() {
        assert_eq!(
            serde_json::to_string(&ApiCommand::Refresh).unwrap(),
            r#"{"command":"refresh"}"#
        );
        assert_eq!(
            serde_json::to_string(&ApiCommand::Activate { controller_id: "pad-1" }).unwrap(),
            r#"{"command":"activate","controller_id":"pad-1"}"#
        );
    }

    #[test]
    fn unreachable_service_is_a_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let service = HttpControllerService::new(&config("http://127.0.0.1:9")).unwrap();
        assert!(service.refresh().is_err());
    }

    #[test]
    fn auth_frame_joins_name_and_session() {
        let session = PushSession {
            name: "operator".into(),
            session: "abc123".into(),
        };
        assert_eq!(session.auth_frame(), r#"{"auth":"operator:abc123"}"#);
    }
}
