// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the InControl controller.

use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{Error, ParseError, ProtocolError};
use crate::protocol::{ModuleDocument, ModuleList};
use crate::state::DirtyFields;

// ============================================================================
// HttpConfig - Connection parameters
// ============================================================================

/// Connection parameters for the controller.
///
/// # Examples
///
/// ```
/// use incontrol_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("http://192.168.1.20:8080/")
///     .with_credentials("admin", "secret")
///     .with_response_timeout(Duration::from_secs(3));
///
/// // Scheme, path and port are stripped from the host
/// assert_eq!(config.host(), "192.168.1.20");
/// assert_eq!(config.base_url(), "http://192.168.1.20");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    host: String,
    port: u16,
    username: String,
    password: String,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default connection timeout.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(6000);
    /// Default response timeout.
    pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(6000);

    /// Creates a configuration for the specified domain or IP address.
    #[must_use]
    pub fn new(host: impl AsRef<str>) -> Self {
        Self {
            host: domain_from_uri(host.as_ref()),
            port: Self::DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            response_timeout: Self::DEFAULT_RESPONSE_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the response timeout.
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Replaces the host. The value is normalized like in [`new`](Self::new).
    pub fn set_host(&mut self, host: &str) {
        self.host = domain_from_uri(host);
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Replaces the port.
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Returns the username (possibly empty).
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Replaces the username.
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    /// Returns the password (possibly empty).
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Replaces the password.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Returns the credentials, only if both username and password are
    /// non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() || self.password.is_empty() {
            None
        } else {
            Some((self.username.as_str(), self.password.as_str()))
        }
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Replaces the connection timeout.
    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    /// Returns the response timeout.
    #[must_use]
    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Replaces the response timeout.
    pub fn set_response_timeout(&mut self, timeout: Duration) {
        self.response_timeout = timeout;
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.port == Self::DEFAULT_PORT {
            format!("http://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Builds the absolute URL of a resource path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }
}

/// Extracts the bare domain or IP from user input.
///
/// Spaces, a leading scheme, any path and an embedded port are removed.
///
/// # Examples
///
/// ```
/// use incontrol_lib::protocol::domain_from_uri;
///
/// assert_eq!(domain_from_uri("http://home.local:8080/"), "home.local");
/// assert_eq!(domain_from_uri(" 10.0.0.2 "), "10.0.0.2");
/// ```
#[must_use]
pub fn domain_from_uri(input: &str) -> String {
    let compact: String = input.chars().filter(|c| *c != ' ').collect();
    let without_scheme = compact
        .split_once("//")
        .map_or(compact.as_str(), |(_, rest)| rest);
    let without_path = without_scheme
        .split_once('/')
        .map_or(without_scheme, |(host, _)| host);
    without_path
        .split_once(':')
        .map_or(without_path, |(host, _)| host)
        .to_string()
}

// ============================================================================
// HttpTransport - Shared HTTP client
// ============================================================================

/// HTTP transport shared by a host and all modules bound to it.
///
/// The configuration can be changed at any time; the next request uses the
/// new values. The underlying client is rebuilt lazily when the connection
/// timeout changes, the response timeout is applied per request.
#[derive(Debug)]
pub struct HttpTransport {
    config: RwLock<HttpConfig>,
    client: Mutex<Option<CachedClient>>,
}

#[derive(Debug)]
struct CachedClient {
    connect_timeout: Duration,
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the given configuration.
    #[must_use]
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config: RwLock::new(config),
            client: Mutex::new(None),
        }
    }

    /// Returns a copy of the current configuration.
    #[must_use]
    pub fn config(&self) -> HttpConfig {
        self.config.read().clone()
    }

    /// Modifies the configuration in place.
    pub fn update_config(&self, update: impl FnOnce(&mut HttpConfig)) {
        update(&mut self.config.write());
    }

    /// Replaces the configuration.
    pub fn set_config(&self, config: HttpConfig) {
        *self.config.write() = config;
    }

    /// Fetches every module known to the controller.
    ///
    /// Returns `Ok(None)` if the controller answered with an empty body.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` on connection, timeout or status failures
    /// and `Error::Parse` on malformed JSON.
    pub async fn fetch_all(&self) -> Result<Option<ModuleList>, Error> {
        let (request, timeout) = self.request(Method::GET, "/")?;
        let body = execute(request, timeout).await?;
        Ok(parse_body(&body)?)
    }

    /// Posts the dirty fields of a module.
    ///
    /// The controller echoes the full resulting module. Returns `Ok(None)`
    /// if the body was empty.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` on connection, timeout or status failures
    /// and `Error::Parse` on malformed JSON.
    pub async fn post_partial(
        &self,
        path: &str,
        fields: &DirtyFields,
    ) -> Result<Option<ModuleDocument>, Error> {
        let (request, timeout) = self.request(Method::POST, path)?;
        let body = execute(request.form(&fields.to_form()), timeout).await?;
        Ok(parse_body(&body)?)
    }

    /// Deletes a module resource.
    ///
    /// Returns `Ok(false)` if the controller did not know the resource.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` on connection, timeout or status failures.
    pub async fn delete_resource(&self, path: &str) -> Result<bool, Error> {
        let (request, timeout) = self.request(Method::DELETE, path)?;
        match execute(request, timeout).await {
            Ok(_) => Ok(true),
            Err(ProtocolError::Status { code: 404, .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Builds a request for a resource path and returns it with its timeout.
    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<(RequestBuilder, Duration), ProtocolError> {
        let config = self.config();
        if config.host().is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "domain or IP is not set".to_string(),
            ));
        }

        let client = self.client(config.connect_timeout())?;
        let url = config.url(path);

        tracing::debug!(%method, url = %url, "Sending HTTP request");

        let mut request = client
            .request(method, &url)
            .timeout(config.response_timeout());
        if let Some((username, password)) = config.credentials() {
            request = request.basic_auth(username, Some(password));
        }
        Ok((request, config.response_timeout()))
    }

    /// Returns a client built for the given connection timeout.
    fn client(&self, connect_timeout: Duration) -> Result<Client, ProtocolError> {
        let mut cached = self.client.lock();
        if let Some(existing) = cached.as_ref()
            && existing.connect_timeout == connect_timeout
        {
            return Ok(existing.client.clone());
        }

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(ProtocolError::Http)?;
        *cached = Some(CachedClient {
            connect_timeout,
            client: client.clone(),
        });
        Ok(client)
    }
}

/// Sends a request and returns the response body.
async fn execute(request: RequestBuilder, timeout: Duration) -> Result<String, ProtocolError> {
    let response = request
        .send()
        .await
        .map_err(|e| map_send_error(e, timeout))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ProtocolError::AuthenticationFailed);
    }

    if !status.is_success() {
        return Err(ProtocolError::Status {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| map_send_error(e, timeout))?;

    tracing::debug!(status = status.as_u16(), body = %body, "Received HTTP response");

    Ok(body)
}

fn map_send_error(error: reqwest::Error, timeout: Duration) -> ProtocolError {
    if error.is_timeout() {
        ProtocolError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
    } else if error.is_connect() {
        ProtocolError::ConnectionFailed(error.to_string())
    } else {
        ProtocolError::Http(error)
    }
}

/// Parses a JSON body. An empty body means "no document".
fn parse_body<T: DeserializeOwned>(body: &str) -> Result<Option<T>, ParseError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body).map(Some).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::new("192.168.1.100");
        assert_eq!(config.host(), "192.168.1.100");
        assert_eq!(config.port(), 80);
        assert!(config.credentials().is_none());
        assert_eq!(config.connect_timeout(), Duration::from_millis(6000));
        assert_eq!(config.response_timeout(), Duration::from_millis(6000));
    }

    #[test]
    fn http_config_base_url() {
        let config = HttpConfig::new("192.168.1.100");
        assert_eq!(config.base_url(), "http://192.168.1.100");

        let config = config.with_port(8080);
        assert_eq!(config.base_url(), "http://192.168.1.100:8080");
        assert_eq!(config.url("/A/1/"), "http://192.168.1.100:8080/A/1/");
    }

    #[test]
    fn credentials_require_both_parts() {
        let config = HttpConfig::new("host").with_credentials("admin", "");
        assert!(config.credentials().is_none());

        let config = HttpConfig::new("host").with_credentials("", "secret");
        assert!(config.credentials().is_none());

        let config = HttpConfig::new("host").with_credentials("admin", "secret");
        assert_eq!(config.credentials(), Some(("admin", "secret")));
    }

    #[test]
    fn domain_normalization() {
        assert_eq!(domain_from_uri("www"), "www");
        assert_eq!(domain_from_uri("http://example.com"), "example.com");
        assert_eq!(domain_from_uri("https://example.com/"), "example.com");
        assert_eq!(domain_from_uri("example.com:81"), "example.com");
        assert_eq!(domain_from_uri("my host.local"), "myhost.local");
        assert_eq!(domain_from_uri(""), "");
    }

    #[test]
    fn setters_normalize_and_replace() {
        let mut config = HttpConfig::new("a");
        config.set_host("http://b:99/");
        config.set_port(8081);
        config.set_username("u");
        config.set_password("p");
        config.set_connect_timeout(Duration::from_secs(1));
        config.set_response_timeout(Duration::from_secs(2));

        assert_eq!(config.host(), "b");
        assert_eq!(config.port(), 8081);
        assert_eq!(config.credentials(), Some(("u", "p")));
        assert_eq!(config.connect_timeout(), Duration::from_secs(1));
        assert_eq!(config.response_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn empty_body_is_no_document() {
        let parsed: Option<ModuleList> = parse_body("  \n").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let parsed = parse_body::<ModuleList>("{not json");
        assert!(matches!(parsed, Err(ParseError::Json(_))));
    }

    #[test]
    fn transport_config_updates_are_visible() {
        let transport = HttpTransport::new(HttpConfig::new("old"));
        transport.update_config(|config| config.set_host("new"));
        assert_eq!(transport.config().host(), "new");
    }

    #[tokio::test]
    async fn request_without_host_fails() {
        let transport = HttpTransport::new(HttpConfig::new(""));
        let result = transport.fetch_all().await;
        assert!(matches!(
            result,
            Err(Error::Protocol(ProtocolError::InvalidAddress(_)))
        ));
    }

    #[test]
    fn client_is_rebuilt_when_connect_timeout_changes() {
        let transport = HttpTransport::new(HttpConfig::new("host"));
        transport.client(Duration::from_secs(1)).unwrap();
        transport.client(Duration::from_secs(2)).unwrap();
        let cached = transport.client.lock();
        assert_eq!(
            cached.as_ref().map(|c| c.connect_timeout),
            Some(Duration::from_secs(2))
        );
    }
}
