//! # shutterhub-adapter-shutter-http
//!
//! [`ShutterDevice`] backed by the shutter controller's web server.
//!
//! One `GET` per command: `/right` opens, `/left` closes (both
//! configurable). The controller guards both paths with HTTP Digest
//! authentication: the first request draws a `401` challenge, which is
//! answered once with the configured credentials. The password never
//! crosses the network. The final `200` carries a plain-text body which is
//! returned untouched; classifying it as success, busy or unknown is the
//! caller's job.
//!
//! ## Dependency rule
//!
//! Depends on `shutterhub-app` and `shutterhub-domain` only.

mod config;

pub use config::ShutterHttpConfig;

use std::future::Future;

use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Response, StatusCode};
use shutterhub_app::ports::{DeviceError, ShutterDevice};
use shutterhub_domain::direction::Direction;

/// HTTP client for the shutter controller.
#[derive(Debug, Clone)]
pub struct HttpShutterDevice {
    config: ShutterHttpConfig,
    client: reqwest::Client,
}

impl HttpShutterDevice {
    /// Build a device client.
    ///
    /// # Errors
    ///
    /// Returns the [`reqwest::Error`] raised when the HTTP client cannot be
    /// initialised.
    pub fn new(config: ShutterHttpConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    async fn send_command(&self, direction: Direction) -> Result<String, DeviceError> {
        let url = self.config.url_for(direction);
        tracing::debug!(%direction, %url, "sending shutter request");

        let mut response = self.client.get(&url).send().await.map_err(transport)?;

        if response.status() == StatusCode::UNAUTHORIZED
            && let Some(challenge) = digest_challenge(&response)
        {
            let uri = response.url().path().to_owned();
            let authorization = self
                .answer_challenge(&challenge, &uri)
                .map_err(|err| DeviceError::Transport(Box::new(err)))?;
            tracing::debug!(%direction, "answering digest challenge");
            response = self
                .client
                .get(&url)
                .header(AUTHORIZATION, authorization)
                .send()
                .await
                .map_err(transport)?;
        }

        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if status.is_success() {
            tracing::debug!(%direction, %body, "shutter controller replied");
            Ok(body)
        } else {
            Err(DeviceError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// `Authorization` header value answering a Digest `challenge` for `uri`.
    fn answer_challenge(&self, challenge: &str, uri: &str) -> Result<String, digest_auth::Error> {
        let mut prompt = digest_auth::parse(challenge)?;
        let context = digest_auth::AuthContext::new(
            self.config.login.as_str(),
            self.config.password.as_str(),
            uri,
        );
        Ok(prompt.respond(&context)?.to_header_string())
    }
}

/// The first `WWW-Authenticate` value offering the Digest scheme.
fn digest_challenge(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::trim_start)
        .find(|value| {
            value
                .get(..6)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("digest"))
        })
        .map(str::to_owned)
}

fn transport(err: reqwest::Error) -> DeviceError {
    DeviceError::Transport(Box::new(err))
}

impl ShutterDevice for HttpShutterDevice {
    fn send(
        &self,
        direction: Direction,
    ) -> impl Future<Output = Result<String, DeviceError>> + Send {
        self.send_command(direction)
    }
}
