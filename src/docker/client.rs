use std::path::PathBuf;
use std::time::Duration;

use http_body_util::{BodyExt, Empty};
use hyper::Request;
use hyper::body::Bytes;
use hyper_util::rt::TokioIo;
use serde_json::Value;

use super::logs;
use super::{Error, Result};
use crate::config::DockerConfig;

/// A minimal Docker Engine API client speaking HTTP/1.1 over a unix socket.
///
/// Every request opens its own connection; no authentication is performed.
#[derive(Debug, Clone)]
pub struct Client {
    socket: PathBuf,
    api_version: String,
    timeout: Duration,
}

impl Client {
    pub fn new(config: &DockerConfig) -> Self {
        Self {
            socket: config.socket.clone(),
            api_version: config.api_version.clone(),
            timeout: config.timeout,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("/v{}{}", self.api_version, path)
    }

    /// Sends a `GET` request and returns the body of a successful response.
    async fn get(&self, path: &str) -> Result<Bytes> {
        let uri = self.endpoint(path);
        log::trace!("GET {uri}");
        match tokio::time::timeout(self.timeout, self.send(&uri)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                uri,
                timeout: self.timeout,
            }),
        }
    }

    async fn send(&self, uri: &str) -> Result<Bytes> {
        let stream = tokio::net::UnixStream::connect(&self.socket)
            .await
            .map_err(|source| Error::Connect {
                path: self.socket.clone(),
                source,
            })?;
        let http_error = |source| Error::Http {
            uri: uri.to_owned(),
            source,
        };

        let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(http_error)?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                log::debug!("Docker connection closed with error: {err}");
            }
        });

        let request = Request::get(uri)
            .header(hyper::header::HOST, "docker")
            .body(Empty::<Bytes>::new())
            .map_err(|source| Error::Request {
                uri: uri.to_owned(),
                source,
            })?;
        let response = sender.send_request(request).await.map_err(http_error)?;
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(http_error)?
            .to_bytes();

        if !status.is_success() {
            return Err(Error::Status {
                uri: uri.to_owned(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).trim().to_owned(),
            });
        }
        Ok(body)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get(path).await?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            uri: self.endpoint(path),
            source,
        })
    }

    /// `GET /version`
    pub async fn version(&self) -> Result<Value> {
        self.get_json("/version").await
    }

    /// `GET /images/json`
    pub async fn images(&self) -> Result<Value> {
        self.get_json("/images/json").await
    }

    /// `GET /containers/json`, running containers only.
    pub async fn containers(&self) -> Result<Vec<Value>> {
        self.get_json("/containers/json").await
    }

    /// `GET /containers/{id}/json`
    pub async fn inspect_container(&self, id: &str) -> Result<Value> {
        self.get_json(&format!("/containers/{id}/json")).await
    }

    /// `GET /images/{id}/json`
    pub async fn inspect_image(&self, id: &str) -> Result<Value> {
        self.get_json(&format!("/images/{id}/json")).await
    }

    /// Returns the timestamp of the container's most recent log line.
    pub async fn last_log(&self, id: &str) -> Result<String> {
        let raw = self
            .get(&format!(
                "/containers/{id}/logs?stdout=1&stderr=1&tail=1&timestamps=1"
            ))
            .await?;
        Ok(logs::last_log_timestamp(&raw))
    }

    pub(super) fn container_uri(&self, id: &str) -> String {
        self.endpoint(&format!("/containers/{id}/json"))
    }
}
