//! Container runtime metadata from the Docker Engine API.
//!
//! The collected document has three keys:
//!
//! - `version`: the daemon's `/version` response.
//! - `images`: the `/images/json` listing.
//! - `containers`: the running containers from `/containers/json`, each with its
//!   `image` replaced by the full image inspection and a `last_log` timestamp.
//!
//! All object keys are lowercased recursively.
mod client;
mod error;
mod logs;

pub use client::Client;
pub use error::{Error, Result};
pub use logs::{demultiplex, last_log_timestamp};

use serde_json::{Map, Value, json};

use crate::error::ResultOkLogExt;

/// Collects the container runtime document.
///
/// Failing to enrich a single container is logged and leaves that container as listed.
///
/// # Errors
///
/// Returns an error if the version, image or container listing cannot be fetched.
pub async fn collect(client: &Client) -> Result<Value> {
    let version = client.version().await?;
    let images = client.images().await?;
    let mut containers = client.containers().await?;
    log::debug!("Found {} running containers", containers.len());

    for container in &mut containers {
        let Some(id) = container.get("Id").and_then(Value::as_str).map(str::to_owned) else {
            continue;
        };
        enrich_container(client, &id, container)
            .await
            .ok_warn(&format!("Failed to inspect container `{id}`"));
    }

    Ok(lowercase_keys(json!({
        "version": version,
        "images": images,
        "containers": containers,
    })))
}

/// Replaces the container's `Image` with the image details and adds `last_log`.
async fn enrich_container(client: &Client, id: &str, container: &mut Value) -> Result<()> {
    let details = client.inspect_container(id).await?;
    let image_id = details
        .get("Image")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::MissingField {
            uri: client.container_uri(id),
            field: "Image",
        })?;
    let image = client.inspect_image(image_id).await?;
    let last_log = client.last_log(id).await?;

    if let Some(fields) = container.as_object_mut() {
        fields.insert("Image".to_owned(), image);
        fields.insert("last_log".to_owned(), Value::String(last_log));
    }
    Ok(())
}

/// Lowercases every object key in `value`, recursing into objects and arrays.
pub fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key.to_lowercase(), lowercase_keys(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::client::testing::{Routes, serve};
    use super::*;
    use crate::config::DockerConfig;

    #[test]
    fn test_lowercase_keys() {
        let value = json!({
            "Id": "abc",
            "Labels": {"Com.Example": "Value"},
            "Ports": [{"PrivatePort": 80}],
        });
        assert_eq!(
            lowercase_keys(value),
            json!({
                "id": "abc",
                "labels": {"com.example": "Value"},
                "ports": [{"privateport": 80}],
            })
        );
    }

    fn route(routes: &mut Routes, target: &str, body: Vec<u8>) {
        routes.insert(format!("/v1.41{target}"), (200, body));
    }

    #[tokio::test]
    async fn test_collect() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("docker.sock");
        let mut routes = Routes::new();
        route(&mut routes, "/version", br#"{"Version":"27.3.1"}"#.to_vec());
        route(
            &mut routes,
            "/images/json",
            br#"[{"Id":"sha256:123","RepoTags":["nginx:latest"]}]"#.to_vec(),
        );
        route(
            &mut routes,
            "/containers/json",
            br#"[{"Id":"abc","Names":["/web"],"Image":"nginx"},{"Id":"gone","Names":["/old"]}]"#
                .to_vec(),
        );
        route(
            &mut routes,
            "/containers/abc/json",
            br#"{"Id":"abc","Image":"sha256:123"}"#.to_vec(),
        );
        route(
            &mut routes,
            "/images/sha256:123/json",
            br#"{"Id":"sha256:123","RepoTags":["nginx:latest"],"Size":1024}"#.to_vec(),
        );
        route(
            &mut routes,
            "/containers/abc/logs?stdout=1&stderr=1&tail=1&timestamps=1",
            logs::frame(1, b"2024-05-01T10:00:00.000000000Z started\n"),
        );
        let _server = serve(&socket, routes);

        let client = Client::new(&DockerConfig {
            socket,
            api_version: "1.41".to_owned(),
            timeout: Duration::from_secs(5),
        });
        let data = collect(&client).await.unwrap();

        assert_eq!(data["version"]["version"], "27.3.1");
        assert_eq!(data["images"][0]["repotags"][0], "nginx:latest");

        let web = &data["containers"][0];
        assert_eq!(web["names"][0], "/web");
        assert_eq!(web["image"]["size"], 1024);
        assert_eq!(web["last_log"], "2024-05-01T10:00:00.000000000Z");

        // Inspection of `gone` fails with 404; it is kept as listed.
        let gone = &data["containers"][1];
        assert_eq!(gone["id"], "gone");
        assert!(gone.get("last_log").is_none());
    }
}
