//! HTTP client for the transfer gateway.
//!
//! The gateway owns the actual file-transfer protocol; this module only
//! consumes its JSON API. All calls are scoped to a server-issued session id.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, Result};

/// Credentials for establishing a gateway session.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "directory")]
    Directory,
}

/// One file or directory item within a listing, as the gateway reports it.
#[derive(Clone, Debug, Deserialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub modified: Option<String>,
}

impl DirEntry {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A completed listing response. The gateway resolves the absolute path;
/// the client never computes path arithmetic itself.
#[derive(Clone, Debug)]
pub struct Listing {
    pub entries: Vec<DirEntry>,
    pub resolved_path: String,
}

/// The gateway API consumed by the controller.
///
/// Kept behind a trait so the controller can be exercised against an
/// in-memory implementation in tests.
#[async_trait]
pub trait TransferBackend: Send + Sync {
    /// Establish a session; returns the server-issued session id.
    async fn connect(&self, creds: &Credentials) -> Result<String>;

    /// Best-effort session teardown. Callers ignore the result.
    async fn disconnect(&self, session_id: &str) -> Result<()>;

    async fn list(&self, session_id: &str, path: Option<&str>) -> Result<Listing>;

    /// `target` is a child directory name or the literal `".."` token.
    async fn change_directory(&self, session_id: &str, target: &str) -> Result<String>;

    async fn upload(&self, session_id: &str, filename: &str, payload: Vec<u8>) -> Result<String>;

    async fn download(&self, session_id: &str, filename: &str) -> Result<Bytes>;

    async fn delete(&self, session_id: &str, filename: &str) -> Result<String>;

    async fn rename(&self, session_id: &str, old_name: &str, new_name: &str) -> Result<String>;

    async fn create_directory(&self, session_id: &str, name: &str) -> Result<String>;
}

// Wire types. The gateway encodes application failures two ways: most
// endpoints answer non-2xx with `{detail}`, while change-directory and
// disconnect answer 200 with `status: "error"` in the regular body.

#[derive(Debug, Deserialize)]
struct ConnectResponse {
    session_id: String,
    #[allow(dead_code)]
    status: String,
    #[allow(dead_code)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    files: Vec<DirEntry>,
    current_path: String,
    #[allow(dead_code)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    status: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

impl OperationResponse {
    fn into_message(self) -> Result<String> {
        if self.status == "error" {
            Err(AppError::Gateway(self.message))
        } else {
            Ok(self.message)
        }
    }
}

/// Reqwest-backed implementation of [`TransferBackend`].
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base: Url,
}

impl GatewayClient {
    /// Create a client rooted at `<base_url>/api`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| AppError::ConfigError(format!("invalid gateway URL: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(AppError::ConfigError(format!(
                "invalid gateway URL: {base_url}"
            )));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot fail: `new` rejects cannot-be-a-base URLs
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(["api", "ftp"]);
            path.extend(segments);
        }
        url
    }

    /// Translate a non-2xx response into the server's error detail.
    async fn decode_failure(resp: reqwest::Response) -> AppError {
        let status = resp.status();
        match resp.text().await {
            Ok(text) => match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => {
                    let detail = body
                        .detail
                        .or(body.message)
                        .unwrap_or_else(|| format!("gateway returned {status}"));
                    AppError::Gateway(detail)
                }
                Err(_) => AppError::Gateway(format!("gateway returned {status}")),
            },
            Err(e) => AppError::Http(e),
        }
    }

    async fn operation(&self, url: Url, form: &[(&str, &str)]) -> Result<String> {
        debug!("POST {}", url);
        let resp = self.http.post(url).form(form).send().await?;
        if !resp.status().is_success() {
            return Err(Self::decode_failure(resp).await);
        }
        resp.json::<OperationResponse>().await?.into_message()
    }
}

#[async_trait]
impl TransferBackend for GatewayClient {
    async fn connect(&self, creds: &Credentials) -> Result<String> {
        let url = self.endpoint(&["connect"]);
        debug!("POST {} host={} port={}", url, creds.host, creds.port);
        let body = serde_json::json!({
            "host": creds.host,
            "port": creds.port,
            "username": creds.username,
            "password": creds.password,
        });
        let resp = self.http.post(url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(Self::decode_failure(resp).await);
        }
        let body: ConnectResponse = resp.json().await?;
        Ok(body.session_id)
    }

    async fn disconnect(&self, session_id: &str) -> Result<()> {
        let url = self.endpoint(&["disconnect", session_id]);
        debug!("POST {}", url);
        let _ = self.http.post(url).send().await?;
        Ok(())
    }

    async fn list(&self, session_id: &str, path: Option<&str>) -> Result<Listing> {
        let mut url = self.endpoint(&["list", session_id]);
        if let Some(path) = path {
            url.query_pairs_mut().append_pair("path", path);
        }
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(Self::decode_failure(resp).await);
        }
        let list: ListResponse = resp.json().await?;
        Ok(Listing {
            entries: list.files,
            resolved_path: list.current_path,
        })
    }

    async fn change_directory(&self, session_id: &str, target: &str) -> Result<String> {
        let url = self.endpoint(&["change-directory", session_id]);
        self.operation(url, &[("path", target)]).await
    }

    async fn upload(&self, session_id: &str, filename: &str, payload: Vec<u8>) -> Result<String> {
        let url = self.endpoint(&["upload", session_id]);
        debug!("POST {} filename={} bytes={}", url, filename, payload.len());
        let part = reqwest::multipart::Part::bytes(payload).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self.http.post(url).multipart(form).send().await?;
        if !resp.status().is_success() {
            return Err(Self::decode_failure(resp).await);
        }
        resp.json::<OperationResponse>().await?.into_message()
    }

    async fn download(&self, session_id: &str, filename: &str) -> Result<Bytes> {
        let url = self.endpoint(&["download", session_id, filename]);
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(Self::decode_failure(resp).await);
        }
        Ok(resp.bytes().await?)
    }

    async fn delete(&self, session_id: &str, filename: &str) -> Result<String> {
        let url = self.endpoint(&["delete", session_id]);
        self.operation(url, &[("filename", filename)]).await
    }

    async fn rename(&self, session_id: &str, old_name: &str, new_name: &str) -> Result<String> {
        let url = self.endpoint(&["rename", session_id]);
        self.operation(url, &[("old_name", old_name), ("new_name", new_name)])
            .await
    }

    async fn create_directory(&self, session_id: &str, name: &str) -> Result<String> {
        let url = self.endpoint(&["create-directory", session_id]);
        self.operation(url, &[("name", name)]).await
    }
}
