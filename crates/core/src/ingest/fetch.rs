use crate::config::Settings;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    fn fetcher_name(&self) -> &'static str;

    /// `target` is an API path for remote fetchers and a page-relative path for local ones.
    /// `Err` means the request never produced a status.
    async fn fetch(&self, target: &str) -> Result<FetchResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build remote api http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn from_settings(settings: &Settings, base_url: impl Into<String>) -> Result<Self> {
        Self::new(base_url, Duration::from_secs(settings.http_timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    fn fetcher_name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, target: &str) -> Result<FetchResponse> {
        let url = self.url(target);
        let resp = self
            .http
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read body from {url}"))?;

        Ok(FetchResponse { status, body })
    }
}

#[derive(Debug, Clone)]
pub struct FileFetcher {
    page_root: PathBuf,
}

impl FileFetcher {
    pub fn new(page_root: impl Into<PathBuf>) -> Self {
        Self {
            page_root: page_root.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.page_root())
    }
}

#[async_trait::async_trait]
impl Fetcher for FileFetcher {
    fn fetcher_name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self, target: &str) -> Result<FetchResponse> {
        let path = self.page_root.join(target);
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(FetchResponse { status: 200, body }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                body: String::new(),
            }),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    pub struct StaticFetcher {
        responses: HashMap<String, FetchResponse>,
        pub attempts: Arc<Mutex<Vec<String>>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, target: &str, status: u16, body: serde_json::Value) -> Self {
            self.responses.insert(
                target.to_string(),
                FetchResponse {
                    status,
                    body: body.to_string(),
                },
            );
            self
        }

        pub fn with_raw(mut self, target: &str, status: u16, body: &str) -> Self {
            self.responses.insert(
                target.to_string(),
                FetchResponse {
                    status,
                    body: body.to_string(),
                },
            );
            self
        }

        pub fn attempted(&self) -> Vec<String> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Fetcher for StaticFetcher {
        fn fetcher_name(&self) -> &'static str {
            "static"
        }

        async fn fetch(&self, target: &str) -> Result<FetchResponse> {
            self.attempts.lock().unwrap().push(target.to_string());
            match self.responses.get(target) {
                Some(resp) => Ok(resp.clone()),
                None => anyhow::bail!("connection refused: {target}"),
            }
        }
    }
}
