use crate::domain::contract::{reports_failure, ApiEnvelope};
use crate::domain::record::CanonicalRecord;
use crate::environment::EnvironmentProfile;
use crate::ingest::demo::demo_payloads;
use crate::ingest::error::SourceRejection;
use crate::ingest::fetch::{FetchResponse, Fetcher};
use crate::ingest::normalize::{normalize, Payloads};
use crate::ingest::profile::{DashboardProfile, SubResource};
use crate::ingest::source::{Locator, PathSet, SourceDescriptor, SourceKind};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionOutcome {
    pub source_used: Option<SourceDescriptor>,
    pub record: Option<CanonicalRecord>,
    pub degraded: bool,
    pub rejections: Vec<SourceRejection>,
}

impl ResolutionOutcome {
    pub fn is_exhausted(&self) -> bool {
        self.record.is_none()
    }
}

pub struct SourceResolver {
    profile: DashboardProfile,
    environment: EnvironmentProfile,
    remote: Arc<dyn Fetcher>,
    remote_base: String,
    local: Arc<dyn Fetcher>,
    candidates: Vec<PathSet>,
    offset: FixedOffset,
}

impl SourceResolver {
    pub fn new(
        profile: DashboardProfile,
        environment: EnvironmentProfile,
        remote: Arc<dyn Fetcher>,
        remote_base: impl Into<String>,
        local: Arc<dyn Fetcher>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            profile,
            environment,
            remote,
            remote_base: remote_base.into(),
            local,
            candidates: PathSet::default_candidates(),
            offset,
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<PathSet>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn profile(&self) -> &DashboardProfile {
        &self.profile
    }

    pub fn environment(&self) -> EnvironmentProfile {
        self.environment
    }

    pub fn plan(&self) -> Vec<SourceDescriptor> {
        self.environment
            .tier_plan(self.profile.has_demo)
            .into_iter()
            .enumerate()
            .map(|(idx, kind)| SourceDescriptor {
                kind,
                priority: idx as u8,
                locator: match kind {
                    SourceKind::Remote => Locator::Remote {
                        base_url: self.remote_base.clone(),
                    },
                    SourceKind::Local => Locator::Local {
                        candidates: self.candidates.clone(),
                    },
                    SourceKind::Demo => Locator::Demo,
                },
            })
            .collect()
    }

    pub async fn resolve(&self, now: DateTime<Utc>) -> ResolutionOutcome {
        let mut rejections = Vec::new();
        let plan = self.plan();
        tracing::debug!(
            profile = ?self.profile.kind,
            tiers = plan.len(),
            remote = self.remote.fetcher_name(),
            local = self.local.fetcher_name(),
            "resolving data source"
        );

        for descriptor in plan {
            let record = match descriptor.kind {
                SourceKind::Remote => self.try_remote(&mut rejections).await,
                SourceKind::Local => self.try_local(&mut rejections).await,
                SourceKind::Demo => self.try_demo(now, &mut rejections),
            };

            if let Some(record) = record {
                let degraded = descriptor.kind == SourceKind::Demo;
                tracing::info!(
                    tier = descriptor.kind.as_str(),
                    locator = %descriptor.locator,
                    items = record.items.len(),
                    degraded,
                    "data source resolved"
                );
                return ResolutionOutcome {
                    source_used: Some(descriptor),
                    record: Some(record),
                    degraded,
                    rejections,
                };
            }
        }

        tracing::error!(
            profile = ?self.profile.kind,
            rejections = rejections.len(),
            "all data sources exhausted"
        );
        ResolutionOutcome {
            source_used: None,
            record: None,
            degraded: false,
            rejections,
        }
    }

    async fn try_remote(&self, rejections: &mut Vec<SourceRejection>) -> Option<CanonicalRecord> {
        let requests = self
            .profile
            .resources
            .iter()
            .map(|res| self.fetch_remote(res));
        let results = futures::future::join_all(requests).await;

        let mut payloads = Payloads::new();
        let mut failed = false;
        for result in results {
            match result {
                Ok((key, value)) => {
                    payloads.insert(key, value);
                }
                Err(rejection) => {
                    tracing::warn!(
                        tier = "remote",
                        locator = %rejection.locator,
                        error = %rejection.detail,
                        "remote sub-resource rejected"
                    );
                    rejections.push(rejection);
                    failed = true;
                }
            }
        }
        if failed {
            return None;
        }

        match normalize(&self.profile, &payloads, self.offset) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(tier = "remote", error = %format!("{e:#}"), "remote payload rejected");
                rejections.push(SourceRejection::validation(
                    SourceKind::Remote,
                    self.remote_base.clone(),
                    format!("{e:#}"),
                ));
                None
            }
        }
    }

    async fn fetch_remote(
        &self,
        res: &SubResource,
    ) -> Result<(&'static str, Value), SourceRejection> {
        let locator = crate::ingest::fetch::join_url(&self.remote_base, res.api_path);
        let resp = self
            .remote
            .fetch(res.api_path)
            .await
            .map_err(|e| SourceRejection::transport(SourceKind::Remote, &locator, format!("{e:#}")))?;

        let body = parse_success_body(SourceKind::Remote, &locator, resp)?;
        let envelope: ApiEnvelope = serde_json::from_value(body).map_err(|e| {
            SourceRejection::validation(SourceKind::Remote, &locator, format!("not an api envelope: {e}"))
        })?;
        let data = envelope
            .validate_and_into_payload()
            .map_err(|e| SourceRejection::validation(SourceKind::Remote, &locator, format!("{e:#}")))?;

        Ok((res.key, data))
    }

    async fn try_local(&self, rejections: &mut Vec<SourceRejection>) -> Option<CanonicalRecord> {
        'candidates: for candidate in &self.candidates {
            let mut payloads = Payloads::new();

            for res in &self.profile.resources {
                match self.fetch_local(candidate, res).await {
                    Ok(value) => {
                        payloads.insert(res.key, value);
                    }
                    Err(rejection) => {
                        tracing::debug!(
                            tier = "local",
                            locator = %rejection.locator,
                            error = %rejection.detail,
                            "local candidate rejected"
                        );
                        rejections.push(rejection);
                        continue 'candidates;
                    }
                }
            }

            match normalize(&self.profile, &payloads, self.offset) {
                Ok(record) => return Some(record),
                Err(e) => {
                    tracing::debug!(
                        tier = "local",
                        locator = %candidate.prefix,
                        error = %format!("{e:#}"),
                        "local candidate payload rejected"
                    );
                    rejections.push(SourceRejection::validation(
                        SourceKind::Local,
                        candidate.prefix.clone(),
                        format!("{e:#}"),
                    ));
                }
            }
        }
        None
    }

    async fn fetch_local(&self, candidate: &PathSet, res: &SubResource) -> Result<Value, SourceRejection> {
        let path = candidate.file(res.file_name);
        let resp = self
            .local
            .fetch(&path)
            .await
            .map_err(|e| SourceRejection::transport(SourceKind::Local, &path, format!("{e:#}")))?;

        let body = parse_success_body(SourceKind::Local, &path, resp)?;
        if reports_failure(&body) {
            return Err(SourceRejection::validation(
                SourceKind::Local,
                path,
                "file reports success=false",
            ));
        }
        Ok(body)
    }

    fn try_demo(&self, now: DateTime<Utc>, rejections: &mut Vec<SourceRejection>) -> Option<CanonicalRecord> {
        let Some(payloads) = demo_payloads(self.profile.kind, now) else {
            rejections.push(SourceRejection::validation(
                SourceKind::Demo,
                Locator::Demo.to_string(),
                "profile has no demo dataset",
            ));
            return None;
        };

        match normalize(&self.profile, &payloads, self.offset) {
            Ok(record) => Some(record),
            Err(e) => {
                rejections.push(SourceRejection::validation(
                    SourceKind::Demo,
                    Locator::Demo.to_string(),
                    format!("{e:#}"),
                ));
                None
            }
        }
    }
}

fn parse_success_body(
    kind: SourceKind,
    locator: &str,
    resp: FetchResponse,
) -> Result<Value, SourceRejection> {
    if !resp.is_success() {
        return Err(SourceRejection::transport(
            kind,
            locator,
            format!("status {}", resp.status),
        ));
    }
    serde_json::from_str(&resp.body)
        .map_err(|e| SourceRejection::validation(kind, locator, format!("invalid json: {e}")))
}
