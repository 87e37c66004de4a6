use crate::ingest::source::SourceKind;
use anyhow::Context;
use reqwest::Url;
use serde::Serialize;

const LOOPBACK_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "::1", "[::1]"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContext {
    pub scheme: String,
    pub hostname: String,
}

impl PageContext {
    pub fn new(scheme: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            hostname: hostname.into().to_ascii_lowercase(),
        }
    }

    pub fn from_url(url: &Url) -> Self {
        Self::new(url.scheme(), url.host_str().unwrap_or_default())
    }

    pub fn parse(page_url: &str) -> anyhow::Result<Self> {
        let url = Url::parse(page_url).with_context(|| format!("invalid page url: {page_url}"))?;
        Ok(Self::from_url(&url))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvironmentProfile {
    pub prefer_local: bool,
    pub prefer_remote_api: bool,
}

pub fn classify(ctx: &PageContext, static_hosts: &[String]) -> EnvironmentProfile {
    let prefer_local = ctx.scheme == "file" || LOOPBACK_HOSTS.contains(&ctx.hostname.as_str());

    let prefer_remote_api = !prefer_local
        && static_hosts
            .iter()
            .any(|suffix| host_matches_suffix(&ctx.hostname, suffix));

    EnvironmentProfile {
        prefer_local,
        prefer_remote_api,
    }
}

fn host_matches_suffix(host: &str, suffix: &str) -> bool {
    let suffix = suffix.trim().trim_start_matches('.');
    if suffix.is_empty() {
        return false;
    }
    host == suffix || host.ends_with(&format!(".{suffix}"))
}

impl EnvironmentProfile {
    pub fn tier_plan(&self, demo_available: bool) -> Vec<SourceKind> {
        let mut plan = if self.prefer_local {
            vec![SourceKind::Local]
        } else if self.prefer_remote_api {
            vec![SourceKind::Remote, SourceKind::Local]
        } else {
            vec![SourceKind::Remote]
        };
        if demo_available {
            plan.push(SourceKind::Demo);
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> Vec<String> {
        vec!["vercel.app".to_string(), "github.io".to_string()]
    }

    #[test]
    fn file_scheme_and_loopback_prefer_local() {
        for url in [
            "file:///home/me/site/docs/index.html",
            "http://localhost:8000/docs/index.html",
            "http://127.0.0.1/docs/",
            "http://[::1]:3000/",
        ] {
            let ctx = PageContext::parse(url).unwrap();
            let env = classify(&ctx, &hosts());
            assert!(env.prefer_local, "{url}");
            assert!(!env.prefer_remote_api, "{url}");
        }
    }

    #[test]
    fn static_hosts_prefer_remote_api() {
        let ctx = PageContext::parse("https://newsboard.vercel.app/").unwrap();
        let env = classify(&ctx, &hosts());
        assert!(!env.prefer_local);
        assert!(env.prefer_remote_api);

        let ctx = PageContext::parse("https://someone.github.io/newsboard/docs/").unwrap();
        assert!(classify(&ctx, &hosts()).prefer_remote_api);
    }

    #[test]
    fn suffix_match_respects_label_boundary() {
        let ctx = PageContext::parse("https://evilvercel.app/").unwrap();
        let env = classify(&ctx, &hosts());
        assert!(!env.prefer_local);
        assert!(!env.prefer_remote_api);
    }

    #[test]
    fn local_plan_never_starts_with_remote() {
        let env = EnvironmentProfile {
            prefer_local: true,
            prefer_remote_api: false,
        };
        assert_eq!(env.tier_plan(true), vec![SourceKind::Local, SourceKind::Demo]);
        assert!(!env.tier_plan(false).contains(&SourceKind::Remote));
    }

    #[test]
    fn remote_plans_fall_through_in_priority_order() {
        let hosted = EnvironmentProfile {
            prefer_local: false,
            prefer_remote_api: true,
        };
        assert_eq!(
            hosted.tier_plan(true),
            vec![SourceKind::Remote, SourceKind::Local, SourceKind::Demo]
        );

        let unknown = EnvironmentProfile {
            prefer_local: false,
            prefer_remote_api: false,
        };
        assert_eq!(unknown.tier_plan(false), vec![SourceKind::Remote]);
    }
}
