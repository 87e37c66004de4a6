use anyhow::bail;
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Market,
    Tencent,
    Etf,
}

impl FromStr for ProfileKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "market" | "news" => Ok(ProfileKind::Market),
            "tencent" => Ok(ProfileKind::Tencent),
            "etf" => Ok(ProfileKind::Etf),
            other => bail!("unknown dashboard profile: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubResource {
    pub key: &'static str,
    pub api_path: &'static str,
    pub file_name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardProfile {
    pub kind: ProfileKind,
    pub resources: Vec<SubResource>,
    pub list_limit: Option<usize>,
    pub notify_delay: Duration,
    pub has_demo: bool,
}

impl DashboardProfile {
    pub fn for_kind(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Market => Self::market(),
            ProfileKind::Tencent => Self::tencent(),
            ProfileKind::Etf => Self::etf(),
        }
    }

    pub fn market() -> Self {
        Self {
            kind: ProfileKind::Market,
            resources: vec![
                // the API trims to 20 unless asked; totals and chips need the full list
                SubResource {
                    key: "news",
                    api_path: "news/latest?limit=1000",
                    file_name: "news.json",
                },
                SubResource {
                    key: "analysis",
                    api_path: "temperature/latest",
                    file_name: "analysis.json",
                },
            ],
            list_limit: Some(20),
            notify_delay: Duration::from_millis(3000),
            has_demo: false,
        }
    }

    pub fn tencent() -> Self {
        Self {
            kind: ProfileKind::Tencent,
            resources: vec![
                SubResource {
                    key: "news",
                    api_path: "tencent/news",
                    file_name: "tencent_news.json",
                },
                SubResource {
                    key: "analysis",
                    api_path: "tencent/analysis",
                    file_name: "tencent_analysis.json",
                },
            ],
            list_limit: None,
            notify_delay: Duration::from_millis(5000),
            has_demo: true,
        }
    }

    pub fn etf() -> Self {
        Self {
            kind: ProfileKind::Etf,
            resources: vec![
                SubResource {
                    key: "strategy",
                    api_path: "etf/strategy",
                    file_name: "etf_strategy.json",
                },
                SubResource {
                    key: "etf_data",
                    api_path: "etf/data",
                    file_name: "etf_data.json",
                },
            ],
            list_limit: None,
            notify_delay: Duration::from_millis(3000),
            has_demo: false,
        }
    }

    pub fn without_demo(mut self) -> Self {
        self.has_demo = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profile_names() {
        assert_eq!("Tencent".parse::<ProfileKind>().unwrap(), ProfileKind::Tencent);
        assert_eq!(" etf ".parse::<ProfileKind>().unwrap(), ProfileKind::Etf);
        assert!("crypto".parse::<ProfileKind>().is_err());
    }

    #[test]
    fn only_tencent_carries_demo_data() {
        assert!(DashboardProfile::tencent().has_demo);
        assert!(!DashboardProfile::market().has_demo);
        assert!(!DashboardProfile::tencent().without_demo().has_demo);
    }
}
