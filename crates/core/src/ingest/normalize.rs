use crate::domain::contract::{RawAnalysis, RawEtfData, RawEtfStrategy, RawNewsFeed};
use crate::domain::record::{Analysis, CanonicalRecord};
use crate::ingest::profile::{DashboardProfile, ProfileKind};
use anyhow::{ensure, Context, Result};
use chrono::FixedOffset;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

pub type Payloads = BTreeMap<&'static str, Value>;

pub fn normalize(
    profile: &DashboardProfile,
    payloads: &Payloads,
    offset: FixedOffset,
) -> Result<CanonicalRecord> {
    match profile.kind {
        ProfileKind::Market | ProfileKind::Tencent => normalize_news(payloads, offset),
        ProfileKind::Etf => normalize_etf(payloads, offset),
    }
}

fn normalize_news(payloads: &Payloads, offset: FixedOffset) -> Result<CanonicalRecord> {
    let feed: RawNewsFeed = decode(payloads, "news")?;
    let feed = feed.validate_and_into_feed(offset)?;

    let analysis_body = payload(payloads, "analysis")?;
    ensure!(
        analysis_body.is_object(),
        "payload analysis: expected an object"
    );
    let analysis: RawAnalysis = decode(payloads, "analysis")?;

    Ok(CanonicalRecord {
        items: feed.items,
        total_count: feed.total_count,
        analysis: Some(analysis.into_analysis()),
        updated_at: feed.updated_at,
    })
}

fn normalize_etf(payloads: &Payloads, offset: FixedOffset) -> Result<CanonicalRecord> {
    let strategy: RawEtfStrategy = decode(payloads, "strategy")?;
    let data: RawEtfData = decode(payloads, "etf_data")?;
    let board = strategy.validate_and_into_board(data, offset)?;

    Ok(CanonicalRecord {
        total_count: Some(board.items.len() as u64),
        items: board.items,
        analysis: Some(Analysis {
            signal_summary: Some(board.summary),
            ai_analysis: board.ai_analysis,
            ..Analysis::default()
        }),
        updated_at: board.updated_at,
    })
}

fn payload<'a>(payloads: &'a Payloads, key: &str) -> Result<&'a Value> {
    payloads
        .get(key)
        .with_context(|| format!("payload {key} is missing"))
}

fn decode<T: DeserializeOwned>(payloads: &Payloads, key: &str) -> Result<T> {
    let body = payload(payloads, key)?;
    serde_json::from_value(body.clone()).with_context(|| format!("payload {key} has an unexpected shape"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cst() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    #[test]
    fn news_profile_requires_news_collection() {
        let mut payloads = Payloads::new();
        payloads.insert("news", json!({"items": []}));
        payloads.insert("analysis", json!({}));
        let err = normalize(&DashboardProfile::market(), &payloads, cst()).unwrap_err();
        assert!(format!("{err:#}").contains("payload news"));
    }

    #[test]
    fn news_profile_builds_record() {
        let mut payloads = Payloads::new();
        payloads.insert(
            "news",
            json!({"news": [{"id": 1, "title": "a", "category": "经济数据"}], "total_count": 30, "updated_at": "2025-10-23T10:00:00"}),
        );
        payloads.insert("analysis", json!({"temperature_score": 61.2, "sentiment": "乐观"}));

        let record = normalize(&DashboardProfile::market(), &payloads, cst()).unwrap();
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.news_total(), 30);
        assert!(record.updated_at.is_some());
        assert_eq!(record.analysis.unwrap().temperature_score, Some(61.2));
    }

    #[test]
    fn analysis_must_be_an_object() {
        let mut payloads = Payloads::new();
        payloads.insert("news", json!({"news": []}));
        payloads.insert("analysis", json!([]));
        assert!(normalize(&DashboardProfile::tencent(), &payloads, cst()).is_err());
    }

    #[test]
    fn etf_profile_requires_both_payloads() {
        let mut payloads = Payloads::new();
        payloads.insert("strategy", json!({"analysis": []}));
        assert!(normalize(&DashboardProfile::etf(), &payloads, cst()).is_err());

        payloads.insert("etf_data", json!({"etfs": []}));
        let record = normalize(&DashboardProfile::etf(), &payloads, cst()).unwrap();
        assert!(record.items.is_empty());
        assert!(record.analysis.unwrap().signal_summary.is_some());
    }
}
