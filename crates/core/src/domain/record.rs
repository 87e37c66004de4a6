use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNCATEGORIZED: &str = "其他";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub items: Vec<Item>,
    pub total_count: Option<u64>,
    pub analysis: Option<Analysis>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CanonicalRecord {
    pub fn news_total(&self) -> u64 {
        self.total_count.unwrap_or(self.items.len() as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{n}"),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub source: String,
    pub category: String,
    pub country: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub asset: Option<AssetQuote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetQuote {
    pub code: String,
    pub price: f64,
    pub change_percent: f64,
    pub sentiment: Option<AssetSentiment>,
    pub signal: Option<TradeSignal>,
    pub indicators: Option<Indicators>,
    pub risks: Vec<RiskNote>,
    pub history: Vec<Candle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSentiment {
    pub score: f64,
    pub label: Option<String>,
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Buy,
    Hold,
    Sell,
}

impl SignalKind {
    pub fn from_action_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "buy" | "strong_buy" => SignalKind::Buy,
            "sell" | "reduce" => SignalKind::Sell,
            _ => SignalKind::Hold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub action: Option<String>,
    pub kind: SignalKind,
    pub confidence: Option<f64>,
    pub buy_signals: u32,
    pub sell_signals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub dif: Option<f64>,
    pub dea: Option<f64>,
    pub ma5: Option<f64>,
    pub ma20: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskNote {
    pub level: String,
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: String,
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub temperature_score: Option<f64>,
    pub sentiment: Option<String>,
    pub sentiment_emoji: Option<String>,
    pub analysis_text: Option<String>,
    pub key_factors: Vec<KeyFactor>,
    pub positive_count: Option<u64>,
    pub negative_count: Option<u64>,
    pub neutral_count: Option<u64>,
    pub advice: Option<InvestmentAdvice>,
    pub category_distribution: Vec<CategoryCount>,
    pub signal_summary: Option<SignalSummary>,
    pub ai_analysis: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFactor {
    pub text: String,
    pub polarity: Polarity,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestmentAdvice {
    pub overall_rating: Option<String>,
    pub risk_level: Option<String>,
    pub recommendation: Option<String>,
    pub detailed_analysis: Option<String>,
    pub key_opportunities: Vec<String>,
    pub key_risks: Vec<String>,
    pub action_items: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub buy_count: u64,
    pub hold_count: u64,
    pub sell_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Derived category aggregate: counts per category, descending by count.
/// Ties keep the order in which a category first appears.
pub fn category_aggregate(items: &[Item]) -> Vec<CategoryCount> {
    let mut out: Vec<CategoryCount> = Vec::new();
    for item in items {
        let label = if item.category.trim().is_empty() {
            UNCATEGORIZED
        } else {
            item.category.as_str()
        };
        match out.iter_mut().find(|c| c.category == label) {
            Some(existing) => existing.count += 1,
            None => out.push(CategoryCount {
                category: label.to_string(),
                count: 1,
            }),
        }
    }
    // Stable sort keeps first-appearance order among equal counts.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn news_item(id: i64, category: &str) -> Item {
        Item {
            id: ItemId::Number(id),
            title: format!("title {id}"),
            description: None,
            url: None,
            image_url: None,
            source: "Reuters".to_string(),
            category: category.to_string(),
            country: None,
            published_at: None,
            asset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::news_item;
    use super::*;

    #[test]
    fn aggregate_sorts_by_count_then_first_appearance() {
        let items = vec![
            news_item(1, "货币政策"),
            news_item(2, "经济数据"),
            news_item(3, "股市动态"),
            news_item(4, "经济数据"),
            news_item(5, ""),
        ];
        let agg = category_aggregate(&items);
        let labels: Vec<_> = agg.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(labels, vec!["经济数据", "货币政策", "股市动态", "其他"]);
        assert_eq!(agg[0].count, 2);
    }

    #[test]
    fn news_total_prefers_advertised_count() {
        let mut record = CanonicalRecord {
            items: vec![news_item(1, "a")],
            ..Default::default()
        };
        assert_eq!(record.news_total(), 1);
        record.total_count = Some(42);
        assert_eq!(record.news_total(), 42);
    }

    #[test]
    fn action_codes_map_to_buckets() {
        assert_eq!(SignalKind::from_action_code("strong_buy"), SignalKind::Buy);
        assert_eq!(SignalKind::from_action_code("REDUCE"), SignalKind::Sell);
        assert_eq!(SignalKind::from_action_code("hold"), SignalKind::Hold);
        assert_eq!(SignalKind::from_action_code(""), SignalKind::Hold);
    }

    #[test]
    fn item_ids_accept_numbers_and_text() {
        let n: ItemId = serde_json::from_str("7").unwrap();
        let t: ItemId = serde_json::from_str("\"159770\"").unwrap();
        assert_eq!(n, ItemId::Number(7));
        assert_eq!(t.to_string(), "159770");
    }
}
