use crate::domain::record::{
    Analysis, AssetQuote, AssetSentiment, Candle, CategoryCount, Indicators, InvestmentAdvice,
    Item, ItemId, KeyFactor, Polarity, RiskNote, SignalKind, SignalSummary, TradeSignal,
};
use crate::time::display::parse_timestamp;
use anyhow::{bail, ensure};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const UNTITLED: &str = "无标题";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub updated_at: Option<Value>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl ApiEnvelope {
    /// List endpoints answer with a bare array and carry `updated_at` / `count`
    /// on the envelope; those are folded back into the news-file shape.
    pub fn validate_and_into_payload(self) -> anyhow::Result<Value> {
        if !self.success {
            bail!(
                "response reports success=false: {}",
                self.error.as_deref().unwrap_or("no error message")
            );
        }
        let Some(data) = self.data else {
            bail!("response reports success but carries no data");
        };
        ensure!(!data.is_null(), "response data is null");

        if data.is_array() {
            return Ok(serde_json::json!({
                "news": data,
                "updated_at": self.updated_at,
                "total_count": self.count,
            }));
        }
        Ok(data)
    }
}

pub fn reports_failure(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool) == Some(false)
}

// ---------------------------------------------------------------------------
// News feed (`news.json`, `tencent_news.json`, `/news/latest`, `/tencent/news`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawNewsFeed {
    pub news: Vec<RawNewsItem>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNewsItem {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

pub struct NewsFeed {
    pub items: Vec<Item>,
    pub total_count: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RawNewsFeed {
    pub fn validate_and_into_feed(self, offset: FixedOffset) -> anyhow::Result<NewsFeed> {
        let items = self
            .news
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| raw.into_item(idx, offset))
            .collect();

        Ok(NewsFeed {
            items,
            total_count: self.total_count,
            updated_at: self
                .updated_at
                .as_deref()
                .and_then(|s| parse_timestamp(s, offset)),
        })
    }
}

impl RawNewsItem {
    fn into_item(self, idx: usize, offset: FixedOffset) -> Item {
        let title = non_blank(self.title).unwrap_or_else(|| {
            tracing::debug!(item = idx + 1, "news item has no title");
            UNTITLED.to_string()
        });

        Item {
            id: self.id.unwrap_or(ItemId::Number(idx as i64 + 1)),
            title,
            description: non_blank(self.description),
            url: non_blank(self.url),
            image_url: non_blank(self.image_url),
            source: non_blank(self.source).unwrap_or_default(),
            category: non_blank(self.category).unwrap_or_default(),
            country: non_blank(self.country),
            published_at: self
                .published_at
                .as_deref()
                .and_then(|s| parse_timestamp(s, offset)),
            asset: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis (`analysis.json`, `tencent_analysis.json`, `/temperature/latest`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnalysis {
    #[serde(default)]
    pub temperature_score: Option<f64>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub sentiment_emoji: Option<String>,
    #[serde(default)]
    pub analysis_text: Option<String>,
    #[serde(default)]
    pub key_factors: Vec<RawKeyFactor>,
    #[serde(default)]
    pub positive_count: Option<u64>,
    #[serde(default)]
    pub negative_count: Option<u64>,
    #[serde(default)]
    pub neutral_count: Option<u64>,
    #[serde(default)]
    pub investment_advice: Option<RawAdvice>,
    #[serde(default)]
    pub categories_distribution: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawKeyFactor {
    Text(String),
    Detailed {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        title: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAdvice {
    #[serde(default)]
    pub overall_rating: Option<String>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub detailed_analysis: Option<String>,
    #[serde(default)]
    pub key_opportunities: Vec<String>,
    #[serde(default)]
    pub key_risks: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
}

impl RawAnalysis {
    pub fn into_analysis(self) -> Analysis {
        Analysis {
            temperature_score: self.temperature_score.filter(|v| v.is_finite()),
            sentiment: non_blank(self.sentiment),
            sentiment_emoji: non_blank(self.sentiment_emoji),
            analysis_text: non_blank(self.analysis_text),
            key_factors: self
                .key_factors
                .into_iter()
                .filter_map(RawKeyFactor::into_key_factor)
                .collect(),
            positive_count: self.positive_count,
            negative_count: self.negative_count,
            neutral_count: self.neutral_count,
            advice: self.investment_advice.map(RawAdvice::into_advice),
            category_distribution: distribution(self.categories_distribution),
            signal_summary: None,
            ai_analysis: None,
        }
    }
}

impl RawKeyFactor {
    fn into_key_factor(self) -> Option<KeyFactor> {
        match self {
            RawKeyFactor::Text(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return None;
                }
                let polarity = if text.starts_with('✓') {
                    Polarity::Positive
                } else {
                    Polarity::Negative
                };
                Some(KeyFactor {
                    text,
                    polarity,
                    category: None,
                })
            }
            RawKeyFactor::Detailed {
                kind,
                category,
                title,
            } => {
                let text = non_blank(title)?;
                let polarity = match kind.as_deref().map(str::trim) {
                    Some("positive") => Polarity::Positive,
                    Some("neutral") => Polarity::Neutral,
                    _ => Polarity::Negative,
                };
                Some(KeyFactor {
                    text,
                    polarity,
                    category: non_blank(category),
                })
            }
        }
    }
}

impl RawAdvice {
    fn into_advice(self) -> InvestmentAdvice {
        InvestmentAdvice {
            overall_rating: non_blank(self.overall_rating),
            risk_level: non_blank(self.risk_level),
            recommendation: non_blank(self.recommendation),
            detailed_analysis: non_blank(self.detailed_analysis),
            key_opportunities: clean_lines(self.key_opportunities),
            key_risks: clean_lines(self.key_risks),
            action_items: clean_lines(self.action_items),
        }
    }
}

// stable sort: tied categories keep the order the pipeline wrote them in
fn distribution(map: Map<String, Value>) -> Vec<CategoryCount> {
    let mut out: Vec<CategoryCount> = map
        .into_iter()
        .filter_map(|(category, count)| {
            Some(CategoryCount {
                category,
                count: count.as_u64()?,
            })
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

// ---------------------------------------------------------------------------
// ETF (`etf_strategy.json` + `etf_data.json`, `/etf/strategy` + `/etf/data`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawEtfStrategy {
    #[serde(default)]
    pub updated_at: Option<String>,
    pub analysis: Vec<RawEtfAnalysis>,
    #[serde(default)]
    pub ai_analysis: Option<String>,
    #[serde(default)]
    pub summary: Option<RawSignalSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEtfAnalysis {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sentiment: Option<RawEtfSentiment>,
    #[serde(default)]
    pub signal: Option<RawSignal>,
    #[serde(default)]
    pub risks: Vec<RawRisk>,
    #[serde(default)]
    pub realtime: Option<RawRealtime>,
    #[serde(default)]
    pub indicators: Option<RawIndicators>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEtfSentiment {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSignal {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub action_code: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub buy_signals: Option<u32>,
    #[serde(default)]
    pub sell_signals: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRisk {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRealtime {
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub change_percent: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIndicators {
    #[serde(default)]
    pub rsi: Option<f64>,
    #[serde(default)]
    pub macd: Option<RawMacd>,
    #[serde(default)]
    pub ma5: Option<f64>,
    #[serde(default)]
    pub ma20: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMacd {
    #[serde(default)]
    pub macd: Option<f64>,
    #[serde(default)]
    pub dif: Option<f64>,
    #[serde(default)]
    pub dea: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSignalSummary {
    #[serde(default)]
    pub buy_count: u64,
    #[serde(default)]
    pub hold_count: u64,
    #[serde(default)]
    pub sell_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEtfData {
    pub etfs: Vec<RawEtfSeries>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEtfSeries {
    pub code: String,
    #[serde(default)]
    pub historical: Vec<RawBar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBar {
    #[serde(default)]
    pub date: String,
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
    #[serde(default)]
    pub volume: f64,
}

pub struct EtfBoard {
    pub items: Vec<Item>,
    pub updated_at: Option<DateTime<Utc>>,
    pub summary: SignalSummary,
    pub ai_analysis: Option<String>,
}

impl RawEtfStrategy {
    pub fn validate_and_into_board(
        self,
        data: RawEtfData,
        offset: FixedOffset,
    ) -> anyhow::Result<EtfBoard> {
        let updated_at = self
            .updated_at
            .as_deref()
            .or(data.updated_at.as_deref())
            .and_then(|s| parse_timestamp(s, offset));

        let mut history_by_code: BTreeMap<String, Vec<RawBar>> = data
            .etfs
            .into_iter()
            .map(|e| (e.code.trim().to_string(), e.historical))
            .collect();

        let mut items = Vec::with_capacity(self.analysis.len());
        for entry in self.analysis {
            let code = entry.code.trim().to_string();
            ensure!(!code.is_empty(), "etf analysis entry has an empty code");
            let history = history_by_code.remove(&code).unwrap_or_default();
            items.push(entry.into_item(code, history, updated_at));
        }

        let summary = match self.summary {
            Some(s) => SignalSummary {
                buy_count: s.buy_count,
                hold_count: s.hold_count,
                sell_count: s.sell_count,
            },
            None => summarize_signals(&items),
        };

        Ok(EtfBoard {
            items,
            updated_at,
            summary,
            ai_analysis: non_blank(self.ai_analysis),
        })
    }
}

impl RawEtfAnalysis {
    fn into_item(
        self,
        code: String,
        history: Vec<RawBar>,
        published_at: Option<DateTime<Utc>>,
    ) -> Item {
        let realtime = self.realtime;
        let signal = self.signal.map(|s| TradeSignal {
            kind: SignalKind::from_action_code(s.action_code.as_deref().unwrap_or_default()),
            action: non_blank(s.action),
            confidence: s.confidence,
            buy_signals: s.buy_signals.unwrap_or(0),
            sell_signals: s.sell_signals.unwrap_or(0),
        });
        let category = signal
            .as_ref()
            .and_then(|s| s.action.clone())
            .unwrap_or_else(|| "ETF".to_string());

        let asset = AssetQuote {
            code: code.clone(),
            price: realtime.as_ref().and_then(|r| r.current).unwrap_or(0.0),
            change_percent: realtime.as_ref().and_then(|r| r.change_percent).unwrap_or(0.0),
            sentiment: self.sentiment.map(|s| AssetSentiment {
                score: s.score.unwrap_or(50.0),
                label: non_blank(s.sentiment),
                emoji: non_blank(s.emoji),
            }),
            signal,
            indicators: self.indicators.map(|i| {
                let macd = i.macd;
                Indicators {
                    rsi: i.rsi,
                    macd: macd.as_ref().and_then(|m| m.macd),
                    dif: macd.as_ref().and_then(|m| m.dif),
                    dea: macd.as_ref().and_then(|m| m.dea),
                    ma5: i.ma5,
                    ma20: i.ma20,
                }
            }),
            risks: self
                .risks
                .into_iter()
                .filter_map(|r| {
                    Some(RiskNote {
                        level: non_blank(r.level).unwrap_or_else(|| "low".to_string()),
                        kind: non_blank(r.kind)?,
                        description: non_blank(r.description).unwrap_or_default(),
                    })
                })
                .collect(),
            history: history
                .into_iter()
                .map(|b| Candle {
                    date: b.date,
                    open: b.open,
                    close: b.close,
                    low: b.low,
                    high: b.high,
                    volume: b.volume,
                })
                .collect(),
        };

        Item {
            id: ItemId::Text(code.clone()),
            title: non_blank(self.name).unwrap_or(code),
            description: None,
            url: None,
            image_url: None,
            source: "ETF".to_string(),
            category,
            country: None,
            published_at,
            asset: Some(asset),
        }
    }
}

fn summarize_signals(items: &[Item]) -> SignalSummary {
    let mut out = SignalSummary::default();
    for kind in items
        .iter()
        .filter_map(|i| i.asset.as_ref()?.signal.as_ref().map(|s| s.kind))
    {
        match kind {
            SignalKind::Buy => out.buy_count += 1,
            SignalKind::Hold => out.hold_count += 1,
            SignalKind::Sell => out.sell_count += 1,
        }
    }
    out
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn clean_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
