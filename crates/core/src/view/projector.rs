use crate::domain::record::{
    category_aggregate, Analysis, AssetQuote, CanonicalRecord, Candle, CategoryCount, Item,
    Polarity, SignalSummary, UNCATEGORIZED,
};
use crate::time::display::{format_update_time, same_local_day, time_ago};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

pub const DEFAULT_SENTIMENT: &str = "中性";
pub const DEFAULT_SCORE: f64 = 50.0;
pub const NO_DESCRIPTION: &str = "暂无描述";
pub const UNKNOWN_COUNTRY: &str = "未知";
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x200?text=News";
pub const NO_ANALYSIS: &str = "暂无分析";
pub const PLACEHOLDER_VALUE: &str = "--";
pub const NO_DATA: &str = "暂无数据";
pub const NO_ITEMS: &str = "暂无新闻数据";
pub const ALL_CATEGORIES: &str = "全部";

pub const GAUGE_CONTAINER: &str = "temperatureGauge";
pub const PIE_CONTAINER: &str = "categoryChart";

const GAUGE_HOT: &str = "#6BCF7F";
const GAUGE_WARM: &str = "#FFD93D";
const GAUGE_COLD: &str = "#FF6B6B";
const MAX_RISKS_PER_CARD: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub category: String,
    pub list_limit: Option<usize>,
    pub degraded: bool,
    pub offset: FixedOffset,
}

impl ViewState {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            category: String::new(),
            list_limit: None,
            degraded: false,
            offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Ready,
    Degraded,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub status: PageStatus,
    pub update_label: String,
    pub summary: Summary,
    pub chips: Vec<CategoryChip>,
    pub cards: Vec<Card>,
    pub empty_message: Option<String>,
    pub analysis: AnalysisPanel,
    pub gauge: Option<GaugeBinding>,
    pub candles: Vec<CandleBinding>,
    pub pie: Option<PieBinding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub news_total: u64,
    pub news_today: u64,
    pub temperature: String,
    pub sentiment: String,
    pub positive: u64,
    pub negative: u64,
    pub rating: String,
    pub signals: Option<SignalSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChip {
    pub label: String,
    pub category: String,
    pub count: u64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Card {
    News(NewsCard),
    Asset(AssetCard),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub image_url: String,
    pub source: String,
    pub category: String,
    pub country: String,
    pub time_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetCard {
    pub id: String,
    pub code: String,
    pub name: String,
    pub price_label: String,
    pub change_label: String,
    pub change_up: bool,
    pub sentiment_label: String,
    pub sentiment_score: String,
    pub action: String,
    pub confidence: String,
    pub signal_counts: String,
    pub indicators: Vec<IndicatorLine>,
    pub risks: Vec<RiskLine>,
    pub chart_container: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorLine {
    pub name: String,
    pub value: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskLine {
    pub level: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisPanel {
    pub text: String,
    pub factors: Vec<FactorLine>,
    pub rating: String,
    pub risk_level: String,
    pub risk_class: RiskClass,
    pub recommendation: String,
    pub detailed_analysis: String,
    pub opportunities: Vec<String>,
    pub risks: Vec<String>,
    pub actions: Vec<String>,
    pub ai_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskClass {
    Low,
    Medium,
    High,
}

impl RiskClass {
    pub fn from_level(level: &str) -> Self {
        if level.contains('低') {
            RiskClass::Low
        } else if level.contains('高') {
            RiskClass::High
        } else {
            RiskClass::Medium
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            RiskClass::Low => "risk-low",
            RiskClass::Medium => "risk-medium",
            RiskClass::High => "risk-high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorLine {
    pub text: String,
    pub polarity: Polarity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeBinding {
    pub container: String,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleBinding {
    pub container: String,
    pub history: Vec<Candle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieBinding {
    pub container: String,
    pub slices: Vec<CategoryCount>,
    pub selected: Option<String>,
}

pub fn project(record: Option<&CanonicalRecord>, view: &ViewState, now: DateTime<Utc>) -> RenderPlan {
    let Some(record) = record else {
        return no_data_plan();
    };

    let analysis = record.analysis.as_ref();
    let is_asset_board = analysis.is_some_and(|a| a.signal_summary.is_some())
        || record.items.iter().any(|i| i.asset.is_some());

    let visible: Vec<&Item> = filter_items(&record.items, &view.category)
        .into_iter()
        .take(view.list_limit.unwrap_or(usize::MAX))
        .collect();

    let cards: Vec<Card> = visible
        .iter()
        .map(|item| match &item.asset {
            Some(asset) => Card::Asset(asset_card(item, asset)),
            None => Card::News(news_card(item, now, view.offset)),
        })
        .collect();

    let candles = visible
        .iter()
        .filter_map(|item| {
            let asset = item.asset.as_ref()?;
            Some(CandleBinding {
                container: chart_container(&asset.code),
                history: asset.history.clone(),
            })
        })
        .collect();

    let empty_message = cards.is_empty().then(|| NO_ITEMS.to_string());

    let gauge = if is_asset_board {
        None
    } else {
        let value = analysis
            .and_then(|a| a.temperature_score)
            .unwrap_or(DEFAULT_SCORE);
        Some(GaugeBinding {
            container: GAUGE_CONTAINER.to_string(),
            value,
            color: gauge_color(value),
        })
    };

    let slices = match analysis {
        Some(a) if !a.category_distribution.is_empty() => a.category_distribution.clone(),
        _ => category_aggregate(&record.items),
    };

    RenderPlan {
        status: if view.degraded {
            PageStatus::Degraded
        } else {
            PageStatus::Ready
        },
        update_label: record
            .updated_at
            .map(|t| format!("更新于: {}", format_update_time(t, view.offset)))
            .unwrap_or_else(|| PLACEHOLDER_VALUE.to_string()),
        summary: summary(record, analysis, now, view.offset),
        chips: category_chips(&record.items, &view.category),
        cards,
        empty_message,
        analysis: analysis_panel(analysis),
        gauge,
        candles,
        pie: Some(PieBinding {
            container: PIE_CONTAINER.to_string(),
            slices,
            selected: non_empty(&view.category),
        }),
    }
}

pub fn filter_items<'a>(items: &'a [Item], category: &str) -> Vec<&'a Item> {
    let category = category.trim();
    if category.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| display_category(item) == category)
        .collect()
}

pub fn gauge_color(score: f64) -> &'static str {
    if score >= 70.0 {
        GAUGE_HOT
    } else if score >= 50.0 {
        GAUGE_WARM
    } else {
        GAUGE_COLD
    }
}

pub fn chart_container(code: &str) -> String {
    format!("chart-{code}")
}

fn display_category(item: &Item) -> &str {
    let c = item.category.trim();
    if c.is_empty() {
        UNCATEGORIZED
    } else {
        c
    }
}

fn no_data_plan() -> RenderPlan {
    RenderPlan {
        status: PageStatus::NoData,
        update_label: PLACEHOLDER_VALUE.to_string(),
        summary: Summary {
            news_total: 0,
            news_today: 0,
            temperature: temperature_label(None),
            sentiment: DEFAULT_SENTIMENT.to_string(),
            positive: 0,
            negative: 0,
            rating: PLACEHOLDER_VALUE.to_string(),
            signals: None,
        },
        chips: Vec::new(),
        cards: Vec::new(),
        empty_message: Some(NO_DATA.to_string()),
        analysis: analysis_panel(None),
        gauge: None,
        candles: Vec::new(),
        pie: None,
    }
}

fn summary(
    record: &CanonicalRecord,
    analysis: Option<&Analysis>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Summary {
    let news_today = record
        .items
        .iter()
        .filter(|i| i.published_at.is_some_and(|t| same_local_day(t, now, offset)))
        .count() as u64;

    Summary {
        news_total: record.news_total(),
        news_today,
        temperature: temperature_label(analysis.and_then(|a| a.temperature_score)),
        sentiment: sentiment_label(analysis),
        positive: analysis.and_then(|a| a.positive_count).unwrap_or(0),
        negative: analysis.and_then(|a| a.negative_count).unwrap_or(0),
        rating: analysis
            .and_then(|a| a.advice.as_ref())
            .and_then(|adv| adv.overall_rating.clone())
            .unwrap_or_else(|| PLACEHOLDER_VALUE.to_string()),
        signals: analysis.and_then(|a| a.signal_summary),
    }
}

fn temperature_label(score: Option<f64>) -> String {
    format!("{:.1}°", score.unwrap_or(DEFAULT_SCORE))
}

fn sentiment_label(analysis: Option<&Analysis>) -> String {
    let label = analysis
        .and_then(|a| a.sentiment.as_deref())
        .unwrap_or(DEFAULT_SENTIMENT);
    match analysis.and_then(|a| a.sentiment_emoji.as_deref()) {
        Some(emoji) => format!("{label} {emoji}"),
        None => label.to_string(),
    }
}

fn category_chips(items: &[Item], active: &str) -> Vec<CategoryChip> {
    let active = active.trim();
    let mut chips = vec![CategoryChip {
        label: ALL_CATEGORIES.to_string(),
        category: String::new(),
        count: items.len() as u64,
        active: active.is_empty(),
    }];
    chips.extend(category_aggregate(items).into_iter().map(|c| CategoryChip {
        label: format!("{} ({})", c.category, c.count),
        active: c.category == active,
        category: c.category,
        count: c.count,
    }));
    chips
}

fn news_card(item: &Item, now: DateTime<Utc>, offset: FixedOffset) -> NewsCard {
    NewsCard {
        id: item.id.to_string(),
        title: item.title.clone(),
        description: item
            .description
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        url: item.url.clone(),
        image_url: item
            .image_url
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        source: or_placeholder(&item.source),
        category: display_category(item).to_string(),
        country: item
            .country
            .clone()
            .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
        time_label: time_ago(item.published_at, now, offset),
    }
}

fn asset_card(item: &Item, asset: &AssetQuote) -> AssetCard {
    let sentiment = asset.sentiment.as_ref();
    let sentiment_label = {
        let label = sentiment
            .and_then(|s| s.label.as_deref())
            .unwrap_or(DEFAULT_SENTIMENT);
        match sentiment.and_then(|s| s.emoji.as_deref()) {
            Some(emoji) => format!("{emoji} {label}"),
            None => label.to_string(),
        }
    };
    let signal = asset.signal.as_ref();
    let change_up = asset.change_percent >= 0.0;

    AssetCard {
        id: item.id.to_string(),
        code: asset.code.clone(),
        name: item.title.clone(),
        price_label: format!("¥{:.3}", asset.price),
        change_label: format!(
            "{}{:.2}%",
            if change_up { "+" } else { "" },
            asset.change_percent
        ),
        change_up,
        sentiment_label,
        sentiment_score: format!("{:.1}", sentiment.map(|s| s.score).unwrap_or(DEFAULT_SCORE)),
        action: signal
            .and_then(|s| s.action.clone())
            .unwrap_or_else(|| PLACEHOLDER_VALUE.to_string()),
        confidence: signal
            .and_then(|s| s.confidence)
            .map(|c| format!("{c}%"))
            .unwrap_or_else(|| PLACEHOLDER_VALUE.to_string()),
        signal_counts: format!(
            "买入信号: {} | 卖出信号: {}",
            signal.map(|s| s.buy_signals).unwrap_or(0),
            signal.map(|s| s.sell_signals).unwrap_or(0)
        ),
        indicators: indicator_lines(asset),
        risks: asset
            .risks
            .iter()
            .take(MAX_RISKS_PER_CARD)
            .map(|r| RiskLine {
                level: r.level.clone(),
                title: r.kind.clone(),
                description: or_placeholder(&r.description),
            })
            .collect(),
        chart_container: chart_container(&asset.code),
    }
}

fn indicator_lines(asset: &AssetQuote) -> Vec<IndicatorLine> {
    let ind = asset.indicators.as_ref();
    let fixed = |v: Option<f64>, digits: usize| {
        v.map(|v| format!("{v:.digits$}"))
            .unwrap_or_else(|| PLACEHOLDER_VALUE.to_string())
    };

    let rsi = ind.and_then(|i| i.rsi);
    let rsi_note = rsi.map(|v| {
        let note = if v > 70.0 {
            "超买"
        } else if v < 30.0 {
            "超卖"
        } else {
            "正常"
        };
        note.to_string()
    });

    let cross_note = match (ind.and_then(|i| i.dif), ind.and_then(|i| i.dea)) {
        (Some(dif), Some(dea)) => Some(if dif > dea { "金叉" } else { "死叉" }.to_string()),
        _ => None,
    };

    vec![
        IndicatorLine {
            name: "RSI(14)".to_string(),
            value: fixed(rsi, 1),
            note: rsi_note,
        },
        IndicatorLine {
            name: "MACD".to_string(),
            value: fixed(ind.and_then(|i| i.macd), 4),
            note: cross_note,
        },
        IndicatorLine {
            name: "MA5".to_string(),
            value: fixed(ind.and_then(|i| i.ma5), 3),
            note: None,
        },
        IndicatorLine {
            name: "MA20".to_string(),
            value: fixed(ind.and_then(|i| i.ma20), 3),
            note: None,
        },
    ]
}

fn analysis_panel(analysis: Option<&Analysis>) -> AnalysisPanel {
    let advice = analysis.and_then(|a| a.advice.as_ref());
    let text_or = |v: Option<&String>, fallback: &str| {
        v.cloned().unwrap_or_else(|| fallback.to_string())
    };
    let risk_level = text_or(advice.and_then(|a| a.risk_level.as_ref()), PLACEHOLDER_VALUE);

    AnalysisPanel {
        text: text_or(analysis.and_then(|a| a.analysis_text.as_ref()), NO_ANALYSIS),
        factors: analysis
            .map(|a| {
                a.key_factors
                    .iter()
                    .map(|f| FactorLine {
                        text: f.text.clone(),
                        polarity: f.polarity,
                    })
                    .collect()
            })
            .unwrap_or_default(),
        rating: text_or(advice.and_then(|a| a.overall_rating.as_ref()), PLACEHOLDER_VALUE),
        risk_class: RiskClass::from_level(&risk_level),
        risk_level,
        recommendation: text_or(advice.and_then(|a| a.recommendation.as_ref()), PLACEHOLDER_VALUE),
        detailed_analysis: text_or(advice.and_then(|a| a.detailed_analysis.as_ref()), NO_ANALYSIS),
        opportunities: advice.map(|a| a.key_opportunities.clone()).unwrap_or_default(),
        risks: advice.map(|a| a.key_risks.clone()).unwrap_or_default(),
        actions: advice.map(|a| a.action_items.clone()).unwrap_or_default(),
        ai_text: analysis.and_then(|a| a.ai_analysis.clone()),
    }
}

fn or_placeholder(s: &str) -> String {
    if s.trim().is_empty() {
        PLACEHOLDER_VALUE.to_string()
    } else {
        s.to_string()
    }
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}
