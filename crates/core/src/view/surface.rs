use crate::view::projector::{Card, CategoryChip, PageStatus, RenderPlan};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ElementId {
    #[serde(rename = "pageStatus")]
    PageStatus,
    #[serde(rename = "updateTime")]
    UpdateTime,
    #[serde(rename = "newsTotal")]
    NewsTotal,
    #[serde(rename = "newsToday")]
    NewsToday,
    #[serde(rename = "tempScore")]
    TempScore,
    #[serde(rename = "sentiment")]
    Sentiment,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "positiveCount")]
    PositiveCount,
    #[serde(rename = "negativeCount")]
    NegativeCount,
    #[serde(rename = "buyCount")]
    BuyCount,
    #[serde(rename = "holdCount")]
    HoldCount,
    #[serde(rename = "sellCount")]
    SellCount,
    #[serde(rename = "categoryFilter")]
    CategoryFilter,
    #[serde(rename = "newsList")]
    NewsList,
    #[serde(rename = "emptyState")]
    EmptyState,
    #[serde(rename = "analysisText")]
    AnalysisText,
    #[serde(rename = "keyFactors")]
    KeyFactors,
    #[serde(rename = "riskLevel")]
    RiskLevel,
    #[serde(rename = "riskBadge")]
    RiskBadge,
    #[serde(rename = "recommendation")]
    Recommendation,
    #[serde(rename = "detailedAnalysis")]
    DetailedAnalysis,
    #[serde(rename = "opportunities")]
    Opportunities,
    #[serde(rename = "risks")]
    Risks,
    #[serde(rename = "actionItems")]
    ActionItems,
    #[serde(rename = "aiAnalysisSection")]
    AiAnalysisSection,
    #[serde(rename = "aiAnalysisContent")]
    AiAnalysisContent,
}

pub trait PageSurface: Send {
    fn set_text(&mut self, id: ElementId, text: &str);
    fn set_list(&mut self, id: ElementId, entries: Vec<String>);
    fn set_chips(&mut self, id: ElementId, chips: Vec<CategoryChip>);
    fn set_cards(&mut self, id: ElementId, cards: Vec<Card>);
    fn set_visible(&mut self, id: ElementId, visible: bool);
    fn set_class(&mut self, id: ElementId, class: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemorySurface {
    pub texts: BTreeMap<ElementId, String>,
    pub lists: BTreeMap<ElementId, Vec<String>>,
    pub chips: BTreeMap<ElementId, Vec<CategoryChip>>,
    pub cards: BTreeMap<ElementId, Vec<Card>>,
    pub hidden: BTreeSet<ElementId>,
    pub classes: BTreeMap<ElementId, String>,
    pub writes: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.texts.get(&id).map(String::as_str)
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        !self.hidden.contains(&id)
    }

    pub fn class(&self, id: ElementId) -> Option<&str> {
        self.classes.get(&id).map(String::as_str)
    }
}

impl PageSurface for MemorySurface {
    fn set_text(&mut self, id: ElementId, text: &str) {
        self.writes += 1;
        self.texts.insert(id, text.to_string());
    }

    fn set_list(&mut self, id: ElementId, entries: Vec<String>) {
        self.writes += 1;
        self.lists.insert(id, entries);
    }

    fn set_chips(&mut self, id: ElementId, chips: Vec<CategoryChip>) {
        self.writes += 1;
        self.chips.insert(id, chips);
    }

    fn set_cards(&mut self, id: ElementId, cards: Vec<Card>) {
        self.writes += 1;
        self.cards.insert(id, cards);
    }

    fn set_visible(&mut self, id: ElementId, visible: bool) {
        self.writes += 1;
        if visible {
            self.hidden.remove(&id);
        } else {
            self.hidden.insert(id);
        }
    }

    fn set_class(&mut self, id: ElementId, class: &str) {
        self.writes += 1;
        self.classes.insert(id, class.to_string());
    }
}

pub fn apply(plan: &RenderPlan, surface: &mut dyn PageSurface) {
    let status = match plan.status {
        PageStatus::Ready => "ready",
        PageStatus::Degraded => "degraded",
        PageStatus::NoData => "no_data",
    };
    surface.set_text(ElementId::PageStatus, status);
    surface.set_text(ElementId::UpdateTime, &plan.update_label);

    let s = &plan.summary;
    surface.set_text(ElementId::NewsTotal, &s.news_total.to_string());
    surface.set_text(ElementId::NewsToday, &s.news_today.to_string());
    surface.set_text(ElementId::TempScore, &s.temperature);
    surface.set_text(ElementId::Sentiment, &s.sentiment);
    surface.set_text(ElementId::Rating, &s.rating);
    surface.set_text(ElementId::PositiveCount, &s.positive.to_string());
    surface.set_text(ElementId::NegativeCount, &s.negative.to_string());

    let signals = s.signals.unwrap_or_default();
    surface.set_text(ElementId::BuyCount, &signals.buy_count.to_string());
    surface.set_text(ElementId::HoldCount, &signals.hold_count.to_string());
    surface.set_text(ElementId::SellCount, &signals.sell_count.to_string());

    surface.set_chips(ElementId::CategoryFilter, plan.chips.clone());
    surface.set_cards(ElementId::NewsList, plan.cards.clone());
    match &plan.empty_message {
        Some(msg) => {
            surface.set_text(ElementId::EmptyState, msg);
            surface.set_visible(ElementId::EmptyState, true);
        }
        None => surface.set_visible(ElementId::EmptyState, false),
    }

    let a = &plan.analysis;
    surface.set_text(ElementId::AnalysisText, &a.text);
    surface.set_list(
        ElementId::KeyFactors,
        a.factors.iter().map(|f| f.text.clone()).collect(),
    );
    surface.set_text(ElementId::RiskLevel, &a.risk_level);
    surface.set_text(ElementId::RiskBadge, &a.risk_level);
    surface.set_class(
        ElementId::RiskBadge,
        &format!("risk-badge {}", a.risk_class.css_class()),
    );
    surface.set_text(ElementId::Recommendation, &a.recommendation);
    surface.set_text(ElementId::DetailedAnalysis, &a.detailed_analysis);
    surface.set_list(ElementId::Opportunities, a.opportunities.clone());
    surface.set_list(ElementId::Risks, a.risks.clone());
    surface.set_list(ElementId::ActionItems, a.actions.clone());

    match &a.ai_text {
        Some(text) => {
            surface.set_text(ElementId::AiAnalysisContent, text);
            surface.set_visible(ElementId::AiAnalysisSection, true);
        }
        None => surface.set_visible(ElementId::AiAnalysisSection, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::fixtures::news_item;
    use crate::domain::record::{Analysis, CanonicalRecord, InvestmentAdvice};
    use crate::view::projector::{project, ViewState};
    use chrono::{FixedOffset, Utc};

    fn view() -> ViewState {
        ViewState::new(FixedOffset::east_opt(8 * 3600).unwrap())
    }

    #[test]
    fn no_data_plan_writes_no_empty_text() {
        let mut surface = MemorySurface::new();
        apply(&project(None, &view(), Utc::now()), &mut surface);

        assert_eq!(surface.text(ElementId::PageStatus), Some("no_data"));
        assert_eq!(surface.text(ElementId::EmptyState), Some("暂无数据"));
        assert!(surface.is_visible(ElementId::EmptyState));
        assert!(!surface.is_visible(ElementId::AiAnalysisSection));
        assert!(surface.texts.values().all(|t| !t.trim().is_empty()));
        assert!(surface.cards[&ElementId::NewsList].is_empty());
    }

    #[test]
    fn ready_plan_hides_empty_state_and_fills_cards() {
        let record = CanonicalRecord {
            items: vec![news_item(1, "经济数据"), news_item(2, "货币政策")],
            total_count: Some(40),
            analysis: Some(Analysis {
                ai_analysis: Some("市场整体偏暖".to_string()),
                ..Analysis::default()
            }),
            updated_at: None,
        };
        let mut surface = MemorySurface::new();
        apply(&project(Some(&record), &view(), Utc::now()), &mut surface);

        assert_eq!(surface.text(ElementId::NewsTotal), Some("40"));
        assert_eq!(surface.cards[&ElementId::NewsList].len(), 2);
        assert!(!surface.is_visible(ElementId::EmptyState));
        assert!(surface.is_visible(ElementId::AiAnalysisSection));
        assert_eq!(surface.chips[&ElementId::CategoryFilter].len(), 3);
        assert!(surface.texts.values().all(|t| !t.trim().is_empty()));
    }

    #[test]
    fn missing_sentiment_renders_neutral_label() {
        let record = CanonicalRecord {
            items: vec![news_item(1, "经济数据")],
            total_count: None,
            analysis: Some(Analysis {
                temperature_score: Some(61.0),
                sentiment: None,
                ..Analysis::default()
            }),
            updated_at: None,
        };
        let plan = project(Some(&record), &view(), Utc::now());
        assert_eq!(plan.summary.sentiment, "中性");

        let mut surface = MemorySurface::new();
        apply(&plan, &mut surface);
        assert_eq!(surface.text(ElementId::Sentiment), Some("中性"));
        assert!(surface
            .texts
            .values()
            .all(|t| !t.trim().is_empty() && !t.contains("undefined")));
    }

    #[test]
    fn risk_badge_carries_level_class() {
        let with_risk = |level: &str| CanonicalRecord {
            items: vec![news_item(1, "游戏")],
            total_count: None,
            analysis: Some(Analysis {
                advice: Some(InvestmentAdvice {
                    risk_level: Some(level.to_string()),
                    ..InvestmentAdvice::default()
                }),
                ..Analysis::default()
            }),
            updated_at: None,
        };

        let mut surface = MemorySurface::new();
        apply(&project(Some(&with_risk("中低风险")), &view(), Utc::now()), &mut surface);
        assert_eq!(surface.text(ElementId::RiskBadge), Some("中低风险"));
        assert_eq!(surface.class(ElementId::RiskBadge), Some("risk-badge risk-low"));

        apply(&project(Some(&with_risk("高风险")), &view(), Utc::now()), &mut surface);
        assert_eq!(surface.class(ElementId::RiskBadge), Some("risk-badge risk-high"));

        apply(&project(None, &view(), Utc::now()), &mut surface);
        assert_eq!(surface.text(ElementId::RiskBadge), Some("--"));
        assert_eq!(surface.class(ElementId::RiskBadge), Some("risk-badge risk-medium"));
    }
}
