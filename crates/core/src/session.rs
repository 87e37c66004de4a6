use crate::chart::{ChartAdapter, ChartSurface};
use crate::ingest::resolver::{ResolutionOutcome, SourceResolver};
use crate::notify::{report_outcome, Notifier};
use crate::view::projector::{project, RenderPlan, ViewState};
use crate::view::surface::{apply, PageSurface};
use chrono::{DateTime, FixedOffset, Utc};
use std::time::Duration;

pub struct PageSession<P: PageSurface, C: ChartSurface> {
    resolver: SourceResolver,
    view: ViewState,
    charts: ChartAdapter,
    page: P,
    chart_surface: C,
    notifier: Notifier,
    chart_delay: Duration,
    outcome: Option<ResolutionOutcome>,
    plan: RenderPlan,
}

impl<P: PageSurface, C: ChartSurface> PageSession<P, C> {
    pub fn new(
        resolver: SourceResolver,
        page: P,
        chart_surface: C,
        notifier: Notifier,
        offset: FixedOffset,
        chart_delay: Duration,
    ) -> Self {
        let view = ViewState {
            list_limit: resolver.profile().list_limit,
            ..ViewState::new(offset)
        };
        // nothing resolved yet: the page starts in its no-data state
        let plan = project(None, &view, Utc::now());
        Self {
            resolver,
            view,
            charts: ChartAdapter::new(),
            page,
            chart_surface,
            notifier,
            chart_delay,
            outcome: None,
            plan,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.view.category = category.into();
        self
    }

    pub async fn boot(&mut self, now: DateTime<Utc>) -> &RenderPlan {
        let outcome = self.resolver.resolve(now).await;
        report_outcome(&outcome, &self.notifier);
        self.view.degraded = outcome.degraded;
        self.outcome = Some(outcome);

        self.render(now);
        // charts bind after the page has laid out its containers
        tokio::time::sleep(self.chart_delay).await;
        self.bind_charts();

        &self.plan
    }

    /// Re-filters the held record; no source is re-resolved.
    pub fn select_category(&mut self, category: &str, now: DateTime<Utc>) -> &RenderPlan {
        self.view.category = category.trim().to_string();
        tracing::debug!(category = %self.view.category, "category selected");
        self.render(now);
        self.bind_charts();
        &self.plan
    }

    pub async fn refresh(&mut self, now: DateTime<Utc>) -> &RenderPlan {
        self.outcome = None;
        self.boot(now).await
    }

    pub fn resize(&mut self) {
        self.charts.handle_resize(&mut self.chart_surface);
    }

    pub fn outcome(&self) -> Option<&ResolutionOutcome> {
        self.outcome.as_ref()
    }

    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn chart_surface(&self) -> &C {
        &self.chart_surface
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn category(&self) -> &str {
        &self.view.category
    }

    fn render(&mut self, now: DateTime<Utc>) {
        let record = self.outcome.as_ref().and_then(|o| o.record.as_ref());
        self.plan = project(record, &self.view, now);
        apply(&self.plan, &mut self.page);
    }

    fn bind_charts(&mut self) {
        self.charts.bind_plan(&mut self.chart_surface, &self.plan);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::recording::RecordingChartSurface;
    use crate::environment::EnvironmentProfile;
    use crate::ingest::fetch::testing::StaticFetcher;
    use crate::ingest::profile::DashboardProfile;
    use crate::notify::{Level, DEMO_DATA_NOTICE};
    use crate::view::projector::{Card, PageStatus};
    use crate::view::surface::{ElementId, MemorySurface};
    use serde_json::json;
    use std::sync::Arc;

    fn cst() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-10-23T04:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn session(
        profile: DashboardProfile,
        env: EnvironmentProfile,
        local: StaticFetcher,
    ) -> PageSession<MemorySurface, RecordingChartSurface> {
        let notifier = Notifier::new(profile.notify_delay);
        let resolver = SourceResolver::new(
            profile,
            env,
            Arc::new(StaticFetcher::new()),
            "https://board.vercel.app/api",
            Arc::new(local),
            cst(),
        );
        PageSession::new(
            resolver,
            MemorySurface::new(),
            RecordingChartSurface::new(),
            notifier,
            cst(),
            Duration::from_millis(100),
        )
    }

    fn hosted() -> EnvironmentProfile {
        EnvironmentProfile {
            prefer_local: false,
            prefer_remote_api: true,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn demo_fallback_renders_full_dashboard() {
        let mut s = session(DashboardProfile::tencent(), hosted(), StaticFetcher::new());
        let plan = s.boot(now()).await.clone();

        assert_eq!(plan.status, PageStatus::Degraded);
        assert_eq!(plan.cards.len(), 6);
        assert_eq!(plan.summary.positive, 5);
        assert_eq!(plan.summary.negative, 1);
        assert_eq!(plan.gauge.as_ref().unwrap().value, 72.5);
        assert_eq!(plan.gauge.as_ref().unwrap().color, "#6BCF7F");

        let page = s.page();
        assert_eq!(page.text(ElementId::PositiveCount), Some("5"));
        assert_eq!(page.text(ElementId::NegativeCount), Some("1"));
        assert_eq!(page.text(ElementId::TempScore), Some("72.5°"));
        assert_eq!(page.text(ElementId::Rating), Some("强烈看好"));

        let gauge = s.chart_surface().chart("temperatureGauge").unwrap();
        assert_eq!(gauge.options[0]["series"][0]["data"][0]["value"], 72.5);

        let notes = s.notifier().active();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, Level::Info);
        assert_eq!(notes[0].message, DEMO_DATA_NOTICE);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_market_page_shows_no_data() {
        let mut s = session(DashboardProfile::market(), hosted(), StaticFetcher::new());
        let plan = s.boot(now()).await.clone();

        assert_eq!(plan.status, PageStatus::NoData);
        assert!(plan.cards.is_empty());
        assert_eq!(s.page().text(ElementId::EmptyState), Some("暂无数据"));
        assert_eq!(s.chart_surface().init_count(), 0);
        assert_eq!(s.notifier().active()[0].level, Level::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn category_selection_reuses_chart_instances() {
        let local = StaticFetcher::new()
            .with(
                "../data/news.json",
                200,
                json!({"news": [
                    {"id": 1, "title": "a", "category": "货币政策"},
                    {"id": 2, "title": "b", "category": "经济数据"},
                    {"id": 3, "title": "c", "category": "经济数据"}
                ]}),
            )
            .with("../data/analysis.json", 200, json!({"temperature_score": 45.0}));
        let mut s = session(DashboardProfile::market(), hosted(), local);
        s.boot(now()).await;
        let inits = s.chart_surface().init_count();

        let plan = s.select_category("经济数据", now()).clone();
        assert_eq!(plan.cards.len(), 2);
        assert!(plan.cards.iter().all(|c| matches!(c, Card::News(n) if n.category == "经济数据")));
        assert_eq!(s.chart_surface().init_count(), inits);
        let pie = s.chart_surface().chart("categoryChart").unwrap();
        assert_eq!(pie.options.len(), 2);

        let cleared = s.select_category("", now()).clone();
        assert_eq!(cleared.cards.len(), 3);

        s.resize();
        assert!(s.chart_surface().charts.iter().all(|c| c.resizes == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_re_resolves_without_new_chart_instances() {
        let mut s = session(DashboardProfile::tencent(), hosted(), StaticFetcher::new());
        s.boot(now()).await;
        let inits = s.chart_surface().init_count();

        s.refresh(now()).await;
        assert_eq!(s.chart_surface().init_count(), inits);
        assert!(s.outcome().unwrap().degraded);
        assert_eq!(s.notifier().history().len(), 2);
    }
}
