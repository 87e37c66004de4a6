use newsboard_core::chart::recording::RecordingChartSurface;
use newsboard_core::environment::{EnvironmentProfile, PageContext};
use newsboard_core::ingest::error::SourceRejection;
use newsboard_core::ingest::profile::ProfileKind;
use newsboard_core::ingest::source::SourceDescriptor;
use newsboard_core::notify::Notification;
use newsboard_core::session::PageSession;
use newsboard_core::view::projector::RenderPlan;
use newsboard_core::view::surface::MemorySurface;
use serde::Serialize;

/// Everything one page load produced, printed as JSON by the host.
#[derive(Debug, Serialize)]
pub struct PageSnapshot<'a> {
    pub profile: ProfileKind,
    pub page: &'a PageContext,
    pub environment: EnvironmentProfile,
    pub category: &'a str,
    pub source_used: Option<&'a SourceDescriptor>,
    pub degraded: bool,
    pub rejections: &'a [SourceRejection],
    pub plan: &'a RenderPlan,
    pub surface: &'a MemorySurface,
    pub charts: &'a RecordingChartSurface,
    pub notifications: Vec<Notification>,
}

impl<'a> PageSnapshot<'a> {
    pub fn capture(
        profile: ProfileKind,
        page: &'a PageContext,
        environment: EnvironmentProfile,
        session: &'a PageSession<MemorySurface, RecordingChartSurface>,
    ) -> Self {
        let outcome = session.outcome();
        Self {
            profile,
            page,
            environment,
            category: session.category(),
            source_used: outcome.and_then(|o| o.source_used.as_ref()),
            degraded: outcome.is_some_and(|o| o.degraded),
            rejections: outcome.map(|o| o.rejections.as_slice()).unwrap_or_default(),
            plan: session.plan(),
            surface: session.page(),
            charts: session.chart_surface(),
            notifications: session.notifier().history(),
        }
    }
}
