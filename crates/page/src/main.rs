use anyhow::Context;
use clap::Parser;
use newsboard_core::chart::recording::RecordingChartSurface;
use newsboard_core::config::Settings;
use newsboard_core::environment::{classify, PageContext};
use newsboard_core::ingest::fetch::{FileFetcher, HttpFetcher};
use newsboard_core::ingest::profile::{DashboardProfile, ProfileKind};
use newsboard_core::ingest::resolver::SourceResolver;
use newsboard_core::notify::Notifier;
use newsboard_core::session::PageSession;
use newsboard_core::view::surface::MemorySurface;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod snapshot;

const DEFAULT_PAGE_URL: &str = "http://localhost/docs/index.html";

#[derive(Debug, Parser)]
#[command(name = "newsboard_page")]
struct Args {
    /// Dashboard to load: market, tencent or etf.
    #[arg(long, default_value = "market")]
    profile: ProfileKind,

    /// URL the page is served from; decides which data tiers are tried.
    #[arg(long, default_value = DEFAULT_PAGE_URL)]
    page_url: String,

    /// Category filter applied after the first render.
    #[arg(long)]
    category: Option<String>,

    /// Disable the embedded demo dataset.
    #[arg(long)]
    no_demo: bool,

    /// Render time (RFC 3339). Defaults to the current time.
    #[arg(long)]
    now: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(&settings, args).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %format!("{err:#}"), "page load failed");
        return Err(err);
    }
    Ok(())
}

async fn run(settings: &Settings, args: Args) -> anyhow::Result<()> {
    let now = resolve_now(args.now.as_deref())?;
    let offset = settings.display_offset()?;

    let page_url = Url::parse(&args.page_url)
        .with_context(|| format!("invalid --page-url: {}", args.page_url))?;
    let page = PageContext::from_url(&page_url);
    let environment = classify(&page, &settings.static_hosts);

    let mut profile = DashboardProfile::for_kind(args.profile);
    if args.no_demo {
        profile = profile.without_demo();
    }
    let notify_delay = settings
        .notify_dismiss_ms
        .map(Duration::from_millis)
        .unwrap_or(profile.notify_delay);

    let remote_base = remote_base_url(settings, &page_url);
    let remote = HttpFetcher::from_settings(settings, remote_base.clone())?;
    let local = FileFetcher::from_settings(settings);

    tracing::info!(
        profile = ?args.profile,
        page = %page_url,
        prefer_local = environment.prefer_local,
        prefer_remote_api = environment.prefer_remote_api,
        remote = %remote.base_url(),
        data_root = %settings.page_root().display(),
        "page load starting"
    );

    let resolver = SourceResolver::new(
        profile,
        environment,
        Arc::new(remote),
        remote_base,
        Arc::new(local),
        offset,
    );

    let mut session = PageSession::new(
        resolver,
        MemorySurface::new(),
        RecordingChartSurface::new(),
        Notifier::new(notify_delay),
        offset,
        Duration::from_millis(settings.chart_delay_ms),
    );

    session.boot(now).await;
    if let Some(category) = args.category.as_deref() {
        session.select_category(category, now);
    }

    if session.outcome().is_some_and(|o| o.is_exhausted()) {
        sentry::capture_message(
            &format!("all data sources exhausted for {:?} at {}", args.profile, page_url),
            sentry::Level::Warning,
        );
    }

    let snapshot = snapshot::PageSnapshot::capture(args.profile, &page, environment, &session);
    let out = serde_json::to_string_pretty(&snapshot).context("failed to serialize page snapshot")?;
    println!("{out}");
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn resolve_now(arg: Option<&str>) -> anyhow::Result<chrono::DateTime<chrono::Utc>> {
    match arg {
        Some(s) => Ok(chrono::DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("invalid --now: {s}"))?
            .with_timezone(&chrono::Utc)),
        None => Ok(chrono::Utc::now()),
    }
}

/// Configured API base, or `<page origin>/api`. Pages without a network origin
/// (file scheme) fall back to the local default.
fn remote_base_url(settings: &Settings, page_url: &Url) -> String {
    if let Some(base) = settings.api_base_url.as_deref() {
        return base.trim_end_matches('/').to_string();
    }
    let origin = page_url.origin();
    if origin.is_tuple() {
        format!("{}/api", origin.ascii_serialization())
    } else {
        "http://localhost/api".to_string()
    }
}
