pub mod chart;
pub mod domain;
pub mod environment;
pub mod ingest;
pub mod notify;
pub mod session;
pub mod time;
pub mod view;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_PAGE_DIR: &str = "docs";
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_CHART_DELAY_MS: u64 = 100;
    pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;
    pub const DEFAULT_STATIC_HOSTS: [&str; 2] = ["vercel.app", "github.io"];

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: Option<String>,
        pub data_root: String,
        pub page_dir: String,
        pub static_hosts: Vec<String>,
        pub http_timeout_secs: u64,
        pub notify_dismiss_ms: Option<u64>,
        pub chart_delay_ms: u64,
        pub utc_offset_hours: i32,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                api_base_url: None,
                data_root: ".".to_string(),
                page_dir: DEFAULT_PAGE_DIR.to_string(),
                static_hosts: DEFAULT_STATIC_HOSTS.iter().map(|s| s.to_string()).collect(),
                http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
                notify_dismiss_ms: None,
                chart_delay_ms: DEFAULT_CHART_DELAY_MS,
                utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();

            let utc_offset_hours = env_parsed::<i32>("NEWSBOARD_UTC_OFFSET_HOURS")?
                .unwrap_or(defaults.utc_offset_hours);
            anyhow::ensure!(
                (-12..=14).contains(&utc_offset_hours),
                "NEWSBOARD_UTC_OFFSET_HOURS must be within -12..=14 (got {utc_offset_hours})"
            );

            let static_hosts = env_nonempty("NEWSBOARD_STATIC_HOSTS")
                .map(|s| parse_host_list(&s))
                .filter(|hosts| !hosts.is_empty())
                .unwrap_or(defaults.static_hosts);

            Ok(Self {
                api_base_url: env_nonempty("NEWSBOARD_API_BASE"),
                data_root: env_nonempty("NEWSBOARD_DATA_ROOT").unwrap_or(defaults.data_root),
                page_dir: env_nonempty("NEWSBOARD_PAGE_DIR").unwrap_or(defaults.page_dir),
                static_hosts,
                http_timeout_secs: env_parsed("NEWSBOARD_HTTP_TIMEOUT_SECS")?
                    .unwrap_or(defaults.http_timeout_secs),
                notify_dismiss_ms: env_parsed("NEWSBOARD_NOTIFY_MS")?,
                chart_delay_ms: env_parsed("NEWSBOARD_CHART_DELAY_MS")?
                    .unwrap_or(defaults.chart_delay_ms),
                utc_offset_hours,
                sentry_dsn: env_nonempty("SENTRY_DSN"),
            })
        }

        pub fn display_offset(&self) -> anyhow::Result<chrono::FixedOffset> {
            chrono::FixedOffset::east_opt(self.utc_offset_hours * 3600)
                .context("invalid display offset")
        }

        pub fn page_root(&self) -> std::path::PathBuf {
            std::path::Path::new(&self.data_root).join(&self.page_dir)
        }
    }

    fn env_nonempty(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn env_parsed<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        env_nonempty(key).map(|s| parse_value(key, &s)).transpose()
    }

    fn parse_value<T>(key: &str, raw: &str) -> anyhow::Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        raw.parse::<T>()
            .with_context(|| format!("{key} is not a valid number: {raw}"))
    }

    fn parse_host_list(s: &str) -> Vec<String> {
        s.split(',')
            .map(|part| part.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|part| !part.is_empty())
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn host_list_is_trimmed_and_lowercased() {
            let hosts = parse_host_list(" Vercel.app, .github.io ,,netlify.app");
            assert_eq!(hosts, vec!["vercel.app", "github.io", "netlify.app"]);
        }

        #[test]
        fn malformed_numbers_are_errors() {
            assert_eq!(parse_value::<u64>("NEWSBOARD_NOTIFY_MS", "2500").unwrap(), 2500);
            assert_eq!(parse_value::<i32>("NEWSBOARD_UTC_OFFSET_HOURS", "-5").unwrap(), -5);

            let err = parse_value::<u64>("NEWSBOARD_HTTP_TIMEOUT_SECS", "10s").unwrap_err();
            assert!(err.to_string().contains("NEWSBOARD_HTTP_TIMEOUT_SECS"));
            assert!(parse_value::<u64>("NEWSBOARD_CHART_DELAY_MS", "-100").is_err());
        }

        #[test]
        fn page_root_joins_data_root_and_page_dir() {
            let settings = Settings {
                data_root: "/srv/site".to_string(),
                ..Settings::default()
            };
            assert_eq!(
                settings.page_root(),
                std::path::PathBuf::from("/srv/site/docs")
            );
        }
    }
}
