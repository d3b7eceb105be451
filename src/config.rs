use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub roster_path: PathBuf,
    pub api_root: String,
    pub include_bikes: bool,
    pub lookback_days: u32,
    pub fetch_concurrency: usize,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_parse("PORT").unwrap_or(3000);

        let data_dir: PathBuf = std::env::var("DATA_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "data".to_string())
            .into();

        let reports_dir = std::env::var("REPORTS_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "results".to_string())
            .into();

        let roster_path = std::env::var("ROSTER_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("athletes.json"));

        let api_root = std::env::var("CONCEPT2_API_ROOT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "https://log.concept2.com".to_string());

        let include_bikes = env_parse("INCLUDE_BIKES").unwrap_or(true);
        let lookback_days = env_parse("LOOKBACK_DAYS").unwrap_or(2);
        let fetch_concurrency = env_parse::<usize>("FETCH_CONCURRENCY")
            .filter(|n| *n > 0)
            .unwrap_or(8);
        let http_timeout_seconds = env_parse("HTTP_TIMEOUT_SECONDS").unwrap_or(10);

        Self {
            port,
            data_dir,
            reports_dir,
            roster_path,
            api_root,
            include_bikes,
            lookback_days,
            fetch_concurrency,
            http_timeout: Duration::from_secs(http_timeout_seconds),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
