//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;

use crate::api::DEFAULT_BASE_URL;
use crate::models::parse_date;
use crate::roadmap::ZoomLevel;
use crate::timeline::DEFAULT_PX_PER_COLUMN;

/// Terminal dashboard for Produtivo products, features and roadmaps
#[derive(Debug, Clone, Parser)]
#[command(name = "produtivo", author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the backend REST layer
    #[arg(long, env = "PRODUTIVO_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// API key sent as `apikey` and bearer token
    #[arg(long, env = "PRODUTIVO_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Initial roadmap zoom: year, month, sprint or week
    #[arg(long, env = "PRODUTIVO_ZOOM", default_value = "month")]
    pub zoom: String,

    /// Reference date for the roadmap (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_reference_date)]
    pub date: Option<NaiveDate>,

    /// Horizontal scale of the roadmap, in layout px per terminal column
    #[arg(
        long,
        env = "PRODUTIVO_PX_PER_COLUMN",
        default_value_t = DEFAULT_PX_PER_COLUMN,
        value_parser = parse_px_per_column
    )]
    pub px_per_column: f64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "PRODUTIVO_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Directory for produtivo.log; defaults to the system temp dir
    #[arg(long, env = "PRODUTIVO_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

fn parse_reference_date(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("'{}' is not a date (use YYYY-MM-DD)", raw))
}

fn parse_px_per_column(raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(px) if px.is_finite() && px > 0.0 => Ok(px),
        _ => Err(format!("'{}' must be a positive number", raw)),
    }
}

/// Resolved runtime settings
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub zoom: ZoomLevel,
    pub reference_date: Option<NaiveDate>,
    pub px_per_column: f64,
    pub timeout: Duration,
    pub log_dir: PathBuf,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            api_url: cli.api_url,
            api_key: cli.api_key,
            zoom: ZoomLevel::from(cli.zoom.as_str()),
            reference_date: cli.date,
            px_per_column: cli.px_per_column,
            timeout: Duration::from_secs(cli.timeout_secs),
            log_dir: cli.log_dir.unwrap_or_else(std::env::temp_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_resolve_into_config() {
        let cli = Cli::try_parse_from([
            "produtivo",
            "--api-url",
            "https://example.test",
            "--zoom",
            "sprint",
            "--date",
            "2024-05-02",
            "--px-per-column",
            "12.5",
            "--timeout-secs",
            "5",
            "--log-dir",
            "/tmp/produtivo-logs",
        ])
        .unwrap();
        let config = Config::from(cli);

        assert_eq!(config.api_url, "https://example.test");
        assert_eq!(config.zoom, ZoomLevel::Sprint);
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2024, 5, 2));
        assert_eq!(config.px_per_column, 12.5);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/produtivo-logs"));
    }

    #[test]
    fn test_unknown_zoom_falls_back_to_month() {
        let cli = Cli::try_parse_from(["produtivo", "--zoom", "decade"]).unwrap();
        assert_eq!(Config::from(cli).zoom, ZoomLevel::Month);
    }

    #[test]
    fn test_rejects_bad_scale_and_date() {
        assert!(Cli::try_parse_from(["produtivo", "--px-per-column", "0"]).is_err());
        assert!(Cli::try_parse_from(["produtivo", "--px-per-column", "-3"]).is_err());
        assert!(Cli::try_parse_from(["produtivo", "--date", "next tuesday"]).is_err());
    }
}
