use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub ranking: RankingConfig,
    pub enrichment: EnrichmentConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
    pub spreadsheet: SpreadsheetConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankingConfig {
    pub base_url: String,

    /// Earliest leaderboard snapshot to harvest on a fresh store.
    #[serde(deserialize_with = "deserialize_date")]
    pub start_date: DateTime<Utc>,

    pub max_products_per_snapshot: usize,
    pub request_delay_ms: u64,
}

impl RankingConfig {
    pub fn start_date_naive(&self) -> NaiveDate {
        self.start_date.date_naive()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    /// Inter-request delay between extraction targets; the pipeline itself
    /// assumes it is never invoked concurrently against this budget.
    pub rate_limit_delay_ms: u64,
    pub batch_limit: usize,
    pub lexicons_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub progress_interval: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: String,
}

impl OutputConfig {
    pub fn screenshot_dir(&self) -> String {
        format!("{}/screenshots", self.directory)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpreadsheetConfig {
    pub enabled: bool,
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub api_base: String,
}

// Custom deserializer for flexible date formats
fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;

    // Try full date format first (YYYY-MM-DD)
    if let Ok(naive_date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        if let Some(datetime) = naive_date.and_hms_opt(0, 0, 0) {
            return Ok(datetime.and_utc());
        }
    }

    // Try year-only format (YYYY) - defaults to January 1st
    if let Ok(year) = s.parse::<i32>() {
        if let Some(naive_date) = NaiveDate::from_ymd_opt(year, 1, 1) {
            if let Some(datetime) = naive_date.and_hms_opt(0, 0, 0) {
                return Ok(datetime.and_utc());
            }
        }
    }

    Err(serde::de::Error::custom(format!(
        "Invalid date format: {}",
        s
    )))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ranking: RankingConfig {
                base_url: "https://www.producthunt.com".to_string(),
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    .and_utc(),
                max_products_per_snapshot: 30,
                request_delay_ms: 1500,
            },
            enrichment: EnrichmentConfig {
                rate_limit_delay_ms: 4000,
                batch_limit: 50,
                lexicons_path: "lexicons.yml".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                progress_interval: 10,
            },
            output: OutputConfig {
                directory: "out".to_string(),
            },
            spreadsheet: SpreadsheetConfig {
                enabled: false,
                spreadsheet_id: String::new(),
                worksheet: "Leads".to_string(),
                api_base: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
            },
        }
    }
}

pub async fn load_config(
    path: &str,
) -> std::result::Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_dates_accept_day_and_year_forms() {
        let yaml = r#"
ranking:
  base_url: "https://www.producthunt.com"
  start_date: "2025-03-15"
  max_products_per_snapshot: 10
  request_delay_ms: 1000
enrichment:
  rate_limit_delay_ms: 2000
  batch_limit: 5
  lexicons_path: lexicons.yml
logging:
  level: info
  progress_interval: 10
output:
  directory: out
spreadsheet:
  enabled: false
  spreadsheet_id: ""
  worksheet: Leads
  api_base: "https://sheets.googleapis.com/v4/spreadsheets"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.ranking.start_date_naive(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );

        let year_only = yaml.replace("\"2025-03-15\"", "\"2024\"");
        let config: Config = serde_yaml::from_str(&year_only).unwrap();
        assert_eq!(
            config.ranking.start_date_naive(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }
}
