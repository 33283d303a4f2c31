// src/export/sheets.rs
use crate::config::SpreadsheetConfig;
use crate::models::{LeadRow, Result};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, info};

const TOKEN_ENV_VAR: &str = "SHEETS_ACCESS_TOKEN";

/// Best-effort append of exported rows to a remote spreadsheet. Callers log
/// and swallow failures; a broken upload never breaks the local export.
pub struct SheetsUploader {
    config: SpreadsheetConfig,
    client: Client,
}

impl SheetsUploader {
    pub fn new(config: SpreadsheetConfig) -> Self {
        Self { config, client: Client::new() }
    }

    pub async fn append_rows(&self, rows: &[LeadRow]) -> Result<usize> {
        let token = std::env::var(TOKEN_ENV_VAR)
            .map_err(|_| format!("{} is not set", TOKEN_ENV_VAR))?;

        let url = format!(
            "{}/{}/values/{}:append?valueInputOption=RAW",
            self.config.api_base.trim_end_matches('/'),
            self.config.spreadsheet_id,
            self.config.worksheet,
        );

        let values: Vec<Vec<String>> = rows.iter().map(row_values).collect();
        let body = json!({ "values": values });

        debug!("Appending {} rows to spreadsheet {}", rows.len(), self.config.spreadsheet_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            info!("📋 Appended {} rows to the remote spreadsheet", rows.len());
            Ok(rows.len())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Spreadsheet API error {}: {}", status, error_text);
            Err(format!("spreadsheet append failed with {}", status).into())
        }
    }
}

fn row_values(row: &LeadRow) -> Vec<String> {
    vec![
        row.snapshot_date.to_string(),
        row.rank.to_string(),
        row.name.clone(),
        row.tagline.clone(),
        row.votes.to_string(),
        row.product_url.clone(),
        row.website_url.clone(),
        row.email.clone(),
        row.email_source.clone(),
        row.social_handle.clone(),
        row.contact_page_url.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn row_values_align_with_csv_columns() {
        let row = LeadRow {
            snapshot_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            rank: 3,
            name: "Foo App".to_string(),
            tagline: "Ship faster".to_string(),
            votes: 412,
            product_url: "https://ranking.example/posts/foo-app".to_string(),
            website_url: "https://foo.io".to_string(),
            email: "hello@foo.io".to_string(),
            email_source: "website".to_string(),
            social_handle: "foocorp".to_string(),
            contact_page_url: String::new(),
        };
        let values = row_values(&row);
        assert_eq!(values.len(), 11);
        assert_eq!(values[0], "2025-07-01");
        assert_eq!(values[7], "hello@foo.io");
        assert_eq!(values[10], "");
    }
}
