// src/ranking/fetcher.rs
use crate::models::Result;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

const RANKING_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Plain HTTP client for the ranking site's own pages (leaderboards,
/// product detail pages, maker profiles). No browser session needed here.
pub struct RankingClient {
    client: Client,
    base_url: Url,
}

impl RankingClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(RANKING_USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        let base_url = Url::parse(base_url)?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Daily leaderboard snapshot for one completed day.
    pub async fn fetch_leaderboard(&self, date: NaiveDate) -> Result<String> {
        let path = format!(
            "leaderboard/daily/{}/{}/{}",
            date.year(),
            date.month(),
            date.day()
        );
        let url = self.base_url.join(&path)?;
        self.fetch_page(url.as_str()).await
    }

    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!("Fetching: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(format!("HTTP error {} for {}", response.status(), url).into());
        }

        let html = response.text().await?;
        debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }
}
