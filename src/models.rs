use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config::Config,
    contact_pipeline::{ContactPipeline, Lexicons},
    database::DbPool,
    ranking::RankingClient,
};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// One leaderboard card from a daily snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLaunch {
    pub snapshot_date: NaiveDate,
    pub rank: i64,
    pub name: String,
    pub tagline: String,
    pub votes: i64,
    pub product_url: String,
    pub website_url: Option<String>,
    pub maker_urls: Vec<String>,
}

/// Export row shape shared by the CSV writer and the spreadsheet uploader.
#[derive(Debug, Clone, Serialize)]
pub struct LeadRow {
    pub snapshot_date: NaiveDate,
    pub rank: i64,
    pub name: String,
    pub tagline: String,
    pub votes: i64,
    pub product_url: String,
    pub website_url: String,
    pub email: String,
    pub email_source: String,
    pub social_handle: String,
    pub contact_page_url: String,
}

pub struct CliApp {
    pub config: Config,
    pub db_pool: DbPool,
    pub ranking: RankingClient,
    pub pipeline: ContactPipeline,
    pub lexicons: Arc<Lexicons>,
}
