use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::contact_pipeline::{load_lexicons, ContactPipeline};
use crate::database::DbPool;
use crate::models::CliApp;
use crate::ranking::RankingClient;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone)]
pub enum MenuAction {
    HarvestSnapshot,
    EnrichLaunches,
    ExportLeads,
    ProbeSingleSite,
    ShowStats,
    Exit,
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuAction::HarvestSnapshot => {
                write!(f, "📅 Harvest: fetch the next leaderboard snapshot")
            }
            MenuAction::EnrichLaunches => {
                write!(f, "🧲 Enrich: extract contacts for pending launches")
            }
            MenuAction::ExportLeads => write!(f, "📤 Export leads to CSV (and spreadsheet)"),
            MenuAction::ProbeSingleSite => write!(f, "🔎 Probe a single website for contacts"),
            MenuAction::ShowStats => write!(f, "📊 Show store statistics"),
            MenuAction::Exit => write!(f, "🚪 Exit"),
        }
    }
}

impl CliApp {
    pub async fn new(config: Config, db_pool: DbPool) -> Result<Self> {
        let ranking = RankingClient::new(&config.ranking.base_url)?;

        info!("Loading extraction lexicons...");
        let lexicons = Arc::new(load_lexicons(&config.enrichment.lexicons_path).await);

        let screenshot_dir = PathBuf::from(config.output.screenshot_dir());
        tokio::fs::create_dir_all(&screenshot_dir).await?;
        let pipeline = ContactPipeline::new(lexicons.clone(), screenshot_dir);

        Ok(Self {
            config,
            db_pool,
            ranking,
            pipeline,
            lexicons,
        })
    }
}
