use chrono::Utc;
use std::time::Duration;
use tracing::{info, warn};

use crate::database;
use crate::models::{CliApp, Result};
use crate::ranking::{parse_leaderboard, parse_product_website};
use crate::scheduler::next_snapshot_date;

impl CliApp {
    /// Fetches the next unprocessed leaderboard snapshot and stores its
    /// launches, resolving each product's external website on the way.
    pub async fn run_harvest(&self) -> Result<()> {
        let today = Utc::now().date_naive();
        let last = database::last_snapshot_date(&self.db_pool).await?;
        let start = self.config.ranking.start_date_naive();

        let Some(date) = next_snapshot_date(today, last, start) else {
            info!("📭 Store is caught up; no completed snapshot left to harvest");
            return Ok(());
        };

        info!("📅 Harvesting the {} leaderboard snapshot", date);
        let html = self.ranking.fetch_leaderboard(date).await?;
        let mut launches = parse_leaderboard(&html, self.ranking.base_url(), date);
        launches.truncate(self.config.ranking.max_products_per_snapshot);

        if launches.is_empty() {
            warn!("Snapshot {} parsed to zero launches; storing nothing", date);
            return Ok(());
        }

        let total = launches.len();
        for (index, launch) in launches.iter_mut().enumerate() {
            match self.ranking.fetch_page(&launch.product_url).await {
                Ok(detail_html) => launch.website_url = parse_product_website(&detail_html),
                Err(e) => warn!("No detail page for {}: {}", launch.product_url, e),
            }

            database::upsert_launch(&self.db_pool, launch).await?;

            if (index + 1) % self.config.logging.progress_interval == 0 {
                info!("Progress: {}/{} launches stored", index + 1, total);
            }
            if index + 1 < total {
                tokio::time::sleep(Duration::from_millis(self.config.ranking.request_delay_ms))
                    .await;
            }
        }

        info!("✅ Stored {} launches from the {} snapshot", total, date);
        Ok(())
    }
}
