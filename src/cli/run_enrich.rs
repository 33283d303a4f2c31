use std::time::Duration;
use tracing::info;

use crate::contact_pipeline::ContactRecord;
use crate::database;
use crate::models::{CliApp, Result};
use crate::ranking::maker::enrich_makers;

impl CliApp {
    /// Sequentially enriches pending launches: maker profiles first, then a
    /// browser pass over the product's own website. One hostile site only
    /// costs its own row — extraction never fails outward.
    pub async fn run_enrich(&self) -> Result<()> {
        let pending =
            database::pending_enrichment(&self.db_pool, self.config.enrichment.batch_limit).await?;
        if pending.is_empty() {
            info!("📭 No launches pending enrichment");
            return Ok(());
        }

        info!("🧲 Enriching {} launches", pending.len());
        for (index, launch) in pending.iter().enumerate() {
            info!(
                "[{}/{}] {} ({})",
                index + 1,
                pending.len(),
                launch.name,
                launch.website_url.as_deref().unwrap_or("no website")
            );

            let maker = enrich_makers(&self.ranking, &launch.maker_urls, &self.lexicons).await;
            let site = match &launch.website_url {
                Some(url) => self.pipeline.extract(url).await,
                None => ContactRecord::empty(),
            };

            database::record_enrichment(&self.db_pool, launch.id, &site, &maker).await?;

            // Inter-request delay with jitter: the extraction core assumes
            // it is never run concurrently against this rate budget.
            if index + 1 < pending.len() {
                let jitter = fastrand::u64(0..=1000);
                tokio::time::sleep(Duration::from_millis(
                    self.config.enrichment.rate_limit_delay_ms + jitter,
                ))
                .await;
            }
        }

        info!("🏁 Enrichment batch complete ({} launches)", pending.len());
        Ok(())
    }
}
