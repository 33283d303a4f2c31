use chrono::Utc;
use tracing::{info, warn};

use crate::database;
use crate::export::{LeadCsvExporter, SheetsUploader};
use crate::models::{CliApp, Result};

impl CliApp {
    pub async fn run_export(&self) -> Result<()> {
        let rows = database::export_rows(&self.db_pool).await?;
        if rows.is_empty() {
            info!("📭 Nothing to export yet");
            return Ok(());
        }

        let filename = format!(
            "{}/leads-{}.csv",
            self.config.output.directory,
            Utc::now().format("%Y%m%d")
        );
        LeadCsvExporter::new().export(&rows, &filename).await?;

        if self.config.spreadsheet.enabled {
            let uploader = SheetsUploader::new(self.config.spreadsheet.clone());
            // Upload is best-effort; the CSV on disk is the durable export.
            if let Err(e) = uploader.append_rows(&rows).await {
                warn!("Spreadsheet upload skipped: {}", e);
            }
        }

        Ok(())
    }
}
