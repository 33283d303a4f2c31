use dialoguer::{theme::ColorfulTheme, Select};

use crate::{
    cli::cli::MenuAction,
    models::{CliApp, Result},
};
use tracing::error;

impl CliApp {
    pub async fn run(&self) -> Result<()> {
        println!("\n🚀 Welcome to Launch Scraper!");
        println!("═══════════════════════════════════════");

        self.show_stats().await?;

        loop {
            let actions = vec![
                MenuAction::HarvestSnapshot,
                MenuAction::EnrichLaunches,
                MenuAction::ExportLeads,
                MenuAction::ProbeSingleSite,
                MenuAction::ShowStats,
                MenuAction::Exit,
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("\nSelect an action")
                .default(0)
                .items(&actions)
                .interact()?;

            match &actions[selection] {
                MenuAction::HarvestSnapshot => {
                    if let Err(e) = self.run_harvest().await {
                        error!("Harvest failed: {}", e);
                    }
                }
                MenuAction::EnrichLaunches => {
                    if let Err(e) = self.run_enrich().await {
                        error!("Enrichment failed: {}", e);
                    }
                }
                MenuAction::ExportLeads => {
                    if let Err(e) = self.run_export().await {
                        error!("Export failed: {}", e);
                    }
                }
                MenuAction::ProbeSingleSite => {
                    if let Err(e) = self.run_probe_site().await {
                        error!("Site probe failed: {}", e);
                    }
                }
                MenuAction::ShowStats => {
                    if let Err(e) = self.show_stats().await {
                        error!("Failed to show stats: {}", e);
                    }
                }
                MenuAction::Exit => {
                    println!("\n👋 Thanks for using Launch Scraper!");
                    break;
                }
            }
        }

        Ok(())
    }
}
