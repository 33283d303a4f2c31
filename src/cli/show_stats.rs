use crate::database;
use crate::models::{CliApp, Result};

impl CliApp {
    pub async fn show_stats(&self) -> Result<()> {
        let stats = database::store_stats(&self.db_pool).await?;

        println!("\n📊 Store statistics");
        println!("───────────────────────────────");
        println!("   snapshots harvested: {}", stats.snapshots);
        println!("   launches stored:     {}", stats.total_launches);
        println!("   enriched:            {}", stats.enriched);
        println!("   with email:          {}", stats.with_email);
        println!("   with social handle:  {}", stats.with_social);

        Ok(())
    }
}
