use dialoguer::{theme::ColorfulTheme, Input};

use crate::models::{CliApp, Result};

impl CliApp {
    /// One-off extraction against an arbitrary URL, for tuning lexicons and
    /// eyeballing what a site yields before a batch run.
    pub async fn run_probe_site(&self) -> Result<()> {
        let url: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Website URL")
            .interact_text()?;

        let record = self.pipeline.extract(url.trim()).await;

        println!("\n📇 Extraction result for {}", url.trim());
        println!("   email:        {}", or_dash(&record.email));
        println!("   social:       {}", or_dash(&record.social_handle));
        println!("   contact page: {}", or_dash(&record.contact_page_url));

        Ok(())
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "—"
    } else {
        value
    }
}
