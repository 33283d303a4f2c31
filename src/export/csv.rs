// src/export/csv.rs
use crate::models::{LeadRow, Result};
use std::io::Write;
use tracing::info;

pub struct LeadCsvExporter;

impl LeadCsvExporter {
    pub fn new() -> Self {
        Self
    }

    /// One header row, one row per launch; empty string for "not found".
    pub async fn export(&self, rows: &[LeadRow], filename: &str) -> Result<()> {
        if let Some(parent) = std::path::Path::new(filename).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::File::create(filename)?;

        writeln!(
            file,
            "snapshot_date,rank,name,tagline,votes,product_url,website_url,email,email_source,social_handle,contact_page_url"
        )?;

        for row in rows {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{},{},{},{}",
                row.snapshot_date,
                row.rank,
                csv_field(&row.name),
                csv_field(&row.tagline),
                row.votes,
                csv_field(&row.product_url),
                csv_field(&row.website_url),
                csv_field(&row.email),
                csv_field(&row.email_source),
                csv_field(&row.social_handle),
                csv_field(&row.contact_page_url),
            )?;
        }

        info!("📤 Exported {} leads to {}", rows.len(), filename);
        Ok(())
    }
}

/// Quotes a field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(csv_field("hello@foo.io"), "hello@foo.io");
        assert_eq!(csv_field(""), "");
    }

    #[test]
    fn delimiters_and_quotes_are_escaped() {
        assert_eq!(csv_field("Ship, faster"), "\"Ship, faster\"");
        assert_eq!(csv_field("the \"best\" app"), "\"the \"\"best\"\" app\"");
        assert_eq!(csv_field("a\nb"), "\"a\nb\"");
    }
}
