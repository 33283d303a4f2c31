// src/ranking/maker.rs
use crate::contact_pipeline::{extract_from_html, ContactRecord, Lexicons};
use crate::ranking::fetcher::RankingClient;
use tracing::{debug, warn};
use url::Url;

/// Contact identifiers from a maker's public profile page. First-party
/// pages render server-side, so the core's static passes over plain HTTP
/// are enough — no browser session. Failures degrade to an empty record.
pub async fn enrich_maker(
    client: &RankingClient,
    profile_url: &str,
    lexicons: &Lexicons,
) -> ContactRecord {
    let base_url = match Url::parse(profile_url) {
        Ok(url) => url,
        Err(e) => {
            warn!("Skipping maker profile with bad URL {}: {}", profile_url, e);
            return ContactRecord::empty();
        }
    };

    let html = match client.fetch_page(profile_url).await {
        Ok(html) => html,
        Err(e) => {
            warn!("Could not fetch maker profile {}: {}", profile_url, e);
            return ContactRecord::empty();
        }
    };

    let record = extract_from_html(&html, &base_url, lexicons);
    debug!(
        "Maker profile {} yielded email={} social={}",
        profile_url,
        if record.email.is_empty() { "-" } else { &record.email },
        if record.social_handle.is_empty() { "-" } else { &record.social_handle },
    );
    record
}

/// Walks maker profiles in listing order, filling fields that are still
/// empty; stops as soon as the record is complete.
pub async fn enrich_makers(
    client: &RankingClient,
    profile_urls: &[String],
    lexicons: &Lexicons,
) -> ContactRecord {
    let mut combined = ContactRecord::empty();
    for profile_url in profile_urls {
        if combined.is_complete() {
            break;
        }
        let record = enrich_maker(client, profile_url, lexicons).await;
        combined.fill_from(&record);
    }
    combined
}
