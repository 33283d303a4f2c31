// src/contact_pipeline/pipeline.rs
use crate::contact_pipeline::lexicon::Lexicons;
use crate::contact_pipeline::live_probes::run_live_probes;
use crate::contact_pipeline::merger::merge;
use crate::contact_pipeline::navigator::{NavigationController, NavigationOutcome, PageSession};
use crate::contact_pipeline::types::{ContactRecord, PageSnapshot};
use crate::contact_pipeline::{link_classifier, text_extractor};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// A pure extraction strategy over one captured document state.
pub type StaticStrategy = fn(&PageSnapshot, &Lexicons) -> ContactRecord;

/// Priority-ordered cascade. Each strategy only contributes fields the ones
/// before it left empty; reordering is a data change, not a control-flow
/// change.
pub const STATIC_CASCADE: &[(&str, StaticStrategy)] = &[
    ("link-classifier", link_classifier::classify),
    ("text-patterns", text_extractor::scan),
];

pub fn run_static_cascade(snapshot: &PageSnapshot, lexicons: &Lexicons) -> ContactRecord {
    let mut record = ContactRecord::empty();
    for (name, strategy) in STATIC_CASCADE {
        if record.is_complete() {
            break;
        }
        let partial = strategy(snapshot, lexicons);
        if !partial.is_empty() {
            debug!("Strategy {} contributed {:?}", name, partial);
        }
        record.fill_from(&partial);
    }
    record
}

/// Static-only extraction over already-fetched HTML. Used for first-party
/// pages (maker profiles) where no browser session is warranted.
pub fn extract_from_html(html: &str, base_url: &Url, lexicons: &Lexicons) -> ContactRecord {
    let snapshot = PageSnapshot::new(base_url.clone(), html.to_string(), visible_text_of(html));
    run_static_cascade(&snapshot, lexicons)
}

// Rough text projection for offline HTML; live passes use the browser's own
// innerText instead.
fn visible_text_of(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct ContactPipeline {
    lexicons: Arc<Lexicons>,
    navigator: NavigationController,
}

impl ContactPipeline {
    pub fn new(lexicons: Arc<Lexicons>, screenshot_dir: PathBuf) -> Self {
        let navigator = NavigationController::new(lexicons.clone(), screenshot_dir);
        Self { lexicons, navigator }
    }

    /// Extracts contact identifiers from an arbitrary external site. Never
    /// fails outward: unreachable or hostile sites yield an all-empty record
    /// so a single bad target cannot halt the enclosing batch.
    pub async fn extract(&self, target: &str) -> ContactRecord {
        info!("🔎 Extracting contacts from {}", target);

        match self.navigator.navigate(target).await {
            NavigationOutcome::Failed(kind) => {
                warn!("Navigation to {} failed ({}), returning empty record", target, kind);
                ContactRecord::empty()
            }
            NavigationOutcome::Loaded(session) => self.extract_from_session(session).await,
            NavigationOutcome::Flagged(session, flag) => {
                info!(
                    "Proceeding with best-effort extraction on {} page {}",
                    flag.classification(),
                    target
                );
                self.extract_from_session(session).await
            }
        }
    }

    async fn extract_from_session(&self, session: PageSession) -> ContactRecord {
        let initial = run_static_cascade(&session.initial, &self.lexicons);
        let mut settled = run_static_cascade(&session.settled, &self.lexicons);

        if !settled.is_complete() {
            settled = run_live_probes(
                session.page(),
                settled,
                &session.settled.base_url,
                &self.lexicons,
            )
            .await;
        }

        let merged = merge(&initial, &settled);
        session.close().await;

        info!(
            "🎯 Extraction done: email={} social={} contact_page={}",
            display_or_dash(&merged.email),
            display_or_dash(&merged.social_handle),
            display_or_dash(&merged.contact_page_url),
        );
        merged
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(html: &str, text: &str) -> PageSnapshot {
        PageSnapshot::new(
            Url::parse("https://foo.io/").unwrap(),
            html.to_string(),
            text.to_string(),
        )
    }

    #[test]
    fn synthetic_footer_page_end_to_end() {
        let html = r#"<html><body><footer>
            <a href="mailto:hello@foo.io?subject=hi">Contact</a>
            <a href="https://twitter.com/foocorp">X</a>
        </footer></body></html>"#;
        let record = run_static_cascade(&snapshot(html, "Contact X"), &Lexicons::default());

        assert_eq!(record.email, "hello@foo.io");
        assert_eq!(record.social_handle, "foocorp");
        assert_eq!(record.contact_page_url, "");
    }

    #[test]
    fn later_strategies_fill_only_missing_fields() {
        // No classifiable links at all: the text pattern stage supplies the
        // email, the link stage supplies nothing.
        let html = "<html><body><p>Reach us: hello@foo.io</p></body></html>";
        let record =
            run_static_cascade(&snapshot(html, "Reach us: hello@foo.io"), &Lexicons::default());

        assert_eq!(record.email, "hello@foo.io");
        assert_eq!(record.social_handle, "");
    }

    #[test]
    fn extract_from_html_matches_static_cascade() {
        let html = r#"<footer><a href="mailto:hello@foo.io">mail</a></footer>"#;
        let record = extract_from_html(
            html,
            &Url::parse("https://foo.io/").unwrap(),
            &Lexicons::default(),
        );
        assert_eq!(record.email, "hello@foo.io");
    }

    #[test]
    fn cascade_order_is_link_classifier_first() {
        assert_eq!(STATIC_CASCADE[0].0, "link-classifier");
        assert_eq!(STATIC_CASCADE[1].0, "text-patterns");
    }
}
