// src/contact_pipeline/link_classifier.rs
use crate::contact_pipeline::lexicon::Lexicons;
use crate::contact_pipeline::types::{CandidateLink, ContactRecord, PageSnapshot};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Classifies anchors in likely contact regions into email / social handle /
/// contact-page fields. Deterministic and pure given the document.
pub fn classify(snapshot: &PageSnapshot, lexicons: &Lexicons) -> ContactRecord {
    let document = Html::parse_document(&snapshot.html);
    let links = collect_candidate_links(&document, lexicons);
    debug!(
        "Link classifier considering {} anchors on {}",
        links.len(),
        snapshot.base_url
    );
    classify_links(&links, &snapshot.base_url, lexicons)
}

/// Anchors nested in any matching contact region, in document order, without
/// duplication. Falls back to every anchor in the document when no region
/// selector matches anything.
fn collect_candidate_links(document: &Html, lexicons: &Lexicons) -> Vec<CandidateLink> {
    let mut links = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for selector_text in &lexicons.contact_region_selectors {
        let Ok(selector) = Selector::parse(selector_text) else {
            continue;
        };
        for region in document.select(&selector) {
            for anchor in region.select(&ANCHOR_SELECTOR) {
                push_candidate(&mut links, &mut seen, anchor);
            }
        }
    }

    if links.is_empty() {
        for anchor in document.select(&ANCHOR_SELECTOR) {
            push_candidate(&mut links, &mut seen, anchor);
        }
    }

    links
}

fn push_candidate(
    links: &mut Vec<CandidateLink>,
    seen: &mut HashSet<(String, String)>,
    anchor: scraper::ElementRef<'_>,
) {
    let Some(href) = anchor.value().attr("href") else {
        return;
    };
    let visible_text = anchor
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let key = (href.to_string(), visible_text.clone());
    if seen.insert(key) {
        links.push(CandidateLink {
            href: href.to_string(),
            visible_text,
            markup: anchor.html(),
        });
    }
}

/// First match wins per field; each field is claimed at most once per pass.
fn classify_links(links: &[CandidateLink], base_url: &Url, lexicons: &Lexicons) -> ContactRecord {
    let mut record = ContactRecord::empty();

    for link in links {
        let href = link.href.trim();
        let href_lower = href.to_lowercase();
        let text_lower = link.visible_text.to_lowercase();
        let markup_lower = link.markup.to_lowercase();

        if record.email.is_empty() {
            if let Some(email) = email_from_mailto(href) {
                record.email = email;
            }
        }

        let is_social = is_social_link(&href_lower, &text_lower, &markup_lower, lexicons);
        if record.social_handle.is_empty() && is_social {
            record.social_handle = extract_handle(href, &lexicons.social_domains);
        }

        if record.contact_page_url.is_empty()
            && !is_social
            && is_contact_page_link(&href_lower, &text_lower, lexicons)
        {
            if let Some(absolute) = resolve_contact_url(href, base_url) {
                record.contact_page_url = absolute;
            }
        }

        if record.is_complete() {
            break;
        }
    }

    record
}

fn email_from_mailto(href: &str) -> Option<String> {
    let rest = href.strip_prefix("mailto:")?;
    let email = rest.split('?').next().unwrap_or("").trim();
    if email.is_empty() {
        None
    } else {
        Some(email.to_lowercase())
    }
}

fn is_social_link(href: &str, text: &str, markup: &str, lexicons: &Lexicons) -> bool {
    let domain_hit = lexicons
        .social_domains
        .iter()
        .any(|domain| href.contains(domain.as_str()) || text.contains(domain.as_str()));
    let icon_hit = lexicons
        .icon_tokens
        .iter()
        .any(|token| markup.contains(token.as_str()));
    domain_hit || icon_hit
}

fn is_contact_page_link(href: &str, text: &str, lexicons: &Lexicons) -> bool {
    if href.starts_with("mailto:") || href.starts_with("tel:") || href.starts_with("javascript:") {
        return false;
    }
    let path = href.split('?').next().unwrap_or(href);
    lexicons
        .contact_lexemes
        .iter()
        .any(|lexeme| path.contains(lexeme.as_str()) || text.contains(lexeme.as_str()))
}

fn resolve_contact_url(href: &str, base_url: &Url) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    base_url.join(href).ok().map(|u| u.to_string())
}

/// Reduces a social URL to a bare handle when that is unambiguous; keeps the
/// full URL otherwise so ambiguous cases stay traceable.
pub fn extract_handle(raw_url: &str, social_domains: &[String]) -> String {
    let lowered = raw_url.to_lowercase();
    if !social_domains.iter().any(|d| lowered.contains(d.as_str())) {
        return raw_url.to_string();
    }

    let stripped = raw_url
        .split('?')
        .next()
        .unwrap_or(raw_url)
        .split('#')
        .next()
        .unwrap_or(raw_url)
        .trim_end_matches('/');

    let last_segment = stripped.rsplit('/').next().unwrap_or("");
    let handle = last_segment.trim_start_matches('@');

    if handle.is_empty() || handle.contains('.') {
        return raw_url.to_string();
    }
    let is_bare_domain = social_domains
        .iter()
        .any(|d| handle == d.as_str() || d.split('.').next() == Some(handle));
    if is_bare_domain {
        return raw_url.to_string();
    }

    handle.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(html: &str) -> PageSnapshot {
        PageSnapshot::new(Url::parse("https://foo.io/").unwrap(), html.to_string(), String::new())
    }

    #[test]
    fn mailto_query_suffix_is_stripped() {
        let snap = snapshot(
            r#"<footer><a href="mailto:hello@foo.io?subject=hi">Contact</a></footer>"#,
        );
        let record = classify(&snap, &Lexicons::default());
        assert_eq!(record.email, "hello@foo.io");
    }

    #[test]
    fn footer_anchors_yield_email_and_handle() {
        let snap = snapshot(
            r#"<footer>
                <a href="mailto:hello@foo.io?subject=hi">Contact</a>
                <a href="https://twitter.com/foocorp">X</a>
            </footer>"#,
        );
        let record = classify(&snap, &Lexicons::default());
        assert_eq!(record.email, "hello@foo.io");
        assert_eq!(record.social_handle, "foocorp");
        assert_eq!(record.contact_page_url, "");
    }

    #[test]
    fn falls_back_to_whole_document_when_no_region_matches() {
        let snap = snapshot(
            r#"<main><p>hi</p><a href="https://linkedin.com/company/acme">follow</a></main>"#,
        );
        let record = classify(&snap, &Lexicons::default());
        assert_eq!(record.social_handle, "acme");
    }

    #[test]
    fn relative_contact_path_resolves_against_origin() {
        let snap = snapshot(r#"<footer><a href="/contact">Get in touch</a></footer>"#);
        let record = classify(&snap, &Lexicons::default());
        assert_eq!(record.contact_page_url, "https://foo.io/contact");
    }

    #[test]
    fn social_anchor_does_not_claim_contact_page() {
        let snap = snapshot(
            r#"<footer><a href="https://twitter.com/foocorp">contact us on X</a></footer>"#,
        );
        let record = classify(&snap, &Lexicons::default());
        assert_eq!(record.social_handle, "foocorp");
        assert_eq!(record.contact_page_url, "");
    }

    #[test]
    fn icon_class_marks_anchor_as_social() {
        let snap = snapshot(
            r#"<div class="social-icons"><a href="https://x.com/acme"><i class="fa-x-twitter"></i></a></div>"#,
        );
        let record = classify(&snap, &Lexicons::default());
        assert_eq!(record.social_handle, "acme");
    }

    #[test]
    fn handle_extraction_keeps_ambiguous_urls() {
        let domains = Lexicons::default().social_domains;
        assert_eq!(extract_handle("https://twitter.com/foocorp", &domains), "foocorp");
        assert_eq!(
            extract_handle("https://twitter.com/foocorp/?lang=en", &domains),
            "foocorp"
        );
        assert_eq!(extract_handle("https://threads.net/@acme", &domains), "acme");
        // Bare domain and dotted segments are not handles.
        assert_eq!(
            extract_handle("https://twitter.com/", &domains),
            "https://twitter.com/"
        );
        assert_eq!(
            extract_handle("https://x.com/intent/post?text=a", &domains),
            "post"
        );
        assert_eq!(
            extract_handle("https://linkedin.com/company/acme.io", &domains),
            "https://linkedin.com/company/acme.io"
        );
        // Non-social URLs pass through untouched.
        assert_eq!(
            extract_handle("https://foo.io/team", &domains),
            "https://foo.io/team"
        );
    }
}
