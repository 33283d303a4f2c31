// src/contact_pipeline/text_extractor.rs
use crate::contact_pipeline::lexicon::Lexicons;
use crate::contact_pipeline::link_classifier::extract_handle;
use crate::contact_pipeline::types::{ContactRecord, PageSnapshot};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").unwrap());

/// Scans rendered text and structural attributes for email-shaped and
/// social-URL-shaped substrings. Runs after the link classifier and only
/// contributes fields it left empty.
pub fn scan(snapshot: &PageSnapshot, lexicons: &Lexicons) -> ContactRecord {
    let mut record = ContactRecord::empty();

    let mut candidates = emails_in(&snapshot.text);
    if candidates.is_empty() {
        candidates = emails_in_contact_elements(&snapshot.html, lexicons);
    }
    if let Some(email) = select_email(candidates, lexicons) {
        record.email = email;
    }

    if let Some(handle) = social_from_text(snapshot, lexicons) {
        record.social_handle = handle;
    }

    record
}

/// Email-shaped matches in document-scan order, deduplicated, lowercased.
pub fn emails_in(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for m in EMAIL_REGEX.find_iter(text) {
        let email = m.as_str().to_lowercase();
        if seen.insert(email.clone()) {
            out.push(email);
        }
    }
    out
}

/// Secondary probe: email-shaped substrings inside elements whose class or
/// id carries a contact/email lexeme.
fn emails_in_contact_elements(html: &str, lexicons: &Lexicons) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("[class], [id]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for element in document.select(&selector) {
        let mut attr_names = element.value().classes().map(str::to_lowercase).collect::<Vec<_>>();
        if let Some(id) = element.value().id() {
            attr_names.push(id.to_lowercase());
        }
        let relevant = attr_names
            .iter()
            .any(|name| name.contains("contact") || name.contains("email") || name.contains("mail"));
        if !relevant {
            continue;
        }
        for email in emails_in(&element.html()) {
            if seen.insert(email.clone()) {
                out.push(email);
            }
        }
    }
    debug!("Contact-element probe found {} email candidates", out.len());
    out
}

/// Applies the deny list, then the provider/role preference rules, returning
/// the best surviving candidate. Each filtering step builds a new sequence.
pub fn select_email(candidates: Vec<String>, lexicons: &Lexicons) -> Option<String> {
    let survivors: Vec<String> = candidates
        .into_iter()
        .filter(|email| !is_denied(email, lexicons))
        .collect();
    if survivors.is_empty() {
        return None;
    }

    let organizational: Vec<&String> = survivors
        .iter()
        .filter(|email| !is_free_provider(email, lexicons))
        .collect();

    if !organizational.is_empty() {
        for role in &lexicons.role_accounts {
            let prefix = format!("{}@", role);
            if let Some(email) = organizational.iter().find(|e| e.starts_with(&prefix)) {
                return Some((*email).clone());
            }
        }
        return Some(organizational[0].clone());
    }

    Some(survivors[0].clone())
}

fn is_denied(email: &str, lexicons: &Lexicons) -> bool {
    let domain = email.rsplit('@').next().unwrap_or("");
    lexicons.deny_email_domains.iter().any(|d| domain == d.as_str())
        || lexicons.deny_local_parts.iter().any(|p| email.starts_with(p.as_str()))
        || lexicons.deny_email_suffixes.iter().any(|s| email.ends_with(s.as_str()))
}

fn is_free_provider(email: &str, lexicons: &Lexicons) -> bool {
    let domain = email.rsplit('@').next().unwrap_or("");
    lexicons.free_mail_providers.iter().any(|d| domain == d.as_str())
}

/// Social-URL-shaped substrings in visible text, then raw markup.
fn social_from_text(snapshot: &PageSnapshot, lexicons: &Lexicons) -> Option<String> {
    let pattern = social_url_pattern(lexicons)?;
    for haystack in [&snapshot.text, &snapshot.html] {
        if let Some(m) = pattern.find(haystack) {
            let handle = extract_handle(m.as_str(), &lexicons.social_domains);
            if !handle.is_empty() {
                return Some(handle);
            }
        }
    }
    None
}

fn social_url_pattern(lexicons: &Lexicons) -> Option<Regex> {
    if lexicons.social_domains.is_empty() {
        return None;
    }
    let domains = lexicons
        .social_domains
        .iter()
        .map(|d| regex::escape(d))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?:https?://)?(?:www\.)?(?:{})/[A-Za-z0-9_@./\-]+",
        domains
    ))
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn snapshot(text: &str, html: &str) -> PageSnapshot {
        PageSnapshot::new(
            Url::parse("https://acme.com/").unwrap(),
            html.to_string(),
            text.to_string(),
        )
    }

    #[test]
    fn deny_listed_placeholders_are_never_selected() {
        let lex = Lexicons::default();
        let record = scan(
            &snapshot("write to test@acme.com or admin@example.com", ""),
            &lex,
        );
        assert_eq!(record.email, "");
    }

    #[test]
    fn role_account_beats_consumer_provider() {
        let lex = Lexicons::default();
        let record = scan(
            &snapshot("someone@gmail.com is personal, contact@acme.com is the company", ""),
            &lex,
        );
        assert_eq!(record.email, "contact@acme.com");
    }

    #[test]
    fn role_priority_order_is_respected() {
        let lex = Lexicons::default();
        let picked = select_email(
            vec![
                "support@acme.com".to_string(),
                "info@acme.com".to_string(),
                "contact@acme.com".to_string(),
            ],
            &lex,
        );
        assert_eq!(picked.as_deref(), Some("contact@acme.com"));
    }

    #[test]
    fn organizational_domain_preferred_over_free_even_without_role() {
        let lex = Lexicons::default();
        let picked = select_email(
            vec!["founder@gmail.com".to_string(), "press@acme.com".to_string()],
            &lex,
        );
        assert_eq!(picked.as_deref(), Some("press@acme.com"));
    }

    #[test]
    fn free_provider_survives_when_nothing_else_does() {
        let lex = Lexicons::default();
        let picked = select_email(vec!["founder@gmail.com".to_string()], &lex);
        assert_eq!(picked.as_deref(), Some("founder@gmail.com"));
    }

    #[test]
    fn asset_names_are_not_emails() {
        let lex = Lexicons::default();
        let picked = select_email(vec!["logo@2x.png".to_string()], &lex);
        assert_eq!(picked, None);
    }

    #[test]
    fn contact_element_probe_covers_markup_only_emails() {
        let lex = Lexicons::default();
        let html = r#"<div class="contact-info"><span data-x="hello@acme.com"></span></div>"#;
        let record = scan(&snapshot("no address in body copy", html), &lex);
        assert_eq!(record.email, "hello@acme.com");
    }

    #[test]
    fn social_url_in_plain_text_yields_handle() {
        let lex = Lexicons::default();
        let record = scan(&snapshot("find us at twitter.com/foocorp today", ""), &lex);
        assert_eq!(record.social_handle, "foocorp");
    }
}
