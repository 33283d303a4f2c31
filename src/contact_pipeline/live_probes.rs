// src/contact_pipeline/live_probes.rs
//
// Progressively looser fallback probes, each executed inside the rendered
// page's own JS context so dynamically injected elements are visible to
// them. Every probe fills only fields still empty when it runs.
use crate::contact_pipeline::lexicon::Lexicons;
use crate::contact_pipeline::link_classifier::extract_handle;
use crate::contact_pipeline::text_extractor::select_email;
use crate::contact_pipeline::types::ContactRecord;
use chromiumoxide::Page;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

const EMAIL_JS_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";

pub async fn run_live_probes(
    page: &Page,
    mut record: ContactRecord,
    base_url: &Url,
    lexicons: &Lexicons,
) -> ContactRecord {
    if record.social_handle.is_empty() {
        if let Some(link) = broad_element_scan(page, lexicons).await {
            debug!("Broad element scan surfaced {}", link);
            record.social_handle = extract_handle(&link, &lexicons.social_domains);
        }
    }

    if !record.is_complete() {
        let scan = js_context_scan(page, lexicons).await;
        if record.email.is_empty() {
            record.email = select_email(scan.emails, lexicons).unwrap_or_default();
        }
        if record.social_handle.is_empty() {
            if let Some(link) = first_social_url(&scan.socials, lexicons) {
                record.social_handle = extract_handle(&link, &lexicons.social_domains);
            }
        }
    }

    if record.email.is_empty() {
        let candidates = script_content_scan(page).await;
        record.email = select_email(candidates, lexicons).unwrap_or_default();
    }

    if record.social_handle.is_empty() {
        let urls = list_structure_scan(page).await;
        if let Some(link) = first_social_url(&urls, lexicons) {
            record.social_handle = extract_handle(&link, &lexicons.social_domains);
        }
    }

    if record.email.is_empty() {
        if let Some(email) = domain_guess_probe(page, base_url, lexicons).await {
            record.email = email;
        }
    }

    record
}

/// Probe 1: any anchor/button/div/span/icon element whose markup, class, or
/// href carries a platform token; resolves through the closest ancestor
/// anchor, then the first descendant anchor.
async fn broad_element_scan(page: &Page, lexicons: &Lexicons) -> Option<String> {
    let mut tokens: Vec<String> = lexicons.social_domains.clone();
    tokens.extend(lexicons.icon_tokens.iter().cloned());
    let tokens_json = serde_json::to_string(&tokens).ok()?;

    let script = format!(
        r#"(() => {{
            const tokens = {tokens_json};
            const matches = (s) => {{
                s = (s || '').toLowerCase();
                return tokens.some(t => s.includes(t));
            }};
            const elements = document.querySelectorAll('a, button, div, span, i, svg, img');
            for (const el of elements) {{
                const cls = typeof el.className === 'string'
                    ? el.className
                    : (el.getAttribute ? (el.getAttribute('class') || '') : '');
                const href = el.getAttribute ? (el.getAttribute('href') || '') : '';
                let outer = '';
                try {{ outer = el.outerHTML.slice(0, 600); }} catch (_) {{}}
                if (!(matches(cls) || matches(href) || matches(outer))) continue;
                let link = null;
                if (el.tagName === 'A' && href) link = el;
                if (!link && el.closest) link = el.closest('a[href]');
                if (!link && el.querySelector) link = el.querySelector('a[href]');
                if (link) {{
                    const resolved = link.href || link.getAttribute('href');
                    if (resolved) return resolved;
                }}
            }}
            return null;
        }})()"#
    );

    match page.evaluate(script).await {
        Ok(value) => value.into_value::<Option<String>>().ok().flatten(),
        Err(e) => {
            warn!("Broad element scan failed: {}", e);
            None
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct JsContextScan {
    emails: Vec<String>,
    socials: Vec<String>,
}

/// Probe 2: independent re-derivation from innerText, hrefs, and
/// data-email/data-mail attributes.
async fn js_context_scan(page: &Page, lexicons: &Lexicons) -> JsContextScan {
    let domains_json = match serde_json::to_string(&lexicons.social_domains) {
        Ok(json) => json,
        Err(_) => return JsContextScan::default(),
    };

    let script = format!(
        r#"(() => {{
            const emails = [];
            const socials = [];
            const emailRe = /{email_pattern}/g;
            const text = document.body ? document.body.innerText : '';
            let m;
            while ((m = emailRe.exec(text)) !== null && emails.length < 50) emails.push(m[0]);
            const domains = {domains_json};
            for (const a of document.querySelectorAll('a[href]')) {{
                const href = a.href || a.getAttribute('href') || '';
                if (href.startsWith('mailto:')) {{
                    emails.push(href.slice(7).split('?')[0]);
                }} else if (domains.some(d => href.toLowerCase().includes(d))) {{
                    socials.push(href);
                }}
            }}
            for (const el of document.querySelectorAll('[data-email], [data-mail]')) {{
                const v = el.getAttribute('data-email') || el.getAttribute('data-mail');
                if (v) emails.push(v);
            }}
            return {{ emails, socials }};
        }})()"#,
        email_pattern = EMAIL_JS_PATTERN,
        domains_json = domains_json,
    );

    match page.evaluate(script).await {
        Ok(value) => value.into_value::<JsContextScan>().unwrap_or_default(),
        Err(e) => {
            warn!("JS context scan failed: {}", e);
            JsContextScan::default()
        }
    }
}

/// Probe 3: inline script bodies, for contact info only rendered by JS.
async fn script_content_scan(page: &Page) -> Vec<String> {
    let script = format!(
        r#"(() => {{
            const emailRe = /{email_pattern}/g;
            const found = [];
            for (const s of document.scripts) {{
                const body = s.textContent || '';
                if (!body) continue;
                let m;
                while ((m = emailRe.exec(body)) !== null && found.length < 20) found.push(m[0]);
            }}
            return found;
        }})()"#,
        email_pattern = EMAIL_JS_PATTERN,
    );

    match page.evaluate(script).await {
        Ok(value) => value.into_value::<Vec<String>>().unwrap_or_default(),
        Err(e) => {
            warn!("Script content scan failed: {}", e);
            Vec::new()
        }
    }
}

/// Probe 4: list-item anchors — common footer markup the region selectors
/// can miss.
async fn list_structure_scan(page: &Page) -> Vec<String> {
    let script = r#"(() => {
        const urls = [];
        for (const a of document.querySelectorAll('li a[href]')) {
            const href = a.href || a.getAttribute('href') || '';
            if (href) urls.push(href);
            if (urls.length >= 200) break;
        }
        return urls;
    })()"#;

    match page.evaluate(script).await {
        Ok(value) => value.into_value::<Vec<String>>().unwrap_or_default(),
        Err(e) => {
            warn!("List structure scan failed: {}", e);
            Vec::new()
        }
    }
}

/// Probe 5: role@domain guesses, accepted only when the literal address is
/// corroborated verbatim by the page's visible text.
async fn domain_guess_probe(page: &Page, base_url: &Url, lexicons: &Lexicons) -> Option<String> {
    let host = base_url.host_str()?;
    let domain = registrable_domain(host);
    let text = match page
        .evaluate("document.body ? document.body.innerText : ''")
        .await
    {
        Ok(value) => value.into_value::<String>().unwrap_or_default(),
        Err(e) => {
            warn!("Domain-guess text fetch failed: {}", e);
            return None;
        }
    };

    guess_email_in_text(&text, &domain, lexicons)
}

pub fn guess_email_in_text(text: &str, domain: &str, lexicons: &Lexicons) -> Option<String> {
    for role in &lexicons.role_accounts {
        let candidate = format!("{}@{}", role, domain);
        if text.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}

pub fn first_social_url(urls: &[String], lexicons: &Lexicons) -> Option<String> {
    urls.iter()
        .find(|url| {
            let lowered = url.to_lowercase();
            lexicons
                .social_domains
                .iter()
                .any(|d| lowered.contains(d.as_str()))
        })
        .cloned()
}

/// Small common-suffix heuristic, deliberately not a public-suffix lookup:
/// the verbatim-corroboration rule above bounds the cost of a wrong split.
pub fn registrable_domain(host: &str) -> String {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host.to_string();
    }
    const COMMON_SECOND_LEVEL: [&str; 7] = ["co", "com", "net", "org", "gov", "edu", "ac"];
    let second_last = labels[labels.len() - 2];
    let last = labels[labels.len() - 1];
    let keep = if COMMON_SECOND_LEVEL.contains(&second_last) && last.len() <= 3 {
        3
    } else {
        2
    };
    labels[labels.len() - keep..].join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registrable_domain_handles_common_shapes() {
        assert_eq!(registrable_domain("www.foo.io"), "foo.io");
        assert_eq!(registrable_domain("app.foo.io"), "foo.io");
        assert_eq!(registrable_domain("foo.co.uk"), "foo.co.uk");
        assert_eq!(registrable_domain("blog.foo.co.uk"), "foo.co.uk");
        assert_eq!(registrable_domain("localhost"), "localhost");
    }

    #[test]
    fn domain_guess_requires_verbatim_corroboration() {
        let lexicons = Lexicons::default();
        assert_eq!(
            guess_email_in_text("write to hello@foo.io for access", "foo.io", &lexicons),
            Some("hello@foo.io".to_string())
        );
        // Same roles, different domain in the copy: no guess is accepted.
        assert_eq!(
            guess_email_in_text("write to hello@bar.io for access", "foo.io", &lexicons),
            None
        );
        assert_eq!(guess_email_in_text("", "foo.io", &lexicons), None);
    }

    #[test]
    fn domain_guess_respects_role_priority() {
        let lexicons = Lexicons::default();
        let text = "help@foo.io or contact@foo.io";
        assert_eq!(
            guess_email_in_text(text, "foo.io", &lexicons),
            Some("contact@foo.io".to_string())
        );
    }

    #[test]
    fn first_social_url_filters_by_domain_membership() {
        let lexicons = Lexicons::default();
        let urls = vec![
            "https://foo.io/pricing".to_string(),
            "https://github.com/foocorp".to_string(),
        ];
        assert_eq!(
            first_social_url(&urls, &lexicons),
            Some("https://github.com/foocorp".to_string())
        );
        assert_eq!(first_social_url(&["https://foo.io".to_string()], &lexicons), None);
    }
}
