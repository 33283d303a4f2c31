// src/contact_pipeline/lexicon.rs
//
// Every string-matching table the extraction cascade consults lives here as
// data, not inline literals. Tables can be overridden from a versioned
// `lexicons.yml` so individual lists are testable and tunable without
// touching control flow.
use serde::{Deserialize, Serialize};
use tracing::info;

pub const LEXICON_VERSION: u32 = 1;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Lexicons {
    pub version: u32,
    /// Ordered "likely contact region" selectors, highest signal first.
    pub contact_region_selectors: Vec<String>,
    /// Social platform host tokens (matched against href hosts and text).
    pub social_domains: Vec<String>,
    /// Icon-library class names and logo asset tokens per platform.
    pub icon_tokens: Vec<String>,
    /// Lexemes marking a contact/about/support page link.
    pub contact_lexemes: Vec<String>,
    /// Email domains that are placeholders, never real contacts.
    pub deny_email_domains: Vec<String>,
    /// Local parts (with trailing @) that mark placeholder addresses.
    pub deny_local_parts: Vec<String>,
    /// File suffixes the email pattern tends to false-match (asset names).
    pub deny_email_suffixes: Vec<String>,
    /// Free consumer mail providers, deprioritized against org domains.
    pub free_mail_providers: Vec<String>,
    /// Role-account local parts in selection priority order.
    pub role_accounts: Vec<String>,
    /// Words/markers indicating an automated-traffic challenge page.
    pub challenge_signatures: Vec<String>,
    /// Words/markers indicating an outright block.
    pub block_signatures: Vec<String>,
    /// URL fragments that mark an error/interstitial location.
    pub error_url_tokens: Vec<String>,
}

impl Default for Lexicons {
    fn default() -> Self {
        Self {
            version: LEXICON_VERSION,
            contact_region_selectors: string_vec(&[
                "footer",
                "#footer",
                ".footer",
                ".site-footer",
                ".page-footer",
                ".main-footer",
                ".global-footer",
                ".app-footer",
                ".footer-links",
                ".footer-nav",
                ".footer-bottom",
                ".footer-widgets",
                ".footer-content",
                ".subfooter",
                ".bottom-bar",
                ".site-bottom",
                ".site-info",
                ".colophon",
                ".social",
                ".socials",
                ".social-links",
                ".social-media",
                ".social-icons",
                ".social-nav",
                ".sm-links",
                ".follow-us",
                ".follow",
                ".connect",
                ".contact",
                ".contact-us",
                ".contact-info",
                ".contact-section",
                ".contact-details",
                "#contact",
                "#contact-us",
                ".get-in-touch",
                ".reach-us",
                ".about",
                "#about",
                ".copyright",
                ".legal",
                ".imprint",
                ".impressum",
                "address",
                ".vcard",
                ".widget-area",
                "[class*='footer']",
                "[id*='footer']",
                "[class*='contact']",
                "[class*='social']",
            ]),
            social_domains: string_vec(&[
                "twitter.com",
                "x.com",
                "linkedin.com",
                "facebook.com",
                "instagram.com",
                "youtube.com",
                "github.com",
                "tiktok.com",
                "threads.net",
                "mastodon.social",
                "discord.gg",
                "t.me",
            ]),
            icon_tokens: string_vec(&[
                "fa-twitter",
                "fa-x-twitter",
                "fa-linkedin",
                "fa-facebook",
                "fa-instagram",
                "fa-youtube",
                "fa-github",
                "fa-tiktok",
                "fa-discord",
                "fa-telegram",
                "icon-twitter",
                "icon-linkedin",
                "icon-facebook",
                "icon-instagram",
                "icon-github",
                "twitter.svg",
                "x-logo",
                "linkedin.svg",
                "facebook.svg",
                "instagram.svg",
                "github.svg",
            ]),
            contact_lexemes: string_vec(&[
                "contact", "about", "support", "help", "get-in-touch", "getintouch", "reach",
            ]),
            deny_email_domains: string_vec(&[
                "example.com",
                "example.org",
                "example.net",
                "domain.com",
                "yourdomain.com",
                "yourcompany.com",
                "email.com",
                "mysite.com",
                "sentry.io",
                "wixpress.com",
            ]),
            deny_local_parts: string_vec(&[
                "test@",
                "demo@",
                "sample@",
                "placeholder@",
                "john.doe@",
                "jane.doe@",
                "user@",
                "username@",
                "name@",
                "email@",
                "your@",
                "noreply@",
                "no-reply@",
                "donotreply@",
            ]),
            deny_email_suffixes: string_vec(&[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"]),
            free_mail_providers: string_vec(&[
                "gmail.com",
                "yahoo.com",
                "hotmail.com",
                "outlook.com",
                "aol.com",
                "icloud.com",
                "proton.me",
                "protonmail.com",
                "gmx.com",
                "live.com",
                "msn.com",
            ]),
            role_accounts: string_vec(&["contact", "info", "hello", "support", "help"]),
            challenge_signatures: string_vec(&[
                "captcha",
                "recaptcha",
                "hcaptcha",
                "are you a robot",
                "i am not a robot",
                "human verification",
                "verify you are human",
                "just a moment",
                "attention required",
                "cf-challenge",
                "challenge-platform",
            ]),
            block_signatures: string_vec(&[
                "access denied",
                "403 forbidden",
                "error 403",
                "too many requests",
                "rate limited",
                "you have been blocked",
                "request blocked",
            ]),
            error_url_tokens: string_vec(&["/cdn-cgi/challenge", "chrome-error://", "/blocked"]),
        }
    }
}

impl Lexicons {
    /// True when any signature appears in the haystack (already lowercased).
    pub fn matches_any<'a>(
        haystack: &str,
        signatures: impl IntoIterator<Item = &'a String>,
    ) -> Option<&'a str> {
        signatures
            .into_iter()
            .find(|sig| haystack.contains(sig.as_str()))
            .map(|sig| sig.as_str())
    }
}

fn string_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Loads lexicon tables from a YAML file, falling back to the compiled-in
/// defaults when the file is absent or unreadable.
pub async fn load_lexicons(path: &str) -> Lexicons {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => match serde_yaml::from_str::<Lexicons>(&content) {
            Ok(lexicons) => {
                info!(
                    "Loaded lexicons v{} from {} ({} region selectors)",
                    lexicons.version,
                    path,
                    lexicons.contact_region_selectors.len()
                );
                lexicons
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}. Using built-in lexicons.", path, e);
                Lexicons::default()
            }
        },
        Err(_) => Lexicons::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_are_populated() {
        let lex = Lexicons::default();
        assert_eq!(lex.version, LEXICON_VERSION);
        assert!(lex.contact_region_selectors.len() >= 40);
        assert!(lex.social_domains.contains(&"twitter.com".to_string()));
        assert!(lex.deny_email_domains.contains(&"example.com".to_string()));
        // Role priority order is part of the contract, not just membership.
        assert_eq!(lex.role_accounts[0], "contact");
        assert_eq!(lex.role_accounts[1], "info");
    }

    #[test]
    fn matches_any_finds_first_signature() {
        let lex = Lexicons::default();
        let page = "please complete the recaptcha to continue";
        assert_eq!(
            Lexicons::matches_any(page, &lex.challenge_signatures),
            Some("recaptcha")
        );
        assert_eq!(Lexicons::matches_any("all fine here", &lex.challenge_signatures), None);
    }

    #[test]
    fn tables_round_trip_through_yaml() {
        let yaml = serde_yaml::to_string(&Lexicons::default()).unwrap();
        let parsed: Lexicons = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, LEXICON_VERSION);
        assert_eq!(parsed.role_accounts, Lexicons::default().role_accounts);
    }
}
