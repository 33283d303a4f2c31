// src/contact_pipeline/types.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Per-site extraction output. Empty string means "not found" — fields are
/// independently optional and never None.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub email: String,
    pub social_handle: String,
    pub contact_page_url: String,
}

impl ContactRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.social_handle.is_empty() && self.contact_page_url.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.social_handle.is_empty() && !self.contact_page_url.is_empty()
    }

    /// Copies non-empty fields from `other` into fields still empty here.
    /// Values already present are never overwritten.
    pub fn fill_from(&mut self, other: &ContactRecord) {
        if self.email.is_empty() && !other.email.is_empty() {
            self.email = other.email.clone();
        }
        if self.social_handle.is_empty() && !other.social_handle.is_empty() {
            self.social_handle = other.social_handle.clone();
        }
        if self.contact_page_url.is_empty() && !other.contact_page_url.is_empty() {
            self.contact_page_url = other.contact_page_url.clone();
        }
    }
}

/// Captured document state for one extraction pass. Owned by a single
/// extraction attempt and discarded with it.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub base_url: Url,
    pub html: String,
    pub text: String,
}

impl PageSnapshot {
    pub fn new(base_url: Url, html: String, text: String) -> Self {
        Self { base_url, html, text }
    }
}

/// Anchor-like element pulled out of the document, consumed immediately by
/// the link classifier.
#[derive(Debug, Clone)]
pub struct CandidateLink {
    pub href: String,
    pub visible_text: String,
    pub markup: String,
}

/// Non-fatal signal attached to an otherwise-successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFlag {
    Challenge(String),
    Blocked(String),
}

impl PageFlag {
    pub fn classification(&self) -> &'static str {
        match self {
            PageFlag::Challenge(_) => "challenge",
            PageFlag::Blocked(_) => "blocked",
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            PageFlag::Challenge(reason) | PageFlag::Blocked(reason) => reason,
        }
    }
}

/// Navigation failure taxonomy. Classified structurally where chromiumoxide
/// exposes structured errors, from `net::ERR_*` message text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavErrorKind {
    #[error("invalid target url")]
    InvalidUrl,
    #[error("navigation timed out")]
    NavigationTimeout,
    #[error("connection refused")]
    ConnectionRefused,
    #[error("dns resolution failed")]
    DnsError,
    #[error("certificate error")]
    CertificateError,
    #[error("navigation aborted")]
    Aborted,
    #[error("transport error: {0}")]
    UnknownTransport(String),
}

impl NavErrorKind {
    pub fn classification(&self) -> &'static str {
        match self {
            NavErrorKind::InvalidUrl => "invalid-url",
            NavErrorKind::NavigationTimeout => "timeout",
            NavErrorKind::ConnectionRefused => "connection-refused",
            NavErrorKind::DnsError => "dns",
            NavErrorKind::CertificateError => "certificate",
            NavErrorKind::Aborted => "aborted",
            NavErrorKind::UnknownTransport(_) => "transport",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_from_only_touches_empty_fields() {
        let mut record = ContactRecord {
            email: "contact@acme.com".to_string(),
            social_handle: String::new(),
            contact_page_url: String::new(),
        };
        let other = ContactRecord {
            email: "other@acme.com".to_string(),
            social_handle: "acme".to_string(),
            contact_page_url: "https://acme.com/contact".to_string(),
        };

        record.fill_from(&other);

        assert_eq!(record.email, "contact@acme.com");
        assert_eq!(record.social_handle, "acme");
        assert_eq!(record.contact_page_url, "https://acme.com/contact");
    }

    #[test]
    fn empty_record_reports_empty() {
        assert!(ContactRecord::empty().is_empty());
        assert!(!ContactRecord::empty().is_complete());
    }
}
