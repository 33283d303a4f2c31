// src/contact_pipeline/merger.rs
use crate::contact_pipeline::types::ContactRecord;

/// Folds the initial-load and post-scroll pass results into one record.
/// Per-field precedence: post-scroll wins when non-empty, because footer and
/// contact content frequently only renders after the scroll-triggered pass.
pub fn merge(initial: &ContactRecord, post_scroll: &ContactRecord) -> ContactRecord {
    ContactRecord {
        email: pick(&post_scroll.email, &initial.email),
        social_handle: pick(&post_scroll.social_handle, &initial.social_handle),
        contact_page_url: pick(&post_scroll.contact_page_url, &initial.contact_page_url),
    }
}

fn pick(preferred: &str, fallback: &str) -> String {
    if preferred.is_empty() {
        fallback.to_string()
    } else {
        preferred.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_scroll_value_wins_when_both_present() {
        let initial = ContactRecord {
            email: "initial@acme.com".to_string(),
            social_handle: "acme".to_string(),
            contact_page_url: String::new(),
        };
        let post_scroll = ContactRecord {
            email: "late@acme.com".to_string(),
            social_handle: "acme".to_string(),
            contact_page_url: String::new(),
        };

        let merged = merge(&initial, &post_scroll);
        assert_eq!(merged.email, "late@acme.com");
        assert_eq!(merged.social_handle, "acme");
    }

    #[test]
    fn fields_merge_independently() {
        let initial = ContactRecord {
            email: "hello@acme.com".to_string(),
            social_handle: String::new(),
            contact_page_url: String::new(),
        };
        let post_scroll = ContactRecord {
            email: String::new(),
            social_handle: "acme".to_string(),
            contact_page_url: "https://acme.com/contact".to_string(),
        };

        let merged = merge(&initial, &post_scroll);
        assert_eq!(merged.email, "hello@acme.com");
        assert_eq!(merged.social_handle, "acme");
        assert_eq!(merged.contact_page_url, "https://acme.com/contact");
    }

    #[test]
    fn merging_two_empty_records_stays_empty() {
        let merged = merge(&ContactRecord::empty(), &ContactRecord::empty());
        assert!(merged.is_empty());
    }
}
