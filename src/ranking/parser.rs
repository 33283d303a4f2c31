// src/ranking/parser.rs
use crate::models::ProductLaunch;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

static CARD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-test^='post-item'], .post-item, li[data-post-id]").unwrap());
static NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-test^='post-name'], .post-name, h3 a, h3").unwrap());
static TAGLINE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-test='tagline'], .tagline, .post-tagline").unwrap());
static VOTES_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-test='vote-button'], .vote-count, .vote-button").unwrap());
static DETAIL_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href^='/posts/']").unwrap());
static MAKER_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href^='/@']").unwrap());
static WEBSITE_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[data-test='product-website']").unwrap());
static ANY_EXTERNAL_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href^='http']").unwrap());

/// Parses one leaderboard snapshot into launch cards. Cards missing a name
/// or detail link are skipped with a warning; the snapshot is best-effort.
pub fn parse_leaderboard(html: &str, base_url: &Url, snapshot_date: NaiveDate) -> Vec<ProductLaunch> {
    let document = Html::parse_document(html);
    let mut launches = Vec::new();

    for (index, card) in document.select(&CARD_SELECTOR).enumerate() {
        match parse_card(card, base_url, snapshot_date, index as i64 + 1) {
            Some(launch) => launches.push(launch),
            None => warn!("Skipping malformed leaderboard card #{}", index + 1),
        }
    }

    debug!(
        "Parsed {} launches from the {} snapshot",
        launches.len(),
        snapshot_date
    );
    launches
}

fn parse_card(
    card: ElementRef<'_>,
    base_url: &Url,
    snapshot_date: NaiveDate,
    rank: i64,
) -> Option<ProductLaunch> {
    let name = card
        .select(&NAME_SELECTOR)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())?;

    let detail_href = card
        .select(&DETAIL_LINK_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))?;
    let product_url = base_url.join(detail_href).ok()?.to_string();

    let tagline = card
        .select(&TAGLINE_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let votes = card
        .select(&VOTES_SELECTOR)
        .next()
        .map(|el| digits_in(&element_text(el)))
        .unwrap_or(0);

    let mut maker_urls = Vec::new();
    for anchor in card.select(&MAKER_LINK_SELECTOR) {
        if let Some(href) = anchor.value().attr("href") {
            if let Ok(absolute) = base_url.join(href) {
                let absolute = absolute.to_string();
                if !maker_urls.contains(&absolute) {
                    maker_urls.push(absolute);
                }
            }
        }
    }

    Some(ProductLaunch {
        snapshot_date,
        rank,
        name,
        tagline,
        votes,
        product_url,
        website_url: None,
        maker_urls,
    })
}

/// The external website link on a product detail page: the dedicated
/// website anchor when present, otherwise the first outbound "visit" link.
pub fn parse_product_website(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Some(anchor) = document.select(&WEBSITE_LINK_SELECTOR).next() {
        if let Some(href) = anchor.value().attr("href") {
            return Some(href.to_string());
        }
    }

    document
        .select(&ANY_EXTERNAL_LINK_SELECTOR)
        .find(|anchor| element_text(*anchor).to_lowercase().contains("visit"))
        .and_then(|anchor| anchor.value().attr("href").map(str::to_string))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn digits_in(text: &str) -> i64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"<html><body><main>
        <section data-test="post-item-1">
            <a data-test="post-name" href="/posts/foo-app">Foo App</a>
            <a href="/posts/foo-app"><span data-test="tagline">Ship faster</span></a>
            <button data-test="vote-button">412</button>
            <a href="/@alice">Alice</a>
            <a href="/@bob">Bob</a>
        </section>
        <section data-test="post-item-2">
            <a data-test="post-name" href="/posts/bar-tool">Bar Tool</a>
            <button data-test="vote-button">98</button>
        </section>
        <section data-test="post-item-3">
            <button data-test="vote-button">7</button>
        </section>
    </main></body></html>"#;

    fn base() -> Url {
        Url::parse("https://ranking.example/").unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    #[test]
    fn parses_cards_in_rank_order() {
        let launches = parse_leaderboard(SNAPSHOT, &base(), date());
        assert_eq!(launches.len(), 2);

        assert_eq!(launches[0].rank, 1);
        assert_eq!(launches[0].name, "Foo App");
        assert_eq!(launches[0].tagline, "Ship faster");
        assert_eq!(launches[0].votes, 412);
        assert_eq!(launches[0].product_url, "https://ranking.example/posts/foo-app");
        assert_eq!(
            launches[0].maker_urls,
            vec![
                "https://ranking.example/@alice".to_string(),
                "https://ranking.example/@bob".to_string()
            ]
        );

        assert_eq!(launches[1].rank, 2);
        assert_eq!(launches[1].votes, 98);
        assert!(launches[1].maker_urls.is_empty());
    }

    #[test]
    fn nameless_cards_are_skipped() {
        let launches = parse_leaderboard(SNAPSHOT, &base(), date());
        assert!(launches.iter().all(|l| !l.name.is_empty()));
    }

    #[test]
    fn product_website_prefers_dedicated_anchor() {
        let html = r#"<div>
            <a href="https://t.co/xyz">Visit website</a>
            <a data-test="product-website" href="https://foo.io?ref=ranking">Website</a>
        </div>"#;
        assert_eq!(
            parse_product_website(html).as_deref(),
            Some("https://foo.io?ref=ranking")
        );
    }

    #[test]
    fn product_website_falls_back_to_visit_link() {
        let html = r#"<div><a href="https://foo.io">Visit the website</a></div>"#;
        assert_eq!(parse_product_website(html).as_deref(), Some("https://foo.io"));
        assert_eq!(parse_product_website("<div>nothing here</div>"), None);
    }
}
