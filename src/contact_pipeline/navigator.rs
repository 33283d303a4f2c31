// src/contact_pipeline/navigator.rs
use crate::contact_pipeline::lexicon::Lexicons;
use crate::contact_pipeline::types::{NavErrorKind, PageFlag, PageSnapshot};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const NAV_ATTEMPTS: u32 = 3;
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(45);
const OVERALL_TIMEOUT: Duration = Duration::from_secs(60);
const RETRY_PAUSE: Duration = Duration::from_secs(2);
const SETTLE_DELAY: Duration = Duration::from_millis(1500);

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const VIEWPORT: (u32, u32) = (1366, 768);

/// Result of driving a browser session to a target URL. A challenged or
/// blocked page still carries a session: partial contact data is often still
/// present, so extraction proceeds and the flag is diagnostic.
pub enum NavigationOutcome {
    Loaded(PageSession),
    Flagged(PageSession, PageFlag),
    Failed(NavErrorKind),
}

/// One fully-loaded browser session plus the two captured document states.
/// Owns the browser exclusively; `close` must run on every exit path (the
/// child process is also killed if the session is dropped mid-flight).
pub struct PageSession {
    browser: Browser,
    page: Page,
    pub initial: PageSnapshot,
    pub settled: PageSnapshot,
}

impl PageSession {
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub async fn close(self) {
        close_browser(self.browser).await;
    }
}

pub struct NavigationController {
    lexicons: Arc<Lexicons>,
    screenshot_dir: PathBuf,
}

impl NavigationController {
    pub fn new(lexicons: Arc<Lexicons>, screenshot_dir: PathBuf) -> Self {
        Self { lexicons, screenshot_dir }
    }

    /// Drives a fresh browser session to `target`. Sessions are never reused
    /// across calls, which isolates cookie and identity state per site.
    pub async fn navigate(&self, target: &str) -> NavigationOutcome {
        let url = match validate_target(target) {
            Ok(url) => url,
            Err(kind) => return NavigationOutcome::Failed(kind),
        };

        // Hard outer race: whichever side settles first wins. The losing
        // navigation is abandoned, not transport-cancelled; dropping the
        // session kills the browser child process.
        match tokio::time::timeout(OVERALL_TIMEOUT, self.drive(&url)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("⏱️  Hard {}s budget exhausted for {}", OVERALL_TIMEOUT.as_secs(), target);
                NavigationOutcome::Failed(NavErrorKind::NavigationTimeout)
            }
        }
    }

    async fn drive(&self, url: &Url) -> NavigationOutcome {
        let (browser, page) = match open_session().await {
            Ok(session) => session,
            Err(kind) => return NavigationOutcome::Failed(kind),
        };

        let mut last_error = NavErrorKind::UnknownTransport("no attempt completed".to_string());
        let mut loaded = false;

        for attempt in 1..=NAV_ATTEMPTS {
            debug!("Navigation attempt {}/{} for {}", attempt, NAV_ATTEMPTS, url);
            match tokio::time::timeout(ATTEMPT_TIMEOUT, attempt_navigation(&page, url, attempt))
                .await
            {
                Ok(Ok(())) => {
                    loaded = true;
                    break;
                }
                Ok(Err(kind)) => {
                    warn!("Attempt {} for {} failed: {}", attempt, url, kind);
                    last_error = kind;
                }
                Err(_) => {
                    warn!("Attempt {} for {} hit the {}s ceiling", attempt, url, ATTEMPT_TIMEOUT.as_secs());
                    last_error = NavErrorKind::NavigationTimeout;
                }
            }
            if attempt < NAV_ATTEMPTS {
                tokio::time::sleep(RETRY_PAUSE).await;
            }
        }

        if !loaded {
            self.capture_diagnostic(&page, url, last_error.classification()).await;
            close_browser(browser).await;
            return NavigationOutcome::Failed(last_error);
        }

        tokio::time::sleep(SETTLE_DELAY).await;
        let initial = capture_snapshot(&page, url).await;

        let flag = detect_flag(&initial, &self.lexicons);
        if let Some(flag) = &flag {
            info!(
                "🚧 {} signature \"{}\" on {} — extracting anyway",
                flag.classification(),
                flag.reason(),
                url
            );
            self.capture_diagnostic(&page, url, flag.classification()).await;
        }

        // Footer content frequently lazy-loads; scroll to the end and let the
        // page settle before the second capture.
        scroll_to_end(&page).await;
        tokio::time::sleep(SETTLE_DELAY).await;
        let settled = capture_snapshot(&page, url).await;

        let session = PageSession { browser, page, initial, settled };
        match flag {
            Some(flag) => NavigationOutcome::Flagged(session, flag),
            None => NavigationOutcome::Loaded(session),
        }
    }

    /// Best-effort screenshot named by hostname and classification. Its own
    /// failure is logged and swallowed, never escalated.
    async fn capture_diagnostic(&self, page: &Page, url: &Url, classification: &str) {
        let host = url.host_str().unwrap_or("unknown-host");
        let path = self.screenshot_dir.join(format!("{}-{}.jpg", host, classification));

        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(80)
            .build();
        match page.screenshot(params).await {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::write(&path, bytes).await {
                    warn!("Could not write screenshot {}: {}", path.display(), e);
                } else {
                    debug!("Saved diagnostic screenshot {}", path.display());
                }
            }
            Err(e) => warn!("Screenshot capture failed for {}: {}", url, e),
        }
    }
}

/// The target must already be a syntactically valid absolute http(s) URL;
/// anything else fails fast without opening a session.
pub fn validate_target(target: &str) -> Result<Url, NavErrorKind> {
    let url = Url::parse(target).map_err(|_| NavErrorKind::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(NavErrorKind::InvalidUrl);
    }
    Ok(url)
}

async fn open_session() -> Result<(Browser, Page), NavErrorKind> {
    let config = BrowserConfig::builder()
        .no_sandbox()
        .window_size(VIEWPORT.0, VIEWPORT.1)
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--lang=en-US")
        .build()
        .map_err(NavErrorKind::UnknownTransport)?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| classify_cdp_error(&e))?;
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            let _ = event;
        }
    });

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| classify_cdp_error(&e))?;

    // Realistic client identity. This trims trivial bot-detection false
    // positives; it is a heuristic, not a bypass, so failure is non-fatal.
    match SetUserAgentOverrideParams::builder()
        .user_agent(USER_AGENT)
        .accept_language(ACCEPT_LANGUAGE)
        .build()
    {
        Ok(identity) => {
            if let Err(e) = page.set_user_agent(identity).await {
                warn!("Could not set client identity: {}", e);
            }
        }
        Err(e) => warn!("Could not build client identity: {}", e),
    }

    Ok((browser, page))
}

async fn close_browser(mut browser: Browser) {
    if let Err(e) = browser.close().await {
        debug!("Browser close reported: {}", e);
    }
    let _ = browser.wait().await;
}

/// One navigation attempt with the completion criterion for that round:
/// strict network quiescence, loose quiescence, then bare DOM readiness.
async fn attempt_navigation(page: &Page, url: &Url, attempt: u32) -> Result<(), NavErrorKind> {
    page.goto(url.as_str())
        .await
        .map_err(|e| classify_cdp_error(&e))?;
    page.wait_for_navigation()
        .await
        .map_err(|e| classify_cdp_error(&e))?;

    match attempt {
        1 => wait_for_quiescence(page, Duration::from_secs(30), 1200).await,
        2 => wait_for_quiescence(page, Duration::from_secs(15), 500).await,
        _ => wait_for_dom_ready(page, Duration::from_secs(10)).await,
    }
}

/// JS polling heuristic: the resource count must hold still for `idle_ms`
/// with a complete readyState. chromiumoxide exposes no stable network-idle
/// wait, so this runs in the page itself.
async fn wait_for_quiescence(
    page: &Page,
    budget: Duration,
    idle_ms: u64,
) -> Result<(), NavErrorKind> {
    let script = format!(
        r#"(async () => {{
            const timeoutMs = {timeout_ms};
            const idleMs = {idle_ms};
            const interval = 250;
            const start = Date.now();
            let lastCount = 0;
            let stableMs = 0;
            try {{ lastCount = performance.getEntriesByType('resource').length; }} catch (_) {{}}
            while (Date.now() - start < timeoutMs) {{
                await new Promise(r => setTimeout(r, interval));
                let curCount = lastCount;
                try {{ curCount = performance.getEntriesByType('resource').length; }} catch (_) {{}}
                if (document.readyState === 'complete' && curCount === lastCount) {{
                    stableMs += interval;
                    if (stableMs >= idleMs) return {{ ok: true }};
                }} else {{
                    stableMs = 0;
                }}
                lastCount = curCount;
            }}
            return {{ ok: false }};
        }})()"#,
        timeout_ms = budget.as_millis(),
        idle_ms = idle_ms,
    );

    let value = page
        .evaluate(script)
        .await
        .map_err(|e| classify_cdp_error(&e))?;
    let quiet = value
        .into_value::<serde_json::Value>()
        .ok()
        .and_then(|v| v.get("ok").and_then(|ok| ok.as_bool()))
        .unwrap_or(false);
    if quiet {
        Ok(())
    } else {
        Err(NavErrorKind::NavigationTimeout)
    }
}

async fn wait_for_dom_ready(page: &Page, budget: Duration) -> Result<(), NavErrorKind> {
    let script = format!(
        r#"(async () => {{
            const deadline = Date.now() + {timeout_ms};
            while (Date.now() < deadline) {{
                if (document.readyState === 'interactive' || document.readyState === 'complete') {{
                    return true;
                }}
                await new Promise(r => setTimeout(r, 250));
            }}
            return false;
        }})()"#,
        timeout_ms = budget.as_millis(),
    );

    let value = page
        .evaluate(script)
        .await
        .map_err(|e| classify_cdp_error(&e))?;
    if value.into_value::<bool>().unwrap_or(false) {
        Ok(())
    } else {
        Err(NavErrorKind::NavigationTimeout)
    }
}

async fn scroll_to_end(page: &Page) {
    let script = r#"(async () => {
        window.scrollTo(0, document.body ? document.body.scrollHeight : 0);
        return true;
    })()"#;
    if let Err(e) = page.evaluate(script).await {
        warn!("Scroll to document end failed: {}", e);
    }
}

async fn capture_snapshot(page: &Page, requested: &Url) -> PageSnapshot {
    // Prefer Page::content; fall back to a JS snapshot, which stays usable
    // on fragile connections where the CDP content call errors out.
    let html = match page.content().await {
        Ok(html) if !html.is_empty() => html,
        _ => page
            .evaluate("document.documentElement.outerHTML")
            .await
            .ok()
            .and_then(|v| v.into_value::<String>().ok())
            .unwrap_or_default(),
    };

    let text = page
        .evaluate("document.body ? document.body.innerText : ''")
        .await
        .ok()
        .and_then(|v| v.into_value::<String>().ok())
        .unwrap_or_default();

    let base_url = match page.url().await {
        Ok(Some(current)) => Url::parse(&current).unwrap_or_else(|_| requested.clone()),
        _ => requested.clone(),
    };

    PageSnapshot::new(base_url, html, text)
}

/// Approximate by design: signature words in body copy can false-positive,
/// and no ground truth exists at extraction time. The flag only affects
/// diagnostics, never whether extraction runs.
pub fn detect_flag(snapshot: &PageSnapshot, lexicons: &Lexicons) -> Option<PageFlag> {
    let text = snapshot.text.to_lowercase();
    let html = snapshot.html.to_lowercase();
    let current_url = snapshot.base_url.as_str().to_lowercase();

    for haystack in [&text, &html] {
        if let Some(sig) = Lexicons::matches_any(haystack, &lexicons.challenge_signatures) {
            return Some(PageFlag::Challenge(sig.to_string()));
        }
    }
    for haystack in [&text, &html] {
        if let Some(sig) = Lexicons::matches_any(haystack, &lexicons.block_signatures) {
            return Some(PageFlag::Blocked(sig.to_string()));
        }
    }
    if let Some(token) = Lexicons::matches_any(&current_url, &lexicons.error_url_tokens) {
        return Some(PageFlag::Blocked(token.to_string()));
    }
    None
}

/// Structural classification first (chromiumoxide's typed timeout), then
/// Chromium `net::ERR_*` message inspection where only text is available.
fn classify_cdp_error(error: &CdpError) -> NavErrorKind {
    if matches!(error, CdpError::Timeout) {
        return NavErrorKind::NavigationTimeout;
    }
    classify_transport_text(&error.to_string())
}

pub fn classify_transport_text(message: &str) -> NavErrorKind {
    let msg = message.to_lowercase();
    if msg.contains("err_name_not_resolved")
        || msg.contains("err_name_resolution_failed")
        || msg.contains("dns")
    {
        NavErrorKind::DnsError
    } else if msg.contains("err_connection_refused") {
        NavErrorKind::ConnectionRefused
    } else if msg.contains("err_cert") || msg.contains("err_ssl") || msg.contains("certificate") {
        NavErrorKind::CertificateError
    } else if msg.contains("err_aborted") || msg.contains("aborted") {
        NavErrorKind::Aborted
    } else if msg.contains("timeout") || msg.contains("timed out") {
        NavErrorKind::NavigationTimeout
    } else {
        NavErrorKind::UnknownTransport(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_urls_fail_fast_without_a_session() {
        assert_eq!(validate_target("not a url"), Err(NavErrorKind::InvalidUrl));
        assert_eq!(validate_target("ftp://foo.io"), Err(NavErrorKind::InvalidUrl));
        assert_eq!(validate_target(""), Err(NavErrorKind::InvalidUrl));
        assert_eq!(validate_target("file:///etc/hosts"), Err(NavErrorKind::InvalidUrl));
        assert!(validate_target("https://foo.io/launch").is_ok());
    }

    #[test]
    fn transport_errors_classify_from_chromium_text() {
        assert_eq!(
            classify_transport_text("net::ERR_NAME_NOT_RESOLVED at https://x"),
            NavErrorKind::DnsError
        );
        assert_eq!(
            classify_transport_text("net::ERR_CONNECTION_REFUSED"),
            NavErrorKind::ConnectionRefused
        );
        assert_eq!(
            classify_transport_text("net::ERR_CERT_AUTHORITY_INVALID"),
            NavErrorKind::CertificateError
        );
        assert_eq!(classify_transport_text("net::ERR_ABORTED"), NavErrorKind::Aborted);
        assert_eq!(
            classify_transport_text("navigation timed out"),
            NavErrorKind::NavigationTimeout
        );
        assert!(matches!(
            classify_transport_text("something exotic"),
            NavErrorKind::UnknownTransport(_)
        ));
    }

    #[test]
    fn challenge_signatures_flag_the_page() {
        let lexicons = Lexicons::default();
        let snap = PageSnapshot::new(
            Url::parse("https://foo.io/").unwrap(),
            "<html><body>Please solve the reCAPTCHA below</body></html>".to_string(),
            "Please solve the reCAPTCHA below".to_string(),
        );
        assert_eq!(
            detect_flag(&snap, &lexicons),
            Some(PageFlag::Challenge("recaptcha".to_string()))
        );
    }

    #[test]
    fn block_signatures_flag_the_page() {
        let lexicons = Lexicons::default();
        let snap = PageSnapshot::new(
            Url::parse("https://foo.io/").unwrap(),
            "<html><body>Access denied</body></html>".to_string(),
            "Access denied".to_string(),
        );
        assert_eq!(
            detect_flag(&snap, &lexicons),
            Some(PageFlag::Blocked("access denied".to_string()))
        );
    }

    #[test]
    fn ordinary_pages_carry_no_flag() {
        let lexicons = Lexicons::default();
        let snap = PageSnapshot::new(
            Url::parse("https://foo.io/").unwrap(),
            "<html><body>Welcome to Foo</body></html>".to_string(),
            "Welcome to Foo".to_string(),
        );
        assert_eq!(detect_flag(&snap, &lexicons), None);
    }
}
