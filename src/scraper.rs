use reqwest::{Client, ClientBuilder, header};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use once_cell::sync::Lazy;
use tracing::{debug, info, instrument};

use crate::config::{Config, DEFAULT_CONTENT_FALLBACK, DEFAULT_TITLE_FALLBACK};
use crate::error::FetchError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// A candidate container must carry more text than this to win the cascade.
const MIN_CANDIDATE_CHARS: usize = 100;

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_static("en-US,en;q=0.5"));

    ClientBuilder::new()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .build()
        .expect("Failed to build HTTP client")
});

// Most specific first; the first non-empty match wins.
static TITLE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    parse_selectors(&[
        "h1.entry-title",
        "h1.post-title",
        "h1.article-title",
        "article h1",
        ".post h1",
        ".content h1",
        ".article h1",
        "h1",
        "title",
    ])
});

static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    parse_selectors(&[
        "article",
        ".post",
        ".content",
        ".article-content",
        ".entry-content",
        ".post-content",
        "[itemprop=\"articleBody\"]",
        "main article",
        ".article-body",
    ])
});

static NOISE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script, style, nav, header, footer, aside, .advertisement, .ads, .social-share")
        .expect("Failed to parse noise selector")
});

static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to parse body selector")
});

fn parse_selectors(sources: &[&str]) -> Vec<Selector> {
    sources
        .iter()
        .map(|s| Selector::parse(s).expect("Failed to parse article selector"))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Article {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Lenient conversion for client-supplied JSON: non-string fields become empty
    /// and are then caught by the validator.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        Self::new(field("title"), field("content"))
    }

    /// The text handed to the model: title, blank line, body.
    pub fn model_input(&self) -> String {
        format!("{}\n\n{}", self.title, self.content)
    }
}

#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_html(url: &str) -> Result<String, FetchError> {
    let response = CLIENT
        .get(url)
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http { status });
    }

    let html = response.text().await.map_err(FetchError::from_reqwest_error)?;
    if html.is_empty() {
        return Err(FetchError::EmptyBody);
    }

    debug!(bytes = html.len(), "page downloaded");
    Ok(html)
}

/// Selector-cascade article extraction. Never fails: misses degrade to the
/// configured placeholder strings.
#[derive(Debug, Clone)]
pub struct Extractor {
    title_fallback: String,
    content_fallback: String,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE_FALLBACK, DEFAULT_CONTENT_FALLBACK)
    }
}

impl Extractor {
    pub fn new(title_fallback: impl Into<String>, content_fallback: impl Into<String>) -> Self {
        Self {
            title_fallback: title_fallback.into(),
            content_fallback: content_fallback.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.title_fallback.clone(), config.content_fallback.clone())
    }

    pub fn extract(&self, html: &str) -> Article {
        let document = Html::parse_document(html);

        let title = find_title(&document).unwrap_or_else(|| self.title_fallback.clone());
        let content = collapse_whitespace(&find_content(&document));
        let content = if content.is_empty() {
            self.content_fallback.clone()
        } else {
            content
        };

        info!(title = %title, chars = content.chars().count(), "article extracted");
        Article { title, content }
    }
}

fn find_title(document: &Html) -> Option<String> {
    TITLE_SELECTORS.iter().find_map(|selector| {
        let found = document.select(selector).next()?;
        let text = found.text().collect::<String>();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    })
}

fn find_content(document: &Html) -> String {
    let mut content = String::new();

    for selector in CONTENT_SELECTORS.iter() {
        if let Some(container) = document.select(selector).next() {
            content = stripped_text(container).trim().to_string();
            if content.chars().count() > MIN_CANDIDATE_CHARS {
                return content;
            }
        }
    }

    if content.chars().count() < MIN_CANDIDATE_CHARS {
        debug!("no content container matched, falling back to body");
        content = document
            .select(&BODY_SELECTOR)
            .next()
            .map(|body| stripped_text(body).trim().to_string())
            .unwrap_or_default();
    }

    content
}

/// Text of `element` with noise subtrees (scripts, navigation, ads...) skipped.
fn stripped_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if !NOISE_SELECTOR.matches(&child) {
                collect_text(child, out);
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
