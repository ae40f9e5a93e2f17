//! Client-side flow against the HTTP API.
//!
//! [`Orchestrator`] holds what a user has entered (a URL, maybe an article
//! already parsed from it) and a single [`ClientState`]. Exactly one action
//! can be loading at a time; every response ends in either `Ready` or
//! `Failed`, and starting the next action leaves that state behind.
//!
//! Error categories only choose display copy. The server has already decided
//! the status code and message.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::api::models::IllustrationResponse;
use crate::scraper::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Parse,
    Summary,
    Thesis,
    Telegram,
    Translate,
    Illustration,
}

impl Action {
    pub fn endpoint(self) -> &'static str {
        match self {
            Action::Parse => "/api/parse",
            Action::Summary => "/api/summary",
            Action::Thesis => "/api/thesis",
            Action::Telegram => "/api/telegram",
            Action::Translate => "/api/translate",
            Action::Illustration => "/api/illustration",
        }
    }

    /// Success field for the single-text actions.
    pub fn response_field(self) -> Option<&'static str> {
        match self {
            Action::Summary => Some("summary"),
            Action::Thesis => Some("thesis"),
            Action::Telegram => Some("post"),
            Action::Translate => Some("translation"),
            Action::Parse | Action::Illustration => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    Article(Article),
    Text { action: Action, text: String },
    Illustration(IllustrationResponse),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    RateLimit,
    Auth,
    NotFound,
    Server,
    Client,
    AiService,
    ArticleLoad,
    Unknown,
}

impl ErrorCategory {
    /// `status` is `None` when no response arrived at all.
    pub fn classify(status: Option<u16>, message: &str) -> Self {
        let message = message.to_lowercase();
        match status {
            None => ErrorCategory::Network,
            Some(429) => ErrorCategory::RateLimit,
            Some(401) | Some(403) => ErrorCategory::Auth,
            Some(404) => ErrorCategory::NotFound,
            Some(400..=499) => ErrorCategory::Client,
            Some(500..=599) if message.contains("article") => ErrorCategory::ArticleLoad,
            Some(500..=599) if message.contains("ai service") || message.contains("api") => {
                ErrorCategory::AiService
            }
            Some(500..=599) => ErrorCategory::Server,
            Some(_) => ErrorCategory::Unknown,
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network error: the server could not be reached. Check your internet connection.",
            ErrorCategory::RateLimit => "Too many requests. Please wait a little and try again.",
            ErrorCategory::Auth => "Access denied by the AI service.",
            ErrorCategory::NotFound => "The requested resource was not found.",
            ErrorCategory::Server => "The server failed to process the request.",
            ErrorCategory::Client => "The request could not be processed. Check the input.",
            ErrorCategory::AiService => "The AI service failed to process the article.",
            ErrorCategory::ArticleLoad => "The article could not be loaded.",
            ErrorCategory::Unknown => "Something went wrong.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientState {
    Idle,
    Loading(Action),
    Ready(ActionResult),
    Failed { category: ErrorCategory, detail: String },
}

impl ClientState {
    /// What the error panel shows: the category headline over the server's message.
    pub fn error_text(&self) -> Option<String> {
        match self {
            ClientState::Failed { category, detail } => Some(format!("{}\n{}", category.headline(), detail)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("another action is still running")]
    Busy,

    #[error("Please enter an article URL or parse an article first")]
    MissingInput,

    #[error("Please enter an article URL")]
    MissingUrl,

    #[error("Parse the article before translating it")]
    NeedsParsedArticle,
}

pub struct Orchestrator {
    base_url: String,
    http: Client,
    url: String,
    parsed_article: Option<Article>,
    state: ClientState,
}

impl Orchestrator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            url: String::new(),
            parsed_article: None,
            state: ClientState::Idle,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn parsed_article(&self) -> Option<&Article> {
        self.parsed_article.as_ref()
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn set_parsed_article(&mut self, article: Option<Article>) {
        self.parsed_article = article;
    }

    /// Runs the guard checks and moves to `Loading`. Returns the request body.
    pub fn begin(&mut self, action: Action) -> Result<Value, GuardError> {
        if matches!(self.state, ClientState::Loading(_)) {
            return Err(GuardError::Busy);
        }

        let url = self.url.trim();
        let body = match action {
            Action::Parse if url.is_empty() => return Err(GuardError::MissingUrl),
            Action::Parse => json!({ "url": url }),
            Action::Translate => match &self.parsed_article {
                Some(article) => json!({ "text": article.model_input() }),
                None => return Err(GuardError::NeedsParsedArticle),
            },
            _ => match &self.parsed_article {
                Some(article) => json!({ "article": article }),
                None if !url.is_empty() => json!({ "url": url }),
                None => return Err(GuardError::MissingInput),
            },
        };

        self.state = ClientState::Loading(action);
        Ok(body)
    }

    /// Applies a finished request. `Err` carries a transport failure message.
    pub fn finish(&mut self, action: Action, response: Result<(u16, String), String>) -> &ClientState {
        self.state = match response {
            Err(detail) => ClientState::Failed {
                category: ErrorCategory::Network,
                detail,
            },
            Ok((status, body)) => self.interpret(action, status, &body),
        };
        &self.state
    }

    fn interpret(&mut self, action: Action, status: u16, body: &str) -> ClientState {
        let failed = |category, detail: String| ClientState::Failed { category, detail };

        let data: Value = match serde_json::from_str(body) {
            Ok(data) => data,
            Err(_) => {
                return failed(
                    ErrorCategory::classify(Some(status), ""),
                    format!("Could not parse the server response. Status: {}", status),
                );
            }
        };

        if !(200..300).contains(&status) {
            let message = data["error"].as_str().unwrap_or("Unknown error");
            return failed(
                ErrorCategory::classify(Some(status), message),
                format!("Error ({}): {}", status, message),
            );
        }

        match action {
            Action::Parse => match serde_json::from_value::<Article>(data) {
                Ok(article) => {
                    self.parsed_article = Some(article.clone());
                    ClientState::Ready(ActionResult::Article(article))
                }
                Err(e) => failed(ErrorCategory::Unknown, format!("Malformed article in response: {}", e)),
            },
            Action::Illustration => match serde_json::from_value::<IllustrationResponse>(data) {
                Ok(illustration) => ClientState::Ready(ActionResult::Illustration(illustration)),
                Err(e) => failed(ErrorCategory::Unknown, format!("Malformed illustration in response: {}", e)),
            },
            _ => {
                let field = action.response_field().unwrap_or_default();
                match data[field].as_str().filter(|text| !text.is_empty()) {
                    Some(text) => ClientState::Ready(ActionResult::Text {
                        action,
                        text: text.to_string(),
                    }),
                    None => failed(
                        ErrorCategory::Unknown,
                        format!("Field \"{}\" not found in the server response", field),
                    ),
                }
            }
        }
    }

    /// Guard, send, and apply the response. A busy orchestrator is left untouched.
    #[instrument(skip(self))]
    pub async fn run(&mut self, action: Action) -> &ClientState {
        let body = match self.begin(action) {
            Ok(body) => body,
            Err(GuardError::Busy) => return &self.state,
            Err(guard) => {
                self.state = ClientState::Failed {
                    category: ErrorCategory::Client,
                    detail: guard.to_string(),
                };
                return &self.state;
            }
        };

        let endpoint = format!("{}{}", self.base_url, action.endpoint());
        debug!(%endpoint, "sending action request");

        let response = match self.http.post(&endpoint).json(&body).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                response
                    .text()
                    .await
                    .map(|text| (status, text))
                    .map_err(|e| format!("Failed to read the server response: {}", e))
            }
            Err(e) => Err(format!("Network error: could not reach the server ({})", e)),
        };

        self.finish(action, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_article() -> Article {
        Article::new("Title", "word ".repeat(20))
    }

    #[test]
    fn failed_state_shows_headline_and_detail() {
        let mut client = Orchestrator::new("http://localhost:3000");
        client.set_url("https://example.com/a");
        client.begin(Action::Summary).unwrap();
        client.finish(Action::Summary, Err("connection refused".to_string()));
        let text = client.state().error_text().unwrap();
        assert!(text.starts_with("Network error"));
        assert!(text.ends_with("\nconnection refused"));

        let failed = ClientState::Failed {
            category: ErrorCategory::RateLimit,
            detail: "AI service request limit exceeded.".to_string(),
        };
        assert_eq!(
            failed.error_text().as_deref(),
            Some("Too many requests. Please wait a little and try again.\nAI service request limit exceeded.")
        );
        assert_eq!(ClientState::Idle.error_text(), None);
    }

    #[test]
    fn guards_reject_missing_input() {
        let mut client = Orchestrator::new("http://localhost:3000");
        assert_eq!(client.begin(Action::Summary), Err(GuardError::MissingInput));
        assert_eq!(client.begin(Action::Translate), Err(GuardError::NeedsParsedArticle));
        assert_eq!(client.begin(Action::Parse), Err(GuardError::MissingUrl));
        assert_eq!(client.state(), &ClientState::Idle);
    }

    #[test]
    fn prefers_parsed_article_over_url() {
        let mut client = Orchestrator::new("http://localhost:3000");
        client.set_url("  https://example.com/a  ");
        assert_eq!(client.begin(Action::Thesis), Ok(json!({ "url": "https://example.com/a" })));
        client.finish(Action::Thesis, Err("down".to_string()));

        client.set_parsed_article(Some(long_article()));
        let body = client.begin(Action::Summary).unwrap();
        assert_eq!(body["article"]["title"], "Title");
        assert!(body.get("url").is_none());
    }

    #[test]
    fn only_one_action_in_flight() {
        let mut client = Orchestrator::new("http://localhost:3000");
        client.set_url("https://example.com/a");
        client.begin(Action::Summary).unwrap();
        assert_eq!(client.state(), &ClientState::Loading(Action::Summary));
        assert_eq!(client.begin(Action::Telegram), Err(GuardError::Busy));
    }

    #[test]
    fn successful_text_action_is_ready() {
        let mut client = Orchestrator::new("http://localhost:3000");
        client.set_url("https://example.com/a");
        client.begin(Action::Telegram).unwrap();

        let state = client.finish(Action::Telegram, Ok((200, r#"{"post":"Hello"}"#.to_string())));
        assert_eq!(
            state,
            &ClientState::Ready(ActionResult::Text {
                action: Action::Telegram,
                text: "Hello".to_string()
            })
        );
    }

    #[test]
    fn missing_field_is_unknown_failure() {
        let mut client = Orchestrator::new("http://localhost:3000");
        client.set_url("https://example.com/a");
        client.begin(Action::Summary).unwrap();

        match client.finish(Action::Summary, Ok((200, "{}".to_string()))) {
            ClientState::Failed { category, detail } => {
                assert_eq!(*category, ErrorCategory::Unknown);
                assert!(detail.contains("summary"));
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn parse_stores_article() {
        let mut client = Orchestrator::new("http://localhost:3000");
        client.set_url("https://example.com/a");
        client.begin(Action::Parse).unwrap();
        client.finish(Action::Parse, Ok((200, r#"{"title":"T","content":"C"}"#.to_string())));

        assert_eq!(client.parsed_article(), Some(&Article::new("T", "C")));
        assert_eq!(client.begin(Action::Translate), Ok(json!({ "text": "T\n\nC" })));
    }

    #[test]
    fn error_responses_are_classified() {
        let mut client = Orchestrator::new("http://localhost:3000");
        client.set_url("https://example.com/a");
        client.begin(Action::Summary).unwrap();

        let state = client.finish(
            Action::Summary,
            Ok((500, r#"{"error":"Could not connect to the article server."}"#.to_string())),
        );
        assert!(matches!(state, ClientState::Failed { category: ErrorCategory::ArticleLoad, .. }));
    }

    #[test]
    fn classification_table() {
        assert_eq!(ErrorCategory::classify(None, ""), ErrorCategory::Network);
        assert_eq!(ErrorCategory::classify(Some(429), ""), ErrorCategory::RateLimit);
        assert_eq!(ErrorCategory::classify(Some(401), ""), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::classify(Some(404), ""), ErrorCategory::NotFound);
        assert_eq!(ErrorCategory::classify(Some(400), "URL cannot be empty"), ErrorCategory::Client);
        assert_eq!(
            ErrorCategory::classify(Some(500), "AI service is temporarily unavailable"),
            ErrorCategory::AiService
        );
        assert_eq!(ErrorCategory::classify(Some(500), "boom"), ErrorCategory::Server);
        assert_eq!(ErrorCategory::classify(Some(302), ""), ErrorCategory::Unknown);
    }
}
