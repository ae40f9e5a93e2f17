use axum::{
    routing::post,
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any as PanicPayload;
use std::future::Future;
use std::time::{Duration, Instant};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::actions::{self, ActionProfile};
use crate::api::models::{ActionRequest, IllustrationResponse, TranslateRequest};
use crate::api::response;
use crate::error::{AppError, Result};
use crate::llm::{call_openrouter, generate_image, ImageOutcome, IMAGE_TIMED_OUT};
use crate::scraper::{fetch_html, Article};
use crate::validate::{is_valid_url, validate_article};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/parse", post(parse_handler))
        .route("/api/summary", post(summary_handler))
        .route("/api/thesis", post(thesis_handler))
        .route("/api/telegram", post(telegram_handler))
        .route("/api/translate", post(translate_handler))
        .route("/api/illustration", post(illustration_handler))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn not_found() -> impl IntoResponse {
    response::error(StatusCode::NOT_FOUND, "Not found")
}

async fn parse_handler(State(state): State<AppState>, body: Bytes) -> Response {
    respond(&state, "parse", async {
        let req: ActionRequest = parse_body(&body)?;
        let url = checked_url(req.url.as_ref())?
            .ok_or_else(|| AppError::InvalidInput("A non-empty article url is required".to_string()))?;
        let article = load_article(&state, url).await?;
        Ok(response::success(article).into_response())
    })
    .await
}

async fn summary_handler(State(state): State<AppState>, body: Bytes) -> Response {
    respond(&state, actions::SUMMARY.name, text_action(&state, &actions::SUMMARY, &body)).await
}

async fn thesis_handler(State(state): State<AppState>, body: Bytes) -> Response {
    respond(&state, actions::THESIS.name, text_action(&state, &actions::THESIS, &body)).await
}

async fn telegram_handler(State(state): State<AppState>, body: Bytes) -> Response {
    respond(&state, actions::TELEGRAM.name, text_action(&state, &actions::TELEGRAM, &body)).await
}

async fn translate_handler(State(state): State<AppState>, body: Bytes) -> Response {
    respond(&state, actions::TRANSLATE.name, async {
        let req: TranslateRequest = parse_body(&body)?;
        let action = &actions::TRANSLATE;

        let text = match req.text {
            Some(Value::String(text)) if !text.trim().is_empty() => text,
            Some(Value::String(_)) | None if req.article.is_some() || req.url.is_some() => {
                let article = resolve_article(
                    &state,
                    action,
                    ActionRequest {
                        article: req.article,
                        url: req.url,
                    },
                )
                .await?;
                article.model_input()
            }
            Some(Value::String(_)) | None => {
                return Err(AppError::InvalidInput("No text to translate was provided".to_string()));
            }
            Some(_) => return Err(AppError::InvalidInput("Text must be a string".to_string())),
        };

        info!(chars = text.len(), "sending translation request");
        let translation = call_openrouter(&state.http, &state.config, action, &text).await?;
        Ok(response::field(action.response_field, translation).into_response())
    })
    .await
}

async fn illustration_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let action = &actions::ILLUSTRATION_PROMPT;
    let start_time = Instant::now();
    let deadline = tokio::time::Instant::now() + state.config.request_timeout;

    let prompt_step = async {
        let req: ActionRequest = parse_body(&body)?;
        let article = resolve_article(&state, action, req).await?;
        let prompt = call_openrouter(&state.http, &state.config, action, &article.model_input()).await?;
        Ok::<_, AppError>(prompt.trim().to_string())
    };

    let result = match tokio::time::timeout_at(deadline, prompt_step).await {
        Ok(Ok(prompt)) => {
            info!(prompt = %prompt, "illustration prompt generated");

            // The image is optional: running out of time drops it, not the prompt.
            let outcome = tokio::time::timeout_at(deadline, generate_image(&state.http, &state.config, &prompt))
                .await
                .unwrap_or_else(|_| {
                    warn!("image generation reached the request deadline");
                    ImageOutcome::Degraded(IMAGE_TIMED_OUT.to_string())
                });

            let (image_url, message) = match outcome {
                ImageOutcome::Generated(data_uri) => (Some(data_uri), None),
                ImageOutcome::Degraded(message) => (None, Some(message)),
            };

            Ok(response::success(IllustrationResponse {
                prompt,
                image_url,
                message,
            })
            .into_response())
        }
        Ok(Err(err)) => Err(err),
        Err(_) => Err(AppError::Timeout),
    };

    log_outcome(action.name, start_time.elapsed(), result)
}

/// Shared path for every action that turns an article into one model reply.
async fn text_action(state: &AppState, action: &ActionProfile, body: &[u8]) -> Result<Response> {
    let req: ActionRequest = parse_body(body)?;
    let article = resolve_article(state, action, req).await?;

    let input = article.model_input();
    info!(action = action.name, chars = input.len(), "sending article to text provider");
    let reply = call_openrouter(&state.http, &state.config, action, &input).await?;

    Ok(response::field(action.response_field, reply).into_response())
}

/// Applies the overall deadline and turns errors into JSON responses.
async fn respond<F>(state: &AppState, action: &'static str, work: F) -> Response
where
    F: Future<Output = Result<Response>>,
{
    let start_time = Instant::now();
    let result = tokio::time::timeout(state.config.request_timeout, work)
        .await
        .unwrap_or(Err(AppError::Timeout));

    log_outcome(action, start_time.elapsed(), result)
}

fn log_outcome(action: &'static str, elapsed: Duration, result: Result<Response>) -> Response {
    match result {
        Ok(response) => {
            info!(action, ?elapsed, "request processed");
            response
        }
        Err(err) if err.status().is_server_error() => {
            error!(action, ?elapsed, status = err.status().as_u16(), error = %err, "request failed");
            err.into_response()
        }
        Err(err) => {
            warn!(action, ?elapsed, status = err.status().as_u16(), error = %err, "request rejected");
            err.into_response()
        }
    }
}

/// Turns a handler panic into an opaque 500. The panic payload is only logged.
pub fn handle_panic(panic: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!(panic = %detail, "handler panicked");
    AppError::Internal(detail).into_response()
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|_| AppError::InvalidInput("Invalid request format. JSON expected.".to_string()))
}

/// `Ok(None)` when no url was sent; errors when one was sent but is unusable.
fn checked_url(url: Option<&Value>) -> Result<Option<&str>> {
    match url {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(AppError::InvalidInput("URL cannot be empty".to_string()));
            }
            if !is_valid_url(trimmed) {
                return Err(AppError::InvalidInput(
                    "Invalid URL format. The URL must start with http:// or https://".to_string(),
                ));
            }
            Ok(Some(trimmed))
        }
        Some(_) => Err(AppError::InvalidInput("URL must be a string".to_string())),
    }
}

/// Picks the pre-parsed article or fetches the url, then runs the validator.
async fn resolve_article(state: &AppState, action: &ActionProfile, req: ActionRequest) -> Result<Article> {
    let has_article = matches!(req.article, Some(Value::Object(_)));
    let has_url = matches!(&req.url, Some(Value::String(s)) if !s.trim().is_empty());

    if !has_article && !has_url {
        return Err(AppError::InvalidInput(
            "Provide either an article object or a non-empty article url".to_string(),
        ));
    }

    let url = checked_url(req.url.as_ref())?;

    let article = match (&req.article, url) {
        (Some(value @ Value::Object(_)), _) => Article::from_json(value),
        (_, Some(_)) if !action.accepts_raw_url => {
            return Err(AppError::InvalidInput(format!(
                "The {} action requires a parsed article, not a URL",
                action.name
            )));
        }
        (_, Some(url)) => load_article(state, url).await?,
        (_, None) => {
            return Err(AppError::Internal("article resolution reached no source".to_string()));
        }
    };

    validate_article(Some(&article)).map_err(|reason| AppError::InvalidInput(reason.to_string()))?;
    Ok(article)
}

async fn load_article(state: &AppState, url: &str) -> Result<Article> {
    info!(url, "fetching article");
    let html = fetch_html(url).await?;
    Ok(state.extractor.extract(&html))
}
