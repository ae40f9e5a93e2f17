use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, header};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::actions::ActionProfile;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::normalize::{outward_status, upstream_message, UpstreamBody};

pub const MISSING_TEXT_KEY: &str =
    "OpenRouter API key is not configured. Set the OPENROUTER_API_KEY environment variable.";
pub const MISSING_IMAGE_KEY: &str =
    "Image generation requires a Hugging Face API key. Set HUGGINGFACE_API_KEY to enable it.";
pub const IMAGE_TIMED_OUT: &str =
    "Image generation timed out. Use the prompt above in another service.";

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    inputs: &'a str,
}

/// Runs one chat completion for `action` and returns the model's reply.
#[instrument(skip_all, fields(action = action.name, chars = user_content.len()))]
pub async fn call_openrouter(
    http: &Client,
    config: &Config,
    action: &ActionProfile,
    user_content: &str,
) -> Result<String> {
    let api_key = config
        .openrouter_api_key
        .as_deref()
        .ok_or(AppError::ConfigMissing(MISSING_TEXT_KEY))?;

    let system_prompt = action.system_prompt(&config.output_language);
    let body = ChatRequest {
        model: &config.openrouter_model,
        messages: vec![
            Message {
                role: "system",
                content: &system_prompt,
            },
            Message {
                role: "user",
                content: user_content,
            },
        ],
        temperature: action.temperature,
        max_tokens: action.max_tokens,
    };

    let endpoint = format!("{}/chat/completions", config.openrouter_base_url.trim_end_matches('/'));
    let response = http
        .post(&endpoint)
        .bearer_auth(api_key)
        .header("HTTP-Referer", &config.app_url)
        .header("X-Title", action.title)
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::UpstreamNetwork(e.to_string()))?;

    let status = response.status();
    let raw = response
        .text()
        .await
        .map_err(|e| AppError::UpstreamNetwork(e.to_string()))?;

    if !status.is_success() {
        let payload = UpstreamBody::parse(&raw);
        warn!(status = status.as_u16(), payload = ?payload, "text provider returned an error");
        return Err(AppError::Upstream {
            status: outward_status(status.as_u16()),
            message: upstream_message(status.as_u16(), &payload),
        });
    }

    let json: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|_| AppError::UpstreamMalformed("AI text generation API"))?;
    let reply = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            warn!(payload = %json, "text provider response has no choices[0].message.content");
            AppError::UpstreamMalformed("AI text generation API")
        })?
        .to_string();

    info!(reply_chars = reply.len(), "completion received");
    Ok(reply)
}

/// Result of the optional image step. Failures here never fail the request.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    /// `data:` URI carrying the generated image.
    Generated(String),
    /// Human-readable reason the image is missing.
    Degraded(String),
}

#[instrument(skip_all, fields(model = %config.huggingface_model))]
pub async fn generate_image(http: &Client, config: &Config, prompt: &str) -> ImageOutcome {
    let Some(api_key) = config.huggingface_api_key.as_deref() else {
        return ImageOutcome::Degraded(MISSING_IMAGE_KEY.to_string());
    };

    let endpoint = format!(
        "{}/{}",
        config.huggingface_base_url.trim_end_matches('/'),
        config.huggingface_model
    );

    let response = match http
        .post(&endpoint)
        .bearer_auth(api_key)
        .json(&ImageRequest { inputs: prompt })
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "image provider unreachable");
            return ImageOutcome::Degraded(format!("Image generation failed: {}", e));
        }
    };

    let status = response.status();
    if !status.is_success() {
        let raw = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %raw, "image provider returned an error");
        return ImageOutcome::Degraded(image_failure_message(status.as_u16(), &UpstreamBody::parse(&raw)));
    }

    let mime = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("image/"))
        .unwrap_or("image/png")
        .to_string();

    match response.bytes().await {
        Ok(bytes) => {
            info!(bytes = bytes.len(), mime = %mime, "image generated");
            ImageOutcome::Generated(format!("data:{};base64,{}", mime, BASE64.encode(&bytes)))
        }
        Err(e) => {
            warn!(error = %e, "failed to read image body");
            ImageOutcome::Degraded(format!("Image generation failed: {}", e))
        }
    }
}

fn image_failure_message(status: u16, body: &UpstreamBody) -> String {
    match status {
        503 => "The image generation model is loading. Try again in a few seconds.".to_string(),
        404 | 410 => format!(
            "Image generation API is unavailable ({}). Use the prompt above in another service \
             (for example DALL-E, Midjourney, Stable Diffusion).",
            status
        ),
        _ => format!(
            "Image generation failed ({}): {}. Use the prompt above in another service.",
            status,
            upstream_message(status, body)
        ),
    }
}
