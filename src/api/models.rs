use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body shared by the article actions. Fields stay loosely typed so that a
/// wrong type is reported as a specific 400 instead of a generic parse error.
#[derive(Debug, Default, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub article: Option<Value>,
    #[serde(default)]
    pub url: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub article: Option<Value>,
    #[serde(default)]
    pub url: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IllustrationResponse {
    pub prompt: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub message: Option<String>,
}
