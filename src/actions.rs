/// Everything that distinguishes one text action from another. The handlers
/// share a single orchestration path and differ only by this record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionProfile {
    pub name: &'static str,
    /// `{language}` is replaced with the configured output language.
    pub system_prompt: &'static str,
    pub temperature: f32,
    pub max_tokens: u32,
    pub response_field: &'static str,
    pub accepts_raw_url: bool,
    /// Sent to the provider as `X-Title`.
    pub title: &'static str,
}

impl ActionProfile {
    pub fn system_prompt(&self, language: &str) -> String {
        self.system_prompt.replace("{language}", language)
    }
}

pub const SUMMARY: ActionProfile = ActionProfile {
    name: "summary",
    system_prompt: "You are an expert in text analysis. Read the following article and write a short \
        description (2-3 sentences) of what it is about. IMPORTANT: the description must be written \
        in {language}. If the article is in another language, write the description in {language} \
        anyway. Answer ONLY in {language}.",
    temperature: 0.3,
    max_tokens: 500,
    response_field: "summary",
    accepts_raw_url: true,
    title: "Article Summary",
};

pub const THESIS: ActionProfile = ActionProfile {
    name: "thesis",
    system_prompt: "You are an expert in text analysis. Read the following article and extract its \
        key theses as a numbered list of 3 to 7 short points. Each point is one sentence. \
        Write the list in {language} only, without an introduction or conclusion.",
    temperature: 0.3,
    max_tokens: 1000,
    response_field: "thesis",
    accepts_raw_url: true,
    title: "Article Thesis",
};

pub const TELEGRAM: ActionProfile = ActionProfile {
    name: "telegram",
    system_prompt: "You are an editor of a Telegram channel. Based on the following article, write an \
        engaging post in {language}: a catchy first line, 2-4 short paragraphs with the main ideas, \
        a few fitting emoji and 2-3 hashtags at the end. Return ONLY the post text.",
    temperature: 0.7,
    max_tokens: 1000,
    response_field: "post",
    accepts_raw_url: true,
    title: "Telegram Post",
};

pub const TRANSLATE: ActionProfile = ActionProfile {
    name: "translate",
    system_prompt: "You are a professional translator. Translate the following text into {language}, \
        preserving the structure and formatting of the original. Translate accurately and naturally.",
    temperature: 0.3,
    max_tokens: 4000,
    response_field: "translation",
    accepts_raw_url: false,
    title: "Article Translator",
};

pub const ILLUSTRATION_PROMPT: ActionProfile = ActionProfile {
    name: "illustration",
    system_prompt: "You are an expert in writing prompts for image generation. Based on the following \
        article, write a short prompt (in English, at most 100 words) for an abstract illustration that \
        reflects the main topic and mood of the article. The prompt must be detailed and descriptive and \
        name a style (for example abstract, modern, minimalist), colors and mood. Return ONLY the prompt, \
        without any explanation.",
    temperature: 0.7,
    max_tokens: 200,
    response_field: "prompt",
    accepts_raw_url: true,
    title: "Illustration Prompt Generator",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_placeholder_is_filled() {
        let prompt = SUMMARY.system_prompt("German");
        assert!(prompt.contains("written in German"));
        assert!(!prompt.contains("{language}"));
    }

    #[test]
    fn response_fields_are_distinct() {
        let fields = [SUMMARY, THESIS, TELEGRAM, TRANSLATE, ILLUSTRATION_PROMPT].map(|a| a.response_field);
        for (i, field) in fields.iter().enumerate() {
            assert!(!fields[i + 1..].contains(field), "duplicate field {}", field);
        }
    }

    #[test]
    fn only_translate_requires_parsed_text() {
        assert!(!TRANSLATE.accepts_raw_url);
        assert!(SUMMARY.accepts_raw_url && THESIS.accepts_raw_url && TELEGRAM.accepts_raw_url);
    }
}
