use url::Url;

use crate::scraper::Article;

/// Pages with less text than this are not worth a paid model call.
pub const MIN_CONTENT_CHARS: usize = 50;

/// True only for absolute `http`/`https` URLs.
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArticleRejection {
    #[error("Article data was not provided")]
    Missing,

    #[error("Article content is missing or too short (minimum 50 characters)")]
    ContentTooShort,
}

pub fn validate_article(article: Option<&Article>) -> Result<(), ArticleRejection> {
    let article = article.ok_or(ArticleRejection::Missing)?;

    if article.content.trim().chars().count() < MIN_CONTENT_CHARS {
        return Err(ArticleRejection::ContentTooShort);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_http_schemes() {
        assert!(is_valid_url("https://a.b/c"));
        assert!(is_valid_url("http://example.com"));
        assert!(!is_valid_url("ftp://x.com"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("/relative/path"));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn rejects_missing_and_short_articles() {
        assert_eq!(validate_article(None), Err(ArticleRejection::Missing));

        let short = Article::new("T", "short");
        assert_eq!(validate_article(Some(&short)), Err(ArticleRejection::ContentTooShort));

        let padded = Article::new("T", format!("   {}   ", "x".repeat(49)));
        assert_eq!(validate_article(Some(&padded)), Err(ArticleRejection::ContentTooShort));
    }

    #[test]
    fn accepts_fifty_characters() {
        let article = Article::new("", "x".repeat(50));
        assert_eq!(validate_article(Some(&article)), Ok(()));
    }
}
