use crate::error::{AppError, Result};
use mayfly_pastebin::CreatePaste;
use serde::Deserialize;

const MAX_TITLE_CHARS: usize = 255;
const MAX_SYNTAX_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct CreatePasteRequest {
    pub content: Option<String>,
    pub title: Option<String>,
    pub syntax: Option<String>,
    pub is_public: Option<bool>,
    /// Lifetime in hours.
    pub expire_in: Option<i64>,
    pub compressed: Option<bool>,
}

impl CreatePasteRequest {
    pub fn validate(self) -> Result<CreatePaste> {
        let content = match self.content {
            Some(content) if !content.is_empty() => content,
            _ => return Err(AppError::Validation("content is required".to_string())),
        };

        if let Some(title) = &self.title {
            if title.chars().count() > MAX_TITLE_CHARS {
                return Err(AppError::Validation(format!(
                    "title must be at most {MAX_TITLE_CHARS} characters"
                )));
            }
        }
        if let Some(syntax) = &self.syntax {
            if syntax.chars().count() > MAX_SYNTAX_CHARS {
                return Err(AppError::Validation(format!(
                    "syntax must be at most {MAX_SYNTAX_CHARS} characters"
                )));
            }
        }

        Ok(CreatePaste {
            content,
            title: self.title,
            syntax: self.syntax,
            is_public: self.is_public,
            expire_in_hours: super::validate_expire_in(self.expire_in)?,
            compressed: self.compressed,
        })
    }
}

/// `?limit=` is taken loosely: anything unparseable means the default.
#[derive(Debug, Default, Deserialize)]
pub struct RecentPastesQuery {
    pub limit: Option<String>,
}

impl RecentPastesQuery {
    pub fn limit(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|raw| raw.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str) -> CreatePasteRequest {
        CreatePasteRequest {
            content: Some(content.to_string()),
            title: None,
            syntax: None,
            is_public: None,
            expire_in: None,
            compressed: None,
        }
    }

    #[test]
    fn content_is_required() {
        assert!(matches!(request("").validate(), Err(AppError::Validation(_))));
        let missing = CreatePasteRequest {
            content: None,
            ..request("x")
        };
        assert!(matches!(missing.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn title_and_syntax_lengths() {
        let ok = CreatePasteRequest {
            title: Some("t".repeat(255)),
            syntax: Some("s".repeat(50)),
            ..request("x")
        };
        assert!(ok.validate().is_ok());

        let long_title = CreatePasteRequest {
            title: Some("t".repeat(256)),
            ..request("x")
        };
        assert!(matches!(long_title.validate(), Err(AppError::Validation(_))));

        let long_syntax = CreatePasteRequest {
            syntax: Some("s".repeat(51)),
            ..request("x")
        };
        assert!(matches!(long_syntax.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn zero_expiry_is_rejected() {
        let req = CreatePasteRequest {
            expire_in: Some(0),
            ..request("x")
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn recent_limit_parsing() {
        let parse = |raw: Option<&str>| {
            RecentPastesQuery {
                limit: raw.map(str::to_string),
            }
            .limit()
        };

        assert_eq!(parse(None), None);
        assert_eq!(parse(Some("5")), Some(5));
        assert_eq!(parse(Some("-3")), Some(-3));
        assert_eq!(parse(Some("lots")), None);
    }
}
