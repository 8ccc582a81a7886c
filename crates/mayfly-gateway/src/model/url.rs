use crate::error::{AppError, Result};
use mayfly_core::{ShortCode, ShortUrl};
use mayfly_shortener::CreateShortUrl;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub original_url: Option<String>,
    pub alias: Option<String>,
    /// Lifetime in hours.
    pub expire_in: Option<i64>,
    pub is_public: Option<bool>,
}

impl CreateUrlRequest {
    pub fn validate(self) -> Result<CreateShortUrl> {
        let original_url = match self.original_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => {
                return Err(AppError::Validation(
                    "original_url is required".to_string(),
                ))
            }
        };
        Url::parse(&original_url).map_err(|e| {
            AppError::Validation(format!("original_url is not a valid url: {e}"))
        })?;

        // an empty alias counts as absent
        let alias = self
            .alias
            .filter(|alias| !alias.is_empty())
            .map(ShortCode::new)
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(CreateShortUrl {
            original_url,
            alias,
            expire_in_hours: super::validate_expire_in(self.expire_in)?,
            is_public: self.is_public,
        })
    }
}

/// A short URL plus its absolute public link.
#[derive(Debug, Serialize)]
pub struct ShortUrlResponse {
    #[serde(flatten)]
    pub record: ShortUrl,
    pub short_url: String,
}

impl ShortUrlResponse {
    pub fn new(record: ShortUrl, base_url: &str) -> Self {
        Self {
            short_url: record.code.to_url(base_url),
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(original_url: Option<&str>) -> CreateUrlRequest {
        CreateUrlRequest {
            original_url: original_url.map(str::to_string),
            alias: None,
            expire_in: None,
            is_public: None,
        }
    }

    #[test]
    fn minimal_request_leaves_defaults_to_the_manager() {
        let params = request(Some("https://example.com")).validate().unwrap();

        assert_eq!(params.original_url, "https://example.com");
        assert_eq!(params.alias, None);
        assert_eq!(params.expire_in_hours, None);
        assert_eq!(params.is_public, None);
    }

    #[test]
    fn original_url_is_required_and_well_formed() {
        assert!(matches!(request(None).validate(), Err(AppError::Validation(_))));
        assert!(matches!(request(Some("")).validate(), Err(AppError::Validation(_))));
        assert!(matches!(
            request(Some("not a url")).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn alias_rules() {
        for bad in ["ab", "has space", "dash-ed", &"x".repeat(51)] {
            let req = CreateUrlRequest {
                alias: Some(bad.to_string()),
                ..request(Some("https://example.com"))
            };
            assert!(matches!(req.validate(), Err(AppError::Validation(_))), "{bad}");
        }

        let req = CreateUrlRequest {
            alias: Some("abc".to_string()),
            ..request(Some("https://example.com"))
        };
        assert_eq!(req.validate().unwrap().alias.unwrap().as_str(), "abc");
    }

    #[test]
    fn expire_in_must_be_positive() {
        for hours in [0, -1] {
            let req = CreateUrlRequest {
                expire_in: Some(hours),
                ..request(Some("https://example.com"))
            };
            assert!(matches!(req.validate(), Err(AppError::Validation(_))));
        }

        let req = CreateUrlRequest {
            expire_in: Some(1),
            ..request(Some("https://example.com"))
        };
        assert_eq!(req.validate().unwrap().expire_in_hours, Some(1));
    }
}
