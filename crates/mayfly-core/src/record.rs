use crate::paste_id::PasteId;
use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A stored short URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortUrl {
    /// Store-assigned surrogate key.
    pub id: i64,
    pub code: ShortCode,
    /// The target to redirect to.
    pub original_url: String,
    /// The caller-supplied alias, when the code was not generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub clicks: u64,
    pub is_public: bool,
    /// When the record expires, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A short URL about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShortUrl {
    pub code: ShortCode,
    pub original_url: String,
    pub alias: Option<String>,
    pub is_public: bool,
    pub expires_at: Option<Timestamp>,
}

/// One row of the click audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickLog {
    pub id: i64,
    /// References the clicked short URL; the row outlives its deletion.
    pub short_url_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub clicked_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClickLog {
    pub short_url_id: i64,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub clicked_at: Timestamp,
}

/// A stored paste. The content never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paste {
    pub id: PasteId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    pub is_public: bool,
    /// Metadata only: content is stored as given.
    pub is_compressed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A paste about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPaste {
    pub id: PasteId,
    pub title: Option<String>,
    pub content: String,
    pub syntax: Option<String>,
    pub is_public: bool,
    pub is_compressed: bool,
    pub expires_at: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_url_omits_absent_optionals() {
        let now = Timestamp::from_second(0).unwrap();
        let record = ShortUrl {
            id: 1,
            code: ShortCode::new_unchecked("abc12345"),
            original_url: "https://example.com".to_string(),
            alias: None,
            clicks: 0,
            is_public: true,
            expires_at: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["code"], "abc12345");
        assert_eq!(json["original_url"], "https://example.com");
        assert!(json.get("alias").is_none());
        assert!(json.get("expires_at").is_none());
    }

    #[test]
    fn paste_serializes_flat_id() {
        let now = Timestamp::from_second(0).unwrap();
        let paste = Paste {
            id: PasteId::new("AbCdEfGh_-"),
            title: Some("notes".to_string()),
            content: "hello".to_string(),
            syntax: None,
            is_public: true,
            is_compressed: false,
            expires_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&paste).unwrap();
        assert_eq!(json["id"], "AbCdEfGh_-");
        assert_eq!(json["title"], "notes");
        assert!(json.get("syntax").is_none());
        assert!(json.get("expires_at").is_some());
    }
}
