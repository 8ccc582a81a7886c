mod health;
mod paste;
mod url;

pub use health::HealthResponse;
pub use paste::{CreatePasteRequest, RecentPastesQuery};
pub use url::{CreateUrlRequest, ShortUrlResponse};

use crate::error::{AppError, Result};

/// Hours must be at least one and fit the manager's `u32`.
fn validate_expire_in(expire_in: Option<i64>) -> Result<Option<u32>> {
    match expire_in {
        None => Ok(None),
        Some(hours) if hours < 1 => Err(AppError::Validation(
            "expire_in must be at least 1 hour".to_string(),
        )),
        Some(hours) => u32::try_from(hours)
            .map(Some)
            .map_err(|_| AppError::Validation(format!("expire_in is too large: {hours}"))),
    }
}
