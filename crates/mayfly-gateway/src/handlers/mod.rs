mod health;
mod paste;
mod url;

pub use health::health_handler;
pub use paste::{create_paste_handler, delete_paste_handler, get_paste_handler, recent_pastes_handler};
pub use url::{create_url_handler, get_url_handler, redirect_handler};
