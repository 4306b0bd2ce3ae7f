pub mod config;
pub mod db;
pub mod error;
pub mod gmail;
pub mod google_oauth;
pub mod handlers;
pub mod notifier;
pub mod router;

pub use error::NudgeError;
pub use google_oauth::{ExchangedTokens, GoogleOauthOps};
