//! Google OAuth flow: consent URL construction, code-for-token exchange and
//! resolution of the authenticated account's email.

pub mod endpoints;
pub mod ops;
pub mod utils;

pub use ops::{ExchangedTokens, GoogleOauthOps};
