mod nudge;
mod oauth;

pub use nudge::NudgeError;
pub use oauth::OauthError;
