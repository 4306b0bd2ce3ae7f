pub mod oauth_flow;
pub mod send_email;
