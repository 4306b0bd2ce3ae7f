//! Minimal Gmail send client: composes a raw RFC 2822 message and submits it
//! with a user's stored bearer token.

use crate::error::NudgeError;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::json;
use tracing::info;
use url::Url;

/// Gmail send client bound to one send endpoint.
///
/// Credentials are per-call, never stored; the same sender serves every
/// connected user.
#[derive(Clone)]
pub struct GmailSender {
    http: reqwest::Client,
    send_endpoint: Url,
}

impl GmailSender {
    pub fn new(http: reqwest::Client, send_endpoint: Url) -> Self {
        Self {
            http,
            send_endpoint,
        }
    }

    /// Send a plain-text message as the token's owner.
    ///
    /// Any transport error or API-level rejection (expired token, invalid
    /// recipient, quota) is a `MailSend` error; the caller decides whether it
    /// is user-visible.
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        access_token: &str,
    ) -> Result<(), NudgeError> {
        let raw = build_raw_message(to, subject, body);

        let resp = self
            .http
            .post(self.send_endpoint.clone())
            .bearer_auth(access_token)
            .json(&json!({ "raw": raw }))
            .send()
            .await
            .map_err(|e| NudgeError::MailSend {
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(NudgeError::MailSend {
                reason: format!("gmail send rejected ({status}): {body}"),
            });
        }

        info!(%to, "gmail message accepted");
        Ok(())
    }
}

/// Compose the To/Subject/Content-Type/blank-line/body sequence and encode it
/// as URL-safe base64 without padding, as the Gmail API expects.
pub fn build_raw_message(to: &str, subject: &str, body: &str) -> String {
    let message = format!(
        "To: {to}\r\nSubject: {subject}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{body}"
    );
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_message_is_urlsafe_unpadded_encoding_of_exact_sequence() {
        let raw = build_raw_message("a@x.com", "Hello", "line one\nline two");

        let decoded = URL_SAFE_NO_PAD.decode(&raw).expect("decodable payload");
        assert_eq!(
            String::from_utf8(decoded).expect("utf-8 payload"),
            "To: a@x.com\r\nSubject: Hello\r\nContent-Type: text/plain; charset=utf-8\r\n\r\nline one\nline two"
        );
        assert!(!raw.contains('='), "padding must be stripped");
        assert!(!raw.contains('+') && !raw.contains('/'), "must be URL-safe");
    }

    #[test]
    fn raw_message_keeps_utf8_body() {
        let raw = build_raw_message("a@x.com", "Grüße", "héllo wörld ✓");
        let decoded = URL_SAFE_NO_PAD.decode(&raw).expect("decodable payload");
        let text = String::from_utf8(decoded).expect("utf-8 payload");
        assert!(text.ends_with("héllo wörld ✓"));
        assert!(text.contains("Subject: Grüße\r\n"));
    }
}
