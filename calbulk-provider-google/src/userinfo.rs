//! Account lookup for the signed-in token.

use std::time::Duration;

use anyhow::{Context, Result};
use calbulk_core::BearerToken;
use serde::Deserialize;

pub const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
}

/// Email address of the account `token` belongs to.
pub async fn fetch_account_email(token: &BearerToken, timeout: Duration) -> Result<String> {
    let response = reqwest::Client::new()
        .get(USERINFO_URL)
        .bearer_auth(token.as_str())
        .timeout(timeout)
        .send()
        .await
        .context("Failed to reach Google user info endpoint")?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        anyhow::bail!("Google user info request failed ({}): {}", status, body);
    }

    parse_email(&body)
}

fn parse_email(body: &str) -> Result<String> {
    let info: UserInfo =
        serde_json::from_str(body).context("Failed to parse Google user info response")?;

    info.email
        .filter(|email| !email.is_empty())
        .context("Token has no email scope; cannot determine the account")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email() {
        let body = r#"{"id":"1234","email":"me@example.com","verified_email":true}"#;
        assert_eq!(parse_email(body).unwrap(), "me@example.com");
    }

    #[test]
    fn test_parse_email_without_scope() {
        assert!(parse_email(r#"{"id":"1234"}"#).is_err());
        assert!(parse_email("not json").is_err());
    }
}
