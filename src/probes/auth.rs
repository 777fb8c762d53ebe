// src/probes/auth.rs
use super::session::Session;
use crate::check::{CheckError, Probe};
use crate::config::AuthConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct VerifyCode<'a> {
    code: &'a str,
    nonce: &'a str,
}

#[derive(Deserialize)]
struct AuthenticateResponse {
    nonce: Option<String>,
    token: Option<String>,
}

#[derive(Deserialize)]
struct VerifyCodeResponse {
    token: Option<String>,
}

// The auth service reports bad credentials inside the body, usually with 200.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Rejection {
    status_code: u16,
    #[serde(default)]
    error: Option<String>,
}

/// Two-step login: credentials for a nonce, then nonce plus the
/// verification code for a token.
pub async fn login(
    client: &Client,
    base: &Url,
    credentials: &AuthConfig,
) -> Result<AuthToken, CheckError> {
    let url = base.join("/authenticate")?;
    let authenticated: AuthenticateResponse = post_json(
        client,
        url.clone(),
        &Credentials {
            username: &credentials.username,
            password: &credentials.password,
        },
    )
    .await?;

    if let Some(token) = authenticated.token {
        debug!("Auth service issued a token without verification");
        return Ok(AuthToken { token });
    }

    let nonce = authenticated.nonce.ok_or_else(|| CheckError::MissingField {
        url: url.to_string(),
        field: "nonce",
    })?;

    let url = base.join("/verifyCode")?;
    let verified: VerifyCodeResponse = post_json(
        client,
        url.clone(),
        &VerifyCode {
            code: &credentials.verification_code,
            nonce: &nonce,
        },
    )
    .await?;

    verified
        .token
        .map(|token| AuthToken { token })
        .ok_or_else(|| CheckError::MissingField {
            url: url.to_string(),
            field: "token",
        })
}

async fn post_json<B, R>(client: &Client, url: Url, body: &B) -> Result<R, CheckError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    debug!("POST {}", url);
    let response = client.post(url.clone()).json(body).send().await?;
    let status = response.status();
    let text = response.text().await?;

    if let Ok(rejection) = serde_json::from_str::<Rejection>(&text) {
        if rejection.status_code == 401 {
            return Err(CheckError::Unauthorized(
                rejection.error.unwrap_or_else(|| "Unauthorized".to_string()),
            ));
        }
    }

    if !status.is_success() {
        return Err(CheckError::Status {
            url: url.to_string(),
            status,
        });
    }

    serde_json::from_str(&text).map_err(|source| CheckError::Decode {
        url: url.to_string(),
        source,
    })
}

pub struct LoginProbe {
    session: Arc<Session>,
}

impl LoginProbe {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Probe for LoginProbe {
    type Output = AuthToken;

    async fn probe(&self) -> Result<AuthToken, Arc<CheckError>> {
        self.session.login().await
    }

    fn name(&self) -> &'static str {
        "login"
    }

    fn success_summary(&self, _token: &AuthToken) -> String {
        format!("Login OK as {}", self.session.username())
    }

    fn failure_summary(&self) -> String {
        format!("Failed to login as {}", self.session.username())
    }

    fn instructions(&self) -> &'static str {
        "Try running `yarn db:backup:restore` in your country config repository. \
         This command loads a previous backup of the database."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn credentials() -> AuthConfig {
        AuthConfig::default()
    }

    #[tokio::test]
    async fn test_verify_call_embeds_nonce_and_fixed_code() {
        let mut server = Server::new_async().await;
        let authenticate = server
            .mock("POST", "/authenticate")
            .match_body(Matcher::Json(json!({
                "username": "kennedy.mweene",
                "password": "test"
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"nonce":"abc"}"#)
            .expect(1)
            .create_async()
            .await;
        let verify = server
            .mock("POST", "/verifyCode")
            .match_body(Matcher::Json(json!({"code": "000000", "nonce": "abc"})))
            .with_header("content-type", "application/json")
            .with_body(r#"{"token":"bearer-123"}"#)
            .expect(1)
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let token = login(&Client::new(), &base, &credentials()).await.unwrap();

        assert_eq!(token.token, "bearer-123");
        authenticate.assert_async().await;
        verify.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_from_first_step_skips_verification() {
        let mut server = Server::new_async().await;
        let _authenticate = server
            .mock("POST", "/authenticate")
            .with_body(r#"{"token":"direct"}"#)
            .create_async()
            .await;
        let verify = server
            .mock("POST", "/verifyCode")
            .expect(0)
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let token = login(&Client::new(), &base, &credentials()).await.unwrap();

        assert_eq!(token.token, "direct");
        verify.assert_async().await;
    }

    #[tokio::test]
    async fn test_embedded_401_is_unauthorized() {
        let mut server = Server::new_async().await;
        let _authenticate = server
            .mock("POST", "/authenticate")
            .with_status(200)
            .with_body(r#"{"statusCode":401,"error":"Invalid credentials"}"#)
            .create_async()
            .await;
        let verify = server
            .mock("POST", "/verifyCode")
            .expect(0)
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let err = login(&Client::new(), &base, &credentials()).await.unwrap_err();

        assert!(matches!(err, CheckError::Unauthorized(ref m) if m == "Invalid credentials"));
        assert_eq!(err.user_message(), Some("Invalid credentials"));
        verify.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_nonce() {
        let mut server = Server::new_async().await;
        let _authenticate = server
            .mock("POST", "/authenticate")
            .with_body("{}")
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let err = login(&Client::new(), &base, &credentials()).await.unwrap_err();

        assert!(matches!(err, CheckError::MissingField { field: "nonce", .. }));
    }

    #[tokio::test]
    async fn test_server_error_on_verification() {
        let mut server = Server::new_async().await;
        let _authenticate = server
            .mock("POST", "/authenticate")
            .with_body(r#"{"nonce":"n1"}"#)
            .create_async()
            .await;
        let _verify = server
            .mock("POST", "/verifyCode")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let err = login(&Client::new(), &base, &credentials()).await.unwrap_err();

        assert!(matches!(
            err,
            CheckError::Status { status, .. } if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert!(err.user_message().is_none());
    }
}
