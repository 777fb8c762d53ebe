// src/probes/session.rs
use super::auth::{self, AuthToken};
use crate::check::CheckError;
use crate::config::AuthConfig;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

const AUTH_URL: &str = "http://localhost:4040";
const COUNTRY_CONFIG_URL: &str = "http://localhost:3040";
const HEARTH_URL: &str = "http://localhost:5001";

/// Base addresses of the services the probes talk to.
#[derive(Debug, Clone)]
pub struct Topology {
    pub auth: Url,
    pub country_config: Url,
    pub hearth: Url,
}

impl Topology {
    /// The fixed local deployment.
    pub fn local() -> Result<Self, url::ParseError> {
        Ok(Self {
            auth: Url::parse(AUTH_URL)?,
            country_config: Url::parse(COUNTRY_CONFIG_URL)?,
            hearth: Url::parse(HEARTH_URL)?,
        })
    }

    /// Every service behind one base URL. Used by tests against a mock server.
    pub fn single(base: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(base)?;
        Ok(Self {
            auth: base.clone(),
            country_config: base.clone(),
            hearth: base,
        })
    }
}

/// State shared by all probes of one dashboard run.
///
/// The login exchange is started by whichever probe asks for it first and
/// its result, success or failure, is handed to every later caller.
pub struct Session {
    client: Client,
    topology: Topology,
    credentials: AuthConfig,
    login: OnceCell<Result<AuthToken, Arc<CheckError>>>,
}

impl Session {
    pub fn new(topology: Topology, credentials: AuthConfig) -> Result<Self, CheckError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            topology,
            credentials,
            login: OnceCell::new(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Memoized login.
    pub async fn login(&self) -> Result<AuthToken, Arc<CheckError>> {
        self.login
            .get_or_init(|| async {
                debug!("Starting login exchange for {}", self.credentials.username);
                auth::login(&self.client, &self.topology.auth, &self.credentials)
                    .await
                    .map_err(Arc::new)
            })
            .await
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_concurrent_logins_hit_auth_once() {
        let mut server = Server::new_async().await;
        let authenticate = server
            .mock("POST", "/authenticate")
            .with_body(r#"{"nonce":"n"}"#)
            .expect(1)
            .create_async()
            .await;
        let verify = server
            .mock("POST", "/verifyCode")
            .with_body(r#"{"token":"shared"}"#)
            .expect(1)
            .create_async()
            .await;

        let topology = Topology::single(&server.url()).unwrap();
        let session = Session::new(topology, AuthConfig::default()).unwrap();

        let (a, b, c) = tokio::join!(session.login(), session.login(), session.login());
        for token in [a, b, c] {
            assert_eq!(token.unwrap().token, "shared");
        }

        authenticate.assert_async().await;
        verify.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_login_is_not_retried() {
        let mut server = Server::new_async().await;
        let authenticate = server
            .mock("POST", "/authenticate")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let topology = Topology::single(&server.url()).unwrap();
        let session = Session::new(topology, AuthConfig::default()).unwrap();

        let first = session.login().await.unwrap_err();
        let second = session.login().await.unwrap_err();

        assert!(Arc::ptr_eq(&first, &second));
        authenticate.assert_async().await;
    }

    #[test]
    fn test_local_topology() {
        let topology = Topology::local().unwrap();
        assert_eq!(topology.auth.port(), Some(4040));
        assert_eq!(topology.country_config.port(), Some(3040));
        assert_eq!(topology.hearth.port(), Some(5001));
    }
}
