// src/probes/locations.rs
use super::session::Session;
use crate::check::{CheckError, Probe};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const RESTORE_BACKUP: &str =
    "Try running `yarn db:backup:restore` in your country config repository.";

/// FHIR bundle returned by the `Location` search. Entries are kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationBundle {
    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default)]
    pub entry: Vec<Value>,
}

/// Query Hearth for locations with the session's bearer token.
///
/// Waits on the shared login; a failed login is returned as is.
pub async fn fetch_locations(session: &Session) -> Result<LocationBundle, Arc<CheckError>> {
    let token = session.login().await?;
    query_locations(session, &token.token).await.map_err(Arc::new)
}

async fn query_locations(session: &Session, token: &str) -> Result<LocationBundle, CheckError> {
    let url = session.topology().hearth.join("/fhir/Location")?;

    debug!("GET {}", url);
    let response = session
        .client()
        .get(url.clone())
        .bearer_auth(token)
        .send()
        .await?;

    let status = response.status();
    // A JSON error body from Hearth still means the query did not complete
    if !status.is_success() {
        return Err(CheckError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| CheckError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Hearth answers the location query, whatever it contains.
pub struct LocationsProbe {
    session: Arc<Session>,
}

impl LocationsProbe {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Probe for LocationsProbe {
    type Output = LocationBundle;

    async fn probe(&self) -> Result<LocationBundle, Arc<CheckError>> {
        fetch_locations(&self.session).await
    }

    fn name(&self) -> &'static str {
        "hearth-locations"
    }

    fn success_summary(&self, _bundle: &LocationBundle) -> String {
        "OpenHIM channels set up".to_string()
    }

    fn failure_summary(&self) -> String {
        "Your OpenHIM doesn't have any channels.".to_string()
    }

    fn instructions(&self) -> &'static str {
        RESTORE_BACKUP
    }
}

/// Same query as [`LocationsProbe`], but an empty collection is a failure.
pub struct RecordCountProbe {
    session: Arc<Session>,
}

impl RecordCountProbe {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Probe for RecordCountProbe {
    type Output = u64;

    async fn probe(&self) -> Result<u64, Arc<CheckError>> {
        let bundle = fetch_locations(&self.session).await?;
        match bundle.total {
            Some(total) if total > 0 => Ok(total),
            _ => Err(Arc::new(CheckError::NoLocations)),
        }
    }

    fn name(&self) -> &'static str {
        "hearth-record-count"
    }

    fn success_summary(&self, total: &u64) -> String {
        format!("There are {} locations in Hearth", total)
    }

    fn failure_summary(&self) -> String {
        "No locations in Hearth's Locations collection.".to_string()
    }

    fn instructions(&self) -> &'static str {
        RESTORE_BACKUP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::probes::Topology;
    use mockito::{Mock, Server, ServerGuard};

    async fn mock_login(server: &mut ServerGuard) -> Mock {
        server
            .mock("POST", "/authenticate")
            .with_body(r#"{"token":"tok"}"#)
            .expect(1)
            .create_async()
            .await
    }

    async fn mock_locations(server: &mut ServerGuard, body: &str) -> Mock {
        server
            .mock("GET", "/fhir/Location")
            .match_header("authorization", "Bearer tok")
            .with_header("content-type", "application/fhir+json")
            .with_body(body)
            .create_async()
            .await
    }

    fn session(server: &ServerGuard) -> Arc<Session> {
        let topology = Topology::single(&server.url()).unwrap();
        Arc::new(Session::new(topology, AuthConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn test_record_count_fails_on_zero_total() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _locations = mock_locations(&mut server, r#"{"resourceType":"Bundle","total":0}"#).await;

        let session = session(&server);

        let bundle = LocationsProbe::new(session.clone()).probe().await.unwrap();
        assert_eq!(bundle.total, Some(0));

        let err = RecordCountProbe::new(session).probe().await.unwrap_err();
        assert!(matches!(err.as_ref(), CheckError::NoLocations));
    }

    #[tokio::test]
    async fn test_record_count_fails_on_missing_total() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _locations = mock_locations(&mut server, r#"{"resourceType":"Bundle"}"#).await;

        let err = RecordCountProbe::new(session(&server))
            .probe()
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), CheckError::NoLocations));
    }

    #[tokio::test]
    async fn test_record_count_succeeds_with_locations() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _locations = mock_locations(
            &mut server,
            r#"{"resourceType":"Bundle","total":3,"entry":[{},{},{}]}"#,
        )
        .await;

        let probe = RecordCountProbe::new(session(&server));
        let total = probe.probe().await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(probe.success_summary(&total), "There are 3 locations in Hearth");
    }

    #[tokio::test]
    async fn test_both_probes_share_one_login() {
        let mut server = Server::new_async().await;
        let login = mock_login(&mut server).await;
        let locations = server
            .mock("GET", "/fhir/Location")
            .match_header("authorization", "Bearer tok")
            .with_body(r#"{"total":1}"#)
            .expect(2)
            .create_async()
            .await;

        let session = session(&server);
        let listing = LocationsProbe::new(session.clone());
        let counting = RecordCountProbe::new(session);

        let (listed, counted) = tokio::join!(listing.probe(), counting.probe());
        assert!(listed.is_ok());
        assert_eq!(counted.unwrap(), 1);

        login.assert_async().await;
        locations.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_login_is_shared_by_dependents() {
        let mut server = Server::new_async().await;
        let authenticate = server
            .mock("POST", "/authenticate")
            .with_body(r#"{"statusCode":401,"error":"Bad password"}"#)
            .expect(1)
            .create_async()
            .await;
        let locations = server
            .mock("GET", "/fhir/Location")
            .expect(0)
            .create_async()
            .await;

        let session = session(&server);
        let listed = LocationsProbe::new(session.clone()).probe().await.unwrap_err();
        let counted = RecordCountProbe::new(session).probe().await.unwrap_err();

        assert!(Arc::ptr_eq(&listed, &counted));
        assert_eq!(listed.user_message(), Some("Bad password"));
        authenticate.assert_async().await;
        locations.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_fails_listing() {
        let mut server = Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _locations = server
            .mock("GET", "/fhir/Location")
            .with_status(401)
            .create_async()
            .await;

        let err = LocationsProbe::new(session(&server))
            .probe()
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), CheckError::Status { .. }));
    }
}
