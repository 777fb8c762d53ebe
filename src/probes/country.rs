// src/probes/country.rs
use super::session::Session;
use crate::check::{CheckError, Probe};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;
use url::Url;

const ASSIGNMENT: &str = "window.config";

/// Client configuration published by the country-config service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryConfig {
    #[serde(rename = "COUNTRY")]
    pub country: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parse the body of `/client-config.js` without executing it.
///
/// Accepted shapes are a bare object literal or a `window.config = {...}`
/// assignment. The literal is read as JSON5, so unquoted keys, single
/// quotes, comments and trailing commas are fine. Anything after the closing
/// brace is ignored.
pub fn parse_client_config(url: &Url, body: &str) -> Result<CountryConfig, CheckError> {
    let payload = extract_payload(body)?;

    let config: CountryConfig =
        json5::from_str(payload).map_err(|source| CheckError::ConfigSyntax {
            url: url.to_string(),
            source,
        })?;

    if config.country.trim().is_empty() {
        return Err(CheckError::InvalidConfig("COUNTRY is empty".to_string()));
    }

    Ok(config)
}

fn extract_payload(body: &str) -> Result<&str, CheckError> {
    let body = body.trim_start();
    let literal = if body.starts_with('{') {
        body
    } else {
        let rest = body.strip_prefix(ASSIGNMENT).ok_or_else(|| {
            CheckError::InvalidConfig(format!(
                "expected an object literal or `{} = ...`",
                ASSIGNMENT
            ))
        })?;
        rest.trim_start()
            .strip_prefix('=')
            .ok_or_else(|| {
                CheckError::InvalidConfig(format!("`{}` is not assigned", ASSIGNMENT))
            })?
            .trim_start()
    };

    if !literal.starts_with('{') {
        return Err(CheckError::InvalidConfig(format!(
            "`{}` is not an object literal",
            ASSIGNMENT
        )));
    }

    let end = closing_brace(literal)
        .ok_or_else(|| CheckError::InvalidConfig("unterminated object literal".to_string()))?;
    Ok(&literal[..=end])
}

/// Byte offset of the brace closing the literal's first `{`, skipping
/// strings and comments.
fn closing_brace(literal: &str) -> Option<usize> {
    let bytes = literal.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

pub async fn fetch_country_config(session: &Session) -> Result<CountryConfig, CheckError> {
    let url = session.topology().country_config.join("/client-config.js")?;

    debug!("GET {}", url);
    let response = session.client().get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CheckError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.text().await?;
    parse_client_config(&url, &body)
}

pub struct CountryConfigProbe {
    session: Arc<Session>,
}

impl CountryConfigProbe {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Probe for CountryConfigProbe {
    type Output = CountryConfig;

    async fn probe(&self) -> Result<CountryConfig, Arc<CheckError>> {
        fetch_country_config(&self.session).await.map_err(Arc::new)
    }

    fn name(&self) -> &'static str {
        "country-config"
    }

    fn success_summary(&self, config: &CountryConfig) -> String {
        format!("Country config {}", config.country)
    }

    fn failure_summary(&self) -> String {
        "Country config not running".to_string()
    }

    fn instructions(&self) -> &'static str {
        "Go to your country config repository (opencrvs-farajaland or \
         opencrvs-your-country) and run `yarn dev`."
    }
}
