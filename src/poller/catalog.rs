// src/poller/catalog.rs
use super::endpoint::Endpoint;

/// The services and dependencies of a local development deployment.
pub fn catalog() -> Result<Vec<Endpoint>, url::ParseError> {
    Ok(vec![
        Endpoint::service("auth", "http://localhost:4040/ping")?,
        Endpoint::service("user", "http://localhost:3030/ping")?,
        Endpoint::service("webhooks", "http://localhost:2525/ping")?,
        Endpoint::service("notification", "http://localhost:2020/ping")?,
        Endpoint::service("gateway", "http://localhost:7070/ping?service=gateway")?,
        Endpoint::service("workflow", "http://localhost:5050/ping")?,
        Endpoint::service("search", "http://localhost:9090/ping")?,
        Endpoint::dependency("countryconfig", "http://localhost:3040/ping")?,
        Endpoint::service("metrics", "http://localhost:1050/ping")?,
        Endpoint::service("client", "http://localhost:3000/ping")?,
        Endpoint::service("login", "http://localhost:3020/ping")?,
        Endpoint::service("config", "http://localhost:2021/ping")?,
        // OpenHIM answers 404 on /ping until channels exist
        Endpoint::dependency("openhim", "http://localhost:5001/ping")?.accepting([200, 404]),
    ])
}
