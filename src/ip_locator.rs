use std::{net::IpAddr, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::Location;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Lookup service answered with an invalid address: {0}")]
    InvalidAddress(String),
    #[error("Geolocation service refused the lookup: {0}")]
    Refused(String),
}

/// Finds out where a submission comes from.
#[async_trait]
pub trait IpLocator: Send + Sync {
    async fn public_ip(&self) -> Result<IpAddr, LocatorError>;

    async fn locate(&self, ip: IpAddr) -> Result<Location, LocatorError>;
}

/// Talks to an ipify-style address endpoint and an ipapi-style
/// geolocation endpoint.
#[derive(Clone, Debug)]
pub struct HttpIpLocator {
    client: Client,
    public_ip_url: String,
    geolocation_url: String,
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl HttpIpLocator {
    pub fn new(
        public_ip_url: impl Into<String>,
        geolocation_url: impl Into<String>,
    ) -> Result<HttpIpLocator, LocatorError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpIpLocator {
            client,
            public_ip_url: public_ip_url.into(),
            geolocation_url: geolocation_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn location_url(&self, ip: IpAddr) -> String {
        format!("{}/{ip}/json/", self.geolocation_url)
    }
}

#[derive(Deserialize)]
struct PublicIpResponse {
    ip: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GeolocationResponse {
    Failure {
        error: bool,
        reason: Option<String>,
    },
    Success(Location),
}

#[async_trait]
impl IpLocator for HttpIpLocator {
    #[tracing::instrument(skip(self))]
    async fn public_ip(&self) -> Result<IpAddr, LocatorError> {
        let response: PublicIpResponse = self
            .client
            .get(&self.public_ip_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_address(&response.ip)
    }

    #[tracing::instrument(skip(self, ip))]
    async fn locate(&self, ip: IpAddr) -> Result<Location, LocatorError> {
        let response: GeolocationResponse = self
            .client
            .get(self.location_url(ip))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        into_location(response)
    }
}

fn parse_address(raw: &str) -> Result<IpAddr, LocatorError> {
    raw.trim()
        .parse()
        .map_err(|_| LocatorError::InvalidAddress(raw.to_string()))
}

fn into_location(response: GeolocationResponse) -> Result<Location, LocatorError> {
    match response {
        GeolocationResponse::Success(location) => {
            debug!("Located submission in {:?}", location.summary());
            Ok(location)
        }
        GeolocationResponse::Failure { error: true, reason } => Err(LocatorError::Refused(
            reason.unwrap_or_else(|| "no reason given".to_string()),
        )),
        GeolocationResponse::Failure { error: false, .. } => Ok(Location::default()),
    }
}
