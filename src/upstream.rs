#![cfg(feature = "web")]

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Response, Url, redirect};
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::error::UpstreamError;

/// Base URL of the data.gov.in resource API
pub const DATA_GOV_BASE: &str = "https://api.data.gov.in/resource";

/// Largest upstream body read into memory
pub const MAX_UPSTREAM_BODY: usize = 10 * 1024 * 1024;

/// HTTP client for the open-data API and user-supplied JSON endpoints
///
/// Every request shares the timeout given at construction. User-supplied
/// URLs must resolve to public addresses unless private hosts are allowed.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    timeout: Duration,
    data_gov_base: String,
    data_gov_key: Option<String>,
    allow_private_hosts: bool,
    max_body: usize,
}

impl UpstreamClient {
    pub fn new(timeout: Duration, data_gov_key: Option<String>) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            timeout,
            data_gov_base: DATA_GOV_BASE.to_string(),
            data_gov_key,
            allow_private_hosts: false,
            max_body: MAX_UPSTREAM_BODY,
        })
    }

    /// Points data.gov.in lookups at another host
    pub fn with_data_gov_base(mut self, base: impl Into<String>) -> Self {
        self.data_gov_base = base.into();
        self
    }

    /// Lets [`UpstreamClient::fetch_json`] reach loopback and private hosts
    pub fn with_private_hosts(mut self, allowed: bool) -> Self {
        self.allow_private_hosts = allowed;
        self
    }

    pub fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = max_body;
        self
    }

    /// Fetches the `records` array of a data.gov.in resource
    ///
    /// A response without `records` yields an empty list.
    ///
    /// # Errors
    /// * `MissingApiKey` if no key is configured
    /// * `Status` for non-2xx responses
    /// * `Request` for network and timeout failures
    /// * `TooLarge` / `Decode` for oversized or malformed bodies
    pub async fn data_gov_records(
        &self,
        resource_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>, UpstreamError> {
        let key = self
            .data_gov_key
            .as_deref()
            .ok_or(UpstreamError::MissingApiKey)?;
        let url = format!("{}/{}", self.data_gov_base, resource_id);
        let limit = limit.to_string();
        let offset = offset.to_string();

        let response = self
            .http
            .get(url)
            .query(&[
                ("api-key", key),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ])
            .send()
            .await?;

        let body = self.read_json(response).await?;
        Ok(match body.get("records") {
            Some(Value::Array(records)) => records.clone(),
            _ => Vec::new(),
        })
    }

    /// Fetches an arbitrary JSON document from a user-supplied URL
    ///
    /// Only `http` and `https` are accepted, and every address the host
    /// resolves to must be public. The connection is pinned to the checked
    /// address and redirects are not followed. A non-empty `api_key` is sent
    /// both as a bearer token and as an `api-key` header.
    pub async fn fetch_json(&self, url: &str, api_key: Option<&str>) -> Result<Value, UpstreamError> {
        let url = Url::parse(url).map_err(|e| UpstreamError::InvalidUrl(e.to_string()))?;
        let client = self.pinned_client(&url).await?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", key)) {
                headers.insert(AUTHORIZATION, bearer);
            }
            if let Ok(raw) = HeaderValue::from_str(key) {
                headers.insert("api-key", raw);
            }
        }

        let response = client.get(url).headers(headers).send().await?;
        self.read_json(response).await
    }

    /// Builds a one-off client whose only reachable address is the checked one
    async fn pinned_client(&self, url: &Url) -> Result<reqwest::Client, UpstreamError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(UpstreamError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| UpstreamError::InvalidUrl("missing host".to_string()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| UpstreamError::InvalidUrl("missing port".to_string()))?;

        let bare_host = host.trim_start_matches('[').trim_end_matches(']');
        let addrs: Vec<SocketAddr> = match bare_host.parse::<IpAddr>() {
            Ok(ip) => vec![SocketAddr::new(ip, port)],
            Err(_) => tokio::net::lookup_host((bare_host, port)).await?.collect(),
        };

        let first = *addrs
            .first()
            .ok_or_else(|| UpstreamError::InvalidUrl(format!("{} has no addresses", host)))?;
        if !self.allow_private_hosts {
            if let Some(bad) = addrs.iter().find(|addr| !is_public_ip(addr.ip())) {
                log::warn!("Blocked upstream fetch of {} ({})", url, bad.ip());
                return Err(UpstreamError::Blocked(bad.ip().to_string()));
            }
        }

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(redirect::Policy::none());
        if bare_host.parse::<IpAddr>().is_err() {
            builder = builder.resolve(bare_host, first);
        }
        Ok(builder.build()?)
    }

    /// Reads a JSON body, refusing anything larger than `max_body`
    async fn read_json(&self, mut response: Response) -> Result<Value, UpstreamError> {
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }
        if let Some(length) = response.content_length() {
            if length > self.max_body as u64 {
                return Err(UpstreamError::TooLarge(self.max_body));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_body {
                return Err(UpstreamError::TooLarge(self.max_body));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// True for addresses reachable on the public internet
///
/// Loopback, private, link-local, shared (CGNAT), unspecified, broadcast,
/// multicast, documentation and unique-local ranges are not public.
/// IPv4-mapped IPv6 addresses are judged as IPv4.
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_multicast()
                || v4.is_documentation()
                || a == 0
                || (a == 100 && (64..128).contains(&b)))
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_public_ip(IpAddr::V4(v4));
            }
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_multicast()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80)
        }
    }
}
