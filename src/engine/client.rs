//! HTTP implementation of the catalog and volume sources.

use anyhow::Context;
use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::source::{CatalogSource, VolumeSource};
use crate::utils::config::HLP_LEADER_ADDRESS;
use crate::{Opts, Result, VaultRef, VaultVolumeSample, VolumeFigures};

/// Blocking client for the stats catalog and the info endpoint. Holds no limiter; the retry
/// policy consults one before every call.
pub struct HttpSource {
    http: Client,
    info_url: String,
    catalog_url: String,
}

impl HttpSource {
    pub fn new(opts: &Opts) -> Result<Self> {
        let http = Client::builder()
            .timeout(opts.http_timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            info_url: opts.info_url.trim_end_matches('/').to_string(),
            catalog_url: opts.catalog_url.trim_end_matches('/').to_string(),
        })
    }
}

impl CatalogSource for HttpSource {
    fn fetch_vaults(&self) -> Result<Vec<VaultRef>> {
        let resp = self
            .http
            .get(&self.catalog_url)
            .send()
            .with_context(|| format!("fetch vault catalog from {}", self.catalog_url))?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("catalog returned status {} for {}", status, self.catalog_url);
        }
        let body = resp.text().context("read catalog response")?;
        decode_catalog(&body)
    }
}

impl VolumeSource for HttpSource {
    fn fetch_volume(&self, address: &str) -> std::result::Result<VaultVolumeSample, FetchError> {
        let payload = VaultDetailsRequest {
            kind: "vaultDetails",
            vault_address: address,
        };
        let resp = self
            .http
            .post(&self.info_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()?;
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited(format!("API returned status {status}")));
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(FetchError::Upstream(format!(
                "API returned status {status}: {body}"
            )));
        }
        let body = resp.text()?;
        decode_vault_details(&body)
            .map_err(|e| FetchError::Upstream(format!("vault {address}: {e}")))
    }
}

// ---- Wire types ----

#[derive(Serialize)]
struct VaultDetailsRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "vaultAddress")]
    vault_address: &'a str,
}

#[derive(Deserialize)]
struct CatalogEntry {
    summary: VaultSummary,
}

#[derive(Deserialize)]
struct VaultSummary {
    #[serde(default)]
    name: String,
    #[serde(rename = "vaultAddress")]
    address: String,
    #[serde(default)]
    leader: String,
    #[serde(default)]
    tvl: Option<Decimal>,
    #[serde(rename = "isClosed", default)]
    is_closed: bool,
}

/// Upstream sends figures as decimal strings; accept bare numbers too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Decimal {
    Text(String),
    Number(f64),
}

impl Decimal {
    /// Unparseable text counts as zero.
    fn value(&self) -> f64 {
        match self {
            Decimal::Text(s) => s.trim().parse().unwrap_or(0.0),
            Decimal::Number(n) => *n,
        }
    }
}

#[derive(Deserialize)]
struct VaultDetailsResponse {
    portfolio: Vec<(String, PortfolioWindow)>,
}

#[derive(Deserialize)]
struct PortfolioWindow {
    #[serde(default)]
    vlm: Option<Decimal>,
}

/// Decode the catalog listing. Priority class is decided by the vault's leader.
pub fn decode_catalog(body: &str) -> Result<Vec<VaultRef>> {
    let entries: Vec<CatalogEntry> =
        serde_json::from_str(body).context("parse vault catalog JSON")?;
    debug!("catalog lists {} vaults", entries.len());
    Ok(entries
        .into_iter()
        .map(|e| {
            let s = e.summary;
            VaultRef {
                is_priority: s.leader.eq_ignore_ascii_case(HLP_LEADER_ADDRESS),
                tvl: s.tvl.as_ref().map(Decimal::value).unwrap_or(0.0),
                address: s.address,
                name: s.name,
                is_closed: s.is_closed,
            }
        })
        .collect())
}

/// Decode a `vaultDetails` response into a sample. Unknown windows are rejected.
pub fn decode_vault_details(body: &str) -> std::result::Result<VaultVolumeSample, String> {
    let resp: VaultDetailsResponse =
        serde_json::from_str(body).map_err(|e| format!("malformed vault details: {e}"))?;
    let mut sample = VaultVolumeSample::default();
    for (window, data) in &resp.portfolio {
        let vlm = data.vlm.as_ref().map(Decimal::value).unwrap_or(0.0);
        let slot = figure_slot(&mut sample, window)
            .ok_or_else(|| format!("invalid vault volume window {window:?}"))?;
        *slot = vlm;
    }
    Ok(sample)
}

fn figure_slot<'a>(sample: &'a mut VaultVolumeSample, window: &str) -> Option<&'a mut f64> {
    let (figures, key): (&mut VolumeFigures, &str) = match window.strip_prefix("perp") {
        Some(rest) => (&mut sample.perp, rest),
        None => (&mut sample.spot, window),
    };
    match key {
        "day" | "Day" => Some(&mut figures.day),
        "week" | "Week" => Some(&mut figures.week),
        "month" | "Month" => Some(&mut figures.month),
        "allTime" | "AllTime" => Some(&mut figures.all_time),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_vault_details_all_windows() {
        let body = r#"{"portfolio":[
            ["day",{"vlm":"1.5","pnlHistory":[]}],
            ["week",{"vlm":"10"}],
            ["month",{"vlm":"100"}],
            ["allTime",{"vlm":"1000"}],
            ["perpDay",{"vlm":"0.5"}],
            ["perpWeek",{"vlm":"5"}],
            ["perpMonth",{"vlm":"50"}],
            ["perpAllTime",{"vlm":"500"}]
        ]}"#;
        let s = decode_vault_details(body).unwrap();
        assert_eq!(s.spot.day, 1.5);
        assert_eq!(s.spot.all_time, 1000.0);
        assert_eq!(s.perp.week, 5.0);
        assert_eq!(s.perp.all_time, 500.0);
    }

    #[test]
    fn test_decode_vault_details_unknown_window_rejected() {
        let body = r#"{"portfolio":[["fortnight",{"vlm":"1"}]]}"#;
        let err = decode_vault_details(body).unwrap_err();
        assert!(err.contains("fortnight"));
    }

    #[test]
    fn test_decode_vault_details_bad_number_is_zero() {
        let body = r#"{"portfolio":[["day",{"vlm":"n/a"}]]}"#;
        assert_eq!(decode_vault_details(body).unwrap().spot.day, 0.0);
    }

    #[test]
    fn test_decode_vault_details_not_json() {
        assert!(decode_vault_details("<html>").is_err());
    }

    #[test]
    fn test_decode_catalog_priority_and_tvl() {
        let body = format!(
            r#"[
            {{"summary":{{"name":"HLP Strategy A","vaultAddress":"0xa","leader":"{HLP_LEADER_ADDRESS}","tvl":"1234.5","isClosed":false}}}},
            {{"summary":{{"name":"Other","vaultAddress":"0xb","leader":"0x1","tvl":7,"isClosed":true}}}}
        ]"#
        );
        let vaults = decode_catalog(&body).unwrap();
        assert_eq!(vaults.len(), 2);
        assert!(vaults[0].is_priority);
        assert_eq!(vaults[0].tvl, 1234.5);
        assert!(!vaults[1].is_priority);
        assert!(vaults[1].is_closed);
        assert_eq!(vaults[1].tvl, 7.0);
    }

    // --- HTTP status mapping ---

    fn source_for(server: &mockito::ServerGuard) -> HttpSource {
        let opts = Opts {
            info_url: format!("{}/info", server.url()),
            catalog_url: format!("{}/vaults", server.url()),
            ..Default::default()
        };
        HttpSource::new(&opts).unwrap()
    }

    #[test]
    fn test_fetch_volume_429_is_rate_limited() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/info")
            .with_status(429)
            .with_body("slow down")
            .create();
        let err = source_for(&server).fetch_volume("0xabc").unwrap_err();
        assert!(err.is_rate_limited(), "{err}");
        mock.assert();
    }

    #[test]
    fn test_fetch_volume_server_error_is_upstream_with_body() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/info")
            .with_status(500)
            .with_body("internal boom")
            .create();
        match source_for(&server).fetch_volume("0xabc") {
            Err(FetchError::Upstream(msg)) => {
                assert!(msg.contains("500"), "{msg}");
                assert!(msg.contains("internal boom"), "{msg}");
            }
            other => panic!("expected upstream failure, got {other:?}"),
        }
    }

    #[test]
    fn test_fetch_volume_sends_vault_details_request() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/info")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "type": "vaultDetails",
                "vaultAddress": "0xabc"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"portfolio":[["week",{"vlm":"42.5"}],["perpWeek",{"vlm":"40"}]]}"#)
            .create();
        let sample = source_for(&server).fetch_volume("0xabc").unwrap();
        assert_eq!(sample.spot.week, 42.5);
        assert_eq!(sample.perp.week, 40.0);
        mock.assert();
    }

    #[test]
    fn test_fetch_volume_malformed_body_is_upstream() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/info")
            .with_status(200)
            .with_body("not json")
            .create();
        let err = source_for(&server).fetch_volume("0xabc").unwrap_err();
        assert!(matches!(err, FetchError::Upstream(_)));
    }

    #[test]
    fn test_fetch_vaults_error_status_is_fatal() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/vaults").with_status(503).create();
        let err = source_for(&server).fetch_vaults().unwrap_err();
        assert!(format!("{err:#}").contains("503"));
    }

    #[test]
    fn test_fetch_vaults_decodes_listing() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/vaults")
            .with_status(200)
            .with_body(
                r#"[{"summary":{"name":"Alpha","vaultAddress":"0x1","leader":"0x2","tvl":"99.5","isClosed":false}}]"#,
            )
            .create();
        let vaults = source_for(&server).fetch_vaults().unwrap();
        assert_eq!(vaults.len(), 1);
        assert_eq!(vaults[0].name, "Alpha");
        assert_eq!(vaults[0].tvl, 99.5);
        assert!(!vaults[0].is_priority);
    }
}
