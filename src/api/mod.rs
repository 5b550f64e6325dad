// Metrics API client
//
// Read-only access to the Avalanche metrics service: the chain list and the
// aggregate network throughput. Everything else in the crate consumes the
// MetricsSource trait so the poller can be exercised with canned data.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Default request timeout for the HTTP client
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors returned while fetching metrics
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (DNS, connect, timeout)
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-2xx status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body was not the JSON shape we expect
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Latest TPS sample for a chain
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TpsSample {
    /// Transactions per second; non-numeric values decode as None
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    /// Unix timestamp of the sample, seconds; fractional values truncate
    #[serde(default, deserialize_with = "lenient_i64")]
    pub timestamp: Option<i64>,
}

/// One chain as listed by the metrics service
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub chain_name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub chain_logo_uri: Option<String>,
    /// Either a count or a list of validator records
    #[serde(default)]
    pub validators: Option<serde_json::Value>,
    /// Anything but a well-formed sample object decodes as None
    #[serde(default, deserialize_with = "lenient_tps")]
    pub tps: Option<TpsSample>,
}

impl ChainInfo {
    /// Number of validators, whether the API sent a count or a list
    pub fn validator_count(&self) -> Option<u64> {
        match self.validators.as_ref()? {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::Array(items) => Some(items.len() as u64),
            _ => None,
        }
    }

    /// Raw TPS value, if the API provided one
    pub fn tps_value(&self) -> Option<f64> {
        self.tps.as_ref().and_then(|t| t.value)
    }

    /// Display name, falling back to the chain id
    pub fn display_name(&self) -> &str {
        if self.chain_name.trim().is_empty() {
            &self.chain_id
        } else {
            &self.chain_name
        }
    }
}

/// Aggregate network throughput
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTps {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_tps: Option<f64>,
    #[serde(default)]
    pub chain_count: Option<u64>,
}

/// Everything one poll returns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub chains: Vec<ChainInfo>,
    pub network: NetworkTps,
}

/// Chain list body: either a bare array or `{"chains": [...]}`
///
/// Records stay raw so one bad entry can be dropped on its own.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChainListBody {
    Bare(Vec<serde_json::Value>),
    Wrapped { chains: Vec<serde_json::Value> },
}

impl ChainListBody {
    fn into_chains(self) -> Vec<ChainInfo> {
        let records = match self {
            Self::Bare(records) | Self::Wrapped { chains: records } => records,
        };
        records
            .into_iter()
            .filter_map(|record| match ChainInfo::deserialize(record) {
                Ok(chain) => Some(chain),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable chain record");
                    None
                }
            })
            .collect()
    }
}

/// Accept numbers, numeric strings, or null for a float field
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Accept integers, floats (truncated), numeric strings, or null
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Strings pass through; null or any other type becomes empty
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// A sample object decodes; strings, numbers and other shapes become None
fn lenient_tps<'de, D>(deserializer: D) -> Result<Option<TpsSample>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(value @ serde_json::Value::Object(_)) => TpsSample::deserialize(value).ok(),
        _ => None,
    })
}

/// Decode a chain list body
pub fn parse_chain_list(url: &str, body: &str) -> Result<Vec<ChainInfo>, FetchError> {
    serde_json::from_str::<ChainListBody>(body)
        .map(ChainListBody::into_chains)
        .map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
}

/// Decode a network throughput body
pub fn parse_network_tps(url: &str, body: &str) -> Result<NetworkTps, FetchError> {
    serde_json::from_str::<NetworkTps>(body).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Anything that can produce a metrics snapshot
///
/// Implementations are called from a worker thread.
pub trait MetricsSource: Send + Sync {
    fn fetch(&self) -> Result<MetricsSnapshot, FetchError>;

    /// Short human-readable description for the UI
    fn describe(&self) -> String;
}

/// MetricsSource backed by the REST API
pub struct HttpMetricsSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpMetricsSource {
    /// Build a client for `base_url` (trailing slashes are ignored)
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| FetchError::Http {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { base_url, client })
    }

    pub fn chains_url(&self) -> String {
        format!("{}/chains", self.base_url)
    }

    pub fn network_tps_url(&self) -> String {
        format!("{}/network/tps", self.base_url)
    }

    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })
    }
}

impl MetricsSource for HttpMetricsSource {
    fn fetch(&self) -> Result<MetricsSnapshot, FetchError> {
        let chains_url = self.chains_url();
        let chains = parse_chain_list(&chains_url, &self.get_text(&chains_url)?)?;

        let tps_url = self.network_tps_url();
        let network = parse_network_tps(&tps_url, &self.get_text(&tps_url)?)?;

        tracing::debug!(
            chains = chains.len(),
            total_tps = network.total_tps,
            "Fetched metrics snapshot"
        );

        Ok(MetricsSnapshot { chains, network })
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_chain_list() {
        let body = r#"[
            {"chainId": "2q9e4r6Mu3U68nU1fYjgbR6JvwrRx36CohpAX5UQxse55x1Q5",
             "chainName": "C-Chain",
             "chainLogoUri": "https://example.org/c.png",
             "validators": 1432,
             "tps": {"value": 12.5, "timestamp": 1700000000}},
            {"chainId": "dfk", "chainName": "DFK"}
        ]"#;

        let chains = parse_chain_list("test://chains", body).unwrap();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].chain_name, "C-Chain");
        assert_eq!(chains[0].tps_value(), Some(12.5));
        assert_eq!(chains[0].validator_count(), Some(1432));
        assert_eq!(chains[1].tps, None);
        assert_eq!(chains[1].chain_logo_uri, None);
    }

    #[test]
    fn test_parse_wrapped_chain_list() {
        let body = r#"{"chains": [{"chainId": "a", "chainName": "A"}]}"#;
        let chains = parse_chain_list("test://chains", body).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].chain_id, "a");
    }

    #[test]
    fn test_validators_as_list() {
        let body = r#"[{"chainId": "a", "validators": [{"id": 1}, {"id": 2}, {"id": 3}]}]"#;
        let chains = parse_chain_list("test://chains", body).unwrap();
        assert_eq!(chains[0].validator_count(), Some(3));
    }

    #[test]
    fn test_malformed_tps_value_is_none() {
        let body = r#"[
            {"chainId": "a", "tps": {"value": "not-a-number", "timestamp": 1}},
            {"chainId": "b", "tps": {"value": "3.25"}},
            {"chainId": "c", "tps": {"value": null}}
        ]"#;
        let chains = parse_chain_list("test://chains", body).unwrap();
        assert_eq!(chains[0].tps_value(), None);
        assert_eq!(chains[1].tps_value(), Some(3.25));
        assert_eq!(chains[2].tps_value(), None);
    }

    #[test]
    fn test_bad_tps_shape_keeps_neighbours() {
        let body = r#"[
            {"chainId": "good", "tps": {"value": 3}},
            {"chainId": "text", "tps": "oops"},
            {"chainId": "number", "tps": 5}
        ]"#;
        let chains = parse_chain_list("test://chains", body).unwrap();
        assert_eq!(chains.len(), 3);
        assert_eq!(chains[0].tps_value(), Some(3.0));
        assert_eq!(chains[1].tps, None);
        assert_eq!(chains[2].tps, None);
    }

    #[test]
    fn test_null_name_and_float_timestamp() {
        let body = r#"[
            {"chainId": "good", "chainName": null, "chainLogoUri": 7,
             "tps": {"value": 3, "timestamp": 1700000000.5}}
        ]"#;
        let chains = parse_chain_list("test://chains", body).unwrap();
        assert_eq!(chains[0].display_name(), "good");
        assert_eq!(chains[0].chain_logo_uri, None);
        assert_eq!(chains[0].tps.as_ref().and_then(|t| t.timestamp), Some(1_700_000_000));
        assert_eq!(chains[0].tps_value(), Some(3.0));
    }

    #[test]
    fn test_record_without_id_is_skipped() {
        let body = r#"{"chains": [{"chainName": "orphan"}, {"chainId": "kept"}, 42]}"#;
        let chains = parse_chain_list("test://chains", body).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].chain_id, "kept");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let body = r#"[{"chainId": "abc", "chainName": "  "}]"#;
        let chains = parse_chain_list("test://chains", body).unwrap();
        assert_eq!(chains[0].display_name(), "abc");
    }

    #[test]
    fn test_parse_network_tps() {
        let net = parse_network_tps("test://tps", r#"{"totalTps": 87.4, "chainCount": 42}"#).unwrap();
        assert_eq!(net.total_tps, Some(87.4));
        assert_eq!(net.chain_count, Some(42));

        let net = parse_network_tps("test://tps", r#"{"totalTps": 1}"#).unwrap();
        assert_eq!(net.chain_count, None);
    }

    #[test]
    fn test_decode_error_names_url() {
        let err = parse_chain_list("test://chains", "<html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert!(err.to_string().contains("test://chains"));
    }

    #[test]
    fn test_http_source_urls() {
        let source = HttpMetricsSource::new("https://metrics.example.org/v1/").unwrap();
        assert_eq!(source.chains_url(), "https://metrics.example.org/v1/chains");
        assert_eq!(source.network_tps_url(), "https://metrics.example.org/v1/network/tps");
        assert_eq!(source.describe(), "https://metrics.example.org/v1");
    }
}
