use crate::transport::{
    LedgerTransport,
    ReadCall,
};
use anyhow::{
    Context,
    anyhow,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;
use std::{
    fmt,
    time::Duration,
};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP ledger gateway exposing `POST /read` and `POST /multicall`.
#[derive(Clone)]
pub struct GatewayTransport {
    base_url: String,
    http: reqwest::Client,
}

impl GatewayTransport {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let base_url = config.base_url.as_str().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client for ledger gateway")?;
        Ok(Self { base_url, http })
    }

    async fn post<Req: Serialize>(&self, path: &str, body: &Req) -> anyhow::Result<Vec<u8>> {
        let url = format!("{}/{}", self.base_url, path);
        let res = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .context("ledger gateway request failed")?;
        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .context("failed to read ledger gateway response body")?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            return Err(anyhow!(
                "ledger gateway responded with {status} on /{path}: {body}"
            ));
        }
        Ok(bytes.to_vec())
    }
}

impl LedgerTransport for GatewayTransport {
    async fn read(&self, call: ReadCall) -> anyhow::Result<Value> {
        let request = CallDto::from(&call);
        let bytes = self.post("read", &request).await?;
        decode_read_payload(&bytes)
    }

    async fn read_batch(
        &self,
        calls: Vec<ReadCall>,
        require_success: bool,
    ) -> anyhow::Result<Vec<Option<Value>>> {
        let request = MulticallRequestDto {
            calls: calls.iter().map(CallDto::from).collect(),
            require_success,
        };
        let bytes = self.post("multicall", &request).await?;
        let slots = decode_multicall_payload(&bytes)?;
        if slots.len() != calls.len() {
            tracing::warn!(
                expected = calls.len(),
                received = slots.len(),
                "ledger gateway returned a mismatched number of multicall slots"
            );
        }
        Ok(slots)
    }
}

impl fmt::Display for GatewayTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_url)
    }
}

#[derive(Serialize)]
struct CallDto<'a> {
    target: String,
    method: &'a str,
    params: &'a [Value],
}

impl<'a> From<&'a ReadCall> for CallDto<'a> {
    fn from(call: &'a ReadCall) -> Self {
        Self {
            target: format!("{:#x}", call.target),
            method: &call.method,
            params: &call.params,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MulticallRequestDto<'a> {
    calls: Vec<CallDto<'a>>,
    require_success: bool,
}

#[derive(Deserialize)]
struct ReadResponseDto {
    data: Value,
}

#[derive(Deserialize)]
struct MulticallResponseDto {
    results: Vec<SlotDto>,
}

#[derive(Deserialize)]
struct SlotDto {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
}

impl SlotDto {
    fn into_slot(self) -> Option<Value> {
        if self.success { self.data } else { None }
    }
}

fn decode_read_payload(bytes: &[u8]) -> anyhow::Result<Value> {
    let dto: ReadResponseDto =
        serde_json::from_slice(bytes).context("invalid ledger gateway read payload")?;
    Ok(dto.data)
}

fn decode_multicall_payload(bytes: &[u8]) -> anyhow::Result<Vec<Option<Value>>> {
    let dto: MulticallResponseDto = serde_json::from_slice(bytes)
        .context("invalid ledger gateway multicall payload")?;
    Ok(dto.results.into_iter().map(SlotDto::into_slot).collect())
}
