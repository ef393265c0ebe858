use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// `type` the service reports for values it has never verified.
pub const NOT_VERIFIED: &str = "not verified";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedValue {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl VerifiedValue {
    pub fn new(value: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: kind.into(),
        }
    }

    pub fn is_verified(&self) -> bool {
        self.kind != NOT_VERIFIED
    }
}

pub struct VerificationClient {
    client: Client,
    base_url: String,
}

impl VerificationClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Look up a value. A miss is returned as a value of type "not verified".
    pub async fn lookup(&self, value: &str) -> Result<VerifiedValue, Box<dyn std::error::Error>> {
        let resp = self.lookup_raw(value).await?;
        decode(resp, StatusCode::OK).await
    }

    /// Record a verified value.
    pub async fn record(&self, value: &str, kind: &str) -> Result<VerifiedValue, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .post(format!("{}/verify", self.base_url))
            .json(&VerifiedValue::new(value, kind))
            .send()
            .await?;
        decode(resp, StatusCode::CREATED).await
    }

    /// `GET /verify?value=...` without interpreting the response.
    pub async fn lookup_raw(&self, value: &str) -> Result<Response, reqwest::Error> {
        self.client
            .get(format!("{}/verify", self.base_url))
            .query(&[("value", value)])
            .send()
            .await
    }

    /// `POST /verify` with an arbitrary body, without interpreting the response.
    pub async fn record_raw(&self, body: &str) -> Result<Response, reqwest::Error> {
        self.client
            .post(format!("{}/verify", self.base_url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
    }

    /// `GET` an arbitrary path.
    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
    }
}

async fn decode(resp: Response, expected: StatusCode) -> Result<VerifiedValue, Box<dyn std::error::Error>> {
    let status = resp.status();
    let text = resp.text().await?;

    if status != expected {
        return Err(format!("Service returned status {}: {}", status, text).into());
    }

    Ok(serde_json::from_str::<VerifiedValue>(&text)?)
}
