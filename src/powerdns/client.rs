use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::*;
use super::{UpstreamError, ZoneApi};

#[derive(Clone)]
pub struct PowerDnsClient {
    http: Client,
    base_url: String, // e.g. "http://127.0.0.1:8081/api/v1"
    api_key: String,
    server_id: String, // usually "localhost"
}

impl PowerDnsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            server_id: server_id.into(),
        }
    }

    fn auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-API-Key", &self.api_key)
    }

    fn server_url(&self) -> String {
        format!("{}/servers/{}", self.base_url, self.server_id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.server_url(), path.trim_start_matches('/'))
    }

    /// Server description; also serves as the reachability probe.
    pub async fn server_info(&self) -> Result<PdnsServerInfo, UpstreamError> {
        let res = self
            .auth_header(self.http.get(self.server_url()))
            .send()
            .await?;
        let res = check("server_info", res).await?;
        Ok(res.json().await?)
    }

    pub async fn statistics(&self) -> Result<Vec<PdnsStatistic>, UpstreamError> {
        let res = self
            .auth_header(self.http.get(self.url("statistics")))
            .send()
            .await?;
        let res = check("statistics", res).await?;
        Ok(res.json().await?)
    }
}

#[async_trait]
impl ZoneApi for PowerDnsClient {
    async fn list_zones(&self) -> Result<Vec<PdnsZone>, UpstreamError> {
        let res = self.auth_header(self.http.get(self.url("zones"))).send().await?;
        let res = check("list_zones", res).await?;
        Ok(res.json().await?)
    }

    async fn get_zone(&self, name: &str) -> Result<Option<PdnsZone>, UpstreamError> {
        let url = self.url(&format!("zones/{}", name));
        let res = self.auth_header(self.http.get(url)).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            debug!(zone = name, "zone not found upstream");
            return Ok(None);
        }
        let res = check("get_zone", res).await?;
        Ok(Some(res.json::<PdnsZone>().await?))
    }

    async fn create_zone(&self, z: &PdnsZoneCreate) -> Result<PdnsZone, UpstreamError> {
        let url = self.url("zones");
        let res = self.auth_header(self.http.post(url)).json(z).send().await?;
        let res = check("create_zone", res).await?;
        Ok(res.json::<PdnsZone>().await?)
    }

    async fn delete_zone(&self, name: &str) -> Result<bool, UpstreamError> {
        let url = self.url(&format!("zones/{}", name));
        let res = self.auth_header(self.http.delete(url)).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check("delete_zone", res).await?;
        Ok(true)
    }

    async fn patch_rrsets(&self, zone_name: &str, rrsets: &[PdnsRrset]) -> Result<bool, UpstreamError> {
        #[derive(Serialize)]
        struct PatchBody<'a> {
            rrsets: &'a [PdnsRrset],
        }

        let url = self.url(&format!("zones/{}", zone_name));
        let body = PatchBody { rrsets };
        debug!(zone = zone_name, directives = rrsets.len(), "patching rrsets");
        let res = self
            .auth_header(self.http.patch(url))
            .json(&body)
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check("patch_rrsets", res).await?;
        Ok(true)
    }
}

/// Pass 2xx responses through; turn anything else into [`UpstreamError::Status`]
/// carrying PowerDNS' `error` field (or the raw body when it is not JSON).
async fn check(operation: &'static str, res: Response) -> Result<Response, UpstreamError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let text = res.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.error)
        .unwrap_or(text);
    Err(UpstreamError::Status {
        operation,
        status,
        body,
    })
}
