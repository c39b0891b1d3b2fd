pub mod auth;

pub use auth::{load_key, ServiceAccountKey};

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Url};
use serde_json::{json, Value};
use sheetfeed_config::SheetsConfig;
use std::time::Duration;
use tracing::debug;

/// Thin client for the Sheets `values` endpoints the sync needs: clear a
/// range, overwrite a range from its top-left cell, and write one cell.
pub struct SheetsClient {
    cfg: SheetsConfig,
    http: Client,
    token: String,
}

impl SheetsClient {
    /// Authenticates with the configured service-account key and returns a
    /// ready client. Constructed once per run.
    pub async fn connect(cfg: SheetsConfig) -> Result<Self> {
        let http = build_http(&cfg)?;
        let key = auth::load_key(&cfg)?;
        let token = auth::fetch_access_token(&http, &cfg, &key)
            .await
            .context("sheets authentication failed")?;
        Ok(Self { cfg, http, token })
    }

    /// Builds a client around an existing bearer token. Used by tests and by
    /// callers that manage tokens themselves.
    pub fn from_token(cfg: SheetsConfig, token: String) -> Result<Self> {
        let http = build_http(&cfg)?;
        Ok(Self { cfg, http, token })
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str, suffix: &str) -> Result<Url> {
        Url::parse(&format!(
            "{}/v4/spreadsheets/{}/values/{}{}",
            self.cfg.endpoint.trim_end_matches('/'),
            spreadsheet_id,
            range,
            suffix
        ))
        .with_context(|| format!("invalid sheets URL for range {range}"))
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<String> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("sheets {what} request failed"))?;
        let status = response.status();
        let text = response.text().await.with_context(|| {
            format!("failed to read sheets {what} response body (status {status})")
        })?;

        if !status.is_success() {
            return Err(anyhow!("sheets {what} returned {status}: {text}"));
        }
        Ok(text)
    }

    pub async fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<()> {
        let url = self.values_url(spreadsheet_id, range, ":clear")?;
        debug!("clearing {range}");
        self.send(self.http.post(url).json(&json!({})), "clear")
            .await?;
        Ok(())
    }

    /// Overwrites `range` starting at its top-left cell with raw values.
    pub async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<Value>],
    ) -> Result<()> {
        let url = self.values_url(spreadsheet_id, range, "?valueInputOption=RAW")?;
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });
        debug!("writing {} rows to {range}", values.len());
        self.send(self.http.put(url).json(&body), "write").await?;
        Ok(())
    }

    pub async fn write_cell(&self, spreadsheet_id: &str, cell: &str, text: &str) -> Result<()> {
        self.write_range(spreadsheet_id, cell, &[vec![Value::String(text.to_string())]])
            .await
    }
}

fn build_http(cfg: &SheetsConfig) -> Result<Client> {
    let timeout = Duration::from_secs_f64(cfg.timeout_seconds.max(1.0));
    Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to construct reqwest client")
}
