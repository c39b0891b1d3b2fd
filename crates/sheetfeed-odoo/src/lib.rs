mod field;
mod spec;

pub use field::FieldValue;
pub use spec::FieldSpec;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, Url};
use serde_json::{json, Value};
use sheetfeed_config::OdooConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

/// Authenticated identity returned by the login call.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub uid: i64,
}

/// One `web_search_read` fetch: which model, which fields, which filter and
/// context. The same request is replayed for every page with only the offset
/// advancing.
#[derive(Debug, Clone)]
pub struct SearchReadRequest {
    pub model: String,
    pub specification: FieldSpec,
    pub domain: Value,
    pub context: Value,
    pub count_limit: u64,
}

pub struct OdooClient {
    cfg: OdooConfig,
    http: Client,
    next_request_id: AtomicU64,
}

impl OdooClient {
    pub fn new(cfg: OdooConfig) -> Result<Self> {
        let timeout = Duration::from_secs_f64(cfg.timeout_seconds.max(1.0));
        // Odoo authentication is cookie-based; the session cookie from login
        // must ride along on every subsequent call.
        let http = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .context("failed to construct reqwest client")?;

        Ok(Self {
            cfg,
            http,
            next_request_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &OdooConfig {
        &self.cfg
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.cfg.url).context("invalid odoo URL")?;
        base.join(path)
            .with_context(|| format!("invalid odoo endpoint path {path}"))
    }

    /// Issues one JSON-RPC call and unwraps the `result` member. A transport
    /// failure, non-2xx status, or JSON-RPC `error` member fails immediately;
    /// retry policy is the caller's concern.
    async fn call(&self, path: &str, params: Value) -> Result<Value> {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let envelope = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": params,
            "id": id,
        });

        let url = self.endpoint(path)?;
        let response = self
            .http
            .post(url)
            .json(&envelope)
            .send()
            .await
            .context("odoo request failed")?;
        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("failed to read odoo response body (status {})", status))?;

        if !status.is_success() {
            return Err(anyhow!("odoo returned {}: {}", status, text));
        }

        let body: Value = serde_json::from_str(&text)
            .with_context(|| format!("invalid odoo JSON response: {}", text))?;

        if let Some(error) = body.get("error") {
            let message = error
                .get("data")
                .and_then(|data| data.get("message"))
                .or_else(|| error.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            bail!("odoo rpc error on {path}: {message}");
        }

        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Authenticates against `/web/session/authenticate`. A missing or falsy
    /// uid means the credentials were rejected.
    pub async fn login(&self) -> Result<Session> {
        let params = json!({
            "db": self.cfg.database,
            "login": self.cfg.username,
            "password": self.cfg.password,
        });
        let result = self.call("/web/session/authenticate", params).await?;

        let uid = match result.get("uid") {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
            _ => 0,
        };
        if uid <= 0 {
            bail!(
                "odoo authentication rejected for user `{}` on database `{}`",
                self.cfg.username,
                self.cfg.database
            );
        }

        info!("logged in as uid {uid}");
        Ok(Session { uid })
    }

    /// Fetches every record matching `req`, page by page, decoding each
    /// record's fields at this boundary. The fixed page size doubles as the
    /// end-of-data sentinel: a page shorter than the page size is the last.
    pub async fn fetch_all(&self, req: &SearchReadRequest) -> Result<Vec<FieldValue>> {
        let page_size = self.cfg.page_size.max(1);
        let specification = req.specification.to_json();
        let path = format!("/web/dataset/call_kw/{}/web_search_read", req.model);

        let mut offset = 0usize;
        let mut all = Vec::new();

        loop {
            let params = json!({
                "model": req.model,
                "method": "web_search_read",
                "args": [],
                "kwargs": {
                    "domain": req.domain,
                    "specification": specification,
                    "offset": offset,
                    "limit": page_size,
                    "context": req.context,
                    "count_limit": req.count_limit,
                },
            });

            let result = self.call(&path, params).await?;
            let records = match result.get("records") {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            };

            let fetched = records.len();
            all.extend(records.into_iter().map(FieldValue::from_json));
            info!(
                "fetched {} {} records (total {})",
                fetched,
                req.model,
                all.len()
            );

            if fetched < page_size {
                break;
            }
            offset += page_size;
        }

        Ok(all)
    }
}
