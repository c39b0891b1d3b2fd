use crate::flatten::Table;
use anyhow::Result;
use chrono::Utc;
use chrono_tz::Tz;
use sheetfeed_sheets::SheetsClient;
use tracing::{error, info, warn};

/// Where a dataset's table lands.
#[derive(Debug, Clone)]
pub struct Destination {
    pub spreadsheet_id: String,
    pub tab: String,
    pub clear_columns: String,
    pub stamp_cell: String,
}

impl Destination {
    fn range(&self, suffix: &str) -> String {
        format!("{}!{}", self.tab, suffix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Written { rows: usize },
    /// Empty tables leave the destination untouched.
    SkippedEmpty,
}

/// Replaces the destination tab's contents with the table: clear the fixed
/// column range, write header plus rows from the top-left cell, then stamp
/// the refresh time into a cell outside the data range.
pub async fn publish(
    client: &SheetsClient,
    dest: &Destination,
    table: &Table,
    timezone: Tz,
) -> Result<PublishOutcome> {
    if table.is_empty() {
        warn!("skipping {}: nothing to publish", dest.tab);
        return Ok(PublishOutcome::SkippedEmpty);
    }

    let stamp = format!(
        "Last Updated: {}",
        Utc::now()
            .with_timezone(&timezone)
            .format("%Y-%m-%d %H:%M:%S")
    );

    let result = async {
        client
            .clear_range(&dest.spreadsheet_id, &dest.range(&dest.clear_columns))
            .await?;
        client
            .write_range(&dest.spreadsheet_id, &dest.range("A1"), &table.to_values())
            .await?;
        client
            .write_cell(&dest.spreadsheet_id, &dest.range(&dest.stamp_cell), &stamp)
            .await?;
        anyhow::Result::<()>::Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            info!(
                "published {} rows to {} and stamped {}",
                table.rows.len(),
                dest.tab,
                dest.stamp_cell
            );
            Ok(PublishOutcome::Written {
                rows: table.rows.len(),
            })
        }
        Err(err) => {
            error!("publish to {} failed: {err:#}", dest.tab);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use sheetfeed_config::SheetsConfig;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct Call {
        kind: String,
        range: String,
        body: Value,
    }

    type Calls = Arc<Mutex<Vec<Call>>>;

    async fn values_handler(
        Path((_, tail)): Path<(String, String)>,
        State(calls): State<Calls>,
        method: axum::http::Method,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let (kind, range) = if let Some(range) = tail.strip_suffix(":clear") {
            ("clear", range.to_string())
        } else if method == axum::http::Method::PUT {
            ("write", tail)
        } else {
            ("other", tail)
        };
        calls.lock().expect("calls mutex").push(Call {
            kind: kind.to_string(),
            range,
            body,
        });
        Json(json!({}))
    }

    async fn spawn_sheets_server(calls: Calls) -> String {
        let app = Router::new()
            .route(
                "/v4/spreadsheets/{id}/values/{tail}",
                post(values_handler).put(values_handler),
            )
            .with_state(calls);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}", addr)
    }

    fn test_client(endpoint: String) -> SheetsClient {
        let cfg = SheetsConfig {
            endpoint,
            ..SheetsConfig::default()
        };
        SheetsClient::from_token(cfg, "test-token".to_string()).expect("client")
    }

    fn test_destination() -> Destination {
        Destination {
            spreadsheet_id: "sheet-1".to_string(),
            tab: "Raw_data".to_string(),
            clear_columns: "A:Q".to_string(),
            stamp_cell: "R1".to_string(),
        }
    }

    fn sample_table() -> Table {
        Table {
            headers: vec!["Company".to_string(), "Subtotal".to_string()],
            rows: vec![
                vec![json!("Acme"), json!(1250.5)],
                vec![json!("Globex"), json!(0)],
            ],
        }
    }

    fn dhaka() -> Tz {
        "Asia/Dhaka".parse().expect("valid timezone")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_table_skips_without_touching_the_destination() {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let client = test_client(spawn_sheets_server(calls.clone()).await);
        let empty = Table {
            headers: vec!["Company".to_string()],
            rows: Vec::new(),
        };

        let outcome = publish(&client, &test_destination(), &empty, dhaka())
            .await
            .expect("skip is not an error");

        assert_eq!(outcome, PublishOutcome::SkippedEmpty);
        assert!(calls.lock().expect("calls mutex").is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn publish_clears_writes_and_stamps_in_order() {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let client = test_client(spawn_sheets_server(calls.clone()).await);

        let outcome = publish(&client, &test_destination(), &sample_table(), dhaka())
            .await
            .expect("publish");
        assert_eq!(outcome, PublishOutcome::Written { rows: 2 });

        let calls = calls.lock().expect("calls mutex");
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].kind, "clear");
        assert_eq!(calls[0].range, "Raw_data!A:Q");
        assert_eq!(calls[1].kind, "write");
        assert_eq!(calls[1].range, "Raw_data!A1");
        assert_eq!(calls[1].body["values"][0], json!(["Company", "Subtotal"]));
        assert_eq!(calls[1].body["values"][1], json!(["Acme", 1250.5]));
        assert_eq!(calls[2].range, "Raw_data!R1");
        let stamp = calls[2].body["values"][0][0].as_str().expect("stamp text");
        assert!(stamp.starts_with("Last Updated: "));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn publishing_twice_writes_identical_data_payloads() {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let client = test_client(spawn_sheets_server(calls.clone()).await);
        let table = sample_table();

        publish(&client, &test_destination(), &table, dhaka())
            .await
            .expect("first publish");
        publish(&client, &test_destination(), &table, dhaka())
            .await
            .expect("second publish");

        let calls = calls.lock().expect("calls mutex");
        assert_eq!(calls.len(), 6);
        // Same visible content both runs, timestamp cell aside.
        assert_eq!(calls[1].body["values"], calls[4].body["values"]);
        assert_eq!(calls[0].range, calls[3].range);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn publish_failure_propagates() {
        let client = test_client("http://127.0.0.1:1".to_string());

        let err = publish(&client, &test_destination(), &sample_table(), dhaka())
            .await
            .expect_err("expected publish failure");
        assert!(
            err.to_string().contains("clear"),
            "unexpected error: {err:#}"
        );
    }
}
