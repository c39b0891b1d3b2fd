use crate::dataset::{self, DatasetSpec};
use crate::flatten::flatten_records;
use crate::publish::{publish, Destination, PublishOutcome};
use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use serde_json::{json, Value};
use sheetfeed_config::{AppConfig, DatasetConfig, OdooConfig};
use sheetfeed_odoo::{OdooClient, SearchReadRequest};
use sheetfeed_sheets::SheetsClient;
use tracing::info;

/// Runs the whole sync for one dataset: authenticate, fetch every page,
/// flatten, publish. Strictly sequential; the first failing stage aborts
/// the run.
pub async fn run_dataset(config: &AppConfig, name: &str) -> Result<()> {
    let spec = dataset::find(name).ok_or_else(|| {
        anyhow!(
            "unknown dataset `{name}`; known datasets: {}",
            dataset::names().join(", ")
        )
    })?;
    let dest = resolve_destination(config, &spec)?;
    let timezone: Tz = config
        .odoo
        .timezone
        .parse()
        .map_err(|_| anyhow!("invalid timezone `{}`", config.odoo.timezone))?;

    let odoo = OdooClient::new(config.odoo.clone())?;
    let session = odoo.login().await.context("odoo authentication failed")?;

    let request = SearchReadRequest {
        model: spec.model.to_string(),
        specification: spec.field_spec.clone(),
        domain: json!([]),
        context: build_context(&config.odoo, &spec, session.uid),
        count_limit: config.odoo.count_limit,
    };
    let records = odoo.fetch_all(&request).await?;

    let table = flatten_records(&records, &spec);
    info!(
        "flattened {} {} records into {} rows",
        records.len(),
        spec.model,
        table.rows.len()
    );

    let sheets = SheetsClient::connect(config.sheets.clone()).await?;
    match publish(&sheets, &dest, &table, timezone).await? {
        PublishOutcome::Written { rows } => {
            info!("dataset `{name}` synced: {rows} rows");
        }
        PublishOutcome::SkippedEmpty => {
            info!("dataset `{name}` synced: nothing to write");
        }
    }

    Ok(())
}

fn resolve_destination(config: &AppConfig, spec: &DatasetSpec) -> Result<Destination> {
    let configured: &DatasetConfig = config
        .dataset(spec.name)
        .ok_or_else(|| anyhow!("dataset `{}` has no [[datasets]] entry in config", spec.name))?;

    if !configured.enabled {
        bail!("dataset `{}` is disabled in config", spec.name);
    }
    if configured.spreadsheet_id.is_empty() {
        bail!("dataset `{}` has no spreadsheet_id configured", spec.name);
    }

    let tab = if configured.tab.is_empty() {
        spec.default_tab.to_string()
    } else {
        configured.tab.clone()
    };

    Ok(Destination {
        spreadsheet_id: configured.spreadsheet_id.clone(),
        tab,
        clear_columns: spec.clear_columns.to_string(),
        stamp_cell: spec.stamp_cell.to_string(),
    })
}

fn build_context(cfg: &OdooConfig, spec: &DatasetSpec, uid: i64) -> Value {
    let mut context = json!({
        "lang": cfg.lang,
        "tz": cfg.timezone,
        "uid": uid,
        "allowed_company_ids": spec.allowed_company_ids,
        "current_company_id": spec.current_company_id,
        "bin_size": true,
    });
    if let Value::Object(map) = &mut context {
        for (key, value) in &spec.extra_context {
            map.insert(key.clone(), value.clone());
        }
    }
    context
}
