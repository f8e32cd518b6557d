use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use dotenvy::dotenv;
use tracing::info;

use attendance_engine::config::Config;
use attendance_engine::db::init_db;
use attendance_engine::maintenance;
use attendance_engine::store::MySqlStore;
use attendance_engine::telemetry;

const USAGE: &str = "usage: attendance-engine recalculate <start YYYY-MM-DD> [end YYYY-MM-DD]";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;
    let _guard = telemetry::init_tracing(&config.log_dir, "attendance.log")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (start, end) = match args.as_slice() {
        [command, start] if command == "recalculate" => {
            let start = parse_date(start)?;
            (start, start)
        }
        [command, start, end] if command == "recalculate" => (parse_date(start)?, parse_date(end)?),
        _ => bail!(USAGE),
    };

    info!(%start, %end, "Recalculation starting...");

    let pool = init_db(config.require_database_url()?).await?;
    let store = MySqlStore::new(pool);
    store.ensure_schema().await?;

    let report =
        maintenance::recalculate_range(&store, start, end, Utc::now(), &config.engine).await?;

    info!(
        records = report.records,
        employees = report.employees,
        late_changed = report.late_changed,
        "Recalculation complete"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date {raw:?}"))
}
