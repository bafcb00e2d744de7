//! Offline tests for salesync-db configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use chrono::NaiveDate;
use salesync_core::AgentSettings;
use salesync_db::{PoolConfig, SalesRecord};

#[test]
fn pool_config_from_settings_uses_acquire_timeout() {
    let settings = AgentSettings {
        config_path: PathBuf::from("config.json"),
        log_level: "info".to_string(),
        log_file: None,
        tick_cron: "30 * * * * *".to_string(),
        http_timeout_secs: 30,
        http_connect_timeout_secs: 10,
        db_acquire_timeout_secs: 42,
        db_query_timeout_secs: 120,
        source_view: "V_SysSalesByProduct".to_string(),
    };

    let pool_config = PoolConfig::from_settings(&settings);
    assert_eq!(pool_config.acquire_timeout_secs, 42);
    assert_eq!(pool_config.max_connections, 1);
}

/// Compile-time smoke test: confirm that [`SalesRecord`] has all expected
/// fields with the correct types. No database required.
#[test]
fn sales_record_has_expected_fields() {
    let record = SalesRecord {
        doctype: Some("FT".to_string()),
        workdate: NaiveDate::from_ymd_opt(2024, 1, 1),
        designation: Some("Bica".to_string()),
        quantity: Some(12_i64),
    };

    let row = record
        .into_source_row()
        .expect("complete record converts")
        .expect("quantity in range");
    assert_eq!(row.doc_type, "FT");
    assert_eq!(row.work_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(row.designation, "Bica");
    assert_eq!(row.quantity, 12);
}
