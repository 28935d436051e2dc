use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    // One row per called organization, keyed by phone (or call id when the phone is unknown)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS call_records (
            key VARCHAR PRIMARY KEY,
            call_id VARCHAR,
            phone VARCHAR,
            organization_name VARCHAR,
            summary VARCHAR,
            created_at BIGINT NOT NULL,
            updated_at BIGINT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_call_records_call_id
            ON call_records(call_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_call_records_updated
            ON call_records(updated_at)",
        [],
    )?;

    tracing::info!("Database migrations completed");
    Ok(())
}
