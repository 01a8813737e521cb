use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    // One row per dossier; `document` holds the composite JSON, the other
    // columns are copies used by the dashboard listing.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS dossiers (
            id TEXT PRIMARY KEY,
            created_at BIGINT NOT NULL,
            first_name VARCHAR NOT NULL DEFAULT '',
            last_name VARCHAR NOT NULL DEFAULT '',
            email VARCHAR NOT NULL DEFAULT '',
            document TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_dossiers_created_at ON dossiers(created_at DESC)",
        [],
    )?;

    Ok(())
}
