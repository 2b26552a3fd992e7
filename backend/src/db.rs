use rusqlite::Connection;
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS templates (
    id      TEXT PRIMARY KEY,
    name    TEXT NOT NULL DEFAULT '',
    subject TEXT,
    body    TEXT
);
CREATE TABLE IF NOT EXISTS files (
    id        TEXT PRIMARY KEY,
    name      TEXT NOT NULL,
    md5       TEXT NOT NULL,
    columns   TEXT NOT NULL,
    row_count INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS outbox (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id       TEXT NOT NULL,
    recipient    TEXT NOT NULL,
    from_address TEXT NOT NULL,
    subject      TEXT NOT NULL,
    body         TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS outbox_job_id ON outbox (job_id);
";

/// Opens the database at `path`, creating the schema on first use.
pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}
