use crate::error::ServiceError;
use common::model::contact::{FilePreview, StoredFile};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

use super::parse::{parse_contacts, read_contacts, ParsedFile};

/// Uploaded files are stored as `<id>_<md5>.csv` inside the data directory.
pub fn file_path(data_dir: &Path, file: &StoredFile) -> PathBuf {
    data_dir.join(format!("{}_{}.csv", file.id, file.md5))
}

pub fn insert_file(conn: &Connection, file: &StoredFile) -> Result<(), ServiceError> {
    conn.execute(
        "INSERT INTO files (id, name, md5, columns, row_count) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            &file.id,
            &file.name,
            &file.md5,
            serde_json::to_string(&file.columns)?,
            file.row_count
        ],
    )?;
    Ok(())
}

pub fn get_file(conn: &Connection, file_id: &str) -> Result<StoredFile, ServiceError> {
    let row = conn
        .query_row(
            "SELECT id, name, md5, columns, row_count FROM files WHERE id = ?1",
            params![file_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u32>(4)?,
                ))
            },
        )
        .optional()?;

    let (id, name, md5, columns, row_count) =
        row.ok_or_else(|| ServiceError::not_found("file", file_id))?;
    Ok(StoredFile {
        id,
        name,
        md5,
        columns: serde_json::from_str(&columns)?,
        row_count,
    })
}

/// Reads the stored file back from disk and parses at most `limit` rows.
pub fn load_contacts(
    data_dir: &Path,
    file: &StoredFile,
    limit: Option<usize>,
) -> Result<ParsedFile, ServiceError> {
    let bytes = fs::read(file_path(data_dir, file))?;
    parse_contacts(&bytes, limit)
}

/// The first `limit` rows of a stored file. Parsing stops there; the total
/// row count comes from the stored metadata.
pub fn preview_file(
    data_dir: &Path,
    file: &StoredFile,
    limit: usize,
) -> Result<FilePreview, ServiceError> {
    let bytes = fs::read(file_path(data_dir, file))?;
    let contacts = read_contacts(&bytes, limit)?;
    Ok(FilePreview::new(contacts))
}

/// The preview served to clients and consumed by the field mapping analysis.
pub fn load_preview(
    conn: &Connection,
    data_dir: &Path,
    file_id: &str,
    limit: usize,
) -> Result<FilePreview, ServiceError> {
    let file = get_file(conn, file_id)?;
    preview_file(data_dir, &file, limit)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db;

    /// Stores `csv` as file `file_id` the same way the upload handler does.
    pub(crate) fn store_csv(conn: &Connection, data_dir: &Path, file_id: &str, csv: &str) -> StoredFile {
        let parsed = parse_contacts(csv.as_bytes(), Some(0)).unwrap();
        let file = StoredFile {
            id: file_id.to_string(),
            name: format!("{file_id}.csv"),
            md5: format!("{:x}", md5::compute(csv)),
            columns: parsed.columns,
            row_count: parsed.row_count as u32,
        };
        fs::create_dir_all(data_dir).unwrap();
        fs::write(file_path(data_dir, &file), csv).unwrap();
        insert_file(conn, &file).unwrap();
        file
    }

    #[test]
    fn stored_file_round_trips_and_previews() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::open(&dir.path().join("test.sqlite")).unwrap();
        let data_dir = dir.path().join("data");

        let stored = store_csv(
            &conn,
            &data_dir,
            "f-1",
            "email,name\na@x.io,Ada\nb@x.io,Grace\nc@x.io,Linus\n",
        );
        assert_eq!(get_file(&conn, "f-1").unwrap(), stored);
        assert_eq!(stored.row_count, 3);

        let preview = load_preview(&conn, &data_dir, "f-1", 2).unwrap();
        assert_eq!(preview.contacts.as_ref().map(Vec::len), Some(2));
        assert_eq!(
            preview.first_record().unwrap().columns().collect::<Vec<_>>(),
            ["email", "name"]
        );
    }

    #[test]
    fn unknown_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::open(&dir.path().join("test.sqlite")).unwrap();
        assert!(matches!(
            load_preview(&conn, dir.path(), "missing", 5),
            Err(ServiceError::NotFound(_))
        ));
    }
}
