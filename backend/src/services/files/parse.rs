//! Parsing of uploaded contact files.
//!
//! The delimiter is guessed from the header line, header titles are checked
//! for emptiness and duplicates, and every cell is inferred into a
//! `ContactValue` (empty -> null, canonical number -> number, anything else ->
//! text kept verbatim).

use crate::error::ServiceError;
use common::model::contact::{ContactRecord, ContactValue};

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

#[derive(Debug)]
pub struct ParsedFile {
    pub columns: Vec<String>,
    /// Parsed rows, possibly truncated by the `limit` given to `parse_contacts`.
    pub contacts: Vec<ContactRecord>,
    /// Number of data rows in the whole file.
    pub row_count: usize,
}

/// Picks the candidate delimiter that occurs most often in `header_line`.
/// Ties go to the earlier candidate; a header without any defaults to `,`.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let mut best = (b',', 0);
    for d in DELIMITERS {
        let count = header_line.bytes().filter(|&b| b == d).count();
        if count > best.1 {
            best = (d, count);
        }
    }
    best.0
}

fn normalize_cell(cell: &str) -> String {
    cell.replace('\u{00A0}', " ").trim().to_string()
}

/// Trims header titles and rejects empty or repeated ones.
pub fn validate_and_normalize_titles(
    headers: &csv::StringRecord,
) -> Result<Vec<String>, ServiceError> {
    let mut titles: Vec<String> = Vec::with_capacity(headers.len());
    for (idx, raw) in headers.iter().enumerate() {
        let mut title = normalize_cell(raw);
        if idx == 0 {
            title = title.trim_start_matches('\u{feff}').trim().to_string();
        }
        if title.is_empty() {
            return Err(ServiceError::BadRequest(format!(
                "header column {} is empty",
                idx + 1
            )));
        }
        if titles.contains(&title) {
            return Err(ServiceError::BadRequest(format!(
                "header column '{title}' appears more than once"
            )));
        }
        titles.push(title);
    }
    Ok(titles)
}

/// Parses a whole contact file, keeping at most `limit` rows in memory.
///
/// Every row is still validated and counted, which is what an upload needs.
/// Rows shorter than the header are padded with nulls; longer rows are
/// rejected with their line number.
pub fn parse_contacts(bytes: &[u8], limit: Option<usize>) -> Result<ParsedFile, ServiceError> {
    let (columns, mut reader) = open_reader(bytes)?;

    let mut contacts = Vec::new();
    let mut row_count = 0usize;
    for result in reader.records() {
        let record = result?;
        let contact = to_contact(&columns, &record)?;
        row_count += 1;
        if limit.is_none_or(|l| contacts.len() < l) {
            contacts.push(contact);
        }
    }

    Ok(ParsedFile {
        columns,
        contacts,
        row_count,
    })
}

/// Parses only the first `limit` rows of a file that was already validated at
/// upload time.
pub fn read_contacts(bytes: &[u8], limit: usize) -> Result<Vec<ContactRecord>, ServiceError> {
    let (columns, mut reader) = open_reader(bytes)?;
    let mut contacts = Vec::with_capacity(limit.min(64));
    for result in reader.records().take(limit) {
        contacts.push(to_contact(&columns, &result?)?);
    }
    Ok(contacts)
}

fn open_reader(bytes: &[u8]) -> Result<(Vec<String>, csv::Reader<&[u8]>), ServiceError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| ServiceError::BadRequest("file is not valid UTF-8".to_string()))?;
    let header_line = text
        .lines()
        .next()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| ServiceError::BadRequest("file is empty".to_string()))?;
    let delimiter = detect_delimiter(header_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let columns = validate_and_normalize_titles(reader.headers()?)?;
    Ok((columns, reader))
}

fn to_contact(
    columns: &[String],
    record: &csv::StringRecord,
) -> Result<ContactRecord, ServiceError> {
    if record.len() > columns.len() {
        let line = record.position().map_or(0, |p| p.line());
        return Err(ServiceError::BadRequest(format!(
            "line {line}: expected {} fields, found {}",
            columns.len(),
            record.len()
        )));
    }
    Ok(columns
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let value = record
                .get(i)
                .map(|cell| ContactValue::from_cell(&normalize_cell(cell)))
                .unwrap_or(ContactValue::Null);
            (title.clone(), value)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_detection() {
        assert_eq!(detect_delimiter("name,email,company"), b',');
        assert_eq!(detect_delimiter("name;email;company"), b';');
        assert_eq!(detect_delimiter("name\temail"), b'\t');
        assert_eq!(detect_delimiter("name|email|a,b"), b'|');
        assert_eq!(detect_delimiter("email"), b',');
    }

    #[test]
    fn parses_values_with_inferred_types() {
        let csv = "\u{feff}Name;Age;Email\nAda;36;ada@example.com\nGrace;;grace@example.com\n";
        let parsed = parse_contacts(csv.as_bytes(), None).unwrap();
        assert_eq!(parsed.columns, ["Name", "Age", "Email"]);
        assert_eq!(parsed.row_count, 2);
        let first = &parsed.contacts[0];
        assert_eq!(first.get("Age"), Some(ContactValue::Number(36i64.into())));
        assert_eq!(parsed.contacts[1].get("Age"), Some(ContactValue::Null));
    }

    #[test]
    fn quoted_cells_and_short_rows() {
        let csv = "name,company,city\n\"Lovelace, Ada\",\"Analytical\"\n";
        let parsed = parse_contacts(csv.as_bytes(), None).unwrap();
        let row = &parsed.contacts[0];
        assert_eq!(
            row.get("name"),
            Some(ContactValue::Text("Lovelace, Ada".to_string()))
        );
        assert_eq!(row.get("city"), Some(ContactValue::Null));
    }

    #[test]
    fn long_rows_are_rejected_with_line() {
        let csv = "name,email\nAda,ada@example.com\nGrace,g@example.com,extra\n";
        let err = parse_contacts(csv.as_bytes(), None).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn header_problems() {
        assert!(matches!(
            parse_contacts(b"", None),
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            parse_contacts(b"name,,email\n", None),
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            parse_contacts(b"name,name\n", None),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn limit_truncates_rows_but_counts_all() {
        let csv = "email\na@x.io\nb@x.io\nc@x.io\n";
        let parsed = parse_contacts(csv.as_bytes(), Some(2)).unwrap();
        assert_eq!(parsed.contacts.len(), 2);
        assert_eq!(parsed.row_count, 3);
    }

    #[test]
    fn read_stops_after_limit() {
        // The third row is malformed; a one-row read never reaches it.
        let csv = "email,name\na@x.io,Ada\nb@x.io,Grace\nc@x.io,Linus,extra\n";
        let rows = read_contacts(csv.as_bytes(), 1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(ContactValue::Text("Ada".to_string())));
        assert!(parse_contacts(csv.as_bytes(), Some(1)).is_err());
    }
}
