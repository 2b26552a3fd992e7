use crate::error::ServiceError;
use common::model::template::Template;
use rusqlite::{params, Connection, OptionalExtension};

/// Inserts or replaces a template.
pub fn save_template(conn: &Connection, template: &Template) -> Result<(), ServiceError> {
    if template.id.trim().is_empty() {
        return Err(ServiceError::BadRequest(
            "template id must not be empty".to_string(),
        ));
    }

    conn.execute(
        "INSERT OR REPLACE INTO templates (id, name, subject, body) VALUES (?1, ?2, ?3, ?4)",
        params![&template.id, &template.name, &template.subject, &template.body],
    )?;
    Ok(())
}

pub fn get_template(conn: &Connection, template_id: &str) -> Result<Template, ServiceError> {
    conn.query_row(
        "SELECT id, name, subject, body FROM templates WHERE id = ?1",
        params![template_id],
        |row| {
            Ok(Template {
                id: row.get(0)?,
                name: row.get(1)?,
                subject: row.get(2)?,
                body: row.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| ServiceError::not_found("template", template_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn save_then_get_and_replace() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::open(&dir.path().join("test.sqlite")).unwrap();

        let mut template = Template {
            id: "t-1".to_string(),
            name: "Welcome".to_string(),
            subject: Some("Hi {NAME}".to_string()),
            body: None,
        };
        save_template(&conn, &template).unwrap();
        assert_eq!(get_template(&conn, "t-1").unwrap(), template);

        template.body = Some("From {COMPANY}".to_string());
        save_template(&conn, &template).unwrap();
        assert_eq!(
            get_template(&conn, "t-1").unwrap().body.as_deref(),
            Some("From {COMPANY}")
        );
    }

    #[test]
    fn missing_template_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::open(&dir.path().join("test.sqlite")).unwrap();
        assert!(matches!(
            get_template(&conn, "nope"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn empty_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::open(&dir.path().join("test.sqlite")).unwrap();
        let template = Template {
            id: " ".to_string(),
            ..Template::default()
        };
        assert!(matches!(
            save_template(&conn, &template),
            Err(ServiceError::BadRequest(_))
        ));
    }
}
