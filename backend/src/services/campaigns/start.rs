//! # Campaign Start Service
//!
//! `POST /api/campaigns/start` launches the send job of a campaign.
//!
//! ## Workflow
//!
//! 1.  **Gate**: `prepare_campaign` validates the sender address, re-runs the
//!     field mapping analysis on the stored template and file, and finds the
//!     recipient column. A mapping that is not valid is refused with `422` and
//!     the full analysis as body; a file without an email column with `400`.
//!
//! 2.  **Job Scheduling**: `schedule_campaign_job` registers the job as
//!     `Pending` in the shared `JobsState`, returns its id to the client and
//!     spawns a Tokio task that owns the job's lifecycle. The checked
//!     `CampaignPlan` moves into the task, so the job sends exactly the
//!     template that passed the gate even if it is saved again meanwhile.
//!
//! 3.  **Background Processing**: the task runs `send_blocking` through
//!     `spawn_blocking`. It reads every contact of the file, renders the
//!     personalized subject and body chunk by chunk (in parallel with rayon)
//!     and writes the messages to the `outbox` table. Contacts without a
//!     usable email address are skipped.
//!
//! 4.  **Progress**: after each chunk an `InProgress` update goes to the job
//!     controller; the final status is `Completed` or `Failed`.

use crate::config::AppConfig;
use crate::db;
use crate::error::ServiceError;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::services::files::store::load_contacts;
use actix_web::{web, HttpResponse};
use common::jobs::CampaignStatus;
use common::mapping::{matching_column, render_personalized};
use common::model::contact::{ContactRecord, StoredFile};
use common::model::template::Template;
use common::requests::{StartCampaignRequest, StartCampaignResponse};
use rayon::prelude::*;
use rusqlite::{params, Connection};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::verify::check_campaign;

const CHUNK_SIZE: usize = 500;

/// A rendered message ready for the outbox.
#[derive(Debug, Clone, PartialEq)]
struct OutboxMessage {
    recipient: String,
    subject: String,
    body: String,
}

/// Everything the send job needs, checked before the job is scheduled.
#[derive(Debug)]
struct CampaignPlan {
    template: Template,
    file: StoredFile,
    email_column: String,
    from_address: String,
}

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    state: web::Data<JobsState>,
    payload: web::Json<StartCampaignRequest>,
) -> Result<HttpResponse, ServiceError> {
    let req = payload.into_inner();
    let config = config.get_ref().clone();
    let (config, plan) = web::block(move || {
        let conn = db::open(&config.db_path)?;
        let plan = prepare_campaign(&conn, &config, &req)?;
        Ok::<_, ServiceError>((config, plan))
    })
    .await??;

    let job_id = schedule_campaign_job(&state, config, plan).await;
    Ok(HttpResponse::Ok().json(StartCampaignResponse { job_id }))
}

fn prepare_campaign(
    conn: &Connection,
    config: &AppConfig,
    req: &StartCampaignRequest,
) -> Result<CampaignPlan, ServiceError> {
    if !is_valid_email(&req.from_email) {
        return Err(ServiceError::BadRequest(format!(
            "sender address is not valid: {}",
            req.from_email
        )));
    }

    let checked = check_campaign(conn, config, &req.template_id, &req.file_id)?;
    if !checked.mapping.is_valid {
        log::warn!(
            "refusing campaign for template {}: missing {:?}",
            req.template_id,
            checked.mapping.missing_fields
        );
        return Err(ServiceError::InvalidMapping(checked.mapping));
    }

    let email_column = matching_column("email", checked.file.columns.iter().map(String::as_str))
        .ok_or_else(|| {
            ServiceError::BadRequest(format!(
                "the contact file {} has no email column",
                checked.file.name
            ))
        })?
        .to_string();

    let from_email = req.from_email.trim();
    let from_address = match &req.from_name {
        Some(name) if !name.trim().is_empty() => format!("{} <{}>", name.trim(), from_email),
        _ => from_email.to_string(),
    };

    Ok(CampaignPlan {
        template: checked.template,
        file: checked.file,
        email_column,
        from_address,
    })
}

async fn schedule_campaign_job(state: &JobsState, config: AppConfig, plan: CampaignPlan) -> String {
    let job_id = Uuid::new_v4().to_string();
    state.register(&job_id).await;

    let tx = state.tx.clone();
    let job_id_for_task = job_id.clone();

    tokio::spawn(async move {
        let tx_block = tx.clone();
        let job_id_for_blocking = job_id_for_task.clone();
        let handle = tokio::task::spawn_blocking(move || {
            send_blocking(&tx_block, &config, &job_id_for_blocking, &plan)
        });

        let status = match handle.await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => CampaignStatus::Failed(e.to_string()),
            Err(e) => CampaignStatus::Failed(format!("task join error: {e}")),
        };
        log::info!("campaign job {job_id_for_task} finished: {status:?}");

        let _ = tx
            .send(JobUpdate {
                job_id: job_id_for_task,
                status,
            })
            .await;
    });

    job_id
}

/// Renders and stores every message of the campaign.
///
/// Returns the terminal status on success; errors are turned into
/// `CampaignStatus::Failed` by the caller.
fn send_blocking(
    tx: &mpsc::Sender<JobUpdate>,
    config: &AppConfig,
    job_id: &str,
    plan: &CampaignPlan,
) -> Result<CampaignStatus, ServiceError> {
    let mut conn = db::open(&config.db_path)?;
    let parsed = load_contacts(&config.data_dir, &plan.file, None)?;

    let total = u32::try_from(parsed.contacts.len())
        .map_err(|_| ServiceError::BadRequest("the file has too many rows".to_string()))?;
    report(tx, job_id, CampaignStatus::InProgress { processed: 0, total });

    let mut sent = 0u32;
    let mut skipped = 0u32;
    for chunk in parsed.contacts.chunks(CHUNK_SIZE) {
        let rendered: Vec<Option<OutboxMessage>> = chunk
            .par_iter()
            .map(|contact| render_message(&plan.template, contact, &plan.email_column))
            .collect();

        let db_tx = conn.transaction()?;
        {
            let mut stmt = db_tx.prepare(
                "INSERT INTO outbox (job_id, recipient, from_address, subject, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for message in &rendered {
                match message {
                    Some(m) => {
                        stmt.execute(params![
                            job_id,
                            &m.recipient,
                            &plan.from_address,
                            &m.subject,
                            &m.body
                        ])?;
                        sent += 1;
                    }
                    None => skipped += 1,
                }
            }
        }
        db_tx.commit()?;

        report(
            tx,
            job_id,
            CampaignStatus::InProgress {
                processed: sent + skipped,
                total,
            },
        );
    }

    if skipped > 0 {
        log::warn!("campaign job {job_id}: skipped {skipped} contacts without a valid email");
    }
    Ok(CampaignStatus::Completed { sent, skipped })
}

fn report(tx: &mpsc::Sender<JobUpdate>, job_id: &str, status: CampaignStatus) {
    let _ = tx.blocking_send(JobUpdate {
        job_id: job_id.to_string(),
        status,
    });
}

fn render_message(
    template: &Template,
    contact: &ContactRecord,
    email_column: &str,
) -> Option<OutboxMessage> {
    let recipient = contact.get(email_column)?.as_display_text().trim().to_string();
    if !is_valid_email(&recipient) {
        return None;
    }
    Some(OutboxMessage {
        recipient,
        subject: render_personalized(template.subject_text(), contact),
        body: render_personalized(template.body_text(), contact),
    })
}

/// A loose address check: one `@`, a non-empty local part, a dotted domain
/// and no whitespace.
pub fn is_valid_email(address: &str) -> bool {
    let address = address.trim();
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::files::store::tests::store_csv;
    use crate::services::templates::store::save_template;
    use common::model::contact::ContactValue;

    fn test_config(dir: &tempfile::TempDir) -> AppConfig {
        AppConfig {
            db_path: dir.path().join("test.sqlite"),
            data_dir: dir.path().join("data"),
            open_browser: false,
            ..AppConfig::default()
        }
    }

    fn template(subject: &str, body: &str) -> Template {
        Template {
            id: "t-1".to_string(),
            name: "welcome".to_string(),
            subject: Some(subject.to_string()),
            body: Some(body.to_string()),
        }
    }

    fn request(from_name: Option<&str>) -> StartCampaignRequest {
        StartCampaignRequest {
            template_id: "t-1".to_string(),
            file_id: "f-1".to_string(),
            from_email: "team@mailsflow.io".to_string(),
            from_name: from_name.map(str::to_string),
        }
    }

    #[test]
    fn job_sends_the_template_that_was_checked() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let conn = db::open(&config.db_path).unwrap();
        store_csv(&conn, &config.data_dir, "f-1", "email,name\nada@example.com,Ada\n");
        save_template(&conn, &template("Hi {NAME}", "Welcome {NAME}")).unwrap();

        let plan = prepare_campaign(&conn, &config, &request(Some("MailsFlow"))).unwrap();
        assert_eq!(plan.email_column, "email");
        assert_eq!(plan.from_address, "MailsFlow <team@mailsflow.io>");

        // Saved again after the check, with a field the file cannot fill.
        save_template(&conn, &template("Hi {NAME}", "Plan {PLAN}")).unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let status = send_blocking(&tx, &config, "job-1", &plan).unwrap();
        assert_eq!(status, CampaignStatus::Completed { sent: 1, skipped: 0 });
        assert_eq!(
            rx.try_recv().unwrap().status,
            CampaignStatus::InProgress { processed: 0, total: 1 }
        );

        let body: String = conn
            .query_row("SELECT body FROM outbox WHERE job_id = 'job-1'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(body, "Welcome Ada");
    }

    #[test]
    fn plan_needs_an_email_column() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let conn = db::open(&config.db_path).unwrap();
        store_csv(&conn, &config.data_dir, "f-1", "name,company\nAda,Analytical\n");
        save_template(&conn, &template("Hi {NAME}", "From {COMPANY}")).unwrap();

        let err = prepare_campaign(&conn, &config, &request(None)).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)), "{err}");
        assert!(err.to_string().contains("no email column"));
    }

    #[test]
    fn email_check() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email(" ada@mail.example.org "));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("a da@example.com"));
        assert!(!is_valid_email("ada@example.com."));
    }

    #[test]
    fn renders_or_skips_contacts() {
        let template = Template {
            id: "t-1".to_string(),
            name: "hello".to_string(),
            subject: Some("Hi {NAME}".to_string()),
            body: Some("Your company: {Company}".to_string()),
        };
        let contact: ContactRecord = [
            ("E-mail", ContactValue::Text("ada@example.com".to_string())),
            ("name", ContactValue::Text("Ada".to_string())),
            ("company", ContactValue::Text("Analytical".to_string())),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            render_message(&template, &contact, "E-mail"),
            Some(OutboxMessage {
                recipient: "ada@example.com".to_string(),
                subject: "Hi Ada".to_string(),
                body: "Your company: Analytical".to_string(),
            })
        );

        let no_email: ContactRecord = [("E-mail", ContactValue::Null)].into_iter().collect();
        assert_eq!(render_message(&template, &no_email, "E-mail"), None);
    }
}
