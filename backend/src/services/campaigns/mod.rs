//! Campaign verification, start and progress.
//!
//! - `POST /api/campaigns/verify`: field mapping analysis of a template
//!   against a contact file (`FieldMappingResult`).
//! - `POST /api/campaigns/start`: gated on the same analysis; starts the send
//!   job and answers with `{ "job_id": ... }`.
//! - `GET /api/campaigns/status/{job_id}`: polled by clients until the status
//!   is terminal.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod get_status;
mod start;
pub mod verify;

const API_PATH: &str = "/api/campaigns";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/verify", post().to(verify::process))
        .route("/start", post().to(start::process))
        .route("/status/{job_id}", get().to(get_status::process))
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::db;
    use crate::job_controller::state::{start_job_updater, JobsState};
    use crate::services;
    use crate::services::files::store::tests::store_csv;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use common::jobs::CampaignStatus;
    use common::mapping::FieldMappingResult;
    use common::model::template::Template;
    use common::requests::{StartCampaignRequest, StartCampaignResponse, VerifyCampaignRequest};
    use std::time::Duration;

    const CONTACTS: &str = "Email;First Name;Company\n\
                            ada@example.com;Ada;Analytical\n\
                            ;Nobody;Void\n\
                            grace@example.com;Grace;Navy\n";

    fn test_config(dir: &tempfile::TempDir) -> AppConfig {
        AppConfig {
            db_path: dir.path().join("test.sqlite"),
            data_dir: dir.path().join("data"),
            open_browser: false,
            ..AppConfig::default()
        }
    }

    fn template(id: &str, subject: &str, body: &str) -> Template {
        Template {
            id: id.to_string(),
            name: id.to_string(),
            subject: Some(subject.to_string()),
            body: Some(body.to_string()),
        }
    }

    #[actix_web::test]
    async fn verify_start_and_poll_campaign() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        {
            let conn = db::open(&config.db_path).unwrap();
            store_csv(&conn, &config.data_dir, "f-1", CONTACTS);
        }

        let (jobs, rx) = JobsState::new(16);
        actix_web::rt::spawn(start_job_updater(
            jobs.jobs.clone(),
            rx,
            config.job_retention,
        ));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config.clone()))
                .app_data(web::Data::new(jobs.clone()))
                .configure(services::configure),
        )
        .await;

        for t in [
            template("good", "Hello {FIRST-NAME}", "News from {company}"),
            template("bad", "Hello {FIRST-NAME}", "Your plan: {PLAN}"),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/templates/save")
                .set_json(&t)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let req = test::TestRequest::post()
            .uri("/api/campaigns/verify")
            .set_json(VerifyCampaignRequest {
                template_id: "good".to_string(),
                file_id: "f-1".to_string(),
            })
            .to_request();
        let result: FieldMappingResult = test::call_and_read_body_json(&app, req).await;
        assert!(result.is_valid);
        assert_eq!(result.file_columns, ["Email", "First Name", "Company"]);
        assert_eq!(result.matched_fields, ["FIRST-NAME", "company"]);

        // The start endpoint refuses what the analysis rejects.
        let req = test::TestRequest::post()
            .uri("/api/campaigns/start")
            .set_json(StartCampaignRequest {
                template_id: "bad".to_string(),
                file_id: "f-1".to_string(),
                from_email: "team@mailsflow.io".to_string(),
                from_name: None,
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let refused: FieldMappingResult = test::read_body_json(resp).await;
        assert_eq!(refused.missing_fields, ["PLAN"]);

        let req = test::TestRequest::post()
            .uri("/api/campaigns/start")
            .set_json(StartCampaignRequest {
                template_id: "good".to_string(),
                file_id: "f-1".to_string(),
                from_email: "team@mailsflow.io".to_string(),
                from_name: Some("MailsFlow".to_string()),
            })
            .to_request();
        let started: StartCampaignResponse = test::call_and_read_body_json(&app, req).await;

        let mut status = CampaignStatus::Pending;
        for _ in 0..200 {
            let req = test::TestRequest::get()
                .uri(&format!("/api/campaigns/status/{}", started.job_id))
                .to_request();
            status = test::call_and_read_body_json(&app, req).await;
            if status.is_terminal() {
                break;
            }
            actix_web::rt::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(status, CampaignStatus::Completed { sent: 2, skipped: 1 });

        let conn = db::open(&config.db_path).unwrap();
        let (recipient, from, subject, body): (String, String, String, String) = conn
            .query_row(
                "SELECT recipient, from_address, subject, body FROM outbox
                 WHERE job_id = ?1 ORDER BY id LIMIT 1",
                [&started.job_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(recipient, "ada@example.com");
        assert_eq!(from, "MailsFlow <team@mailsflow.io>");
        assert_eq!(subject, "Hello Ada");
        assert_eq!(body, "News from Analytical");
    }

    #[actix_web::test]
    async fn unknown_ids_and_bad_sender() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let (jobs, _rx) = JobsState::new(4);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(jobs))
                .configure(services::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/campaigns/status/nope")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = test::TestRequest::post()
            .uri("/api/campaigns/verify")
            .set_json(VerifyCampaignRequest {
                template_id: "missing".to_string(),
                file_id: "missing".to_string(),
            })
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = test::TestRequest::post()
            .uri("/api/campaigns/start")
            .set_json(StartCampaignRequest {
                template_id: "missing".to_string(),
                file_id: "missing".to_string(),
                from_email: "not-an-address".to_string(),
                from_name: None,
            })
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn start_refuses_file_without_email_column() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        {
            let conn = db::open(&config.db_path).unwrap();
            store_csv(&conn, &config.data_dir, "f-2", "name;company\nAda;Analytical\n");
        }
        let (jobs, _rx) = JobsState::new(4);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(jobs.clone()))
                .configure(services::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/templates/save")
            .set_json(template("names", "Hi {NAME}", "From {company}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/campaigns/start")
            .set_json(StartCampaignRequest {
                template_id: "names".to_string(),
                file_id: "f-2".to_string(),
                from_email: "team@mailsflow.io".to_string(),
                from_name: None,
            })
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
        assert!(jobs.jobs.read().await.is_empty());
    }
}
