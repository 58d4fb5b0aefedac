//! HTTP client integration tests
//!
//! Runs [`ForceBulkClient`] and [`PasswordFlowAuthenticator`] against a
//! local `wiremock` server.

#[cfg(test)]
mod tests {
    use bulkforce::config::AuthConfig;
    use bulkforce::{
        Authenticator, BatchState, BulkApi, BulkError, BulkOrchestrator, ForceBulkClient,
        JobSpec, OperationKind, PasswordFlowAuthenticator, PollConfig, Record, Session,
    };
    use reqwest::Client;
    use serde_json::json;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "00Dx0000000BV7z!AR8AQAxo9UfVkh8AlV0Gomt9Czx9LjHnSSpwBMmbRcgKFmxOtvxjTrKW19ye6PE3Ds1eQz3z8jr3W7_VbWmEu4Q8TVGSTHxs";
    const JOB: &str = "750x0000000005LAAQ";
    const BATCH: &str = "751x00000000079AAA";

    fn client(server: &MockServer) -> ForceBulkClient {
        ForceBulkClient::new(Client::new(), Session::new(TOKEN, server.uri(), "52.0"))
    }

    fn job_path(suffix: &str) -> String {
        format!("/services/async/52.0/job{}", suffix)
    }

    fn batch_info(state: &str) -> serde_json::Value {
        json!({
            "id": BATCH,
            "jobId": JOB,
            "state": state,
            "numberRecordsProcessed": 0,
            "numberRecordsFailed": 0
        })
    }

    // ==================== Bulk endpoints ====================

    #[tokio::test]
    async fn test_create_job_sends_json_job_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(job_path("")))
            .and(header("X-SFDC-Session", TOKEN))
            .and(body_json(json!({
                "operation": "upsert",
                "object": "Account",
                "contentType": "JSON",
                "externalIdFieldName": "External_Id__c"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": JOB,
                "state": "Open",
                "object": "Account",
                "operation": "upsert"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let spec = JobSpec::new("Account", OperationKind::Upsert)
            .with_external_id_field("External_Id__c");
        let info = client(&server).create_job(&spec).await.unwrap();

        assert_eq!(info.id, JOB);
        assert_eq!(info.operation, Some(OperationKind::Upsert));
    }

    #[tokio::test]
    async fn test_create_batch_posts_records() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(job_path(&format!("/{}/batch", JOB))))
            .and(body_json(json!([
                { "Name": "Acme" },
                { "MADEUPFIELD": "MADEUPVALUE" }
            ])))
            .respond_with(ResponseTemplate::new(201).set_body_json(batch_info("Queued")))
            .expect(1)
            .mount(&server)
            .await;

        let records = vec![
            Record::new().with("Name", "Acme"),
            Record::new().with("MADEUPFIELD", "MADEUPVALUE"),
        ];
        let info = client(&server).create_batch(JOB, &records).await.unwrap();

        assert_eq!(info.id, BATCH);
        assert_eq!(info.state, BatchState::Queued);
    }

    #[tokio::test]
    async fn test_batch_state_not_processed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(job_path(&format!("/{}/batch/{}", JOB, BATCH))))
            .respond_with(ResponseTemplate::new(200).set_body_json(batch_info("Not Processed")))
            .mount(&server)
            .await;

        let info = client(&server).get_batch_state(JOB, BATCH).await.unwrap();
        assert_eq!(info.state, BatchState::NotProcessed);
        assert!(info.state.is_terminal());
    }

    #[tokio::test]
    async fn test_batch_result_shapes_are_normalised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(job_path(&format!("/{}/batch/{}/result", JOB, BATCH))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "001x000001", "success": true, "created": true, "errors": [] },
                { "id": "", "success": "false", "created": "false", "errors": [{
                    "fields": ["MADEUPFIELD"],
                    "message": "No such column 'MADEUPFIELD' on entity 'Account'.",
                    "statusCode": "INVALID_FIELD"
                }]},
                { "id": null, "success": false, "created": false, "errors": null }
            ])))
            .mount(&server)
            .await;

        let rows = client(&server).get_batch_result(JOB, BATCH).await.unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].success && rows[0].created);
        assert_eq!(rows[0].id.as_deref(), Some("001x000001"));

        assert!(!rows[1].success);
        assert!(rows[1].id.is_none());
        let error = rows[1].error.as_ref().unwrap();
        assert_eq!(error.fields, vec!["MADEUPFIELD".to_string()]);
        assert_eq!(error.status_code, "INVALID_FIELD");

        let placeholder = rows[2].error.as_ref().unwrap();
        assert_eq!(placeholder.status_code, bulkforce::core::bulk::UNKNOWN_STATUS_CODE);
    }

    // ==================== Error mapping ====================

    #[tokio::test]
    async fn test_unknown_batch_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(job_path(&format!("/{}/batch/{}", JOB, BATCH))))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "exceptionCode": "InvalidBatch",
                "exceptionMessage": "Unable to find batch for id: 751x00000000079AAA"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_batch_state(JOB, BATCH)
            .await
            .unwrap_err();
        assert!(matches!(err, BulkError::BatchNotFound(_)));
    }

    #[tokio::test]
    async fn test_server_error_on_query_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_batch_state(JOB, BATCH)
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_rejected_batch_keeps_exception_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "exceptionCode": "InvalidJob",
                "exceptionMessage": "Job is not open"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_batch(JOB, &[Record::new().with("Name", "Acme")])
            .await
            .unwrap_err();

        match err {
            BulkError::RemoteRejected { code, message } => {
                assert_eq!(code, "InvalidJob");
                assert_eq!(message, "Job is not open");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expired_session_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "exceptionCode": "InvalidSessionId",
                "exceptionMessage": "Invalid session id"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_job(&JobSpec::new("Account", OperationKind::Insert))
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
    }

    // ==================== Full run over HTTP ====================

    #[tokio::test]
    async fn test_orchestrated_run_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(job_path("")))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": JOB, "state": "Open"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(job_path(&format!("/{}/batch", JOB))))
            .respond_with(ResponseTemplate::new(201).set_body_json(batch_info("Queued")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(job_path(&format!("/{}", JOB))))
            .and(body_json(json!({"state": "Closed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": JOB, "state": "Closed"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(job_path(&format!("/{}/batch/{}", JOB, BATCH))))
            .respond_with(ResponseTemplate::new(200).set_body_json(batch_info("Completed")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(job_path(&format!("/{}/batch/{}/result", JOB, BATCH))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "001x000001", "success": true, "created": true, "errors": [] },
                { "id": "001x000002", "success": true, "created": true, "errors": [] }
            ])))
            .mount(&server)
            .await;

        let orchestrator = BulkOrchestrator::new(Arc::new(client(&server)), PollConfig::default()).unwrap();
        let report = orchestrator
            .run(
                JobSpec::new("Account", OperationKind::Insert),
                vec![vec![
                    Record::new().with("Name", "Acme"),
                    Record::new().with("Name", "Globex"),
                ]],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.job.id(), JOB);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.rounds, 1);
    }

    // ==================== Credential exchange ====================

    fn auth_config(server: &MockServer) -> AuthConfig {
        AuthConfig {
            client_id: "3MVG9consumerkey".to_string(),
            client_secret: "consumersecret".to_string(),
            username: "integration@example.com".to_string(),
            password: "hunter2".to_string(),
            security_token: "TOKEN123".to_string(),
            login_url: Some(server.uri()),
            ..AuthConfig::default()
        }
    }

    #[tokio::test]
    async fn test_password_flow_returns_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/oauth2/token"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("password=hunter2TOKEN123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": TOKEN,
                "instance_url": "https://na1.salesforce.com",
                "id": "https://login.salesforce.com/id/00Dx0000000BV7z/005x00000012Q9P",
                "token_type": "Bearer",
                "issued_at": "1278448832702",
                "signature": "0CmxinZir53Yex7nE0TD+zMpvIWYGb/bdJh6XfOH6EQ="
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = PasswordFlowAuthenticator::new(Client::new())
            .authenticate(&auth_config(&server))
            .await
            .unwrap();

        assert_eq!(session.access_token, TOKEN);
        assert_eq!(session.instance_url, "https://na1.salesforce.com");
        assert_eq!(session.api_version, "52.0");
    }

    #[tokio::test]
    async fn test_password_flow_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "authentication failure"
            })))
            .mount(&server)
            .await;

        let err = PasswordFlowAuthenticator::new(Client::new())
            .authenticate(&auth_config(&server))
            .await
            .unwrap_err();

        match err {
            BulkError::AuthenticationFailed(reason) => {
                assert_eq!(reason, "invalid_grant: authentication failure");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
