//! End-to-end scenarios against the scripted service
//!
//! Submission, polling and aggregation wired together through
//! [`BulkOrchestrator`], plus the aggregator contract on its own.

#[cfg(test)]
mod tests {
    use crate::common::{batch_id, init_tracing, BatchScript, Call, RecordFactory, ScriptedService};
    use bulkforce::{
        Batch, BatchState, BulkError, BulkOrchestrator, JobSpec, OperationKind, PollConfig,
        ResultAggregator,
    };
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn insert_accounts() -> JobSpec {
        JobSpec::new("Account", OperationKind::Insert)
    }

    fn orchestrator(service: &Arc<ScriptedService>) -> BulkOrchestrator {
        BulkOrchestrator::new(service.clone(), PollConfig::default()).unwrap()
    }

    // ==================== Scenarios ====================

    /// One batch of three records, one naming an unknown field
    #[tokio::test(start_paused = true)]
    async fn test_single_batch_with_one_invalid_record() {
        init_tracing();
        let service = Arc::new(ScriptedService::new(vec![BatchScript::completes_in(2)]));
        let records = vec![
            RecordFactory::named("Acme"),
            RecordFactory::invalid(),
            RecordFactory::named("Globex"),
        ];

        let report = orchestrator(&service)
            .run(insert_accounts(), vec![records], &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 3);
        let failures: Vec<_> = report.outcomes.iter().filter(|o| !o.is_success()).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].position, 1);

        let error = failures[0].result.error.as_ref().unwrap();
        assert!(!error.fields.is_empty());
        assert_eq!(error.status_code, "INVALID_FIELD");
        assert!(failures[0].result.id.is_none());

        for outcome in report.outcomes.iter().filter(|o| o.is_success()) {
            assert!(outcome.result.id.is_some());
            assert!(outcome.result.error.is_none());
        }
    }

    /// Three batches of 4, 3 and 4 records all finishing in round three
    #[tokio::test(start_paused = true)]
    async fn test_three_batches_finish_together() {
        let service = Arc::new(ScriptedService::new(vec![
            BatchScript::completes_in(3),
            BatchScript::completes_in(3),
            BatchScript::completes_in(3),
        ]));

        let report = orchestrator(&service)
            .run(
                insert_accounts(),
                RecordFactory::sample(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.rounds, 3);
        assert_eq!(report.outcomes.len(), 11);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.succeeded(), 9);

        let grouping: Vec<(String, usize)> = report
            .outcomes
            .iter()
            .map(|o| (o.batch_id.clone(), o.position))
            .collect();
        let mut expected = Vec::new();
        for (n, size) in [4, 3, 4].into_iter().enumerate() {
            for position in 0..size {
                expected.push((batch_id(n), position));
            }
        }
        assert_eq!(grouping, expected);
    }

    /// A `Failed` batch still has its results fetched and included
    #[tokio::test(start_paused = true)]
    async fn test_failed_batch_results_are_included() {
        let service = Arc::new(ScriptedService::new(vec![
            BatchScript::completes_in(2),
            BatchScript::finishes_in(1, BatchState::Failed),
        ]));

        let report = orchestrator(&service)
            .run(
                insert_accounts(),
                vec![
                    RecordFactory::collection("Ok", 2),
                    RecordFactory::collection("Failing", 3),
                ],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 5);
        assert!(report.is_complete());
        // completion order: the failed batch finished first
        assert_eq!(report.outcomes[0].batch_id, batch_id(1));
        assert_eq!(report.outcomes[3].batch_id, batch_id(0));
        assert_eq!(service.result_fetches(), 2);
    }

    /// Fetching results of an in-progress batch is refused without a call
    #[tokio::test]
    async fn test_fetch_before_terminal_is_rejected() {
        let service = Arc::new(ScriptedService::default());
        service.register(
            "B1",
            BatchScript::never_completes(),
            RecordFactory::collection("Acme", 2),
        );
        let aggregator = ResultAggregator::new(service.clone());
        let mut batch = Batch::new("B1", "750A", BatchState::InProgress, 2);

        let err = aggregator.fetch_results(&mut batch).await.unwrap_err();

        assert!(matches!(err, BulkError::InvalidState { .. }));
        assert_eq!(service.result_fetches(), 0);
        assert!(batch.result().is_none());
    }

    // ==================== Orchestration ====================

    #[tokio::test(start_paused = true)]
    async fn test_job_closed_after_submission_before_polling() {
        let service = Arc::new(ScriptedService::new(vec![
            BatchScript::completes_in(1),
            BatchScript::completes_in(1),
        ]));

        orchestrator(&service)
            .run(
                insert_accounts(),
                vec![
                    RecordFactory::collection("A", 1),
                    RecordFactory::collection("B", 1),
                ],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let calls = service.calls();
        assert_eq!(
            calls[..4],
            [
                Call::CreateJob,
                Call::CreateBatch(batch_id(0)),
                Call::CreateBatch(batch_id(1)),
                Call::CloseJob,
            ]
        );
        assert!(matches!(calls[4], Call::GetState(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_collection_does_not_drop_others() {
        let service = Arc::new(ScriptedService::new(vec![
            BatchScript::completes_in(1),
            BatchScript::rejected("InvalidBatch", "Records not processed"),
            BatchScript::completes_in(2),
        ]));

        let report = orchestrator(&service)
            .run(
                insert_accounts(),
                RecordFactory::sample(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 1);
        assert_eq!(report.rejected[0].record_count, 3);
        assert!(matches!(
            report.rejected[0].error,
            BulkError::RemoteRejected { .. }
        ));
        assert_eq!(report.outcomes.len(), 8);
        assert!(!report.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_collections_rejected_fails_run() {
        let service = Arc::new(ScriptedService::new(vec![
            BatchScript::rejected("InvalidBatch", "first"),
            BatchScript::rejected("InvalidBatch", "second"),
        ]));

        let err = orchestrator(&service)
            .run(
                insert_accounts(),
                vec![
                    RecordFactory::collection("A", 1),
                    RecordFactory::collection("B", 1),
                ],
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        match err {
            BulkError::RemoteRejected { message, .. } => assert_eq!(message, "first"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(service.calls().contains(&Call::CloseJob));
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_result_set_is_reported() {
        let service = Arc::new(ScriptedService::new(vec![
            BatchScript::completes_in(1).with_missing_result_row(),
        ]));

        let report = orchestrator(&service)
            .run(
                insert_accounts(),
                vec![RecordFactory::collection("A", 3)],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(report.outcomes.is_empty());
        assert!(!report.is_complete());
        assert_eq!(report.unfetched.len(), 1);
        assert!(matches!(
            report.unfetched[0].error,
            BulkError::ResultCountMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_keeps_other_batches_outcomes() {
        let service = Arc::new(ScriptedService::new(vec![
            BatchScript::completes_in(1),
            BatchScript::completes_in(2).with_missing_result_row(),
            BatchScript::completes_in(3),
        ]));

        let report = orchestrator(&service)
            .run(
                insert_accounts(),
                vec![
                    RecordFactory::collection("A", 2),
                    RecordFactory::collection("B", 3),
                    RecordFactory::collection("C", 4),
                ],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        // Every completed batch was asked for its results
        assert_eq!(service.result_fetches(), 3);
        assert_eq!(report.outcomes.len(), 6);
        let first = batch_id(0);
        let third = batch_id(2);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.batch_id == first || o.batch_id == third));
        assert_eq!(report.unfetched.len(), 1);
        assert_eq!(report.unfetched[0].batch.id(), batch_id(1));
        assert!(report.render().contains("results are unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upsert_without_external_id_makes_no_calls() {
        let service = Arc::new(ScriptedService::default());

        let err = orchestrator(&service)
            .run(
                JobSpec::new("Account", OperationKind::Upsert),
                vec![RecordFactory::collection("A", 1)],
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BulkError::Config(_)));
        assert!(service.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_terminal_at_submission_completes_in_first_round() {
        let service = Arc::new(ScriptedService::new(vec![
            BatchScript::finishes_in(1, BatchState::NotProcessed)
                .starting_as(BatchState::NotProcessed),
        ]));

        let report = orchestrator(&service)
            .run(
                insert_accounts(),
                vec![RecordFactory::collection("A", 2)],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.rounds, 1);
        assert_eq!(report.outcomes.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_matches_console_format() {
        let service = Arc::new(ScriptedService::new(vec![BatchScript::completes_in(1)]));

        let report = orchestrator(&service)
            .run(
                insert_accounts(),
                vec![vec![RecordFactory::invalid()]],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let rendered = report.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Id:, Created:false, Success:false, Errors:true");
        assert_eq!(lines[1], "\tErrors:");
        assert_eq!(lines[2], "\tField:MADEUPFIELD");
        assert_eq!(lines[4], "\tINVALID_FIELD");
        assert!(lines[5].starts_with("1 records: 0 succeeded, 1 failed"));
    }
}
