//! Races between concurrent triggers on the same transaction.
//!
//! The store's conditional write is the only synchronization; these tests
//! overlap the trigger paths and assert that exactly one terminal outcome
//! wins and the client never sees more than one terminal notification.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use invoice_import_core::mocks::{MockAuditEmitter, MockClientNotifier, MockObjectStore};
use invoice_import_core::providers::{TableChange, TransactionStore as _};
use invoice_import_core::state::{SessionId, TransactionId, TransactionStatus};
use invoice_import_core::stores::{
    MemoryEventRecorder, MemoryInvoiceRepository, MemoryTransactionStore,
};
use invoice_import_engine::handlers::stream;
use invoice_import_engine::{
    CancelOutcome, ImportConfig, ImportEnvironment, LifecycleEngine, UploadOutcome,
};
use proptest::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;

type TestEngine = LifecycleEngine<
    MemoryTransactionStore,
    MockClientNotifier,
    MockAuditEmitter,
    MockObjectStore,
    MemoryInvoiceRepository,
    MemoryEventRecorder,
>;

struct Harness {
    engine: TestEngine,
    store: MemoryTransactionStore,
    notifier: MockClientNotifier,
    objects: MockObjectStore,
    invoices: MemoryInvoiceRepository,
    stream: UnboundedReceiver<TableChange>,
}

fn harness() -> Harness {
    let store = MemoryTransactionStore::new();
    let stream = store.subscribe().expect("change stream");
    let notifier = MockClientNotifier::new();
    let audit = MockAuditEmitter::new();
    let objects = MockObjectStore::new();
    let invoices = MemoryInvoiceRepository::with_change_stream(store.change_sender());
    let events = MemoryEventRecorder::new();

    let env = ImportEnvironment::new(
        store.clone(),
        notifier.clone(),
        audit,
        objects.clone(),
        invoices.clone(),
        events,
    );
    Harness {
        engine: LifecycleEngine::new(env, ImportConfig::new()),
        store,
        notifier,
        objects,
        invoices,
        stream,
    }
}

fn payload_bytes(invoice_number: &str) -> Vec<u8> {
    serde_json::json!({
        "customerName": "acme",
        "invoiceNumber": invoice_number,
        "totalValue": 10.0,
        "productId": "p-1",
        "quantity": 1,
    })
    .to_string()
    .into_bytes()
}

fn terminal_deliveries(notifier: &MockClientNotifier, session: &SessionId) -> usize {
    notifier
        .sent_to(session)
        .expect("sent")
        .iter()
        .filter(|m| m.status.is_terminal())
        .count()
}

// Scenario E: upload completion and cancel overlap on one transaction.
#[tokio::test]
async fn overlapping_upload_and_cancel_yield_one_winner() -> anyhow::Result<()> {
    let h = harness();
    let session = SessionId::new("conn-race");

    let grant = h
        .engine
        .issue_credential(session.clone(), "req-race".to_string())
        .await?;
    let id = grant.transaction_id;
    h.objects.put(id, payload_bytes("12345"))?;

    let (upload_result, cancel_result) =
        tokio::join!(h.engine.complete_upload(id), h.engine.cancel(id, &session));
    let upload_outcome = upload_result?;
    let cancel_outcome = cancel_result?;

    // Both cannot win.
    assert!(
        !(upload_outcome == UploadOutcome::Processed
            && cancel_outcome == CancelOutcome::Cancelled),
        "both triggers claimed the transaction: {upload_outcome:?} / {cancel_outcome:?}"
    );

    // Exactly one terminal state, consistent with the winning path.
    let stored = h.store.get(id).await?.status;
    match stored {
        TransactionStatus::Processed => {
            assert_eq!(upload_outcome, UploadOutcome::Processed);
            assert!(matches!(cancel_outcome, CancelOutcome::Rejected(_)));
            assert_eq!(h.invoices.len()?, 1);
        }
        TransactionStatus::Cancelled => {
            assert_eq!(cancel_outcome, CancelOutcome::Cancelled);
            assert!(matches!(
                upload_outcome,
                UploadOutcome::LostRace | UploadOutcome::StatusEchoed(TransactionStatus::Cancelled)
            ));
            assert!(h.invoices.is_empty()?);
        }
        other => unreachable!("non-terminal final status {other}"),
    }

    assert!(terminal_deliveries(&h.notifier, &session) <= 1);
    Ok(())
}

// The same race, but with the triggers on separate scheduler threads.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spawned_upload_and_cancel_agree_on_one_terminal() -> anyhow::Result<()> {
    for round in 0..32 {
        let h = harness();
        let session = SessionId::new(format!("conn-spawn-{round}"));

        let grant = h
            .engine
            .issue_credential(session.clone(), format!("req-spawn-{round}"))
            .await?;
        let id = grant.transaction_id;
        h.objects.put(id, payload_bytes("12345"))?;

        let upload_engine = h.engine.clone();
        let cancel_engine = h.engine.clone();
        let cancel_session = session.clone();

        let upload_task = tokio::spawn(async move { upload_engine.complete_upload(id).await });
        let cancel_task =
            tokio::spawn(async move { cancel_engine.cancel(id, &cancel_session).await });

        let upload_outcome = upload_task.await??;
        let cancel_outcome = cancel_task.await??;

        let stored = h.store.get(id).await?.status;
        assert!(
            stored == TransactionStatus::Processed || stored == TransactionStatus::Cancelled,
            "round {round}: non-terminal final status {stored}"
        );
        assert!(
            !(upload_outcome == UploadOutcome::Processed
                && cancel_outcome == CancelOutcome::Cancelled),
            "round {round}: both triggers won"
        );
        if stored == TransactionStatus::Cancelled {
            assert!(h.invoices.is_empty()?, "round {round}: invoice despite cancel");
        }
        assert!(
            terminal_deliveries(&h.notifier, &session) <= 1,
            "round {round}: more than one terminal delivery"
        );
    }
    Ok(())
}

// Expiry racing a late upload: the upload finds no record and backs off.
#[tokio::test]
async fn eviction_before_upload_resolves_to_not_found() -> anyhow::Result<()> {
    let mut h = harness();
    let session = SessionId::new("conn-evict");

    let grant = h
        .engine
        .issue_credential(session.clone(), "req-evict".to_string())
        .await?;
    let id = grant.transaction_id;
    h.objects.put(id, payload_bytes("12345"))?;

    let evicted = h
        .store
        .evict_expired(chrono::Utc::now() + chrono::Duration::seconds(300))?;
    assert_eq!(evicted.len(), 1);

    let outcome = h.engine.complete_upload(id).await?;
    assert_eq!(outcome, UploadOutcome::NotFound);

    // The expiry signal still owns the terminal notification.
    while let Ok(change) = h.stream.try_recv() {
        stream::handle_change(&h.engine, change).await?;
    }
    assert_eq!(terminal_deliveries(&h.notifier, &session), 1);
    assert!(h.invoices.is_empty()?);
    Ok(())
}

// A duplicate cancel can only echo, never cancel twice.
#[tokio::test]
async fn duplicate_cancel_echoes() -> anyhow::Result<()> {
    let h = harness();
    let session = SessionId::new("conn-dup");

    let grant = h
        .engine
        .issue_credential(session.clone(), "req-dup".to_string())
        .await?;
    let id = grant.transaction_id;

    assert_eq!(
        h.engine.cancel(id, &session).await?,
        CancelOutcome::Cancelled
    );
    assert_eq!(
        h.engine.cancel(id, &session).await?,
        CancelOutcome::Rejected(TransactionStatus::Cancelled)
    );

    assert_eq!(terminal_deliveries(&h.notifier, &session), 1);
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Upload,
    Cancel,
    Expire,
}

fn trigger_strategy() -> impl Strategy<Value = Trigger> {
    prop_oneof![
        Just(Trigger::Upload),
        Just(Trigger::Cancel),
        Just(Trigger::Expire),
    ]
}

async fn apply_trigger(h: &mut Harness, session: &SessionId, id: TransactionId, op: Trigger) {
    match op {
        Trigger::Upload => {
            h.engine.complete_upload(id).await.expect("upload trigger");
        }
        Trigger::Cancel => {
            h.engine.cancel(id, session).await.expect("cancel trigger");
        }
        Trigger::Expire => {
            h.store
                .evict_expired(chrono::Utc::now() + chrono::Duration::seconds(300))
                .expect("evict");
            while let Ok(change) = h.stream.try_recv() {
                stream::handle_change(&h.engine, change)
                    .await
                    .expect("stream trigger");
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // For every interleaving of triggers: the stored status history is a
    // path through the transition graph, at most one invoice is created,
    // and the client sees exactly one terminal notification.
    #[test]
    fn randomized_trigger_orders_keep_invariants(
        ops in prop::collection::vec(trigger_strategy(), 1..8),
        valid in any::<bool>(),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        let result: std::result::Result<(), TestCaseError> = rt.block_on(async {
            let mut h = harness();
            let session = SessionId::new("conn-prop");

            let grant = h
                .engine
                .issue_credential(session.clone(), "req-prop".to_string())
                .await
                .expect("issue");
            let id = grant.transaction_id;
            let number = if valid { "12345" } else { "12" };
            h.objects.put(id, payload_bytes(number)).expect("seed object");

            for op in ops {
                apply_trigger(&mut h, &session, id, op).await;
            }

            // Status history is a path through the graph.
            let mut previous = TransactionStatus::Generated;
            for (txn_id, next) in h.store.applied_transitions().expect("transitions") {
                prop_assert_eq!(txn_id, id);
                prop_assert!(
                    previous.can_advance_to(next),
                    "invalid edge {} -> {}",
                    previous,
                    next
                );
                previous = next;
            }

            // At most one invoice, and only when processing won.
            let invoices = h.invoices.len().expect("invoices");
            prop_assert!(invoices <= 1);
            if invoices == 1 {
                prop_assert_eq!(previous, TransactionStatus::Processed);
            }

            // Exactly one terminal notification reached the client.
            prop_assert_eq!(terminal_deliveries(&h.notifier, &session), 1);
            Ok(())
        });
        result?;
    }
}
