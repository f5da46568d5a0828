use std::sync::Arc;
use std::sync::Mutex;

use datagrid_lib::data::DataBinding;
use datagrid_lib::data::DataChange;
use datagrid_lib::data::DataOperations;
use datagrid_lib::data::Outcome;
use datagrid_lib::data::RequestType;
use datagrid_lib::error::Error;
use datagrid_lib::error::HandshakeError;
use datagrid_lib::error::SourceError;
use datagrid_lib::model::Record;
use datagrid_lib::query::DataResult;
use datagrid_lib::query::Predicate;
use datagrid_lib::query::Query;
use datagrid_lib::source::Changes;
use datagrid_lib::source::InMemorySource;

fn order(id: i64, country: &str) -> Record {
    Record::new().set("OrderID", id).set("ShipCountry", country)
}

fn source() -> InMemorySource {
    InMemorySource::new(vec![
        order(10248, "France"),
        order(10249, "Germany"),
        order(10250, "Brazil"),
    ])
}

fn ids(records: &[Record]) -> Vec<i64> {
    records.iter().filter_map(|r| r.get_i64("OrderID")).collect()
}

fn bound_rows(data: &DataOperations) -> Vec<Record> {
    match data.binding() {
        DataBinding::Result(result) => result.result.clone(),
        DataBinding::Source(_) => panic!("expected a result binding"),
    }
}

// ============================================================================
// Source reads
// ============================================================================

#[tokio::test]
async fn test_get_data_from_source() {
    let mut data = DataOperations::new(DataBinding::source(source()));
    let query = Query::new().filter(Predicate::ne("ShipCountry", "Germany")).requires_count();

    let result = data.get_data(&query).await.unwrap();
    assert_eq!(ids(&result.result), vec![10248, 10250]);
    assert_eq!(result.count, 2);
    assert!(!data.pending().is_pending);
}

#[tokio::test]
async fn test_plain_rows_are_queried_locally() {
    let mut data = DataOperations::new(vec![order(1, "France"), order(2, "Spain"), order(3, "Spain")]);
    assert!(matches!(data.binding(), DataBinding::Source(_)));

    let query = Query::new().filter(Predicate::eq("ShipCountry", "Spain")).requires_count();
    let result = data.get_data(&query).await.unwrap();
    assert_eq!(ids(&result.result), vec![2, 3]);
    assert_eq!(result.count, 2);
}

// ============================================================================
// Write handshake
// ============================================================================

#[tokio::test]
async fn test_write_without_handler_saves() {
    let store = source();
    let mut data = DataOperations::new(DataBinding::source(store.clone()));

    let outcome = data.insert(order(10251, "France"), 0).await.unwrap();
    assert_eq!(outcome.completed().and_then(|r| r.get_i64("OrderID")), Some(10251));
    assert_eq!(ids(&store.records()), vec![10251, 10248, 10249, 10250]);
}

#[tokio::test]
async fn test_handshake_save() {
    let store = source();
    let mut data = DataOperations::new(DataBinding::source(store.clone()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    data.on_data_change_request(move |args| {
        log.lock().unwrap().push(args.change.request_type());
        args.save();
    });

    let outcome = data
        .update("OrderID", order(10249, "Austria"))
        .await
        .unwrap();
    assert!(outcome.is_completed());
    assert_eq!(store.records()[1].get_str("ShipCountry"), Some("Austria"));
    assert_eq!(*seen.lock().unwrap(), vec![RequestType::Update]);
}

#[tokio::test]
async fn test_handshake_cancel_leaves_source_untouched() {
    let store = source();
    let mut data = DataOperations::new(DataBinding::source(store.clone()));
    data.on_data_change_request(|args| args.cancel());

    let outcome = data.insert(order(10251, "France"), 0).await.unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_dropped_confirmation_cancels() {
    let store = source();
    let mut data = DataOperations::new(DataBinding::source(store.clone()));
    data.on_data_change_request(drop);

    let outcome = data.remove("OrderID", vec![order(10248, "France")]).await.unwrap();
    assert!(outcome.is_cancelled());
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_deferred_confirmation() {
    let store = source();
    let mut data = DataOperations::new(DataBinding::source(store.clone()));
    data.on_data_change_request(|args| {
        let confirmation = args.into_confirmation();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            confirmation.save();
        });
    });

    let outcome = data.remove("OrderID", vec![order(10250, "Brazil")]).await.unwrap();
    assert_eq!(outcome, Outcome::Completed(1));
    assert_eq!(ids(&store.records()), vec![10248, 10249]);
}

#[tokio::test]
async fn test_manual_propose_and_commit() {
    let store = source();
    let mut data = DataOperations::new(DataBinding::source(store.clone()));

    let token = data.propose(DataChange::Remove {
        key_field: "OrderID".into(),
        key: 10248.into(),
    });
    assert_eq!(store.len(), 3);

    data.commit(token).await.unwrap();
    assert_eq!(store.len(), 2);

    let err = data.commit(token).await.unwrap_err();
    assert!(matches!(err, Error::Handshake(HandshakeError::UnknownToken(t)) if t == token));
}

#[tokio::test]
async fn test_abort_drops_the_proposal() {
    let mut data = DataOperations::new(DataBinding::source(source()));
    let token = data.propose(DataChange::Insert {
        record: order(1, "Spain"),
        index: 0,
    });

    let change = data.abort(token).unwrap();
    assert_eq!(change.record().and_then(|r| r.get_i64("OrderID")), Some(1));
    assert!(data.commit(token).await.is_err());
}

// ============================================================================
// Remove arity
// ============================================================================

#[tokio::test]
async fn test_remove_single_vs_batch() {
    let store = source();
    let mut data = DataOperations::new(DataBinding::source(store.clone()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    data.on_data_change_request(move |args| {
        log.lock().unwrap().push(args.change.request_type());
        args.save();
    });

    let outcome = data.remove("OrderID", Vec::new()).await.unwrap();
    assert!(outcome.is_unchanged());

    data.remove("OrderID", vec![order(10248, "France")]).await.unwrap();
    let outcome = data
        .remove("OrderID", vec![order(10249, "Germany"), order(10250, "Brazil")])
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Completed(2));
    assert!(store.is_empty());
    assert_eq!(*seen.lock().unwrap(), vec![RequestType::Remove, RequestType::BatchSave]);
}

#[tokio::test]
async fn test_save_changes_batch() {
    let store = source();
    let mut data = DataOperations::new(DataBinding::source(store.clone()));

    let empty = data.save_changes("OrderID", Changes::new()).await.unwrap();
    assert!(empty.is_unchanged());

    let changes = Changes::new()
        .with_added(order(10251, "Spain"))
        .with_deleted(order(10248, "France"));
    let saved = data.save_changes("OrderID", changes).await.unwrap();
    assert_eq!(saved.completed().map(|c| c.len()), Some(2));
    assert_eq!(ids(&store.records()), vec![10249, 10250, 10251]);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_errors_reach_handler_and_caller() {
    let mut data = DataOperations::new(DataBinding::source(source()));
    let reported = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&reported);
    data.on_error(move |e| log.lock().unwrap().push(e.to_string()));

    let err = data
        .update("OrderID", order(99999, "Nowhere"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Source(SourceError::RecordNotFound { .. })));
    assert_eq!(reported.lock().unwrap().len(), 1);
    assert!(!data.pending().is_pending);
}

// ============================================================================
// Result binding bridge
// ============================================================================

#[tokio::test]
async fn test_result_binding_without_handler_returns_stored_result() {
    let mut data = DataOperations::new(DataResult::new(vec![order(1, "France"), order(2, "Spain")]));
    let result = data
        .get_data(&Query::new().filter(Predicate::eq("ShipCountry", "Spain")))
        .await
        .unwrap();
    // The stored result is returned as-is.
    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn test_result_binding_without_handler_applies_writes() {
    let mut data = DataOperations::new(DataResult::new(vec![order(1, "France"), order(2, "Spain")]));

    data.insert(order(3, "Italy"), 1).await.unwrap();
    data.update("OrderID", order(1, "Portugal")).await.unwrap();
    data.remove("OrderID", vec![order(2, "Spain")]).await.unwrap();

    let rows = bound_rows(&data);
    assert_eq!(ids(&rows), vec![1, 3]);
    assert_eq!(rows[0].get_str("ShipCountry"), Some("Portugal"));
    match data.binding() {
        DataBinding::Result(result) => assert_eq!(result.count, 2),
        DataBinding::Source(_) => unreachable!(),
    }
}

#[tokio::test]
async fn test_result_binding_read_request() {
    let mut data = DataOperations::new(DataResult::new(Vec::new()));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    data.on_data_request(move |args| {
        log.lock().unwrap().push(args.request_type);
        let query = args.query.clone().unwrap_or_default();
        let rows = vec![order(1, "France"), order(2, "Spain")];
        args.resolve(query.execute_local(&rows));
    });

    let query = Query::new().filter(Predicate::eq("ShipCountry", "France"));
    let result = data.get_data(&query).await.unwrap();
    assert_eq!(ids(&result.result), vec![1]);
    assert_eq!(*requests.lock().unwrap(), vec![RequestType::Read]);
}

#[tokio::test]
async fn test_result_binding_write_request() {
    let mut data = DataOperations::new(DataResult::new(vec![order(1, "France")]));
    data.on_data_request(|args| {
        let mut rows = args.current.result.clone();
        if let Some(DataChange::Insert { record, index }) = &args.change {
            rows.insert(*index, record.clone());
        }
        args.resolve(DataResult::new(rows));
    });

    let outcome = data.insert(order(2, "Spain"), 0).await.unwrap();
    assert!(outcome.is_completed());
    assert_eq!(ids(&bound_rows(&data)), vec![2, 1]);
}

#[tokio::test]
async fn test_result_binding_deferred_response() {
    let mut data = DataOperations::new(DataResult::new(Vec::new()));
    data.on_data_request(|args| {
        let responder = args.into_responder();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            responder.resolve(DataResult::new(vec![order(7, "Chile")]));
        });
    });

    let result = data.get_data(&Query::new()).await.unwrap();
    assert_eq!(ids(&result.result), vec![7]);
}

#[tokio::test]
async fn test_result_binding_reject() {
    let mut data = DataOperations::new(DataResult::new(Vec::new()));
    let reported = Arc::new(Mutex::new(0));
    let count = Arc::clone(&reported);
    data.on_error(move |_| *count.lock().unwrap() += 1);
    data.on_data_request(|args| args.reject("backend offline"));

    let err = data.get_data(&Query::new()).await.unwrap_err();
    assert!(matches!(err, Error::Source(SourceError::Rejected(ref reason)) if reason == "backend offline"));
    assert_eq!(*reported.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_result_binding_dropped_responder() {
    let mut data = DataOperations::new(DataResult::new(Vec::new()));
    data.on_data_request(drop);

    let err = data.get_data(&Query::new()).await.unwrap_err();
    assert!(matches!(err, Error::Source(SourceError::RequestDropped)));
}
