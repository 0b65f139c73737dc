//! Outbound calls and notifications over the in-memory transport

mod common;

use common::{attached_session, next_tag, recorder};
use serde_json::json;
use sockrpc_client::{RpcSession, SessionBuilder, SessionConfig};
use sockrpc_core::{Error, Id, IdGenerator};
use std::time::Duration;

#[tokio::test]
async fn test_sum_resolves_with_three() {
    let (session, mut peer) = attached_session().await;

    let caller = session.clone();
    let call = tokio::spawn(async move { caller.call("sum", Some(json!([1, 2]))).await });

    let sent = peer.recv_json().await.unwrap();
    assert_eq!(sent["jsonrpc"], "2.0");
    assert_eq!(sent["method"], "sum");
    assert_eq!(sent["params"], json!([1, 2]));
    assert!(sent["id"].is_string(), "default ids are UUID strings");

    peer.deliver_json(&json!({"jsonrpc": "2.0", "id": sent["id"], "result": 3}));

    assert_eq!(call.await.unwrap().unwrap(), json!(3));
    assert_eq!(session.pending_count().await, 0);
}

#[tokio::test]
async fn test_timeout_rejects_naming_method_and_id() {
    let (session, mut peer) = attached_session().await;
    session
        .configure(SessionConfig::default().with_response_timeout(Duration::from_millis(50)))
        .await;

    let caller = session.clone();
    let call = tokio::spawn(async move { caller.call("sum", Some(json!([1, 2]))).await });
    let sent = peer.recv_json().await.unwrap();

    match call.await.unwrap() {
        Err(Error::Timeout { method, id }) => {
            assert_eq!(method, "sum");
            assert_eq!(json!(id), sent["id"]);
        }
        other => panic!("Expected timeout, got: {:?}", other),
    }
    assert_eq!(session.pending_count().await, 0);
}

#[tokio::test]
async fn test_late_response_still_reaches_subscribers() {
    let (session, mut peer) = attached_session().await;
    session.custom_id(IdGenerator::sequential()).await;
    session
        .configure(SessionConfig::default().with_response_timeout(Duration::from_millis(30)))
        .await;

    let (rec, mut tags) = recorder();
    let r = rec.clone();
    session
        .on_success_response(move |resp| {
            let r = r.clone();
            async move { r.record(format!("success:{}", resp.id)) }
        })
        .await;

    assert!(matches!(
        session.call("slow", None).await,
        Err(Error::Timeout { .. })
    ));
    let sent = peer.recv_json().await.unwrap();

    peer.deliver_json(&json!({"id": sent["id"], "result": "too late"}));
    assert_eq!(next_tag(&mut tags).await, "success:0");
    assert_eq!(session.pending_count().await, 0);
}

#[tokio::test]
async fn test_zero_timeout_waits_for_response() {
    let (session, mut peer) = attached_session().await;
    session
        .configure(SessionConfig::default().with_response_timeout(Duration::ZERO))
        .await;

    let caller = session.clone();
    let call = tokio::spawn(async move { caller.call("sum", None).await });
    let sent = peer.recv_json().await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!call.is_finished());
    assert_eq!(session.pending_count().await, 1);

    peer.deliver_json(&json!({"id": sent["id"], "result": null}));
    assert_eq!(call.await.unwrap().unwrap(), json!(null));
}

#[tokio::test]
async fn test_timeout_change_applies_to_later_calls() {
    let (session, mut peer) = attached_session().await;

    let caller = session.clone();
    let unguarded = tokio::spawn(async move { caller.call("first", None).await });
    let first = peer.recv_json().await.unwrap();

    session
        .configure(SessionConfig::default().with_response_timeout(Duration::from_millis(20)))
        .await;
    assert!(matches!(
        session.call("second", None).await,
        Err(Error::Timeout { .. })
    ));

    // the first call was registered without a timer
    assert!(!unguarded.is_finished());
    peer.deliver_json(&json!({"id": first["id"], "result": 1}));
    assert_eq!(unguarded.await.unwrap().unwrap(), json!(1));
}

#[tokio::test]
async fn test_remote_error_carries_error_object() {
    let (session, mut peer) = attached_session().await;
    let (rec, mut tags) = recorder();
    let r = rec.clone();
    session
        .on_any_message(move |_| {
            let r = r.clone();
            async move { r.record("any") }
        })
        .await;
    let r = rec.clone();
    session
        .on_error_response(move |resp| {
            let r = r.clone();
            async move { r.record(format!("error_response:{}", resp.error.code)) }
        })
        .await;

    let caller = session.clone();
    let call = tokio::spawn(async move { caller.call("divide", Some(json!([1, 0]))).await });
    let sent = peer.recv_json().await.unwrap();

    peer.deliver_json(&json!({
        "jsonrpc": "2.0",
        "id": sent["id"],
        "error": {"code": -32000, "message": "Division by zero", "data": {"arg": 1}}
    }));

    match call.await.unwrap() {
        Err(Error::JsonRpc(obj)) => {
            assert_eq!(obj.code, -32000);
            assert_eq!(obj.message, "Division by zero");
            assert_eq!(obj.data, Some(json!({"arg": 1})));
        }
        other => panic!("Expected remote error, got: {:?}", other),
    }

    assert_eq!(next_tag(&mut tags).await, "any");
    assert_eq!(next_tag(&mut tags).await, "error_response:-32000");
}

#[tokio::test]
async fn test_error_without_message_still_rejects() {
    let (session, mut peer) = attached_session().await;
    session
        .configure(SessionConfig::default().with_response_timeout(Duration::ZERO))
        .await;
    let (rec, mut tags) = recorder();
    let r = rec.clone();
    session
        .on_error_response(move |resp| {
            let r = r.clone();
            async move { r.record(format!("error_response:{}", resp.error.code)) }
        })
        .await;

    let caller = session.clone();
    let call = tokio::spawn(async move { caller.call("sum", None).await });
    let sent = peer.recv_json().await.unwrap();

    peer.deliver_json(&json!({"jsonrpc": "2.0", "id": sent["id"], "error": {"code": -32000}}));

    let outcome = tokio::time::timeout(Duration::from_secs(2), call)
        .await
        .expect("call never settled")
        .unwrap();
    match outcome {
        Err(Error::JsonRpc(obj)) => {
            assert_eq!(obj.code, -32000);
            assert_eq!(obj.message, "");
            assert!(obj.data.is_none());
        }
        other => panic!("Expected remote error, got: {:?}", other),
    }
    assert_eq!(session.pending_count().await, 0);
    assert_eq!(next_tag(&mut tags).await, "error_response:-32000");
}

#[tokio::test]
async fn test_notify_sends_no_id() {
    let (session, mut peer) = attached_session().await;

    session.notify("log", Some(json!({"level": "info"}))).await.unwrap();
    session.notify("ping", None).await.unwrap();

    let first = peer.recv_json().await.unwrap();
    assert_eq!(first, json!({"jsonrpc": "2.0", "method": "log", "params": {"level": "info"}}));
    assert_eq!(
        peer.recv_text().await.as_deref(),
        Some(r#"{"jsonrpc":"2.0","method":"ping"}"#)
    );
    assert_eq!(session.pending_count().await, 0);
}

#[tokio::test]
async fn test_no_rpc_omits_version_tag() {
    let (session, mut peer) = attached_session().await;
    session.no_rpc().await;
    session.custom_id(IdGenerator::from_fn(|| Id::from("fixed"))).await;

    session.notify("ping", None).await.unwrap();
    let caller = session.clone();
    let call = tokio::spawn(async move { caller.call("sum", Some(json!([1, 2]))).await });

    assert_eq!(peer.recv_text().await.as_deref(), Some(r#"{"method":"ping"}"#));
    assert_eq!(
        peer.recv_text().await.as_deref(),
        Some(r#"{"id":"fixed","method":"sum","params":[1,2]}"#)
    );

    // responses are matched whether or not they carry the tag
    peer.deliver(r#"{"id":"fixed","result":3}"#);
    assert_eq!(call.await.unwrap().unwrap(), json!(3));
}

#[tokio::test]
async fn test_builder_settings_apply_to_calls() {
    let session = SessionBuilder::new()
        .id_generator(IdGenerator::sequential())
        .response_timeout(Duration::from_millis(20))
        .no_rpc()
        .build()
        .unwrap();
    let (adapter, mut peer) = sockrpc_client::transport::memory::pair();
    session.change_socket(adapter).await;
    session.listen_messages().await.unwrap();

    assert!(matches!(
        session.call("sum", None).await,
        Err(Error::Timeout { id: Id::Number(0), .. })
    ));
    assert_eq!(peer.recv_text().await.as_deref(), Some(r#"{"id":0,"method":"sum"}"#));
}

#[tokio::test]
async fn test_concurrent_calls_settle_independently() {
    let (session, mut peer) = attached_session().await;
    session.custom_id(IdGenerator::sequential()).await;

    let mut calls = Vec::new();
    for n in 0..3 {
        let caller: RpcSession = session.clone();
        calls.push(tokio::spawn(async move { caller.call("echo", Some(json!([n]))).await }));
    }

    let mut sent = Vec::new();
    for _ in 0..3 {
        sent.push(peer.recv_json().await.unwrap());
    }
    // answer in reverse order
    for request in sent.iter().rev() {
        peer.deliver_json(&json!({"id": request["id"], "result": request["params"][0]}));
    }

    for (n, call) in calls.into_iter().enumerate() {
        assert_eq!(call.await.unwrap().unwrap(), json!(n));
    }
}
