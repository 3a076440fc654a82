//! End-to-end dashboard flows: cached reads, tracked writes and invalidation

use campus_sdk::{
    keys, AdminContext, CacheConfig, ClientConfig, CollegeInput, ErrorKind, MutationStatus,
    ProgramInput, QueryKey, QueryStatus, SdkConfig,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context_for(server: &MockServer) -> AdminContext {
    AdminContext::new(SdkConfig {
        client: ClientConfig::with_base_url(server.uri()),
        cache: CacheConfig::for_interactive(),
        ..Default::default()
    })
    .unwrap()
}

fn college(id: &str, name: &str) -> serde_json::Value {
    json!({"_id": id, "name": name, "shortName": "C", "programs": []})
}

/// Back-to-back reads of one key issue a single request
#[tokio::test]
async fn test_concurrent_reads_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/colleges"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([college("c1", "Riverside")]))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let context = context_for(&server);

    let first = context.colleges();
    let second = context.colleges();
    assert!(first.is_initial_load());
    assert!(second.is_fetching);

    let (a, b) = tokio::join!(context.fetch_colleges(), context.fetch_colleges());
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(context.cache().stats().fetch_count, 1);
}

/// A successful create stales the list and the next read refetches
#[tokio::test]
async fn test_create_invalidates_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/colleges"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([college("c1", "Riverside")])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/colleges"))
        .respond_with(ResponseTemplate::new(201).set_body_json(college("c2", "Hillside")))
        .expect(1)
        .mount(&server)
        .await;

    let context = context_for(&server);
    context.fetch_colleges().await.unwrap();
    assert!(!context.cache().peek(&keys::colleges()).unwrap().is_stale);

    let outcome = context
        .create_college(&CollegeInput {
            name: "Hillside".into(),
            short_name: "HS".into(),
            ..Default::default()
        })
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        context.mutations().status(outcome.id),
        MutationStatus::Success
    );
    let entry = context.cache().peek(&keys::colleges()).unwrap();
    assert!(entry.is_stale);
    assert_eq!(entry.status, QueryStatus::Success);
    assert!(entry.data.is_some());

    // Fresh again after the refetch triggered by the stale read
    context.fetch_colleges().await.unwrap();
    assert!(!context.cache().peek(&keys::colleges()).unwrap().is_stale);
}

/// A failed update invalidates nothing and keeps the error on the record
#[tokio::test]
async fn test_failed_update_keeps_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/programs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"_id": "p1", "title": "BSc"}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/programs/p1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"_id": "p1", "title": "BSc"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/programs/p1"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Database unavailable"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let context = context_for(&server);
    context.fetch_programs().await.unwrap();
    context.fetch_program("p1").await.unwrap();

    let outcome = context
        .update_program(
            "p1",
            &ProgramInput {
                title: "BSc Computing".into(),
                category: "Science".into(),
                duration: "4 years".into(),
                ..Default::default()
            },
        )
        .await;

    let record = context.mutations().record(outcome.id).unwrap();
    assert_eq!(record.status, MutationStatus::Error);
    let err = record.error.unwrap();
    assert_eq!(err.kind, ErrorKind::ServerError);
    assert_eq!(err.message, "Database unavailable");

    assert!(!context.cache().peek(&keys::programs()).unwrap().is_stale);
    assert!(!context.cache().peek(&keys::program("p1")).unwrap().is_stale);

    // Served from cache: the mocks above expect exactly one GET each
    context.fetch_programs().await.unwrap();
    context.fetch_program("p1").await.unwrap();
}

/// Client-side validation fails the write without a request
#[tokio::test]
async fn test_invalid_input_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/programs"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let context = context_for(&server);
    let outcome = context.create_program(&ProgramInput::default()).await;

    let err = outcome.into_result().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.field_errors.contains_key("title"));
}

/// Deleting a college stales programs and the gallery as well
#[tokio::test]
async fn test_college_delete_stales_related_families() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/programs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gallery/college/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/inquiries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/colleges/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .mount(&server)
        .await;

    let context = context_for(&server);
    context.fetch_programs().await.unwrap();
    context.fetch_gallery_by_college("c1").await.unwrap();
    context.fetch_inquiries().await.unwrap();

    assert!(context.delete_college("c1").await.is_success());

    let stale = |key: QueryKey| context.cache().peek(&key).unwrap().is_stale;
    assert!(stale(keys::programs()));
    assert!(stale(keys::gallery_by_college("c1")));
    assert!(!stale(keys::inquiries()));
}
