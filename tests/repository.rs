use membership_admin::domain::session::{AdminRole, SessionContext, SessionUser};
use membership_admin::domain::types::EntityId;
use membership_admin::repository::errors::ApiError;
use membership_admin::repository::{EntityReader, EntityWriter, Exporter, HttpRepository};
use serde_json::{Map, Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn session() -> SessionContext {
    SessionContext::new(
        "tok",
        SessionUser {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: AdminRole::SuperAdmin,
        },
    )
}

fn body(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_entity_crud_round() {
    let backend = MockServer::start().await;
    let repo = HttpRepository::new(backend.uri(), common::TIMEOUT).unwrap();
    let id = EntityId::new("12").unwrap();

    Mock::given(method("POST"))
        .and(path("/districts"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({"name": "North", "code": "N1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 12}})))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/districts/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 12, "name": "North", "code": "N1"}
        })))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("PUT"))
        .and(path("/districts/12"))
        .and(body_json(json!({"name": "North-East", "code": "N1"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/districts/12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&backend)
        .await;

    repo.create_entity(
        &session(),
        "districts",
        &body(json!({"name": "North", "code": "N1"})),
    )
    .await
    .unwrap();

    let row = repo.get_entity(&session(), "districts", &id).await.unwrap();
    assert_eq!(row.id().as_deref(), Some("12"));
    assert_eq!(row.cell("name"), "North");

    repo.update_entity(
        &session(),
        "districts",
        &id,
        &body(json!({"name": "North-East", "code": "N1"})),
    )
    .await
    .unwrap();

    repo.delete_entity(&session(), "districts", &id).await.unwrap();
}

#[tokio::test]
async fn test_list_without_total_counts_items() {
    let backend = MockServer::start().await;
    let repo = HttpRepository::new(backend.uri(), common::TIMEOUT).unwrap();
    Mock::given(method("GET"))
        .and(path("/campuses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]
        })))
        .mount(&backend)
        .await;

    let result = repo
        .list_entities(&session(), "campuses", &[])
        .await
        .unwrap();

    assert_eq!(result.total_count, 2);
    assert_eq!(result.items.len(), 2);
}

#[tokio::test]
async fn test_server_message_is_kept_verbatim() {
    let backend = MockServer::start().await;
    let repo = HttpRepository::new(backend.uri(), common::TIMEOUT).unwrap();
    Mock::given(method("POST"))
        .and(path("/surveys"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Passing score exceeds question count"
        })))
        .mount(&backend)
        .await;

    let err = repo
        .create_entity(&session(), "surveys", &body(json!({"title": "Quiz"})))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Server {
            status: 422,
            message: "Passing score exceeds question count".into()
        }
    );
}

#[tokio::test]
async fn test_export_forwards_filters_without_paging() {
    let backend = MockServer::start().await;
    let repo = HttpRepository::new(backend.uri(), common::TIMEOUT).unwrap();
    Mock::given(method("GET"))
        .and(path("/users/export"))
        .and(query_param("search", "ann"))
        .respond_with(ResponseTemplate::new(200).set_body_string("name\nAnn\n"))
        .expect(1)
        .mount(&backend)
        .await;

    let raw = repo
        .export_csv(
            &session(),
            "users/export",
            &[("search".to_string(), "ann".to_string())],
        )
        .await
        .unwrap();

    assert_eq!(raw, "name\nAnn\n");
}
