use axum::body::to_bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use chrono::{TimeZone, Utc};
use image_manifest::server::{healthz, list_files, missing_path, LookupState, EXAMPLE_PATH};
use image_manifest_core::contract::{ListPage, MockObjectLister, ObjectEntry};
use image_manifest_core::ManifestError;
use serde_json::Value;
use std::sync::Arc;

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

fn state(lister: MockObjectLister) -> State<LookupState> {
    State(LookupState::new(
        Arc::new(lister),
        "https://images.example.dev/",
    ))
}

#[tokio::test]
async fn lists_only_images_under_the_requested_path() {
    let mut lister = MockObjectLister::new();
    lister
        .expect_list_page()
        .withf(|req| req.prefix == "products/schoppel/albmerino/farben/")
        .times(1)
        .returning(|_| {
            let mut image = ObjectEntry::new("products/schoppel/albmerino/farben/Natur 0980.webp");
            image.size = Some(4096);
            image.last_modified = Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap());
            Ok(ListPage {
                objects: vec![
                    ObjectEntry::new("products/schoppel/albmerino/farben/"),
                    image,
                    ObjectEntry::new("products/schoppel/albmerino/farben/notes.txt"),
                ],
                next_continuation_token: None,
            })
        });

    let response = list_files(
        state(lister),
        Path("products/schoppel/albmerino/farben".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["pathParam"], "products/schoppel/albmerino/farben");
    assert_eq!(body["prefix"], "products/schoppel/albmerino/farben/");
    assert_eq!(body["totalFiles"], 3);
    assert_eq!(body["imageFiles"], 1);

    let file = &body["files"][0];
    assert_eq!(file["filename"], "Natur 0980.webp");
    assert_eq!(file["size"], 4096);
    assert_eq!(file["isImage"], true);
    assert_eq!(file["lastModified"], "2024-05-01T08:30:00.000Z");
    assert_eq!(
        file["url"],
        "https://images.example.dev/products/schoppel/albmerino/farben/Natur 0980.webp"
    );
}

#[tokio::test]
async fn trailing_slash_is_not_doubled() {
    let mut lister = MockObjectLister::new();
    lister
        .expect_list_page()
        .withf(|req| req.prefix == "products/schoppel/")
        .times(1)
        .returning(|_| Ok(ListPage::default()));

    let response = list_files(state(lister), Path("products/schoppel/".to_string())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["prefix"], "products/schoppel/");
    assert_eq!(body["totalFiles"], 0);
    assert_eq!(body["files"], Value::Array(vec![]));
}

#[tokio::test]
async fn blank_path_is_a_bad_request() {
    let mut lister = MockObjectLister::new();
    lister.expect_list_page().never();

    let response = list_files(state(lister), Path("   ".to_string())).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let body = body_json(response).await;
    assert_eq!(body["error"], "Path parameter required");
    assert_eq!(body["example"], EXAMPLE_PATH);
}

#[tokio::test]
async fn missing_path_route_is_a_bad_request() {
    let response = missing_path().await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["received"], "");
}

#[tokio::test]
async fn listing_failure_is_a_server_error() {
    let mut lister = MockObjectLister::new();
    lister
        .expect_list_page()
        .times(1)
        .returning(|_| Err(ManifestError::Transport("access denied".to_string())));

    let response = list_files(state(lister), Path("products/lana-grossa".to_string())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to fetch files from bucket");
    assert!(body["details"].as_str().unwrap().contains("access denied"));
    assert_eq!(body["prefix"], "products/lana-grossa/");
}

#[tokio::test]
async fn health_check_answers_ok() {
    assert_eq!(healthz().await, "ok");
}
