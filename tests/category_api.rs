mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_task, register, send, test_app};

async fn create_category(app: &axum::Router, token: &str, name: &str) -> serde_json::Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/categories",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create category failed: {body}");
    body["category"].clone()
}

#[tokio::test]
async fn create_validates_name_and_applies_defaults() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/categories",
        Some(&token),
        Some(json!({ "description": "no name" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name is required");

    let category = create_category(&app, &token, "Work").await;
    assert_eq!(category["name"], "Work");
    assert_eq!(category["color"], "#6366f1");
    assert_eq!(category["icon"], "folder");
    assert_eq!(category["description"], "");
}

#[tokio::test]
async fn duplicate_names_are_rejected_case_insensitively_per_owner() {
    let app = test_app().await;
    let ada = register(&app, "Ada", "ada@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    create_category(&app, &ada, "Work").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/categories",
        Some(&ada),
        Some(json!({ "name": "WORK" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Category already exists");

    // A different owner may reuse the name.
    create_category(&app, &bob, "Work").await;
}

#[tokio::test]
async fn deletion_is_blocked_while_tasks_reference_the_name() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    let category = create_category(&app, &token, "Work").await;
    let id = category["id"].as_str().unwrap();
    let task = create_task(&app, &token, json!({ "title": "t", "category": "Work" })).await;

    let (status, body) =
        send(&app, "DELETE", &format!("/api/categories/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Cannot delete category. 1 task(s) are using this category."
    );

    // The category survived the blocked delete.
    let (_, body) = send(&app, "GET", "/api/categories?refresh=true", Some(&token), None).await;
    assert_eq!(body["categories"].as_array().unwrap().len(), 1);

    let task_id = task["id"].as_str().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/api/tasks/{task_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) =
        send(&app, "DELETE", &format!("/api/categories/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn rename_does_not_cascade_to_task_labels() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    let category = create_category(&app, &token, "Work").await;
    let id = category["id"].as_str().unwrap();
    create_task(&app, &token, json!({ "title": "t", "category": "Work" })).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/categories/{id}"),
        Some(&token),
        Some(json!({ "name": "Job" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["name"], "Job");

    // The task keeps its denormalized label.
    let (_, body) = send(&app, "GET", "/api/tasks", Some(&token), None).await;
    assert_eq!(body["tasks"][0]["category"], "Work");
}

#[tokio::test]
async fn list_serves_mutations_immediately_despite_the_cache() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    create_category(&app, &token, "Work").await;

    // Prime the cache.
    let (_, body) = send(&app, "GET", "/api/categories", Some(&token), None).await;
    assert_eq!(body["categories"].as_array().unwrap().len(), 1);

    // The mutation invalidates the owner's entry, so the next list is
    // fresh even within the TTL.
    create_category(&app, &token, "Home").await;
    let (_, body) = send(&app, "GET", "/api/categories", Some(&token), None).await;
    assert_eq!(body["categories"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, "GET", "/api/categories?refresh=true", Some(&token), None).await;
    assert_eq!(body["categories"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn categories_are_owner_scoped_with_missing_and_foreign_alike() {
    let app = test_app().await;
    let ada = register(&app, "Ada", "ada@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    let category = create_category(&app, &ada, "Work").await;
    let id = category["id"].as_str().unwrap();

    let (_, body) = send(&app, "GET", "/api/categories", Some(&bob), None).await;
    assert_eq!(body["categories"].as_array().unwrap().len(), 0);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/categories/{id}"),
        Some(&bob),
        Some(json!({ "name": "Stolen" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Category not found");

    let (status, body) = send(&app, "DELETE", "/api/categories/abc", Some(&ada), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid category ID");
}
