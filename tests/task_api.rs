mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_task, register, send, test_app};

#[tokio::test]
async fn create_applies_defaults_and_validates_fields() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    let task = create_task(&app, &token, json!({ "title": "Plain task" })).await;
    assert_eq!(task["status"], "pending");
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["description"], "");
    assert_eq!(task["category"], "");
    assert!(task["dueDate"].is_null());
    assert!(task["id"].is_string());
    assert!(task["userId"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");

    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({ "title": "T", "priority": "urgent" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid priority");

    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({ "title": "T", "status": "archived" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status");

    // Empty selects fall through to the defaults instead of erroring.
    let task = create_task(
        &app,
        &token,
        json!({ "title": "Empty selects", "priority": "", "status": "" }),
    )
    .await;
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["status"], "pending");

    // An unparsable due date stores null.
    let task = create_task(
        &app,
        &token,
        json!({ "title": "Bad date", "dueDate": "2024-13-01" }),
    )
    .await;
    assert!(task["dueDate"].is_null());
}

#[tokio::test]
async fn partial_update_touches_only_present_fields() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    let task = create_task(
        &app,
        &token,
        json!({ "title": "Report", "description": "Quarterly", "dueDate": "2024-11-05" }),
    )
    .await;
    let id = task["id"].as_str().unwrap();
    assert!(task["dueDate"].is_string());

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{id}"),
        Some(&token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = &body["task"];
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["title"], "Report");
    assert_eq!(updated["description"], "Quarterly");
    // Absent dueDate leaves the stored date alone.
    assert!(updated["dueDate"].is_string());

    // Explicit null clears it.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{id}"),
        Some(&token),
        Some(json!({ "dueDate": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["task"]["dueDate"].is_null());

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{id}"),
        Some(&token),
        Some(json!({ "title": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");
}

#[tokio::test]
async fn delete_distinguishes_missing_from_success() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;
    let task = create_task(&app, &token, json!({ "title": "Ephemeral" })).await;
    let id = task["id"].as_str().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/api/tasks/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) =
        send(&app, "DELETE", &format!("/api/tasks/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");

    let (status, body) = send(&app, "DELETE", "/api/tasks/not-a-number", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid task ID");
}

#[tokio::test]
async fn filters_combine_with_and() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    create_task(
        &app,
        &token,
        json!({ "title": "Ship release", "category": "Work", "priority": "high", "status": "pending" }),
    )
    .await;
    create_task(
        &app,
        &token,
        json!({ "title": "File taxes", "category": "Work", "priority": "high", "status": "completed" }),
    )
    .await;
    create_task(
        &app,
        &token,
        json!({ "title": "Water plants", "category": "Home", "priority": "high", "status": "pending" }),
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/tasks?status=pending&category=Work&priority=high",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Ship release");

    // An unknown status value means "filter absent", not an empty result.
    let (_, body) = send(&app, "GET", "/api/tasks?status=archived", Some(&token), None).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn search_matches_title_or_description_case_insensitively() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    create_task(&app, &token, json!({ "title": "Buy groceries" })).await;
    create_task(
        &app,
        &token,
        json!({ "title": "Errand", "description": "grocery list for the week" }),
    )
    .await;
    create_task(&app, &token, json!({ "title": "Unrelated" })).await;

    let (status, body) = send(&app, "GET", "/api/tasks?search=GROCER", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);

    // Search ANDs with the other filters.
    let (_, body) = send(
        &app,
        "GET",
        "/api/tasks?search=GROCER&status=completed",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn pages_concatenate_to_the_full_sorted_set() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    for title in ["alpha", "bravo", "charlie", "delta", "echo"] {
        create_task(&app, &token, json!({ "title": title })).await;
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/tasks?sortBy=title&sortOrder=asc&limit=2&page={page}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 5);
        assert_eq!(body["pagination"]["totalPages"], 3);
        assert_eq!(body["pagination"]["page"], page);
        for task in body["tasks"].as_array().unwrap() {
            seen.push(task["title"].as_str().unwrap().to_string());
        }
    }

    assert_eq!(seen, ["alpha", "bravo", "charlie", "delta", "echo"]);
}

#[tokio::test]
async fn absurd_page_numbers_return_an_empty_slice() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    for title in ["alpha", "bravo", "charlie"] {
        create_task(&app, &token, json!({ "title": title })).await;
    }

    // u64::MAX passes the >= 1 filter; the offset math must saturate
    // instead of overflowing.
    let (status, body) = send(
        &app,
        "GET",
        "/api/tasks?page=18446744073709551615&limit=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);

    // A merely-past-the-end page behaves the same way.
    let (status, body) = send(&app, "GET", "/api/tasks?page=5&limit=2", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn date_range_without_limit_returns_everything_in_the_window() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    for i in 0..15 {
        create_task(
            &app,
            &token,
            json!({ "title": format!("due task {i}"), "dueDate": "2024-11-01" }),
        )
        .await;
    }
    create_task(
        &app,
        &token,
        json!({ "title": "day after", "dueDate": "2024-11-02" }),
    )
    .await;
    create_task(&app, &token, json!({ "title": "no due date" })).await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/tasks?startDate=2024-11-01&endDate=2024-11-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Unpaginated: more than the default page size comes back and the
    // metadata carries the total only.
    assert_eq!(body["tasks"].as_array().unwrap().len(), 15);
    assert_eq!(body["pagination"], json!({ "total": 15 }));

    // An explicit limit re-enables slicing even with a range present.
    let (_, body) = send(
        &app,
        "GET",
        "/api/tasks?startDate=2024-11-01&endDate=2024-11-01&limit=10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 10);
    assert_eq!(body["pagination"]["totalPages"], 2);

    // Open-ended range: everything due from 2024-11-02 on.
    let (_, body) = send(
        &app,
        "GET",
        "/api/tasks?startDate=2024-11-02",
        Some(&token),
        None,
    )
    .await;
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "day after");
}

#[tokio::test]
async fn tasks_are_invisible_across_owners() {
    let app = test_app().await;
    let ada = register(&app, "Ada", "ada@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    let task = create_task(&app, &ada, json!({ "title": "Ada's secret" })).await;
    let id = task["id"].as_str().unwrap();

    let (_, body) = send(&app, "GET", "/api/tasks", Some(&bob), None).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 0);

    // Foreign ids are indistinguishable from missing ones.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{id}"),
        Some(&bob),
        Some(json!({ "title": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/api/tasks/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/api/tasks", Some(&ada), None).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn stats_aggregate_counts_groups_and_recent_activity() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    create_task(
        &app,
        &token,
        json!({ "title": "a", "status": "pending", "priority": "high", "category": "Work" }),
    )
    .await;
    create_task(
        &app,
        &token,
        json!({ "title": "b", "status": "completed", "priority": "low", "category": "Work" }),
    )
    .await;
    create_task(
        &app,
        &token,
        json!({ "title": "c", "status": "overdue", "priority": "high", "category": "" }),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/tasks/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let stats = &body["stats"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["pending"], 1);
    assert_eq!(stats["overdue"], 1);
    assert_eq!(
        stats["byCategory"],
        json!([
            { "category": "Work", "count": 2 },
            { "category": "Uncategorized", "count": 1 },
        ])
    );
    assert_eq!(
        stats["byPriority"],
        json!([
            { "priority": "high", "count": 2 },
            { "priority": "low", "count": 1 },
        ])
    );

    let recent = body["recentActivity"].as_array().unwrap();
    assert_eq!(recent.len(), 3);
    // Display-safe subset only: no priority or due date in the feed.
    let item = recent[0].as_object().unwrap();
    assert!(item.contains_key("title"));
    assert!(item.contains_key("status"));
    assert!(item.contains_key("updatedAt"));
    assert!(!item.contains_key("priority"));
    assert!(!item.contains_key("dueDate"));
}

#[tokio::test]
async fn recent_activity_caps_at_ten_most_recently_updated() {
    let app = test_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    let mut ids = Vec::new();
    for i in 0..12 {
        let task = create_task(&app, &token, json!({ "title": format!("task {i}") })).await;
        ids.push(task["id"].as_str().unwrap().to_string());
    }

    // Touching an early task bumps it to the front of the feed.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{}", ids[2]),
        Some(&token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/tasks/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["total"], 12);

    let recent = body["recentActivity"].as_array().unwrap();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0]["id"], ids[2].as_str());
    assert_eq!(recent[0]["title"], "task 2");
}

#[tokio::test]
async fn stats_are_owner_scoped() {
    let app = test_app().await;
    let ada = register(&app, "Ada", "ada@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    create_task(&app, &ada, json!({ "title": "a" })).await;
    create_task(&app, &ada, json!({ "title": "b" })).await;
    create_task(&app, &bob, json!({ "title": "c" })).await;

    let (_, body) = send(&app, "GET", "/api/tasks/stats", Some(&ada), None).await;
    assert_eq!(body["stats"]["total"], 2);

    let (_, body) = send(&app, "GET", "/api/tasks/stats", Some(&bob), None).await;
    assert_eq!(body["stats"]["total"], 1);
}
