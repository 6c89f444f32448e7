use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, Request, Respond, ResponseTemplate};

use crate::helpers::{project_row, TestApp, PROJECTS_PATH, SUBSCRIBERS_PATH};

/// Stores nothing, answers with the inserted rows plus the columns the
/// table fills in.
struct EchoInsertedProjects;

impl Respond for EchoInsertedProjects {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut rows: Vec<Value> = serde_json::from_slice(&request.body).unwrap();
        for row in rows.iter_mut() {
            row["id"] = json!(Uuid::new_v4());
            row["created_at"] = json!(Utc::now().to_rfc3339());
        }

        ResponseTemplate::new(201).set_body_json(rows)
    }
}

fn new_project() -> Value {
    json!({
        "title": "  E-Commerce Store ",
        "category": "Major Project",
        "description": "Cart, checkout and payments.",
        "techstack": [" React ", "", "Node.js"],
        "image": "",
        "demolink": "https://store.example.com",
        "codelink": "   ",
    })
}

async fn mount_project_inserts(test_app: &TestApp) {
    Mock::given(method("POST"))
        .and(path(PROJECTS_PATH))
        .respond_with(EchoInsertedProjects)
        .mount(&test_app.data_store)
        .await;
}

#[tokio::test]
async fn list_projects_returns_the_stored_projects() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(method("GET"))
        .and(path(PROJECTS_PATH))
        .and(query_param("order", "created_at.desc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([project_row("Chat App"), project_row("Portfolio")])),
        )
        .expect(1)
        .mount(&test_app.data_store)
        .await;

    let response = test_app.get("/api/projects").await;

    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["projects"].as_array().unwrap().len(), 2);
    assert_eq!(body["projects"][0]["title"], "Chat App");
}

#[tokio::test]
async fn create_project_stores_the_normalized_project() {
    let test_app = TestApp::spawn_app().await;
    mount_project_inserts(&test_app).await;

    let response = test_app.post_project(new_project()).await;

    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Project added successfully!");
    assert_eq!(body["data"]["title"], "E-Commerce Store");
    assert_eq!(body["data"]["techstack"], json!(["React", "Node.js"]));
    assert_eq!(body["data"]["image"], Value::Null);
    assert_eq!(body["data"]["codelink"], Value::Null);
    assert!(body["data"]["id"].as_str().is_some());
    assert!(body.get("stats").is_none());
    assert!(test_app.sent_emails().await.is_empty());
}

#[tokio::test]
async fn create_project_returns_400_for_invalid_projects() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(method("POST"))
        .and(path(PROJECTS_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&test_app.data_store)
        .await;

    let test_cases = vec![
        (
            json!({ "category": "c", "description": "d" }),
            "missing title",
        ),
        (
            json!({ "title": "", "category": "c", "description": "d" }),
            "empty title",
        ),
        (
            json!({ "title": "<script>", "category": "c", "description": "d" }),
            "forbidden characters in the title",
        ),
        (
            json!({ "title": "a".repeat(257), "category": "c", "description": "d" }),
            "title too long",
        ),
        (
            json!({ "title": "Store", "category": "", "description": "d" }),
            "empty category",
        ),
    ];

    for (invalid_body, description) in test_cases {
        let response = test_app.post_project(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload had {}",
            description
        );
    }
}

#[tokio::test]
async fn create_project_can_alert_every_subscriber() {
    let test_app = TestApp::spawn_app().await;
    mount_project_inserts(&test_app).await;
    let table = test_app.mount_subscribers_table().await;
    table.seed("ada@student.edu");
    table.seed("alan@student.edu");

    let mut project = new_project();
    project["notify_subscribers"] = json!(true);

    let response = test_app.post_project(project).await;

    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.unwrap();

    assert_eq!(body["stats"], json!({ "sent": 2, "total": 2 }));
    assert_eq!(
        body["message"],
        "Project added and 2 of 2 subscribers notified"
    );
    assert_eq!(test_app.sent_emails().await.len(), 2);
}

#[tokio::test]
async fn create_project_is_kept_when_subscribers_cannot_be_read() {
    let test_app = TestApp::spawn_app().await;
    mount_project_inserts(&test_app).await;

    Mock::given(method("GET"))
        .and(path(SUBSCRIBERS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&test_app.data_store)
        .await;

    let mut project = new_project();
    project["notify_subscribers"] = json!(true);

    let response = test_app.post_project(project).await;

    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.unwrap();

    assert_eq!(body["success"], true);
    assert!(body.get("stats").is_none());
}

#[tokio::test]
async fn update_project_replaces_the_stored_project() {
    let test_app = TestApp::spawn_app().await;
    let mut stored = project_row("E-Commerce Store v2");
    let id = stored["id"].as_str().unwrap().to_string();
    stored["techstack"] = json!(["React"]);

    Mock::given(method("PATCH"))
        .and(path(PROJECTS_PATH))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored])))
        .expect(1)
        .mount(&test_app.data_store)
        .await;

    let response = test_app
        .api_client
        .put(&format!("{}/api/projects/{}", test_app.address, id))
        .json(&json!({
            "title": "E-Commerce Store v2",
            "category": "Major Project",
            "description": "Cart, checkout and payments.",
            "techstack": ["React"],
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();

    assert_eq!(body["message"], "Project updated successfully!");
    assert_eq!(body["data"]["title"], "E-Commerce Store v2");
}

#[tokio::test]
async fn update_project_returns_404_for_unknown_projects() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(method("PATCH"))
        .and(path(PROJECTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&test_app.data_store)
        .await;

    let response = test_app
        .api_client
        .put(&format!("{}/api/projects/{}", test_app.address, Uuid::new_v4()))
        .json(&json!({
            "title": "Store",
            "category": "Major Project",
            "description": "Cart, checkout and payments.",
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn delete_project_removes_the_project() {
    let test_app = TestApp::spawn_app().await;
    let stored = project_row("Chat App");
    let id = stored["id"].as_str().unwrap().to_string();

    Mock::given(method("DELETE"))
        .and(path(PROJECTS_PATH))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored])))
        .expect(1)
        .mount(&test_app.data_store)
        .await;

    let response = test_app
        .api_client
        .delete(&format!("{}/api/projects/{}", test_app.address, id))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();

    assert_eq!(
        body,
        json!({ "success": true, "message": "Project deleted successfully!" })
    );
}

#[tokio::test]
async fn delete_project_returns_404_for_unknown_projects() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(method("DELETE"))
        .and(path(PROJECTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&test_app.data_store)
        .await;

    let response = test_app
        .api_client
        .delete(&format!("{}/api/projects/{}", test_app.address, Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn project_ids_must_be_uuids() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .api_client
        .delete(&format!("{}/api/projects/42", test_app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}
