use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use planboard_auth::JwtClaims;
use planboard_core::{
    FeatureId, Membership, PlanFeatureValue, PlanId, Project, ProjectId, ProjectRole, Subscription, TaskId,
    TaskRecord, UserId,
};
use planboard_infra::InMemoryDirectory;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(directory: Arc<InMemoryDirectory>) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = planboard_api::app::build_app(JWT_SECRET.to_string(), directory);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(user: &str) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(user),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn join(dir: &InMemoryDirectory, project: i64, user: &str, role: ProjectRole) {
    dir.insert_membership(Membership {
        project_id: ProjectId::new(project),
        user_id: UserId::new(user),
        role,
        joined_at: Utc::now(),
    });
}

fn plan_value(dir: &InMemoryDirectory, feature: i64, value: &str) {
    dir.insert_plan_value(PlanFeatureValue {
        plan_id: PlanId::new(7),
        feature_id: FeatureId::new(feature),
        value: value.to_string(),
    });
}

/// Project 42 owned by "pm" (plan 7). Feature ids follow the default
/// vocabulary: 1 projects, 2 members, 3 file storage.
fn workspace() -> Arc<InMemoryDirectory> {
    let dir = InMemoryDirectory::with_default_features();
    dir.insert_project(Project {
        project_id: ProjectId::new(42),
        name: "atlas".to_string(),
        created_by: Some(UserId::new("pm")),
    });
    join(&dir, 42, "pm", ProjectRole::ProjectManager);
    join(&dir, 42, "lead", ProjectRole::Leader);
    join(&dir, 42, "qa", ProjectRole::Tester);
    join(&dir, 42, "bob", ProjectRole::Member);
    join(&dir, 42, "carol", ProjectRole::Member);
    dir.insert_task(TaskRecord {
        task_id: TaskId::new(9),
        project_id: ProjectId::new(42),
        assignee_id: Some(UserId::new("bob")),
        status: "open".to_string(),
    });
    dir.insert_task(TaskRecord {
        task_id: TaskId::new(10),
        project_id: ProjectId::new(42),
        assignee_id: None,
        status: "backlog".to_string(),
    });
    dir.insert_subscription(Subscription {
        owner_id: UserId::new("pm"),
        plan_id: PlanId::new(7),
    });
    plan_value(&dir, 1, "2");
    plan_value(&dir, 2, "5");
    plan_value(&dir, 3, "1000");
    Arc::new(dir)
}

#[tokio::test]
async fn health_needs_no_token() {
    let srv = TestServer::spawn(workspace()).await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn role_mismatch_returns_reason_as_json() {
    let srv = TestServer::spawn(workspace()).await;
    let client = reqwest::Client::new();

    let res = client
        .delete(srv.url("/projects/42"))
        .bearer_auth(mint_jwt("lead"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        res.headers().get("content-type").unwrap().to_str().unwrap(),
        "application/json"
    );
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "error": "You do not have permission to perform this action: requires role Project Manager." })
    );
}

#[tokio::test]
async fn member_quota_denies_at_limit_then_allows_when_unlimited() {
    let dir = workspace();
    let srv = TestServer::spawn(dir.clone()).await;
    let client = reqwest::Client::new();
    let add = json!({ "user_id": "dave", "role": "Member" });

    // Five members on a five-member plan.
    let res = client
        .post(srv.url("/projects/42/members"))
        .bearer_auth(mint_jwt("pm"))
        .json(&add)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("(5)"));

    plan_value(&dir, 2, "Unlimited");

    let res = client
        .post(srv.url("/projects/42/members"))
        .bearer_auth(mint_jwt("pm"))
        .json(&add)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn member_quota_allows_below_limit() {
    let dir = workspace();
    plan_value(&dir, 2, "6");
    let srv = TestServer::spawn(dir).await;

    let res = reqwest::Client::new()
        .post(srv.url("/projects/42/members"))
        .bearer_auth(mint_jwt("pm"))
        .json(&json!({ "user_id": "dave", "role": "Tester" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn only_the_assignee_may_update_a_task() {
    let srv = TestServer::spawn(workspace()).await;
    let client = reqwest::Client::new();
    let edit = json!({ "title": "rename" });

    let res = client
        .put(srv.url("/tasks/9"))
        .bearer_auth(mint_jwt("carol"))
        .json(&edit)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(srv.url("/tasks/9"))
        .bearer_auth(mint_jwt("bob"))
        .json(&edit)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["project_id"], 42);
}

#[tokio::test]
async fn reading_an_unassigned_task_is_allowed() {
    let srv = TestServer::spawn(workspace()).await;

    let res = reqwest::Client::new()
        .get(srv.url("/tasks/10"))
        .bearer_auth(mint_jwt("carol"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"]["status"], "backlog");
}

#[tokio::test]
async fn status_change_needs_assignee_with_allowed_role() {
    let srv = TestServer::spawn(workspace()).await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/tasks/9/status"))
        .bearer_auth(mint_jwt("bob"))
        .json(&json!({ "status": "done" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(srv.url("/tasks/10/status"))
        .bearer_auth(mint_jwt("bob"))
        .json(&json!({ "status": "done" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_testers_review() {
    let srv = TestServer::spawn(workspace()).await;
    let client = reqwest::Client::new();
    let review = json!({ "approved": true });

    let res = client
        .put(srv.url("/tasks/9/review"))
        .bearer_auth(mint_jwt("lead"))
        .json(&review)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(srv.url("/tasks/9/review"))
        .bearer_auth(mint_jwt("qa"))
        .json(&review)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn project_count_quota_uses_the_creator() {
    let dir = workspace();
    let srv = TestServer::spawn(dir.clone()).await;
    let client = reqwest::Client::new();
    let create = json!({ "name": "second" });

    // One project owned on a two-project plan.
    let res = client
        .post(srv.url("/projects"))
        .bearer_auth(mint_jwt("pm"))
        .json(&create)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    dir.insert_project(Project {
        project_id: ProjectId::new(43),
        name: "second".to_string(),
        created_by: Some(UserId::new("pm")),
    });

    let res = client
        .post(srv.url("/projects"))
        .bearer_auth(mint_jwt("pm"))
        .json(&create)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_plan_value_is_a_configuration_error() {
    let dir = InMemoryDirectory::with_default_features();
    dir.insert_project(Project {
        project_id: ProjectId::new(1),
        name: "bare".to_string(),
        created_by: Some(UserId::new("pm")),
    });
    join(&dir, 1, "pm", ProjectRole::Member);
    dir.insert_subscription(Subscription {
        owner_id: UserId::new("pm"),
        plan_id: PlanId::new(7),
    });
    let srv = TestServer::spawn(Arc::new(dir)).await;

    let res = reqwest::Client::new()
        .post(srv.url("/projects/1/files"))
        .bearer_auth(mint_jwt("pm"))
        .json(&json!({ "file_name": "a.txt", "size": 10 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("configuration error:"));
}

#[tokio::test]
async fn outsiders_cannot_read_tasks() {
    let srv = TestServer::spawn(workspace()).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/tasks/9")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.url("/tasks/9/context"))
        .bearer_auth(mint_jwt("mallory"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "You are not a member of this project.");
}

#[tokio::test]
async fn anonymous_project_creation_is_denied_as_non_member() {
    let srv = TestServer::spawn(workspace()).await;

    let res = reqwest::Client::new()
        .post(srv.url("/projects"))
        .json(&json!({ "name": "x" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "You are not a member of this project.");
}

#[tokio::test]
async fn anonymous_caller_is_not_a_member() {
    let srv = TestServer::spawn(workspace()).await;

    let res = reqwest::get(srv.url("/projects/42")).await.unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "You are not a member of this project.");
}

#[tokio::test]
async fn invalid_or_expired_tokens_are_rejected() {
    let srv = TestServer::spawn(workspace()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/projects/42"))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let past = Utc::now() - ChronoDuration::hours(2);
    let expired = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &JwtClaims {
            sub: UserId::new("pm"),
            issued_at: past,
            expires_at: past + ChronoDuration::minutes(10),
        },
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let res = client
        .get(srv.url("/projects/42"))
        .bearer_auth(expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reports_the_token_subject() {
    let srv = TestServer::spawn(workspace()).await;

    let res = reqwest::Client::new()
        .get(srv.url("/whoami"))
        .bearer_auth(mint_jwt("bob"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user_id"], "bob");
}
