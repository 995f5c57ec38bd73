use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use dportal_backend::database::pool::create_pool_with_url;
use dportal_backend::dto::auth_dto::CreateAdminPayload;
use dportal_backend::{routes, AppState};

fn init_test_config() {
    std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    std::env::set_var("DATABASE_URL", "sqlite::memory:");
    std::env::set_var("JWT_SECRET", "test_secret_key");
    std::env::set_var(
        "UPLOADS_DIR",
        std::env::temp_dir()
            .join("dportal-api-test-uploads")
            .display()
            .to_string(),
    );
    // Another test in this binary may already have initialized it.
    let _ = dportal_backend::config::init_config();
}

async fn setup_state() -> AppState {
    init_test_config();
    let pool = create_pool_with_url("sqlite::memory:")
        .await
        .expect("test pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
    AppState::new(pool)
}

fn app(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/admin/auth/login", post(routes::auth::login));

    let admin_api = Router::new()
        .route(
            "/api/admin/tests",
            get(routes::tests::list_tests).post(routes::tests::create_test),
        )
        .route(
            "/api/admin/tests/:id/questions",
            get(routes::questions::list_questions).post(routes::questions::save_question),
        )
        .route(
            "/api/admin/questions/:id",
            get(routes::questions::get_question).delete(routes::questions::delete_question),
        )
        .route("/api/admin/results", get(routes::results::list_results))
        .route(
            "/api/admin/results/export",
            get(routes::results::export_results),
        )
        .layer(axum::middleware::from_fn(
            dportal_backend::middleware::auth::require_admin,
        ));

    public.merge(admin_api).with_state(state)
}

async fn seed_admin(state: &AppState) {
    state
        .admin_service
        .create_admin(CreateAdminPayload {
            name: "Portal Admin".to_string(),
            email: "admin@school.example".to_string(),
            password: "correct horse battery".to_string(),
        })
        .await
        .expect("seed admin");
}

async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "email": "admin@school.example",
                        "password": "correct horse battery",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    body["token"].as_str().expect("token").to_string()
}

fn multipart_body(fields: &[(&str, &str)]) -> (String, String) {
    let boundary = "dportal-test-boundary";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            boundary, name, value
        ));
    }
    body.push_str(&format!("--{}--\r\n", boundary));
    (
        format!("multipart/form-data; boundary={}", boundary),
        body,
    )
}

#[tokio::test]
async fn login_and_auth_gate() {
    let state = setup_state().await;
    seed_admin(&state).await;
    let app = app(state);

    // No token.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/tests")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/tests")
                .header("authorization", "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong password.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "email": "admin@school.example",
                        "password": "wrong",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Valid credentials unlock the admin routes.
    let token = login(&app).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/tests")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn question_authoring_over_http() {
    let state = setup_state().await;
    seed_admin(&state).await;
    let app = app(state);
    let token = login(&app).await;

    // Create a test.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/tests")
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "title": "First term exam",
                        "class": "JSS1",
                        "subject": "mathematics",
                        "duration_minutes": 30,
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let test: JsonValue = serde_json::from_slice(&bytes).unwrap();
    let test_id = test["id"].as_i64().unwrap();

    // Add a single-choice question.
    let (content_type, body) = multipart_body(&[
        ("question_text", "What is 1 + 1?"),
        ("question_type", "single_choice"),
        ("option1", "2"),
        ("option2", "3"),
        ("option3", "4"),
        ("option4", "5"),
        ("correct_answer", "1"),
    ]);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/tests/{}/questions", test_id))
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let saved: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(saved["status"], "added");
    let question_id = saved["id"].as_i64().unwrap();

    // Fetch it back; the stored correct answer is the option text.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/admin/questions/{}", question_id))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let question: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(question["question_type"], "single_choice");
    assert_eq!(question["answers"]["correct_answer"], "2");

    // Edit it into a fill-blank question.
    let (content_type, body) = multipart_body(&[
        ("question_id", &question_id.to_string()),
        ("question_text", "What is 6 * 7?"),
        ("question_type", "fill_blank"),
        ("correct_answer", "42"),
    ]);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/tests/{}/questions", test_id))
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let saved: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(saved["status"], "updated");
    assert_eq!(saved["id"].as_i64().unwrap(), question_id);

    // Listing shows one question with the new shape.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/admin/tests/{}/questions", test_id))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let listing: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listing["total"].as_i64().unwrap(), 1);
    assert_eq!(listing["items"][0]["question_type"], "fill_blank");
    assert_eq!(listing["items"][0]["answers"]["correct_answer"], "42");

    // Delete it.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/questions/{}", question_id))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/admin/questions/{}", question_id))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn results_listing_and_export() {
    let state = setup_state().await;
    seed_admin(&state).await;
    let pool = state.pool.clone();
    let app = app(state.clone());
    let token = login(&app).await;

    // Seed a test, a student, and one result row.
    let test = state
        .test_service
        .create_test(
            dportal_backend::dto::test_dto::CreateTestPayload {
                title: "First term exam".to_string(),
                class: "JSS1".to_string(),
                subject: "mathematics".to_string(),
                duration_minutes: 30,
            },
            &dportal_backend::services::audit_service::Actor::default(),
        )
        .await
        .unwrap();
    let student = state
        .student_service
        .create_student(
            dportal_backend::dto::school_dto::CreateStudentPayload {
                first_name: "Ada".to_string(),
                last_name: "Obi".to_string(),
                reg_no: "JSS1/001".to_string(),
                class: "JSS1".to_string(),
            },
            &dportal_backend::services::audit_service::Actor::default(),
        )
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO test_results (test_id, student_id, score, total_questions, submitted_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(test.id)
    .bind(student.id)
    .bind(8_i64)
    .bind(10_i64)
    .bind(chrono::Utc::now())
    .execute(&pool)
    .await
    .unwrap();

    // Filtered listing.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/results?class=JSS1&subject=mathematics")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let listing: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listing["total"].as_i64().unwrap(), 1);
    assert_eq!(listing["items"][0]["student_name"], "Ada Obi");
    assert_eq!(listing["items"][0]["score"].as_i64().unwrap(), 8);

    // A filter that matches nothing.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/results?class=SS2")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let listing: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listing["total"].as_i64().unwrap(), 0);

    // Word-compatible export.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/results/export")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/msword"
    );
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains(".doc"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Ada Obi"));
    assert!(html.contains("8/10"));

    // Spreadsheet export.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/results/export?format=xlsx")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    // XLSX is a zip archive.
    assert!(bytes.starts_with(b"PK"));
}
