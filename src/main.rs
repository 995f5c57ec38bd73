use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use dportal_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    dto::auth_dto::CreateAdminPayload,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    {
        let admin_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&app_state.pool)
            .await?;
        if admin_count == 0 {
            match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
                (Ok(email), Ok(password)) => {
                    app_state
                        .admin_service
                        .create_admin(CreateAdminPayload {
                            name: "Administrator".to_string(),
                            email,
                            password,
                        })
                        .await?;
                    info!("Seeded the initial admin account");
                }
                _ => tracing::warn!(
                    "No admin accounts exist and ADMIN_EMAIL/ADMIN_PASSWORD are not set"
                ),
            }
        }
    }

    let base_routes = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/admin/auth/login", post(routes::auth::login));

    let admin_api = Router::new()
        .route("/api/admin/admins", post(routes::auth::create_admin))
        .route(
            "/api/admin/tests",
            get(routes::tests::list_tests).post(routes::tests::create_test),
        )
        .route(
            "/api/admin/tests/:id",
            get(routes::tests::get_test_by_id)
                .patch(routes::tests::update_test_duration)
                .delete(routes::tests::delete_test),
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
        .route(
            "/api/admin/students",
            get(routes::students::list_students).post(routes::students::create_student),
        )
        .route(
            "/api/admin/students/:id",
            axum::routing::patch(routes::students::update_student)
                .delete(routes::students::delete_student),
        )
        .route(
            "/api/admin/sessions",
            get(routes::academics::list_sessions).post(routes::academics::create_session),
        )
        .route(
            "/api/admin/sessions/:id",
            delete(routes::academics::delete_session),
        )
        .route(
            "/api/admin/sessions/:id/current",
            post(routes::academics::set_current_session),
        )
        .route(
            "/api/admin/classes",
            get(routes::academics::list_classes).post(routes::academics::create_class),
        )
        .route(
            "/api/admin/classes/:id",
            delete(routes::academics::delete_class),
        )
        .route(
            "/api/admin/subjects",
            get(routes::academics::list_subjects).post(routes::academics::create_subject),
        )
        .route(
            "/api/admin/subjects/:id",
            delete(routes::academics::delete_subject),
        )
        .route(
            "/api/admin/teachers",
            get(routes::staff::list_teachers).post(routes::staff::create_teacher),
        )
        .route(
            "/api/admin/teachers/:id",
            delete(routes::staff::delete_teacher),
        )
        .route(
            "/api/admin/teachers/:id/assignments",
            get(routes::staff::list_assignments).post(routes::staff::assign_teacher),
        )
        .route(
            "/api/admin/assignments/:id",
            delete(routes::staff::remove_assignment),
        )
        .route("/api/admin/activity-logs", get(routes::logs::list_logs))
        .layer(axum::middleware::from_fn(
            dportal_backend::middleware::auth::require_admin,
        ));

    info!("Serving uploads from: {}", config.uploads_dir);

    let app = base_routes
        .merge(admin_api)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(&config.uploads_dir),
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
