// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use vatdesk::{
    config::{self, AppState, Config},
    db::Stores,
    docs::ApiDoc,
    handlers,
    middleware::auth::auth_guard,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Start-up failures are fatal: the service must not run half configured.
    let config = Config::from_env().expect("Invalid configuration.");
    let pool = config::connect(&config)
        .await
        .expect("Failed to connect to the database.");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations.");
    tracing::info!("Database migrations applied");

    let app_state = AppState::new(Stores::postgres(pool), &config);

    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Everything below requires a bearer token
    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let profile_routes = Router::new().route(
        "/",
        get(handlers::profile::get_profile).put(handlers::profile::save_profile),
    );

    let customer_routes = Router::new()
        .route(
            "/",
            post(handlers::customers::create_customer).get(handlers::customers::list_customers),
        )
        .route(
            "/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        .route("/{id}/summary", get(handlers::customers::get_customer_summary));

    let invoice_routes = Router::new()
        .route(
            "/",
            post(handlers::invoices::create_invoice).get(handlers::invoices::list_invoices),
        )
        .route("/by-month", get(handlers::invoices::list_invoices_by_month))
        .route("/preview", post(handlers::invoices::preview_totals))
        .route(
            "/{id}",
            get(handlers::invoices::get_invoice)
                .put(handlers::invoices::update_invoice)
                .delete(handlers::invoices::delete_invoice),
        )
        .route("/{id}/finalize", post(handlers::invoices::finalize_invoice))
        .route("/{id}/payment", put(handlers::invoices::record_payment))
        .route("/{id}/pdf", get(handlers::documents::generate_invoice_pdf));

    let expense_routes = Router::new()
        .route(
            "/",
            post(handlers::expenses::create_expense).get(handlers::expenses::list_expenses),
        )
        .route("/by-month", get(handlers::expenses::list_expenses_by_month))
        .route("/summary", get(handlers::expenses::get_expense_summary))
        .route(
            "/{id}",
            get(handlers::expenses::get_expense)
                .put(handlers::expenses::update_expense)
                .delete(handlers::expenses::delete_expense),
        )
        .route("/{id}/status", put(handlers::expenses::update_expense_status));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/revenue-by-customer", get(handlers::dashboard::get_revenue_by_customer));

    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/profile", profile_routes)
        .nest("/customers", customer_routes)
        .nest("/invoices", invoice_routes)
        .nest("/expenses", expense_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .with_state(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind the TCP listener");
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
