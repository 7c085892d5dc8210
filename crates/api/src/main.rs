use api::{build_router, init_database, init_services};
use config::{ApiConfig, LoggingConfig};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    // Load configuration first to get logging settings
    let config = ApiConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Application cannot start without a valid configuration file.");
        std::process::exit(1);
    });

    // Initialize tracing with configuration from config.yaml
    init_tracing(&config.logging);

    let database = init_database(&config.database).await;
    let (app_state, auth_state) = init_services(&database, &config);

    let app = build_router(app_state, auth_state).layer(CorsLayer::permissive());

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .expect("Failed to bind server address");

    tracing::info!(address = %bind_address, "Server started successfully");
    tracing::info!("API Endpoints:");
    tracing::info!("  - GET /v1/health (Health check)");
    tracing::info!("  - GET/POST /v1/conversations");
    tracing::info!("  - GET/DELETE /v1/conversations/{{id}}");
    tracing::info!("  - GET/POST /v1/conversations/{{id}}/messages");
    tracing::info!("  - GET/PATCH /v1/users/me");

    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}

fn init_tracing(logging_config: &LoggingConfig) {
    // Build the filter string from the logging configuration
    let mut filter = logging_config.level.clone();

    for (module, level) in &logging_config.modules {
        filter.push_str(&format!(",{}={}", module, level));
    }

    // Initialize tracing based on the format specified in config
    match logging_config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .compact()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .init();
        }
    }
}
