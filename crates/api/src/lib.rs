pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;

use crate::{
    middleware::{auth_middleware, AuthState},
    routes::{
        conversations::{
            create_conversation, delete_conversation, get_conversation, list_conversations,
            list_messages, send_message,
        },
        health::health_check,
        users::{get_current_user, update_profile},
    },
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use config::ApiConfig;
use database::{
    Database, PgConversationRepository, PgMessageRepository, PgSessionRepository, PgUserRepository,
};
use services::{
    auth::{
        AuthService, AuthServiceTrait, SessionRepository as SessionRepositoryTrait,
        UserRepository as UserRepositoryTrait,
    },
    conversations::ports::{
        ConversationRepository as ConversationRepositoryTrait, ConversationServiceTrait,
        MessageRepository as MessageRepositoryTrait,
    },
    conversations::RateLimiter,
    users::UserServiceTrait,
    ConversationService, UserService,
};
use std::sync::Arc;

/// Services shared by the route handlers
#[derive(Clone)]
pub struct AppState {
    pub conversation_service: Arc<dyn ConversationServiceTrait>,
    pub user_service: Arc<dyn UserServiceTrait>,
}

/// Initialize database connection and run migrations
pub async fn init_database(db_config: &config::DatabaseConfig) -> Arc<Database> {
    let database = Arc::new(
        Database::from_config(db_config)
            .await
            .expect("Failed to connect to database"),
    );

    tracing::info!("Starting database migrations...");
    database
        .run_migrations()
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations completed.");

    database
}

/// Wire repositories into domain services
pub fn init_services(database: &Database, config: &ApiConfig) -> (AppState, AuthState) {
    let pool = database.pool().clone();

    let user_repo =
        Arc::new(PgUserRepository::new(pool.clone())) as Arc<dyn UserRepositoryTrait>;
    let session_repo =
        Arc::new(PgSessionRepository::new(pool.clone())) as Arc<dyn SessionRepositoryTrait>;
    let conv_repo = Arc::new(PgConversationRepository::new(pool.clone()))
        as Arc<dyn ConversationRepositoryTrait>;
    let msg_repo = Arc::new(PgMessageRepository::new(pool)) as Arc<dyn MessageRepositoryTrait>;

    let rate_limiter = RateLimiter::new(
        config.limits.clone(),
        conv_repo.clone(),
        msg_repo.clone(),
    );

    let conversation_service = Arc::new(ConversationService::new(
        conv_repo,
        msg_repo,
        user_repo.clone(),
        rate_limiter,
    )) as Arc<dyn ConversationServiceTrait>;
    let user_service = Arc::new(UserService::new(user_repo.clone())) as Arc<dyn UserServiceTrait>;
    let auth_service =
        Arc::new(AuthService::new(user_repo, session_repo)) as Arc<dyn AuthServiceTrait>;

    let app_state = AppState {
        conversation_service,
        user_service,
    };
    (app_state, AuthState::new(auth_service))
}

/// Build the application router. Everything except the health check sits
/// behind the session-token middleware.
pub fn build_router(app_state: AppState, auth_state: AuthState) -> Router {
    let protected = Router::new()
        .route(
            "/conversations",
            post(create_conversation).get(list_conversations),
        )
        .route(
            "/conversations/{conversation_id}",
            get(get_conversation).delete(delete_conversation),
        )
        .route(
            "/conversations/{conversation_id}/messages",
            post(send_message).get(list_messages),
        )
        .route("/users/me", get(get_current_user).patch(update_profile))
        .layer(from_fn_with_state(auth_state, auth_middleware))
        .with_state(app_state);

    Router::new().nest(
        "/v1",
        Router::new()
            .route("/health", get(health_check))
            .merge(protected),
    )
}
