use crate::models::*;
use crate::routes::health::HealthResponse;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "OpenHub API",
        description = "Collaboration API for OpenHub: conversations, messages and user profiles.\n\n## Authentication\n\nUse `Authorization: Bearer <token>` with a session token.",
        version = "1.0.0",
        license(
            name = "MIT",
        )
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::conversations::create_conversation,
        crate::routes::conversations::get_conversation,
        crate::routes::conversations::delete_conversation,
        crate::routes::conversations::send_message,
        crate::routes::users::get_current_user,
        crate::routes::users::update_profile,
    ),
    components(
        schemas(
            ErrorResponse, ErrorDetail, HealthResponse,
            CreateConversationRequest, ConversationObject, ConversationList,
            ConversationDeleteResult, SendMessageRequest, MessageObject, MessageList,
            UserResponse, UpdateUserProfileRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Conversations", description = "Conversation management"),
        (name = "Messages", description = "Messaging within conversations"),
        (name = "Users", description = "User profiles")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
