use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
};
use tracing::{debug, info};

use crate::middleware::AuthenticatedUser;
use crate::models::*;
use crate::routes::common::map_conversation_error_to_status;
use crate::AppState;
use services::conversations::models::{ConversationId, CreateConversationParams};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_MESSAGE_PAGE_SIZE: i64 = 50;

fn page_size(requested: Option<i64>, default: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}

fn parse_conversation_id(
    raw: &str,
) -> Result<ConversationId, (StatusCode, ResponseJson<ErrorResponse>)> {
    raw.parse().map_err(|e: services::conversations::ConversationError| {
        (
            StatusCode::BAD_REQUEST,
            ResponseJson(ErrorResponse::new(
                e.to_string(),
                "invalid_request_error".to_string(),
            )),
        )
    })
}

/// Create a new conversation
///
/// The title, description and participant list all pass through the
/// validation pipeline; duplicate conversations and rate-limit hits are
/// rejected with 409 and 429 respectively.
#[utoipa::path(
    post,
    path = "/v1/conversations",
    tag = "Conversations",
    request_body = CreateConversationRequest,
    responses(
        (status = 201, description = "Conversation created", body = ConversationObject),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Duplicate conversation", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("session_token" = []))
)]
pub async fn create_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateConversationRequest>,
) -> Result<(StatusCode, ResponseJson<ConversationObject>), (StatusCode, ResponseJson<ErrorResponse>)>
{
    debug!("Create conversation request from user: {}", user.0.id);

    let params = CreateConversationParams {
        title: request.title,
        description: request.description,
        participant_ids: request.participant_ids,
    };

    match state
        .conversation_service
        .create_conversation(user.0.id, params)
        .await
    {
        Ok(conversation) => {
            let object = ConversationObject::from(conversation);
            info!("Created conversation {} for user {}", object.id, user.0.id);
            Ok((StatusCode::CREATED, ResponseJson(object)))
        }
        Err(error) => Err((
            map_conversation_error_to_status(&error),
            ResponseJson(error.into()),
        )),
    }
}

/// Get a conversation by ID
#[utoipa::path(
    get,
    path = "/v1/conversations/{conversation_id}",
    tag = "Conversations",
    responses(
        (status = 200, description = "The conversation", body = ConversationObject),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    ),
    security(("session_token" = []))
)]
pub async fn get_conversation(
    Path(conversation_id): Path<String>,
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ResponseJson<ConversationObject>, (StatusCode, ResponseJson<ErrorResponse>)> {
    debug!("Get conversation {} for user {}", conversation_id, user.0.id);

    let id = parse_conversation_id(&conversation_id)?;
    match state.conversation_service.get_conversation(id, user.0.id).await {
        Ok(Some(conversation)) => Ok(ResponseJson(ConversationObject::from(conversation))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            ResponseJson(ErrorResponse::new(
                "Conversation not found".to_string(),
                "not_found_error".to_string(),
            )),
        )),
        Err(error) => Err((
            map_conversation_error_to_status(&error),
            ResponseJson(error.into()),
        )),
    }
}

/// List conversations for the current user
pub async fn list_conversations(
    Query(params): Query<ListConversationsQuery>,
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ResponseJson<ConversationList>, (StatusCode, ResponseJson<ErrorResponse>)> {
    let limit = page_size(params.limit, DEFAULT_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0).max(0);

    match state
        .conversation_service
        .list_conversations(user.0.id, limit, offset)
        .await
    {
        Ok(conversations) => {
            let data: Vec<ConversationObject> = conversations
                .into_iter()
                .map(ConversationObject::from)
                .collect();
            let has_more = data.len() >= limit as usize;

            Ok(ResponseJson(ConversationList {
                object: "list".to_string(),
                data,
                has_more,
            }))
        }
        Err(error) => Err((
            map_conversation_error_to_status(&error),
            ResponseJson(error.into()),
        )),
    }
}

/// Delete a conversation
#[utoipa::path(
    delete,
    path = "/v1/conversations/{conversation_id}",
    tag = "Conversations",
    responses(
        (status = 200, description = "Conversation deleted", body = ConversationDeleteResult),
        (status = 400, description = "Not the conversation creator", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    ),
    security(("session_token" = []))
)]
pub async fn delete_conversation(
    Path(conversation_id): Path<String>,
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ResponseJson<ConversationDeleteResult>, (StatusCode, ResponseJson<ErrorResponse>)> {
    debug!("Delete conversation {} for user {}", conversation_id, user.0.id);

    let id = parse_conversation_id(&conversation_id)?;
    match state
        .conversation_service
        .delete_conversation(id, user.0.id)
        .await
    {
        Ok(true) => {
            info!("Deleted conversation {} for user {}", conversation_id, user.0.id);
            Ok(ResponseJson(ConversationDeleteResult {
                id: conversation_id,
                object: "conversation.deleted".to_string(),
                deleted: true,
            }))
        }
        Ok(false) => Err((
            StatusCode::NOT_FOUND,
            ResponseJson(ErrorResponse::new(
                "Conversation not found".to_string(),
                "not_found_error".to_string(),
            )),
        )),
        Err(error) => Err((
            map_conversation_error_to_status(&error),
            ResponseJson(error.into()),
        )),
    }
}

/// Send a message to a conversation
///
/// Content is validated, rate-limited, and stored in sanitized form.
#[utoipa::path(
    post,
    path = "/v1/conversations/{conversation_id}/messages",
    tag = "Messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = MessageObject),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    ),
    security(("session_token" = []))
)]
pub async fn send_message(
    Path(conversation_id): Path<String>,
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, ResponseJson<MessageObject>), (StatusCode, ResponseJson<ErrorResponse>)> {
    debug!(
        "Send message to conversation {} from user {}",
        conversation_id, user.0.id
    );

    let id = parse_conversation_id(&conversation_id)?;
    match state
        .conversation_service
        .send_message(id, user.0.id, request.content, request.allow_formatting)
        .await
    {
        Ok(message) => Ok((StatusCode::CREATED, ResponseJson(MessageObject::from(message)))),
        Err(error) => Err((
            map_conversation_error_to_status(&error),
            ResponseJson(error.into()),
        )),
    }
}

/// List messages in a conversation, oldest first
pub async fn list_messages(
    Path(conversation_id): Path<String>,
    Query(params): Query<ListMessagesQuery>,
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ResponseJson<MessageList>, (StatusCode, ResponseJson<ErrorResponse>)> {
    let id = parse_conversation_id(&conversation_id)?;
    let limit = page_size(params.limit, DEFAULT_MESSAGE_PAGE_SIZE);

    match state
        .conversation_service
        .list_messages(id, user.0.id, limit)
        .await
    {
        Ok(messages) => Ok(ResponseJson(MessageList {
            object: "list".to_string(),
            data: messages.into_iter().map(MessageObject::from).collect(),
        })),
        Err(error) => Err((
            map_conversation_error_to_status(&error),
            ResponseJson(error.into()),
        )),
    }
}
