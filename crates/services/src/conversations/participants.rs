use std::collections::HashSet;

use crate::auth::ports::{User, UserId, UserRepository};
use crate::conversations::errors::ConversationError;

/// Upper bound on participants per conversation, excluding the creator.
pub const MAX_PARTICIPANTS: usize = 50;

/// Coerce raw JSON entries into candidate user IDs.
///
/// Numbers and numeric strings are accepted; non-positive values and
/// non-numeric entries are discarded silently. Duplicates and the creator's
/// own ID are dropped, since the creator is implicitly a participant.
pub fn coerce_participant_ids(creator: UserId, raw: &[serde_json::Value]) -> Vec<UserId> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(|value| match value {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .filter(|&id| id > 0)
        .map(UserId)
        .filter(|&id| id != creator && seen.insert(id))
        .collect()
}

/// Validate a candidate participant list and resolve it to user records.
///
/// Rejects when the distinct non-creator set is empty, exceeds
/// [`MAX_PARTICIPANTS`], or references users that do not exist (naming the
/// missing IDs).
pub async fn resolve_participants(
    creator: UserId,
    raw: &[serde_json::Value],
    users: &dyn UserRepository,
) -> Result<Vec<User>, ConversationError> {
    let candidate_ids = coerce_participant_ids(creator, raw);

    if candidate_ids.is_empty() {
        return Err(ConversationError::Validation(
            "A conversation requires at least 2 participants".to_string(),
        ));
    }
    if candidate_ids.len() > MAX_PARTICIPANTS {
        return Err(ConversationError::Validation(format!(
            "Maximum {MAX_PARTICIPANTS} participants allowed per conversation"
        )));
    }

    let found = users
        .find_by_ids(candidate_ids.clone())
        .await
        .map_err(|e| {
            ConversationError::InternalError(format!("Failed to resolve participants: {e}"))
        })?;

    if found.len() != candidate_ids.len() {
        let found_ids: HashSet<UserId> = found.iter().map(|user| user.id).collect();
        let missing: Vec<i64> = candidate_ids
            .iter()
            .filter(|id| !found_ids.contains(id))
            .map(|id| id.0)
            .collect();
        return Err(ConversationError::UnknownParticipants(missing));
    }

    Ok(found)
}
