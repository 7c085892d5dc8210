use sha2::{Digest, Sha256};
use tracing::warn;

use crate::auth::ports::UserId;
use crate::conversations::ports::ConversationRepository;

/// Compute the duplicate-detection fingerprint for a conversation.
///
/// The participant set is sorted and deduplicated before hashing, so any
/// permutation of the same IDs with the same title yields the same value.
/// The title is domain-separated from the IDs, so changing it changes the
/// fingerprint.
pub fn conversation_fingerprint(participant_ids: &[UserId], title: &str) -> String {
    let mut ids: Vec<i64> = participant_ids.iter().map(|id| id.0).collect();
    ids.sort_unstable();
    ids.dedup();

    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.to_be_bytes());
    }
    hasher.update([0u8]);
    hasher.update(title.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Advisory duplicate check against the creator's existing conversations.
///
/// Fails open: if the lookup itself errors, the condition is logged and the
/// conversation is allowed rather than blocked on infrastructure failure.
/// The check is read-then-decide, so two racing identical creates can both
/// pass; there is deliberately no unique constraint backing it.
pub async fn is_duplicate_conversation(
    repo: &dyn ConversationRepository,
    creator: UserId,
    fingerprint: &str,
) -> bool {
    match repo.exists_with_fingerprint(creator, fingerprint).await {
        Ok(exists) => exists,
        Err(e) => {
            warn!(
                "Duplicate check failed for user {creator}, allowing creation: {e}"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversations::ports::MockConversationRepository;

    fn ids(raw: &[i64]) -> Vec<UserId> {
        raw.iter().copied().map(UserId).collect()
    }

    #[test]
    fn fingerprint_is_commutative_in_participants() {
        let title = "Project kickoff";
        let reference = conversation_fingerprint(&ids(&[2, 3, 5]), title);
        for permutation in [[3, 2, 5], [5, 3, 2], [2, 5, 3], [3, 5, 2], [5, 2, 3]] {
            assert_eq!(conversation_fingerprint(&ids(&permutation), title), reference);
        }
    }

    #[test]
    fn fingerprint_changes_with_title() {
        let participants = ids(&[2, 3]);
        assert_ne!(
            conversation_fingerprint(&participants, "Kickoff"),
            conversation_fingerprint(&participants, "Kickoff!")
        );
    }

    #[test]
    fn fingerprint_changes_with_participants() {
        assert_ne!(
            conversation_fingerprint(&ids(&[2, 3]), "Kickoff"),
            conversation_fingerprint(&ids(&[2, 4]), "Kickoff")
        );
    }

    #[test]
    fn duplicate_ids_do_not_change_the_fingerprint() {
        assert_eq!(
            conversation_fingerprint(&ids(&[2, 3, 3]), "Kickoff"),
            conversation_fingerprint(&ids(&[2, 3]), "Kickoff")
        );
    }

    #[tokio::test]
    async fn duplicate_check_fails_open_on_repository_error() {
        let mut repo = MockConversationRepository::new();
        repo.expect_exists_with_fingerprint()
            .returning(|_, _| Err(anyhow::anyhow!("connection refused")));

        assert!(!is_duplicate_conversation(&repo, UserId(1), "abc").await);
    }

    #[tokio::test]
    async fn duplicate_check_reports_existing_fingerprints() {
        let mut repo = MockConversationRepository::new();
        repo.expect_exists_with_fingerprint().returning(|_, _| Ok(true));

        assert!(is_duplicate_conversation(&repo, UserId(1), "abc").await);
    }
}
