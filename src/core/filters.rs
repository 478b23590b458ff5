use crate::models::{RelationHistory, User};

/// True when the actor has no recorded outcome for `candidate`, whatever its status
#[inline]
pub fn is_unseen(candidate: &User, history: &RelationHistory) -> bool {
    !history.contains(candidate.id)
}

/// Drop every candidate present in `history`, keeping directory order
pub fn exclude_seen(candidates: Vec<User>, history: &RelationHistory) -> Vec<User> {
    if history.is_empty() {
        return candidates;
    }

    candidates
        .into_iter()
        .filter(|candidate| is_unseen(candidate, history))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SwipeOutcome, SwipeStatus};

    fn candidate(id: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            password: String::new(),
            full_name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            is_premium: false,
        }
    }

    fn ids(users: &[User]) -> Vec<i64> {
        users.iter().map(|u| u.id).collect()
    }

    #[test]
    fn test_exclude_seen_keeps_order() {
        let candidates = (2..=7).map(candidate).collect();
        let history = RelationHistory::from_entries(vec![
            SwipeOutcome::new(4, SwipeStatus::Neutral),
            SwipeOutcome::new(7, SwipeStatus::Liked),
        ]);

        let result = exclude_seen(candidates, &history);
        assert_eq!(ids(&result), vec![2, 3, 5, 6]);
    }

    #[test]
    fn test_every_status_counts_as_seen() {
        let history = RelationHistory::from_entries(vec![
            SwipeOutcome::new(1, SwipeStatus::Liked),
            SwipeOutcome::new(2, SwipeStatus::Passed),
            SwipeOutcome::new(3, SwipeStatus::Neutral),
        ]);

        for id in 1..=3 {
            assert!(!is_unseen(&candidate(id), &history));
        }
        assert!(is_unseen(&candidate(4), &history));
    }

    #[test]
    fn test_empty_history_returns_input() {
        let candidates: Vec<User> = vec![candidate(9), candidate(3)];
        let result = exclude_seen(candidates, &RelationHistory::new());
        assert_eq!(ids(&result), vec![9, 3]);
    }
}
