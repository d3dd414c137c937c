// Who the watch loop acts for, and whether they may be watched at all.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The signed-in user whose entities are watched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self { id: id.into(), name: String::new(), role: role.into() }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Source of the current actor. Read once at start and again on every tick.
pub trait ActorProvider: Send + Sync + 'static {
    fn current(&self) -> Option<Actor>;
}

impl ActorProvider for Actor {
    fn current(&self) -> Option<Actor> {
        Some(self.clone())
    }
}

/// Identity that may change mid-session (sign-out sends `None`).
impl ActorProvider for watch::Receiver<Option<Actor>> {
    fn current(&self) -> Option<Actor> {
        self.borrow().clone()
    }
}

/// Roles allowed to receive status alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityPolicy {
    eligible_roles: Vec<String>,
}

impl EligibilityPolicy {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let eligible_roles = roles
            .into_iter()
            .map(|role| {
                let role: String = role.into();
                role.trim().to_owned()
            })
            .filter(|role| !role.is_empty())
            .collect();
        Self { eligible_roles }
    }

    pub fn eligible_roles(&self) -> &[String] {
        &self.eligible_roles
    }

    /// An actor needs a non-blank id and a role from the allowed set
    /// (ASCII case-insensitive).
    pub fn is_eligible(&self, actor: &Actor) -> bool {
        if actor.id.trim().is_empty() {
            return false;
        }
        let role = actor.role.trim();
        self.eligible_roles.iter().any(|allowed| allowed.eq_ignore_ascii_case(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_match_ignores_case_and_padding() {
        let policy = EligibilityPolicy::new(["Reporter"]);
        assert!(policy.is_eligible(&Actor::new("u1", "reporter")));
        assert!(policy.is_eligible(&Actor::new("u1", " REPORTER ")));
        assert!(!policy.is_eligible(&Actor::new("u1", "staff")));
    }

    #[test]
    fn blank_actor_id_is_never_eligible() {
        let policy = EligibilityPolicy::new(["reporter"]);
        assert!(!policy.is_eligible(&Actor::new("  ", "reporter")));
    }

    #[test]
    fn blank_roles_are_dropped_from_policy() {
        let policy = EligibilityPolicy::new(["", " ", "reporter"]);
        assert_eq!(policy.eligible_roles(), ["reporter".to_owned()]);
        assert!(!policy.is_eligible(&Actor::new("u1", "")));
    }

    #[test]
    fn empty_policy_admits_nobody() {
        let policy = EligibilityPolicy::new(Vec::<String>::new());
        assert!(!policy.is_eligible(&Actor::new("u1", "reporter")));
    }

    #[test]
    fn watch_receiver_tracks_identity_changes() {
        let (tx, rx) = watch::channel(None);
        assert!(rx.current().is_none());
        tx.send_replace(Some(Actor::new("u1", "reporter").with_name("Alice")));
        let actor = rx.current().unwrap();
        assert_eq!(actor.id, "u1");
        assert_eq!(actor.name, "Alice");
        tx.send_replace(None);
        assert!(rx.current().is_none());
    }
}
