//! Authorization gate and actor directory
//!
//! This module verifies who is calling the engine and what they may do.
//! The gate resolves a bearer credential to an identity, then checks the
//! identity's role against the requested action. Callers run the gate
//! check and the engine call back-to-back, with no suspension point in
//! between, so the permission check cannot go stale relative to the
//! transition.
//!
//! The engine itself holds an [`ActorDirectory`] and defensively
//! re-validates actor existence on every operation.

use crate::types::{ActorId, WithdrawalError};
use std::collections::HashMap;

/// Staff roles recognized by the withdrawal workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May open withdrawal requests
    Teacher,

    /// May decide pending requests (authorize or reject)
    Inspector,

    /// May both open and decide requests
    Admin,
}

/// Actions the gate can authorize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open a new withdrawal request
    Create,

    /// Move a request to another status
    Transition,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Transition => "transition",
        }
    }

    fn permits(&self, role: Role) -> bool {
        match self {
            Action::Create => matches!(role, Role::Teacher | Role::Admin),
            Action::Transition => matches!(role, Role::Inspector | Role::Admin),
        }
    }
}

/// A registered staff member
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    /// Unique staff identifier
    pub id: ActorId,

    /// Display name
    pub name: String,

    /// Assigned role
    pub role: Role,
}

/// An authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// The resolved actor id
    pub actor: ActorId,

    /// The actor's role
    pub role: Role,
}

/// Roster of known actors
///
/// Two modes:
/// - `strict`: only seeded actors are known; anything else is rejected.
/// - `open`: every actor id is accepted. Used by the batch import tool,
///   which replays operations a host application already authenticated.
#[derive(Debug, Clone)]
pub struct ActorDirectory {
    /// Seeded roster; `None` means open mode
    roster: Option<HashMap<ActorId, Actor>>,
}

impl ActorDirectory {
    /// Create a strict directory seeded with the given actors
    pub fn with_actors(actors: impl IntoIterator<Item = Actor>) -> Self {
        ActorDirectory {
            roster: Some(
                actors
                    .into_iter()
                    .map(|actor| (actor.id, actor))
                    .collect(),
            ),
        }
    }

    /// Create an open directory accepting any actor id
    ///
    /// Intended for trusted batch imports of already-authorized
    /// operations.
    pub fn open() -> Self {
        ActorDirectory { roster: None }
    }

    /// Look up an actor in the roster
    ///
    /// Always `None` in open mode, which accepts actors without knowing
    /// them.
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.roster.as_ref().and_then(|roster| roster.get(&id))
    }

    /// Whether the directory accepts this actor id
    pub fn knows(&self, id: ActorId) -> bool {
        match &self.roster {
            Some(roster) => roster.contains_key(&id),
            None => true,
        }
    }

    /// Defensive existence check used by the engine
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for actors the directory does not accept.
    pub fn verify(&self, id: ActorId, action: &str) -> Result<(), WithdrawalError> {
        if self.knows(id) {
            Ok(())
        } else {
            Err(WithdrawalError::unauthorized(id, action))
        }
    }
}

/// Bearer-credential verifier in front of the engine
///
/// Resolves opaque bearer tokens to identities from the strict roster
/// backing it, and checks role permissions per action.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    /// Known actors
    directory: ActorDirectory,

    /// Issued bearer tokens
    tokens: HashMap<String, ActorId>,
}

impl AuthorizationGate {
    /// Create a gate over the given directory with no issued tokens
    pub fn new(directory: ActorDirectory) -> Self {
        AuthorizationGate {
            directory,
            tokens: HashMap::new(),
        }
    }

    /// Issue a bearer token for an actor
    pub fn issue_token(&mut self, token: &str, actor: ActorId) {
        self.tokens.insert(token.to_string(), actor);
    }

    /// Resolve a bearer credential to an identity
    ///
    /// # Errors
    ///
    /// * `InvalidCredential` - the token is empty or contains whitespace
    /// * `Unauthenticated` - the token is well-formed but unknown, or it
    ///   maps to an actor the directory no longer knows
    pub fn authenticate(&self, bearer: &str) -> Result<Identity, WithdrawalError> {
        if bearer.is_empty() || bearer.chars().any(char::is_whitespace) {
            return Err(WithdrawalError::InvalidCredential);
        }

        let actor_id = self
            .tokens
            .get(bearer)
            .copied()
            .ok_or_else(|| WithdrawalError::unauthenticated("unknown token"))?;

        let actor = self
            .directory
            .get(actor_id)
            .ok_or_else(|| WithdrawalError::unauthenticated("actor no longer registered"))?;

        Ok(Identity {
            actor: actor.id,
            role: actor.role,
        })
    }

    /// Check that an identity may perform an action
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the identity's role does not permit
    /// the action.
    pub fn authorize(&self, identity: &Identity, action: Action) -> Result<(), WithdrawalError> {
        if action.permits(identity.role) {
            Ok(())
        } else {
            Err(WithdrawalError::unauthorized(identity.actor, action.name()))
        }
    }
}
