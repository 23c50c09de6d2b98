// storefront/src/services/session.rs

use uuid::Uuid;

use crate::models::{CartIdentity, SessionToken};

/// Issues anonymous session keys for guests that arrive without one.
pub trait SessionProvisioner: Send + Sync {
  fn provision(&self) -> SessionToken;
}

/// 32 hex characters from a random UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSessionProvisioner;

impl SessionProvisioner for RandomSessionProvisioner {
  fn provision(&self) -> SessionToken {
    SessionToken::new(Uuid::new_v4().simple().to_string())
  }
}

/// The identity a request acts as, and whether its session key is new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
  pub identity: CartIdentity,
  /// Set when a session was provisioned for this request and must be
  /// returned to the client.
  pub issued_session: Option<SessionToken>,
}

/// A signed-in user wins over a session key; with neither, a session is provisioned.
pub fn resolve_identity(
  user_id: Option<Uuid>,
  session: Option<SessionToken>,
  provisioner: &dyn SessionProvisioner,
) -> ResolvedIdentity {
  match (user_id, session) {
    (Some(user_id), _) => ResolvedIdentity {
      identity: CartIdentity::User(user_id),
      issued_session: None,
    },
    (None, Some(token)) => ResolvedIdentity {
      identity: CartIdentity::Session(token),
      issued_session: None,
    },
    (None, None) => {
      let token = provisioner.provision();
      tracing::debug!(session = %token, "Provisioned anonymous session.");
      ResolvedIdentity {
        identity: CartIdentity::Session(token.clone()),
        issued_session: Some(token),
      }
    }
  }
}
