//! Session context.
//!
//! Every write takes an `Option<&Session>` explicitly; there is no ambient
//! "current user". A missing session short-circuits with
//! [`Error::AuthenticationRequired`] before the store is touched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// The authenticated user on whose behalf operations run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub user_id: Uuid,
}

impl Session {
  pub fn new(user_id: Uuid) -> Self { Self { user_id } }
}

/// Resolve an optional session or fail with `AuthenticationRequired`.
pub fn require(session: Option<&Session>) -> Result<&Session> {
  session.ok_or(Error::AuthenticationRequired)
}
