//! Student profile shown alongside the schedule.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Error, Result,
  session::{self, Session},
  store::RecordStore,
};

/// Name shown when the profile carries none.
pub const ANONYMOUS: &str = "Student";

/// Per-user descriptive details. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub user_id:     uuid::Uuid,
  pub full_name:   Option<String>,
  pub roll_number: Option<String>,
  pub semester:    Option<String>,
  pub department:  Option<String>,
}

impl Profile {
  pub fn empty(user_id: uuid::Uuid) -> Self {
    Self { user_id, ..Self::default() }
  }

  pub fn display_name(&self) -> &str {
    self.full_name.as_deref().unwrap_or(ANONYMOUS)
  }

  /// Upper-cased first letter of each word of the full name.
  pub fn initials(&self) -> String {
    self
      .display_name()
      .split_whitespace()
      .filter_map(|word| word.chars().next())
      .flat_map(char::to_uppercase)
      .collect()
  }
}

/// Changes to a profile. `None` keeps a field, `Some("")` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
  pub full_name:   Option<String>,
  pub roll_number: Option<String>,
  pub semester:    Option<String>,
  pub department:  Option<String>,
}

fn merge(current: Option<String>, change: Option<String>) -> Option<String> {
  match change {
    None => current,
    Some(value) => {
      let value = value.trim();
      (!value.is_empty()).then(|| value.to_owned())
    }
  }
}

impl ProfileUpdate {
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  pub fn apply(self, current: Profile) -> Profile {
    Profile {
      user_id:     current.user_id,
      full_name:   merge(current.full_name, self.full_name),
      roll_number: merge(current.roll_number, self.roll_number),
      semester:    merge(current.semester, self.semester),
      department:  merge(current.department, self.department),
    }
  }
}

// ─── Book ────────────────────────────────────────────────────────────────────

/// Read and write access to the session user's profile.
#[derive(Debug, Clone)]
pub struct ProfileBook<S> {
  store: S,
}

impl<S: RecordStore> ProfileBook<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// The stored profile, or `None` if the user never saved one.
  pub async fn profile(&self, session: Option<&Session>) -> Result<Option<Profile>> {
    let session = session::require(session)?;
    self
      .store
      .get_profile(session.user_id)
      .await
      .map_err(Error::persistence)
  }

  /// Merge `update` into the current profile, write it, and return the
  /// refetched profile.
  pub async fn save(
    &self,
    session: Option<&Session>,
    update: ProfileUpdate,
  ) -> Result<Option<Profile>> {
    let session = session::require(session)?;

    let current = self
      .profile(Some(session))
      .await?
      .unwrap_or_else(|| Profile::empty(session.user_id));
    self
      .store
      .upsert_profile(update.apply(current))
      .await
      .map_err(Error::persistence)?;
    debug!(user_id = %session.user_id, "profile saved");

    self.profile(Some(session)).await
  }
}
