//! Pad entity model and DTOs.

use std::fmt;
use std::ops::Deref;

use chrono::Utc;
use faser_core::types::{DbId, Timestamp};
use faser_core::validation::{string_is_present, FieldErrors, Validatable};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A pad row from the `pads` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, Validate)]
pub struct Pad {
    pub id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[validate(custom(function = "string_is_present", message = "Name can not be blank."))]
    pub name: String,
    /// Serial device of the pad's board, e.g. `/dev/ttyACM0`. Not checked
    /// for format.
    #[validate(custom(function = "string_is_present", message = "Port can not be blank."))]
    pub port: String,
    pub player_id: Option<DbId>,
}

impl Pad {
    /// Build an unsaved pad with a fresh id. Timestamps are replaced by the
    /// repository when the row is written.
    pub fn new(name: impl Into<String>, port: impl Into<String>, player_id: Option<DbId>) -> Self {
        let now = Utc::now();
        Self {
            id: DbId::new_v4(),
            created_at: now,
            updated_at: now,
            name: name.into(),
            port: port.into(),
            player_id,
        }
    }
}

impl Validatable for Pad {
    fn validate(&self) -> FieldErrors {
        FieldErrors::from(<Self as Validate>::validate(self))
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<CreatePad> for Pad {
    fn from(input: CreatePad) -> Self {
        Pad::new(input.name, input.port, input.player_id)
    }
}

/// A collection of pads, serialized as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pads(pub Vec<Pad>);

impl Deref for Pads {
    type Target = Vec<Pad>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Pad>> for Pads {
    fn from(pads: Vec<Pad>) -> Self {
        Self(pads)
    }
}

impl IntoIterator for Pads {
    type Item = Pad;
    type IntoIter = std::vec::IntoIter<Pad>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Pads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// DTO for creating a new pad.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePad {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub port: String,
    pub player_id: Option<DbId>,
}

/// DTO for updating an existing pad. All fields are optional.
///
/// `player_id` distinguishes "absent" (keep) from `null` (unassign).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePad {
    pub name: Option<String>,
    pub port: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub player_id: Option<Option<DbId>>,
}

impl UpdatePad {
    /// Overwrite the fields of `pad` that are set in this update.
    pub fn apply_to(&self, pad: &mut Pad) {
        if let Some(name) = &self.name {
            pad.name.clone_from(name);
        }
        if let Some(port) = &self.port {
            pad.port.clone_from(port);
        }
        if let Some(player_id) = self.player_id {
            pad.player_id = player_id;
        }
    }
}

fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
