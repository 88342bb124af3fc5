use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::Question;

/// Authoring-side game record. The session engine only ever reads it once,
/// at start time, to take its question snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub name: String,
    /// Opaque principal of whoever created the game (from the auth token).
    pub owner: String,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}
