//! The Student entity and its request/response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the `students` table. Serialized in full (timestamps included)
/// by list and get responses.
#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub height: f64,
    pub weight: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for create, built only after the body passed validation.
#[derive(Deserialize, Clone, Debug)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub height: f64,
    pub weight: f64,
}

/// Partial update. `None` means "leave unchanged"; explicit nulls never reach
/// this type because the validator rejects them first.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

/// The subset returned by create and update responses.
#[derive(Serialize, Debug)]
pub struct PublicStudent {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub height: f64,
    pub weight: f64,
}

impl From<Student> for PublicStudent {
    fn from(s: Student) -> Self {
        PublicStudent {
            id: s.id,
            name: s.name,
            email: s.email,
            age: s.age,
            height: s.height,
            weight: s.weight,
        }
    }
}
