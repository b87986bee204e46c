//! Student registry: a student-records REST backend over PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod student;
pub mod validation;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use response::{ErrorBody, StudentPage};
pub use routes::{common_routes_with_ready, student_routes};
pub use state::AppState;
pub use store::{ensure_database_exists, PgStudentStore, StudentStore};
pub use student::{NewStudent, PublicStudent, Student, StudentPatch};
