mod common;
mod students;

pub use common::common_routes_with_ready;
pub use students::student_routes;
