//! JSON response shapes.

use serde::Serialize;

use crate::student::Student;

/// One page of students plus the total match count (not the page length).
#[derive(Serialize, Debug)]
pub struct StudentPage {
    pub count: i64,
    pub rows: Vec<Student>,
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}
