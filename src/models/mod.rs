pub mod course;

pub use course::{Course, CourseRow, CourseType, NewCourseRequest, Schedule, UpdateCourseRequest};
