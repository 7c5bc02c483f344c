pub mod access;
pub mod gate;

mod command;
mod query;
pub(crate) mod repository;

pub use command::*;
pub use query::*;
pub use repository::{ChapterRow, CourseRow, TopicRow};
