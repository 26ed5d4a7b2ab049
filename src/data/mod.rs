//! Row and schema types shared by the planner and the executor

mod schema;
mod tuple;

pub use schema::Schema;
pub use tuple::{Tuple, Value};
