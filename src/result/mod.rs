//! View result module
//!
//! Adapts a raw view response into typed access: [`ViewResult`] for the
//! response as a whole and [`Row`] for each `(key, value, id)` entry.

mod row;
mod view_result;

pub use row::Row;
pub use view_result::ViewResult;
