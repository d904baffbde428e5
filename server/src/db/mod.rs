//! Database module for PostgreSQL persistence.

mod entities;
mod op_log;
mod pool;

pub use entities::*;
pub use op_log::*;
pub use pool::*;
