pub mod base;
pub mod batch;
pub mod error;
pub mod mongo;
pub mod sql;
