pub mod attempt;
pub mod backend;
pub mod format;
pub mod memory;
