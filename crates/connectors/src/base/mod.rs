pub mod backend;
pub mod cursor;
pub mod mapper;
pub mod planner;
pub mod sink;
