pub mod backend;
pub mod cursor;
pub mod mapper;
pub mod params;
pub mod planner;
pub mod query;
pub mod row;
pub mod sink;
mod utils;
