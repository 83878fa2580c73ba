pub mod backend;
pub mod codec;
pub mod cursor;
pub mod mapper;
pub mod sink;

mod planner;
mod topology;
mod utils;
