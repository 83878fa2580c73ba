pub mod contract;
pub mod error;
pub mod extraction;

mod staged;
