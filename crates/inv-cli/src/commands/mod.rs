pub mod config;
pub mod dispatch;
pub mod records;
pub mod shared;
