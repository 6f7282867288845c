//! Recent product searches kept between runs

mod file_store;

pub use file_store::FileSearchHistory;
