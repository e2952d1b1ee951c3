pub mod records;
pub mod save;
pub mod versioning;
