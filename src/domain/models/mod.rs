pub mod file;
pub mod file_record;
pub mod file_type;
pub mod upload;
pub mod user;
