pub mod auth_dto;
pub mod file_dto;
pub mod metadata_dto;
pub mod upload_dto;
