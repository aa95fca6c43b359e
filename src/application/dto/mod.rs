pub mod local_config_dto;
pub mod metadata_dto;
pub mod secrets_dto;
