pub mod catalog;
pub mod drive_session;
pub mod dto;
pub mod error;
pub mod repositories;
pub mod services;
pub mod upload;
