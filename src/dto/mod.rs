pub mod auth_dto;
pub mod resume_dto;
pub mod share_dto;
pub mod user_dto;
