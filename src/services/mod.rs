pub mod resume_service;
pub mod share_service;
pub mod user_service;
