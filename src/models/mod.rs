pub mod resume;
pub mod share_link;
pub mod user;
