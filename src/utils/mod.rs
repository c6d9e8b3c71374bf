pub mod image;
pub mod jwt;
pub mod password;
