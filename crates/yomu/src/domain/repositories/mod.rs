pub mod cover;
pub mod library;
pub mod source;
