pub mod chapter;
pub mod series;
pub mod source;
