pub mod download;
pub mod estimate;
pub mod mkdir;
pub mod upload;
