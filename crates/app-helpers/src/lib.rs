pub mod encoding;
pub mod extension;
pub mod file_name;
pub mod id;
