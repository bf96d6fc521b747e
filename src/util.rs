pub mod file;
pub mod misc;
pub mod table;
pub mod variant;
