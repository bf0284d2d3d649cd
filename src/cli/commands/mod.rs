pub mod align;
pub mod databases;
pub mod map;
pub mod releases;
