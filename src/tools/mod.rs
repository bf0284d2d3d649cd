pub mod diamond;
pub mod workspace;
