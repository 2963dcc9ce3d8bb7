pub mod render;
pub mod viewmodels;
