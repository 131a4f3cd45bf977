pub mod controls;
pub mod markdown;
pub mod viewer;
