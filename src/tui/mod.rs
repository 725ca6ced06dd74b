pub mod app;
pub mod geometry;
pub mod gesture;
pub mod handlers;
pub mod layout;
pub mod loader;
pub mod pagination;
pub mod search;
pub mod selection;
pub mod ui;
