pub mod api;
pub mod core;
pub mod state;
pub mod store;
