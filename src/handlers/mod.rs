pub mod api;
pub mod redirect;
