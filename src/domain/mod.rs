//! Domain types shared by the listing engine, services and routes.

pub mod resource;
pub mod row;
pub mod session;
pub mod types;
