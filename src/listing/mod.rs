//! Headless list/filter/paginate engine shared by every resource page.

pub mod actions;
pub mod cache;
pub mod draft;
pub mod fetcher;
pub mod filters;
pub mod mutation;
pub mod pagination;
pub mod query;
pub mod store;
pub mod view;
