pub mod api_router;
pub mod core;
pub mod deals;
pub mod projects;
pub mod proposals;
pub mod shared;
pub mod speakers;
pub mod vendors;
