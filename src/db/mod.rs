// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod friend_repository;
pub mod location_repository;
pub mod session_repository;

pub use friend_repository::*;
pub use location_repository::*;
pub use session_repository::*;
