// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod cell;
pub mod coordinate;
pub mod location;
pub mod route;
pub mod session;

pub use cell::*;
pub use coordinate::*;
pub use location::*;
pub use route::*;
pub use session::*;
