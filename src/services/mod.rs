// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export grid engine components and the route service

pub mod cell_graph;
pub mod distance;
pub mod kring;
pub mod pathfinder;
pub mod projector;
pub mod route_service;

pub use cell_graph::*;
pub use distance::*;
pub use kring::*;
pub use pathfinder::*;
pub use projector::*;
pub use route_service::*;
