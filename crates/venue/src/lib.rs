//! Venue crate: the bound parameters for the venue statements
//!
//! This crate provides:
//! - The `Status` enum bound by label
//! - One immutable parameter object (plus builder) per venue statement

pub mod logic;
pub mod repository;

pub use logic::status::Status;
pub use repository::params::{
    CreateVenueParams, DeleteVenueParams, ListVenuesParams, UpdateCityNameParams,
};
