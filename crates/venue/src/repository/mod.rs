//! Repository layer for venue crate
//! Contains the parameter objects handed to the statement execution layer

pub mod params;
