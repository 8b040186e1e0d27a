//! Domain types shared by the venue statements

pub mod status;
