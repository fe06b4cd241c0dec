//! Domain layer for Block Structure

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;
