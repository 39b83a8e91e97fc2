//! Core types: what a run operates on, independent of git or storage clients
pub mod entities;
pub mod value_objects;
