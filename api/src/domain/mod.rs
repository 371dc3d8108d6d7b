//! Domain types and DB queries

pub mod clip_requirements;
pub mod coordinates;
pub mod inquiries;
pub mod reorder;
pub mod screens;
