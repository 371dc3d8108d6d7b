//! Map page plumbing: marker layout, screen selection and deep links

pub mod markers;
pub mod routing;
pub mod selection;
