//! HTTP handlers, grouped by resource.

pub mod admin;
pub mod audit;
pub mod auth;
pub mod certificates;
pub mod enrollments;
pub mod events;
pub mod participants;
