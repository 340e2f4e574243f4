//! Domain core for the academic event management platform.
//!
//! Pure logic only: the error taxonomy, shared id types, roles, the access
//! policy decision function, identity invariants, and certificate code
//! synthesis. No I/O and no database dependency live here.

pub mod certificate;
pub mod error;
pub mod identity;
pub mod policy;
pub mod roles;
pub mod types;
