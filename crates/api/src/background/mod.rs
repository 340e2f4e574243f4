//! Background jobs spawned by the API server.

pub mod certificate_issuance;
