//! Repository trait definitions.
//!
//! Infrastructure implementations live in parley-infra.

pub mod user;
