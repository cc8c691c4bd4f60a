//! cosmic-api: Wire types of the stack state service
//!
//! Contains the request parameters and response bodies exchanged with the
//! state service, plus the provider schema document used for completion.
//! These types mirror the JSON on the wire; the inventory crate owns the
//! domain model they are converted into.

pub mod requests;
pub mod responses;
pub mod schema;
