//! Data Transfer Objects for REST request/response serialization.
//!
//! DTOs use primitive wire types (UUIDs, strings, RFC 3339 timestamps) and
//! convert from the domain/service types at the handler boundary.

pub mod boost_dto;
pub mod business_dto;
pub mod common_dto;

pub use boost_dto::*;
pub use business_dto::*;
pub use common_dto::*;
