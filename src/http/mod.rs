//! HTTP protocol layer
//!
//! Protocol-level pieces shared by static serving and routed dispatch:
//! MIME lookup, HTTP-date handling, query/form decoding and response
//! builders.

pub mod date;
pub mod mime;
pub mod query;
pub mod response;

// Re-export commonly used items
pub use query::ParamMap;
pub use response::{
    build_304_response, build_404_response, build_405_response, empty_body, file_body, full_body,
    Body,
};
