//! Business policy services.
//!
//! Role and group based access decisions for group-scoped resources.

mod access;

pub use access::AccessPolicy;
