//! Shared database types: Postgres-backed enums and query options.

mod enums;
mod pagination;

pub use enums::{AuditAction, MapKind, UserRole};
pub use pagination::Pagination;
