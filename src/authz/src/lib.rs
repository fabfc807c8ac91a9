//! # rolematrix authorization matrices
//!
//! Turns sparse, domain-scoped policy grants into complete object × action
//! permission matrices.
//!
//! ## Features
//!
//! - **Total matrices** over a fixed object and action universe, deny by default
//! - **Action aliases** (`create` also grants `create_limited`)
//! - **Multi-role merge** per user and domain
//! - **Root bypass** for the distinguished root role in the top-level domain
//! - **Completion map** of every (domain, role) pair for bulk export
//!
//! ## Example
//!
//! ```rust
//! use rolematrix_authz::{MatrixConfig, MatrixResolver};
//! use rolematrix_core::{Domain, PolicyTuple, QualifiedRole};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = MatrixResolver::from_config(&MatrixConfig::default())?;
//!
//!     let tuples = vec![PolicyTuple::from_fields(&[
//!         "role:admin:1",
//!         "dom:marketing",
//!         "news",
//!         "create",
//!         "allow",
//!     ])?];
//!
//!     let matrix = resolver.resolve_role(
//!         &QualifiedRole::parse("role:admin:1")?,
//!         &Domain::parse("dom:marketing")?,
//!         &tuples,
//!     )?;
//!
//!     assert_eq!(matrix.allowed("news", "create_limited"), Some(true));
//!     assert_eq!(matrix.allowed("news", "read"), Some(false));
//!     Ok(())
//! }
//! ```

pub mod alias;
pub mod completion;
pub mod config;
pub mod error;
pub mod listing;
pub mod matrix;
pub mod memory;
pub mod resolver;
pub mod universe;

// Re-export commonly used types
pub use alias::ActionAliases;
pub use completion::{DomainCompletion, DomainExport, RoleExport};
pub use config::{MatrixConfig, RootConfig};
pub use error::{AuthzError, Result};
pub use listing::{DivisionPermissions, RolePermissions, UserPermissions};
pub use matrix::{ActionRecord, MemberKind, PermissionMatrix, PermissionRecord, UniverseError};
pub use memory::{InMemoryPolicyEngine, PolicySnapshot};
pub use resolver::{MatrixResolver, RootIdentity};
pub use universe::Universe;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
