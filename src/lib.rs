//! # lambda-sql
//!
//! Fluent, typed SQL filter composition over entity selectors.
//!
//! lambda-sql provides:
//! - `#[derive(Entity)]` for table metadata and typed property selectors
//! - Immutable filters that can be branched and combined freely
//! - Explicit aliases, aggregates and cross-entity predicates
//! - Literal SQL fragments ready to splice into a `WHERE` clause
//!
//! It does not execute queries and does not parameterize values: values are
//! rendered inline by the configured [`ParameterFormatter`].
//!
//! ## Quick Start
//!
//! ```rust
//! use lambda_sql::prelude::*;
//!
//! #[derive(Entity)]
//! #[lambda_sql(rename_all = "PascalCase")]
//! pub struct Person {
//!     pub id: i32,
//!     pub name: String,
//!     pub last_name: String,
//! }
//!
//! #[derive(Entity)]
//! #[lambda_sql(rename_all = "PascalCase")]
//! pub struct Passport {
//!     pub id: i32,
//!     pub person_id: i32,
//! }
//!
//! # fn main() -> QueryResult<()> {
//! let ctx = SqlContext::default();
//!
//! let filter = ctx.filter(Person::ID)?.is_in([5, 6])?;
//! assert_eq!(filter.to_sql(), "pe.Id IN (5,6)");
//!
//! let passports = ctx.field(Passport::ID)?.count();
//! let filter = ctx.filter(Person::ID)?.equal_to_field(&passports);
//! assert_eq!(filter.to_sql(), "pe.Id = COUNT(pa.Id)");
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Aliases and render defaults can be loaded from `lambda-sql.toml`:
//!
//! ```rust,no_run
//! use lambda_sql::{LambdaSqlConfig, SqlContext};
//!
//! # fn main() -> lambda_sql::QueryResult<()> {
//! let config = LambdaSqlConfig::discover(".")?;
//! let ctx = SqlContext::from_config(&config)?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use lambda_sql_query::*;

// Re-export proc macros
pub use lambda_sql_codegen::Entity;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use lambda_sql_query::prelude::*;
    pub use lambda_sql_codegen::Entity;
}
