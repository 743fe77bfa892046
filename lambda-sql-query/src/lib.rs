//! # lambda-sql-query
//!
//! Immutable filter-expression engine for lambda-sql.
//!
//! This crate provides the core filter composition functionality:
//! - Typed entity metadata and property selectors
//! - Field references with aliases and aggregate functions
//! - A fluent filter API whose states are distinct types
//! - AND/OR composition and explicit grouping across entities
//! - A renderer producing literal SQL fragments
//! - Explicit, replaceable collaborators bundled in [`SqlContext`]
//!
//! ## Entities
//!
//! Entities are usually declared with `#[derive(Entity)]` from the
//! `lambda-sql` crate. Implementing the trait by hand looks like this:
//!
//! ```rust
//! use lambda_sql_query::{Entity, FieldMeta, Selector};
//!
//! struct Person;
//!
//! impl Entity for Person {
//!     const ENTITY_NAME: &'static str = "Person";
//!     const TABLE_NAME: &'static str = "Person";
//!     const DEFAULT_ALIAS: &'static str = "pe";
//!     const FIELDS: &'static [FieldMeta] = &[
//!         FieldMeta::new("id", "Id"),
//!         FieldMeta::new("name", "Name"),
//!         FieldMeta::new("last_name", "LastName"),
//!     ];
//! }
//!
//! impl Person {
//!     const ID: Selector<Person, i32> = Selector::property("id");
//!     const NAME: Selector<Person, String> = Selector::property("name");
//!     const LAST_NAME: Selector<Person, String> = Selector::property("last_name");
//! }
//! ```
//!
//! ## Filters
//!
//! ```rust
//! # use lambda_sql_query::{Entity, FieldMeta, Selector};
//! # struct Person;
//! # impl Entity for Person {
//! #     const ENTITY_NAME: &'static str = "Person";
//! #     const TABLE_NAME: &'static str = "Person";
//! #     const DEFAULT_ALIAS: &'static str = "pe";
//! #     const FIELDS: &'static [FieldMeta] = &[
//! #         FieldMeta::new("id", "Id"),
//! #         FieldMeta::new("name", "Name"),
//! #         FieldMeta::new("last_name", "LastName"),
//! #     ];
//! # }
//! # impl Person {
//! #     const ID: Selector<Person, i32> = Selector::property("id");
//! #     const NAME: Selector<Person, String> = Selector::property("name");
//! #     const LAST_NAME: Selector<Person, String> = Selector::property("last_name");
//! # }
//! use lambda_sql_query::SqlContext;
//!
//! # fn main() -> lambda_sql_query::QueryResult<()> {
//! let ctx = SqlContext::default();
//! let last_name = ctx.field(Person::LAST_NAME)?;
//!
//! let filter = ctx
//!     .filter(Person::ID)?
//!     .equal_to(5)?
//!     .and(Person::NAME)?
//!     .equal_to_field(&last_name);
//!
//! assert_eq!(filter.to_sql(), "pe.Id = 5 AND pe.Name = pe.LastName");
//! assert_eq!(filter.without_aliases().to_sql(), "Id = 5 AND Name = LastName");
//! # Ok(())
//! # }
//! ```
//!
//! ## Filter Values
//!
//! ```rust
//! use lambda_sql_query::{FilterValue, ParameterFormatter, SqlParameterFormatter};
//!
//! let formatter = SqlParameterFormatter;
//! assert_eq!(formatter.format(&FilterValue::from(42)).unwrap(), "42");
//! assert_eq!(formatter.format(&FilterValue::from(true)).unwrap(), "1");
//! assert_eq!(formatter.format(&FilterValue::from("Ann")).unwrap(), "'Ann'");
//! assert!(formatter.format(&FilterValue::from("")).is_err());
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`QueryResult`]. Errors carry a code
//! (`L1001`, ...), the entity and field involved, and suggestions:
//!
//! ```rust
//! use lambda_sql_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::empty_value_list("Id");
//! assert_eq!(err.code, ErrorCode::EmptyValueList);
//! assert_eq!(err.code.code(), "L2002");
//! ```

pub mod alias;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod field;
pub mod filter;
pub mod logging;
pub mod metadata;
pub mod value;

pub use alias::{AliasContainer, AliasContainerBuilder, AliasRegistry, DefaultAliases, SqlAlias};
pub use config::{DebugConfig, LambdaSqlConfig, RenderConfig};
pub use context::{RenderSettings, SqlContext};
pub use entity::{Entity, EntityTag, FieldMeta, Selector};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult, Suggestion};
pub use field::{AggregateFunction, AnySqlField, ComparableWith, SqlField};
pub use filter::{
    CombinedFilter, Connective, FieldBinding, FilterExpression, FilterToken, RenderContext, SqlFilter, SqlFilterField,
};
pub use metadata::{EntityMetadataResolver, MetadataResolver};
pub use value::{FilterValue, ParameterFormatter, SqlParameterFormatter, to_filter_value};

// Re-export logging utilities
pub use logging::{get_log_format, get_log_level, init as init_logging, is_debug_enabled};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::alias::SqlAlias;
    pub use crate::context::SqlContext;
    pub use crate::entity::{Entity, Selector};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::field::{AggregateFunction, AnySqlField, SqlField};
    pub use crate::filter::{CombinedFilter, FilterExpression, SqlFilter, SqlFilterField};
    pub use crate::value::FilterValue;
}
