//! Procedural macros for lambda-sql.
//!
//! # Macros
//!
//! - [`Entity`] - Derive entity metadata and typed property selectors
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(lambda_sql::Entity)]
//! #[lambda_sql(rename_all = "PascalCase")]
//! struct Person {
//!     id: i32,
//!     name: String,
//!     #[lambda_sql(column = "Surname")]
//!     last_name: String,
//! }
//!
//! let filter = ctx.filter(Person::ID)?.is_in([5, 6])?;
//! assert_eq!(filter.to_sql(), "pe.Id IN (5,6)");
//! ```

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;

/// Derive macro implementing `lambda_sql::Entity`.
///
/// Besides the trait impl, one `Selector` constant per field is generated
/// on the struct, named after the field in upper snake case
/// (`last_name` becomes `Person::LAST_NAME`).
///
/// # Attributes
///
/// ## Struct-level
/// - `#[lambda_sql(table = "name")]` - Table name (default: the struct name)
/// - `#[lambda_sql(alias = "p")]` - Default alias (default: first two
///   letters of the struct name, lowercased)
/// - `#[lambda_sql(rename_all = "PascalCase")]` - Column naming for all fields
///
/// ## Field-level
/// - `#[lambda_sql(column = "Name")]` - Map to a different column
/// - `#[lambda_sql(skip)]` - Not a column; no selector is generated
///
/// Enums, tuple structs and generic structs are rejected.
#[proc_macro_derive(Entity, attributes(lambda_sql))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive::derive_entity_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
