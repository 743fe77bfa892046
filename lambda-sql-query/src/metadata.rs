//! Metadata resolution: selectors to column names, entities to tables.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use smol_str::SmolStr;
use tracing::trace;

use crate::entity::EntityTag;
use crate::error::{QueryError, QueryResult};

static PROPERTY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("property pattern is valid"));

/// Resolves entity metadata for field construction.
pub trait MetadataResolver: fmt::Debug + Send + Sync {
    /// Resolve a selector of `entity` to its column name.
    ///
    /// Fails with `InvalidSelector` unless the selector is a simple
    /// property access.
    fn property_name(&self, entity: &EntityTag, selector: &str) -> QueryResult<SmolStr>;

    /// Table name of `entity`.
    fn table_name(&self, entity: &EntityTag) -> SmolStr;
}

/// Resolves against the metadata declared by [`Entity`](crate::Entity).
///
/// Selectors are matched against declared property names first, then against
/// column names. Entities that declare no fields accept any identifier as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityMetadataResolver;

impl EntityMetadataResolver {
    fn check_shape(entity: &EntityTag, selector: &str) -> QueryResult<()> {
        if PROPERTY_PATTERN.is_match(selector) {
            return Ok(());
        }
        let reason = if selector.trim().is_empty() {
            "the selector is empty"
        } else if selector.contains('(') {
            "method calls are not allowed"
        } else if selector.contains('.') {
            "nested property paths are not allowed"
        } else {
            "computed expressions are not allowed"
        };
        Err(QueryError::invalid_selector(entity.name(), selector, reason))
    }
}

impl MetadataResolver for EntityMetadataResolver {
    fn property_name(&self, entity: &EntityTag, selector: &str) -> QueryResult<SmolStr> {
        Self::check_shape(entity, selector)?;

        let fields = entity.fields();
        if fields.is_empty() {
            return Ok(SmolStr::new(selector));
        }

        let meta = fields
            .iter()
            .find(|meta| meta.property == selector)
            .or_else(|| fields.iter().find(|meta| meta.column == selector))
            .ok_or_else(|| {
                QueryError::invalid_selector(
                    entity.name(),
                    selector,
                    format!("{} declares no such property", entity.name()),
                )
            })?;

        trace!(entity = entity.name(), selector, column = meta.column, "Resolved selector");
        Ok(SmolStr::new_static(meta.column))
    }

    fn table_name(&self, entity: &EntityTag) -> SmolStr {
        SmolStr::new_static(entity.table())
    }
}
