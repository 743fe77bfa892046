//! Table aliases: explicit per-field overrides and the default registry.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::entity::{Entity, EntityTag};
use crate::error::{QueryError, QueryResult};

/// An explicit alias for entity `E`.
pub struct SqlAlias<E> {
    name: SmolStr,
    _marker: PhantomData<fn() -> E>,
}

impl<E> SqlAlias<E> {
    /// Create an alias with the given name.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }

    /// The alias text.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_name(self) -> SmolStr {
        self.name
    }
}

impl<E: Entity> Default for SqlAlias<E> {
    fn default() -> Self {
        Self::new(SmolStr::new_static(E::DEFAULT_ALIAS))
    }
}

impl<E> Clone for SqlAlias<E> {
    fn clone(&self) -> Self {
        Self::new(self.name.clone())
    }
}

impl<E> fmt::Debug for SqlAlias<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SqlAlias").field(&self.name).finish()
    }
}

impl<E> fmt::Display for SqlAlias<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Supplies the alias used for fields that carry no explicit one.
pub trait AliasRegistry: fmt::Debug + Send + Sync {
    /// The alias for `entity`.
    fn alias_for(&self, entity: &EntityTag) -> SmolStr;
}

/// Falls back to each entity's declared default alias.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAliases;

impl AliasRegistry for DefaultAliases {
    fn alias_for(&self, entity: &EntityTag) -> SmolStr {
        SmolStr::new_static(entity.default_alias())
    }
}

/// Registered aliases keyed by entity name, with default-alias fallback.
///
/// ```rust
/// use lambda_sql_query::{AliasContainerBuilder, AliasRegistry, Entity, FieldMeta};
///
/// struct Person;
///
/// impl Entity for Person {
///     const ENTITY_NAME: &'static str = "Person";
///     const TABLE_NAME: &'static str = "Person";
///     const DEFAULT_ALIAS: &'static str = "pe";
///     const FIELDS: &'static [FieldMeta] = &[];
/// }
///
/// let aliases = AliasContainerBuilder::new()
///     .register::<Person>("per")
///     .build()
///     .unwrap();
/// assert_eq!(aliases.alias_for(&Person::tag()), "per");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AliasContainer {
    aliases: IndexMap<SmolStr, SmolStr>,
}

impl AliasContainer {
    /// Number of registered aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// The registered alias for an entity name, if any.
    pub fn get(&self, entity_name: &str) -> Option<&str> {
        self.aliases.get(entity_name).map(SmolStr::as_str)
    }
}

impl AliasRegistry for AliasContainer {
    fn alias_for(&self, entity: &EntityTag) -> SmolStr {
        self.aliases
            .get(entity.name())
            .cloned()
            .unwrap_or_else(|| SmolStr::new_static(entity.default_alias()))
    }
}

/// Builder for [`AliasContainer`].
#[derive(Debug, Clone, Default)]
pub struct AliasContainerBuilder {
    aliases: IndexMap<SmolStr, SmolStr>,
}

impl AliasContainerBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias for entity `E`.
    #[must_use]
    pub fn register<E: Entity>(self, alias: impl Into<SmolStr>) -> Self {
        self.register_name(E::ENTITY_NAME, alias)
    }

    /// Register an alias by entity name.
    #[must_use]
    pub fn register_name(mut self, entity_name: impl Into<SmolStr>, alias: impl Into<SmolStr>) -> Self {
        self.aliases.insert(entity_name.into(), alias.into());
        self
    }

    /// Build the container.
    ///
    /// Fails with `InvalidConfiguration` when nothing was registered or an
    /// alias is empty.
    pub fn build(self) -> QueryResult<AliasContainer> {
        if self.aliases.is_empty() {
            return Err(QueryError::invalid_configuration("no aliases were registered")
                .with_suggestion("Register at least one alias, or use DefaultAliases"));
        }
        if let Some((entity, _)) = self.aliases.iter().find(|(_, alias)| alias.trim().is_empty()) {
            return Err(QueryError::invalid_configuration(format!("alias for {} is empty", entity))
                .with_entity(entity.as_str()));
        }
        debug!(count = self.aliases.len(), "Built alias container");
        Ok(AliasContainer {
            aliases: self.aliases,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::fixtures::{Passport, Person};
    use crate::error::ErrorCode;

    #[test]
    fn test_default_alias() {
        assert_eq!(SqlAlias::<Person>::default().name(), "pe");
        assert_eq!(DefaultAliases.alias_for(&Passport::tag()), "pa");
    }

    #[test]
    fn test_container_lookup_and_fallback() {
        let aliases = AliasContainerBuilder::new()
            .register::<Passport>("pas")
            .build()
            .unwrap();
        assert_eq!(aliases.alias_for(&Passport::tag()), "pas");
        assert_eq!(aliases.alias_for(&Person::tag()), "pe");
        assert_eq!(aliases.get("Passport"), Some("pas"));
        assert_eq!(aliases.len(), 1);
    }

    #[test]
    fn test_later_registration_wins() {
        let aliases = AliasContainerBuilder::new()
            .register::<Person>("p1")
            .register_name("Person", "p2")
            .build()
            .unwrap();
        assert_eq!(aliases.alias_for(&Person::tag()), "p2");
    }

    #[test]
    fn test_empty_builder_rejected() {
        let err = AliasContainerBuilder::new().build().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_blank_alias_rejected() {
        let err = AliasContainerBuilder::new()
            .register::<Person>(" ")
            .build()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
        assert_eq!(err.context.entity, Some("Person".to_string()));
    }
}
