//! Entity metadata and typed property selectors.
//!
//! An [`Entity`] describes a table-backed type: its name, table, default alias
//! and declared properties. It is usually derived with `#[derive(Entity)]`,
//! which also emits one [`Selector`] constant per property.
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
//!     const FIELDS: &'static [FieldMeta] = &[FieldMeta::new("id", "Id")];
//! }
//!
//! let id: Selector<Person, i32> = Selector::property("id");
//! assert_eq!(id.as_str(), "id");
//! ```

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// A declared property of an entity and the column it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Property name as written in Rust.
    pub property: &'static str,
    /// Column name as written in SQL.
    pub column: &'static str,
}

impl FieldMeta {
    /// Create a new property/column pair.
    pub const fn new(property: &'static str, column: &'static str) -> Self {
        Self { property, column }
    }
}

/// A table-backed type that filters can be built against.
pub trait Entity: Sized + 'static {
    /// Type name, used as the key in alias registries.
    const ENTITY_NAME: &'static str;
    /// Table name in SQL.
    const TABLE_NAME: &'static str;
    /// Alias used when neither the field nor the registry supplies one.
    const DEFAULT_ALIAS: &'static str;
    /// Declared properties. An empty list accepts any well-formed selector.
    const FIELDS: &'static [FieldMeta];

    /// Runtime tag for this entity type.
    fn tag() -> EntityTag {
        EntityTag::of::<Self>()
    }
}

/// Runtime identity of an entity type.
#[derive(Clone, Copy)]
pub struct EntityTag {
    type_id: TypeId,
    name: &'static str,
    table: &'static str,
    default_alias: &'static str,
    fields: &'static [FieldMeta],
}

impl EntityTag {
    /// Tag for the entity `E`.
    pub fn of<E: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            name: E::ENTITY_NAME,
            table: E::TABLE_NAME,
            default_alias: E::DEFAULT_ALIAS,
            fields: E::FIELDS,
        }
    }

    /// Whether this tag denotes the entity `E`.
    pub fn is<E: Entity>(&self) -> bool {
        self.type_id == TypeId::of::<E>()
    }

    /// Entity type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Table name.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Default alias.
    pub fn default_alias(&self) -> &'static str {
        self.default_alias
    }

    /// Declared properties.
    pub fn fields(&self) -> &'static [FieldMeta] {
        self.fields
    }
}

impl PartialEq for EntityTag {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EntityTag {}

impl fmt::Debug for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityTag")
            .field("name", &self.name)
            .field("table", &self.table)
            .finish()
    }
}

/// Selects one property of `E` whose value type is `T`.
///
/// Selectors are unresolved: the metadata resolver validates them and maps
/// them to a column when a field is built from one.
pub struct Selector<E, T> {
    path: Cow<'static, str>,
    _marker: PhantomData<fn(&E) -> T>,
}

impl<E, T> Selector<E, T> {
    /// A selector for a statically known property.
    pub const fn property(name: &'static str) -> Self {
        Self {
            path: Cow::Borrowed(name),
            _marker: PhantomData,
        }
    }

    /// A selector from dynamic text; validated on resolution.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Cow::Owned(path.into()),
            _marker: PhantomData,
        }
    }

    /// The selector text.
    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl<E, T> Clone for Selector<E, T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E, T> fmt::Debug for Selector<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.path).finish()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Hand-written entities shared by unit tests.

    use super::{Entity, FieldMeta, Selector};

    pub struct Person;

    impl Entity for Person {
        const ENTITY_NAME: &'static str = "Person";
        const TABLE_NAME: &'static str = "Person";
        const DEFAULT_ALIAS: &'static str = "pe";
        const FIELDS: &'static [FieldMeta] = &[
            FieldMeta::new("id", "Id"),
            FieldMeta::new("name", "Name"),
            FieldMeta::new("last_name", "LastName"),
            FieldMeta::new("passport_id", "PassportId"),
        ];
    }

    impl Person {
        pub const ID: Selector<Person, i32> = Selector::property("id");
        pub const NAME: Selector<Person, String> = Selector::property("name");
        pub const LAST_NAME: Selector<Person, String> = Selector::property("last_name");
        pub const PASSPORT_ID: Selector<Person, Option<i32>> = Selector::property("passport_id");
    }

    pub struct Passport;

    impl Entity for Passport {
        const ENTITY_NAME: &'static str = "Passport";
        const TABLE_NAME: &'static str = "Passport";
        const DEFAULT_ALIAS: &'static str = "pa";
        const FIELDS: &'static [FieldMeta] = &[
            FieldMeta::new("id", "Id"),
            FieldMeta::new("number", "Number"),
            FieldMeta::new("person_id", "PersonId"),
        ];
    }

    impl Passport {
        pub const ID: Selector<Passport, i32> = Selector::property("id");
        pub const NUMBER: Selector<Passport, String> = Selector::property("number");
        pub const PERSON_ID: Selector<Passport, i32> = Selector::property("person_id");
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{Passport, Person};
    use super::*;

    #[test]
    fn test_tag_identity() {
        assert_eq!(Person::tag(), EntityTag::of::<Person>());
        assert_ne!(Person::tag(), Passport::tag());
        assert!(Person::tag().is::<Person>());
        assert!(!Person::tag().is::<Passport>());
    }

    #[test]
    fn test_tag_metadata() {
        let tag = Passport::tag();
        assert_eq!(tag.name(), "Passport");
        assert_eq!(tag.default_alias(), "pa");
        assert_eq!(tag.fields().len(), 3);
    }

    #[test]
    fn test_selector_text() {
        assert_eq!(Person::LAST_NAME.as_str(), "last_name");
        let dynamic: Selector<Person, i32> = Selector::path("Id");
        assert_eq!(dynamic.clone().as_str(), "Id");
    }
}
