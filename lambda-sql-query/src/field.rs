//! Typed and erased field references.
//!
//! A field reference names one column of an entity, optionally qualified by
//! an explicit alias and optionally wrapped in an aggregate function. Fields
//! are built through [`SqlContext`](crate::SqlContext), which validates the
//! selector, and are immutable afterwards.

use std::fmt;
use std::marker::PhantomData;

use smol_str::SmolStr;

use crate::alias::SqlAlias;
use crate::entity::{Entity, EntityTag};
use crate::error::{QueryError, QueryResult};

/// SQL aggregate functions a field can be wrapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    /// `COUNT(...)`
    Count,
    /// `SUM(...)`
    Sum,
    /// `AVG(...)`
    Avg,
    /// `MIN(...)`
    Min,
    /// `MAX(...)`
    Max,
}

impl AggregateFunction {
    /// The SQL function name.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A field reference with its entity known only at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnySqlField {
    entity: EntityTag,
    name: SmolStr,
    table: SmolStr,
    alias: Option<SmolStr>,
    aggregate: Option<AggregateFunction>,
}

impl AnySqlField {
    pub(crate) fn new(entity: EntityTag, name: SmolStr, table: SmolStr, alias: Option<SmolStr>) -> Self {
        debug_assert!(!name.is_empty(), "field names are resolved before construction");
        Self {
            entity,
            name,
            table,
            alias,
            aggregate: None,
        }
    }

    /// The owning entity.
    pub fn entity(&self) -> &EntityTag {
        &self.entity
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table name of the owning entity.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Explicit alias, if one was bound.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Aggregate function, if any.
    pub fn aggregate(&self) -> Option<AggregateFunction> {
        self.aggregate
    }

    /// Recover the typed field.
    ///
    /// Fails with `TypeMismatch` when the field belongs to another entity.
    pub fn typed<E: Entity, T>(self) -> QueryResult<SqlField<E, T>> {
        if !self.entity.is::<E>() {
            return Err(QueryError::type_mismatch(E::ENTITY_NAME, self.entity.name(), self.name.as_str()));
        }
        Ok(SqlField::from_any(self))
    }

    /// Render with the given alias (`None` renders the bare column).
    pub fn render(&self, alias: Option<&str>) -> String {
        let qualified = match alias {
            Some(alias) => format!("{}.{}", alias, self.name),
            None => self.name.to_string(),
        };
        match self.aggregate {
            Some(func) => format!("{}({})", func.as_sql(), qualified),
            None => qualified,
        }
    }

    fn with_aggregate(mut self, func: AggregateFunction) -> Self {
        self.aggregate = Some(func);
        self
    }
}

impl fmt::Display for AnySqlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alias = self.alias().unwrap_or(self.entity.default_alias());
        f.write_str(&self.render(Some(alias)))
    }
}

/// A field of entity `E` holding values of type `T`.
pub struct SqlField<E, T> {
    inner: AnySqlField,
    _marker: PhantomData<fn(&E) -> T>,
}

impl<E: Entity, T> SqlField<E, T> {
    pub(crate) fn from_any(inner: AnySqlField) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// The owning entity.
    pub fn entity(&self) -> &EntityTag {
        self.inner.entity()
    }

    /// Column name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Table name of the owning entity.
    pub fn table(&self) -> &str {
        self.inner.table()
    }

    /// Explicit alias, if one was bound.
    pub fn alias(&self) -> Option<&str> {
        self.inner.alias()
    }

    /// Aggregate function, if any.
    pub fn aggregate(&self) -> Option<AggregateFunction> {
        self.inner.aggregate()
    }

    /// The same field bound to an explicit alias.
    #[must_use]
    pub fn with_alias(&self, alias: SqlAlias<E>) -> Self {
        let mut inner = self.inner.clone();
        inner.alias = Some(alias.into_name());
        Self::from_any(inner)
    }

    /// The same field wrapped in `func`.
    #[must_use]
    pub fn aggregated(&self, func: AggregateFunction) -> Self {
        Self::from_any(self.inner.clone().with_aggregate(func))
    }

    /// `COUNT(field)`
    #[must_use]
    pub fn count(&self) -> Self {
        self.aggregated(AggregateFunction::Count)
    }

    /// `SUM(field)`
    #[must_use]
    pub fn sum(&self) -> Self {
        self.aggregated(AggregateFunction::Sum)
    }

    /// `AVG(field)`
    #[must_use]
    pub fn avg(&self) -> Self {
        self.aggregated(AggregateFunction::Avg)
    }

    /// `MIN(field)`
    #[must_use]
    pub fn min(&self) -> Self {
        self.aggregated(AggregateFunction::Min)
    }

    /// `MAX(field)`
    #[must_use]
    pub fn max(&self) -> Self {
        self.aggregated(AggregateFunction::Max)
    }

    /// Borrow the erased field.
    pub fn as_any(&self) -> &AnySqlField {
        &self.inner
    }

    /// Drop the static entity and value types.
    pub fn erase(self) -> AnySqlField {
        self.inner
    }
}

impl<E, T> Clone for SqlField<E, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E, T> fmt::Debug for SqlField<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SqlField").field(&self.inner).finish()
    }
}

impl<E, T> fmt::Display for SqlField<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

/// Value types a field of type `T` can be compared against.
///
/// A type is comparable with itself, and a nullable column with its
/// non-null counterpart in either direction. Anything else is rejected at
/// compile time:
///
/// ```rust,compile_fail
/// use lambda_sql_query::{Entity, FieldMeta, Selector, SqlContext};
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
/// let ctx = SqlContext::default();
/// let name = ctx.field(Selector::<Person, String>::property("Name")).unwrap();
/// let filter = ctx
///     .filter(Selector::<Person, i32>::property("Id"))
///     .unwrap()
///     .equal_to_field(&name);
/// ```
pub trait ComparableWith<T> {}

impl<T> ComparableWith<T> for T {}

impl<T> ComparableWith<T> for Option<T> {}

impl<T> ComparableWith<Option<T>> for T {}

impl<E, T> From<SqlField<E, T>> for AnySqlField {
    fn from(field: SqlField<E, T>) -> Self {
        field.inner
    }
}
