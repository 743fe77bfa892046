//! The in-progress state of a filter: a field was chosen, no operator yet.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use super::SqlFilter;
use super::token::{FilterToken, RenderContext};
use crate::context::{RenderSettings, SqlContext};
use crate::entity::Entity;
use crate::error::{QueryError, QueryResult};
use crate::field::{AnySqlField, ComparableWith, SqlField};
use crate::value::{FilterValue, to_filter_value};

/// A filter waiting for an operator on its last selected field.
///
/// Only operator methods are available; each one completes the filter. A
/// pending selection cannot be rendered or combined:
///
/// ```rust,compile_fail
/// use lambda_sql_query::{Entity, FieldMeta, FilterExpression, Selector, SqlContext};
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
/// let pending = SqlContext::default()
///     .filter(Selector::<Person, i32>::property("Id"))
///     .unwrap();
/// let sql = pending.to_sql();
/// ```
#[must_use = "a field selection does nothing until an operator is applied"]
pub struct SqlFilterField<E, T> {
    ctx: SqlContext,
    settings: RenderSettings,
    prefix: Vec<FilterToken>,
    field: AnySqlField,
    _marker: PhantomData<fn(&E) -> T>,
}

macro_rules! comparison_operators {
    ($($(#[$doc:meta])* $name:ident, $field_name:ident => $op:literal;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<V>(self, value: V) -> QueryResult<SqlFilter<E>>
            where
                V: Into<T>,
                T: TryInto<FilterValue>,
                <T as TryInto<FilterValue>>::Error: Into<QueryError>,
            {
                let value: T = value.into();
                self.compare($op, to_filter_value(value)?)
            }

            #[doc = concat!("Compare against another field with `", $op, "`, qualified by that field's own alias.")]
            pub fn $field_name<F, U>(self, field: &SqlField<F, U>) -> SqlFilter<E>
            where
                F: Entity,
                U: ComparableWith<T>,
            {
                let other = FilterToken::field(field.as_any().clone());
                self.complete([FilterToken::literal($op), other])
            }
        )*
    };
}

impl<E: Entity, T> SqlFilterField<E, T> {
    pub(crate) fn new(
        ctx: SqlContext,
        settings: RenderSettings,
        prefix: Vec<FilterToken>,
        field: AnySqlField,
    ) -> Self {
        debug_assert!(field.entity().is::<E>());
        Self {
            ctx,
            settings,
            prefix,
            field,
            _marker: PhantomData,
        }
    }

    /// The selected field.
    pub fn field(&self) -> &AnySqlField {
        &self.field
    }

    fn complete(self, rest: impl IntoIterator<Item = FilterToken>) -> SqlFilter<E> {
        let mut tokens = self.prefix;
        tokens.push(FilterToken::field(self.field));
        tokens.extend(rest);
        trace!(entity = E::ENTITY_NAME, tokens = tokens.len(), "Completed filter");
        SqlFilter::new(self.ctx, tokens.into(), self.settings)
    }

    fn compare(self, op: &'static str, value: FilterValue) -> QueryResult<SqlFilter<E>> {
        let formatted = self.ctx.format_value(&value)?;
        Ok(self.complete([FilterToken::literal(op), FilterToken::literal(formatted)]))
    }

    fn membership(self, keyword: &'static str, values: Vec<FilterValue>) -> QueryResult<SqlFilter<E>> {
        if values.is_empty() {
            return Err(QueryError::empty_value_list(self.field.name()).with_entity(E::ENTITY_NAME));
        }
        let list = self.ctx.formatter().format_list(&values)?;
        Ok(self.complete([
            FilterToken::literal(keyword),
            FilterToken::OpenGroup,
            FilterToken::literal(list),
            FilterToken::CloseGroup,
        ]))
    }

    comparison_operators! {
        /// `field = value`
        equal_to, equal_to_field => "=";
        /// `field <> value`
        not_equal_to, not_equal_to_field => "<>";
        /// `field > value`
        greater_than, greater_than_field => ">";
        /// `field >= value`
        greater_than_or_equal, greater_than_or_equal_field => ">=";
        /// `field < value`
        less_than, less_than_field => "<";
        /// `field <= value`
        less_than_or_equal, less_than_or_equal_field => "<=";
    }

    /// `field IS NULL`
    pub fn is_null(self) -> SqlFilter<E> {
        self.complete([FilterToken::literal("IS NULL")])
    }

    /// `field IS NOT NULL`
    pub fn is_not_null(self) -> SqlFilter<E> {
        self.complete([FilterToken::literal("IS NOT NULL")])
    }

    /// `field LIKE 'pattern'`. The pattern is inserted as written.
    pub fn like(self, pattern: impl AsRef<str>) -> SqlFilter<E> {
        let quoted = format!("'{}'", pattern.as_ref());
        self.complete([FilterToken::literal("LIKE"), FilterToken::literal(quoted)])
    }

    /// `field IN (v1,v2,...)`
    ///
    /// Fails with `EmptyValueList` when `values` is empty.
    pub fn is_in<I, V>(self, values: I) -> QueryResult<SqlFilter<E>>
    where
        I: IntoIterator<Item = V>,
        V: Into<T>,
        T: TryInto<FilterValue>,
        <T as TryInto<FilterValue>>::Error: Into<QueryError>,
    {
        let values = values
            .into_iter()
            .map(|v| to_filter_value(Into::<T>::into(v)))
            .collect::<QueryResult<Vec<_>>>()?;
        self.membership("IN", values)
    }

    /// `field NOT IN (v1,v2,...)`
    ///
    /// Fails with `EmptyValueList` when `values` is empty.
    pub fn not_in<I, V>(self, values: I) -> QueryResult<SqlFilter<E>>
    where
        I: IntoIterator<Item = V>,
        V: Into<T>,
        T: TryInto<FilterValue>,
        <T as TryInto<FilterValue>>::Error: Into<QueryError>,
    {
        let values = values
            .into_iter()
            .map(|v| to_filter_value(Into::<T>::into(v)))
            .collect::<QueryResult<Vec<_>>>()?;
        self.membership("NOT IN", values)
    }

    /// An arbitrary predicate computed from the rendered field.
    ///
    /// The result is not parsed or validated.
    pub fn satisfy_lambda<F>(self, render: F) -> SqlFilter<E>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.satisfy_with_context(move |field, _| render(field))
    }

    /// Like [`satisfy_lambda`](Self::satisfy_lambda), with access to the
    /// render context (alias suppression, parameter prefix).
    pub fn satisfy_with_context<F>(self, render: F) -> SqlFilter<E>
    where
        F: Fn(&str, &RenderContext<'_>) -> String + Send + Sync + 'static,
    {
        let mut tokens = self.prefix;
        tokens.push(FilterToken::satisfy(self.field, Arc::new(render)));
        SqlFilter::new(self.ctx, tokens.into(), self.settings)
    }
}

impl<E, T> Clone for SqlFilterField<E, T> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            settings: self.settings.clone(),
            prefix: self.prefix.clone(),
            field: self.field.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E, T> fmt::Debug for SqlFilterField<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlFilterField")
            .field("prefix", &self.prefix)
            .field("field", &self.field)
            .finish()
    }
}
