//! Filter expressions.
//!
//! A filter moves through three states, each its own type:
//!
//! - [`SqlFilterField`]: a field was selected and waits for an operator.
//! - [`SqlFilter`]: a complete predicate over one entity.
//! - [`CombinedFilter`]: a complete predicate spanning several entities.
//!
//! Only complete filters implement [`FilterExpression`], so only they can be
//! rendered or used as the right-hand side of a combinator. Every method
//! returns a new value; existing filters are never modified and can be
//! branched into several continuations.
//!
//! ```rust
//! use lambda_sql_query::{Entity, FieldMeta, Selector, SqlContext};
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
//!     ];
//! }
//!
//! impl Person {
//!     const ID: Selector<Person, i32> = Selector::property("id");
//!     const NAME: Selector<Person, String> = Selector::property("name");
//! }
//!
//! # fn main() -> lambda_sql_query::QueryResult<()> {
//! let ctx = SqlContext::default();
//! let filter = ctx
//!     .filter(Person::ID)?
//!     .is_in([5, 6])?
//!     .or(Person::NAME)?
//!     .is_null();
//! assert_eq!(filter.to_sql(), "pe.Id IN (5,6) OR pe.Name IS NULL");
//! # Ok(())
//! # }
//! ```

mod field_filter;
pub mod token;

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::alias::SqlAlias;
use crate::context::{RenderSettings, SqlContext};
use crate::entity::{Entity, Selector};
use crate::error::QueryResult;
use crate::field::{AnySqlField, SqlField};

pub use field_filter::SqlFilterField;
pub use token::{Connective, DeferredKind, FieldBinding, FilterToken, RenderContext, SatisfyFn, render_tokens};

mod private {
    pub trait Sealed {}
}

/// A complete filter that can be rendered and combined.
///
/// Sealed: implemented by [`SqlFilter`] and [`CombinedFilter`] only.
pub trait FilterExpression: fmt::Display + private::Sealed {
    /// The token sequence, in render order.
    fn tokens(&self) -> &[FilterToken];

    /// Alias suppression and parameter prefix used when rendering.
    fn render_settings(&self) -> &RenderSettings;

    /// The context the filter was built against.
    fn context(&self) -> &SqlContext;

    /// Render to SQL text.
    fn to_sql(&self) -> String {
        let ctx = self.context();
        let sql = render_tokens(self.tokens(), &RenderContext::new(self.render_settings(), ctx.aliases()));
        if ctx.logs_filters() {
            debug!(sql = %sql, "Rendered filter");
        }
        sql
    }
}

/// One side of a combination.
struct Operand<'a> {
    tokens: &'a [FilterToken],
    settings: &'a RenderSettings,
    ctx: &'a SqlContext,
}

impl<'a> Operand<'a> {
    fn of<F: FilterExpression + ?Sized>(filter: &'a F) -> Self {
        Self {
            tokens: filter.tokens(),
            settings: filter.render_settings(),
            ctx: filter.context(),
        }
    }

    /// The operand's tokens, with fields pinned where rendering them under
    /// `target` would differ from rendering the operand on its own.
    fn pinned_for(&self, target: &SqlContext, suppressed: bool) -> Cow<'a, [FilterToken]> {
        if self.settings.without_aliases && !suppressed {
            return Cow::Owned(self.tokens.iter().map(|t| t.pinned(|_| FieldBinding::Bare)).collect());
        }
        if self.ctx.same_as(target) {
            return Cow::Borrowed(self.tokens);
        }
        let aliases = self.ctx.aliases();
        Cow::Owned(
            self.tokens
                .iter()
                .map(|t| {
                    t.pinned(|field| match field.alias() {
                        Some(_) => FieldBinding::Inherit,
                        None => FieldBinding::Alias(aliases.alias_for(field.entity())),
                    })
                })
                .collect(),
        )
    }
}

/// `left <connective> right`, each side rendering as it does on its own.
///
/// The result keeps the left operand's context and parameter prefix. Aliases
/// stay suppressed only when both sides suppress them; otherwise the
/// suppressed side's fields are pinned bare.
fn combine(
    left: Operand<'_>,
    connective: Connective,
    right: Operand<'_>,
    grouped: bool,
) -> (Arc<[FilterToken]>, RenderSettings) {
    let suppressed = left.settings.without_aliases && right.settings.without_aliases;
    let left_tokens = left.pinned_for(left.ctx, suppressed);
    let right_tokens = right.pinned_for(left.ctx, suppressed);

    let mut tokens = Vec::with_capacity(left_tokens.len() + right_tokens.len() + 3);
    tokens.extend_from_slice(&left_tokens);
    tokens.push(FilterToken::Connective(connective));
    if grouped {
        tokens.push(FilterToken::OpenGroup);
    }
    tokens.extend_from_slice(&right_tokens);
    if grouped {
        tokens.push(FilterToken::CloseGroup);
    }
    trace!(
        connective = connective.as_sql(),
        grouped,
        tokens = tokens.len(),
        "Combined filters"
    );
    let settings = RenderSettings {
        without_aliases: suppressed,
        ..left.settings.clone()
    };
    (tokens.into(), settings)
}

/// A complete filter over entity `E`.
#[must_use = "filters are immutable; combinators return a new filter"]
pub struct SqlFilter<E> {
    ctx: SqlContext,
    tokens: Arc<[FilterToken]>,
    settings: RenderSettings,
    _marker: PhantomData<fn() -> E>,
}

impl<E> SqlFilter<E> {
    pub(crate) fn new(ctx: SqlContext, tokens: Arc<[FilterToken]>, settings: RenderSettings) -> Self {
        Self {
            ctx,
            tokens,
            settings,
            _marker: PhantomData,
        }
    }

    fn with_settings(&self, settings: RenderSettings) -> Self {
        Self {
            ctx: self.ctx.clone(),
            tokens: Arc::clone(&self.tokens),
            settings,
            _marker: PhantomData,
        }
    }

    fn joined(&self, connective: Connective, other: &SqlFilter<E>, grouped: bool) -> Self {
        let (tokens, settings) = combine(Operand::of(self), connective, Operand::of(other), grouped);
        Self::new(self.ctx.clone(), tokens, settings)
    }

    fn combined<F: FilterExpression + ?Sized>(&self, connective: Connective, other: &F, grouped: bool) -> CombinedFilter {
        let (tokens, settings) = combine(Operand::of(self), connective, Operand::of(other), grouped);
        CombinedFilter {
            ctx: self.ctx.clone(),
            tokens,
            settings,
        }
    }

    /// The token sequence, in render order.
    pub fn tokens(&self) -> &[FilterToken] {
        &self.tokens
    }

    /// Render to SQL text.
    pub fn to_sql(&self) -> String {
        FilterExpression::to_sql(self)
    }

    /// Whether fields render without alias qualifiers.
    pub fn aliases_suppressed(&self) -> bool {
        self.settings.without_aliases
    }

    /// The parameter prefix, if one was set.
    pub fn parameter_prefix(&self) -> Option<&str> {
        self.settings.parameter_prefix.as_deref()
    }

    /// The same filter, rendering bare column names.
    pub fn without_aliases(&self) -> Self {
        self.with_settings(RenderSettings {
            without_aliases: true,
            ..self.settings.clone()
        })
    }

    /// The same filter, rendering alias-qualified column names.
    pub fn with_aliases(&self) -> Self {
        self.with_settings(RenderSettings {
            without_aliases: false,
            ..self.settings.clone()
        })
    }

    /// The same filter with a parameter prefix for deferred fragments.
    pub fn with_parameter_prefix(&self, prefix: impl Into<SmolStr>) -> Self {
        self.with_settings(RenderSettings {
            parameter_prefix: Some(prefix.into()),
            ..self.settings.clone()
        })
    }

    /// `self AND other`, staying on `E`.
    pub fn and_filter(&self, other: &SqlFilter<E>) -> Self {
        self.joined(Connective::And, other, false)
    }

    /// `self OR other`, staying on `E`.
    pub fn or_filter(&self, other: &SqlFilter<E>) -> Self {
        self.joined(Connective::Or, other, false)
    }

    /// `self AND (other)`
    pub fn and_group(&self, other: &SqlFilter<E>) -> Self {
        self.joined(Connective::And, other, true)
    }

    /// `self OR (other)`
    pub fn or_group(&self, other: &SqlFilter<E>) -> Self {
        self.joined(Connective::Or, other, true)
    }

    /// `self AND other` for a filter over any entity.
    pub fn and_combined<F: FilterExpression + ?Sized>(&self, other: &F) -> CombinedFilter {
        self.combined(Connective::And, other, false)
    }

    /// `self OR other` for a filter over any entity.
    pub fn or_combined<F: FilterExpression + ?Sized>(&self, other: &F) -> CombinedFilter {
        self.combined(Connective::Or, other, false)
    }

    /// `self AND (other)` for a filter over any entity.
    pub fn and_group_combined<F: FilterExpression + ?Sized>(&self, other: &F) -> CombinedFilter {
        self.combined(Connective::And, other, true)
    }

    /// `self OR (other)` for a filter over any entity.
    pub fn or_group_combined<F: FilterExpression + ?Sized>(&self, other: &F) -> CombinedFilter {
        self.combined(Connective::Or, other, true)
    }

    /// Drop the entity type.
    pub fn erase(&self) -> CombinedFilter {
        CombinedFilter {
            ctx: self.ctx.clone(),
            tokens: Arc::clone(&self.tokens),
            settings: self.settings.clone(),
        }
    }
}

impl<E: Entity> SqlFilter<E> {
    /// Start a filter on the field a selector denotes.
    ///
    /// Fails with `InvalidSelector` if the selector does not resolve.
    pub fn from_selector<T>(ctx: &SqlContext, selector: Selector<E, T>) -> QueryResult<SqlFilterField<E, T>> {
        let field = ctx.field(selector)?;
        Ok(Self::from_field(ctx, field))
    }

    /// Start a filter on an already built field.
    pub fn from_field<T>(ctx: &SqlContext, field: SqlField<E, T>) -> SqlFilterField<E, T> {
        SqlFilterField::new(ctx.clone(), ctx.render_settings().clone(), Vec::new(), field.erase())
    }

    /// Start a filter on an erased field.
    ///
    /// Fails with `TypeMismatch` when the field belongs to another entity.
    pub fn from_any<T>(ctx: &SqlContext, field: AnySqlField) -> QueryResult<SqlFilterField<E, T>> {
        let field = field.typed::<E, T>()?;
        Ok(Self::from_field(ctx, field))
    }

    fn continue_with<T>(&self, connective: Connective, field: AnySqlField) -> SqlFilterField<E, T> {
        let mut prefix = Vec::with_capacity(self.tokens.len() + 2);
        prefix.extend_from_slice(&self.tokens);
        prefix.push(FilterToken::Connective(connective));
        SqlFilterField::new(self.ctx.clone(), self.settings.clone(), prefix, field)
    }

    /// `self AND field ...`
    pub fn and<T>(&self, selector: Selector<E, T>) -> QueryResult<SqlFilterField<E, T>> {
        let field = self.ctx.field(selector)?;
        Ok(self.continue_with(Connective::And, field.erase()))
    }

    /// `self OR field ...`
    pub fn or<T>(&self, selector: Selector<E, T>) -> QueryResult<SqlFilterField<E, T>> {
        let field = self.ctx.field(selector)?;
        Ok(self.continue_with(Connective::Or, field.erase()))
    }

    /// `self AND alias.field ...`
    pub fn and_as<T>(&self, selector: Selector<E, T>, alias: SqlAlias<E>) -> QueryResult<SqlFilterField<E, T>> {
        let field = self.ctx.field_as(selector, alias)?;
        Ok(self.continue_with(Connective::And, field.erase()))
    }

    /// `self OR alias.field ...`
    pub fn or_as<T>(&self, selector: Selector<E, T>, alias: SqlAlias<E>) -> QueryResult<SqlFilterField<E, T>> {
        let field = self.ctx.field_as(selector, alias)?;
        Ok(self.continue_with(Connective::Or, field.erase()))
    }

    /// `self AND field ...` for an already built field.
    pub fn and_field<T>(&self, field: SqlField<E, T>) -> SqlFilterField<E, T> {
        self.continue_with(Connective::And, field.erase())
    }

    /// `self OR field ...` for an already built field.
    pub fn or_field<T>(&self, field: SqlField<E, T>) -> SqlFilterField<E, T> {
        self.continue_with(Connective::Or, field.erase())
    }

    /// `self AND field ...` for an erased field.
    ///
    /// Fails with `TypeMismatch` when the field belongs to another entity.
    pub fn and_any<T>(&self, field: AnySqlField) -> QueryResult<SqlFilterField<E, T>> {
        let field = field.typed::<E, T>()?;
        Ok(self.continue_with(Connective::And, field.erase()))
    }

    /// `self OR field ...` for an erased field.
    ///
    /// Fails with `TypeMismatch` when the field belongs to another entity.
    pub fn or_any<T>(&self, field: AnySqlField) -> QueryResult<SqlFilterField<E, T>> {
        let field = field.typed::<E, T>()?;
        Ok(self.continue_with(Connective::Or, field.erase()))
    }
}

impl<E> private::Sealed for SqlFilter<E> {}

impl<E> FilterExpression for SqlFilter<E> {
    fn tokens(&self) -> &[FilterToken] {
        &self.tokens
    }

    fn render_settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn context(&self) -> &SqlContext {
        &self.ctx
    }
}

impl<E> Clone for SqlFilter<E> {
    fn clone(&self) -> Self {
        self.with_settings(self.settings.clone())
    }
}

impl<E> fmt::Debug for SqlFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlFilter")
            .field("entity", &std::any::type_name::<E>())
            .field("tokens", &self.tokens)
            .field("settings", &self.settings)
            .finish()
    }
}

impl<E> fmt::Display for SqlFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&FilterExpression::to_sql(self))
    }
}

impl<E> From<SqlFilter<E>> for CombinedFilter {
    fn from(filter: SqlFilter<E>) -> Self {
        Self {
            ctx: filter.ctx,
            tokens: filter.tokens,
            settings: filter.settings,
        }
    }
}

/// A complete filter spanning more than one entity.
///
/// Produced by the `*_combined` combinators; it has no operator methods.
#[derive(Clone)]
#[must_use = "filters are immutable; combinators return a new filter"]
pub struct CombinedFilter {
    ctx: SqlContext,
    tokens: Arc<[FilterToken]>,
    settings: RenderSettings,
}

impl CombinedFilter {
    fn joined<F: FilterExpression + ?Sized>(&self, connective: Connective, other: &F, grouped: bool) -> Self {
        let (tokens, settings) = combine(Operand::of(self), connective, Operand::of(other), grouped);
        Self {
            ctx: self.ctx.clone(),
            tokens,
            settings,
        }
    }

    fn with_settings(&self, settings: RenderSettings) -> Self {
        Self {
            ctx: self.ctx.clone(),
            tokens: Arc::clone(&self.tokens),
            settings,
        }
    }

    /// `self AND other`
    pub fn and<F: FilterExpression + ?Sized>(&self, other: &F) -> Self {
        self.joined(Connective::And, other, false)
    }

    /// `self OR other`
    pub fn or<F: FilterExpression + ?Sized>(&self, other: &F) -> Self {
        self.joined(Connective::Or, other, false)
    }

    /// `self AND (other)`
    pub fn and_group<F: FilterExpression + ?Sized>(&self, other: &F) -> Self {
        self.joined(Connective::And, other, true)
    }

    /// `self OR (other)`
    pub fn or_group<F: FilterExpression + ?Sized>(&self, other: &F) -> Self {
        self.joined(Connective::Or, other, true)
    }

    /// The same filter, rendering bare column names.
    pub fn without_aliases(&self) -> Self {
        self.with_settings(RenderSettings {
            without_aliases: true,
            ..self.settings.clone()
        })
    }

    /// The same filter, rendering alias-qualified column names.
    pub fn with_aliases(&self) -> Self {
        self.with_settings(RenderSettings {
            without_aliases: false,
            ..self.settings.clone()
        })
    }

    /// The same filter with a parameter prefix for deferred fragments.
    pub fn with_parameter_prefix(&self, prefix: impl Into<SmolStr>) -> Self {
        self.with_settings(RenderSettings {
            parameter_prefix: Some(prefix.into()),
            ..self.settings.clone()
        })
    }

    /// Whether fields render without alias qualifiers.
    pub fn aliases_suppressed(&self) -> bool {
        self.settings.without_aliases
    }

    /// The parameter prefix, if one was set.
    pub fn parameter_prefix(&self) -> Option<&str> {
        self.settings.parameter_prefix.as_deref()
    }

    /// The token sequence, in render order.
    pub fn tokens(&self) -> &[FilterToken] {
        &self.tokens
    }

    /// Render to SQL text.
    pub fn to_sql(&self) -> String {
        FilterExpression::to_sql(self)
    }
}

impl private::Sealed for CombinedFilter {}

impl FilterExpression for CombinedFilter {
    fn tokens(&self) -> &[FilterToken] {
        &self.tokens
    }

    fn render_settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn context(&self) -> &SqlContext {
        &self.ctx
    }
}

impl fmt::Debug for CombinedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedFilter")
            .field("tokens", &self.tokens)
            .field("settings", &self.settings)
            .finish()
    }
}

impl fmt::Display for CombinedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&FilterExpression::to_sql(self))
    }
}
