//! Filter tokens and the renderer that evaluates them.
//!
//! A filter is a flat, ordered token sequence. Most tokens are plain text;
//! field references are deferred so that alias resolution happens at render
//! time, against the filter's current settings.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;
use tracing::trace;

use crate::alias::AliasRegistry;
use crate::context::RenderSettings;
use crate::field::AnySqlField;

/// Logical connective between two predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Connective {
    /// The SQL keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Caller-supplied renderer for `satisfy_lambda` fragments.
pub type SatisfyFn = Arc<dyn Fn(&str, &RenderContext<'_>) -> String + Send + Sync>;

/// How a deferred field token renders.
#[derive(Clone)]
pub enum DeferredKind {
    /// The alias-qualified field itself.
    Field,
    /// An arbitrary fragment computed from the rendered field.
    Satisfy(SatisfyFn),
}

impl fmt::Debug for DeferredKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field => f.write_str("Field"),
            Self::Satisfy(_) => f.write_str("Satisfy(..)"),
        }
    }
}

/// How a deferred field picks its qualifier.
///
/// Fields start out following the filter they belong to. Combining operands
/// that render differently pins each operand's fields to what they rendered
/// on their own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldBinding {
    /// Follow the filter's settings and alias registry.
    #[default]
    Inherit,
    /// Always bare.
    Bare,
    /// Qualified by this alias unless the filter suppresses aliases.
    Alias(SmolStr),
}

/// A single unit of a rendered filter.
#[derive(Debug, Clone)]
pub enum FilterToken {
    /// `AND` / `OR`.
    Connective(Connective),
    /// Fixed text: operators, formatted values.
    Literal(SmolStr),
    /// `(`
    OpenGroup,
    /// `)`
    CloseGroup,
    /// A field whose text depends on the render context.
    Deferred {
        /// The referenced field.
        field: AnySqlField,
        /// How to render it.
        kind: DeferredKind,
        /// How its qualifier is chosen.
        binding: FieldBinding,
    },
}

impl FilterToken {
    /// A literal token.
    pub fn literal(text: impl Into<SmolStr>) -> Self {
        Self::Literal(text.into())
    }

    /// A deferred token rendering `field` itself.
    pub fn field(field: AnySqlField) -> Self {
        Self::Deferred {
            field,
            kind: DeferredKind::Field,
            binding: FieldBinding::Inherit,
        }
    }

    /// A deferred token rendering a caller-supplied fragment for `field`.
    pub fn satisfy(field: AnySqlField, render: SatisfyFn) -> Self {
        Self::Deferred {
            field,
            kind: DeferredKind::Satisfy(render),
            binding: FieldBinding::Inherit,
        }
    }

    /// The same token, with an inheriting field pinned to `binding`.
    ///
    /// Tokens that are not fields, or whose field is already pinned, are
    /// returned unchanged.
    pub fn pinned(&self, binding: impl FnOnce(&AnySqlField) -> FieldBinding) -> Self {
        match self {
            Self::Deferred {
                field,
                kind,
                binding: FieldBinding::Inherit,
            } => Self::Deferred {
                field: field.clone(),
                kind: kind.clone(),
                binding: binding(field),
            },
            other => other.clone(),
        }
    }

    /// Whether this token is a bare field with no operator after it.
    pub fn is_field(&self) -> bool {
        matches!(
            self,
            Self::Deferred {
                kind: DeferredKind::Field,
                ..
            }
        )
    }

    /// Evaluate this token.
    pub fn render<'a>(&'a self, ctx: &RenderContext<'_>) -> Cow<'a, str> {
        match self {
            Self::Connective(connective) => Cow::Borrowed(connective.as_sql()),
            Self::Literal(text) => Cow::Borrowed(text.as_str()),
            Self::OpenGroup => Cow::Borrowed("("),
            Self::CloseGroup => Cow::Borrowed(")"),
            Self::Deferred { field, kind, binding } => {
                let rendered = ctx.bound_field(field, binding);
                match kind {
                    DeferredKind::Field => Cow::Owned(rendered),
                    DeferredKind::Satisfy(render) => Cow::Owned(render(&rendered, ctx)),
                }
            }
        }
    }
}

/// Everything a deferred token may depend on.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    settings: &'a RenderSettings,
    aliases: &'a dyn AliasRegistry,
}

impl<'a> RenderContext<'a> {
    /// Create a render context.
    pub fn new(settings: &'a RenderSettings, aliases: &'a dyn AliasRegistry) -> Self {
        Self { settings, aliases }
    }

    /// Whether aliases are suppressed.
    pub fn without_aliases(&self) -> bool {
        self.settings.without_aliases
    }

    /// The parameter prefix, if one was set.
    pub fn parameter_prefix(&self) -> Option<&str> {
        self.settings.parameter_prefix.as_deref()
    }

    /// Render a field: bare when aliases are suppressed, otherwise qualified
    /// by its own alias or the registry's alias for its entity.
    pub fn field(&self, field: &AnySqlField) -> String {
        self.bound_field(field, &FieldBinding::Inherit)
    }

    /// Render a field under a binding. Suppressed aliases win over any
    /// binding.
    pub fn bound_field(&self, field: &AnySqlField, binding: &FieldBinding) -> String {
        if self.settings.without_aliases {
            return field.render(None);
        }
        match (binding, field.alias()) {
            (FieldBinding::Bare, _) => field.render(None),
            (_, Some(alias)) => field.render(Some(alias)),
            (FieldBinding::Alias(alias), None) => field.render(Some(alias.as_str())),
            (FieldBinding::Inherit, None) => {
                let alias = self.aliases.alias_for(field.entity());
                field.render(Some(alias.as_str()))
            }
        }
    }
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("settings", self.settings)
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// Render a token sequence.
///
/// Adjacent tokens are separated by one space, except directly after `(`
/// and directly before `)`.
pub fn render_tokens(tokens: &[FilterToken], ctx: &RenderContext<'_>) -> String {
    let mut sql = String::with_capacity(tokens.len() * 8);
    let mut previous: Option<&FilterToken> = None;
    for token in tokens {
        let glued = matches!(previous, None | Some(FilterToken::OpenGroup))
            || matches!(token, FilterToken::CloseGroup);
        if !glued {
            sql.push(' ');
        }
        sql.push_str(&token.render(ctx));
        previous = Some(token);
    }
    trace!(tokens = tokens.len(), sql = %sql, "Rendered filter");
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::{AliasContainerBuilder, DefaultAliases};
    use crate::entity::Entity;
    use crate::entity::fixtures::{Passport, Person};

    fn field(name: &str) -> AnySqlField {
        AnySqlField::new(Person::tag(), name.into(), "Person".into(), None)
    }

    fn render(tokens: &[FilterToken], settings: &RenderSettings) -> String {
        render_tokens(tokens, &RenderContext::new(settings, &DefaultAliases))
    }

    #[test]
    fn test_spacing_rules() {
        let tokens = vec![
            FilterToken::field(field("Id")),
            FilterToken::literal("IN"),
            FilterToken::OpenGroup,
            FilterToken::literal("5,6"),
            FilterToken::CloseGroup,
            FilterToken::Connective(Connective::Or),
            FilterToken::OpenGroup,
            FilterToken::field(field("Name")),
            FilterToken::literal("IS NULL"),
            FilterToken::CloseGroup,
        ];
        assert_eq!(
            render(&tokens, &RenderSettings::default()),
            "pe.Id IN (5,6) OR (pe.Name IS NULL)"
        );
    }

    #[test]
    fn test_without_aliases() {
        let settings = RenderSettings {
            without_aliases: true,
            parameter_prefix: None,
        };
        let tokens = vec![FilterToken::field(field("Id")), FilterToken::literal("IS NULL")];
        assert_eq!(render(&tokens, &settings), "Id IS NULL");
    }

    #[test]
    fn test_registry_alias_used_for_unbound_fields() {
        let aliases = AliasContainerBuilder::new().register::<Person>("per").build().unwrap();
        let settings = RenderSettings::default();
        let ctx = RenderContext::new(&settings, &aliases);

        assert_eq!(ctx.field(&field("Id")), "per.Id");

        let passport = AnySqlField::new(Passport::tag(), "Id".into(), "Passport".into(), Some("pas".into()));
        assert_eq!(ctx.field(&passport), "pas.Id");
    }

    #[test]
    fn test_satisfy_receives_context() {
        let settings = RenderSettings {
            without_aliases: false,
            parameter_prefix: Some("w".into()),
        };
        let render_fn: SatisfyFn = Arc::new(|field: &str, ctx: &RenderContext<'_>| {
            format!("{} = @{}0", field, ctx.parameter_prefix().unwrap_or("p"))
        });
        let tokens = vec![FilterToken::satisfy(field("Id"), render_fn)];
        assert_eq!(render(&tokens, &settings), "pe.Id = @w0");
    }

    #[test]
    fn test_pinned_fields() {
        let settings = RenderSettings::default();
        let bare = FilterToken::field(field("Id")).pinned(|_| FieldBinding::Bare);
        let aliased = FilterToken::field(field("Name")).pinned(|_| FieldBinding::Alias("p1".into()));
        let repinned = aliased.pinned(|_| FieldBinding::Bare);
        let tokens = vec![
            bare,
            FilterToken::literal("IS NULL"),
            FilterToken::Connective(Connective::And),
            repinned,
            FilterToken::literal("IS NULL"),
        ];
        assert_eq!(render(&tokens, &settings), "Id IS NULL AND p1.Name IS NULL");

        let suppressed = RenderSettings {
            without_aliases: true,
            parameter_prefix: None,
        };
        assert_eq!(render(&tokens, &suppressed), "Id IS NULL AND Name IS NULL");
        assert!(matches!(FilterToken::literal("=").pinned(|_| FieldBinding::Bare), FilterToken::Literal(_)));
    }

    #[test]
    fn test_render_is_repeatable() {
        let tokens = vec![FilterToken::field(field("Id")), FilterToken::literal("= 5")];
        let settings = RenderSettings::default();
        assert_eq!(render(&tokens, &settings), render(&tokens, &settings));
    }
}
