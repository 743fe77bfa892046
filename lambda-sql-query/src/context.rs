//! The explicit context every field and filter is built against.
//!
//! [`SqlContext`] bundles the three collaborators the core depends on:
//! metadata resolution, parameter formatting and alias lookup. It is
//! immutable and cheap to clone; filters keep the context they were started
//! from and use it for every later operator and for rendering.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;
use tracing::debug;

use crate::alias::{AliasContainerBuilder, AliasRegistry, DefaultAliases, SqlAlias};
use crate::config::LambdaSqlConfig;
use crate::entity::{Entity, EntityTag, Selector};
use crate::error::QueryResult;
use crate::field::{AggregateFunction, AnySqlField, SqlField};
use crate::filter::{SqlFilter, SqlFilterField};
use crate::metadata::{EntityMetadataResolver, MetadataResolver};
use crate::value::{FilterValue, ParameterFormatter, SqlParameterFormatter};

/// Per-filter render settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderSettings {
    /// Render bare column names without `alias.` qualifiers.
    pub without_aliases: bool,
    /// Parameter name prefix handed to deferred fragments.
    pub parameter_prefix: Option<SmolStr>,
}

struct ContextInner {
    metadata: Arc<dyn MetadataResolver>,
    formatter: Arc<dyn ParameterFormatter>,
    aliases: Arc<dyn AliasRegistry>,
    settings: RenderSettings,
    log_filters: bool,
}

/// Collaborators and defaults for building and rendering filters.
///
/// ```rust
/// use lambda_sql_query::{Entity, FieldMeta, Selector, SqlContext};
///
/// struct Person;
///
/// impl Entity for Person {
///     const ENTITY_NAME: &'static str = "Person";
///     const TABLE_NAME: &'static str = "Person";
///     const DEFAULT_ALIAS: &'static str = "pe";
///     const FIELDS: &'static [FieldMeta] = &[FieldMeta::new("id", "Id")];
/// }
///
/// let ctx = SqlContext::default();
/// let id = ctx.field(Selector::<Person, i32>::property("id")).unwrap();
/// assert_eq!(id.to_string(), "pe.Id");
/// ```
#[derive(Clone)]
pub struct SqlContext {
    inner: Arc<ContextInner>,
}

impl Default for SqlContext {
    fn default() -> Self {
        Self {
            inner: Arc::new(ContextInner {
                metadata: Arc::new(EntityMetadataResolver),
                formatter: Arc::new(SqlParameterFormatter),
                aliases: Arc::new(DefaultAliases),
                settings: RenderSettings::default(),
                log_filters: false,
            }),
        }
    }
}

impl fmt::Debug for SqlContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlContext")
            .field("metadata", &self.inner.metadata)
            .field("formatter", &self.inner.formatter)
            .field("aliases", &self.inner.aliases)
            .field("settings", &self.inner.settings)
            .field("log_filters", &self.inner.log_filters)
            .finish()
    }
}

impl SqlContext {
    /// A context with the default collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a loaded configuration.
    ///
    /// Registers the configured aliases (falling back to entity defaults for
    /// the rest) and applies the configured render settings.
    pub fn from_config(config: &LambdaSqlConfig) -> QueryResult<Self> {
        let mut ctx = Self::default()
            .with_render_settings(config.render.to_settings())
            .with_filter_logging(config.debug.log_filters);
        if !config.aliases.is_empty() {
            let builder = config
                .aliases
                .iter()
                .fold(AliasContainerBuilder::new(), |builder, (entity, alias)| {
                    builder.register_name(entity.as_str(), alias.as_str())
                });
            ctx = ctx.with_aliases(builder.build()?);
        }
        debug!(aliases = config.aliases.len(), settings = ?ctx.inner.settings, "Built SqlContext from config");
        Ok(ctx)
    }

    fn rebuild(&self, f: impl FnOnce(&mut ContextInner)) -> Self {
        let mut inner = ContextInner {
            metadata: Arc::clone(&self.inner.metadata),
            formatter: Arc::clone(&self.inner.formatter),
            aliases: Arc::clone(&self.inner.aliases),
            settings: self.inner.settings.clone(),
            log_filters: self.inner.log_filters,
        };
        f(&mut inner);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Replace the metadata resolver.
    #[must_use]
    pub fn with_metadata(&self, metadata: impl MetadataResolver + 'static) -> Self {
        self.rebuild(|inner| inner.metadata = Arc::new(metadata))
    }

    /// Replace the parameter formatter.
    #[must_use]
    pub fn with_formatter(&self, formatter: impl ParameterFormatter + 'static) -> Self {
        self.rebuild(|inner| inner.formatter = Arc::new(formatter))
    }

    /// Replace the alias registry.
    #[must_use]
    pub fn with_aliases(&self, aliases: impl AliasRegistry + 'static) -> Self {
        self.rebuild(|inner| inner.aliases = Arc::new(aliases))
    }

    /// Replace the render settings new filters start with.
    #[must_use]
    pub fn with_render_settings(&self, settings: RenderSettings) -> Self {
        self.rebuild(|inner| inner.settings = settings)
    }

    /// Emit a `debug!` event with the SQL of every rendered filter.
    #[must_use]
    pub fn with_filter_logging(&self, enabled: bool) -> Self {
        self.rebuild(|inner| inner.log_filters = enabled)
    }

    /// Whether rendered filters are logged.
    pub fn logs_filters(&self) -> bool {
        self.inner.log_filters
    }

    /// Render settings new filters start with.
    pub fn render_settings(&self) -> &RenderSettings {
        &self.inner.settings
    }

    /// The metadata resolver.
    pub fn metadata(&self) -> &dyn MetadataResolver {
        self.inner.metadata.as_ref()
    }

    /// The parameter formatter.
    pub fn formatter(&self) -> &dyn ParameterFormatter {
        self.inner.formatter.as_ref()
    }

    /// Whether both handles share the same collaborators and settings.
    pub(crate) fn same_as(&self, other: &SqlContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The alias registry.
    pub fn aliases(&self) -> &dyn AliasRegistry {
        self.inner.aliases.as_ref()
    }

    // ============== Field construction ==============

    fn resolve(&self, entity: EntityTag, selector: &str, alias: Option<SmolStr>) -> QueryResult<AnySqlField> {
        let name = self.inner.metadata.property_name(&entity, selector)?;
        let table = self.inner.metadata.table_name(&entity);
        Ok(AnySqlField::new(entity, name, table, alias))
    }

    /// Build a field from a selector.
    ///
    /// Fails with `InvalidSelector` if the selector is not a simple property
    /// access of `E`.
    pub fn field<E: Entity, T>(&self, selector: Selector<E, T>) -> QueryResult<SqlField<E, T>> {
        self.resolve(E::tag(), selector.as_str(), None).map(SqlField::from_any)
    }

    /// Build a field bound to an explicit alias.
    pub fn field_as<E: Entity, T>(&self, selector: Selector<E, T>, alias: SqlAlias<E>) -> QueryResult<SqlField<E, T>> {
        self.resolve(E::tag(), selector.as_str(), Some(alias.into_name()))
            .map(SqlField::from_any)
    }

    /// Build a field wrapped in an aggregate function.
    pub fn aggregate<E: Entity, T>(
        &self,
        func: AggregateFunction,
        selector: Selector<E, T>,
        alias: Option<SqlAlias<E>>,
    ) -> QueryResult<SqlField<E, T>> {
        let field = self.resolve(E::tag(), selector.as_str(), alias.map(SqlAlias::into_name))?;
        Ok(SqlField::from_any(field).aggregated(func))
    }

    /// Table name of `E` according to the metadata resolver.
    pub fn table_name<E: Entity>(&self) -> SmolStr {
        self.inner.metadata.table_name(&E::tag())
    }

    /// The alias fields of `E` render with when they carry none.
    pub fn alias_for<E: Entity>(&self) -> SmolStr {
        self.inner.aliases.alias_for(&E::tag())
    }

    /// Format a value through the parameter formatter.
    pub fn format_value(&self, value: &FilterValue) -> QueryResult<String> {
        self.inner.formatter.format(value)
    }

    // ============== Filter entry points ==============

    /// Start a filter on the field a selector denotes.
    pub fn filter<E: Entity, T>(&self, selector: Selector<E, T>) -> QueryResult<SqlFilterField<E, T>> {
        SqlFilter::from_selector(self, selector)
    }
}
