//! Schema snapshot types
//!
//! Value objects describing one point-in-time capture of a database:
//! tables, their columns, and their indexes with observed statistics.
//! A snapshot is built once by a metadata collector and never mutated
//! afterwards; analysis only reads it.

use serde::{Deserialize, Serialize};

/// Portable declared type of a column
///
/// Maps engine-specific declared types to a common representation. The
/// declared maximum length of character and byte types travels with the
/// variant since several rules key off it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    /// Boolean type
    Bool,

    /// Integer type (any precision)
    Int,

    /// Floating point (any precision)
    Float,

    /// Decimal with precision and scale
    Decimal {
        precision: Option<u16>,
        scale: Option<u16>,
    },

    /// Character data; `max_length` is the declared limit, `None` for
    /// unbounded text types
    String { max_length: Option<u32> },

    /// Byte data; `max_length` as for `String`
    Binary { max_length: Option<u32> },

    /// Date (no time component)
    Date,

    /// Timestamp (with time component)
    Timestamp,

    /// JSON/Variant type
    Json,

    /// Unknown type (collector could not map it)
    Unknown,
}

impl ColumnType {
    /// Whether this is a character type
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String { .. })
    }

    /// Declared maximum length, for the types that carry one
    pub fn max_length(&self) -> Option<u32> {
        match self {
            Self::String { max_length } | Self::Binary { max_length } => *max_length,
            _ => None,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "BOOL"),
            Self::Int => write!(f, "INT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Decimal { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => write!(f, "DECIMAL({}, {})", p, s),
                (Some(p), None) => write!(f, "DECIMAL({})", p),
                _ => write!(f, "DECIMAL"),
            },
            Self::String { max_length: Some(n) } => write!(f, "STRING({})", n),
            Self::String { max_length: None } => write!(f, "STRING"),
            Self::Binary { max_length: Some(n) } => write!(f, "BINARY({})", n),
            Self::Binary { max_length: None } => write!(f, "BINARY"),
            Self::Date => write!(f, "DATE"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Json => write!(f, "JSON"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A column in a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Declared type
    pub column_type: ColumnType,

    /// Whether NULL values are allowed
    #[serde(default)]
    pub nullable: bool,

    /// Estimated count of distinct values, as sampled by the database's
    /// statistics machinery. A value of 0 means "no statistics gathered",
    /// not "zero distinct values"; rules treat it as insufficient data.
    #[serde(default)]
    pub cardinality: u64,
}

impl Column {
    /// Create a non-nullable column with no gathered statistics
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            cardinality: 0,
        }
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the observed cardinality
    pub fn with_cardinality(mut self, cardinality: u64) -> Self {
        self.cardinality = cardinality;
        self
    }
}

/// Statistics for one column's participation in an index
///
/// Indexes carry one entry per participating column, ordered by
/// `seq_in_index`. The entry references its column by name; the owning
/// table resolves the name to the actual [`Column`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumnStatistic {
    /// Name of the participating column
    pub column: String,

    /// 1-based position of the column within the index key
    pub seq_in_index: u32,

    /// Observed cardinality at this key position; 0 means "no statistics
    /// gathered" (the same sentinel as [`Column::cardinality`])
    #[serde(default)]
    pub cardinality: u64,

    /// Key-prefix length: present when the index covers only the first
    /// `sub_part` characters of the column instead of the full value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_part: Option<u32>,
}

impl IndexColumnStatistic {
    /// Create a statistic entry with no gathered cardinality
    pub fn new(column: impl Into<String>, seq_in_index: u32) -> Self {
        Self {
            column: column.into(),
            seq_in_index,
            cardinality: 0,
            sub_part: None,
        }
    }

    /// Set the observed cardinality
    pub fn with_cardinality(mut self, cardinality: u64) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Set the key-prefix length
    pub fn with_sub_part(mut self, sub_part: u32) -> Self {
        self.sub_part = Some(sub_part);
        self
    }
}

/// An index over one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name, unique within its table
    pub name: String,

    /// Whether the index enforces uniqueness
    #[serde(default)]
    pub unique: bool,

    /// Participating columns with their statistics, in key order
    pub columns: Vec<IndexColumnStatistic>,
}

impl Index {
    /// Create a non-unique index with no key columns
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique: false,
            columns: Vec::new(),
        }
    }

    /// Set uniqueness
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Append a key column
    pub fn with_column(mut self, column: IndexColumnStatistic) -> Self {
        self.columns.push(column);
        self
    }

    /// Names of the key columns, in key order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column.as_str()).collect()
    }
}

/// A table in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Schema (database) that owns the table
    pub schema: String,

    /// Table name
    pub name: String,

    /// Estimated row count
    #[serde(default)]
    pub row_count: u64,

    /// Storage engine, when the collector reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    /// Default collation, when the collector reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,

    /// Columns in declared order
    #[serde(default)]
    pub columns: Vec<Column>,

    /// Indexes in declared order
    #[serde(default)]
    pub indexes: Vec<Index>,
}

impl Table {
    /// Create a table with no columns or indexes
    pub fn new(schema: impl Into<String>, name: impl Into<String>, row_count: u64) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            row_count,
            engine: None,
            collation: None,
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Set the storage engine
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Set the default collation
    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Append a column
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Append an index
    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Find a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Find an index by name
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Fully qualified `schema.table` name
    pub fn fqn(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// An ordered collection of tables; the unit of analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tables in collector order
    pub tables: Vec<Table>,
}

impl Snapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Create a snapshot from tables
    pub fn from_tables(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// All entities in deterministic traversal order: for each table in
    /// collector order, the table itself, then its columns, then its
    /// indexes.
    pub fn entities(&self) -> impl Iterator<Item = Entity<'_>> {
        self.tables.iter().flat_map(|table| {
            std::iter::once(Entity::Table(table))
                .chain(table.columns.iter().map(move |c| Entity::Column(table, c)))
                .chain(table.indexes.iter().map(move |i| Entity::Index(table, i)))
        })
    }

    /// Number of entities [`entities`](Self::entities) yields
    pub fn entity_count(&self) -> usize {
        self.tables
            .iter()
            .map(|t| 1 + t.columns.len() + t.indexes.len())
            .sum()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// One schema object paired with the table that owns it
///
/// The table reference realizes the backlink from columns and indexes to
/// their owner without a second ownership path: rules reach the owning
/// table's row count and sibling objects through it, and the snapshot
/// stays a plain tree.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    /// A table
    Table(&'a Table),

    /// A column together with its owning table
    Column(&'a Table, &'a Column),

    /// An index together with its owning table
    Index(&'a Table, &'a Index),
}

impl<'a> Entity<'a> {
    /// The owning table (the table itself for table entities)
    pub fn table(&self) -> &'a Table {
        match self {
            Entity::Table(t) | Entity::Column(t, _) | Entity::Index(t, _) => t,
        }
    }

    /// Name of the object itself
    pub fn name(&self) -> &'a str {
        match self {
            Entity::Table(t) => &t.name,
            Entity::Column(_, c) => &c.name,
            Entity::Index(_, i) => &i.name,
        }
    }

    /// The table, for table entities
    pub fn as_table(&self) -> Option<&'a Table> {
        match self {
            Entity::Table(t) => Some(t),
            _ => None,
        }
    }

    /// The owning table and column, for column entities
    pub fn as_column(&self) -> Option<(&'a Table, &'a Column)> {
        match self {
            Entity::Column(t, c) => Some((t, c)),
            _ => None,
        }
    }

    /// The owning table and index, for index entities
    pub fn as_index(&self) -> Option<(&'a Table, &'a Index)> {
        match self {
            Entity::Index(t, i) => Some((t, i)),
            _ => None,
        }
    }

    /// An owned, stable reference suitable for reports
    pub fn to_ref(&self) -> EntityRef {
        match self {
            Entity::Table(t) => EntityRef::Table {
                schema: t.schema.clone(),
                table: t.name.clone(),
            },
            Entity::Column(t, c) => EntityRef::Column {
                schema: t.schema.clone(),
                table: t.name.clone(),
                column: c.name.clone(),
            },
            Entity::Index(t, i) => EntityRef::Index {
                schema: t.schema.clone(),
                table: t.name.clone(),
                index: i.name.clone(),
            },
        }
    }
}

/// Owned reference to the entity a report originated from
///
/// Carries enough to locate the object again in a later snapshot; reports
/// outlive the snapshot they were computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityRef {
    /// A table
    Table { schema: String, table: String },

    /// A column of a table
    Column {
        schema: String,
        table: String,
        column: String,
    },

    /// An index of a table
    Index {
        schema: String,
        table: String,
        index: String,
    },
}

impl EntityRef {
    /// `schema.table` of the owning table; the grouping key for rendering
    pub fn table_fqn(&self) -> String {
        match self {
            EntityRef::Table { schema, table }
            | EntityRef::Column { schema, table, .. }
            | EntityRef::Index { schema, table, .. } => format!("{}.{}", schema, table),
        }
    }

    /// Name of the referenced object itself
    pub fn object_name(&self) -> &str {
        match self {
            EntityRef::Table { table, .. } => table,
            EntityRef::Column { column, .. } => column,
            EntityRef::Index { index, .. } => index,
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRef::Table { schema, table } => write!(f, "{}.{}", schema, table),
            EntityRef::Column {
                schema,
                table,
                column,
            } => write!(f, "{}.{}.{}", schema, table, column),
            EntityRef::Index {
                schema,
                table,
                index,
            } => write!(f, "{}.{} (index {})", schema, table, index),
        }
    }
}
