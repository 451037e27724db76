//! Model trees derived from record types.
//!
//! Introspection walks a record's [`FieldSpec`]s once, recursing into nested
//! records, and stores every model in one arena. Each nested model gets a
//! [`Joiner`] describing how it is reached from its parent. The arena is
//! immutable afterwards and shared by all handles of the tree.

use crate::condition::Conditional;
use crate::dataset::{Delete, Insert, Select, Update};
use crate::db::Db;
use crate::error::{OrmResult, SchemaError};
use crate::expr::Expression;
use crate::field::Column;
use crate::ident::{SEPARATOR, alias_sql, check_name, to_snake_case};
use crate::record::Record;
use crate::table::{Binder, FieldKind, FieldSpec, Table};
use std::fmt;
use std::sync::Arc;

/// Index of a model inside its tree. The root is always `ModelId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(pub(crate) usize);

/// Join edge from a parent model to a nested one.
///
/// `name` is the parent's reference (its table name, or its own joiner name)
/// followed by `__` and the nested alias, so it is unique within the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joiner {
    name: String,
    table: String,
    parent_table: String,
    parent_ref: String,
    local_key: String,
    foreign_key: String,
}

impl Joiner {
    /// Table alias used in the join.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Joined table.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn parent_table(&self) -> &str {
        &self.parent_table
    }

    pub fn local_key(&self) -> &str {
        &self.local_key
    }

    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    /// `orders AS users__orders`
    pub fn table_expr(&self) -> String {
        format!("{} AS {}", self.table, self.name)
    }

    /// `users.id = users__orders.user_id`
    pub fn on(&self) -> String {
        format!(
            "{}.{} = {}.{}",
            self.parent_ref, self.local_key, self.name, self.foreign_key
        )
    }
}

#[derive(Debug)]
pub(crate) struct ColumnSlot {
    pub(crate) field: String,
    pub(crate) column: String,
}

#[derive(Debug)]
pub(crate) struct ChildSlot {
    pub(crate) field: String,
    pub(crate) id: ModelId,
}

#[derive(Debug)]
pub(crate) struct ModelNode {
    pub(crate) record: &'static str,
    pub(crate) table: String,
    pub(crate) alias: String,
    pub(crate) prefix: String,
    pub(crate) parent: Option<ModelId>,
    pub(crate) joiner: Option<Joiner>,
    pub(crate) columns: Vec<ColumnSlot>,
    pub(crate) children: Vec<ChildSlot>,
}

impl ModelNode {
    /// Name this model's columns are qualified with.
    pub(crate) fn reference(&self) -> &str {
        self.joiner.as_ref().map_or(self.table.as_str(), |j| j.name.as_str())
    }

    pub(crate) fn child(&self, field: &str) -> Option<ModelId> {
        self.children
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.id)
    }
}

/// Arena of every model reachable from one root record.
pub struct ModelTree {
    nodes: Vec<ModelNode>,
    db: Option<Db>,
}

impl ModelTree {
    pub(crate) fn node(&self, id: ModelId) -> &ModelNode {
        &self.nodes[id.0]
    }

    /// Joiners from the root down to `id`, outermost first.
    pub(crate) fn joiner_chain(&self, id: ModelId) -> Vec<Joiner> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.node(cur);
            if let Some(joiner) = &node.joiner {
                chain.push(joiner.clone());
            }
            current = node.parent;
        }
        chain.reverse();
        chain
    }
}

impl fmt::Debug for ModelTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelTree")
            .field("nodes", &self.nodes)
            .field("attached", &self.db.is_some())
            .finish()
    }
}

struct ParentLink {
    id: ModelId,
    alias: String,
    local_key: String,
    foreign_key: String,
}

/// Introspect `T` without a database. Statements can be rendered but not run.
pub fn init<T: Table>() -> OrmResult<T> {
    init_with::<T>(None)
}

pub(crate) fn init_with<T: Table>(db: Option<Db>) -> OrmResult<T> {
    let record = std::any::type_name::<T>();
    let mut nodes = Vec::new();
    let root = introspect(&mut nodes, record, T::fields(), None)?;

    tracing::debug!(
        target: "pgmodel.model",
        record,
        table = %nodes[root.0].table,
        columns = nodes.iter().map(|n| n.columns.len()).sum::<usize>(),
        nested = nodes.len() - 1,
        attached = db.is_some(),
        "model tree built"
    );

    let tree = Arc::new(ModelTree { nodes, db });
    let mut binder = Binder::new(&tree, root);
    T::bind(&mut binder)
}

fn introspect(
    nodes: &mut Vec<ModelNode>,
    record: &'static str,
    specs: Vec<FieldSpec>,
    parent: Option<ParentLink>,
) -> Result<ModelId, SchemaError> {
    let mut table = None;
    for spec in &specs {
        if !matches!(spec.kind, FieldKind::Marker) {
            continue;
        }
        if table.is_some() {
            return Err(SchemaError::DuplicateMarker {
                record: record.to_string(),
                field: spec.name.clone(),
            });
        }
        table = spec.table.clone().filter(|t| !t.is_empty());
        if table.is_none() {
            return Err(SchemaError::MissingTable {
                record: record.to_string(),
            });
        }
    }
    let table = table.ok_or_else(|| SchemaError::MissingTable {
        record: record.to_string(),
    })?;
    check_name(record, &table)?;

    let id = ModelId(nodes.len());
    let node = match parent {
        None => ModelNode {
            record,
            table: table.clone(),
            alias: String::new(),
            prefix: String::new(),
            parent: None,
            joiner: None,
            columns: Vec::new(),
            children: Vec::new(),
        },
        Some(link) => {
            let up = &nodes[link.id.0];
            let prefix = if up.prefix.is_empty() {
                link.alias.clone()
            } else {
                format!("{}.{}", up.prefix, link.alias)
            };
            let parent_ref = up.reference().to_string();
            let joiner = Joiner {
                name: format!("{parent_ref}{SEPARATOR}{}", link.alias),
                table: table.clone(),
                parent_table: up.table.clone(),
                parent_ref,
                local_key: link.local_key,
                foreign_key: link.foreign_key,
            };
            ModelNode {
                record,
                table: table.clone(),
                alias: link.alias,
                prefix,
                parent: Some(link.id),
                joiner: Some(joiner),
                columns: Vec::new(),
                children: Vec::new(),
            }
        }
    };
    nodes.push(node);

    for spec in specs {
        if matches!(spec.kind, FieldKind::Marker) || spec.is_skipped() {
            continue;
        }
        match (&spec.kind, &spec.fk) {
            (FieldKind::Column, None) => {
                let column = spec
                    .db_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| to_snake_case(&spec.name));
                check_name(record, &column)?;
                nodes[id.0].columns.push(ColumnSlot {
                    field: spec.name,
                    column,
                });
            }
            (FieldKind::Nested { record: nested, fields }, Some(tag)) => {
                let alias = spec
                    .db_name()
                    .map(str::to_string)
                    .ok_or_else(|| SchemaError::MissingAlias {
                        record: record.to_string(),
                        field: spec.name.clone(),
                    })?;
                let (local_key, foreign_key) = parse_fk(record, &spec.name, tag)?;
                check_name(record, &alias)?;
                check_name(record, &local_key)?;
                check_name(record, &foreign_key)?;
                if nodes.iter().any(|n| n.parent == Some(id) && n.alias == alias) {
                    return Err(SchemaError::DuplicateAlias {
                        record: record.to_string(),
                        alias,
                    });
                }

                let child = introspect(
                    nodes,
                    *nested,
                    fields(),
                    Some(ParentLink {
                        id,
                        alias,
                        local_key,
                        foreign_key,
                    }),
                )?;
                nodes[id.0].children.push(ChildSlot {
                    field: spec.name,
                    id: child,
                });
            }
            (_, Some(_)) => {
                return Err(SchemaError::NotAModel {
                    record: record.to_string(),
                    field: spec.name,
                });
            }
            (_, None) => {
                return Err(SchemaError::UnknownField {
                    record: record.to_string(),
                    field: spec.name,
                });
            }
        }
    }

    Ok(id)
}

/// Split `localKey,foreignKey`.
fn parse_fk(record: &str, field: &str, tag: &str) -> Result<(String, String), SchemaError> {
    let parts: Vec<&str> = tag.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [local, foreign] if !local.is_empty() && !foreign.is_empty() => {
            Ok((local.to_string(), foreign.to_string()))
        }
        _ => Err(SchemaError::MalformedForeignKey {
            record: record.to_string(),
            field: field.to_string(),
            tag: tag.to_string(),
        }),
    }
}

/// Handle to one model of a tree.
///
/// Every record built by [`init`] or [`Db::init`] carries one of these as its
/// marker field. Nested records carry handles to their own node.
#[derive(Clone)]
pub struct Model {
    tree: Arc<ModelTree>,
    id: ModelId,
}

impl Model {
    pub(crate) fn new(tree: Arc<ModelTree>, id: ModelId) -> Self {
        Self { tree, id }
    }

    pub(crate) fn node(&self) -> &ModelNode {
        self.tree.node(self.id)
    }

    pub(crate) fn db(&self) -> Option<&Db> {
        self.tree.db.as_ref()
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn table_name(&self) -> &str {
        &self.node().table
    }

    /// Alias under the parent (`db` tag of the fk field); empty for the root.
    pub fn alias(&self) -> &str {
        &self.node().alias
    }

    /// Dotted alias path from the root, e.g. `orders.items`; empty for the root.
    pub fn prefix(&self) -> &str {
        &self.node().prefix
    }

    pub fn joiner(&self) -> Option<&Joiner> {
        self.node().joiner.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    pub fn is_attached(&self) -> bool {
        self.tree.db.is_some()
    }

    pub fn parent(&self) -> Option<Model> {
        self.node()
            .parent
            .map(|id| Model::new(Arc::clone(&self.tree), id))
    }

    /// Nested models in declaration order.
    pub fn children(&self) -> Vec<Model> {
        self.node()
            .children
            .iter()
            .map(|c| Model::new(Arc::clone(&self.tree), c.id))
            .collect()
    }

    /// This model's own columns in declaration order.
    pub fn columns(&self) -> Vec<Column> {
        self.node()
            .columns
            .iter()
            .map(|slot| Column::new(self.clone(), slot.column.clone()))
            .collect()
    }

    /// Column for a declared field name.
    pub fn column(&self, field: &str) -> Option<Column> {
        self.node()
            .columns
            .iter()
            .find(|slot| slot.field == field)
            .map(|slot| Column::new(self.clone(), slot.column.clone()))
    }

    /// Joiners from the root down to this model.
    pub fn joiner_chain(&self) -> Vec<Joiner> {
        self.tree.joiner_chain(self.id)
    }

    /// Selectors for every column of this model and its descendants.
    pub(crate) fn all_selectors(&self) -> Vec<String> {
        let mut out: Vec<String> = self.columns().iter().map(Column::selector).collect();
        for child in self.children() {
            out.extend(child.all_selectors());
        }
        out
    }

    /// Joiners of every descendant, parents before children.
    pub(crate) fn descendant_joiners(&self) -> Vec<Joiner> {
        let mut out = Vec::new();
        for child in self.children() {
            if let Some(joiner) = child.joiner() {
                out.push(joiner.clone());
            }
            out.extend(child.descendant_joiners());
        }
        out
    }

    /// `FROM` target: the table, aliased to the joiner name for nested models
    /// so their qualified identifiers stay valid.
    pub(crate) fn from_expr(&self) -> String {
        match self.joiner() {
            Some(joiner) => joiner.table_expr(),
            None => self.table_name().to_string(),
        }
    }

    /// Select-list alias of a column on this model.
    pub(crate) fn selector_alias(&self, column: &str) -> String {
        if self.prefix().is_empty() {
            alias_sql(column)
        } else {
            alias_sql(&format!("{}.{}", self.prefix(), column))
        }
    }

    /// SELECT the given expressions. An empty list selects every column of
    /// this model and its descendants, left-joining every nested model.
    pub fn select<E>(&self, exprs: impl IntoIterator<Item = E>) -> Select<'static>
    where
        E: Into<Expression>,
    {
        Select::new(self.clone(), exprs.into_iter().map(Into::into).collect())
    }

    /// Same as `select` with an empty list.
    pub fn select_all(&self) -> Select<'static> {
        Select::new(self.clone(), Vec::new())
    }

    /// INSERT one row per record.
    pub fn insert(&self, records: impl IntoIterator<Item = Record>) -> Insert<'static> {
        Insert::new(self.clone(), records.into_iter().collect())
    }

    /// UPDATE with the record as the SET clause.
    pub fn update(&self, record: Record) -> Update<'static> {
        Update::new(self.clone(), record)
    }

    pub fn delete(&self) -> Delete<'static> {
        Delete::new(self.clone())
    }

    /// Shorthand for `select_all().filter(condition)`.
    pub fn find(&self, condition: impl Into<Conditional>) -> Select<'static> {
        self.select_all().filter(condition)
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("table", &self.table_name())
            .field("prefix", &self.prefix())
            .field("attached", &self.is_attached())
            .finish()
    }
}
