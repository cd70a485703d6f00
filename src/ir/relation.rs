//! Table expressions.
//!
//! Relations are built with fluent methods that fuse into the shapes a single
//! SELECT can express: filters, projections, ordering and limits collapse
//! into one `Selection`; a filtered selection feeding `group_by` becomes the
//! `WHERE` of the `Aggregation`. Anything else stays nested and is rejected
//! at compile time.

use super::expr::{TableName, ValueExpr};
use super::types::LogicalType;

// =============================================================================
// Tables
// =============================================================================

/// A physical table and its column schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TableExpr {
    pub name: TableName,
    pub columns: Vec<(String, LogicalType)>,
}

impl TableExpr {
    pub fn new(name: impl Into<String>, columns: Vec<(&str, LogicalType)>) -> Self {
        Self {
            name: TableName::new(name),
            columns: columns
                .into_iter()
                .map(|(n, ty)| (n.to_string(), ty))
                .collect(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.name.schema = Some(schema.into());
        self
    }

    /// Reference a column of this table.
    ///
    /// A name missing from the schema yields an untyped reference that fails
    /// to compile with `UnknownColumn`.
    pub fn col(&self, name: &str) -> ValueExpr {
        let ty = self
            .columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| ty.clone());
        ValueExpr::Column {
            table: self.name.clone(),
            name: name.to_string(),
            ty,
        }
    }

    pub fn column_type(&self, name: &str) -> Option<&LogicalType> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
    }

    /// Convert into a relation for further building.
    pub fn relation(&self) -> Relation {
        Relation::Table(self.clone())
    }
}

// =============================================================================
// Relation nodes
// =============================================================================

/// A value with an output name.
#[derive(Debug, Clone, PartialEq)]
pub struct Named<T> {
    pub name: String,
    pub expr: T,
}

impl ValueExpr {
    /// Attach an output name.
    pub fn name(self, name: impl Into<String>) -> Named<ValueExpr> {
        Named {
            name: name.into(),
            expr: self,
        }
    }
}

/// A sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expr: ValueExpr,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(expr: ValueExpr) -> Self {
        Self {
            expr,
            descending: false,
        }
    }

    pub fn desc(expr: ValueExpr) -> Self {
        Self {
            expr,
            descending: true,
        }
    }
}

impl From<ValueExpr> for SortKey {
    fn from(expr: ValueExpr) -> Self {
        SortKey::asc(expr)
    }
}

/// Row limit with offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub n: u64,
    pub offset: u64,
}

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub source: Box<Relation>,
    /// Empty means every column of the source.
    pub projections: Vec<Named<ValueExpr>>,
    pub predicates: Vec<ValueExpr>,
    pub sort_keys: Vec<SortKey>,
    pub limit: Option<Limit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub source: Box<Relation>,
    pub by: Vec<Named<ValueExpr>>,
    pub metrics: Vec<Named<ValueExpr>>,
    /// Row filters applied before grouping.
    pub predicates: Vec<ValueExpr>,
    /// Group filters applied after grouping.
    pub having: Vec<ValueExpr>,
    pub sort_keys: Vec<SortKey>,
    pub limit: Option<Limit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub left: Box<Relation>,
    pub right: Box<Relation>,
    pub kind: JoinKind,
    pub predicates: Vec<ValueExpr>,
}

/// A table-valued expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    Table(TableExpr),
    Selection(Selection),
    Aggregation(Aggregation),
    Join(Join),
}

impl From<TableExpr> for Relation {
    fn from(table: TableExpr) -> Self {
        Relation::Table(table)
    }
}

impl From<&TableExpr> for Relation {
    fn from(table: &TableExpr) -> Self {
        Relation::Table(table.clone())
    }
}

impl Relation {
    fn into_selection(self) -> Selection {
        match self {
            Relation::Selection(sel) => sel,
            other => Selection {
                source: Box::new(other),
                projections: Vec::new(),
                predicates: Vec::new(),
                sort_keys: Vec::new(),
                limit: None,
            },
        }
    }

    /// Keep rows where every predicate holds.
    pub fn filter(self, predicates: Vec<ValueExpr>) -> Relation {
        match self {
            Relation::Selection(mut sel) if sel.limit.is_none() && sel.projections.is_empty() => {
                sel.predicates.extend(predicates);
                Relation::Selection(sel)
            }
            Relation::Aggregation(mut agg) if agg.limit.is_none() => {
                agg.having.extend(predicates);
                Relation::Aggregation(agg)
            }
            Relation::Selection(sel) => {
                let mut outer = Relation::Selection(sel).nest();
                outer.predicates = predicates;
                Relation::Selection(outer)
            }
            other => {
                let mut sel = other.into_selection();
                sel.predicates = predicates;
                Relation::Selection(sel)
            }
        }
    }

    /// Compute the given named values for every row.
    pub fn select(self, projections: Vec<Named<ValueExpr>>) -> Relation {
        match self {
            Relation::Selection(mut sel) if sel.projections.is_empty() && sel.limit.is_none() => {
                sel.projections = projections;
                Relation::Selection(sel)
            }
            rel @ (Relation::Table(_) | Relation::Join(_)) => {
                let mut sel = rel.into_selection();
                sel.projections = projections;
                Relation::Selection(sel)
            }
            other => {
                let mut outer = other.nest();
                outer.projections = projections;
                Relation::Selection(outer)
            }
        }
    }

    /// Sort by the given keys (appended after existing keys).
    pub fn order_by(self, keys: Vec<SortKey>) -> Relation {
        match self {
            Relation::Selection(mut sel) if sel.limit.is_none() => {
                sel.sort_keys.extend(keys);
                Relation::Selection(sel)
            }
            Relation::Aggregation(mut agg) if agg.limit.is_none() => {
                agg.sort_keys.extend(keys);
                Relation::Aggregation(agg)
            }
            rel @ (Relation::Table(_) | Relation::Join(_)) => {
                let mut sel = rel.into_selection();
                sel.sort_keys = keys;
                Relation::Selection(sel)
            }
            other => {
                let mut outer = other.nest();
                outer.sort_keys = keys;
                Relation::Selection(outer)
            }
        }
    }

    /// Keep at most `n` rows after skipping `offset`.
    pub fn limit(self, n: u64, offset: u64) -> Relation {
        let limit = Some(Limit { n, offset });
        match self {
            Relation::Selection(mut sel) if sel.limit.is_none() => {
                sel.limit = limit;
                Relation::Selection(sel)
            }
            Relation::Aggregation(mut agg) if agg.limit.is_none() => {
                agg.limit = limit;
                Relation::Aggregation(agg)
            }
            rel @ (Relation::Table(_) | Relation::Join(_)) => {
                let mut sel = rel.into_selection();
                sel.limit = limit;
                Relation::Selection(sel)
            }
            other => {
                let mut outer = other.nest();
                outer.limit = limit;
                Relation::Selection(outer)
            }
        }
    }

    /// Start a grouped aggregation.
    pub fn group_by(self, by: Vec<Named<ValueExpr>>) -> GroupedRelation {
        GroupedRelation { source: self, by }
    }

    /// Aggregate the whole relation into a single row.
    pub fn aggregate(self, metrics: Vec<Named<ValueExpr>>) -> Relation {
        self.group_by(Vec::new()).aggregate(metrics)
    }

    /// Join with another relation.
    pub fn join(
        self,
        right: impl Into<Relation>,
        kind: JoinKind,
        predicates: Vec<ValueExpr>,
    ) -> Relation {
        Relation::Join(Join {
            left: Box::new(self),
            right: Box::new(right.into()),
            kind,
            predicates,
        })
    }

    fn nest(self) -> Selection {
        Selection {
            source: Box::new(self),
            projections: Vec::new(),
            predicates: Vec::new(),
            sort_keys: Vec::new(),
            limit: None,
        }
    }

    /// Every expression embedded in this relation, in build order.
    pub fn expressions(&self) -> Vec<&ValueExpr> {
        let mut out = Vec::new();
        self.collect_expressions(&mut out);
        out
    }

    fn collect_expressions<'a>(&'a self, out: &mut Vec<&'a ValueExpr>) {
        match self {
            Relation::Table(_) => {}
            Relation::Selection(sel) => {
                sel.source.collect_expressions(out);
                out.extend(sel.projections.iter().map(|p| &p.expr));
                out.extend(sel.predicates.iter());
                out.extend(sel.sort_keys.iter().map(|k| &k.expr));
            }
            Relation::Aggregation(agg) => {
                agg.source.collect_expressions(out);
                out.extend(agg.by.iter().map(|b| &b.expr));
                out.extend(agg.metrics.iter().map(|m| &m.expr));
                out.extend(agg.predicates.iter());
                out.extend(agg.having.iter());
                out.extend(agg.sort_keys.iter().map(|k| &k.expr));
            }
            Relation::Join(join) => {
                join.left.collect_expressions(out);
                join.right.collect_expressions(out);
                out.extend(join.predicates.iter());
            }
        }
    }

    /// Rebuild the relation with `f` applied to every embedded expression.
    pub fn map_expressions(self, f: &mut impl FnMut(ValueExpr) -> ValueExpr) -> Relation {
        let map_all = |exprs: Vec<ValueExpr>, f: &mut dyn FnMut(ValueExpr) -> ValueExpr| {
            exprs.into_iter().map(|e| f(e)).collect::<Vec<_>>()
        };
        let map_named = |named: Vec<Named<ValueExpr>>, f: &mut dyn FnMut(ValueExpr) -> ValueExpr| {
            named
                .into_iter()
                .map(|n| Named {
                    name: n.name,
                    expr: f(n.expr),
                })
                .collect::<Vec<_>>()
        };
        let map_keys = |keys: Vec<SortKey>, f: &mut dyn FnMut(ValueExpr) -> ValueExpr| {
            keys.into_iter()
                .map(|k| SortKey {
                    expr: f(k.expr),
                    descending: k.descending,
                })
                .collect::<Vec<_>>()
        };

        match self {
            Relation::Table(t) => Relation::Table(t),
            Relation::Selection(sel) => Relation::Selection(Selection {
                source: Box::new(sel.source.map_expressions(f)),
                projections: map_named(sel.projections, f),
                predicates: map_all(sel.predicates, f),
                sort_keys: map_keys(sel.sort_keys, f),
                limit: sel.limit,
            }),
            Relation::Aggregation(agg) => Relation::Aggregation(Aggregation {
                source: Box::new(agg.source.map_expressions(f)),
                by: map_named(agg.by, f),
                metrics: map_named(agg.metrics, f),
                predicates: map_all(agg.predicates, f),
                having: map_all(agg.having, f),
                sort_keys: map_keys(agg.sort_keys, f),
                limit: agg.limit,
            }),
            Relation::Join(join) => Relation::Join(Join {
                left: Box::new(join.left.map_expressions(f)),
                right: Box::new(join.right.map_expressions(f)),
                kind: join.kind,
                predicates: map_all(join.predicates, f),
            }),
        }
    }
}

/// A relation awaiting its aggregate metrics.
#[derive(Debug, Clone)]
#[must_use = "call aggregate() to build the relation"]
pub struct GroupedRelation {
    source: Relation,
    by: Vec<Named<ValueExpr>>,
}

impl GroupedRelation {
    pub fn aggregate(self, metrics: Vec<Named<ValueExpr>>) -> Relation {
        let (source, predicates) = match self.source {
            // A plain filtered selection folds into the aggregation's WHERE
            Relation::Selection(sel)
                if sel.projections.is_empty()
                    && sel.sort_keys.is_empty()
                    && sel.limit.is_none() =>
            {
                (*sel.source, sel.predicates)
            }
            other => (other, Vec::new()),
        };
        Relation::Aggregation(Aggregation {
            source: Box::new(source),
            by: self.by,
            metrics,
            predicates,
            having: Vec::new(),
            sort_keys: Vec::new(),
            limit: None,
        })
    }
}
