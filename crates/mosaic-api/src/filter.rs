//! Declarative filter model: comparison operators and the filter tree.
//!
//! A filter is either a leaf comparison or a composite `and`/`or` group.
//! Whether a leaf's operator is valid for its field is decided at compile
//! time against the field capability table, never at evaluation time.

use serde::{Deserialize, Serialize};

/// Comparison operator on a filter leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Neq,
    Gte,
    Gt,
    Lte,
    Lt,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    In,
    NotIn,
}

/// The global operator set; every capability-table entry draws from this.
pub const ALL_OPERATORS: [Operator; 16] = [
    Operator::Eq,
    Operator::Neq,
    Operator::Gte,
    Operator::Gt,
    Operator::Lte,
    Operator::Lt,
    Operator::IsNull,
    Operator::IsNotNull,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
    Operator::Contains,
    Operator::DoesNotContain,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::In,
    Operator::NotIn,
];

impl Operator {
    /// True for operators that compare against a value. `isnull` and friends
    /// are unary and ignore the leaf's `value`.
    pub fn takes_value(&self) -> bool {
        !matches!(
            self,
            Operator::IsNull | Operator::IsNotNull | Operator::IsEmpty | Operator::IsNotEmpty
        )
    }
}

/// Logic connective of a composite filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterLogic {
    And,
    Or,
}

/// A filter tree node: leaf comparison or composite group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Group {
        logic: FilterLogic,
        filters: Vec<FilterNode>,
    },
    Leaf {
        field: String,
        operator: Operator,
        #[serde(default)]
        value: serde_json::Value,
    },
}

impl FilterNode {
    pub fn leaf(field: impl Into<String>, operator: Operator, value: serde_json::Value) -> Self {
        FilterNode::Leaf {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn and(filters: Vec<FilterNode>) -> Self {
        FilterNode::Group {
            logic: FilterLogic::And,
            filters,
        }
    }

    pub fn or(filters: Vec<FilterNode>) -> Self {
        FilterNode::Group {
            logic: FilterLogic::Or,
            filters,
        }
    }

    /// Number of leaf comparisons in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            FilterNode::Leaf { .. } => 1,
            FilterNode::Group { filters, .. } => filters.iter().map(FilterNode::leaf_count).sum(),
        }
    }
}
