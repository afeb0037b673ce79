//! Field capability table.
//!
//! Static mapping from editor kind to the UI capabilities of fields of that
//! kind: default comparison operator, allowed operator set, cell editor and
//! display format. The table is pure data; its correctness (no invalid
//! operator ever offered for a kind) is a tested invariant, not a runtime
//! check.

use serde::{Deserialize, Serialize};

use mosaic_api::{EditorKind, Operator};

/// Cell editor the UI renders for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellEditor {
    Text,
    Numeric,
    Checkbox,
    DatePicker,
    DateTimePicker,
    TimePicker,
    Dropdown,
    TagList,
    AttributePicker,
    Email,
}

/// Client-side filter widget family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientFilterKind {
    Text,
    Numeric,
    Boolean,
    Date,
    Choice,
}

/// UI capabilities of one editor kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCapability {
    pub default_operator: Operator,
    pub operators: &'static [Operator],
    pub cell_editor: CellEditor,
    /// strftime-style pattern for temporal kinds; `None` leaves formatting
    /// to the UI's locale defaults.
    pub display_format: Option<&'static str>,
    pub filter_kind: ClientFilterKind,
}

static TEXT: FieldCapability = FieldCapability {
    default_operator: Operator::Contains,
    operators: &[
        Operator::Eq,
        Operator::Neq,
        Operator::Contains,
        Operator::DoesNotContain,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::In,
        Operator::NotIn,
    ],
    cell_editor: CellEditor::Text,
    display_format: None,
    filter_kind: ClientFilterKind::Text,
};

static NUMERIC: FieldCapability = FieldCapability {
    default_operator: Operator::Eq,
    operators: &[
        Operator::Eq,
        Operator::Neq,
        Operator::Gte,
        Operator::Gt,
        Operator::Lte,
        Operator::Lt,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::In,
        Operator::NotIn,
    ],
    cell_editor: CellEditor::Numeric,
    display_format: None,
    filter_kind: ClientFilterKind::Numeric,
};

static BOOLEAN: FieldCapability = FieldCapability {
    default_operator: Operator::Eq,
    operators: &[
        Operator::Eq,
        Operator::Neq,
        Operator::IsNull,
        Operator::IsNotNull,
    ],
    cell_editor: CellEditor::Checkbox,
    display_format: None,
    filter_kind: ClientFilterKind::Boolean,
};

static DATE: FieldCapability = FieldCapability {
    default_operator: Operator::Eq,
    operators: &[
        Operator::Eq,
        Operator::Neq,
        Operator::Gte,
        Operator::Gt,
        Operator::Lte,
        Operator::Lt,
        Operator::IsNull,
        Operator::IsNotNull,
    ],
    cell_editor: CellEditor::DatePicker,
    display_format: Some("%Y-%m-%d"),
    filter_kind: ClientFilterKind::Date,
};

static DATETIME: FieldCapability = FieldCapability {
    default_operator: Operator::Eq,
    operators: &[
        Operator::Eq,
        Operator::Neq,
        Operator::Gte,
        Operator::Gt,
        Operator::Lte,
        Operator::Lt,
        Operator::IsNull,
        Operator::IsNotNull,
    ],
    cell_editor: CellEditor::DateTimePicker,
    display_format: Some("%Y-%m-%d %H:%M"),
    filter_kind: ClientFilterKind::Date,
};

static TIME: FieldCapability = FieldCapability {
    default_operator: Operator::Eq,
    operators: &[
        Operator::Eq,
        Operator::Neq,
        Operator::Gte,
        Operator::Gt,
        Operator::Lte,
        Operator::Lt,
        Operator::IsNull,
        Operator::IsNotNull,
    ],
    cell_editor: CellEditor::TimePicker,
    display_format: Some("%H:%M"),
    filter_kind: ClientFilterKind::Date,
};

static SELECT: FieldCapability = FieldCapability {
    default_operator: Operator::Eq,
    operators: &[
        Operator::Eq,
        Operator::Neq,
        Operator::In,
        Operator::NotIn,
        Operator::IsNull,
        Operator::IsNotNull,
    ],
    cell_editor: CellEditor::Dropdown,
    display_format: None,
    filter_kind: ClientFilterKind::Choice,
};

static MULTISELECT: FieldCapability = FieldCapability {
    default_operator: Operator::In,
    operators: &[
        Operator::In,
        Operator::NotIn,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::IsNull,
        Operator::IsNotNull,
    ],
    cell_editor: CellEditor::TagList,
    display_format: None,
    filter_kind: ClientFilterKind::Choice,
};

static ATTRIBUTE: FieldCapability = FieldCapability {
    default_operator: Operator::Eq,
    operators: &[
        Operator::Eq,
        Operator::Neq,
        Operator::IsNull,
        Operator::IsNotNull,
    ],
    cell_editor: CellEditor::AttributePicker,
    display_format: None,
    filter_kind: ClientFilterKind::Choice,
};

static EMAIL: FieldCapability = FieldCapability {
    default_operator: Operator::Contains,
    operators: &[
        Operator::Eq,
        Operator::Neq,
        Operator::Contains,
        Operator::DoesNotContain,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
    ],
    cell_editor: CellEditor::Email,
    display_format: None,
    filter_kind: ClientFilterKind::Text,
};

/// Capability entry for an editor kind.
pub fn capability(kind: EditorKind) -> &'static FieldCapability {
    match kind {
        EditorKind::Text => &TEXT,
        EditorKind::Numeric => &NUMERIC,
        EditorKind::Boolean => &BOOLEAN,
        EditorKind::Date => &DATE,
        EditorKind::DateTime => &DATETIME,
        EditorKind::Time => &TIME,
        EditorKind::Select => &SELECT,
        EditorKind::MultiSelect => &MULTISELECT,
        EditorKind::Attribute => &ATTRIBUTE,
        EditorKind::Email => &EMAIL,
    }
}
