//! Field descriptors: the normalized in-memory representation of one schema
//! type's fields.
//!
//! Descriptors are derived from a schema snapshot and treated as read-only
//! afterwards; they are recreated whenever the type name or schema version
//! changes. The `FieldKind` sum type makes the structural invariants hold by
//! construction: a scalar field always carries its `ScalarType`, and only
//! object/list fields can carry sub-fields.

use serde::{Deserialize, Serialize};

/// Scalar type of a leaf field, as reported by the schema source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Time,
    /// Single-choice enumeration
    Enum,
    /// Multi-choice enumeration
    EnumSet,
    /// Reference to a user-defined attribute
    Attribute,
    Email,
    /// Opaque identifier (primary key or foreign-key style reference)
    Id,
}

impl ScalarType {
    /// Map a scalar type onto the editor kind the UI uses for it.
    pub fn editor_kind(&self) -> EditorKind {
        match self {
            ScalarType::Text => EditorKind::Text,
            ScalarType::Integer | ScalarType::Float => EditorKind::Numeric,
            ScalarType::Boolean => EditorKind::Boolean,
            ScalarType::Date => EditorKind::Date,
            ScalarType::DateTime => EditorKind::DateTime,
            ScalarType::Time => EditorKind::Time,
            ScalarType::Enum => EditorKind::Select,
            ScalarType::EnumSet => EditorKind::MultiSelect,
            ScalarType::Attribute => EditorKind::Attribute,
            ScalarType::Email => EditorKind::Email,
            // Ids render and filter like plain text when they surface at all
            ScalarType::Id => EditorKind::Text,
        }
    }
}

/// Editor kind: the key into the field capability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    Text,
    Numeric,
    Boolean,
    Date,
    DateTime,
    Time,
    Select,
    MultiSelect,
    Attribute,
    Email,
}

impl EditorKind {
    /// All editor kinds, for table-closure checks.
    pub const ALL: [EditorKind; 10] = [
        EditorKind::Text,
        EditorKind::Numeric,
        EditorKind::Boolean,
        EditorKind::Date,
        EditorKind::DateTime,
        EditorKind::Time,
        EditorKind::Select,
        EditorKind::MultiSelect,
        EditorKind::Attribute,
        EditorKind::Email,
    ];
}

/// Structural kind of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Scalar(ScalarType),
    Object { type_name: String },
    List { type_name: String },
}

/// One field of a schema type, or one dotted-path leaf of a flattened type.
///
/// `name` is the addressable (possibly dotted) path; `source_path` records
/// where the field originated, which differs from `name` only for fields
/// synthesized by pipeline stages. `sub_fields` is populated lazily by the
/// flattener for object/list fields and stays empty for scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub source_path: String,
    #[serde(default)]
    pub sub_fields: Vec<FieldDescriptor>,
    /// False for fields addressed through a list: list cardinality breaks
    /// simple dotted addressing, so they cannot feed aggregation pipelines.
    #[serde(default = "default_true")]
    pub aggregatable: bool,
}

fn default_true() -> bool {
    true
}

impl FieldDescriptor {
    pub fn scalar(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        let name = name.into();
        Self {
            source_path: name.clone(),
            name,
            kind: FieldKind::Scalar(scalar_type),
            sub_fields: Vec::new(),
            aggregatable: true,
        }
    }

    pub fn object(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source_path: name.clone(),
            name,
            kind: FieldKind::Object {
                type_name: type_name.into(),
            },
            sub_fields: Vec::new(),
            aggregatable: true,
        }
    }

    pub fn list(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source_path: name.clone(),
            name,
            kind: FieldKind::List {
                type_name: type_name.into(),
            },
            sub_fields: Vec::new(),
            aggregatable: true,
        }
    }

    pub fn with_source_path(mut self, source_path: impl Into<String>) -> Self {
        self.source_path = source_path.into();
        self
    }

    pub fn with_sub_fields(mut self, sub_fields: Vec<FieldDescriptor>) -> Self {
        self.sub_fields = sub_fields;
        self
    }

    pub fn not_aggregatable(mut self) -> Self {
        self.aggregatable = false;
        self
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, FieldKind::Scalar(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, FieldKind::Object { .. })
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, FieldKind::List { .. })
    }

    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self.kind {
            FieldKind::Scalar(scalar_type) => Some(scalar_type),
            _ => None,
        }
    }

    /// Editor kind for scalar fields; None for object/list containers.
    pub fn editor_kind(&self) -> Option<EditorKind> {
        self.scalar_type().map(|s| s.editor_kind())
    }

    /// Nested type name for object/list fields.
    pub fn nested_type_name(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Object { type_name } | FieldKind::List { type_name } => Some(type_name),
            FieldKind::Scalar(_) => None,
        }
    }

    /// Find a field by addressable name in a flattened field list.
    pub fn find<'a>(fields: &'a [FieldDescriptor], name: &str) -> Option<&'a FieldDescriptor> {
        fields.iter().find(|f| f.name == name)
    }
}
