//! Schema source and per-type descriptor catalog.
//!
//! The schema is pulled from an injected [`SchemaSource`] service with an
//! explicit lifecycle: loaded once per session, invalidated on an explicit
//! schema-version bump. Nothing here is module-level mutable state; the
//! catalog is owned by whoever composes the widgets and passed into the
//! compiler.
//!
//! Unknown or renamed types resolve to an empty field list instead of
//! failing: schema drift is expected during live editing and must never
//! take a whole widget down.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use mosaic_api::{EditorKind, FieldDescriptor, ScalarType};

use crate::flatten::flatten_type;

/// Pull-based, possibly-caching, possibly-stale source of type definitions.
///
/// Implementations are read-only after load and shared freely; they are never
/// mutated concurrently, so no locking is required of them.
pub trait SchemaSource: Send + Sync {
    /// Fields of the named type, or `None` when the type is unknown.
    fn resolve_type(&self, type_name: &str) -> Option<Vec<FieldDescriptor>>;

    /// Monotonic snapshot version; bumping it invalidates derived caches.
    fn version(&self) -> u64 {
        0
    }
}

/// In-memory schema snapshot, built programmatically or parsed from the
/// schema source's JSON introspection payload.
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    types: IndexMap<String, Vec<FieldDescriptor>>,
    version: u64,
}

#[derive(Deserialize)]
struct RawSchema {
    #[serde(default)]
    version: u64,
    types: IndexMap<String, RawType>,
}

#[derive(Deserialize)]
struct RawType {
    fields: Vec<RawField>,
}

#[derive(Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    scalar: Option<String>,
    object: Option<String>,
    list: Option<String>,
}

impl SchemaSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        self.types.insert(type_name.into(), fields);
        self
    }

    pub fn insert_type(&mut self, type_name: impl Into<String>, fields: Vec<FieldDescriptor>) {
        self.types.insert(type_name.into(), fields);
    }

    /// Parse an introspection payload of the form
    /// `{"version": 3, "types": {"Person": {"fields": [...]}}}` where each
    /// field carries exactly one of `type` (scalar), `object` or `list`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSchema =
            serde_json::from_str(json).context("failed to parse schema introspection payload")?;

        let mut snapshot = SchemaSnapshot::new().with_version(raw.version);
        for (type_name, raw_type) in raw.types {
            let mut fields = Vec::with_capacity(raw_type.fields.len());
            for field in raw_type.fields {
                fields.push(convert_raw_field(field).with_context(|| {
                    format!("invalid field definition in type '{}'", type_name)
                })?);
            }
            snapshot.insert_type(type_name, fields);
        }
        Ok(snapshot)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

fn convert_raw_field(raw: RawField) -> Result<FieldDescriptor> {
    match (raw.scalar, raw.object, raw.list) {
        (Some(scalar), None, None) => Ok(FieldDescriptor::scalar(
            raw.name.clone(),
            parse_scalar_type(&scalar, &raw.name),
        )),
        (None, Some(object), None) => Ok(FieldDescriptor::object(raw.name, object)),
        (None, None, Some(list)) => Ok(FieldDescriptor::list(raw.name, list)),
        _ => bail!(
            "field '{}' must carry exactly one of 'type', 'object' or 'list'",
            raw.name
        ),
    }
}

/// Scalar type names as the schema source spells them. Unknown names degrade
/// to text so a drifted schema keeps rendering rather than erroring.
fn parse_scalar_type(name: &str, field_name: &str) -> ScalarType {
    match name {
        "text" | "string" => ScalarType::Text,
        "integer" | "int" => ScalarType::Integer,
        "float" | "number" | "numeric" | "decimal" => ScalarType::Float,
        "boolean" | "bool" => ScalarType::Boolean,
        "date" => ScalarType::Date,
        "datetime" | "timestamp" => ScalarType::DateTime,
        "time" => ScalarType::Time,
        "enum" | "select" => ScalarType::Enum,
        "enumset" | "multiselect" => ScalarType::EnumSet,
        "attribute" => ScalarType::Attribute,
        "email" => ScalarType::Email,
        "id" => ScalarType::Id,
        other => {
            debug!(
                field = field_name,
                scalar = other,
                "unknown scalar type name, treating as text"
            );
            ScalarType::Text
        }
    }
}

impl SchemaSource for SchemaSnapshot {
    fn resolve_type(&self, type_name: &str) -> Option<Vec<FieldDescriptor>> {
        self.types.get(type_name).cloned()
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Read-only view over a schema source with per-type caching of resolved and
/// flattened field lists.
///
/// Cached lists are derived fresh whenever the source's version changes and
/// are otherwise shared (`Arc`) with callers. Each widget holds a reference
/// to one catalog; the catalog itself never mutates schema data.
pub struct TypeCatalog {
    source: Arc<dyn SchemaSource>,
    cache: RwLock<CatalogCache>,
}

#[derive(Default)]
struct CatalogCache {
    seen_version: u64,
    resolved: HashMap<String, Arc<Vec<FieldDescriptor>>>,
    flattened: HashMap<String, Arc<Vec<FieldDescriptor>>>,
}

impl TypeCatalog {
    pub fn new(source: Arc<dyn SchemaSource>) -> Self {
        let cache = CatalogCache {
            seen_version: source.version(),
            ..CatalogCache::default()
        };
        Self {
            source,
            cache: RwLock::new(cache),
        }
    }

    /// Fields of the named type. Unknown types yield an empty list so the
    /// caller can degrade gracefully instead of failing the widget.
    pub fn resolve_type(&self, type_name: &str) -> Arc<Vec<FieldDescriptor>> {
        self.invalidate_if_stale();

        if let Some(hit) = self.cache.read().ok().and_then(|c| {
            c.resolved.get(type_name).cloned()
        }) {
            return hit;
        }

        let fields = match self.source.resolve_type(type_name) {
            Some(fields) => Arc::new(fields),
            None => {
                debug!(type_name, "unresolved type, substituting empty field list");
                Arc::new(Vec::new())
            }
        };

        if let Ok(mut cache) = self.cache.write() {
            cache
                .resolved
                .insert(type_name.to_string(), Arc::clone(&fields));
        }
        fields
    }

    /// Flattened (dotted-path) field list of the named type, cached per type
    /// name until the schema version bumps.
    pub fn flattened(&self, type_name: &str) -> Arc<Vec<FieldDescriptor>> {
        self.invalidate_if_stale();

        if let Some(hit) = self.cache.read().ok().and_then(|c| {
            c.flattened.get(type_name).cloned()
        }) {
            return hit;
        }

        let fields = Arc::new(flatten_type(self, type_name));
        if let Ok(mut cache) = self.cache.write() {
            cache
                .flattened
                .insert(type_name.to_string(), Arc::clone(&fields));
        }
        fields
    }

    /// Resolved editor kind of a field; `None` for object/list containers.
    pub fn editor_kind(field: &FieldDescriptor) -> Option<EditorKind> {
        field.editor_kind()
    }

    fn invalidate_if_stale(&self) {
        let current = self.source.version();
        let stale = self
            .cache
            .read()
            .map(|c| c.seen_version != current)
            .unwrap_or(false);
        if stale {
            if let Ok(mut cache) = self.cache.write() {
                debug!(version = current, "schema version bump, clearing catalog");
                cache.resolved.clear();
                cache.flattened.clear();
                cache.seen_version = current;
            }
        }
    }
}
