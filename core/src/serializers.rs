//! # Serializer Introspection
//!
//! Describes the input fields a view's serializer declares, and maps each
//! field kind onto the primitive type names used in schema fields.

/// Kinds of serializer field, mirroring the field class hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Char,
    /// Text validated as an email address.
    Email,
    /// Text restricted to slug characters.
    Slug,
    /// Text validated as a URL.
    Url,
    /// A UUID rendered as text.
    Uuid,
    /// Whole number.
    Integer,
    /// Floating point number.
    Float,
    /// Fixed precision decimal.
    Decimal,
    /// True / false.
    Boolean,
    /// True / false / null.
    NullBoolean,
    /// Calendar date.
    Date,
    /// Date and time.
    DateTime,
    /// Time of day.
    Time,
    /// Time span.
    Duration,
    /// One value from a fixed set.
    Choice,
    /// Several values from a fixed set.
    MultipleChoice,
    /// Uploaded file.
    File,
    /// Uploaded image.
    Image,
    /// Reference to a related object by primary key.
    PrimaryKeyRelated,
    /// Several references to related objects.
    ManyRelated,
    /// Value supplied by the server, never by clients.
    Hidden,
    /// Output-only value.
    ReadOnly,
    /// Output-only value computed by a method.
    SerializerMethod,
    /// Homogeneous list of values.
    List,
    /// Mapping of values.
    Dict,
    /// Arbitrary JSON.
    Json,
    /// A nested serializer.
    Nested(Box<Serializer>),
}

/// One declared serializer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerField {
    /// Declared name.
    pub name: String,
    /// Attribute the field reads from; the schema exposes this name.
    pub source: String,
    /// Field kind.
    pub kind: FieldKind,
    /// Output-only flag.
    pub read_only: bool,
    /// Whether input must include the field.
    pub required: bool,
    /// Help text shown as the field description.
    pub help_text: Option<String>,
}

impl SerializerField {
    /// A required, writable field whose source is its name.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        let read_only = matches!(kind, FieldKind::ReadOnly | FieldKind::SerializerMethod);
        Self {
            source: name.clone(),
            name,
            required: !read_only,
            read_only,
            kind,
            help_text: None,
        }
    }

    /// Marks the field output-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.required = false;
        self
    }

    /// Sets the `required` flag.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the help text.
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Sets the source attribute.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Hidden fields are never client supplied.
    pub fn is_hidden(&self) -> bool {
        self.kind == FieldKind::Hidden
    }
}

/// A serializer, as returned by a view's serializer hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Serializer {
    /// A composite of named fields.
    Composite {
        /// Serializer name.
        name: String,
        /// Declared fields, in order.
        fields: Vec<SerializerField>,
    },
    /// A list of child items (`many=True`).
    List {
        /// Serializer applied to each item.
        child: Box<Serializer>,
    },
}

impl Serializer {
    /// A composite serializer.
    pub fn composite(name: impl Into<String>, fields: Vec<SerializerField>) -> Self {
        Serializer::Composite {
            name: name.into(),
            fields,
        }
    }

    /// Wraps this serializer as a list serializer.
    pub fn many(self) -> Self {
        Serializer::List {
            child: Box::new(self),
        }
    }
}

type TypeRule = (fn(&FieldKind) -> bool, &'static str);

/// Ordered type rules, most derived kind first. The first matching rule wins;
/// anything unmatched is a `string`.
const TYPE_RULES: &[TypeRule] = &[
    (
        |k| matches!(k, FieldKind::Nested(s) if matches!(**s, Serializer::List { .. })),
        "array",
    ),
    (
        |k| matches!(k, FieldKind::Nested(s) if matches!(**s, Serializer::Composite { .. })),
        "object",
    ),
    (|k| matches!(k, FieldKind::ManyRelated), "array"),
    (|k| matches!(k, FieldKind::MultipleChoice), "array"),
    (|k| matches!(k, FieldKind::File | FieldKind::Image), "file"),
    (|k| matches!(k, FieldKind::Boolean), "boolean"),
    (|k| matches!(k, FieldKind::Decimal), "number"),
    (|k| matches!(k, FieldKind::Float), "number"),
    (|k| matches!(k, FieldKind::Integer), "integer"),
];

/// Primitive schema type name for a field kind.
pub fn schema_type(kind: &FieldKind) -> &'static str {
    TYPE_RULES
        .iter()
        .find(|(matches, _)| matches(kind))
        .map(|(_, name)| *name)
        .unwrap_or("string")
}
