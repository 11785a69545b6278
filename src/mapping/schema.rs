//! Static field-descriptor tables
//!
//! Each mapped type declares its fields once, through [`SchemaBuilder`], as a
//! table of `{name, kind, required, getter}` entries. The codec walks this
//! table instead of inspecting values at runtime.
//!
//! ```ignore
//! impl Mapped for Task {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: LazyLock<Schema<Task>> = LazyLock::new(|| {
//!             Schema::<Task>::builder("Task")
//!                 .text("title", |t| t.title.clone().into())
//!                 .required()
//!                 .bool("done", |t| t.done.into())
//!                 .build()
//!         });
//!         &SCHEMA
//!     }
//!     // ...
//! }
//! ```

use std::marker::PhantomData;

use super::fields::{FieldSet, FieldValue};
use super::Mapped;

/// Record type tag and field table of an embedded type
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub record_type: &'static str,
    pub specs: &'static [FieldSpec],
}

/// Deferred [`Layout`] lookup, so schemas can name each other without naming the type
pub type LayoutFn = fn() -> Layout;

/// Reads one field out of a value
pub type Getter<T> = fn(&T) -> FieldValue;

/// Declared kind of a field
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Bool,
    Int,
    Double,
    Text,
    Date,
    /// Byte blob, staged as an asset
    Bytes,
    /// Content read from a local path at encode time, staged as an asset
    File,
    /// Pointer to another record, stored as a reference and never resolved
    Link,
    /// Single embedded record, stored as a cascading reference
    Embedded(LayoutFn),
    /// List of embedded records, stored as a list of cascading references
    EmbeddedList(LayoutFn),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Double => "double",
            FieldKind::Text => "text",
            FieldKind::Date => "date",
            FieldKind::Bytes => "bytes",
            FieldKind::File => "file",
            FieldKind::Link => "link",
            FieldKind::Embedded(_) => "embedded",
            FieldKind::EmbeddedList(_) => "embedded_list",
        }
    }

    /// Whether a getter value is convertible under this kind. Null always is.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (_, FieldValue::Null)
                | (FieldKind::Bool, FieldValue::Bool(_))
                | (FieldKind::Int, FieldValue::Int(_))
                | (FieldKind::Double, FieldValue::Double(_))
                | (FieldKind::Text, FieldValue::Text(_))
                | (FieldKind::Date, FieldValue::Date(_))
                | (FieldKind::Bytes, FieldValue::Bytes(_))
                | (FieldKind::File, FieldValue::File(_))
                | (FieldKind::Link, FieldValue::Link(_))
                | (FieldKind::Embedded(_), FieldValue::Embedded(_))
                | (FieldKind::EmbeddedList(_), FieldValue::EmbeddedList(_))
        )
    }
}

/// Declaration of one field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Decoding fails if a required field is absent or mistyped
    pub required: bool,
}

/// Field table of a mapped type
pub struct Schema<T> {
    record_type: &'static str,
    specs: Vec<FieldSpec>,
    getters: Vec<Getter<T>>,
}

impl<T: Mapped> Schema<T> {
    pub fn builder(record_type: &'static str) -> SchemaBuilder<T> {
        SchemaBuilder {
            record_type,
            specs: Vec::new(),
            getters: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn record_type(&self) -> &'static str {
        self.record_type
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// Read every declared field of `item`, in declaration order
    pub fn extract(&self, item: &T) -> FieldSet {
        let mut fields = FieldSet::new(self.record_type, item.record_id());
        for (spec, getter) in self.specs.iter().zip(&self.getters) {
            fields.insert(spec.name, getter(item));
        }
        fields
    }
}

/// Layout of `M`
pub fn layout_of<M: Mapped>() -> Layout {
    let schema = M::schema();
    Layout {
        record_type: schema.record_type(),
        specs: schema.specs(),
    }
}

/// Builder for [`Schema`]
pub struct SchemaBuilder<T> {
    record_type: &'static str,
    specs: Vec<FieldSpec>,
    getters: Vec<Getter<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Mapped> SchemaBuilder<T> {
    /// Declare a field. Redeclaring a name replaces the earlier entry.
    pub fn field(mut self, name: &'static str, kind: FieldKind, getter: Getter<T>) -> Self {
        let spec = FieldSpec {
            name,
            kind,
            required: false,
        };
        if let Some(pos) = self.specs.iter().position(|s| s.name == name) {
            self.specs[pos] = spec;
            self.getters[pos] = getter;
        } else {
            self.specs.push(spec);
            self.getters.push(getter);
        }
        self
    }

    /// Mark the most recently declared field as required
    pub fn required(mut self) -> Self {
        if let Some(last) = self.specs.last_mut() {
            last.required = true;
        }
        self
    }

    pub fn bool(self, name: &'static str, getter: Getter<T>) -> Self {
        self.field(name, FieldKind::Bool, getter)
    }

    pub fn int(self, name: &'static str, getter: Getter<T>) -> Self {
        self.field(name, FieldKind::Int, getter)
    }

    pub fn double(self, name: &'static str, getter: Getter<T>) -> Self {
        self.field(name, FieldKind::Double, getter)
    }

    pub fn text(self, name: &'static str, getter: Getter<T>) -> Self {
        self.field(name, FieldKind::Text, getter)
    }

    pub fn date(self, name: &'static str, getter: Getter<T>) -> Self {
        self.field(name, FieldKind::Date, getter)
    }

    pub fn bytes(self, name: &'static str, getter: Getter<T>) -> Self {
        self.field(name, FieldKind::Bytes, getter)
    }

    pub fn file(self, name: &'static str, getter: Getter<T>) -> Self {
        self.field(name, FieldKind::File, getter)
    }

    pub fn link(self, name: &'static str, getter: Getter<T>) -> Self {
        self.field(name, FieldKind::Link, getter)
    }

    pub fn embedded<M: Mapped>(self, name: &'static str, getter: Getter<T>) -> Self {
        self.field(name, FieldKind::Embedded(layout_of::<M>), getter)
    }

    pub fn embedded_list<M: Mapped>(self, name: &'static str, getter: Getter<T>) -> Self {
        self.field(name, FieldKind::EmbeddedList(layout_of::<M>), getter)
    }

    pub fn build(self) -> Schema<T> {
        Schema {
            record_type: self.record_type,
            specs: self.specs,
            getters: self.getters,
        }
    }
}
