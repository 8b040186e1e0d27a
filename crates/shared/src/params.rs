//! Runtime support for generated statement parameter objects.
//!
//! A parameter object is an immutable bag of values bound to one fixed,
//! predeclared statement. Shapes are declared as plain structs and expanded by
//! `#[derive(StatementParams)]` from `shared-macros`, which generates the
//! accessors, a by-value builder and the binding list on top of the types in
//! this module.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CommonError;

/// An optional repeated field.
///
/// `Unset` means the builder never touched the field and the consumer should
/// drop the corresponding predicate. `Set` holds the accumulated items, which
/// may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Repeated<T> {
    Unset,
    Set(Vec<T>),
}

impl<T> Default for Repeated<T> {
    fn default() -> Self {
        Repeated::Unset
    }
}

impl<T> Repeated<T> {
    /// Appends one item, allocating the sequence first when unset.
    pub fn push(&mut self, item: T) {
        match self {
            Repeated::Set(items) => items.push(item),
            Repeated::Unset => *self = Repeated::Set(vec![item]),
        }
    }

    /// Appends every item in iteration order. An unset field becomes present
    /// even when `items` is empty.
    pub fn extend<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        match self {
            Repeated::Set(existing) => existing.extend(items),
            Repeated::Unset => *self = Repeated::Set(items.into_iter().collect()),
        }
    }

    /// Empties a present sequence in place. Never turns `Unset` into `Set`.
    pub fn clear(&mut self) {
        if let Repeated::Set(items) = self {
            items.clear();
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Repeated::Set(_))
    }

    pub fn as_slice(&self) -> Option<&[T]> {
        match self {
            Repeated::Unset => None,
            Repeated::Set(items) => Some(items.as_slice()),
        }
    }

    /// Number of items; zero for both `Unset` and an empty `Set`.
    pub fn len(&self) -> usize {
        self.as_slice().map_or(0, <[T]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().unwrap_or_default().iter()
    }

    pub fn into_option(self) -> Option<Vec<T>> {
        match self {
            Repeated::Unset => None,
            Repeated::Set(items) => Some(items),
        }
    }
}

impl<T: ToBoundValue> Repeated<T> {
    /// `Omitted` when unset, otherwise a (possibly empty) `List`.
    pub fn bound_value(&self) -> BoundValue {
        match self {
            Repeated::Unset => BoundValue::Omitted,
            Repeated::Set(items) => {
                BoundValue::List(items.iter().map(ToBoundValue::to_bound_value).collect())
            }
        }
    }
}

impl<T> From<Vec<T>> for Repeated<T> {
    fn from(items: Vec<T>) -> Self {
        Repeated::Set(items)
    }
}

impl<T> From<Option<Vec<T>>> for Repeated<T> {
    fn from(items: Option<Vec<T>>) -> Self {
        match items {
            Some(items) => Repeated::Set(items),
            None => Repeated::Unset,
        }
    }
}

impl<T> From<Repeated<T>> for Option<Vec<T>> {
    fn from(repeated: Repeated<T>) -> Self {
        repeated.into_option()
    }
}

impl<T: Serialize> Serialize for Repeated<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_slice().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Repeated<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Vec<T>>::deserialize(deserializer).map(Repeated::from)
    }
}

/// The shape of a single bound value, as seen by the execution layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Integer,
    Boolean,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldKind {
    Required(ValueKind),
    Repeated(ValueKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn required(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind: FieldKind::Required(kind),
        }
    }

    pub const fn repeated(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind: FieldKind::Repeated(kind),
        }
    }

    pub const fn is_repeated(&self) -> bool {
        matches!(self.kind, FieldKind::Repeated(_))
    }
}

/// A value ready to be handed to a prepared statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundValue {
    Null,
    Text(String),
    Integer(i64),
    Boolean(bool),
    /// Enum values are bound by label.
    Enum(&'static str),
    List(Vec<BoundValue>),
    /// A repeated field that was never set; the predicate should be dropped.
    Omitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Binding {
    pub name: &'static str,
    pub value: BoundValue,
}

impl Binding {
    pub fn new(name: &'static str, value: BoundValue) -> Self {
        Self { name, value }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self.value, BoundValue::Omitted)
    }
}

/// Conversion of a field value into its bound representation.
pub trait ToBoundValue {
    const KIND: ValueKind;

    fn to_bound_value(&self) -> BoundValue;
}

impl ToBoundValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn to_bound_value(&self) -> BoundValue {
        BoundValue::Text(self.clone())
    }
}

impl ToBoundValue for i32 {
    const KIND: ValueKind = ValueKind::Integer;

    fn to_bound_value(&self) -> BoundValue {
        BoundValue::Integer(i64::from(*self))
    }
}

impl ToBoundValue for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn to_bound_value(&self) -> BoundValue {
        BoundValue::Integer(*self)
    }
}

impl ToBoundValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn to_bound_value(&self) -> BoundValue {
        BoundValue::Boolean(*self)
    }
}

impl<T: ToBoundValue> ToBoundValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn to_bound_value(&self) -> BoundValue {
        match self {
            Some(value) => value.to_bound_value(),
            None => BoundValue::Null,
        }
    }
}

/// Implemented by `#[derive(StatementParams)]`.
pub trait StatementParams: Sized {
    type Builder: Default;

    /// Type name of the shape.
    const NAME: &'static str;

    /// Field descriptors in declaration order.
    const FIELDS: &'static [FieldDescriptor];

    fn builder() -> Self::Builder {
        <Self::Builder as Default>::default()
    }

    /// One binding per field, in declaration order.
    fn bindings(&self) -> Vec<Binding>;

    /// Bindings with omitted repeated fields filtered out.
    fn present_bindings(&self) -> Vec<Binding> {
        self.bindings()
            .into_iter()
            .filter(|binding| !binding.is_omitted())
            .collect()
    }

    fn binding(&self, name: &str) -> Result<Binding, CommonError> {
        self.bindings()
            .into_iter()
            .find(|binding| binding.name == name)
            .ok_or_else(|| CommonError::NotFound {
                msg: format!("{} has no field named '{name}'", Self::NAME),
                lookup_id: name.to_string(),
                source: None,
            })
    }
}
