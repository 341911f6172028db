//! Answer writing: deposit a dynamically typed [`Answer`] into a caller-owned
//! destination.
//!
//! Every destination describes itself with a single [`Shape`], resolved once per
//! write and dispatched exhaustively. Types that want full control implement
//! [`Settable`]; that capability is checked before any structural dispatch.
//!
//! Writes are not atomic across nested structures. When a sequence or record
//! write fails partway through, elements written before the failure keep their
//! new values.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::str::FromStr;
use std::time::Duration;

use crate::core::answer::{Answer, OptionAnswer};
use crate::core::duration::parse_duration;
use crate::error::{ConversionError, ParseBoolError, WriteError};

/// Capability for destinations that handle answer writes themselves.
pub trait Settable {
    fn write_answer(&mut self, name: &str, value: Answer) -> Result<(), WriteError>;
}

/// A value answers can be written into.
pub trait Destination {
    fn shape(&mut self) -> Shape<'_>;

    /// Whether answers can be recorded here at all. Unlike [`Destination::shape`]
    /// this never touches the destination.
    fn is_addressable(&self) -> bool {
        true
    }
}

/// Closed set of destination shapes understood by [`write_answer`].
pub enum Shape<'a> {
    /// No backing storage; nothing can be written.
    Unaddressable,
    Settable(&'a mut dyn Settable),
    Scalar(ScalarSlot<'a>),
    Mapping(&'a mut dyn MappingSlot),
    Sequence(&'a mut dyn SequenceSlot),
    Record(&'a mut dyn Record),
}

pub enum ScalarSlot<'a> {
    Bool(&'a mut bool),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Duration(&'a mut Duration),
    String(&'a mut String),
    OptionAnswer(&'a mut OptionAnswer),
    /// Stores any answer verbatim.
    Answer(&'a mut Answer),
}

pub trait MappingSlot {
    /// Whether keys can be built from a question name.
    fn has_string_keys(&self) -> bool;

    fn insert_answer(&mut self, key: &str, value: Answer) -> Result<(), WriteError>;
}

pub trait SequenceSlot {
    /// `Some(len)` for fixed-length destinations.
    fn fixed_len(&self) -> Option<usize>;

    /// Prepare the sequence to receive `len` elements.
    fn reset(&mut self, len: usize);

    fn element(&mut self, index: usize) -> Option<&mut dyn Destination>;
}

/// Field metadata for [`Record`] destinations, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    /// Explicit answer name override; wins over `name`.
    pub tag: Option<&'static str>,
}

/// Struct-like destination. Implement it with [`record!`](crate::record).
pub trait Record {
    fn fields(&self) -> &'static [FieldInfo];

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Destination>;
}

/// Map key types that can (or cannot) be built from a question name.
pub trait MapKey: Sized {
    fn from_name(name: &str) -> Option<Self>;
}

/// Write `value` into `target`, using `field` to pick a map key or record field.
pub fn write_answer(
    target: &mut dyn Destination,
    field: &str,
    value: Answer,
) -> Result<(), WriteError> {
    match target.shape() {
        Shape::Unaddressable => Err(WriteError::NeedsPointer),
        Shape::Settable(settable) => settable.write_answer(field, value),
        Shape::Scalar(slot) => slot.assign(value),
        Shape::Mapping(map) => {
            if !map.has_string_keys() {
                return Err(WriteError::MapType);
            }
            if field.is_empty() {
                return Err(WriteError::FieldNotMatch {
                    name: String::new(),
                });
            }
            map.insert_answer(field, value)
        }
        Shape::Sequence(sequence) => write_sequence(sequence, field, value),
        Shape::Record(record) => {
            let index = find_field_index(record.fields(), field)?;
            let slot = record
                .field_mut(index)
                .ok_or_else(|| WriteError::FieldNotMatch {
                    name: field.to_string(),
                })?;
            write_answer(slot, field, value)
        }
    }
}

/// Resolve an answer name to a field index.
///
/// Tags are matched first across all fields, then literal field names; both
/// comparisons ignore case and the first match in declaration order wins.
pub fn find_field_index(fields: &[FieldInfo], name: &str) -> Result<usize, WriteError> {
    let not_found = || WriteError::FieldNotMatch {
        name: name.to_string(),
    };
    if name.is_empty() {
        return Err(not_found());
    }

    let wanted = name.to_lowercase();
    fields
        .iter()
        .position(|field| {
            field
                .tag
                .is_some_and(|tag| !tag.is_empty() && tag.to_lowercase() == wanted)
        })
        .or_else(|| {
            fields
                .iter()
                .position(|field| field.name.to_lowercase() == wanted)
        })
        .ok_or_else(not_found)
}

fn write_sequence(
    sequence: &mut dyn SequenceSlot,
    field: &str,
    value: Answer,
) -> Result<(), WriteError> {
    let values = match value {
        Answer::List(values) => values,
        other => return Err(unsupported("sequence", &other)),
    };

    if let Some(expected) = sequence.fixed_len() {
        if expected != values.len() {
            return Err(WriteError::LengthMismatch {
                expected,
                found: values.len(),
            });
        }
    }

    let found = values.len();
    sequence.reset(found);
    for (index, value) in values.into_iter().enumerate() {
        let element = sequence
            .element(index)
            .ok_or(WriteError::LengthMismatch {
                expected: index,
                found,
            })?;
        write_answer(element, field, value)?;
    }
    Ok(())
}

fn unsupported(target: &'static str, value: &Answer) -> WriteError {
    WriteError::UnsupportedType {
        target,
        value: value.kind(),
    }
}

fn conversion(
    target: &'static str,
    input: impl Into<String>,
    source: impl Into<ConversionError>,
) -> WriteError {
    WriteError::Conversion {
        target,
        input: input.into(),
        source: source.into(),
    }
}

/// Boolean literal grammar: `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(literal: &str) -> Result<bool, ParseBoolError> {
    match literal {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseBoolError {
            literal: literal.to_string(),
        }),
    }
}

fn assign_int<T>(slot: &mut T, target: &'static str, value: Answer) -> Result<(), WriteError>
where
    T: FromStr<Err = std::num::ParseIntError> + TryFrom<i64> + TryFrom<u64>,
{
    let out_of_range = |input: String| conversion(target, input, ConversionError::OutOfRange);
    *slot = match value {
        Answer::Int(v) => T::try_from(v).map_err(|_| out_of_range(v.to_string()))?,
        Answer::Uint(v) => T::try_from(v).map_err(|_| out_of_range(v.to_string()))?,
        Answer::Option(option) => u64::try_from(option.index)
            .ok()
            .and_then(|index| T::try_from(index).ok())
            .ok_or_else(|| out_of_range(option.index.to_string()))?,
        Answer::String(text) => match text.parse() {
            Ok(parsed) => parsed,
            Err(source) => return Err(conversion(target, text, source)),
        },
        other => return Err(unsupported(target, &other)),
    };
    Ok(())
}

fn float_from(target: &'static str, value: Answer) -> Result<f64, WriteError> {
    match value {
        Answer::Float(v) => Ok(v),
        Answer::Int(v) => Ok(v as f64),
        Answer::Uint(v) => Ok(v as f64),
        Answer::String(text) => match text.parse::<f64>() {
            Ok(parsed) => Ok(parsed),
            Err(source) => Err(conversion(target, text, source)),
        },
        other => Err(unsupported(target, &other)),
    }
}

impl ScalarSlot<'_> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::Isize(_) => "isize",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::Usize(_) => "usize",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Duration(_) => "Duration",
            Self::String(_) => "String",
            Self::OptionAnswer(_) => "OptionAnswer",
            Self::Answer(_) => "Answer",
        }
    }

    pub fn assign(self, value: Answer) -> Result<(), WriteError> {
        let target = self.type_name();
        match self {
            Self::Bool(slot) => {
                *slot = match value {
                    Answer::Bool(v) => v,
                    Answer::String(text) => match parse_bool(&text) {
                        Ok(parsed) => parsed,
                        Err(source) => return Err(conversion(target, text, source)),
                    },
                    other => return Err(unsupported(target, &other)),
                };
                Ok(())
            }
            Self::I8(slot) => assign_int(slot, target, value),
            Self::I16(slot) => assign_int(slot, target, value),
            Self::I32(slot) => assign_int(slot, target, value),
            Self::I64(slot) => assign_int(slot, target, value),
            Self::Isize(slot) => assign_int(slot, target, value),
            Self::U8(slot) => assign_int(slot, target, value),
            Self::U16(slot) => assign_int(slot, target, value),
            Self::U32(slot) => assign_int(slot, target, value),
            Self::U64(slot) => assign_int(slot, target, value),
            Self::Usize(slot) => assign_int(slot, target, value),
            Self::F32(slot) => {
                *slot = match value {
                    Answer::Float(v) => v as f32,
                    Answer::String(text) => match text.parse::<f32>() {
                        Ok(parsed) => parsed,
                        Err(source) => return Err(conversion(target, text, source)),
                    },
                    other => float_from(target, other)? as f32,
                };
                Ok(())
            }
            Self::F64(slot) => {
                *slot = float_from(target, value)?;
                Ok(())
            }
            Self::Duration(slot) => {
                *slot = match value {
                    Answer::Duration(v) => v,
                    Answer::Int(nanos) if nanos >= 0 => Duration::from_nanos(nanos as u64),
                    Answer::Uint(nanos) => Duration::from_nanos(nanos),
                    Answer::String(text) => match parse_duration(&text) {
                        Ok(parsed) => parsed,
                        Err(source) => return Err(conversion(target, text, source)),
                    },
                    other => return Err(unsupported(target, &other)),
                };
                Ok(())
            }
            Self::String(slot) => {
                *slot = match value {
                    Answer::String(v) => v,
                    Answer::Option(option) => option.value,
                    other => return Err(unsupported(target, &other)),
                };
                Ok(())
            }
            Self::OptionAnswer(slot) => {
                *slot = match value {
                    Answer::Option(option) => option,
                    other => return Err(unsupported(target, &other)),
                };
                Ok(())
            }
            Self::Answer(slot) => {
                *slot = value;
                Ok(())
            }
        }
    }
}

macro_rules! scalar_destination {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl Destination for $ty {
                fn shape(&mut self) -> Shape<'_> {
                    Shape::Scalar(ScalarSlot::$variant(self))
                }
            }
        )+
    };
}

scalar_destination! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    Duration => Duration,
    String => String,
    OptionAnswer => OptionAnswer,
    Answer => Answer,
}

impl Destination for () {
    fn shape(&mut self) -> Shape<'_> {
        Shape::Unaddressable
    }

    fn is_addressable(&self) -> bool {
        false
    }
}

impl<T: Destination + Default> Destination for Option<T> {
    fn shape(&mut self) -> Shape<'_> {
        self.get_or_insert_with(T::default).shape()
    }

    fn is_addressable(&self) -> bool {
        match self {
            Some(inner) => inner.is_addressable(),
            None => T::default().is_addressable(),
        }
    }
}

impl<T: Destination + ?Sized> Destination for Box<T> {
    fn shape(&mut self) -> Shape<'_> {
        (**self).shape()
    }

    fn is_addressable(&self) -> bool {
        (**self).is_addressable()
    }
}

impl<T: Destination + Default> SequenceSlot for Vec<T> {
    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn reset(&mut self, len: usize) {
        self.clear();
        self.resize_with(len, T::default);
    }

    fn element(&mut self, index: usize) -> Option<&mut dyn Destination> {
        self.get_mut(index).map(|item| item as &mut dyn Destination)
    }
}

impl<T: Destination + Default> Destination for Vec<T> {
    fn shape(&mut self) -> Shape<'_> {
        Shape::Sequence(self)
    }
}

impl<T: Destination, const N: usize> SequenceSlot for [T; N] {
    fn fixed_len(&self) -> Option<usize> {
        Some(N)
    }

    fn reset(&mut self, _len: usize) {}

    fn element(&mut self, index: usize) -> Option<&mut dyn Destination> {
        self.get_mut(index).map(|item| item as &mut dyn Destination)
    }
}

impl<T: Destination, const N: usize> Destination for [T; N] {
    fn shape(&mut self) -> Shape<'_> {
        Shape::Sequence(self)
    }
}

impl MapKey for String {
    fn from_name(name: &str) -> Option<Self> {
        Some(name.to_string())
    }
}

impl MapKey for Box<str> {
    fn from_name(name: &str) -> Option<Self> {
        Some(name.into())
    }
}

macro_rules! non_string_map_key {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl MapKey for $ty {
                fn from_name(_name: &str) -> Option<Self> {
                    None
                }
            }
        )+
    };
}

non_string_map_key!(bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

fn fresh_value<V: Destination + Default>(key: &str, value: Answer) -> Result<V, WriteError> {
    let mut slot = V::default();
    write_answer(&mut slot, key, value)?;
    Ok(slot)
}

impl<K, V, S> MappingSlot for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Destination + Default,
    S: BuildHasher,
{
    fn has_string_keys(&self) -> bool {
        K::from_name("").is_some()
    }

    fn insert_answer(&mut self, key: &str, value: Answer) -> Result<(), WriteError> {
        let map_key = K::from_name(key).ok_or(WriteError::MapType)?;
        let slot = fresh_value(key, value)?;
        self.insert(map_key, slot);
        Ok(())
    }
}

impl<K, V, S> Destination for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Destination + Default,
    S: BuildHasher,
{
    fn shape(&mut self) -> Shape<'_> {
        Shape::Mapping(self)
    }
}

impl<K, V> MappingSlot for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Destination + Default,
{
    fn has_string_keys(&self) -> bool {
        K::from_name("").is_some()
    }

    fn insert_answer(&mut self, key: &str, value: Answer) -> Result<(), WriteError> {
        let map_key = K::from_name(key).ok_or(WriteError::MapType)?;
        let slot = fresh_value(key, value)?;
        self.insert(map_key, slot);
        Ok(())
    }
}

impl<K, V> Destination for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Destination + Default,
{
    fn shape(&mut self) -> Shape<'_> {
        Shape::Mapping(self)
    }
}

/// Implement [`Record`] and [`Destination`] for a struct.
///
/// ```
/// use tape_survey::record;
///
/// #[derive(Default)]
/// struct Profile {
///     name: String,
///     username: String,
///     age: u32,
/// }
///
/// record!(Profile { name, username = "login", age });
/// ```
#[macro_export]
macro_rules! record {
    (@tag) => {
        None
    };
    (@tag $tag:literal) => {
        Some($tag)
    };
    ($ty:ty { $($field:ident $(= $tag:literal)?),* $(,)? }) => {
        impl $crate::core::write::Record for $ty {
            fn fields(&self) -> &'static [$crate::core::write::FieldInfo] {
                const FIELDS: &[$crate::core::write::FieldInfo] = &[
                    $(
                        $crate::core::write::FieldInfo {
                            name: stringify!($field),
                            tag: $crate::record!(@tag $($tag)?),
                        }
                    ),*
                ];
                FIELDS
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> Option<&mut dyn $crate::core::write::Destination> {
                let fields: Vec<&mut dyn $crate::core::write::Destination> = vec![
                    $(&mut self.$field as &mut dyn $crate::core::write::Destination),*
                ];
                fields.into_iter().nth(index)
            }
        }

        impl $crate::core::write::Destination for $ty {
            fn shape(&mut self) -> $crate::core::write::Shape<'_> {
                $crate::core::write::Shape::Record(self)
            }
        }
    };
}

/// Implement [`Destination`] for types that implement [`Settable`].
#[macro_export]
macro_rules! settable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::core::write::Destination for $ty {
                fn shape(&mut self) -> $crate::core::write::Shape<'_> {
                    $crate::core::write::Shape::Settable(self)
                }
            }
        )+
    };
}
