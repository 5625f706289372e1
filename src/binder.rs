//! Binders: per-source, per-name handles that produce typed bindings
//!
//! Each value family has its own capability trait so a source can support a
//! subset of them, and field constructors depend only on the capability they
//! need. [`Binder`] is the built-in implementation shared by every source in
//! [`crate::sources`]; it supports all of them.

pub mod convert;
pub(crate) mod lookup;

use crate::binding::{Binding, Origin, DEFAULT_BOUND_NAME};
use crate::dest::Dest;
use crate::error::{BindError, BindValueError, BoxError, ConvertError};
use crate::source::SourceRef;
use convert::IntWidth;
use lookup::Lookup;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A raw value as a source holds it, before conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Flat text (environment variables, CLI arguments).
    Text(String),
    /// Structured data (JSON, TOML, maps, defaults).
    Structured(Value),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(text) => f.write_str(text),
            RawValue::Structured(value) => write!(f, "{}", value),
        }
    }
}

/// Generic text-decoding capability.
///
/// Implemented for every `Dest<T>` where `T: FromStr`, so application types
/// only need a `FromStr` impl to ride the text-based bindings.
pub trait TextDecodable: Send {
    fn decode_text(&mut self, text: &str) -> Result<(), BoxError>;
}

impl<T> TextDecodable for Dest<T>
where
    T: FromStr + Send,
    T::Err: fmt::Display,
{
    fn decode_text(&mut self, text: &str) -> Result<(), BoxError> {
        let value = text.parse::<T>().map_err(|e| e.to_string())?;
        self.set(value);
        Ok(())
    }
}

/// Resolved collection behind an array binding.
///
/// Elements stay raw until one of their bindings is applied.
pub trait ArrayAccess: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Binder for element `index`, named `name[index]`.
    fn element(&self, index: usize) -> Result<Box<dyn ValueBinder>, BindError>;
}

/// Output slot of [`ArrayBinder::bind_array_to`].
pub type ArraySlot = Dest<Option<Box<dyn ArrayAccess>>>;

/// Callback driven by [`CustomBinder::bind_custom_to`].
pub type CustomDecoder = Box<dyn FnMut(RawValue) -> Result<(), BindError> + Send>;

pub trait StringBinder {
    fn bind_string_to(&self, dest: Dest<String>) -> Binding;
}

pub trait IntBinder {
    /// Parse as `i64`, then range-check against `width` before storing.
    fn bind_int_to(&self, dest: Dest<i64>, width: IntWidth) -> Binding;
}

pub trait UintBinder {
    /// Parse as `u64`, then range-check against `width` before storing.
    fn bind_uint_to(&self, dest: Dest<u64>, width: IntWidth) -> Binding;
}

pub trait FloatBinder {
    fn bind_float_to(&self, dest: Dest<f64>) -> Binding;
}

pub trait BoolBinder {
    fn bind_bool_to(&self, dest: Dest<bool>) -> Binding;
}

pub trait TextBinder {
    fn bind_text_to(&self, dest: Box<dyn TextDecodable>) -> Binding;
}

pub trait ArrayBinder {
    /// On apply, resolves the collection and stores its accessor in `dest`.
    fn bind_array_to(&self, dest: ArraySlot) -> Binding;
}

/// Escape hatch for types that need fully custom decoding.
pub trait CustomBinder {
    fn bind_custom_to(&self, decode: CustomDecoder) -> Binding;
}

/// Every capability at once; what array elements are bound through.
pub trait ValueBinder:
    StringBinder
    + IntBinder
    + UintBinder
    + FloatBinder
    + BoolBinder
    + TextBinder
    + ArrayBinder
    + CustomBinder
    + Send
    + Sync
{
}

impl<T> ValueBinder for T where
    T: StringBinder
        + IntBinder
        + UintBinder
        + FloatBinder
        + BoolBinder
        + TextBinder
        + ArrayBinder
        + CustomBinder
        + Send
        + Sync
{
}

/// Built-in binder: a source (or none, for defaults), a bound name and a
/// lookup strategy.
#[derive(Clone)]
pub struct Binder {
    source: Option<SourceRef>,
    name: String,
    lookup: Lookup,
}

impl Binder {
    pub(crate) fn new(source: Option<SourceRef>, name: impl Into<String>, lookup: Lookup) -> Self {
        Self {
            source,
            name: name.into(),
            lookup,
        }
    }

    /// `None` for default values.
    pub fn source(&self) -> Option<&SourceRef> {
        self.source.as_ref()
    }

    pub fn bound_name(&self) -> &str {
        &self.name
    }

    /// Descend into a nested key, bound as `parent.key`.
    ///
    /// Resolution fails with [`BindError::NotAnObject`] when the parent value is
    /// not an object, so this is only useful on structured sources.
    pub fn key(&self, key: &str) -> Binder {
        Binder {
            source: self.source.clone(),
            name: format!("{}.{}", self.name, key),
            lookup: Lookup::Nested {
                parent: Box::new(self.lookup.clone()),
                parent_name: self.name.clone(),
                key: key.to_string(),
            },
        }
    }

    fn source_name(&self) -> &str {
        self.source
            .as_ref()
            .map(|s| s.name())
            .unwrap_or(DEFAULT_BOUND_NAME)
    }

    fn origin(&self) -> Origin {
        match &self.source {
            Some(source) => Origin::Source {
                source: source.clone(),
                bound_name: self.name.clone(),
            },
            None => Origin::Default,
        }
    }

    fn fetch(&self) -> Result<RawValue, BindError> {
        self.lookup.fetch(&self.name, self.source_name())
    }

    /// Fetch and convert, attributing failures to `func` and the raw input.
    fn read<T>(
        &self,
        func: &str,
        from_text: impl Fn(&str) -> Result<T, ConvertError>,
        from_value: impl Fn(&Value) -> Result<T, ConvertError>,
    ) -> Result<T, BindError> {
        match self.fetch()? {
            RawValue::Text(text) => {
                from_text(&text).map_err(|cause| BindValueError::new(func, text, cause).into())
            }
            RawValue::Structured(value) => from_value(&value)
                .map_err(|cause| BindValueError::new(func, value.to_string(), cause).into()),
        }
    }

    fn binding(&self, apply: impl FnMut() -> Result<(), BindError> + Send + 'static) -> Binding {
        Binding::new(self.origin(), apply)
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("source", &self.source_name())
            .field("name", &self.name)
            .finish()
    }
}

impl StringBinder for Binder {
    fn bind_string_to(&self, dest: Dest<String>) -> Binding {
        let binder = self.clone();
        self.binding(move || {
            let value = binder.read(
                "bind_string",
                |text| Ok(text.to_string()),
                convert::value_to_string,
            )?;
            dest.set(value);
            Ok(())
        })
    }
}

impl IntBinder for Binder {
    fn bind_int_to(&self, dest: Dest<i64>, width: IntWidth) -> Binding {
        let binder = self.clone();
        self.binding(move || {
            let value = binder.read(
                "bind_int",
                |text| convert::parse_int(text).and_then(|v| width.check_signed(v)),
                |value| convert::value_to_int(value).and_then(|v| width.check_signed(v)),
            )?;
            dest.set(value);
            Ok(())
        })
    }
}

impl UintBinder for Binder {
    fn bind_uint_to(&self, dest: Dest<u64>, width: IntWidth) -> Binding {
        let binder = self.clone();
        self.binding(move || {
            let value = binder.read(
                "bind_uint",
                |text| convert::parse_uint(text).and_then(|v| width.check_unsigned(v)),
                |value| convert::value_to_uint(value).and_then(|v| width.check_unsigned(v)),
            )?;
            dest.set(value);
            Ok(())
        })
    }
}

impl FloatBinder for Binder {
    fn bind_float_to(&self, dest: Dest<f64>) -> Binding {
        let binder = self.clone();
        self.binding(move || {
            let value = binder.read("bind_float", convert::parse_float, convert::value_to_float)?;
            dest.set(value);
            Ok(())
        })
    }
}

impl BoolBinder for Binder {
    fn bind_bool_to(&self, dest: Dest<bool>) -> Binding {
        if let Lookup::CliOption { source, long, short } = &self.lookup {
            source.declare_unary(long, short.as_deref());
        }
        let binder = self.clone();
        self.binding(move || {
            let value = binder.read("bind_bool", convert::parse_bool, convert::value_to_bool)?;
            dest.set(value);
            Ok(())
        })
    }
}

impl TextBinder for Binder {
    fn bind_text_to(&self, mut dest: Box<dyn TextDecodable>) -> Binding {
        let binder = self.clone();
        self.binding(move || {
            let text = binder.read("bind_text", |text| Ok(text.to_string()), convert::value_to_text)?;
            dest.decode_text(&text).map_err(|e| {
                BindValueError::new("bind_text", text.clone(), ConvertError::Decode(e.to_string()))
                    .into()
            })
        })
    }
}

impl ArrayBinder for Binder {
    fn bind_array_to(&self, dest: ArraySlot) -> Binding {
        let binder = self.clone();
        self.binding(move || {
            let items = binder.lookup.fetch_list(&binder.name, binder.source_name())?;
            dest.set(Some(Box::new(Elements {
                source: binder.source.clone(),
                name: binder.name.clone(),
                items: Arc::new(items),
            })));
            Ok(())
        })
    }
}

impl CustomBinder for Binder {
    fn bind_custom_to(&self, mut decode: CustomDecoder) -> Binding {
        let binder = self.clone();
        self.binding(move || {
            let raw = binder.fetch()?;
            decode(raw)
        })
    }
}

/// Built-in [`ArrayAccess`]: raw items plus what element binders need.
struct Elements {
    source: Option<SourceRef>,
    name: String,
    items: Arc<Vec<RawValue>>,
}

impl ArrayAccess for Elements {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn element(&self, index: usize) -> Result<Box<dyn ValueBinder>, BindError> {
        let name = format!("{}[{}]", self.name, index);
        if index >= self.items.len() {
            return Err(BindError::ElementOutOfRange {
                name,
                index,
                len: self.items.len(),
            });
        }
        Ok(Box::new(Binder::new(
            self.source.clone(),
            name,
            Lookup::Element {
                items: Arc::clone(&self.items),
                index,
            },
        )))
    }
}
