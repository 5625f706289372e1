//! Typed field constructors
//!
//! Each constructor takes the destination and the binders to resolve it from,
//! lowest precedence first, and wraps the matching `bind_*_to` call of every
//! binder. Integer constructors resolve through a 64-bit scratch slot and
//! narrow after the binder's width check. List constructors resolve the
//! collection first and read each element through an element reader; readers
//! compose, so `read_list(el, read_int::<u8>)` reads a list of byte lists.

use super::Field;
use crate::binder::convert::IntWidth;
use crate::binder::{
    ArrayAccess, ArrayBinder, ArraySlot, BoolBinder, FloatBinder, IntBinder, StringBinder,
    TextBinder, TextDecodable, UintBinder, ValueBinder,
};
use crate::binding::Binding;
use crate::dest::Dest;
use crate::error::{BindError, BindValueError, BoxError, ConvertError};
use std::fmt;
use std::str::FromStr;

/// Signed integer destinations.
pub trait SignedInt: Copy + Send + 'static {
    const WIDTH: IntWidth;

    /// Narrow a value already checked against [`Self::WIDTH`].
    fn narrow(value: i64) -> Self;
}

/// Unsigned integer destinations.
pub trait UnsignedInt: Copy + Send + 'static {
    const WIDTH: IntWidth;

    fn narrow(value: u64) -> Self;
}

macro_rules! signed_int {
    ($($t:ty => $width:expr),* $(,)?) => {$(
        impl SignedInt for $t {
            const WIDTH: IntWidth = $width;

            fn narrow(value: i64) -> Self {
                value as $t
            }
        }
    )*};
}

macro_rules! unsigned_int {
    ($($t:ty => $width:expr),* $(,)?) => {$(
        impl UnsignedInt for $t {
            const WIDTH: IntWidth = $width;

            fn narrow(value: u64) -> Self {
                value as $t
            }
        }
    )*};
}

signed_int! {
    i8 => IntWidth::W8,
    i16 => IntWidth::W16,
    i32 => IntWidth::W32,
    i64 => IntWidth::W64,
    isize => IntWidth::Word,
}

unsigned_int! {
    u8 => IntWidth::W8,
    u16 => IntWidth::W16,
    u32 => IntWidth::W32,
    u64 => IntWidth::W64,
    usize => IntWidth::Word,
}

/// Floating point destinations.
pub trait FloatValue: Copy + Send + 'static {
    fn narrow(value: f64) -> Result<Self, ConvertError>;
}

impl FloatValue for f64 {
    fn narrow(value: f64) -> Result<Self, ConvertError> {
        Ok(value)
    }
}

impl FloatValue for f32 {
    fn narrow(value: f64) -> Result<Self, ConvertError> {
        if value.is_finite() && value.abs() > f64::from(f32::MAX) {
            return Err(ConvertError::Overflow);
        }
        Ok(value as f32)
    }
}

pub fn string_field(dest: &Dest<String>, binders: &[&dyn StringBinder]) -> Field {
    let bindings = binders
        .iter()
        .map(|b| b.bind_string_to(dest.clone()))
        .collect();
    Field::new(dest, bindings)
}

pub fn int_field<T: SignedInt>(dest: &Dest<T>, binders: &[&dyn IntBinder]) -> Field {
    let bindings = binders
        .iter()
        .map(|b| {
            let scratch = Dest::new(0i64);
            let dest = dest.clone();
            b.bind_int_to(scratch.clone(), T::WIDTH).and_then(move || {
                dest.set(T::narrow(scratch.get()));
                Ok(())
            })
        })
        .collect();
    Field::new(dest, bindings)
}

pub fn uint_field<T: UnsignedInt>(dest: &Dest<T>, binders: &[&dyn UintBinder]) -> Field {
    let bindings = binders
        .iter()
        .map(|b| {
            let scratch = Dest::new(0u64);
            let dest = dest.clone();
            b.bind_uint_to(scratch.clone(), T::WIDTH).and_then(move || {
                dest.set(T::narrow(scratch.get()));
                Ok(())
            })
        })
        .collect();
    Field::new(dest, bindings)
}

pub fn float_field<T: FloatValue>(dest: &Dest<T>, binders: &[&dyn FloatBinder]) -> Field {
    let bindings = binders
        .iter()
        .map(|b| {
            let scratch = Dest::new(0f64);
            let dest = dest.clone();
            b.bind_float_to(scratch.clone()).and_then(move || {
                dest.set(narrow_float(scratch.get())?);
                Ok(())
            })
        })
        .collect();
    Field::new(dest, bindings)
}

pub fn bool_field(dest: &Dest<bool>, binders: &[&dyn BoolBinder]) -> Field {
    let bindings = binders
        .iter()
        .map(|b| b.bind_bool_to(dest.clone()))
        .collect();
    Field::new(dest, bindings)
}

/// Field for any `FromStr` type, e.g. [`ExtendedDuration`](crate::duration::ExtendedDuration).
pub fn text_field<T>(dest: &Dest<T>, binders: &[&dyn TextBinder]) -> Field
where
    T: FromStr + Send + 'static,
    T::Err: fmt::Display,
{
    let bindings = binders
        .iter()
        .map(|b| b.bind_text_to(Box::new(dest.clone())))
        .collect();
    Field::new(dest, bindings)
}

/// Field built from caller-supplied bindings.
pub fn custom_field<T: Send + 'static>(dest: &Dest<T>, bindings: Vec<Binding>) -> Field {
    Field::new(dest, bindings)
}

/// List field whose elements are read with `read`.
///
/// The destination is replaced only when every element read succeeds.
pub fn list_field_with<T, F>(dest: &Dest<Vec<T>>, binders: &[&dyn ArrayBinder], read: F) -> Field
where
    T: Send + 'static,
    F: Fn(&dyn ValueBinder) -> Result<T, BindError> + Clone + Send + 'static,
{
    let bindings = binders
        .iter()
        .map(|b| {
            let slot: ArraySlot = Dest::new(None);
            let dest = dest.clone();
            let read = read.clone();
            b.bind_array_to(slot.clone()).and_then(move || {
                let elements = resolved(&slot)?;
                dest.set(read_elements(elements.as_ref(), &read)?);
                Ok(())
            })
        })
        .collect();
    Field::new(dest, bindings)
}

pub fn string_list_field(dest: &Dest<Vec<String>>, binders: &[&dyn ArrayBinder]) -> Field {
    list_field_with(dest, binders, read_string)
}

pub fn int_list_field<T: SignedInt>(dest: &Dest<Vec<T>>, binders: &[&dyn ArrayBinder]) -> Field {
    list_field_with(dest, binders, read_int::<T>)
}

pub fn uint_list_field<T: UnsignedInt>(
    dest: &Dest<Vec<T>>,
    binders: &[&dyn ArrayBinder],
) -> Field {
    list_field_with(dest, binders, read_uint::<T>)
}

pub fn float_list_field<T: FloatValue>(
    dest: &Dest<Vec<T>>,
    binders: &[&dyn ArrayBinder],
) -> Field {
    list_field_with(dest, binders, read_float::<T>)
}

pub fn bool_list_field(dest: &Dest<Vec<bool>>, binders: &[&dyn ArrayBinder]) -> Field {
    list_field_with(dest, binders, read_bool)
}

pub fn text_list_field<T>(dest: &Dest<Vec<T>>, binders: &[&dyn ArrayBinder]) -> Field
where
    T: FromStr + Send + 'static,
    T::Err: fmt::Display,
{
    list_field_with(dest, binders, read_text::<T>)
}

pub fn read_string(el: &dyn ValueBinder) -> Result<String, BindError> {
    let out = Dest::new(String::new());
    el.bind_string_to(out.clone()).apply()?;
    Ok(out.take())
}

pub fn read_int<T: SignedInt>(el: &dyn ValueBinder) -> Result<T, BindError> {
    let out = Dest::new(0i64);
    el.bind_int_to(out.clone(), T::WIDTH).apply()?;
    Ok(T::narrow(out.get()))
}

pub fn read_uint<T: UnsignedInt>(el: &dyn ValueBinder) -> Result<T, BindError> {
    let out = Dest::new(0u64);
    el.bind_uint_to(out.clone(), T::WIDTH).apply()?;
    Ok(T::narrow(out.get()))
}

pub fn read_float<T: FloatValue>(el: &dyn ValueBinder) -> Result<T, BindError> {
    let out = Dest::new(0f64);
    el.bind_float_to(out.clone()).apply()?;
    narrow_float(out.get())
}

pub fn read_bool(el: &dyn ValueBinder) -> Result<bool, BindError> {
    let out = Dest::new(false);
    el.bind_bool_to(out.clone()).apply()?;
    Ok(out.get())
}

pub fn read_text<T>(el: &dyn ValueBinder) -> Result<T, BindError>
where
    T: FromStr + Send + 'static,
    T::Err: fmt::Display,
{
    let out = Parsed::<T>(Dest::new(None));
    el.bind_text_to(Box::new(out.clone())).apply()?;
    out.0.take().ok_or_else(|| BindError::Custom("text element was not decoded".to_string()))
}

/// Nested list element, read with `read`.
pub fn read_list<T, F>(el: &dyn ValueBinder, read: F) -> Result<Vec<T>, BindError>
where
    F: Fn(&dyn ValueBinder) -> Result<T, BindError>,
{
    let slot: ArraySlot = Dest::new(None);
    el.bind_array_to(slot.clone()).apply()?;
    let elements = resolved(&slot)?;
    read_elements(elements.as_ref(), &read)
}

fn resolved(slot: &ArraySlot) -> Result<Box<dyn ArrayAccess>, BindError> {
    slot.take()
        .ok_or_else(|| BindError::Custom("array binding produced no elements".to_string()))
}

fn read_elements<T, F>(elements: &dyn ArrayAccess, read: &F) -> Result<Vec<T>, BindError>
where
    F: Fn(&dyn ValueBinder) -> Result<T, BindError>,
{
    (0..elements.len())
        .map(|index| {
            let element = elements.element(index)?;
            read(element.as_ref())
        })
        .collect()
}

fn narrow_float<T: FloatValue>(value: f64) -> Result<T, BindError> {
    T::narrow(value).map_err(|cause| BindValueError::new("bind_float", value.to_string(), cause).into())
}

/// Text-decodable slot for types without a `Default`.
struct Parsed<T>(Dest<Option<T>>);

impl<T> Clone for Parsed<T> {
    fn clone(&self) -> Self {
        Parsed(self.0.clone())
    }
}

impl<T> TextDecodable for Parsed<T>
where
    T: FromStr + Send,
    T::Err: fmt::Display,
{
    fn decode_text(&mut self, text: &str) -> Result<(), BoxError> {
        let value = text.parse::<T>().map_err(|e| e.to_string())?;
        self.0.set(Some(value));
        Ok(())
    }
}
