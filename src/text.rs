//! Scalar text formatting.
//!
//! [`TextSerializer`] renders a single scalar `serde` value as the text that
//! goes into an attribute value or element body. Only the scalar half of the
//! serde data model has a textual form:
//!
//! | Rust / serde type | XML text |
//! |-------------------|----------|
//! | `bool`            | `true` / `false` |
//! | integers          | base 10, `-` only for negatives |
//! | `f32`, `f64`      | shortest decimal, never exponent, whole numbers keep `.0`; `NaN`, `INF`, `-INF` |
//! | `char`            | the character itself |
//! | `&str`, `String`  | the string itself |
//! | unit enum variant | the variant name (`#[serde(rename)]` honoured) |
//! | newtype struct    | the inner value |
//! | `Option<T>`       | `None` is absent, `Some(v)` is `v` |
//! | `()` / unit struct | absent |
//!
//! Everything else (bytes, sequences, maps, structs, data-carrying variants)
//! is rejected with [`Error::Unsupported`].

use crate::error::{Error, Result};
use serde::ser::{self, Impossible, Serialize};

/// Render `value` as XML text. `Ok(None)` means the value is absent.
pub fn to_text<T: Serialize + ?Sized>(value: &T) -> Result<Option<String>> {
    value.serialize(TextSerializer)
}

/// Serializer producing the textual form of one scalar value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSerializer;

macro_rules! display_text {
    ($($method:ident: $t:ty),* $(,)?) => {
        $(
            fn $method(self, v: $t) -> Result<Option<String>> {
                Ok(Some(v.to_string()))
            }
        )*
    };
}

macro_rules! float_text {
    ($v:expr) => {{
        let v = $v;
        if v.is_nan() {
            "NaN".to_owned()
        } else if v.is_infinite() {
            if v.is_sign_positive() { "INF" } else { "-INF" }.to_owned()
        } else {
            // Display never switches to exponent notation.
            let mut text = v.to_string();
            if !text.contains('.') {
                text.push_str(".0");
            }
            text
        }
    }};
}

impl ser::Serializer for TextSerializer {
    type Ok = Option<String>;
    type Error = Error;

    type SerializeSeq = Impossible<Option<String>, Error>;
    type SerializeTuple = Impossible<Option<String>, Error>;
    type SerializeTupleStruct = Impossible<Option<String>, Error>;
    type SerializeTupleVariant = Impossible<Option<String>, Error>;
    type SerializeMap = Impossible<Option<String>, Error>;
    type SerializeStruct = Impossible<Option<String>, Error>;
    type SerializeStructVariant = Impossible<Option<String>, Error>;

    fn serialize_bool(self, v: bool) -> Result<Option<String>> {
        Ok(Some(if v { "true" } else { "false" }.to_owned()))
    }

    display_text! {
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_char: char,
    }

    fn serialize_f32(self, v: f32) -> Result<Option<String>> {
        Ok(Some(float_text!(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Option<String>> {
        Ok(Some(float_text!(v)))
    }

    fn serialize_str(self, v: &str) -> Result<Option<String>> {
        Ok(Some(v.to_owned()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Option<String>> {
        Err(Error::Unsupported("bytes"))
    }

    fn serialize_none(self) -> Result<Option<String>> {
        Ok(None)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Option<String>> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Option<String>> {
        Ok(None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Option<String>> {
        Ok(None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Option<String>> {
        Ok(Some(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Option<String>> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Option<String>> {
        Err(Error::Unsupported("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::Unsupported("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::Unsupported("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Error::Unsupported("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::Unsupported("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::Unsupported("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::Unsupported("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::Unsupported("struct variant"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    fn text<T: Serialize + ?Sized>(value: &T) -> String {
        to_text(value).unwrap().unwrap()
    }

    #[test]
    fn test_floats_keep_decimal_point() {
        assert_eq!(text(&1.0f64), "1.0");
        assert_eq!(text(&1.0f32), "1.0");
        assert_eq!(text(&-0.0f64), "-0.0");
        assert_eq!(text(&0.25f64), "0.25");
        assert_eq!(text(&0.1f32), "0.1");
        assert_eq!(text(&1e21f64), "1000000000000000000000.0");
        assert_eq!(text(&1e-7f64), "0.0000001");
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(text(&f64::NAN), "NaN");
        assert_eq!(text(&f64::INFINITY), "INF");
        assert_eq!(text(&f32::NEG_INFINITY), "-INF");
    }

    #[test]
    fn test_integers_and_chars() {
        assert_eq!(text(&0u8), "0");
        assert_eq!(text(&-42i64), "-42");
        assert_eq!(text(&u128::MAX), "340282366920938463463374607431768211455");
        assert_eq!(text(&'a'), "a");
        assert_eq!(text(&true), "true");
        assert_eq!(text(&false), "false");
    }

    #[derive(Serialize)]
    enum Color {
        Red,
        #[serde(rename = "GREEN")]
        Green,
        Custom(u8, u8, u8),
    }

    #[derive(Serialize)]
    struct Meters(f64);

    #[test]
    fn test_enum_variants_and_newtypes() {
        assert_eq!(text(&Color::Red), "Red");
        assert_eq!(text(&Color::Green), "GREEN");
        assert_eq!(text(&Meters(3.0)), "3.0");
        assert_eq!(
            to_text(&Color::Custom(1, 2, 3)),
            Err(Error::Unsupported("tuple variant"))
        );
    }

    #[test]
    fn test_option_and_unit_are_absent() {
        assert_eq!(to_text(&Option::<u32>::None).unwrap(), None);
        assert_eq!(text(&Some(7u32)), "7");
        assert_eq!(to_text(&()).unwrap(), None);
    }

    #[test]
    fn test_compound_values_are_rejected() {
        assert_eq!(to_text(&vec![1, 2]), Err(Error::Unsupported("sequence")));
        assert_eq!(to_text(&(1u8, 2u8)), Err(Error::Unsupported("tuple")));
    }
}
