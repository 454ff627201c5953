//! Structured view keys

use crate::error::{Error, Result};
use serde::ser::{self, Error as _, Serialize};
use serde_json::Value;

/// A structured key as given by the caller.
///
/// Conversion to JSON happens when the key is set; a failure is kept and
/// reported by [`ViewQuery::compile`](super::ViewQuery::compile) so builder
/// calls stay infallible.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum KeyParam {
    Json(Value),
    Unencodable(String),
}

impl KeyParam {
    pub(super) fn from_serialize<K: Serialize + ?Sized>(key: &K) -> Self {
        // serde_json writes NaN and infinities as `null`
        let encoded = key
            .serialize(FiniteNumbers)
            .and_then(|()| serde_json::to_value(key));
        match encoded {
            Ok(value) => Self::Json(value),
            Err(e) => Self::Unencodable(e.to_string()),
        }
    }

    pub(super) fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Unencodable(_) => None,
        }
    }

    pub(super) fn encode(&self, field: &str) -> Result<String> {
        match self {
            Self::Json(value) => {
                serde_json::to_string(value).map_err(|e| Error::compilation(field, e.to_string()))
            }
            Self::Unencodable(message) => Err(Error::compilation(field, message.clone())),
        }
    }
}

/// Walks a value and fails on the first float that JSON cannot represent
#[derive(Clone, Copy)]
struct FiniteNumbers;

impl FiniteNumbers {
    fn check(value: f64) -> std::result::Result<(), serde_json::Error> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(serde_json::Error::custom(format!(
                "{value} has no JSON representation"
            )))
        }
    }
}

type Walk = std::result::Result<(), serde_json::Error>;

impl ser::Serializer for FiniteNumbers {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_f32(self, v: f32) -> Walk {
        Self::check(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Walk {
        Self::check(v)
    }

    fn serialize_bool(self, _v: bool) -> Walk {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Walk {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Walk {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Walk {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Walk {
        Ok(())
    }

    fn serialize_i128(self, _v: i128) -> Walk {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Walk {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Walk {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Walk {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Walk {
        Ok(())
    }

    fn serialize_u128(self, _v: u128) -> Walk {
        Ok(())
    }

    fn serialize_char(self, _v: char) -> Walk {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Walk {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Walk {
        Ok(())
    }

    fn serialize_none(self) -> Walk {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Walk {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Walk {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Walk {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Walk {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Walk {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Walk {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteNumbers {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteNumbers {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteNumbers {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteNumbers {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteNumbers {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Walk {
        key.serialize(*self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteNumbers {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteNumbers {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Walk {
        value.serialize(*self)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}
