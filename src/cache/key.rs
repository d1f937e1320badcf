//! Cache key derivation.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::types::errors::{PolyCacheError, PolyCacheResult};

/// Derives a cache key from a call's arguments.
///
/// Keys must be deterministic and collision-free for semantically distinct
/// inputs: two arguments that map to the same key share one cache entry.
pub trait KeyFn<A: ?Sized> {
    /// Computes the key for `args`.
    fn derive(&self, args: &A) -> PolyCacheResult<String>;
}

impl<A: ?Sized, F> KeyFn<A> for F
where
    F: Fn(&A) -> PolyCacheResult<String>,
{
    fn derive(&self, args: &A) -> PolyCacheResult<String> {
        self(args)
    }
}

/// Default key: canonical JSON of the arguments.
///
/// Arguments go through `serde_json::Value` first, whose objects keep their
/// keys sorted, so structurally equal inputs always give the same string no
/// matter how their maps iterate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonKey;

impl<A: Serialize + ?Sized> KeyFn<A> for JsonKey {
    fn derive(&self, args: &A) -> PolyCacheResult<String> {
        canonical_json(args)
    }
}

/// SHA256 hex digest of the canonical JSON.
///
/// Keeps keys short for large geometries.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashedJsonKey;

impl<A: Serialize + ?Sized> KeyFn<A> for HashedJsonKey {
    fn derive(&self, args: &A) -> PolyCacheResult<String> {
        let json = canonical_json(args)?;
        Ok(sha256_hex(&json))
    }
}

/// Serializes a value into its canonical JSON text.
///
/// # Errors
/// Returns [`PolyCacheError::KeyDerivation`] when the value does not
/// serialize, has non-string map keys, or holds a NaN or infinite float.
/// JSON writes every non-finite float as `null`, so such values would
/// otherwise share one key.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> PolyCacheResult<String> {
    value
        .serialize(finite::FiniteCheck)
        .map_err(|e| PolyCacheError::KeyDerivation(e.to_string()))?;
    let value = serde_json::to_value(value)
        .map_err(|e| PolyCacheError::KeyDerivation(e.to_string()))?;
    Ok(value.to_string())
}

mod finite {
    //! Serializer that only checks that every float in a value is finite.

    use std::fmt;

    use serde::ser::{self, Serialize};

    #[derive(Debug)]
    pub(super) struct NonFinite(String);

    impl fmt::Display for NonFinite {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl std::error::Error for NonFinite {}

    impl ser::Error for NonFinite {
        fn custom<T: fmt::Display>(msg: T) -> Self {
            Self(msg.to_string())
        }
    }

    type Check = Result<(), NonFinite>;

    #[derive(Debug, Clone, Copy)]
    pub(super) struct FiniteCheck;

    impl FiniteCheck {
        fn float(v: f64) -> Check {
            if v.is_finite() {
                Ok(())
            } else {
                Err(NonFinite(format!("non-finite float {v} has no JSON form")))
            }
        }
    }

    impl ser::Serializer for FiniteCheck {
        type Ok = ();
        type Error = NonFinite;
        type SerializeSeq = Self;
        type SerializeTuple = Self;
        type SerializeTupleStruct = Self;
        type SerializeTupleVariant = Self;
        type SerializeMap = Self;
        type SerializeStruct = Self;
        type SerializeStructVariant = Self;

        fn serialize_bool(self, _v: bool) -> Check {
            Ok(())
        }

        fn serialize_i8(self, _v: i8) -> Check {
            Ok(())
        }

        fn serialize_i16(self, _v: i16) -> Check {
            Ok(())
        }

        fn serialize_i32(self, _v: i32) -> Check {
            Ok(())
        }

        fn serialize_i64(self, _v: i64) -> Check {
            Ok(())
        }

        fn serialize_i128(self, _v: i128) -> Check {
            Ok(())
        }

        fn serialize_u8(self, _v: u8) -> Check {
            Ok(())
        }

        fn serialize_u16(self, _v: u16) -> Check {
            Ok(())
        }

        fn serialize_u32(self, _v: u32) -> Check {
            Ok(())
        }

        fn serialize_u64(self, _v: u64) -> Check {
            Ok(())
        }

        fn serialize_u128(self, _v: u128) -> Check {
            Ok(())
        }

        fn serialize_f32(self, v: f32) -> Check {
            Self::float(f64::from(v))
        }

        fn serialize_f64(self, v: f64) -> Check {
            Self::float(v)
        }

        fn serialize_char(self, _v: char) -> Check {
            Ok(())
        }

        fn serialize_str(self, _v: &str) -> Check {
            Ok(())
        }

        fn serialize_bytes(self, _v: &[u8]) -> Check {
            Ok(())
        }

        fn serialize_none(self) -> Check {
            Ok(())
        }

        fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Check {
            value.serialize(self)
        }

        fn serialize_unit(self) -> Check {
            Ok(())
        }

        fn serialize_unit_struct(self, _name: &'static str) -> Check {
            Ok(())
        }

        fn serialize_unit_variant(
            self,
            _name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
        ) -> Check {
            Ok(())
        }

        fn serialize_newtype_struct<T: ?Sized + Serialize>(
            self,
            _name: &'static str,
            value: &T,
        ) -> Check {
            value.serialize(self)
        }

        fn serialize_newtype_variant<T: ?Sized + Serialize>(
            self,
            _name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
            value: &T,
        ) -> Check {
            value.serialize(self)
        }

        fn serialize_seq(self, _len: Option<usize>) -> Result<Self, NonFinite> {
            Ok(self)
        }

        fn serialize_tuple(self, _len: usize) -> Result<Self, NonFinite> {
            Ok(self)
        }

        fn serialize_tuple_struct(
            self,
            _name: &'static str,
            _len: usize,
        ) -> Result<Self, NonFinite> {
            Ok(self)
        }

        fn serialize_tuple_variant(
            self,
            _name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
            _len: usize,
        ) -> Result<Self, NonFinite> {
            Ok(self)
        }

        fn serialize_map(self, _len: Option<usize>) -> Result<Self, NonFinite> {
            Ok(self)
        }

        fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self, NonFinite> {
            Ok(self)
        }

        fn serialize_struct_variant(
            self,
            _name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
            _len: usize,
        ) -> Result<Self, NonFinite> {
            Ok(self)
        }
    }

    impl ser::SerializeSeq for FiniteCheck {
        type Ok = ();
        type Error = NonFinite;

        fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Check {
            value.serialize(*self)
        }

        fn end(self) -> Check {
            Ok(())
        }
    }

    impl ser::SerializeTuple for FiniteCheck {
        type Ok = ();
        type Error = NonFinite;

        fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Check {
            value.serialize(*self)
        }

        fn end(self) -> Check {
            Ok(())
        }
    }

    impl ser::SerializeTupleStruct for FiniteCheck {
        type Ok = ();
        type Error = NonFinite;

        fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Check {
            value.serialize(*self)
        }

        fn end(self) -> Check {
            Ok(())
        }
    }

    impl ser::SerializeTupleVariant for FiniteCheck {
        type Ok = ();
        type Error = NonFinite;

        fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Check {
            value.serialize(*self)
        }

        fn end(self) -> Check {
            Ok(())
        }
    }

    impl ser::SerializeMap for FiniteCheck {
        type Ok = ();
        type Error = NonFinite;

        fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Check {
            key.serialize(*self)
        }

        fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Check {
            value.serialize(*self)
        }

        fn end(self) -> Check {
            Ok(())
        }
    }

    impl ser::SerializeStruct for FiniteCheck {
        type Ok = ();
        type Error = NonFinite;

        fn serialize_field<T: ?Sized + Serialize>(
            &mut self,
            _key: &'static str,
            value: &T,
        ) -> Check {
            value.serialize(*self)
        }

        fn end(self) -> Check {
            Ok(())
        }
    }

    impl ser::SerializeStructVariant for FiniteCheck {
        type Ok = ();
        type Error = NonFinite;

        fn serialize_field<T: ?Sized + Serialize>(
            &mut self,
            _key: &'static str,
            value: &T,
        ) -> Check {
            value.serialize(*self)
        }

        fn end(self) -> Check {
            Ok(())
        }
    }
}

pub(crate) fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
