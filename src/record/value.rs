//! Dynamic Value Module
//!
//! Converts values decoded by the parquet record API into a closed set of
//! dynamic values keyed off the column's physical storage type.

use parquet::basic::Type as PhysicalType;
use parquet::record::Field;
use serde::Serialize;

// == Dynamic Value ==
/// A single cell value handed back to callers.
///
/// Serializes untagged, so a row renders as a plain JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DynamicValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    /// Variable-length byte array decoded as text
    Utf8String(String),
    /// Fixed-length byte array, left undecoded
    RawBytes(Vec<u8>),
    /// Human-readable rendering of anything without a dedicated variant
    FallbackString(String),
}

impl DynamicValue {
    /// Returns true for `DynamicValue::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Int32(v) => Some(i64::from(*v)),
            DynamicValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicValue::Float32(v) => Some(f64::from(*v)),
            DynamicValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::Utf8String(s) | DynamicValue::FallbackString(s) => Some(s),
            _ => None,
        }
    }
}

// == Conversion ==
/// Maps one decoded field to a [`DynamicValue`].
///
/// `kind` is the physical type of the column the field came from, or `None`
/// for nested group columns. The record API already widens or narrows some
/// physical values according to their logical annotation (INT8 comes back as
/// `Field::Byte`, DATE as `Field::Date`, ...); those are folded back into the
/// width of the physical storage type. Combinations that don't line up with
/// the physical type degrade to [`DynamicValue::FallbackString`].
pub fn to_dynamic(kind: Option<PhysicalType>, field: &Field) -> DynamicValue {
    if let Field::Null = field {
        return DynamicValue::Null;
    }

    let Some(kind) = kind else {
        return fallback(field);
    };

    match (kind, field) {
        (PhysicalType::BOOLEAN, Field::Bool(v)) => DynamicValue::Bool(*v),

        (PhysicalType::INT32, Field::Int(v)) => DynamicValue::Int32(*v),
        (PhysicalType::INT32, Field::Byte(v)) => DynamicValue::Int32(i32::from(*v)),
        (PhysicalType::INT32, Field::Short(v)) => DynamicValue::Int32(i32::from(*v)),
        (PhysicalType::INT32, Field::UByte(v)) => DynamicValue::Int32(i32::from(*v)),
        (PhysicalType::INT32, Field::UShort(v)) => DynamicValue::Int32(i32::from(*v)),
        // Same bits as stored
        (PhysicalType::INT32, Field::UInt(v)) => DynamicValue::Int32(*v as i32),
        (PhysicalType::INT32, Field::Date(v)) => DynamicValue::Int32(*v),
        (PhysicalType::INT32, Field::TimeMillis(v)) => DynamicValue::Int32(*v),
        // Unscaled, as stored
        (PhysicalType::INT32, Field::Decimal(d)) => match <[u8; 4]>::try_from(d.data()) {
            Ok(bytes) => DynamicValue::Int32(i32::from_be_bytes(bytes)),
            Err(_) => fallback(field),
        },

        (PhysicalType::INT64, Field::Long(v)) => DynamicValue::Int64(*v),
        (PhysicalType::INT64, Field::ULong(v)) => DynamicValue::Int64(*v as i64),
        (PhysicalType::INT64, Field::TimeMicros(v)) => DynamicValue::Int64(*v),
        (PhysicalType::INT64, Field::TimestampMillis(v)) => DynamicValue::Int64(*v),
        (PhysicalType::INT64, Field::TimestampMicros(v)) => DynamicValue::Int64(*v),
        (PhysicalType::INT64, Field::Decimal(d)) => match <[u8; 8]>::try_from(d.data()) {
            Ok(bytes) => DynamicValue::Int64(i64::from_be_bytes(bytes)),
            Err(_) => fallback(field),
        },

        // INT96 is surfaced as a timestamp by the record API
        (PhysicalType::INT96, Field::TimestampMillis(v)) => DynamicValue::Int64(*v),
        (PhysicalType::INT96, Field::TimestampMicros(v)) => DynamicValue::Int64(*v),
        (PhysicalType::INT96, Field::Long(v)) => DynamicValue::Int64(*v),

        (PhysicalType::FLOAT, Field::Float(v)) => DynamicValue::Float32(*v),
        (PhysicalType::DOUBLE, Field::Double(v)) => DynamicValue::Float64(*v),

        (PhysicalType::BYTE_ARRAY, Field::Str(s)) => DynamicValue::Utf8String(s.clone()),
        (PhysicalType::BYTE_ARRAY, Field::Bytes(b)) => {
            DynamicValue::Utf8String(String::from_utf8_lossy(b.data()).into_owned())
        }
        (PhysicalType::BYTE_ARRAY, Field::Decimal(d)) => {
            DynamicValue::Utf8String(String::from_utf8_lossy(d.data()).into_owned())
        }

        (PhysicalType::FIXED_LEN_BYTE_ARRAY, Field::Bytes(b)) => {
            DynamicValue::RawBytes(b.data().to_vec())
        }
        (PhysicalType::FIXED_LEN_BYTE_ARRAY, Field::Decimal(d)) => {
            DynamicValue::RawBytes(d.data().to_vec())
        }

        _ => fallback(field),
    }
}

fn fallback(field: &Field) -> DynamicValue {
    DynamicValue::FallbackString(field.to_string())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use parquet::data_type::{ByteArray, Decimal};

    #[test]
    fn test_null_always_converts_to_null() {
        for kind in [
            Some(PhysicalType::BOOLEAN),
            Some(PhysicalType::INT64),
            Some(PhysicalType::BYTE_ARRAY),
            None,
        ] {
            assert_eq!(to_dynamic(kind, &Field::Null), DynamicValue::Null);
        }
    }

    #[test]
    fn test_bool() {
        let value = to_dynamic(Some(PhysicalType::BOOLEAN), &Field::Bool(true));
        assert_eq!(value, DynamicValue::Bool(true));
    }

    #[test]
    fn test_int32() {
        let value = to_dynamic(Some(PhysicalType::INT32), &Field::Int(42));
        assert_eq!(value, DynamicValue::Int32(42));
    }

    #[test]
    fn test_int32_refinements_keep_storage_width() {
        assert_eq!(
            to_dynamic(Some(PhysicalType::INT32), &Field::Short(-7)),
            DynamicValue::Int32(-7)
        );
        assert_eq!(
            to_dynamic(Some(PhysicalType::INT32), &Field::Date(19000)),
            DynamicValue::Int32(19000)
        );
    }

    #[test]
    fn test_int64() {
        let value = to_dynamic(Some(PhysicalType::INT64), &Field::Long(9_876_543_210));
        assert_eq!(value, DynamicValue::Int64(9_876_543_210));
    }

    #[test]
    fn test_timestamps_narrow_to_int64() {
        assert_eq!(
            to_dynamic(Some(PhysicalType::INT64), &Field::TimestampMillis(1_700_000_000_000)),
            DynamicValue::Int64(1_700_000_000_000)
        );
        assert_eq!(
            to_dynamic(Some(PhysicalType::INT96), &Field::TimestampMillis(1_700_000_000_000)),
            DynamicValue::Int64(1_700_000_000_000)
        );
    }

    #[test]
    fn test_float32() {
        let value = to_dynamic(Some(PhysicalType::FLOAT), &Field::Float(87.3));
        match value {
            DynamicValue::Float32(v) => assert!((v - 87.3).abs() < 1e-4),
            other => panic!("expected Float32, got {:?}", other),
        }
    }

    #[test]
    fn test_float64() {
        let value = to_dynamic(Some(PhysicalType::DOUBLE), &Field::Double(95.123456));
        match value {
            DynamicValue::Float64(v) => assert!((v - 95.123456).abs() < 1e-7),
            other => panic!("expected Float64, got {:?}", other),
        }
    }

    #[test]
    fn test_byte_array_decodes_as_text() {
        let bytes = Field::Bytes(ByteArray::from("hello world"));
        assert_eq!(
            to_dynamic(Some(PhysicalType::BYTE_ARRAY), &bytes),
            DynamicValue::Utf8String("hello world".to_string())
        );

        let text = Field::Str("hello world".to_string());
        assert_eq!(
            to_dynamic(Some(PhysicalType::BYTE_ARRAY), &text),
            DynamicValue::Utf8String("hello world".to_string())
        );
    }

    #[test]
    fn test_fixed_len_byte_array_stays_raw() {
        let bytes = Field::Bytes(ByteArray::from(vec![0u8, 159, 146, 150]));
        assert_eq!(
            to_dynamic(Some(PhysicalType::FIXED_LEN_BYTE_ARRAY), &bytes),
            DynamicValue::RawBytes(vec![0, 159, 146, 150])
        );
    }

    #[test]
    fn test_decimal_int32_keeps_unscaled_value() {
        let price = Field::Decimal(Decimal::from_i32(12345, 9, 2));
        assert_eq!(
            to_dynamic(Some(PhysicalType::INT32), &price),
            DynamicValue::Int32(12345)
        );
    }

    #[test]
    fn test_decimal_int64_keeps_unscaled_value() {
        let amount = Field::Decimal(Decimal::from_i64(-9_876_543_210, 18, 4));
        assert_eq!(
            to_dynamic(Some(PhysicalType::INT64), &amount),
            DynamicValue::Int64(-9_876_543_210)
        );
    }

    #[test]
    fn test_decimal_byte_array_decodes_as_text() {
        let raw = Field::Decimal(Decimal::from_bytes(ByteArray::from("abc"), 10, 2));
        assert_eq!(
            to_dynamic(Some(PhysicalType::BYTE_ARRAY), &raw),
            DynamicValue::Utf8String("abc".to_string())
        );
    }

    #[test]
    fn test_group_falls_back_to_string() {
        let value = to_dynamic(None, &Field::Int(5));
        assert_eq!(value, DynamicValue::FallbackString("5".to_string()));
    }

    #[test]
    fn test_kind_mismatch_falls_back_to_string() {
        let value = to_dynamic(Some(PhysicalType::DOUBLE), &Field::Bool(false));
        assert_eq!(value, DynamicValue::FallbackString("false".to_string()));
    }

    #[test]
    fn test_serializes_untagged() {
        let values = vec![
            DynamicValue::Null,
            DynamicValue::Bool(true),
            DynamicValue::Int64(7),
            DynamicValue::Utf8String("x".to_string()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[null,true,7,"x"]"#);
    }
}
