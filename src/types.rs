//! The eight PLY primitive types and the values decoded from them.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// PLY scalar data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

impl ScalarType {
    /// Looks up a header type name. Accepts the sized aliases (`uint8`, `float32`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "char" | "int8" => Some(ScalarType::Char),
            "uchar" | "uint8" => Some(ScalarType::UChar),
            "short" | "int16" => Some(ScalarType::Short),
            "ushort" | "uint16" => Some(ScalarType::UShort),
            "int" | "int32" => Some(ScalarType::Int),
            "uint" | "uint32" => Some(ScalarType::UInt),
            "float" | "float32" => Some(ScalarType::Float),
            "double" | "float64" => Some(ScalarType::Double),
            _ => None,
        }
    }

    pub fn size_bytes(&self) -> usize {
        match self {
            ScalarType::Char | ScalarType::UChar => 1,
            ScalarType::Short | ScalarType::UShort => 2,
            ScalarType::Int | ScalarType::UInt | ScalarType::Float => 4,
            ScalarType::Double => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Char => "char",
            ScalarType::UChar => "uchar",
            ScalarType::Short => "short",
            ScalarType::UShort => "ushort",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
        }
    }

    /// Converts one ASCII token into a value of this type.
    pub fn parse_text(&self, token: &str) -> Option<ScalarValue> {
        let value = match self {
            ScalarType::Char => ScalarValue::Char(token.parse().ok()?),
            ScalarType::UChar => ScalarValue::UChar(token.parse().ok()?),
            ScalarType::Short => ScalarValue::Short(token.parse().ok()?),
            ScalarType::UShort => ScalarValue::UShort(token.parse().ok()?),
            ScalarType::Int => ScalarValue::Int(token.parse().ok()?),
            ScalarType::UInt => ScalarValue::UInt(token.parse().ok()?),
            ScalarType::Float => ScalarValue::Float(token.parse().ok()?),
            ScalarType::Double => ScalarValue::Double(token.parse().ok()?),
        };
        Some(value)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown scalar type: {s}"))
    }
}

/// A single decoded number, tagged with the type the header declared for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Char(i8),
    UChar(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Float(f32),
    Double(f64),
}

impl ScalarValue {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarValue::Char(_) => ScalarType::Char,
            ScalarValue::UChar(_) => ScalarType::UChar,
            ScalarValue::Short(_) => ScalarType::Short,
            ScalarValue::UShort(_) => ScalarType::UShort,
            ScalarValue::Int(_) => ScalarType::Int,
            ScalarValue::UInt(_) => ScalarType::UInt,
            ScalarValue::Float(_) => ScalarType::Float,
            ScalarValue::Double(_) => ScalarType::Double,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            ScalarValue::Char(v) => v as f64,
            ScalarValue::UChar(v) => v as f64,
            ScalarValue::Short(v) => v as f64,
            ScalarValue::UShort(v) => v as f64,
            ScalarValue::Int(v) => v as f64,
            ScalarValue::UInt(v) => v as f64,
            ScalarValue::Float(v) => v as f64,
            ScalarValue::Double(v) => v,
        }
    }

    /// Interprets the value as a list length or vertex index.
    ///
    /// Negative and non-integral values have no such meaning and return `None`.
    pub fn as_usize(&self) -> Option<usize> {
        match *self {
            ScalarValue::Char(v) => usize::try_from(v).ok(),
            ScalarValue::UChar(v) => Some(v as usize),
            ScalarValue::Short(v) => usize::try_from(v).ok(),
            ScalarValue::UShort(v) => Some(v as usize),
            ScalarValue::Int(v) => usize::try_from(v).ok(),
            ScalarValue::UInt(v) => usize::try_from(v).ok(),
            ScalarValue::Float(v) => float_to_usize(v as f64),
            ScalarValue::Double(v) => float_to_usize(v),
        }
    }
}

fn float_to_usize(v: f64) -> Option<usize> {
    if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
        Some(v as usize)
    } else {
        None
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Char(v) => write!(f, "{v}"),
            ScalarValue::UChar(v) => write!(f, "{v}"),
            ScalarValue::Short(v) => write!(f, "{v}"),
            ScalarValue::UShort(v) => write!(f, "{v}"),
            ScalarValue::Int(v) => write!(f, "{v}"),
            ScalarValue::UInt(v) => write!(f, "{v}"),
            ScalarValue::Float(v) => write!(f, "{v}"),
            ScalarValue::Double(v) => write!(f, "{v}"),
        }
    }
}

/// The value of one property within a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Scalar(ScalarValue),
    List(Vec<ScalarValue>),
}

impl PropertyValue {
    pub fn as_scalar(&self) -> Option<ScalarValue> {
        match self {
            PropertyValue::Scalar(v) => Some(*v),
            PropertyValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ScalarValue]> {
        match self {
            PropertyValue::Scalar(_) => None,
            PropertyValue::List(values) => Some(values),
        }
    }
}

/// One decoded element instance, property values in declaration order.
pub type Record = Vec<PropertyValue>;
