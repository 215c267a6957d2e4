use std::io::Read;
use std::marker::PhantomData;
use std::str::SplitWhitespace;

use byteorder::{ByteOrder, ReadBytesExt};
use thiserror::Error;

use crate::{PropertySpec, PropertyValue, Record, ScalarType, ScalarValue};

/// Why a single value could not be produced.
#[derive(Error, Debug)]
pub(crate) enum ValueError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("missing value for {0}")]
    Missing(String),

    #[error("cannot convert {token:?} to {data_type}")]
    Convert { token: String, data_type: ScalarType },

    #[error("invalid list length {0} for {1}")]
    BadCount(ScalarValue, String),
}

pub(crate) trait ScalarReader {
    fn read_scalar(&mut self, data_type: ScalarType, property: &str)
        -> Result<ScalarValue, ValueError>;

    /// Reads one property: a scalar, or a count followed by that many values.
    fn read_property(&mut self, property: &PropertySpec) -> Result<PropertyValue, ValueError> {
        match property {
            PropertySpec::Scalar { name, data_type } => {
                Ok(PropertyValue::Scalar(self.read_scalar(*data_type, name)?))
            }
            PropertySpec::List {
                name,
                count_type,
                data_type,
            } => {
                let count = self.read_scalar(*count_type, name)?;
                let len = count
                    .as_usize()
                    .ok_or_else(|| ValueError::BadCount(count, name.clone()))?;
                let values = (0..len)
                    .map(|_| self.read_scalar(*data_type, name))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PropertyValue::List(values))
            }
        }
    }

    fn read_record(&mut self, properties: &[PropertySpec]) -> Result<Record, ValueError> {
        properties.iter().map(|p| self.read_property(p)).collect()
    }
}

/// Fixed-width values in byte order `E`.
pub(crate) struct BinValReader<R: Read, E: ByteOrder> {
    reader: R,
    _endian: PhantomData<E>,
}

impl<R: Read, E: ByteOrder> BinValReader<R, E> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            _endian: PhantomData,
        }
    }
}

impl<R: Read, E: ByteOrder> ScalarReader for BinValReader<R, E> {
    fn read_scalar(
        &mut self,
        data_type: ScalarType,
        _property: &str,
    ) -> Result<ScalarValue, ValueError> {
        let reader = &mut self.reader;
        let value = match data_type {
            ScalarType::Char => ScalarValue::Char(reader.read_i8()?),
            ScalarType::UChar => ScalarValue::UChar(reader.read_u8()?),
            ScalarType::Short => ScalarValue::Short(reader.read_i16::<E>()?),
            ScalarType::UShort => ScalarValue::UShort(reader.read_u16::<E>()?),
            ScalarType::Int => ScalarValue::Int(reader.read_i32::<E>()?),
            ScalarType::UInt => ScalarValue::UInt(reader.read_u32::<E>()?),
            ScalarType::Float => ScalarValue::Float(reader.read_f32::<E>()?),
            ScalarType::Double => ScalarValue::Double(reader.read_f64::<E>()?),
        };
        Ok(value)
    }
}

/// Whitespace separated tokens of one ASCII record line.
pub(crate) struct AsciiValReader<'l> {
    tokens: SplitWhitespace<'l>,
}

impl<'l> AsciiValReader<'l> {
    pub fn new(line: &'l str) -> Self {
        Self {
            tokens: line.split_whitespace(),
        }
    }

    /// The first token left over after the record was read, if any.
    pub fn leftover(&mut self) -> Option<&'l str> {
        self.tokens.next()
    }
}

impl ScalarReader for AsciiValReader<'_> {
    fn read_scalar(
        &mut self,
        data_type: ScalarType,
        property: &str,
    ) -> Result<ScalarValue, ValueError> {
        let token = self
            .tokens
            .next()
            .ok_or_else(|| ValueError::Missing(property.to_string()))?;
        data_type
            .parse_text(token)
            .ok_or_else(|| ValueError::Convert {
                token: token.to_string(),
                data_type,
            })
    }
}
