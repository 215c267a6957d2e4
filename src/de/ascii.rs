use std::io::BufRead;

use crate::de::position::PositionedReader;
use crate::de::val_reader::{AsciiValReader, ScalarReader};
use crate::{ElementSpec, PlyError, ProgressSink, Record};

/// Decodes `element.count` lines, one record per line.
pub(crate) fn decode_element<R, P, F>(
    reader: &mut PositionedReader<R>,
    element: &ElementSpec,
    progress: &mut P,
    on_record: &mut F,
) -> Result<(), PlyError>
where
    R: BufRead,
    P: ProgressSink,
    F: FnMut(&ElementSpec, usize, Record) -> Result<(), PlyError>,
{
    let mut line = Vec::new();
    progress.initialize(element.count);

    for index in 0..element.count {
        if progress.is_cancelled() {
            return Err(PlyError::Cancelled {
                element: element.name.clone(),
                index,
            });
        }

        line.clear();
        reader.read_until(b'\n', &mut line)?;

        let text = std::str::from_utf8(&line).map_err(|_| PlyError::MalformedRecord {
            element: element.name.clone(),
            index,
            reason: "record is not valid text".to_string(),
        })?;
        if text.trim().is_empty() {
            return Err(PlyError::UnexpectedEndOfData {
                element: element.name.clone(),
                index,
            });
        }

        let malformed = |reason: String| PlyError::MalformedRecord {
            element: element.name.clone(),
            index,
            reason,
        };

        let mut values = AsciiValReader::new(text);
        let record = values
            .read_record(&element.properties)
            .map_err(|e| malformed(e.to_string()))?;
        if let Some(extra) = values.leftover() {
            return Err(malformed(format!("unexpected trailing value {extra:?}")));
        }

        on_record(element, index, record)?;
        progress.increment(1);
    }

    Ok(())
}
