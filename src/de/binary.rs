use std::io::Read;

use byteorder::ByteOrder;
use tracing::trace;

use crate::de::position::PositionedReader;
use crate::de::val_reader::{BinValReader, ScalarReader, ValueError};
use crate::{ElementSpec, PlyError, ProgressSink, Record, RecordLayout};

/// Decodes `element.count` binary records in byte order `E`.
pub(crate) fn decode_element<R, E, P, F>(
    reader: &mut PositionedReader<R>,
    element: &ElementSpec,
    chunk_size: usize,
    progress: &mut P,
    on_record: &mut F,
) -> Result<(), PlyError>
where
    R: Read,
    E: ByteOrder,
    P: ProgressSink,
    F: FnMut(&ElementSpec, usize, Record) -> Result<(), PlyError>,
{
    progress.initialize(element.count);
    match element.layout() {
        RecordLayout::FixedWidth { record_size: 0 } => {
            // No properties: every record is empty and occupies no bytes.
            for index in 0..element.count {
                on_record(element, index, Record::new())?;
                progress.increment(1);
            }
            Ok(())
        }
        RecordLayout::FixedWidth { record_size } => decode_fixed::<_, E, _, _>(
            reader,
            element,
            record_size,
            chunk_size,
            progress,
            on_record,
        ),
        // Record size depends on the counts, so there is nothing to batch.
        RecordLayout::SingleList | RecordLayout::Mixed => {
            decode_variable::<_, E, _, _>(reader, element, progress, on_record)
        }
    }
}

/// Bytes to read per chunk: the largest multiple of `record_size` that fits in
/// `chunk_size`, and never less than one record.
pub(crate) fn chunk_len(chunk_size: usize, record_size: usize) -> usize {
    (chunk_size - chunk_size % record_size).max(record_size)
}

fn decode_fixed<R, E, P, F>(
    reader: &mut PositionedReader<R>,
    element: &ElementSpec,
    record_size: usize,
    chunk_size: usize,
    progress: &mut P,
    on_record: &mut F,
) -> Result<(), PlyError>
where
    R: Read,
    E: ByteOrder,
    P: ProgressSink,
    F: FnMut(&ElementSpec, usize, Record) -> Result<(), PlyError>,
{
    let chunk_len = chunk_len(chunk_size, record_size);
    let mut remaining = element.count.saturating_mul(record_size);
    let mut buffer = vec![0u8; chunk_len.min(remaining)];
    let mut index = 0;

    while remaining > 0 {
        if progress.is_cancelled() {
            return Err(PlyError::Cancelled {
                element: element.name.clone(),
                index,
            });
        }

        // The last chunk only covers what is left.
        let want = remaining.min(chunk_len);
        let chunk_start = reader.position();
        let got = reader.read_full(&mut buffer[..want])?;
        trace!(element = %element.name, offset = chunk_start, bytes = got, "read chunk");

        for record_bytes in buffer[..got].chunks_exact(record_size) {
            let record = BinValReader::<_, E>::new(record_bytes)
                .read_record(&element.properties)
                .map_err(|e| match e {
                    ValueError::Io(e) => PlyError::Io(e),
                    other => malformed(element, index, other),
                })?;
            on_record(element, index, record)?;
            progress.increment(1);
            index += 1;
        }

        if got < want {
            let complete = (got / record_size) as u64;
            return Err(PlyError::TruncatedBinaryRecord {
                element: element.name.clone(),
                record_index: index,
                file_position: chunk_start + complete * record_size as u64,
            });
        }
        remaining -= want;
    }

    Ok(())
}

fn decode_variable<R, E, P, F>(
    reader: &mut PositionedReader<R>,
    element: &ElementSpec,
    progress: &mut P,
    on_record: &mut F,
) -> Result<(), PlyError>
where
    R: Read,
    E: ByteOrder,
    P: ProgressSink,
    F: FnMut(&ElementSpec, usize, Record) -> Result<(), PlyError>,
{
    for index in 0..element.count {
        if progress.is_cancelled() {
            return Err(PlyError::Cancelled {
                element: element.name.clone(),
                index,
            });
        }

        let record_start = reader.position();
        let record = BinValReader::<_, E>::new(&mut *reader)
            .read_record(&element.properties)
            .map_err(|e| match e {
                ValueError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    PlyError::TruncatedBinaryRecord {
                        element: element.name.clone(),
                        record_index: index,
                        file_position: record_start,
                    }
                }
                ValueError::Io(e) => PlyError::Io(e),
                other => malformed(element, index, other),
            })?;

        on_record(element, index, record)?;
        progress.increment(1);
    }

    Ok(())
}

fn malformed(element: &ElementSpec, index: usize, err: ValueError) -> PlyError {
    PlyError::MalformedRecord {
        element: element.name.clone(),
        index,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_len_is_record_multiple() {
        assert_eq!(chunk_len(1024, 12), 1020);
        assert_eq!(chunk_len(1024, 8), 1024);
        assert_eq!(chunk_len(16, 24), 24);
        assert_eq!(chunk_len(0, 12), 12);
    }
}
