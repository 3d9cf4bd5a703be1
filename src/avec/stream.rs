//! Lazy record stream over a whole document.

use crate::sans::{
    DecodeError,
    check::compute_crc,
    data::{DataRecord, decode_data},
    definition::{Definition, decode_definition},
    header::{FileHeader, RecordHeader},
    source::ByteSource,
    table::DefinitionTable,
};

use super::DecodeOptions;

/// A record read from the record section.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Definition(Definition),
    Data(DataRecord),
}

impl Record {
    pub fn as_data(&self) -> Option<&DataRecord> {
        match self {
            Self::Data(d) => Some(d),
            Self::Definition(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Streaming,
    ChecksumCheck,
    Done,
    Failed,
}

/// Iterator over the records of a document.
///
/// Records are decoded one at a time as the iterator advances. Once the record
/// section has been read, the trailing check value is compared against the
/// document. A mismatch ends iteration with an error only for
/// [strict](DecodeOptions::strict) options; otherwise it is logged and kept
/// for [`Records::checksum`].
///
/// Any other error is yielded once, after which the iterator is exhausted.
pub struct Records<'a> {
    source: ByteSource<'a>,
    header: FileHeader,
    end: usize,
    table: DefinitionTable,
    baseline: Option<u32>,
    options: DecodeOptions,
    state: State,
    checksum: Option<Result<(), DecodeError>>,
}

impl<'a> Records<'a> {
    /// Parse the header of a document and prepare to read its records.
    pub fn new(r: &'a [u8], options: DecodeOptions) -> Result<Self, DecodeError> {
        let header = FileHeader::parse(r)?;
        Ok(Self::from_parts(r, header, options))
    }

    pub(crate) fn from_parts(r: &'a [u8], header: FileHeader, options: DecodeOptions) -> Self {
        if header.verify_checksum(r) == Some(false) {
            tracing::warn!("header check value does not match");
        }

        let source = ByteSource::starting_at(r, header.record_offset());
        let end = header.checksum_offset();

        Self {
            source,
            header,
            end,
            table: DefinitionTable::default(),
            baseline: None,
            options,
            state: State::Streaming,
            checksum: None,
        }
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Number of record section bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.source.offset() - self.header.record_offset()
    }

    /// Outcome of the trailing check, once the record section has been read.
    pub fn checksum(&self) -> Option<Result<(), &DecodeError>> {
        self.checksum.as_ref().map(|c| c.as_ref().map(|_| ()))
    }

    /// The definitions bound when decoding stopped or paused.
    pub fn definitions(&self) -> &DefinitionTable {
        &self.table
    }

    fn next_record(&mut self) -> Result<Record, DecodeError> {
        let record = match RecordHeader::decode(self.source.take_u8()?) {
            RecordHeader::Normal {
                is_definition: true,
                has_developer_fields,
                local_type,
            } => {
                let definition = decode_definition(
                    &mut self.source,
                    local_type,
                    has_developer_fields,
                    &mut self.table,
                )?;
                Record::Definition(definition)
            }
            RecordHeader::Normal { local_type, .. } => {
                let mut record = self.data_record(local_type)?;

                if let Some(timestamp) = self.registered_timestamp(&record) {
                    self.baseline = Some(timestamp);
                    record.timestamp = Some(timestamp);
                }

                Record::Data(record)
            }
            RecordHeader::CompressedTimestamp {
                local_type,
                time_offset,
            } => {
                let baseline = self
                    .baseline
                    .ok_or(DecodeError::UnsupportedCompressedTimestamp)?;
                let timestamp = reconstruct_timestamp(baseline, time_offset);

                let mut record = self.data_record(local_type)?;
                record.timestamp = Some(timestamp);
                self.baseline = Some(timestamp);

                Record::Data(record)
            }
        };

        if self.source.offset() > self.end {
            Err(DecodeError::FramingOverrun {
                consumed: self.consumed(),
                declared: self.header.data_size as usize,
            })?;
        }

        Ok(record)
    }

    fn data_record(&mut self, local_type: u8) -> Result<DataRecord, DecodeError> {
        let definition = self.table.bound(local_type)?;
        let record = decode_data(
            &mut self.source,
            self.end,
            definition,
            self.options.resolver(),
        )?;

        tracing::trace!(
            local_type,
            global_message = record.global_message,
            "decoded data record"
        );

        Ok(record)
    }

    fn registered_timestamp(&self, record: &DataRecord) -> Option<u32> {
        let field = self.options.timestamp_field(record.global_message)?;

        record
            .field(field)?
            .as_scalar()?
            .as_u64()
            .and_then(|t| u32::try_from(t).ok())
    }

    fn check(&mut self) -> Result<(), DecodeError> {
        let bytes = self.source.bytes();
        let end = self.end;

        let found = bytes
            .get(end..end + 2)
            .map(|r| u16::from_le_bytes([r[0], r[1]]))
            .ok_or(DecodeError::TruncatedRecord {
                offset: end,
                needed: 2,
                available: bytes.len().saturating_sub(end),
            })?;
        let calculated = compute_crc(0, &bytes[..end]);
        let consumed = self.consumed();

        tracing::debug!(
            consumed,
            found,
            calculated,
            "reached end of record section"
        );

        if found == calculated {
            self.checksum = Some(Ok(()));
            return Ok(());
        }

        self.checksum = Some(Err(DecodeError::Checksum { found, calculated }));

        if self.options.is_strict() {
            Err(DecodeError::Checksum { found, calculated })
        } else {
            tracing::warn!(found, calculated, "trailing check value does not match");
            Ok(())
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Result<Record, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                State::Streaming if self.source.offset() < self.end => {
                    let record = self.next_record();
                    if record.is_err() {
                        self.state = State::Failed;
                    }
                    return Some(record);
                }
                State::Streaming => self.state = State::ChecksumCheck,
                State::ChecksumCheck => {
                    let checked = self.check();
                    self.state = if checked.is_ok() {
                        State::Done
                    } else {
                        State::Failed
                    };
                    return checked.err().map(Err);
                }
                State::Done | State::Failed => return None,
            }
        }
    }
}

impl core::iter::FusedIterator for Records<'_> {}

/// Rebuild an absolute timestamp from a compressed header's five bit offset
/// and the most recent absolute timestamp.
///
/// The offset replaces the low five bits of the baseline, rolling over into
/// the next 32 second window if it is smaller than them.
pub fn reconstruct_timestamp(baseline: u32, time_offset: u8) -> u32 {
    let low = baseline & 0x1F;
    let time_offset = (time_offset & 0x1F) as u32;
    let timestamp = (baseline - low).wrapping_add(time_offset);

    if time_offset < low {
        timestamp.wrapping_add(32)
    } else {
        timestamp
    }
}
