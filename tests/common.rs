#![cfg(feature = "std")]

mod support;

use std::path::Path;

use csv::ReaderBuilder;
use sprocket::{
    DecodeOptions, FitFile, Record,
    avec::{FromRecord, FromRecords},
    sans::types::{BaseType, Value},
};

const PATH: &str = "fixtures/synthetic-ride.fit";

fn options() -> DecodeOptions {
    DecodeOptions::default()
        .strict(true)
        .register_timestamp_field(20, 253)
        .register_timestamp_field(21, 253)
        .register_developer_field_resolver(|index: u8, field: u8| {
            ((index, field) == (0, 0)).then_some(BaseType::Uint16)
        })
}

#[test]
fn decode_slice_synthetic_ride() {
    support::setup_tracing();
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    sprocket::avec::decode_slice(&data, options(), &mut validator).unwrap();
    validator.finish();
}

#[test]
fn decode_file_synthetic_ride() {
    let file = FitFile::open(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    file.decode(options(), &mut validator).unwrap();
    validator.finish();
}

#[test]
fn decode_reader_synthetic_ride() {
    let mut reader = std::fs::File::open(PATH).unwrap();
    let file = FitFile::from_reader(&mut reader).unwrap();
    let mut validator = Validator::new(PATH);
    file.decode(options(), &mut validator).unwrap();
    validator.finish();
}

#[test]
fn record_stream_synthetic_ride() {
    let file = FitFile::open(PATH).unwrap();

    assert_eq!(file.header().header_size, 14);
    assert_eq!(file.header().profile_version, 2024);
    assert_eq!(file.header().verify_checksum(file.bytes()), Some(true));

    let mut records = file.records_with(options());
    let decoded = records.by_ref().collect::<Result<Vec<_>, _>>().unwrap();

    let definitions = decoded
        .iter()
        .filter(|r| matches!(r, Record::Definition(_)))
        .count();

    assert_eq!(definitions, 7);
    assert_eq!(decoded.len(), 16);
    assert_eq!(records.consumed(), file.header().data_size as usize);
    assert!(matches!(records.checksum(), Some(Ok(()))));

    // Slot 0 was rebound to a different message before the end.
    let last = records.definitions().get(0).unwrap();
    assert_eq!(last.global_message, 23);
}

#[test]
fn corrupted_fixture_fails_strict_check() {
    let mut data = std::fs::read(PATH).unwrap();
    let last = data.len() - 1;
    data[last] ^= 0x01;

    let lenient = FitFile::from_bytes(data.clone()).unwrap();
    let mut records = lenient.records_with(options().strict(false));
    let decoded = records.by_ref().collect::<Result<Vec<_>, _>>().unwrap();

    assert_eq!(decoded.len(), 16);
    assert!(matches!(
        records.checksum(),
        Some(Err(sprocket::DecodeError::Checksum { .. }))
    ));

    let mut validator = Validator::new(PATH);
    let err = FitFile::from_bytes(data)
        .unwrap()
        .decode(options(), &mut validator)
        .unwrap_err();
    assert!(matches!(err, sprocket::DecodeError::Checksum { .. }));

    // Every record was published before the check failed.
    validator.finish();
}

/// Compares published values against rows of an expected-values table.
///
/// Each row holds a global message number, then an optional `t` column pair
/// for the timestamp, then field number and value pairs, and finally `d`
/// triples for developer fields.
struct Validator(Vec<String>, Vec<Vec<String>>);

impl Validator {
    fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().with_extension("csv");

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .unwrap();

        let expected: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect();

        Self(vec![], expected)
    }

    fn finish(&self) {
        assert!(self.0.is_empty(), "unpublished values: {:?}", self.0);
        assert!(self.1.is_empty(), "unpublished records: {:?}", self.1);
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Invalid => "-".to_string(),
        Value::Scalar(x) => x.to_string(),
        Value::Array(xs) => xs
            .iter()
            .map(|x| x.map_or("-".to_string(), |x| x.to_string()))
            .collect::<Vec<_>>()
            .join(";"),
        Value::Bytes(bytes) => bytes.iter().map(|b| format!("{b:02x}")).collect(),
    }
}

impl FromRecords for Validator {
    fn add_record(&mut self, id: u16) -> Option<&mut dyn FromRecord> {
        assert!(self.0.is_empty(), "unpublished values: {:?}", self.0);
        self.0 = self.1.remove(0);
        assert_eq!(self.0.remove(0), id.to_string());
        Some(self)
    }
}

impl FromRecord for Validator {
    fn add_timestamp(&mut self, timestamp: u32) {
        assert_eq!(self.0.remove(0), "t");
        assert_eq!(self.0.remove(0), timestamp.to_string());
    }

    fn add_field(&mut self, field: u8, value: &Value) {
        assert_eq!(self.0.remove(0), field.to_string());
        assert_eq!(self.0.remove(0), render(value));
    }

    fn add_developer_field(&mut self, developer_data_index: u8, field: u8, value: &Value) {
        assert_eq!(self.0.remove(0), "d");
        assert_eq!(self.0.remove(0), developer_data_index.to_string());
        assert_eq!(self.0.remove(0), field.to_string());
        assert_eq!(self.0.remove(0), render(value));
    }
}
