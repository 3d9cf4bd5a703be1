#![allow(dead_code)]

use sprocket::sans::check::compute_crc;
use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Assembles documents record by record.
#[derive(Debug, Default, Clone)]
pub struct Document {
    records: Vec<u8>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a definition record of `(field, size, base type)` triples.
    pub fn definition(self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Self {
        self.definition_with(local, global, false, fields, None)
    }

    pub fn definition_with(
        mut self,
        local: u8,
        global: u16,
        big_endian: bool,
        fields: &[(u8, u8, u8)],
        developer_fields: Option<&[(u8, u8, u8)]>,
    ) -> Self {
        let developer_flag = if developer_fields.is_some() { 0x20 } else { 0 };
        self.records.push(0x40 | developer_flag | local);
        self.records.push(0);

        if big_endian {
            self.records.push(1);
            self.records.extend_from_slice(&global.to_be_bytes());
        } else {
            self.records.push(0);
            self.records.extend_from_slice(&global.to_le_bytes());
        }

        self.records.push(fields.len() as u8);
        for (field, size, base_type) in fields {
            self.records.extend_from_slice(&[*field, *size, *base_type]);
        }

        if let Some(developer_fields) = developer_fields {
            self.records.push(developer_fields.len() as u8);
            for (field, size, index) in developer_fields {
                self.records.extend_from_slice(&[*field, *size, *index]);
            }
        }

        self
    }

    /// Append a data record with a normal header.
    pub fn data(mut self, local: u8, payload: &[u8]) -> Self {
        self.records.push(local & 0x0F);
        self.records.extend_from_slice(payload);
        self
    }

    /// Append a data record with a compressed timestamp header.
    pub fn compressed(mut self, local: u8, time_offset: u8, payload: &[u8]) -> Self {
        self.records.push(0x80 | (local & 0x03) << 5 | (time_offset & 0x1F));
        self.records.extend_from_slice(payload);
        self
    }

    pub fn record_len(&self) -> usize {
        self.records.len()
    }

    /// Frame the records with a 14 byte header and a valid trailing check
    /// value.
    pub fn build(&self) -> Vec<u8> {
        self.build_declaring(self.records.len() as u32)
    }

    /// Frame the records with a header declaring an arbitrary record section
    /// length. The trailing check value covers everything written.
    pub fn build_declaring(&self, data_size: u32) -> Vec<u8> {
        let mut r = vec![14, 0x20];
        r.extend_from_slice(&2024u16.to_le_bytes());
        r.extend_from_slice(&data_size.to_le_bytes());
        r.extend_from_slice(b".FIT");
        r.extend_from_slice(&compute_crc(0, &r).to_le_bytes());
        r.extend_from_slice(&self.records);
        r.extend_from_slice(&compute_crc(0, &r).to_le_bytes());
        r
    }
}
