//! Cyclic redundancy check over document bytes.
//!
//! Documents use CRC-16/ARC (reflected polynomial `0xA001`, seed zero),
//! computed four bits at a time from a sixteen entry table.

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800, 0xB401,
    0x5000, 0x9C01, 0x8801, 0x4400,
];

/// Accumulate a slice of bytes into a cyclic redundancy check value.
///
/// Pass `0` to begin a new check, or a previous result to continue one.
pub fn compute_crc(init: u16, r: &[u8]) -> u16 {
    r.iter().fold(init, |crc, b| {
        // Low nibble first.
        let crc = crc_nibble(crc, b & 0xF);
        crc_nibble(crc, b >> 4)
    })
}

fn crc_nibble(crc: u16, nibble: u8) -> u16 {
    let tmp = CRC_TABLE[(crc & 0xF) as usize];
    ((crc >> 4) & 0x0FFF) ^ tmp ^ CRC_TABLE[nibble as usize]
}
