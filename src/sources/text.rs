//! Plain-text source with encoding sniffing.
//!
//! Decoding order: byte-order mark first (UTF-8, UTF-16 LE/BE, UTF-32
//! LE/BE, BOM stripped), then strict UTF-8. Content that fails both goes
//! through a binary classifier; binary files yield "", everything else is
//! recovered lossily.

use super::SourceExtractor;
use log::{debug, warn};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextSource;

impl TextSource {
    pub fn new() -> Self {
        Self
    }
}

impl SourceExtractor for TextSource {
    fn extract(&self, path: &Path) -> String {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Cannot read {}: {}", path.display(), err);
                return String::new();
            }
        };
        decode(&bytes)
    }
}

/// Decodes raw bytes into text per the BOM/UTF-8/binary-check order.
pub fn decode(bytes: &[u8]) -> String {
    if let Some(decoded) = decode_bom(bytes) {
        return decoded;
    }

    match std::str::from_utf8(bytes) {
        // NUL bytes are valid UTF-8, so a successful decode still goes
        // through the classifier when they show up
        Ok(text) if !text.contains('\0') => text.to_string(),
        _ => {
            if is_binary(bytes) {
                debug!("Content classified as binary, yielding empty text");
                String::new()
            } else {
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }
}

/// BOM-directed decode; the mark itself is stripped. UTF-32 marks are
/// checked before UTF-16 since the LE forms share a prefix.
fn decode_bom(bytes: &[u8]) -> Option<String> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some(String::from_utf8_lossy(&bytes[3..]).into_owned());
    }
    if bytes.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        return Some(decode_utf32(&bytes[4..], true));
    }
    if bytes.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        return Some(decode_utf32(&bytes[4..], false));
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Some(decode_utf16(&bytes[2..], true));
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Some(decode_utf16(&bytes[2..], false));
    }
    None
}

fn decode_utf16(bytes: &[u8], little_endian: bool) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();
    String::from_utf16(&units).unwrap_or_default()
}

fn decode_utf32(bytes: &[u8], little_endian: bool) -> String {
    bytes
        .chunks_exact(4)
        .map(|quad| {
            let value = if little_endian {
                u32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]])
            } else {
                u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]])
            };
            char::from_u32(value).unwrap_or('\u{FFFD}')
        })
        .collect()
}

const SAMPLE_SIZE: usize = 1000;
const NUL_DENSITY_LIMIT: f64 = 0.10;
const CONTROL_RATIO_LIMIT: f64 = 0.30;
const HIGH_BYTE_DISTINCT_LIMIT: usize = 24;

/// Binary-content heuristic: NUL density, NUL runs, control-byte ratio
/// (ANSI-escaped content exempt), and high-byte diversity on larger
/// samples.
pub fn is_binary(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }

    let nul_count = bytes.iter().filter(|&&b| b == 0).count();
    if nul_count as f64 / bytes.len() as f64 > NUL_DENSITY_LIMIT {
        return true;
    }
    if bytes.windows(4).any(|w| w == [0, 0, 0, 0]) {
        return true;
    }

    let has_ansi_escapes = bytes.windows(2).any(|w| w == [0x1B, b'[']);
    if !has_ansi_escapes {
        let control = bytes
            .iter()
            .filter(|&&b| (b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r') || b == 0x7F)
            .count();
        if control as f64 / bytes.len() as f64 > CONTROL_RATIO_LIMIT {
            return true;
        }
    }

    if bytes.len() >= SAMPLE_SIZE {
        let sample = &bytes[..SAMPLE_SIZE];
        let mut freq = [0usize; 256];
        for &b in sample {
            freq[b as usize] += 1;
        }
        let high_frequency_floor = SAMPLE_SIZE / 100;
        let distinct_high = (0x7F..=0xFFusize)
            .filter(|&value| freq[value] > high_frequency_floor)
            .count();
        if distinct_high > HIGH_BYTE_DISTINCT_LIMIT {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn extract_bytes(bytes: &[u8]) -> String {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        TextSource::new().extract(file.path())
    }

    #[test]
    fn test_plain_utf8() {
        assert_eq!(extract_bytes("Tarta de manzana".as_bytes()), "Tarta de manzana");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("hola".as_bytes());
        assert_eq!(extract_bytes(&bytes), "hola");
    }

    #[test]
    fn test_utf16_le_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "sal".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(extract_bytes(&bytes), "sal");
    }

    #[test]
    fn test_utf16_be_bom() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "sal".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(extract_bytes(&bytes), "sal");
    }

    #[test]
    fn test_utf32_le_bom() {
        let mut bytes = vec![0xFF, 0xFE, 0x00, 0x00];
        for ch in "ñora".chars() {
            bytes.extend_from_slice(&(ch as u32).to_le_bytes());
        }
        assert_eq!(extract_bytes(&bytes), "ñora");
    }

    #[test]
    fn test_binary_content_yields_empty() {
        let mut bytes = vec![0u8; 64];
        bytes.extend_from_slice(b"PNG-ish");
        assert_eq!(extract_bytes(&bytes), "");
    }

    #[test]
    fn test_nul_run_detected() {
        let mut bytes = b"almost text ".to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(&vec![b'a'; 100]);
        assert!(is_binary(&bytes));
    }

    #[test]
    fn test_ansi_escapes_not_binary() {
        let text = b"\x1b[31mrojo\x1b[0m comida";
        assert!(!is_binary(text));
    }

    #[test]
    fn test_missing_file_is_empty() {
        assert_eq!(TextSource::new().extract(Path::new("/nope.txt")), "");
    }
}
