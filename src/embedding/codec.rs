// Binary vector encoding shared with existing embedding stores.
//
// A vector is a plain sequence of big-endian IEEE-754 doubles with no header;
// the dimension is the byte length divided by eight.

use std::fs;
use std::path::Path;

use crate::error::{AlignError, AlignResult};

const F64_BYTES: usize = std::mem::size_of::<f64>();

/// Encode a vector as big-endian doubles.
pub fn vec_to_bytes(vec: &[f64]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(vec.len() * F64_BYTES);
    for v in vec {
        buf.extend_from_slice(&v.to_be_bytes());
    }
    buf
}

/// Decode big-endian doubles. A length that is not a multiple of eight means
/// the blob is corrupt.
pub fn bytes_to_vec(data: &[u8]) -> AlignResult<Vec<f64>> {
    if data.len() % F64_BYTES != 0 {
        return Err(AlignError::Resolution(format!(
            "embedding blob of {} bytes is not a whole number of doubles",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(F64_BYTES)
        .map(|chunk| {
            let mut bytes = [0u8; F64_BYTES];
            bytes.copy_from_slice(chunk);
            f64::from_be_bytes(bytes)
        })
        .collect())
}

/// Write a vector to a file in the store encoding.
pub fn write_vec_to_file(vec: &[f64], path: &Path) -> AlignResult<()> {
    fs::write(path, vec_to_bytes(vec))?;
    Ok(())
}

/// Read a vector previously written by `write_vec_to_file`.
pub fn read_vec_from_file(path: &Path) -> AlignResult<Vec<f64>> {
    let data = fs::read(path)?;
    bytes_to_vec(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_is_big_endian() {
        let bytes = vec_to_bytes(&[1.0]);
        assert_eq!(bytes, vec![0x3f, 0xf0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_decode_recovers_exact_values() {
        let vec = vec![0.1, -2.5e-300, f64::MAX, 0.0, -0.0, 1.0 / 3.0];
        let decoded = bytes_to_vec(&vec_to_bytes(&vec)).unwrap();
        assert_eq!(decoded.len(), vec.len());
        for (a, b) in vec.iter().zip(&decoded) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_decode_rejects_partial_double() {
        let err = bytes_to_vec(&[0u8; 12]).unwrap_err();
        assert!(matches!(err, AlignError::Resolution(_)));
    }

    #[test]
    fn test_decode_empty_blob() {
        assert!(bytes_to_vec(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_file_roundtrip() {
        let path =
            std::env::temp_dir().join(format!("tableunion-codec-{}.ft-sum", std::process::id()));
        let vec = vec![3.25, -1.5, 1e10];
        write_vec_to_file(&vec, &path).unwrap();
        let loaded = read_vec_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, vec);
    }
}
