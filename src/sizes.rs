//! Icon frame sizes
//!
//! Frames are always square, so a size is a single edge length in pixels.

use crate::error::IconError;

/// Sizes written when nothing else is requested
pub const DEFAULT_SIZES: [u32; 9] = [16, 20, 24, 32, 48, 64, 128, 256, 512];

/// Largest edge length accepted for a frame
pub const MAX_SIZE: u32 = 1024;

/// Convert raw sizes (as read from config or the command line) into edge lengths.
///
/// Order and duplicates are preserved. Zero or negative values and values
/// above [`MAX_SIZE`] are rejected.
pub fn parse_sizes(raw: &[i64]) -> Result<Vec<u32>, IconError> {
    if raw.is_empty() {
        return Err(IconError::NoSizes);
    }

    raw.iter().map(|&size| check_size(size)).collect()
}

/// Check already-typed sizes before any file is touched
pub fn validate_sizes(sizes: &[u32]) -> Result<(), IconError> {
    if sizes.is_empty() {
        return Err(IconError::NoSizes);
    }
    sizes.iter().try_for_each(|&s| check_size(s as i64).map(|_| ()))
}

fn check_size(size: i64) -> Result<u32, IconError> {
    if size <= 0 {
        return Err(IconError::InvalidSize(size));
    }
    if size > MAX_SIZE as i64 {
        return Err(IconError::SizeTooLarge {
            size,
            max: MAX_SIZE,
        });
    }
    Ok(size as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_set() {
        let raw: Vec<i64> = DEFAULT_SIZES.iter().map(|&s| s as i64).collect();
        assert_eq!(parse_sizes(&raw).unwrap(), DEFAULT_SIZES.to_vec());
    }

    #[test]
    fn keeps_duplicates_and_order() {
        assert_eq!(parse_sizes(&[32, 16, 32]).unwrap(), vec![32, 16, 32]);
    }

    #[test]
    fn rejects_zero_and_negative() {
        assert!(matches!(parse_sizes(&[16, 0]), Err(IconError::InvalidSize(0))));
        assert!(matches!(parse_sizes(&[-16]), Err(IconError::InvalidSize(-16))));
    }

    #[test]
    fn rejects_sizes_above_the_cap() {
        assert_eq!(parse_sizes(&[MAX_SIZE as i64]).unwrap(), vec![MAX_SIZE]);
        assert!(matches!(
            parse_sizes(&[16, 70000]),
            Err(IconError::SizeTooLarge { size: 70000, max: MAX_SIZE })
        ));
        let huge = u32::MAX as i64 + 1;
        assert!(matches!(
            parse_sizes(&[huge]),
            Err(IconError::SizeTooLarge { size, .. }) if size == huge
        ));
        assert!(matches!(
            validate_sizes(&[u32::MAX]),
            Err(IconError::SizeTooLarge { .. })
        ));
    }

    #[test]
    fn empty_set_is_an_error() {
        assert!(matches!(parse_sizes(&[]), Err(IconError::NoSizes)));
        assert!(matches!(validate_sizes(&[]), Err(IconError::NoSizes)));
    }

    #[test]
    fn validate_rejects_zero() {
        assert!(validate_sizes(&[16, 32]).is_ok());
        assert!(matches!(validate_sizes(&[16, 0]), Err(IconError::InvalidSize(0))));
    }
}
