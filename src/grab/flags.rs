use anyhow::{bail, Result};

// Grab flags understood by frame sources. The sampling loop never looks at
// individual bits; it hands the mask to the source as-is and the source
// applies the bits it understands.

/// Rotation is a 2-bit field in the low bits, not independent flags.
pub const ROTATION_MASK: u32 = 0x3;

pub const NO_ROTATE: u32 = 0x0;
pub const ROTATE_90: u32 = 0x1;
pub const ROTATE_180: u32 = 0x2;
pub const ROTATE_270: u32 = 0x3;

pub const FLIP_HORIZONTAL: u32 = 1 << 16;
pub const FLIP_VERTICAL: u32 = 1 << 17;

pub const SNAPSHOT_NO_YUV: u32 = 1 << 24;
pub const SNAPSHOT_NO_RGB: u32 = 1 << 25;
pub const SNAPSHOT_FILL: u32 = 1 << 26;
pub const SNAPSHOT_SWAP_RED_BLUE: u32 = 1 << 27;
pub const SNAPSHOT_PACK: u32 = 1 << 28;

/// Name/value pairs for the `--list` output.
pub const FLAG_TABLE: [(&str, u32); 11] = [
    ("NO_ROTATE", NO_ROTATE),
    ("ROTATE_90", ROTATE_90),
    ("ROTATE_180", ROTATE_180),
    ("ROTATE_270", ROTATE_270),
    ("FLIP_HORIZONTAL", FLIP_HORIZONTAL),
    ("FLIP_VERTICAL", FLIP_VERTICAL),
    ("SNAPSHOT_NO_YUV", SNAPSHOT_NO_YUV),
    ("SNAPSHOT_NO_RGB", SNAPSHOT_NO_RGB),
    ("SNAPSHOT_FILL", SNAPSHOT_FILL),
    ("SNAPSHOT_SWAP_RED_BLUE", SNAPSHOT_SWAP_RED_BLUE),
    ("SNAPSHOT_PACK", SNAPSHOT_PACK),
];

/// Parse a user-supplied flag mask.
///
/// Strings starting with "0x" are read as hexadecimal, everything else as
/// decimal. The result is an opaque mask for the frame source.
pub fn parse_flags(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };
    match parsed {
        Ok(mask) => Ok(mask),
        Err(_) => bail!("Failed to parse flags ({})", input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_prefix() {
        assert_eq!(parse_flags("0x10").unwrap(), 16);
        assert_eq!(parse_flags("0x10000").unwrap(), FLIP_HORIZONTAL);
    }

    #[test]
    fn parses_decimal() {
        assert_eq!(parse_flags("42").unwrap(), 42);
        assert_eq!(parse_flags("0").unwrap(), NO_ROTATE);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_flags("zz").is_err());
        assert!(parse_flags("").is_err());
        assert!(parse_flags("0xzz").is_err());
        assert!(parse_flags("0x").is_err());
        assert!(parse_flags("-5").is_err());
    }

    #[test]
    fn table_names_are_unique() {
        for (i, (name, _)) in FLAG_TABLE.iter().enumerate() {
            for (other, _) in FLAG_TABLE.iter().skip(i + 1) {
                assert_ne!(name, other);
            }
        }
    }

    #[test]
    fn rotation_codes_fit_in_mask() {
        for code in [NO_ROTATE, ROTATE_90, ROTATE_180, ROTATE_270] {
            assert_eq!(code & ROTATION_MASK, code);
        }
    }
}
