use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fmt;

/// Byte ordering for multi-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Least-significant byte first.
    Little,
    /// Most-significant byte first.
    Big,
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Little => write!(f, "little"),
            Endianness::Big => write!(f, "big"),
        }
    }
}

/// Descriptor for one fixed-width value kind.
///
/// Two types with the same width and signedness but different byte order are
/// distinct values. Instances are built once per architecture table and never
/// mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarType {
    /// Canonical name, e.g. `"uint32"`.
    pub name: &'static str,
    /// Width in bytes (1, 2, 4, or 8).
    pub size: u32,
    pub endian: Endianness,
    pub signed: bool,
    pub float: bool,
}

impl ScalarType {
    pub const fn int(name: &'static str, size: u32, endian: Endianness, signed: bool) -> Self {
        ScalarType {
            name,
            size,
            endian,
            signed,
            float: false,
        }
    }

    pub const fn float(name: &'static str, size: u32, endian: Endianness) -> Self {
        ScalarType {
            name,
            size,
            endian,
            signed: true,
            float: true,
        }
    }

    /// The canonical unsigned integer type of `size` bytes, or `None` for
    /// widths outside 1/2/4/8.
    pub fn unsigned(size: u32, endian: Endianness) -> Option<Self> {
        let name = match size {
            1 => "uint8",
            2 => "uint16",
            4 => "uint32",
            8 => "uint64",
            _ => return None,
        };
        Some(ScalarType::int(name, size, endian, false))
    }

    /// Inclusive value bounds implied by the width and signedness.
    pub fn bounds(&self) -> (i128, i128) {
        let bits = self.size * 8;
        if self.signed {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        } else {
            (0, (1i128 << bits) - 1)
        }
    }

    /// Packs an integer value into exactly `size` bytes in this type's byte
    /// order. Values outside [ScalarType::bounds] fail with a range error.
    pub fn pack(&self, value: i128) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.size as usize);
        self.pack_into(value, &mut out)?;
        Ok(out)
    }

    /// Same as [ScalarType::pack], appending onto an existing buffer.
    pub fn pack_into(&self, value: i128, out: &mut Vec<u8>) -> Result<()> {
        if self.float {
            return Err(Error::Mismatch {
                type_name: self.name,
                given: "an integer",
            });
        }
        let (min, max) = self.bounds();
        if value < min || value > max {
            return Err(Error::Range {
                type_name: self.name,
                value,
            });
        }

        // Two's-complement truncation to 64 bits, then the low `size` bytes.
        let raw = value as u64;
        let mut buf = [0u8; 8];
        let n = self.size as usize;
        match self.endian {
            Endianness::Little => {
                LittleEndian::write_u64(&mut buf, raw);
                out.extend_from_slice(&buf[..n]);
            }
            Endianness::Big => {
                BigEndian::write_u64(&mut buf, raw);
                out.extend_from_slice(&buf[8 - n..]);
            }
        }
        Ok(())
    }

    /// Reads one value from the front of `bytes`, sign-extending if signed.
    pub fn unpack(&self, bytes: &[u8]) -> Result<i128> {
        if self.float {
            return Err(Error::Mismatch {
                type_name: self.name,
                given: "an integer",
            });
        }
        let n = self.size as usize;
        if bytes.len() < n {
            return Err(Error::Truncated {
                type_name: self.name,
                needed: n,
                got: bytes.len(),
            });
        }

        let mut buf = [0u8; 8];
        let raw = match self.endian {
            Endianness::Little => {
                buf[..n].copy_from_slice(&bytes[..n]);
                LittleEndian::read_u64(&buf)
            }
            Endianness::Big => {
                buf[8 - n..].copy_from_slice(&bytes[..n]);
                BigEndian::read_u64(&buf)
            }
        };

        if self.signed {
            let shift = 128 - (n as u32 * 8);
            Ok(((raw as i128) << shift) >> shift)
        } else {
            Ok(raw as i128)
        }
    }

    pub fn pack_float(&self, value: f64) -> Result<Vec<u8>> {
        if !self.float {
            return Err(Error::Mismatch {
                type_name: self.name,
                given: "a float",
            });
        }
        let mut out = vec![0u8; self.size as usize];
        match (self.size, self.endian) {
            (4, Endianness::Little) => LittleEndian::write_f32(&mut out, value as f32),
            (4, Endianness::Big) => BigEndian::write_f32(&mut out, value as f32),
            (8, Endianness::Little) => LittleEndian::write_f64(&mut out, value),
            (8, Endianness::Big) => BigEndian::write_f64(&mut out, value),
            _ => {
                return Err(Error::Config {
                    kind: "float width",
                    given: self.size.to_string(),
                    expected: "4 or 8 bytes",
                })
            }
        }
        Ok(out)
    }

    pub fn unpack_float(&self, bytes: &[u8]) -> Result<f64> {
        if !self.float {
            return Err(Error::Mismatch {
                type_name: self.name,
                given: "a float",
            });
        }
        let n = self.size as usize;
        if bytes.len() < n {
            return Err(Error::Truncated {
                type_name: self.name,
                needed: n,
                got: bytes.len(),
            });
        }
        match (self.size, self.endian) {
            (4, Endianness::Little) => Ok(LittleEndian::read_f32(bytes) as f64),
            (4, Endianness::Big) => Ok(BigEndian::read_f32(bytes) as f64),
            (8, Endianness::Little) => Ok(LittleEndian::read_f64(bytes)),
            (8, Endianness::Big) => Ok(BigEndian::read_f64(bytes)),
            _ => Err(Error::Config {
                kind: "float width",
                given: self.size.to_string(),
                expected: "4 or 8 bytes",
            }),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}-endian)", self.name, self.endian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const U16_LE: ScalarType = ScalarType::int("uint16", 2, Endianness::Little, false);
    const U16_BE: ScalarType = ScalarType::int("uint16", 2, Endianness::Big, false);
    const I8: ScalarType = ScalarType::int("int8", 1, Endianness::Little, true);
    const I32_LE: ScalarType = ScalarType::int("int32", 4, Endianness::Little, true);
    const U64_LE: ScalarType = ScalarType::int("uint64", 8, Endianness::Little, false);
    const F64_BE: ScalarType = ScalarType::float("float64", 8, Endianness::Big);

    #[test]
    fn pack_respects_byte_order() {
        assert_eq!(U16_LE.pack(0x1234).unwrap(), vec![0x34, 0x12]);
        assert_eq!(U16_BE.pack(0x1234).unwrap(), vec![0x12, 0x34]);
    }

    #[test]
    fn pack_negative_is_twos_complement() {
        assert_eq!(I8.pack(-1).unwrap(), vec![0xff]);
        assert_eq!(I32_LE.pack(-2).unwrap(), vec![0xfe, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn pack_out_of_range_names_type_and_value() {
        let err = U16_LE.pack(0x1_0000).unwrap_err();
        match err {
            Error::Range { type_name, value } => {
                assert_eq!(type_name, "uint16");
                assert_eq!(value, 0x1_0000);
            }
            other => panic!("expected range error, got {other}"),
        }
        assert!(U16_LE.pack(-1).is_err());
        assert!(I8.pack(-129).is_err());
        assert!(I8.pack(128).is_err());
    }

    #[test]
    fn full_width_unsigned_round_trips() {
        let bytes = U64_LE.pack(u64::MAX as i128).unwrap();
        assert_eq!(bytes, vec![0xff; 8]);
        assert_eq!(U64_LE.unpack(&bytes).unwrap(), u64::MAX as i128);
    }

    #[test]
    fn unpack_sign_extends() {
        assert_eq!(I8.unpack(&[0xff]).unwrap(), -1);
        assert_eq!(I32_LE.unpack(&[0xfe, 0xff, 0xff, 0xff]).unwrap(), -2);
        assert_eq!(U16_BE.unpack(&[0x12, 0x34]).unwrap(), 0x1234);
    }

    #[test]
    fn unpack_short_buffer_fails() {
        assert!(matches!(
            I32_LE.unpack(&[0x01, 0x02]),
            Err(Error::Truncated { needed: 4, got: 2, .. })
        ));
    }

    #[test]
    fn float_pack_round_trips() {
        let bytes = F64_BE.pack_float(1.5).unwrap();
        assert_eq!(F64_BE.unpack_float(&bytes).unwrap(), 1.5);
        assert!(F64_BE.pack(1).is_err());
        assert!(U16_LE.pack_float(1.5).is_err());
    }
}
