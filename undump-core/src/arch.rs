//! Architecture-aware scalar type tables.
//!
//! Every supported architecture is one `(address size, byte order)` pair, so
//! the tables are a single parameterized construction rather than one module
//! per architecture. The four concrete tables are built once and shared
//! read-only.

use crate::error::{Error, Result};
use crate::types::{Endianness, ScalarType};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    X86_64,
    Arm,
    ArmBe,
    Arm64,
    Arm64Be,
    Mips,
    MipsLe,
    Mips64,
    Mips64Le,
    Ppc,
    Ppc64,
}

impl Arch {
    /// Width of an address (and of `long`/`pointer`) in bytes.
    pub fn address_size(self) -> u32 {
        match self {
            Arch::X86 | Arch::Arm | Arch::ArmBe | Arch::Mips | Arch::MipsLe | Arch::Ppc => 4,
            Arch::X86_64
            | Arch::Arm64
            | Arch::Arm64Be
            | Arch::Mips64
            | Arch::Mips64Le
            | Arch::Ppc64 => 8,
        }
    }

    pub fn endianness(self) -> Endianness {
        match self {
            Arch::X86
            | Arch::X86_64
            | Arch::Arm
            | Arch::Arm64
            | Arch::MipsLe
            | Arch::Mips64Le => Endianness::Little,
            Arch::ArmBe | Arch::Arm64Be | Arch::Mips | Arch::Mips64 | Arch::Ppc | Arch::Ppc64 => {
                Endianness::Big
            }
        }
    }

    /// The shared type table for this architecture's address width and byte
    /// order.
    pub fn table(self) -> &'static TypeTable {
        static LE32: OnceLock<TypeTable> = OnceLock::new();
        static LE64: OnceLock<TypeTable> = OnceLock::new();
        static BE32: OnceLock<TypeTable> = OnceLock::new();
        static BE64: OnceLock<TypeTable> = OnceLock::new();

        match (self.address_size(), self.endianness()) {
            (4, Endianness::Little) => {
                LE32.get_or_init(|| TypeTable::new("32-bit little-endian", 4, Endianness::Little))
            }
            (8, Endianness::Little) => {
                LE64.get_or_init(|| TypeTable::new("64-bit little-endian", 8, Endianness::Little))
            }
            (4, Endianness::Big) => {
                BE32.get_or_init(|| TypeTable::new("32-bit big-endian", 4, Endianness::Big))
            }
            _ => BE64.get_or_init(|| TypeTable::new("64-bit big-endian", 8, Endianness::Big)),
        }
    }

    pub const ALL: [Arch; 12] = [
        Arch::X86,
        Arch::X86_64,
        Arch::Arm,
        Arch::ArmBe,
        Arch::Arm64,
        Arch::Arm64Be,
        Arch::Mips,
        Arch::MipsLe,
        Arch::Mips64,
        Arch::Mips64Le,
        Arch::Ppc,
        Arch::Ppc64,
    ];
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "x86" | "i386" | "i686" => Ok(Arch::X86),
            "x86-64" | "x86_64" | "amd64" => Ok(Arch::X86_64),
            "arm" => Ok(Arch::Arm),
            "arm-be" | "armbe" => Ok(Arch::ArmBe),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            "arm64-be" | "aarch64_be" => Ok(Arch::Arm64Be),
            "mips" => Ok(Arch::Mips),
            "mips-le" | "mipsel" => Ok(Arch::MipsLe),
            "mips64" => Ok(Arch::Mips64),
            "mips64-le" | "mips64el" => Ok(Arch::Mips64Le),
            "ppc" | "powerpc" => Ok(Arch::Ppc),
            "ppc64" | "powerpc64" => Ok(Arch::Ppc64),
            _ => Err(Error::Config {
                kind: "architecture",
                given: s.to_string(),
                expected: "x86, x86-64, arm, arm-be, arm64, arm64-be, mips, \
                           mips-le, mips64, mips64-le, ppc, ppc64",
            }),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86-64",
            Arch::Arm => "arm",
            Arch::ArmBe => "arm-be",
            Arch::Arm64 => "arm64",
            Arch::Arm64Be => "arm64-be",
            Arch::Mips => "mips",
            Arch::MipsLe => "mips-le",
            Arch::Mips64 => "mips64",
            Arch::Mips64Le => "mips64-le",
            Arch::Ppc => "ppc",
            Arch::Ppc64 => "ppc64",
        };
        write!(f, "{}", name)
    }
}

/// Name-to-type lookup for one `(address size, byte order)` pair.
///
/// Built once, never mutated afterwards.
#[derive(Debug)]
pub struct TypeTable {
    name: &'static str,
    address_size: u32,
    endian: Endianness,
    map: HashMap<&'static str, ScalarType>,
}

impl TypeTable {
    pub fn new(name: &'static str, address_size: u32, endian: Endianness) -> Self {
        let int8 = ScalarType::int("int8", 1, endian, true);
        let uint8 = ScalarType::int("uint8", 1, endian, false);
        let int16 = ScalarType::int("int16", 2, endian, true);
        let uint16 = ScalarType::int("uint16", 2, endian, false);
        let int32 = ScalarType::int("int32", 4, endian, true);
        let uint32 = ScalarType::int("uint32", 4, endian, false);
        let int64 = ScalarType::int("int64", 8, endian, true);
        let uint64 = ScalarType::int("uint64", 8, endian, false);
        let float32 = ScalarType::float("float32", 4, endian);
        let float64 = ScalarType::float("float64", 8, endian);

        let mut map = HashMap::new();
        map.insert("int8", int8);
        map.insert("uint8", uint8);
        map.insert("int16", int16);
        map.insert("uint16", uint16);
        map.insert("int32", int32);
        map.insert("uint32", uint32);
        map.insert("int64", int64);
        map.insert("uint64", uint64);
        map.insert("float32", float32);
        map.insert("float64", float64);

        map.insert("char", int8);
        map.insert("uchar", uint8);
        map.insert("byte", uint8);
        map.insert("short", int16);
        map.insert("ushort", uint16);
        map.insert("int", int32);
        map.insert("uint", uint32);
        map.insert("float", float32);
        map.insert("double", float64);

        // Width-dependent aliases track the address size.
        let (long, ulong) = match address_size {
            8 => (int64, uint64),
            _ => (int32, uint32),
        };
        map.insert("long", long);
        map.insert("ulong", ulong);
        map.insert("machine_word", ulong);
        map.insert("pointer", ulong);

        TypeTable {
            name,
            address_size,
            endian,
            map,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn address_size(&self) -> u32 {
        self.address_size
    }

    pub fn endianness(&self) -> Endianness {
        self.endian
    }

    /// Resolves a type name, failing with a configuration error that names
    /// both this table and the missing symbol.
    pub fn get(&self, name: &str) -> Result<&ScalarType> {
        self.map.get(name).ok_or_else(|| Error::UnknownType {
            arch: self.name.to_string(),
            name: name.to_string(),
        })
    }

    /// All registered type names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.map.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint32_on_32bit_le() {
        let ty = Arch::X86.table().get("uint32").unwrap();
        assert_eq!(ty.size, 4);
        assert!(!ty.signed);
        assert_eq!(ty.endian, Endianness::Little);
    }

    #[test]
    fn long_tracks_address_size() {
        let t32 = Arch::X86.table();
        assert_eq!(t32.get("long").unwrap().size, 4);
        assert_eq!(t32.get("ulong").unwrap().size, 4);
        assert_eq!(t32.get("machine_word").unwrap().size, 4);

        let t64 = Arch::X86_64.table();
        assert_eq!(t64.get("long").unwrap().size, 8);
        assert_eq!(t64.get("ulong").unwrap().size, 8);
        assert_eq!(t64.get("machine_word").unwrap().size, 8);
    }

    #[test]
    fn pointer_is_machine_word() {
        for arch in Arch::ALL {
            let table = arch.table();
            assert_eq!(
                table.get("pointer").unwrap(),
                table.get("machine_word").unwrap(),
                "{arch}"
            );
            assert_eq!(table.get("pointer").unwrap().size, arch.address_size());
        }
    }

    #[test]
    fn long_is_signed_ulong_is_not() {
        let table = Arch::Mips64.table();
        assert!(table.get("long").unwrap().signed);
        assert!(!table.get("ulong").unwrap().signed);
        assert_eq!(table.get("long").unwrap().endian, Endianness::Big);
    }

    #[test]
    fn missing_name_names_arch_and_symbol() {
        let err = Arch::X86.table().get("bogus").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("32-bit little-endian"), "{msg}");
        assert!(msg.contains("bogus"), "{msg}");
    }

    #[test]
    fn tables_are_shared_per_parameter_pair() {
        assert!(std::ptr::eq(Arch::X86.table(), Arch::Arm.table()));
        assert!(std::ptr::eq(Arch::X86_64.table(), Arch::Arm64.table()));
        assert!(!std::ptr::eq(Arch::X86.table(), Arch::Mips.table()));
    }

    #[test]
    fn arch_names_round_trip() {
        for arch in Arch::ALL {
            assert_eq!(arch.to_string().parse::<Arch>().unwrap(), arch);
        }
        assert_eq!("aarch64".parse::<Arch>().unwrap(), Arch::Arm64);
        assert!("sparc".parse::<Arch>().is_err());
    }

    #[test]
    fn base_types_cover_both_orders() {
        for name in ["int8", "uint16", "int32", "uint64", "float32", "float64"] {
            let le = Arch::X86.table().get(name).unwrap();
            let be = Arch::Ppc.table().get(name).unwrap();
            assert_eq!(le.size, be.size);
            assert_ne!(le.endian, be.endian);
        }
    }
}
