// Licensed under the Apache-2.0 license

//! BCD-encoded header fields and their decoded forms. The hardware reports
//! versions and build dates as packed BCD nibbles; everything user-facing
//! works on the decoded values.

use core::fmt;

use zerocopy::byteorder::{LittleEndian, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Firmware version as laid out in the image header: four BCD nibbles of
/// build number (little-endian u16), then two BCD nibbles each of security
/// version, revision and product number.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Clone, Copy, Immutable, KnownLayout, PartialEq, Eq)]
pub struct FwVersionRaw {
    pub build: U16<LittleEndian>,
    pub security_version: u8,
    pub revision: u8,
    pub product: u8,
}

impl FwVersionRaw {
    pub fn decode(&self) -> FwVersion {
        FwVersion {
            product: bcd_byte(self.product),
            revision: bcd_byte(self.revision),
            security_version: bcd_byte(self.security_version),
            build: bcd_word(self.build.get()),
        }
    }
}

/// Decoded firmware version components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FwVersion {
    pub product: u8,
    pub revision: u8,
    pub security_version: u8,
    pub build: u16,
}

impl FwVersion {
    /// An all-zero version; modules report it when no firmware is staged.
    pub fn is_undefined(&self) -> bool {
        self.product == 0 && self.revision == 0 && self.security_version == 0 && self.build == 0
    }
}

impl fmt::Display for FwVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            f.write_str("N/A")
        } else {
            write!(
                f,
                "{:02}.{:02}.{:02}.{:04}",
                self.product, self.revision, self.security_version, self.build
            )
        }
    }
}

/// Firmware API version as laid out in the header: the minor byte is stored
/// first, both bytes are two BCD nibbles.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Clone, Copy, Immutable, KnownLayout, PartialEq, Eq)]
pub struct ApiVersionRaw {
    pub minor: u8,
    pub major: u8,
}

impl ApiVersionRaw {
    pub fn decode(&self) -> ApiVersion {
        ApiVersion {
            major: bcd_byte(self.major),
            minor: bcd_byte(self.minor),
        }
    }
}

/// Decoded firmware API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.major == 0 && self.minor == 0 {
            f.write_str("N/A")
        } else {
            write!(f, "{:02}.{:02}", self.major, self.minor)
        }
    }
}

/// Build date as laid out in the header: BCD `yyyymmdd` with the year in a
/// little-endian u16.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Clone, Copy, Immutable, KnownLayout, PartialEq, Eq)]
pub struct DateRaw {
    pub year: U16<LittleEndian>,
    pub month: u8,
    pub day: u8,
}

impl DateRaw {
    pub fn decode(&self) -> Date {
        Date {
            year: bcd_word(self.year.get()),
            month: bcd_byte(self.month),
            day: bcd_byte(self.day),
        }
    }
}

/// Decoded build date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Decodes two BCD nibbles; out-of-range nibbles decode positionally
/// (`0xab` becomes 10 * 10 + 11) rather than being rejected, matching the
/// permissive hardware encoding.
const fn bcd_byte(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0xf)
}

/// Decodes four BCD nibbles.
const fn bcd_word(value: u16) -> u16 {
    ((value >> 12) & 0xf) * 1000
        + ((value >> 8) & 0xf) * 100
        + ((value >> 4) & 0xf) * 10
        + (value & 0xf)
}
