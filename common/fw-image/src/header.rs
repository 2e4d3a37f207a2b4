// Licensed under the Apache-2.0 license

use core::fmt;
use core::mem::size_of;

use zerocopy::byteorder::{LittleEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::version::{ApiVersionRaw, Date, DateRaw, FwVersion, FwVersionRaw};

/// Byte length of the CSS firmware header preceding every image payload.
pub const FW_HEADER_SIZE: usize = 128;

/// Vendor identifier a header must carry to be accepted.
pub const MODULE_VENDOR_ID: u32 = 0x8086;

/// Module type of a CSS-signed firmware module.
pub const MODULE_TYPE_CSS: u32 = 0x6;

pub const FW_IMAGE_TYPE_PRODUCTION: u8 = 0x1d;
pub const FW_IMAGE_TYPE_DFX: u8 = 0x1e;
pub const FW_IMAGE_TYPE_DEBUG: u8 = 0x1f;

/// The 128-byte CSS firmware image header.
///
/// Field order and widths are the module's binary contract; every multi-byte
/// field is little-endian and the layout carries no padding, so the struct
/// decodes straight off the wire by value.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Clone, Copy, Immutable, KnownLayout, PartialEq, Eq)]
pub struct FwImageHeader {
    pub module_type: U32<LittleEndian>,
    /// Header length in 4-byte words.
    pub header_len: U32<LittleEndian>,
    /// Major version in the high 16 bits, minor in the low 16.
    pub header_version: U32<LittleEndian>,
    /// Bit 31 set marks a debug-signed module.
    pub module_id: U32<LittleEndian>,
    pub module_vendor: U32<LittleEndian>,
    pub date: DateRaw,
    /// Module size in 4-byte words.
    pub size: U32<LittleEndian>,
    pub key_size: U32<LittleEndian>,
    pub modulus_size: U32<LittleEndian>,
    pub exponent_size: U32<LittleEndian>,
    pub image_type: u8,
    pub image_version: FwVersionRaw,
    pub part_id_high: U32<LittleEndian>,
    pub part_id_low: U32<LittleEndian>,
    /// Image size in 4-byte words.
    pub image_size: U32<LittleEndian>,
    pub fw_api_version: ApiVersionRaw,
    pub stage_number: u8,
    /// Flash address the stage is built for; 64-byte aligned.
    pub image_start_address: U32<LittleEndian>,
    pub vendor_id: U16<LittleEndian>,
    pub device_id: U16<LittleEndian>,
    pub revision_id: U16<LittleEndian>,
    pub number_of_stages: u8,
    pub reserved: [u8; 56],
}

const _: () = assert!(size_of::<FwImageHeader>() == FW_HEADER_SIZE);

impl FwImageHeader {
    /// Decodes a header from the first 128 bytes of `bytes`, by value.
    /// Returns `None` when the slice is shorter than a header.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        Self::read_from_prefix(bytes).ok().map(|(header, _)| header)
    }

    pub fn header_version_major(&self) -> u16 {
        (self.header_version.get() >> 16) as u16
    }

    pub fn header_version_minor(&self) -> u16 {
        self.header_version.get() as u16
    }

    /// True when the module was signed for debug; debug modules are refused
    /// by production-fused parts.
    pub fn is_debug_module(&self) -> bool {
        self.module_id.get() & 0x8000_0000 != 0
    }

    /// Classifies `image_type`; `None` for values outside the known set.
    pub fn fw_image_type(&self) -> Option<FwImageType> {
        FwImageType::from_u8(self.image_type)
    }

    /// Summary of the header fields the management layer reports for a
    /// loaded image.
    pub fn info(&self) -> FwImageInfo {
        FwImageInfo {
            image_version: self.image_version.decode(),
            firmware_type: self.fw_image_type(),
            module_vendor: self.module_vendor.get(),
            date: self.date.decode(),
            size: self.size.get(),
        }
    }
}

/// Image classification carried in the `image_type` header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwImageType {
    Production,
    Dfx,
    Debug,
}

impl FwImageType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            FW_IMAGE_TYPE_PRODUCTION => Some(Self::Production),
            FW_IMAGE_TYPE_DFX => Some(Self::Dfx),
            FW_IMAGE_TYPE_DEBUG => Some(Self::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for FwImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Production => "Production",
            Self::Dfx => "DFX",
            Self::Debug => "Debug",
        })
    }
}

/// Decoded summary of a firmware image, derived from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FwImageInfo {
    pub image_version: FwVersion,
    pub firmware_type: Option<FwImageType>,
    pub module_vendor: u32,
    pub date: Date,
    /// Module size in 4-byte words.
    pub size: u32,
}

impl From<&FwImageHeader> for FwImageInfo {
    fn from(header: &FwImageHeader) -> Self {
        header.info()
    }
}
