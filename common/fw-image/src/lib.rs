// Licensed under the Apache-2.0 license
#![cfg_attr(not(test), no_std)]

//! Binary layout and acceptance rules for PMem module firmware images: the
//! 128-byte CSS firmware header, the generation-specific SPI directory
//! records that locate an image inside a flash dump, and the validators
//! gating standard updates and SPI recovery writes. Validation here is
//! structural only; the module itself performs the cryptographic checks.

pub mod directory;
pub mod error;
pub mod generation;
pub mod header;
pub mod verify;
pub mod version;

pub use directory::{SpiDirectory, SpiDirectoryGen1, SpiDirectoryGen2, SPI_DIRECTORY_VERSION};
pub use error::FwImageError;
pub use generation::{
    HardwareGeneration, SPI_IMAGE_GEN1_SIZE, SPI_IMAGE_GEN2_SIZE, SUBSYSTEM_DEVICE_ID_GEN1,
    SUBSYSTEM_DEVICE_ID_GEN2,
};
pub use header::{
    FwImageHeader, FwImageInfo, FwImageType, FW_HEADER_SIZE, MODULE_TYPE_CSS, MODULE_VENDOR_ID,
};
pub use verify::{validate_image, validate_recovery_spi_image};
pub use version::{ApiVersion, ApiVersionRaw, Date, DateRaw, FwVersion, FwVersionRaw};

/// Largest standard firmware update image accepted for any generation.
pub const MAX_FIRMWARE_IMAGE_SIZE: u64 = 788 * 1024;

/// Firmware transport packet granularity; update images must be a whole
/// number of packets.
pub const SMALL_PAYLOAD_PACKET_SIZE: u64 = 64;
