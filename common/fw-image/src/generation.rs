// Licensed under the Apache-2.0 license

use core::mem::size_of;

use log::error;

use crate::directory::{SpiDirectoryGen1, SpiDirectoryGen2};
use crate::error::FwImageError;

/// SPD subsystem device id reported by first-generation modules.
pub const SUBSYSTEM_DEVICE_ID_GEN1: u16 = 0x097a;

/// SPD subsystem device id reported by second-generation modules.
pub const SUBSYSTEM_DEVICE_ID_GEN2: u16 = 0x097b;

/// Exact byte size of a first-generation SPI recovery image.
pub const SPI_IMAGE_GEN1_SIZE: u64 = 1024 * 1024;

/// Exact byte size of a second-generation SPI recovery image.
pub const SPI_IMAGE_GEN2_SIZE: u64 = 2 * 1024 * 1024;

/// Hardware revision of the target module.
///
/// Fixes which SPI directory layout and which recovery image size apply.
/// Always derived from the module's subsystem device id, never from image
/// contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareGeneration {
    Gen1,
    Gen2,
}

impl HardwareGeneration {
    pub fn from_subsystem_device_id(subsystem_device_id: u16) -> Result<Self, FwImageError> {
        match subsystem_device_id {
            SUBSYSTEM_DEVICE_ID_GEN1 => Ok(Self::Gen1),
            SUBSYSTEM_DEVICE_ID_GEN2 => Ok(Self::Gen2),
            _ => {
                error!("Unknown subsystem device id received: {subsystem_device_id:#06x}");
                Err(FwImageError::UnknownSubsystemDeviceId)
            }
        }
    }

    /// Exact byte size of a SPI recovery image for this generation.
    pub fn spi_image_size(self) -> u64 {
        match self {
            Self::Gen1 => SPI_IMAGE_GEN1_SIZE,
            Self::Gen2 => SPI_IMAGE_GEN2_SIZE,
        }
    }

    /// Byte size of the SPI directory record this generation writes at the
    /// start of a flash dump.
    pub fn spi_directory_size(self) -> usize {
        match self {
            Self::Gen1 => size_of::<SpiDirectoryGen1>(),
            Self::Gen2 => size_of::<SpiDirectoryGen2>(),
        }
    }
}
