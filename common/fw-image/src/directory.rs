// Licensed under the Apache-2.0 license

//! SPI directory records. A SPI flash dump starts with a small directory
//! naming the offsets of every blob inside the dump; the loader only needs
//! the stage-1 firmware image offset, but the full layouts are kept so the
//! records round-trip untouched.

use core::mem::size_of;

use zerocopy::byteorder::{LittleEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::generation::HardwareGeneration;

/// Directory layout revision written by current firmware.
pub const SPI_DIRECTORY_VERSION: u16 = 1;

/// First-generation SPI directory.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Clone, Copy, Immutable, KnownLayout)]
pub struct SpiDirectoryGen1 {
    pub directory_version: U16<LittleEndian>,
    pub directory_size: U16<LittleEndian>,
    pub soft_fuses_data_offset: U32<LittleEndian>,
    pub fw_image_stage1_offset: U32<LittleEndian>,
    pub fw_image_stage2_offset: U32<LittleEndian>,
    pub fw_image_copy_stage1_offset: U32<LittleEndian>,
    pub fw_image_copy_stage2_offset: U32<LittleEndian>,
    pub fw_image_dfx_stage1_offset: U32<LittleEndian>,
    pub fw_image_dfx_stage2_offset: U32<LittleEndian>,
}

const _: () = assert!(size_of::<SpiDirectoryGen1>() == 32);

/// Second-generation SPI directory.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Clone, Copy, Immutable, KnownLayout)]
pub struct SpiDirectoryGen2 {
    pub directory_version: U16<LittleEndian>,
    pub directory_size: U16<LittleEndian>,
    pub soft_fuses_data_offset: U32<LittleEndian>,
    pub directory_copy_offset: U32<LittleEndian>,
    pub mfg_cypher_offset: U32<LittleEndian>,
    pub fw_image_stage1_offset: U32<LittleEndian>,
    pub fw_image_stage2_offset: U32<LittleEndian>,
    pub spd_data_offset: U32<LittleEndian>,
    pub migration_data_offset: U32<LittleEndian>,
    pub fw_image_copy_stage1_offset: U32<LittleEndian>,
    pub fw_image_copy_stage2_offset: U32<LittleEndian>,
    pub sxp_saved_registers_offset: U32<LittleEndian>,
    pub ddrt_saved_registers_offset: U32<LittleEndian>,
    pub burnin_input_data_offset: U32<LittleEndian>,
    pub burnin_output_data_offset: U32<LittleEndian>,
    pub sxp_rank_interleaving_offset: U32<LittleEndian>,
    pub ddrt_io_mmrc_table_offset: U32<LittleEndian>,
    pub sxp_io_mmrc_table_offset: U32<LittleEndian>,
    pub fw_state_data_offset: U32<LittleEndian>,
    pub fconfig_data_offset: U32<LittleEndian>,
    pub sxp_timing_parameters_offset: U32<LittleEndian>,
    pub sxp_training_report_offset: U32<LittleEndian>,
    pub sxp_rmt_results_offset: U32<LittleEndian>,
    pub sxp_raw_training_data_offset: U32<LittleEndian>,
    pub pre_injection_module_framework_offset: U32<LittleEndian>,
    pub reserved: [u8; 32],
    pub reserved1: [u8; 3],
    pub spi_end_of_directory: u8,
}

const _: () = assert!(size_of::<SpiDirectoryGen2>() == 132);

/// A decoded SPI directory, tagged with the generation that produced it.
///
/// The generation is supplied by the caller (derived from the target
/// module's subsystem device id); the layout is never sniffed from the
/// record's own version field.
#[derive(Debug, Clone, Copy)]
pub enum SpiDirectory {
    Gen1(SpiDirectoryGen1),
    Gen2(SpiDirectoryGen2),
}

impl SpiDirectory {
    /// Decodes the generation's directory record from the start of `bytes`,
    /// by value. Returns `None` when the buffer is shorter than the record.
    pub fn decode(generation: HardwareGeneration, bytes: &[u8]) -> Option<Self> {
        match generation {
            HardwareGeneration::Gen1 => SpiDirectoryGen1::read_from_prefix(bytes)
                .ok()
                .map(|(directory, _)| Self::Gen1(directory)),
            HardwareGeneration::Gen2 => SpiDirectoryGen2::read_from_prefix(bytes)
                .ok()
                .map(|(directory, _)| Self::Gen2(directory)),
        }
    }

    pub fn directory_version(&self) -> u16 {
        match self {
            Self::Gen1(directory) => directory.directory_version.get(),
            Self::Gen2(directory) => directory.directory_version.get(),
        }
    }

    pub fn directory_size(&self) -> u16 {
        match self {
            Self::Gen1(directory) => directory.directory_size.get(),
            Self::Gen2(directory) => directory.directory_size.get(),
        }
    }

    /// Offset of the stage-1 firmware image inside the flash dump.
    pub fn fw_image_stage1_offset(&self) -> u32 {
        match self {
            Self::Gen1(directory) => directory.fw_image_stage1_offset.get(),
            Self::Gen2(directory) => directory.fw_image_stage1_offset.get(),
        }
    }
}
