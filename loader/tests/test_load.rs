// Licensed under the Apache-2.0 license

//! End-to-end loader checks against real files on disk.

use std::fs;
use std::path::Path;

use pmem_fw_image::{
    ApiVersionRaw, FwImageError, FwImageHeader, FwVersionRaw, HardwareGeneration,
    SpiDirectoryGen2, FW_HEADER_SIZE, MAX_FIRMWARE_IMAGE_SIZE, MODULE_TYPE_CSS, MODULE_VENDOR_ID,
    SPI_DIRECTORY_VERSION, SPI_IMAGE_GEN2_SIZE,
};
use pmem_fw_loader::{load_and_validate_file, FwImageKind};
use zerocopy::{FromZeros, IntoBytes};

fn compatible_header() -> FwImageHeader {
    let mut header = FwImageHeader::new_zeroed();
    header.module_type = MODULE_TYPE_CSS.into();
    header.module_vendor = MODULE_VENDOR_ID.into();
    header.image_version = FwVersionRaw {
        build: 0x4321u16.into(),
        security_version: 0x12,
        revision: 0x01,
        product: 0x02,
    };
    header.fw_api_version = ApiVersionRaw {
        minor: 0x03,
        major: 0x01,
    };
    header
}

fn write_standard_image(path: &Path, total_size: usize) {
    let mut image = vec![0u8; total_size];
    image[..FW_HEADER_SIZE].copy_from_slice(compatible_header().as_bytes());
    fs::write(path, image).unwrap();
}

fn write_gen2_spi_image(path: &Path, total_size: usize, stage1_offset: u32) {
    let mut image = vec![0u8; total_size];
    let mut directory = SpiDirectoryGen2::new_zeroed();
    directory.directory_version = SPI_DIRECTORY_VERSION.into();
    directory.directory_size = 132u16.into();
    directory.fw_image_stage1_offset = stage1_offset.into();
    image[..132].copy_from_slice(directory.as_bytes());
    let start = stage1_offset as usize;
    image[start..start + FW_HEADER_SIZE].copy_from_slice(compatible_header().as_bytes());
    fs::write(path, image).unwrap();
}

#[test]
fn accepts_a_standard_update_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fw.bin");
    write_standard_image(&path, FW_HEADER_SIZE + 64);

    let header =
        load_and_validate_file(&path, None, FwImageKind::Standard, HardwareGeneration::Gen2)
            .unwrap();
    let info = header.info();
    assert_eq!(info.image_version.to_string(), "02.01.12.4321");
    assert_eq!(header.fw_api_version.decode().to_string(), "01.03");
    assert_eq!(info.module_vendor, MODULE_VENDOR_ID);
}

#[test]
fn oversized_standard_file_is_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fw.bin");
    write_standard_image(&path, MAX_FIRMWARE_IMAGE_SIZE as usize + 4);

    assert_eq!(
        load_and_validate_file(&path, None, FwImageKind::Standard, HardwareGeneration::Gen2),
        Err(FwImageError::FileTooLarge)
    );
}

#[test]
fn gen1_recovery_is_rejected_whatever_the_file_holds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recovery.bin");
    fs::write(&path, vec![0u8; 1024 * 1024]).unwrap();

    assert_eq!(
        load_and_validate_file(&path, None, FwImageKind::SpiRecovery, HardwareGeneration::Gen1),
        Err(FwImageError::Gen1RecoveryUnsupported)
    );
}

#[test]
fn accepts_an_exact_size_gen2_recovery_dump() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recovery.bin");
    write_gen2_spi_image(&path, SPI_IMAGE_GEN2_SIZE as usize, 0x2000);

    let header =
        load_and_validate_file(&path, None, FwImageKind::SpiRecovery, HardwareGeneration::Gen2)
            .unwrap();
    assert_eq!(header.module_vendor.get(), MODULE_VENDOR_ID);
}

#[test]
fn rejects_a_truncated_gen2_recovery_dump() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recovery.bin");
    write_gen2_spi_image(&path, SPI_IMAGE_GEN2_SIZE as usize - 1, 0x2000);

    assert_eq!(
        load_and_validate_file(&path, None, FwImageKind::SpiRecovery, HardwareGeneration::Gen2),
        Err(FwImageError::WrongImageSize)
    );
}

#[test]
fn missing_file_is_not_a_valid_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-image.bin");

    assert_eq!(
        load_and_validate_file(&path, None, FwImageKind::Standard, HardwareGeneration::Gen2),
        Err(FwImageError::SourceFileNotValid)
    );
}

#[test]
fn resolves_relative_paths_against_the_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_standard_image(&dir.path().join("fw.bin"), FW_HEADER_SIZE + 64);

    let header = load_and_validate_file(
        Path::new("fw.bin"),
        Some(dir.path()),
        FwImageKind::Standard,
        HardwareGeneration::Gen2,
    )
    .unwrap();
    assert_eq!(header.module_type.get(), MODULE_TYPE_CSS);
}

#[test]
fn rejection_reasons_read_like_operator_messages() {
    assert_eq!(
        FwImageError::WrongImageSize.to_string(),
        "The image has wrong size! Please try another image."
    );
    assert_eq!(
        FwImageError::StandardImageSuppliedForRecovery.to_string(),
        "This is a standard firmware image. Please provide a recovery image."
    );
}
