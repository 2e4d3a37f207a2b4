// Licensed under the Apache-2.0 license

use log::{debug, error};

use crate::error::FwImageError;
use crate::generation::HardwareGeneration;
use crate::header::{FwImageHeader, FW_HEADER_SIZE, MODULE_TYPE_CSS, MODULE_VENDOR_ID};
use crate::{MAX_FIRMWARE_IMAGE_SIZE, SMALL_PAYLOAD_PACKET_SIZE};

/// Checks whether an image is acceptable for a standard firmware update.
///
/// Each rule is a terminal decision point; the first failing rule's error is
/// returned. Acceptance here does not make the image fully valid: the module
/// runs its own security and CRC checks during the update and may still
/// refuse it.
///
/// # Arguments
///
/// * `header` - decoded header of the candidate image.
/// * `image_size` - the full image size in bytes, header included.
/// * `max_image_size` - the size ceiling in bytes for the target module.
///
/// # Returns
///
/// `Ok(())` when the image may be sent for update, otherwise the rejection
/// reason.
pub fn validate_image(
    header: &FwImageHeader,
    image_size: u64,
    max_image_size: u64,
) -> Result<(), FwImageError> {
    if image_size > max_image_size || image_size < FW_HEADER_SIZE as u64 {
        return Err(FwImageError::WrongImageSize);
    }

    if image_size % SMALL_PAYLOAD_PACKET_SIZE != 0 {
        debug!("The image size is not aligned to {SMALL_PAYLOAD_PACKET_SIZE} bytes");
        return Err(FwImageError::WrongImageSize);
    }

    if header.module_vendor.get() != MODULE_VENDOR_ID {
        return Err(FwImageError::VendorOrTypeMismatch);
    }

    if header.module_type.get() != MODULE_TYPE_CSS {
        return Err(FwImageError::VendorOrTypeMismatch);
    }

    Ok(())
}

/// Checks whether an image is acceptable for recovery over SPI.
///
/// A recovery image is defined as the complement of a standard image plus
/// generation and exact-size constraints, so the standard validation runs
/// first and its *success* rejects this path. Recovery images must match the
/// generation's SPI dump size exactly; there is no slack, unlike the standard
/// path's ceiling.
pub fn validate_recovery_spi_image(
    header: &FwImageHeader,
    image_size: u64,
    generation: HardwareGeneration,
) -> Result<(), FwImageError> {
    if validate_image(header, image_size, MAX_FIRMWARE_IMAGE_SIZE).is_ok() {
        error!("This is a standard firmware image. Please provide a recovery image");
        return Err(FwImageError::StandardImageSuppliedForRecovery);
    }

    if generation == HardwareGeneration::Gen1 {
        error!("First generation PMem modules are not supported for SPI image recovery");
        return Err(FwImageError::Gen1RecoveryUnsupported);
    }

    if image_size != generation.spi_image_size() {
        error!(
            "The SPI image size {image_size} does not match the expected {}",
            generation.spi_image_size()
        );
        return Err(FwImageError::WrongImageSize);
    }

    if header.module_vendor.get() != MODULE_VENDOR_ID || header.module_type.get() != MODULE_TYPE_CSS
    {
        error!("The firmware is not compatible with the PMem module");
        return Err(FwImageError::VendorOrTypeMismatch);
    }

    Ok(())
}
