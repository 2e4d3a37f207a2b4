// Licensed under the Apache-2.0 license

use core::fmt;

/// Why a candidate firmware image was rejected.
///
/// The variant is the programmatic kind; the `Display` text is the reason
/// shown to an operator. Every check in the validators and the loader is a
/// terminal decision point, so a rejection always carries exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwImageError {
    SourceFileNotValid,
    FileInfoNotAccessible,
    FileTooLarge,
    FileTooSmall,
    FileReadFailed,
    UnknownSubsystemDeviceId,
    WrongImageSize,
    VendorOrTypeMismatch,
    StandardImageSuppliedForRecovery,
    Gen1RecoveryUnsupported,
}

impl fmt::Display for FwImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::SourceFileNotValid => "The specified source file is not valid.",
            Self::FileInfoNotAccessible => {
                "Could not get the information about the firmware image file."
            }
            Self::FileTooLarge => "The firmware image file is too large.",
            Self::FileTooSmall => "The firmware image file is too small.",
            Self::FileReadFailed => "Could not read the firmware image file.",
            Self::UnknownSubsystemDeviceId => {
                "A PMem module is reporting an unexpected device id."
            }
            Self::WrongImageSize => "The image has wrong size! Please try another image.",
            Self::VendorOrTypeMismatch => {
                "The firmware is not compatible with the PMem module."
            }
            Self::StandardImageSuppliedForRecovery => {
                "This is a standard firmware image. Please provide a recovery image."
            }
            Self::Gen1RecoveryUnsupported => {
                "First generation PMem modules are not supported for SPI image recovery. \
                 A 1.x release of this software is required."
            }
        };
        f.write_str(reason)
    }
}

impl core::error::Error for FwImageError {}
