// Licensed under the Apache-2.0 license

//! Loads a candidate firmware image from a file and gates it through the
//! header validators. This is the last software-side check before an image
//! is handed to the update transport, so every ambiguity rejects: a failed
//! open, an unreadable length, a short read or a failed seek all surface as
//! rejections rather than best-effort guesses.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, error};
use pmem_fw_image::{
    validate_image, validate_recovery_spi_image, FwImageError, FwImageHeader, HardwareGeneration,
    SpiDirectory, FW_HEADER_SIZE, MAX_FIRMWARE_IMAGE_SIZE,
};

/// Which update path the candidate image is intended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwImageKind {
    /// Standard update streamed over the firmware mailbox.
    Standard,
    /// Flash dump written directly over SPI for device recovery.
    SpiRecovery,
}

/// Byte source a candidate image is read from.
///
/// The loader treats any non-success result as an unconditional rejection
/// and never inspects partial reads for plausible data.
pub trait ImageSource {
    /// Total byte length of the source.
    fn byte_length(&mut self) -> std::io::Result<u64>;

    /// Repositions the read cursor to `offset` from the start.
    fn seek_to(&mut self, offset: u64) -> std::io::Result<()>;

    /// Single-shot read starting at the current cursor; returns the number
    /// of bytes placed in `buffer`.
    fn read_into(&mut self, buffer: &mut [u8]) -> std::io::Result<usize>;
}

impl ImageSource for File {
    fn byte_length(&mut self) -> std::io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn seek_to(&mut self, offset: u64) -> std::io::Result<()> {
        self.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn read_into(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
        self.read(buffer)
    }
}

/// Opens a candidate image file, resolving `path` against
/// `working_directory` when one is supplied. An absolute path ignores the
/// working directory.
pub fn open_image_file(path: &Path, working_directory: Option<&Path>) -> std::io::Result<File> {
    let resolved: PathBuf = match working_directory {
        Some(directory) => directory.join(path),
        None => path.to_path_buf(),
    };
    File::open(resolved)
}

/// Opens `path` and runs [`load_and_validate`] over the file.
///
/// The file handle is scoped to this call and released on every exit path,
/// including early rejection.
pub fn load_and_validate_file(
    path: &Path,
    working_directory: Option<&Path>,
    kind: FwImageKind,
    generation: HardwareGeneration,
) -> Result<FwImageHeader, FwImageError> {
    let mut file = open_image_file(path, working_directory).map_err(|err| {
        error!("Opening {} failed: {err}", path.display());
        FwImageError::SourceFileNotValid
    })?;
    load_and_validate(&mut file, kind, generation)
}

/// Reads the header of the candidate image in `source` and checks it
/// against the validation rules for `kind`.
///
/// The stages run in a fixed order: length check against the kind's size
/// ceiling, SPI directory traversal to locate the embedded image (recovery
/// only), an exact header-sized read, then dispatch to the matching
/// validator. The first failing stage returns its rejection; nothing is
/// retried and no partial header is ever returned.
///
/// On the recovery path a file that also fits under the standard-image
/// ceiling may be a standard image supplied by mistake. Its header is read
/// from offset 0 instead of through the SPI directory, which is what lets
/// the recovery validator report it as a standard image. This mirrors the
/// device tooling's historical heuristic and is intentionally not any
/// smarter than that.
pub fn load_and_validate<S: ImageSource>(
    source: &mut S,
    kind: FwImageKind,
    generation: HardwareGeneration,
) -> Result<FwImageHeader, FwImageError> {
    let file_size = source.byte_length().map_err(|err| {
        error!("Could not read the image file length: {err}");
        FwImageError::FileInfoNotAccessible
    })?;

    let size_ceiling = match kind {
        FwImageKind::Standard => MAX_FIRMWARE_IMAGE_SIZE,
        FwImageKind::SpiRecovery => generation.spi_image_size(),
    };
    if file_size > size_ceiling {
        error!("File size is too large. It equals: {file_size}");
        return Err(FwImageError::FileTooLarge);
    }

    if file_size < FW_HEADER_SIZE as u64 {
        error!("File size is too small. It equals: {file_size}");
        return Err(FwImageError::FileTooSmall);
    }

    let might_be_standard_image =
        kind == FwImageKind::SpiRecovery && file_size <= MAX_FIRMWARE_IMAGE_SIZE;

    if kind == FwImageKind::SpiRecovery && !might_be_standard_image {
        seek_to_spi_image(source, generation)?;
    }

    let mut header_bytes = [0u8; FW_HEADER_SIZE];
    let bytes_read = source.read_into(&mut header_bytes).map_err(|err| {
        debug!("Reading the image header failed: {err}");
        FwImageError::FileReadFailed
    })?;
    if bytes_read != FW_HEADER_SIZE {
        debug!("Short image header read: {bytes_read} of {FW_HEADER_SIZE} bytes");
        return Err(FwImageError::FileReadFailed);
    }
    let header = FwImageHeader::decode(&header_bytes).ok_or(FwImageError::FileReadFailed)?;

    match kind {
        FwImageKind::Standard => validate_image(&header, file_size, MAX_FIRMWARE_IMAGE_SIZE)?,
        FwImageKind::SpiRecovery => validate_recovery_spi_image(&header, file_size, generation)?,
    }

    Ok(header)
}

/// Reads the generation's SPI directory from the start of the dump and
/// repositions `source` at the stage-1 firmware image it names.
fn seek_to_spi_image<S: ImageSource>(
    source: &mut S,
    generation: HardwareGeneration,
) -> Result<(), FwImageError> {
    let directory_size = generation.spi_directory_size();
    let mut directory_bytes = vec![0u8; directory_size];
    let bytes_read = source.read_into(&mut directory_bytes).map_err(|err| {
        debug!("Reading the SPI directory failed: {err}");
        FwImageError::FileReadFailed
    })?;
    if bytes_read != directory_size {
        debug!("Short SPI directory read: {bytes_read} of {directory_size} bytes");
        return Err(FwImageError::FileReadFailed);
    }

    let directory = SpiDirectory::decode(generation, &directory_bytes)
        .ok_or(FwImageError::FileReadFailed)?;
    source
        .seek_to(directory.fw_image_stage1_offset().into())
        .map_err(|err| {
            debug!("Seeking to the stage-1 image failed: {err}");
            FwImageError::FileReadFailed
        })
}
