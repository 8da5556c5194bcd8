//! Built-in archive engine: zip, tar, tar.gz, tar.bz2 and tar.xz.
//!
//! Detection looks at the file name first and falls back to content
//! signatures, so archives served under opaque names are still recognized.
//! A compressed file only counts as an archive when it decompresses to a
//! tar stream. Anything else is reported as "not an archive" and left alone.

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Component, Path};
use tracing::{info, warn};
use xz2::read::XzDecoder;

use binwrap_core::{ArchiveExtractor, ArchiveFormat, BinWrapError, BinWrapResult, Extraction};

/// Offset of the `ustar` magic inside a tar header block.
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_MAGIC: &[u8] = b"ustar";
const ZIP_MAGICS: [&[u8]; 2] = [b"PK\x03\x04", b"PK\x05\x06"];

/// Stream compressors that may wrap a tar, keyed by their leading magic.
const COMPRESSED_TAR_MAGICS: [(&[u8], ArchiveFormat); 3] = [
    (&[0x1f, 0x8b], ArchiveFormat::TarGz),
    (b"BZh", ArchiveFormat::TarBz2),
    (&[0xfd, b'7', b'z', b'X', b'Z', 0x00], ArchiveFormat::TarXz),
];

/// File name suffixes, longest first within each format.
const NAME_SUFFIXES: [(&str, ArchiveFormat); 9] = [
    (".tar.gz", ArchiveFormat::TarGz),
    (".tgz", ArchiveFormat::TarGz),
    (".tar.bz2", ArchiveFormat::TarBz2),
    (".tbz2", ArchiveFormat::TarBz2),
    (".tbz", ArchiveFormat::TarBz2),
    (".tar.xz", ArchiveFormat::TarXz),
    (".txz", ArchiveFormat::TarXz),
    (".tar", ArchiveFormat::Tar),
    (".zip", ArchiveFormat::Zip),
];

/// [`ArchiveExtractor`] using the `zip`, `tar`, `flate2`, `bzip2` and `xz2`
/// crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinExtractor;

impl ArchiveExtractor for BuiltinExtractor {
    fn extract(&self, file: &Path, dest_dir: &Path) -> BinWrapResult<Extraction> {
        let Some(format) = detect_format(file)? else {
            info!(path = %file.display(), "Not an archive or unsupported archive format");
            return Ok(Extraction::NotAnArchive);
        };

        info!(path = %file.display(), %format, "Extracting archive");
        match format {
            ArchiveFormat::Zip => extract_zip(file, dest_dir)?,
            _ => extract_tar(tar_reader(format, file)?, file, dest_dir)?,
        }

        if let Err(e) = fs::remove_file(file) {
            warn!(path = %file.display(), error = %e, "Failed to remove extracted archive");
        }

        Ok(Extraction::Unpacked(format))
    }
}

/// Identify the archive format of `file`, if any.
pub fn detect_format(file: &Path) -> BinWrapResult<Option<ArchiveFormat>> {
    if let Some(format) = format_from_name(file) {
        return Ok(Some(format));
    }
    format_from_content(file)
}

fn format_from_name(file: &Path) -> Option<ArchiveFormat> {
    let name = file.file_name()?.to_string_lossy().to_ascii_lowercase();
    NAME_SUFFIXES
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|&(_, format)| format)
}

fn format_from_content(file: &Path) -> BinWrapResult<Option<ArchiveFormat>> {
    let header = read_block(open(file)?)
        .map_err(|e| BinWrapError::filesystem("read", file, e))?;

    if ZIP_MAGICS.iter().any(|magic| header.starts_with(magic)) {
        return Ok(Some(ArchiveFormat::Zip));
    }
    if has_tar_magic(&header) {
        return Ok(Some(ArchiveFormat::Tar));
    }
    for (magic, format) in COMPRESSED_TAR_MAGICS {
        if header.starts_with(magic) {
            // A compressed single binary is not an archive; only compressed tars are.
            let inner = read_block(tar_reader(format, file)?);
            if inner.is_ok_and(|block| has_tar_magic(&block)) {
                return Ok(Some(format));
            }
            return Ok(None);
        }
    }
    Ok(None)
}

/// Up to one tar header block from the start of `reader`.
fn read_block(reader: impl Read) -> io::Result<Vec<u8>> {
    let mut block = Vec::with_capacity(512);
    reader.take(512).read_to_end(&mut block)?;
    Ok(block)
}

fn has_tar_magic(block: &[u8]) -> bool {
    block
        .get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len())
        .is_some_and(|magic| magic == TAR_MAGIC)
}

fn open(file: &Path) -> BinWrapResult<File> {
    File::open(file).map_err(|e| BinWrapError::filesystem("open", file, e))
}

/// Decompressed tar stream for a tar-family `format`.
fn tar_reader(format: ArchiveFormat, file: &Path) -> BinWrapResult<Box<dyn Read>> {
    let raw = open(file)?;
    Ok(match format {
        ArchiveFormat::TarGz => Box::new(GzDecoder::new(raw)),
        ArchiveFormat::TarBz2 => Box::new(BzDecoder::new(raw)),
        ArchiveFormat::TarXz => Box::new(XzDecoder::new(raw)),
        ArchiveFormat::Tar | ArchiveFormat::Zip => Box::new(raw),
    })
}

/// True when `path` would land outside the directory it is joined onto.
fn escapes_destination(path: &Path) -> bool {
    path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

fn escape_error(archive_path: &Path, entry: impl std::fmt::Display) -> BinWrapError {
    BinWrapError::extraction(
        archive_path,
        format!("entry escapes the destination: {entry}"),
    )
}

/// Extract every entry of a zip archive into `dest_dir`, restoring Unix modes.
fn extract_zip(archive_path: &Path, dest_dir: &Path) -> BinWrapResult<()> {
    let mut archive = zip::ZipArchive::new(open(archive_path)?)
        .map_err(|e| BinWrapError::extraction(archive_path, e))?;

    fs::create_dir_all(dest_dir)
        .map_err(|e| BinWrapError::filesystem("create directory", dest_dir, e))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| BinWrapError::extraction(archive_path, e))?;

        let relative = entry
            .enclosed_name()
            .filter(|name| !escapes_destination(name))
            .ok_or_else(|| escape_error(archive_path, entry.name()))?;

        let output_path = dest_dir.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&output_path)
                .map_err(|e| BinWrapError::filesystem("create directory", &output_path, e))?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BinWrapError::filesystem("create directory", parent, e))?;
        }

        let mut outfile = File::create(&output_path)
            .map_err(|e| BinWrapError::filesystem("create file", &output_path, e))?;
        copy_entry(&mut entry, &mut outfile, archive_path, &output_path)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&output_path, fs::Permissions::from_mode(mode & 0o7777))
                .map_err(|e| BinWrapError::filesystem("set permissions on", &output_path, e))?;
        }
    }

    Ok(())
}

/// Copy one entry's bytes. Read failures mean the archive is bad
/// (`Extraction`); write failures are `Filesystem` errors on `output_path`.
fn copy_entry(
    reader: &mut impl Read,
    writer: &mut impl Write,
    archive_path: &Path,
    output_path: &Path,
) -> BinWrapResult<u64> {
    let mut buf = [0u8; 8192];
    let mut copied = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(BinWrapError::extraction(archive_path, e)),
        };
        writer
            .write_all(&buf[..n])
            .map_err(|e| BinWrapError::filesystem("write", output_path, e))?;
        copied += n as u64;
    }
    writer
        .flush()
        .map_err(|e| BinWrapError::filesystem("write", output_path, e))?;
    Ok(copied)
}

/// Extract a tar stream into `dest_dir`, restoring stored permissions.
///
/// Entries with `..`, absolute or prefixed paths are rejected before anything
/// is written for them. `tar` reports read and write failures of an entry
/// through the same `io::Error`, so both surface as `Extraction`.
fn extract_tar<R: Read>(reader: R, archive_path: &Path, dest_dir: &Path) -> BinWrapResult<()> {
    fs::create_dir_all(dest_dir)
        .map_err(|e| BinWrapError::filesystem("create directory", dest_dir, e))?;

    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);

    let entries = archive
        .entries()
        .map_err(|e| BinWrapError::extraction(archive_path, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| BinWrapError::extraction(archive_path, e))?;
        let relative = entry
            .path()
            .map_err(|e| BinWrapError::extraction(archive_path, e))?
            .into_owned();
        if escapes_destination(&relative) {
            return Err(escape_error(archive_path, relative.display()));
        }

        let unpacked = entry
            .unpack_in(dest_dir)
            .map_err(|e| BinWrapError::extraction(archive_path, e))?;
        if !unpacked {
            return Err(escape_error(archive_path, relative.display()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use binwrap_core::ErrorKind;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    fn tar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn bz2(data: &[u8]) -> Vec<u8> {
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn xz(data: &[u8]) -> Vec<u8> {
        let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    /// A tar whose single entry name is written verbatim, bypassing the
    /// builder's path checks.
    fn tar_with_raw_name(name: &[u8], data: &[u8]) -> Vec<u8> {
        let mut header = tar::Header::new_gnu();
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        let mut builder = tar::Builder::new(Vec::new());
        builder.append(&header, data).unwrap();
        builder.into_inner().unwrap()
    }

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
        for (path, data) in entries {
            writer.start_file(*path, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_tar_gz_is_unpacked_and_removed() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("tool.tar.gz");
        fs::write(&archive, gzip(&tar_bytes(&[("pkg/bin/tool", b"#!/bin/sh\n")]))).unwrap();

        let result = BuiltinExtractor.extract(&archive, dir.path()).unwrap();

        assert_eq!(result, Extraction::Unpacked(ArchiveFormat::TarGz));
        assert!(dir.path().join("pkg/bin/tool").is_file());
        assert!(!archive.exists());
    }

    #[test]
    fn test_zip_is_unpacked_and_removed() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("tool.zip");
        fs::write(&archive, zip_bytes(&[("tool-1.0/tool", b"binary")])).unwrap();

        let result = BuiltinExtractor.extract(&archive, dir.path()).unwrap();

        assert_eq!(result, Extraction::Unpacked(ArchiveFormat::Zip));
        assert_eq!(
            fs::read(dir.path().join("tool-1.0/tool")).unwrap(),
            b"binary"
        );
        assert!(!archive.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_zip_restores_unix_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("tool.zip");
        fs::write(&archive, zip_bytes(&[("tool", b"binary")])).unwrap();

        BuiltinExtractor.extract(&archive, dir.path()).unwrap();

        let mode = fs::metadata(dir.path().join("tool")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_plain_file_is_not_an_archive() {
        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("tool");
        fs::write(&binary, b"\x7fELF not really").unwrap();

        let result = BuiltinExtractor.extract(&binary, dir.path()).unwrap();

        assert_eq!(result, Extraction::NotAnArchive);
        assert_eq!(fs::read(&binary).unwrap(), b"\x7fELF not really");
    }

    #[test]
    fn test_gzipped_binary_is_not_an_archive() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("tool-download");
        fs::write(&file, gzip(b"just some bytes")).unwrap();

        assert_eq!(detect_format(&file).unwrap(), None);
    }

    #[test]
    fn test_content_detection_without_extension() {
        let dir = TempDir::new().unwrap();

        let zip_file = dir.path().join("download");
        fs::write(&zip_file, zip_bytes(&[("a", b"1")])).unwrap();
        assert_eq!(detect_format(&zip_file).unwrap(), Some(ArchiveFormat::Zip));

        let tgz_file = dir.path().join("download2");
        fs::write(&tgz_file, gzip(&tar_bytes(&[("a", b"1")]))).unwrap();
        assert_eq!(detect_format(&tgz_file).unwrap(), Some(ArchiveFormat::TarGz));

        let tar_file = dir.path().join("download3");
        fs::write(&tar_file, tar_bytes(&[("a", b"1")])).unwrap();
        assert_eq!(detect_format(&tar_file).unwrap(), Some(ArchiveFormat::Tar));
    }

    #[test]
    fn test_corrupt_archive_is_extraction_error_and_kept() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("broken.zip");
        fs::write(&archive, b"PK\x03\x04 truncated").unwrap();

        let err = BuiltinExtractor.extract(&archive, dir.path()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert!(archive.exists());
    }

    #[test]
    fn test_tar_bz2_and_tar_xz_are_unpacked() {
        let tar = tar_bytes(&[("pkg/tool", b"binary")]);
        for (name, bytes, format) in [
            ("tool.tar.bz2", bz2(&tar), ArchiveFormat::TarBz2),
            ("tool.tar.xz", xz(&tar), ArchiveFormat::TarXz),
        ] {
            let dir = TempDir::new().unwrap();
            let archive = dir.path().join(name);
            fs::write(&archive, bytes).unwrap();

            let result = BuiltinExtractor.extract(&archive, dir.path()).unwrap();

            assert_eq!(result, Extraction::Unpacked(format), "{name}");
            assert_eq!(fs::read(dir.path().join("pkg/tool")).unwrap(), b"binary");
            assert!(!archive.exists());
        }
    }

    #[test]
    fn test_compressed_tars_detected_by_content() {
        let dir = TempDir::new().unwrap();
        let tar = tar_bytes(&[("a", b"1")]);

        let bz = dir.path().join("download-bz");
        fs::write(&bz, bz2(&tar)).unwrap();
        assert_eq!(detect_format(&bz).unwrap(), Some(ArchiveFormat::TarBz2));

        let txz = dir.path().join("download-xz");
        fs::write(&txz, xz(&tar)).unwrap();
        assert_eq!(detect_format(&txz).unwrap(), Some(ArchiveFormat::TarXz));

        let plain_xz = dir.path().join("tool-xz");
        fs::write(&plain_xz, xz(b"a compressed binary")).unwrap();
        assert_eq!(detect_format(&plain_xz).unwrap(), None);
    }

    #[test]
    fn test_short_name_suffixes() {
        assert_eq!(format_from_name(Path::new("t.tgz")), Some(ArchiveFormat::TarGz));
        assert_eq!(format_from_name(Path::new("t.TBZ2")), Some(ArchiveFormat::TarBz2));
        assert_eq!(format_from_name(Path::new("t.txz")), Some(ArchiveFormat::TarXz));
        assert_eq!(format_from_name(Path::new("tool")), None);
    }

    #[test]
    fn test_tar_entry_escaping_destination_is_rejected() {
        let root = TempDir::new().unwrap();
        let dest = root.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        let archive = dest.join("evil.tar");
        fs::write(&archive, tar_with_raw_name(b"../evil", b"payload")).unwrap();

        let err = BuiltinExtractor.extract(&archive, &dest).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert!(err.to_string().contains("escapes"));
        assert!(!root.path().join("evil").exists());
        assert!(archive.exists());
    }

    #[test]
    fn test_zip_entry_escaping_destination_is_rejected() {
        let root = TempDir::new().unwrap();
        let dest = root.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        let archive = dest.join("evil.zip");
        fs::write(&archive, zip_bytes(&[("../evil", b"payload")])).unwrap();

        let err = BuiltinExtractor.extract(&archive, &dest).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert!(!root.path().join("evil").exists());
        assert!(archive.exists());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad deflate stream"))
        }
    }

    #[test]
    fn test_copy_entry_separates_read_and_write_failures() {
        let archive = Path::new("tool.zip");
        let output = Path::new("dest/tool");

        let err = copy_entry(&mut &b"bytes"[..], &mut FailingWriter, archive, output).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert!(err.to_string().contains("dest/tool"));

        let err = copy_entry(&mut FailingReader, &mut Vec::new(), archive, output).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);

        let mut sink = Vec::new();
        let copied = copy_entry(&mut &b"bytes"[..], &mut sink, archive, output).unwrap();
        assert_eq!(copied, 5);
        assert_eq!(sink, b"bytes");
    }
}
