use crate::domain::model::Archive;
use crate::domain::ports::ArchiveWriter;
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveWriter;

impl ArchiveWriter for ZipArchiveWriter {
    fn pack(&self, archive: &Archive) -> Result<Vec<u8>> {
        tracing::debug!("Creating ZIP file with {} files", archive.len());

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for entry in archive.entries() {
            zip.start_file(entry.file_name.as_str(), options)?;
            zip.write_all(&entry.bytes)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CertificateDocument;
    use std::io::Read;

    #[test]
    fn test_packs_entries_in_order() {
        let mut archive = Archive::new();
        for (name, body) in [("Ana_certificado.pdf", "a"), ("Bruno_certificado.pdf", "b")] {
            archive.insert(CertificateDocument {
                file_name: name.to_string(),
                bytes: body.as_bytes().to_vec(),
            });
        }

        let bytes = ZipArchiveWriter.pack(&archive).unwrap();
        let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 2);
        assert_eq!(zip.by_index(0).unwrap().name(), "Ana_certificado.pdf");

        let mut content = String::new();
        zip.by_name("Bruno_certificado.pdf")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "b");
    }

    #[test]
    fn test_empty_archive_is_valid_zip() {
        let bytes = ZipArchiveWriter.pack(&Archive::new()).unwrap();
        let zip = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 0);
    }
}
