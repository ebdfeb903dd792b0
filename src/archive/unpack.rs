use crate::FileEntry;
use crate::archive::ArchiveError;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::io::{Cursor, Read};
use tracing::info;
use zip::ZipArchive;

/// Unpack a base64-encoded zip archive into a file listing
///
/// Each file entry's bytes are base64-encoded so binary content survives
/// the JSON response. Directory entries are skipped. Listing order matches
/// archive order.
pub fn unpack_archive(encoded: &str) -> Result<Vec<FileEntry>, ArchiveError> {
    let bytes = STANDARD.decode(encoded)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut files = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        info!("Processing {} entry", name);

        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;

        files.push(FileEntry {
            name,
            content: STANDARD.encode(&content),
        });
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchiveFileSpec;
    use crate::archive::pack_files;

    #[test]
    fn test_entries_listed_in_archive_order() {
        let archive = pack_files(&[
            ArchiveFileSpec {
                name: "first.txt".to_string(),
                content: "1".to_string(),
                insert_if_empty: false,
            },
            ArchiveFileSpec {
                name: "second.txt".to_string(),
                content: "2".to_string(),
                insert_if_empty: false,
            },
        ])
        .unwrap();

        let files = unpack_archive(&archive).unwrap();
        assert_eq!(files[0].name, "first.txt");
        assert_eq!(files[1].name, "second.txt");
        assert_eq!(STANDARD.decode(&files[0].content).unwrap(), b"1".to_vec());
    }

    #[test]
    fn test_malformed_base64_rejected() {
        let err = unpack_archive("not-base64!").unwrap_err();
        assert!(matches!(err, ArchiveError::Base64(_)));
    }

    #[test]
    fn test_malformed_archive_rejected() {
        let encoded = STANDARD.encode(b"these are not zip bytes");
        let err = unpack_archive(&encoded).unwrap_err();
        assert!(matches!(err, ArchiveError::Zip(_)));
    }
}
