use crate::ArchiveFileSpec;
use crate::archive::ArchiveError;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::io::{Cursor, Write};
use tracing::debug;
use zip::{CompressionMethod, ZipWriter, write::FileOptions};

/// Pack file specs into a base64-encoded zip archive
///
/// Files with empty content are packed only when their `insert_if_empty`
/// flag is set; everything else is written as a deflated entry under its
/// given name, in input order.
///
/// # Errors
/// `ArchiveError::NoFiles` when no file survives the retention rule, so an
/// empty archive is never produced.
pub fn pack_files(files: &[ArchiveFileSpec]) -> Result<String, ArchiveError> {
    let retained: Vec<&ArchiveFileSpec> = files
        .iter()
        .filter(|file| file.insert_if_empty || !file.content.is_empty())
        .collect();

    if retained.is_empty() {
        return Err(ArchiveError::NoFiles);
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in retained {
        debug!("Packing {} into the archive", file.name);
        writer.start_file(file.name.as_str(), options)?;
        writer.write_all(file.content.as_bytes())?;
    }

    let cursor = writer.finish()?;
    Ok(STANDARD.encode(cursor.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::unpack_archive;

    fn spec(name: &str, content: &str, insert_if_empty: bool) -> ArchiveFileSpec {
        ArchiveFileSpec {
            name: name.to_string(),
            content: content.to_string(),
            insert_if_empty,
        }
    }

    #[test]
    fn test_packed_files_survive_unpacking() {
        let archive = pack_files(&[
            spec("a.csv", "name,city\nAlice,Oslo\n", false),
            spec("b.txt", "hello", false),
        ])
        .unwrap();

        let files = unpack_archive(&archive).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "a.csv");
        assert_eq!(
            STANDARD.decode(&files[1].content).unwrap(),
            b"hello".to_vec()
        );
    }

    #[test]
    fn test_empty_content_dropped_unless_flagged() {
        let archive = pack_files(&[
            spec("keep.txt", "", true),
            spec("drop.txt", "", false),
            spec("data.txt", "x", false),
        ])
        .unwrap();

        let files = unpack_archive(&archive).unwrap();
        let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, vec!["keep.txt", "data.txt"]);
    }

    #[test]
    fn test_no_eligible_files_rejected() {
        let err = pack_files(&[spec("drop.txt", "", false)]).unwrap_err();
        assert!(matches!(err, ArchiveError::NoFiles));
    }
}
