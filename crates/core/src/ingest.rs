use crate::chunking::build_chunks;
use crate::extractor::{concatenate_pages, LopdfExtractor, PdfExtractor};
use crate::{DocumentFingerprint, IngestError, IngestionOptions, TextChunk, Upload};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

/// Reads a file from disk into an [`Upload`] named after its file name.
pub async fn load_upload(path: &Path) -> Result<Upload, IngestError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?;
    let bytes = tokio::fs::read(path).await?;
    Ok(Upload::new(name, bytes))
}

pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub fingerprint: DocumentFingerprint,
    pub chunks: Vec<TextChunk>,
}

/// Extracts, concatenates and splits one upload.
pub fn ingest_upload(
    upload: &Upload,
    options: &IngestionOptions,
) -> Result<IngestedDocument, IngestError> {
    ingest_upload_with(&LopdfExtractor, upload, options)
}

pub fn ingest_upload_with<X: PdfExtractor>(
    extractor: &X,
    upload: &Upload,
    options: &IngestionOptions,
) -> Result<IngestedDocument, IngestError> {
    let pages = extractor.extract_pages(&upload.name, &upload.bytes)?;
    let fingerprint = DocumentFingerprint {
        document_name: upload.name.clone(),
        checksum: digest_bytes(&upload.bytes),
        page_count: pages.len(),
        ingested_at: Utc::now(),
    };

    let text = concatenate_pages(&pages);
    let chunks = build_chunks(&fingerprint, &text, options)?;
    if chunks.is_empty() {
        return Err(IngestError::EmptyDocument(upload.name.clone()));
    }

    Ok(IngestedDocument {
        fingerprint,
        chunks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::tests::pdf_with_pages;
    use crate::extractor::PageText;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    struct FixedPages(Vec<&'static str>);

    impl PdfExtractor for FixedPages {
        fn extract_pages(&self, _name: &str, _bytes: &[u8]) -> Result<Vec<PageText>, IngestError> {
            Ok(self
                .0
                .iter()
                .enumerate()
                .map(|(index, text)| PageText {
                    number: index as u32 + 1,
                    text: text.to_string(),
                })
                .collect())
        }
    }

    #[test]
    fn discover_pdf_files_is_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("a.pdf")).and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(nested.join("b.PDF"))
            .and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(base.join("notes.txt"))?;

        let files = discover_pdf_files(base);
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn load_upload_uses_file_name() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("q3-report.pdf");
        fs::write(&path, b"abc")?;

        let upload = load_upload(&path).await?;
        assert_eq!(upload.name, "q3-report.pdf");
        assert_eq!(upload.bytes, b"abc");
        Ok(())
    }

    #[test]
    fn digest_is_reproducible() {
        assert_eq!(digest_bytes(b"abc"), digest_bytes(b"abc"));
        assert_ne!(digest_bytes(b"abc"), digest_bytes(b"abd"));
    }

    #[test]
    fn unreadable_pages_do_not_fail_the_document() {
        let extractor = FixedPages(vec!["Operating income", "", "rose 12%"]);
        let upload = Upload::new("fy24.pdf", b"ignored".to_vec());

        let document =
            ingest_upload_with(&extractor, &upload, &IngestionOptions::default()).unwrap();

        assert_eq!(document.fingerprint.page_count, 3);
        assert_eq!(document.chunks.len(), 1);
        assert_eq!(document.chunks[0].text, "Operating incomerose 12%");
    }

    #[test]
    fn document_without_text_is_reported_empty() {
        let extractor = FixedPages(vec!["", "  "]);
        let upload = Upload::new("scan.pdf", b"ignored".to_vec());

        let result = ingest_upload_with(&extractor, &upload, &IngestionOptions::default());
        assert!(matches!(result, Err(IngestError::EmptyDocument(name)) if name == "scan.pdf"));
    }

    #[test]
    fn real_pdf_is_chunked() {
        let upload = Upload::new("annual.pdf", pdf_with_pages(&["Total revenue 120"]));
        let document = ingest_upload(&upload, &IngestionOptions::default()).unwrap();
        assert!(document.chunks[0].text.contains("Total revenue"));
    }
}
