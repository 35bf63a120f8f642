use crate::error::IngestError;
use lopdf::Document;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait PdfExtractor {
    /// Extracts text page by page. A page whose text cannot be read comes
    /// back with empty text; only an unreadable document is an error.
    fn extract_pages(&self, name: &str, bytes: &[u8]) -> Result<Vec<PageText>, IngestError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, name: &str, bytes: &[u8]) -> Result<Vec<PageText>, IngestError> {
        let document = Document::load_mem(bytes)
            .map_err(|error| IngestError::PdfParse(format!("{name}: {error}")))?;

        let pages = document
            .get_pages()
            .into_keys()
            .map(|page_no| {
                let text = document.extract_text(&[page_no]).unwrap_or_else(|error| {
                    debug!(document = name, page = page_no, %error, "page text unreadable");
                    String::new()
                });
                PageText {
                    number: page_no,
                    text,
                }
            })
            .collect();

        Ok(pages)
    }
}

/// Joins page texts in page order with no separator.
pub fn concatenate_pages(pages: &[PageText]) -> String {
    pages.iter().map(|page| page.text.as_str()).collect()
}

pub fn extract_page_texts(name: &str, bytes: &[u8]) -> Result<Vec<PageText>, IngestError> {
    LopdfExtractor.extract_pages(name, bytes)
}
