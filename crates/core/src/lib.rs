pub mod answer;
pub mod chunking;
pub mod clipboard;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod response;
pub mod session;
pub mod traits;

pub use answer::{CompletionRequest, GroqChatClient};
pub use chunking::{build_chunks, ChunkingConfig, RecursiveSplitter};
pub use clipboard::SystemClipboard;
pub use config::{
    ChatModel, ContextLength, Credentials, Endpoints, RetrievalMode, Settings, Temperature,
    TopK,
};
pub use embeddings::OpenAiEmbeddings;
pub use error::{AnswerError, AskError, ClipboardError, ConfigError, IndexError, IngestError};
pub use extractor::{extract_page_texts, LopdfExtractor, PageText, PdfExtractor};
pub use index::{ScoredChunk, VectorIndex};
pub use ingest::{discover_pdf_files, ingest_upload, load_upload, IngestedDocument};
pub use models::{
    ConversationEntry, DocumentFingerprint, IngestionOptions, QuestionCategory, TextChunk, Upload,
};
pub use orchestrator::{
    AskOutcome, AskWarning, Answered, CoPilot, FailedUpload, ProcessedUpload, UploadReport,
};
pub use prompt::{build_context, Prompt, PromptTemplate};
pub use response::{parse_response, ParsedAnswer, FOLLOW_UP_MARKER};
pub use session::Session;
pub use traits::{AnswerService, Clipboard, EmbeddingService};
