use crate::answer::CompletionRequest;
use crate::config::Settings;
use crate::index::VectorIndex;
use crate::ingest::ingest_upload;
use crate::prompt::PromptTemplate;
use crate::response::{parse_response, ParsedAnswer};
use crate::session::Session;
use crate::traits::{AnswerService, EmbeddingService};
use crate::{AskError, ConversationEntry, IngestionOptions, Upload};
use chrono::Utc;
use tracing::{info, info_span, warn, Instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedUpload {
    pub name: String,
    pub page_count: usize,
    pub chunk_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct UploadReport {
    pub processed: Vec<ProcessedUpload>,
    pub failed: Vec<FailedUpload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskWarning {
    NoQuestion,
    NoDocuments,
}

impl AskWarning {
    pub fn message(self) -> &'static str {
        match self {
            AskWarning::NoQuestion => "Please choose a predefined question or type your own.",
            AskWarning::NoDocuments => "Please upload and process a document first.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Answered {
    pub question: String,
    pub answer: ParsedAnswer,
    pub sources: Vec<String>,
    /// Set when the requested retrieval mode fell back to vector search.
    pub retrieval_notice: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AskOutcome {
    Warning(AskWarning),
    Answered(Answered),
}

/// Runs ingestion and question answering against one [`Session`].
pub struct CoPilot<E, A>
where
    E: EmbeddingService,
    A: AnswerService,
{
    embedder: E,
    answerer: A,
    template: PromptTemplate,
    options: IngestionOptions,
}

impl<E, A> CoPilot<E, A>
where
    E: EmbeddingService,
    A: AnswerService,
{
    pub fn new(embedder: E, answerer: A) -> Self {
        Self {
            embedder,
            answerer,
            template: PromptTemplate::default(),
            options: IngestionOptions::default(),
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_options(mut self, options: IngestionOptions) -> Self {
        self.options = options;
        self
    }

    /// Processes uploads one after another. A failure is recorded for that
    /// file only; the session index keeps everything absorbed before it.
    pub async fn process_uploads(&self, session: &mut Session, uploads: &[Upload]) -> UploadReport {
        let mut report = UploadReport::default();

        for upload in uploads {
            let span = info_span!("upload", session = %session.id(), document = %upload.name);
            let outcome = self.index_upload(session, upload).instrument(span).await;

            match outcome {
                Ok((page_count, chunk_count)) => {
                    info!(document = %upload.name, page_count, chunk_count, "processed upload");
                    report.processed.push(ProcessedUpload {
                        name: upload.name.clone(),
                        page_count,
                        chunk_count,
                    });
                }
                Err(reason) => {
                    warn!(document = %upload.name, %reason, "upload failed");
                    report.failed.push(FailedUpload {
                        name: upload.name.clone(),
                        reason,
                    });
                }
            }
        }

        report
    }

    /// Returns the page and chunk counts of the absorbed document.
    async fn index_upload(
        &self,
        session: &mut Session,
        upload: &Upload,
    ) -> Result<(usize, usize), String> {
        let document = ingest_upload(upload, &self.options).map_err(|error| error.to_string())?;
        let page_count = document.fingerprint.page_count;
        let chunk_count = document.chunks.len();
        let batch = VectorIndex::from_chunks(&self.embedder, document.chunks)
            .await
            .map_err(|error| error.to_string())?;
        session
            .absorb_index(batch)
            .map_err(|error| error.to_string())?;
        Ok((page_count, chunk_count))
    }

    /// Answers the resolved question. Warnings short-circuit before any
    /// service call; errors leave the history untouched.
    pub async fn ask(
        &self,
        session: &mut Session,
        custom_question: Option<&str>,
        settings: &Settings,
    ) -> Result<AskOutcome, AskError> {
        let Some(question) = session.resolve_question(custom_question) else {
            return Ok(AskOutcome::Warning(AskWarning::NoQuestion));
        };
        let Some(index) = session.index() else {
            return Ok(AskOutcome::Warning(AskWarning::NoDocuments));
        };

        let retrieval_notice = settings.retrieval_mode.fallback_notice();
        if let Some(notice) = &retrieval_notice {
            warn!(mode = %settings.retrieval_mode, "{notice}");
        }

        let span = info_span!("ask", session = %session.id(), model = %settings.model);
        let answered = async {
            let hits = index
                .similarity_search(&self.embedder, &question, settings.top_k.get())
                .await?;
            let retrieved: Vec<&str> = hits.iter().map(|hit| hit.chunk.text.as_str()).collect();
            let prompt = self
                .template
                .build(&question, &retrieved, settings.max_context_length);

            let raw = self
                .answerer
                .complete(&CompletionRequest {
                    model: settings.model,
                    temperature: settings.temperature,
                    prompt: prompt.text,
                })
                .await?;

            let mut sources: Vec<String> = Vec::new();
            for hit in &hits {
                if !sources.contains(&hit.chunk.document_name) {
                    sources.push(hit.chunk.document_name.clone());
                }
            }

            info!(
                retrieved = hits.len(),
                context_chars = prompt.context.chars().count(),
                "answered question"
            );
            Ok::<_, AskError>(Answered {
                question: question.clone(),
                answer: parse_response(&raw),
                sources,
                retrieval_notice,
            })
        }
        .instrument(span)
        .await?;

        session.record(ConversationEntry {
            question,
            answer: answered.answer.main.clone(),
            model: settings.model.id().to_string(),
            asked_at: Utc::now(),
        });

        Ok(AskOutcome::Answered(answered))
    }
}
