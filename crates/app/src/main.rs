mod commands;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use commands::{parse_line, zero_based, ChatCommand, HELP};
use fdd_copilot_core::config::{DEFAULT_GROQ_BASE_URL, DEFAULT_OPENAI_BASE_URL, DEFAULT_TOP_K};
use fdd_copilot_core::{
    discover_pdf_files, load_upload, AnswerService, AskOutcome, ChatModel, Clipboard, CoPilot,
    ContextLength, Credentials, EmbeddingService, Endpoints, GroqChatClient, OpenAiEmbeddings,
    QuestionCategory, RetrievalMode, Session, Settings, SystemClipboard, Temperature, TopK,
    Upload,
};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "fdd-copilot", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Key for the embedding service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    openai_api_key: Option<String>,

    /// Key for the answer service
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, global = true)]
    groq_api_key: Option<String>,

    /// Reserved key; required but not used for requests
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true, global = true)]
    deepseek_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible embeddings API
    #[arg(long, default_value = DEFAULT_OPENAI_BASE_URL, global = true)]
    openai_base_url: String,

    /// Base URL of the Groq OpenAI-compatible chat API
    #[arg(long, default_value = DEFAULT_GROQ_BASE_URL, global = true)]
    groq_base_url: String,
}

#[derive(Args)]
struct SettingsArgs {
    /// Answer model
    #[arg(long, default_value = "llama-3.3-70b-versatile", global = true)]
    model: ChatModel,

    /// Sampling temperature, 0.0 to 1.0
    #[arg(long, default_value_t = 0.3, global = true)]
    temperature: f32,

    /// Maximum characters of retrieved context, 1000 to 8000
    #[arg(long, default_value_t = 3_000, global = true)]
    max_context_length: usize,

    /// Retrieve mode (hybrid, vector, text)
    #[arg(long, default_value = "hybrid", global = true)]
    retrieve_mode: RetrievalMode,

    /// Number of chunks retrieved per question
    #[arg(long, default_value_t = DEFAULT_TOP_K, global = true)]
    top_k: usize,
}

impl SettingsArgs {
    fn to_settings(&self) -> anyhow::Result<Settings> {
        Ok(Settings {
            model: self.model,
            temperature: Temperature::new(self.temperature)?,
            max_context_length: ContextLength::new(self.max_context_length)?,
            retrieval_mode: self.retrieve_mode,
            top_k: TopK::new(self.top_k)?,
        })
    }
}

#[derive(Args)]
struct UploadArgs {
    /// PDF file to upload; repeat for several.
    #[arg(long = "pdf")]
    pdfs: Vec<PathBuf>,

    /// Folder whose PDFs are uploaded recursively.
    #[arg(long)]
    folder: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Upload PDFs and answer a single question.
    Ask {
        #[command(flatten)]
        uploads: UploadArgs,
        /// Custom question; takes precedence over --category.
        #[arg(long)]
        question: Option<String>,
        /// Hypothesis whose predefined questions are offered.
        #[arg(long)]
        category: Option<QuestionCategory>,
        /// Predefined question number within the category (default 1).
        #[arg(long)]
        pick: Option<usize>,
        /// Copy follow-up question n to the clipboard.
        #[arg(long)]
        copy: Option<usize>,
    },
    /// Upload PDFs and ask questions interactively.
    Chat {
        #[command(flatten)]
        uploads: UploadArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let credentials = Credentials::from_lookup(|name| match name {
        fdd_copilot_core::config::OPENAI_API_KEY => cli.openai_api_key.clone(),
        fdd_copilot_core::config::GROQ_API_KEY => cli.groq_api_key.clone(),
        fdd_copilot_core::config::DEEPSEEK_API_KEY => cli.deepseek_api_key.clone(),
        _ => None,
    })
    .map_err(|error| anyhow::anyhow!("API keys are missing: {error}"))?;
    let settings = cli.settings.to_settings()?;
    let endpoints = Endpoints::parse(&cli.openai_base_url, &cli.groq_base_url)?;

    let embedder = OpenAiEmbeddings::new(endpoints.embeddings.clone(), &credentials.openai_api_key);
    let answerer = GroqChatClient::new(endpoints.completions.clone(), &credentials.groq_api_key);
    let copilot = CoPilot::new(embedder, answerer);
    let mut session = Session::new();

    info!(
        version = app_version,
        session = %session.id(),
        model = %settings.model,
        started_at = %Utc::now().to_rfc3339(),
        "fdd-copilot boot"
    );

    match cli.command {
        Command::Ask {
            uploads,
            question,
            category,
            pick,
            copy,
        } => {
            upload_documents(&copilot, &mut session, &uploads).await;

            if let Some(category) = category {
                session.select_category(category);
                print_predefined(&session);
            }
            if let Some(pick) = pick {
                let chosen =
                    zero_based(pick).is_some_and(|position| session.choose_predefined(position));
                if !chosen {
                    anyhow::bail!("--pick {pick} is not one of the predefined questions");
                }
            }
            let copy = copy
                .map(|number| {
                    zero_based(number).ok_or_else(|| {
                        anyhow::anyhow!("--copy {number} is not a follow-up question")
                    })
                })
                .transpose()?;

            let follow_ups = submit(&copilot, &mut session, question.as_deref(), &settings).await;
            if let Some(position) = copy {
                copy_follow_up(&SystemClipboard::default(), &follow_ups, position).await;
            }
            print_history(&session);
        }
        Command::Chat { uploads } => {
            upload_documents(&copilot, &mut session, &uploads).await;
            chat_loop(&copilot, &mut session, &settings).await?;
        }
    }

    Ok(())
}

async fn collect_uploads(args: &UploadArgs) -> Vec<Upload> {
    let mut paths = args.pdfs.clone();
    if let Some(folder) = &args.folder {
        let found = discover_pdf_files(folder);
        if found.is_empty() {
            warn!(folder = %folder.display(), "no pdf files found");
        }
        paths.extend(found);
    }

    let mut uploads = Vec::new();
    for path in paths {
        match load_upload(&path).await {
            Ok(upload) => uploads.push(upload),
            Err(error) => println!("Error processing {}: {error}", path.display()),
        }
    }
    uploads
}

async fn upload_documents<E, A>(copilot: &CoPilot<E, A>, session: &mut Session, args: &UploadArgs)
where
    E: EmbeddingService,
    A: AnswerService,
{
    let uploads = collect_uploads(args).await;
    if uploads.is_empty() {
        return;
    }

    println!("Processing Documents...");
    let report = copilot.process_uploads(session, &uploads).await;
    for processed in &report.processed {
        println!(
            "Processed: {} ({} pages, {} chunks)",
            processed.name, processed.page_count, processed.chunk_count
        );
    }
    for failed in &report.failed {
        println!("Error processing {}: {}", failed.name, failed.reason);
    }
}

/// Submits one question and prints the outcome. Returns the follow-up
/// questions of a successful answer.
async fn submit<E, A>(
    copilot: &CoPilot<E, A>,
    session: &mut Session,
    custom: Option<&str>,
    settings: &Settings,
) -> Vec<String>
where
    E: EmbeddingService,
    A: AnswerService,
{
    match copilot.ask(session, custom, settings).await {
        Ok(AskOutcome::Warning(warning)) => {
            println!("Warning: {}", warning.message());
            Vec::new()
        }
        Ok(AskOutcome::Answered(answered)) => {
            if let Some(notice) = &answered.retrieval_notice {
                println!("Note: {notice}");
            }
            println!("Response:\n\n{}", answered.answer.main.trim_end());
            if !answered.sources.is_empty() {
                println!("\nSources: {}", answered.sources.join(", "));
            }
            if !answered.answer.follow_ups.is_empty() {
                println!("\nFollow-up Questions:");
                for (position, follow_up) in answered.answer.follow_ups.iter().enumerate() {
                    println!("  {}. {follow_up}", position + 1);
                }
            }
            answered.answer.follow_ups
        }
        Err(error) => {
            println!("Error: {error}");
            Vec::new()
        }
    }
}

async fn copy_follow_up<C: Clipboard>(clipboard: &C, follow_ups: &[String], position: usize) {
    let Some(text) = follow_ups.get(position) else {
        println!("Warning: there is no follow-up question {}", position + 1);
        return;
    };

    match clipboard.copy(text).await {
        Ok(()) => println!("Copied to clipboard!"),
        Err(error) => {
            warn!(%error, "clipboard copy failed");
            println!("Could not copy to clipboard: {error}");
        }
    }
}

fn print_predefined(session: &Session) {
    if let Some(category) = session.category() {
        println!("{category} hypothesis:");
    }
    let selected = session.selected_question();
    for (position, question) in session.predefined_questions().iter().enumerate() {
        let marker = if Some(question.as_str()) == selected { "*" } else { " " };
        println!(" {marker} {}. {question}", position + 1);
    }
}

fn print_history(session: &Session) {
    if session.history().is_empty() {
        return;
    }
    println!("\nConversation History");
    for (position, entry) in session.history().iter().enumerate() {
        println!("Q{}: {}", position + 1, entry.question);
        println!("A: {}", entry.answer.trim_end());
    }
}

async fn chat_loop<E, A>(
    copilot: &CoPilot<E, A>,
    session: &mut Session,
    settings: &Settings,
) -> anyhow::Result<()>
where
    E: EmbeddingService,
    A: AnswerService,
{
    let clipboard = SystemClipboard::default();
    let mut follow_ups: Vec<String> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Help => println!("{HELP}"),
            ChatCommand::Quit => break,
            ChatCommand::Invalid(message) => println!("Warning: {message}"),
            ChatCommand::Category(category) => {
                session.select_category(category);
                print_predefined(session);
            }
            ChatCommand::Pick(position) => {
                if session.choose_predefined(position) {
                    print_predefined(session);
                } else {
                    println!("Warning: no predefined question {}", position + 1);
                }
            }
            ChatCommand::Ask => {
                follow_ups = submit(copilot, session, None, settings).await;
            }
            ChatCommand::Question(text) => {
                follow_ups = submit(copilot, session, Some(&text), settings).await;
            }
            ChatCommand::Copy(position) => {
                copy_follow_up(&clipboard, &follow_ups, position).await;
            }
            ChatCommand::History => print_history(session),
        }
    }

    Ok(())
}
