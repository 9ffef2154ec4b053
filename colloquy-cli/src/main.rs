//! Terminal chat that keeps each answer's reasoning alongside it

mod session;

use anyhow::{Context, Result};
use clap::Parser;
use colloquy_client::{AttachmentKind, Captured, Client, ClientConfig};
use colloquy_core::{Error, Message, Role};
use colloquy_providers::OpenAI;
use colloquy_state::naming::{self, DEFAULT_DIR};
use colloquy_state::{ConversationLog, Exporter, HtmlExporter, JsonStore, MarkdownExporter};
use session::{Interrupt, Phase, Prompter, SessionState};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the colloquy chat
#[derive(Parser)]
#[command(
    name = "colloquy",
    about = "Chat with an OpenAI-compatible endpoint, keeping its reasoning alongside each answer"
)]
struct Args {
    /// Path to the INI configuration file
    #[clap(short, long, default_value = "config.ini")]
    config: PathBuf,

    /// Configuration section to use; all sections are merged when omitted
    #[clap(short, long)]
    section: Option<String>,

    /// Override the model_name from the configuration
    #[clap(short, long)]
    model: Option<String>,

    /// Directory the conversation is saved to on exit
    #[clap(short, long, default_value = DEFAULT_DIR)]
    output_dir: PathBuf,

    /// Do not echo responses while they stream
    #[clap(long)]
    no_echo: bool,

    /// Sampling temperature sent with every request
    #[clap(short, long)]
    temperature: Option<f32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("colloquy=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = ClientConfig::load(&args.config, args.section.as_deref())
        .with_context(|| format!("cannot load configuration from {}", args.config.display()))?;

    let model = args.model.unwrap_or_else(|| config.model_name.clone());
    let mut options = config.options.clone();
    if let Some(temperature) = args.temperature {
        options = options.temperature(temperature);
    }

    let provider = OpenAI::from_config(config.openai_config())?;
    let client = Arc::new(
        Client::new(provider, model)
            .with_options(options)
            .with_echo(!args.no_echo),
    );
    info!(model = %client.model(), base_url = %config.base_url, "Session started");

    let mut log = ConversationLog::new();
    if let Some(prompt) = &config.system_prompt {
        log.push(Message::system(prompt.clone()));
    }

    let state = Arc::new(SessionState::new());
    watch_interrupts(state.clone(), client.clone());
    let prompter = Prompter::spawn().context("cannot start the input thread")?;

    loop {
        state.enter(Phase::Prompting);
        let turn = tokio::select! {
            _ = state.ended() => {
                eprintln!("\n👋 Interrupted, ending the session.");
                break;
            }
            turn = prompter.next_turn() => turn,
        };
        let captured = match turn {
            Some(Ok(captured)) => captured,
            Some(Err(e)) => {
                error!("Cannot read input: {}", e);
                break;
            }
            None => break,
        };
        if captured.is_empty() {
            break;
        }

        if !append_user_turn(&mut log, captured).await {
            continue;
        }

        state.enter(Phase::Dispatching);
        match client.dispatch(log.messages(), None).await {
            Ok(completion) => log.record_completion(&completion),
            Err(Error::Cancelled) => eprintln!("\n⏹ Response cancelled."),
            Err(e) => eprintln!("\n❌ {}", e),
        }
    }

    state.enter(Phase::Saving);
    save_all(&log, &args.output_dir).await;
    Ok(())
}

/// Route every Ctrl-C of the session according to its current phase
fn watch_interrupts(state: Arc<SessionState>, client: Arc<Client<OpenAI>>) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match state.interrupt() {
                Interrupt::CancelDispatch => client.cancel(),
                Interrupt::EndSession => debug!("Ctrl-C at the prompt"),
                Interrupt::Abort => {
                    eprintln!("\n⏹ Interrupted while saving.");
                    std::process::exit(130);
                }
            }
        }
    });
}

/// Add the captured turn to the log; false if nothing was added
async fn append_user_turn(log: &mut ConversationLog, captured: Captured) -> bool {
    let Captured { text, attachment } = captured;

    match attachment {
        Some(attachment) if attachment.kind == AttachmentKind::Image => {
            match log.push_user_with_image(text, &attachment.path).await {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("❌ {}", Error::from(e));
                    false
                }
            }
        }
        Some(attachment) => match tokio::fs::read_to_string(&attachment.path).await {
            Ok(contents) => {
                log.push_text(Role::User, with_file(&text, &attachment.path, &contents));
                true
            }
            Err(e) => {
                eprintln!("❌ Cannot read {}: {}", attachment.path.display(), e);
                false
            }
        },
        None => {
            log.push_text(Role::User, text);
            true
        }
    }
}

fn with_file(text: &str, path: &Path, contents: &str) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut message = String::new();
    if !text.trim().is_empty() {
        message.push_str(text);
        message.push_str("\n\n");
    }
    message.push_str(&format!("[File: {}]\n```\n{}\n```", name, contents.trim_end()));
    message
}

async fn save_all(log: &ConversationLog, dir: &Path) {
    if log.messages().iter().all(|m| m.role() == Role::System) {
        debug!("Nothing to save");
        return;
    }

    let stem = naming::default_stem_now(log);
    let exporters: [Box<dyn Exporter>; 3] = [
        Box::new(JsonStore::new()),
        Box::new(MarkdownExporter::new()),
        Box::new(HtmlExporter::new()),
    ];
    for exporter in &exporters {
        match exporter.export_named(log, dir, &stem).await {
            Ok(path) => eprintln!("💾 Saved {}", path.display()),
            Err(e) => {
                warn!(format = exporter.extension(), "Save failed");
                eprintln!("❌ Saving {} failed: {}", exporter.extension(), e);
            }
        }
    }
}
