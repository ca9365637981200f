//! Microblog CLI entry point.
//!
//! # Usage
//!
//! ```bash
//! microblog create alice
//! microblog post "hello world" -f photo.png
//! microblog list --count 5 --save-attachment
//! ```

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use microblog_cli::{
    CliError, TerminalConfirm,
    commands::{self, ListOptions},
};
use microblog_client::{
    ClientConfig, ClientError, Confirm, DEFAULT_ATTACHMENT_DIR, DEFAULT_IDENTITY_PATH,
    DEFAULT_SERVER_URL, FixedAnswer, SystemEnv, WalkRequest, store::HttpFeedStore,
};
use microblog_proto::limits::DEFAULT_LIST_COUNT;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Microblog command-line client
#[derive(Parser, Debug)]
#[command(name = "microblog")]
#[command(about = "Publish and read signed microblog messages")]
#[command(version)]
struct Args {
    /// Feed store base URL
    #[arg(long, env = "MICROBLOG_SERVER", default_value = DEFAULT_SERVER_URL, global = true)]
    server: String,

    /// Identity file
    #[arg(long, env = "MICROBLOG_IDENTITY", default_value = DEFAULT_IDENTITY_PATH, global = true)]
    identity: PathBuf,

    /// Directory of trusted public identity files
    #[arg(long, env = "MICROBLOG_KEYRING", global = true)]
    keyring: Option<PathBuf>,

    /// Directory for saved attachments
    #[arg(long, env = "MICROBLOG_ATTACHMENTS", default_value = DEFAULT_ATTACHMENT_DIR, global = true)]
    attachments: PathBuf,

    /// Answer yes to every overwrite question
    #[arg(short, long, global = true)]
    yes: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new identity
    Create {
        /// Username (prompted for when omitted)
        username: Option<String>,
    },

    /// Post a new message
    Post {
        /// Message text
        message: String,

        /// File to attach
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List messages, newest first
    List {
        /// Id to start listing from
        #[arg(short, long)]
        starting: Option<u64>,

        /// Number of messages to retrieve
        #[arg(short, long, default_value_t = DEFAULT_LIST_COUNT)]
        count: usize,

        /// Save attachments of listed messages
        #[arg(long)]
        save_attachment: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(io::stderr(), "error: {err}");
            ExitCode::from(&err)
        },
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = ClientConfig {
        server_url: args.server,
        identity_path: args.identity,
        keyring_dir: args.keyring,
        attachment_dir: args.attachments,
        ..ClientConfig::default()
    };
    config.validate()?;

    let mut terminal = TerminalConfirm::new(io::stdin().lock(), io::stderr());
    let command = match args.command {
        Command::Create { username: None } => {
            Command::Create { username: Some(prompt_username(&mut terminal)?) }
        },
        command => command,
    };

    let mut assume_yes = FixedAnswer(true);
    let confirm: &mut dyn Confirm = if args.yes { &mut assume_yes } else { &mut terminal };

    let env = SystemEnv::new();
    let mut out = io::stdout().lock();

    match command {
        Command::Create { username } => {
            let username = username.unwrap_or_default();
            commands::create(&config, &username, &env, confirm, &mut out)
        },
        Command::Post { message, file } => {
            let store = http_store(&config)?;
            commands::post(&config, &store, &env, &message, file.as_deref(), &mut out)
        },
        Command::List { starting, count, save_attachment } => {
            let store = http_store(&config)?;
            let options = ListOptions {
                request: WalkRequest { start: starting, count },
                save_attachments: save_attachment,
            };
            commands::list(&config, store, options, confirm, &mut out, &mut io::stderr())
        },
    }
}

fn prompt_username<R: io::BufRead, W: Write>(
    prompt: &mut TerminalConfirm<R, W>,
) -> Result<String, CliError> {
    prompt
        .ask_line("Enter a new username:")?
        .ok_or_else(|| ClientError::Config("no username given".to_string()).into())
}

fn http_store(config: &ClientConfig) -> Result<HttpFeedStore, CliError> {
    HttpFeedStore::new(&config.server_url, config.request_timeout)
        .map_err(|e| CliError::Client(e.into()))
}
