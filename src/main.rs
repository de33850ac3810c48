//! CLI entry point for `smimecheck`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use smimecheck::config::{self, Config};
use smimecheck::model::header_output::{HeaderDisplay, HeaderOutput};
use smimecheck::model::message::{Message, MessageUid};
use smimecheck::model::verification::{Verdict, VerificationState};
use smimecheck::parser::header::{decode_encoded_words, parse_date};
use smimecheck::parser::mime::parse_message;
use smimecheck::smime::Smime;
use smimecheck::store::{self, MailStore};

#[derive(Parser)]
#[command(
    name = "smimecheck",
    version,
    about = "Verify S/MIME signatures of stored mail"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the signatures of messages in an MBOX file, `.eml` file or directory
    Check {
        path: PathBuf,
        /// Only check these messages (MBOX sequence number or EML file stem)
        #[arg(long = "uid", value_name = "UID")]
        uids: Vec<String>,
        /// Trust anchor (PEM bundle or hashed directory); replaces the configured ones
        #[arg(long = "ca", value_name = "PATH")]
        ca: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the default configuration to the config file path
        #[arg(long)]
        write_default: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

/// One checked message, as reported by `check`.
struct CheckedMessage {
    uid: MessageUid,
    size: u64,
    state: VerificationState,
    headers: HeaderOutput,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Check {
            path,
            uids,
            ca,
            json,
        } => cmd_check(&path, &uids, ca, json, &config),
        Commands::Config { write_default } => cmd_config(&config, write_default),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_file = config::log_file_path(config);
    let log_dir = config::cache_dir(config);
    let file_name = log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "smimecheck.log".into());
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, file_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Run one render cycle per selected message and print the verdicts.
fn cmd_check(
    path: &Path,
    uids: &[String],
    ca: Vec<PathBuf>,
    json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let mut smime_config = config.smime.clone();
    if !ca.is_empty() {
        smime_config.ssl_certificate_paths = ca;
    }
    let smime = Smime::from_config(&smime_config);
    if !smime.is_enabled() {
        eprintln!("  S/MIME verification unavailable; all messages reported as unsigned");
    }

    let store = open_store(path)?;
    let selected: Vec<MessageUid> = if uids.is_empty() {
        store.uids()?
    } else {
        uids.iter().map(|u| MessageUid::from(u.as_str())).collect()
    };

    let mut cycle = smime.cycle(store.as_ref());
    let mut checked = Vec::with_capacity(selected.len());
    for uid in selected {
        let mut raw = Vec::new();
        let size = store.write_raw_body(&uid, &mut raw)?;
        let message = parse_message(uid.clone(), &raw);

        cycle.on_message_load(&message);
        let headers = cycle.on_headers_output(header_output(&message));
        checked.push(CheckedMessage {
            uid,
            size,
            state: cycle.state(),
            headers,
        });
    }

    if json {
        print_check_json(path, &checked)
    } else {
        print_check_table(&checked);
        Ok(())
    }
}

/// Open the store at `path`, showing scan progress for MBOX files.
fn open_store(path: &Path) -> anyhow::Result<Box<dyn MailStore>> {
    if path.is_dir() {
        return Ok(store::open(path, None)?);
    }

    let file_size = std::fs::metadata(path)?.len();
    let pb = ProgressBar::new(file_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} Scanning [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let opened = store::open(
        path,
        Some(&|current, total| {
            pb.set_length(total);
            pb.set_position(current);
        }),
    );
    pb.finish_and_clear();
    Ok(opened?)
}

/// The header rows a viewer would show before annotation.
fn header_output(message: &Message) -> HeaderOutput {
    let mut output = HeaderOutput::new();
    for (key, title) in [("date", "Date"), ("from", "From"), ("subject", "Subject")] {
        if let Some(value) = message.headers.get(title) {
            output.insert(
                key.to_string(),
                HeaderDisplay::text(title, decode_encoded_words(value)),
            );
        }
    }
    output
}

fn header_value<'a>(headers: &'a HeaderOutput, key: &str) -> &'a str {
    headers.get(key).map(|h| h.value.as_str()).unwrap_or_default()
}

fn verdict_label(state: VerificationState) -> &'static str {
    match state {
        VerificationState::NotSigned => "-",
        VerificationState::SignedPendingVerification => "invalid (unverified)",
        VerificationState::SignedValid => "validated",
        VerificationState::SignedInvalid => "invalid",
    }
}

/// Print verdicts as a human-readable table.
fn print_check_table(checked: &[CheckedMessage]) {
    use humansize::{format_size, BINARY};

    println!();
    println!(
        "  {:<10} {:<17} {:<25} {:<40} {:>8}  {}",
        "UID", "Date", "From", "Subject", "Size", "S/MIME"
    );
    println!("  {}", "-".repeat(118));

    for entry in checked {
        let field = |key| header_value(&entry.headers, key);
        let date = parse_date(field("date"))
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let from: String = field("from").chars().take(24).collect();
        let subject: String = field("subject").chars().take(39).collect();

        println!(
            "  {:<10} {:<17} {:<25} {:<40} {:>8}  {}",
            entry.uid,
            date,
            from,
            subject,
            format_size(entry.size, BINARY),
            verdict_label(entry.state)
        );
    }

    let signed = checked.iter().filter(|c| c.state.is_signed()).count();
    let valid = checked
        .iter()
        .filter(|c| c.state.verdict() == Some(Verdict::Valid))
        .count();
    println!();
    println!(
        "  {} message(s), {} signed, {} validated",
        checked.len(),
        signed,
        valid
    );
    println!();
}

/// Print verdicts and annotated header rows as JSON.
fn print_check_json(path: &Path, checked: &[CheckedMessage]) -> anyhow::Result<()> {
    let items: Vec<serde_json::Value> = checked
        .iter()
        .map(|c| {
            serde_json::json!({
                "uid": c.uid,
                "size": c.size,
                "state": c.state,
                "verdict": c.state.verdict(),
                "headers": c.headers,
            })
        })
        .collect();

    let output = serde_json::json!({
        "file": path.to_string_lossy(),
        "message_count": checked.len(),
        "messages": items,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print the effective configuration, or write the defaults.
fn cmd_config(config: &Config, write_default: bool) -> anyhow::Result<()> {
    if write_default {
        let path = config::save_config(&Config::default())?;
        println!("  Wrote default configuration to {}", path.display());
        return Ok(());
    }

    match config::config_file_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no config path available)"),
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "smimecheck", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
