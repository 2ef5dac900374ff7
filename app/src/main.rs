//! privacy-guardian CLI
//!
//! Usage: privacy-guardian [OPTIONS] <COMMAND>

use clap::{Args, Parser, Subcommand};
use guardian_core::UploadedDocument;
use guardian_lib::breach::{self, EmailLookup, PwnedPasswordsClient};
use guardian_lib::policy::{self, PolicyInput};
use guardian_lib::{load_config, logging, AppConfig, ExtractorMode, Scanner};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "privacy-guardian", version, about = "Check, scan and stay safe online")]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the OCR-capable extractor regardless of config
    #[arg(long, global = true)]
    ocr: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a PDF, DOCX or TXT file for personal information
    Scan {
        file: PathBuf,
        /// Password for encrypted PDFs
        #[arg(long)]
        password: Option<String>,
        /// Print the extracted text
        #[arg(long)]
        show_text: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look an email address up in the local breach dataset
    Email {
        address: String,
        /// Breach dataset (overrides config)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Check a password read from stdin against Pwned Passwords
    Password,
    /// Summarize a privacy policy and list risky practices
    Policy(PolicySource),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PolicySource {
    /// Policy text
    #[arg(long)]
    text: Option<String>,
    /// File containing the policy text
    #[arg(long)]
    file: Option<PathBuf>,
    /// URL of the policy page
    #[arg(long)]
    url: Option<String>,
}

fn main() -> ExitCode {
    logging::setup_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(cli.config.as_deref())?;
    if cli.ocr {
        config.extractor = ExtractorMode::OcrCapable;
    }

    match cli.command {
        Command::Scan {
            file,
            password,
            show_text,
            json,
        } => scan(&config, file, password, show_text, json),
        Command::Email { address, dataset } => email(&config, &address, dataset),
        Command::Password => password(&config),
        Command::Policy(source) => policy_command(source),
    }
}

fn scan(
    config: &AppConfig,
    file: PathBuf,
    password: Option<String>,
    show_text: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(&file)?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string());

    let mut document = UploadedDocument::new(filename, bytes);
    if let Some(password) = password {
        document = document.with_password(password);
    }

    let report = Scanner::from_config(config).scan(&document);
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text(show_text));
        if report.extraction.is_scanned {
            println!("{}", report.extraction.text);
        }
    }
    Ok(())
}

fn email(
    config: &AppConfig,
    address: &str,
    dataset: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = dataset.unwrap_or_else(|| config.breach_dataset_path());
    let data = breach::load_dataset(&path)?;

    match breach::lookup_email(&data, address) {
        EmailLookup::NotFound => println!("Email not found in our dataset."),
        EmailLookup::Found(sites) if sites.is_empty() => {
            println!("No breaches found for this email.")
        }
        EmailLookup::Found(sites) => {
            println!("Found in {} breaches:", sites.len());
            for site in sites {
                println!("  - {}", site);
            }
        }
    }
    Ok(())
}

fn password(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        println!("Please enter a password.");
        return Ok(());
    }

    let client = PwnedPasswordsClient::new(config.pwned_passwords_url.clone())?;
    match breach::check_password(&client, password)? {
        0 => println!("This password has NOT been found in any breaches."),
        count => println!("This password appeared {} times in breaches!", count),
    }
    Ok(())
}

fn policy_command(source: PolicySource) -> Result<(), Box<dyn std::error::Error>> {
    let input = match (source.text, source.file, source.url) {
        (Some(text), _, _) => PolicyInput::Text(text),
        (_, Some(file), _) => PolicyInput::Text(std::fs::read_to_string(file)?),
        (_, _, Some(url)) => PolicyInput::Url(url),
        (None, None, None) => return Err("one of --text, --file or --url is required".into()),
    };

    let client = reqwest::blocking::Client::new();
    let analysis = policy::analyze_policy(&client, &input)?;

    println!("Summary:\n  {}", analysis.summary);
    println!("Detected risks:");
    for risk in &analysis.risks {
        println!("  - {}", risk);
    }
    Ok(())
}
