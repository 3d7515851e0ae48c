use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use stegvault::cli::{
    dump_lsb, read_message, show_info, write_message, InfoOptions, ReadOptions, WriteOptions,
};
use stegvault::codec::{ascii_to_bytes, bytes_to_string};
use stegvault::framing::Framing;
use stegvault::Result;
use std::path::PathBuf;
use std::process::ExitCode;

/// Version info from build.rs
const VERSION: &str = env!("STEGVAULT_VERSION");
const BUILD: &str = env!("STEGVAULT_BUILD");
const PROFILE: &str = env!("STEGVAULT_PROFILE");
const GIT_HASH: &str = env!("STEGVAULT_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "stegvault")]
#[command(author, about = "Hide short messages in the least significant bits of RGB images", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a message into an image
    #[command(alias = "w")]
    Write {
        /// Cover image (any lossless format the image crate reads)
        image: PathBuf,

        /// ASCII message to embed
        #[arg(long, required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Embed the raw contents of this file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Save the result here instead of overwriting IMAGE
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Message framing: terminator or length
        #[arg(long, default_value = "terminator", value_parser = parse_framing)]
        framing: Framing,
    },

    /// Recover the message hidden in an image
    #[command(alias = "r")]
    Read {
        image: PathBuf,

        /// Write the recovered bytes to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Message framing: terminator or length
        #[arg(long, default_value = "terminator", value_parser = parse_framing)]
        framing: Framing,
    },

    /// Show capacity and usage of an image
    #[command(alias = "i")]
    Info {
        image: PathBuf,

        /// Message framing: terminator or length
        #[arg(long, default_value = "terminator", value_parser = parse_framing)]
        framing: Framing,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the raw LSB stream
    #[command(alias = "d")]
    Dump {
        image: PathBuf,

        /// Number of bytes to show
        #[arg(long, default_value = "32")]
        bytes: usize,
    },
}

fn parse_framing(s: &str) -> std::result::Result<Framing, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Write {
            image,
            text,
            file,
            output,
            framing,
        } => {
            let payload = match (text, file) {
                (Some(text), _) => ascii_to_bytes(&text),
                (None, Some(file)) => std::fs::read(file)?,
                (None, None) => Vec::new(),
            };
            let options = WriteOptions { framing, output };
            let report = write_message(&image, &payload, &options)?;
            println!(
                "Wrote {} bytes, {} of {} bytes available",
                payload.len(),
                report.bytes_available,
                report.max_payload
            );
        }

        Commands::Read {
            image,
            output,
            framing,
        } => {
            let recovered = read_message(&image, &ReadOptions { framing })?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &recovered.payload)?;
                    println!(
                        "Recovered {} bytes to {}",
                        recovered.payload.len(),
                        path.display()
                    );
                }
                None => println!("{}", bytes_to_string(&recovered.payload)),
            }
        }

        Commands::Info {
            image,
            framing,
            json,
        } => {
            print!("{}", show_info(&image, &InfoOptions { framing, json })?);
        }

        Commands::Dump { image, bytes } => {
            print!("{}", dump_lsb(&image, bytes)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Warning: logger unavailable: {}", e);
    }

    if cli.version {
        println!("stegvault {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if let Err(e) = Cli::command().print_help() {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
