use std::fs;
use std::io::{self, BufRead as _, Write as _};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use qrsession::export::{self, current_file_name};
use qrsession::helper::{print_qr, to_svg_string, QUIET_ZONE};
use qrsession::{
    Color, EncodeOptions, Encoder as _, ErrorCorrection, Generation, Phase, QrEncoder, QrMatrix,
    QrSession, SessionConfig, StyleConfig, StylePatch,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qrsession")]
#[command(about = "Generate styled QR codes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Image width in pixels (100-500)
    #[arg(long, global = true, env = "QRSESSION_SIZE", default_value_t = qrsession::style::DEFAULT_SIZE)]
    size: u32,

    /// Foreground (dark module) color
    #[arg(long, global = true, env = "QRSESSION_FG", default_value = "#000000")]
    fg: Color,

    /// Background (light module) color
    #[arg(long, global = true, env = "QRSESSION_BG", default_value = "#FFFFFF")]
    bg: Color,

    /// Error correction level: L, M, Q or H
    #[arg(long, global = true, env = "QRSESSION_ECC", default_value = "M")]
    ecc: ErrorCorrection,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a single text and write it to a file
    Encode {
        /// Text or URL to encode
        text: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Png)]
        format: Format,

        /// Output path (PNG defaults to qrcode.png, SVG defaults to stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Interactive session reading commands from stdin
    Session {
        /// Directory exports are written to
        #[arg(long, env = "QRSESSION_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Png,
    Svg,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = SessionConfig {
        style: StyleConfig {
            size: cli.size,
            foreground: cli.fg,
            background: cli.bg,
        },
        error_correction: cli.ecc,
        out_dir: PathBuf::from("."),
    };
    config.validate().context("invalid style")?;

    match cli.command {
        Commands::Encode {
            text,
            format,
            output,
        } => encode(&config, &text, format, output),
        Commands::Session { out_dir } => run_session(SessionConfig { out_dir, ..config }),
    }
}

fn encode(config: &SessionConfig, text: &str, format: Format, output: Option<PathBuf>) -> Result<()> {
    match format {
        Format::Png => {
            let encoder = QrEncoder::new(config.error_correction);
            let image = encoder
                .encode(text, &EncodeOptions::from(&config.style))
                .context("failed to encode text")?;
            let path = output.unwrap_or_else(|| PathBuf::from(current_file_name()));
            fs::write(&path, image.png_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), width = image.width(), "wrote QR code");
        }
        Format::Svg => {
            let matrix = QrMatrix::encode(text, config.error_correction).context("failed to encode text")?;
            let svg = to_svg_string(&matrix, QUIET_ZONE, config.style.foreground, config.style.background);
            match output {
                Some(path) => fs::write(&path, svg)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{svg}"),
            }
        }
    }
    Ok(())
}

const HELP: &str = "\
commands:
  gen <text>       generate a QR code (closes the customization panel)
  size <n>         set the image size (100-500)
  fg <#hex>        set the foreground color
  bg <#hex>        set the background color
  customize        show or hide the customization panel
  show             print the current code
  history          list generated texts
  save             write the current code as qrcode.png
  save-history     write every history entry as qrcode_<n>.png
  clear            drop the current code
  help             show this message
  quit             leave the session";

fn run_session(config: SessionConfig) -> Result<()> {
    let mut session = QrSession::from_config(&config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{HELP}");
    loop {
        print!("qr> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        let (command, arg) = line
            .trim_start()
            .split_once(' ')
            .unwrap_or((line.trim(), ""));

        match command {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "gen" => match session.submit(arg) {
                Ok(Generation::Skipped) => {}
                Ok(Generation::Created) => println!("added to history ({} total)", session.history().len()),
                Ok(Generation::Refreshed) => println!("already in history, display updated"),
                Err(err) => error!("{err}"),
            },
            "size" | "fg" | "bg" => match parse_patch(command, arg) {
                Ok(patch) => match session.update_style(patch) {
                    Ok(Some(_)) => println!("re-rendered with {:?}", session.style()),
                    Ok(None) => println!("style is now {:?}", session.style()),
                    Err(err) => error!("{err}"),
                },
                Err(err) => error!("{err:#}"),
            },
            "customize" => {
                if session.toggle_customization() {
                    println!("customizing: size/fg/bg re-render the current code");
                } else if session.phase() == Phase::Empty {
                    println!("generate a code first");
                } else {
                    println!("customization hidden");
                }
            }
            "show" => match session.current_image() {
                Some(_) => {
                    let matrix = QrMatrix::encode(session.current_text(), session.encoder().error_correction)?;
                    print_qr(&matrix);
                    println!("{}", session.current_text());
                }
                None => println!("no QR code generated yet"),
            },
            "history" => {
                for (index, entry) in session.history().iter().enumerate() {
                    println!("{:>3}. {}", index + 1, entry.text());
                }
            }
            "save" => match export::export_current(&session, &config.out_dir) {
                Ok(Some(path)) => println!("saved {}", path.display()),
                Ok(None) => println!("no QR code generated yet"),
                Err(err) => error!("{err}"),
            },
            "save-history" => match export::export_history(&session, &config.out_dir) {
                Ok(paths) => println!("saved {} files", paths.len()),
                Err(err) => error!("{err}"),
            },
            "clear" => session.clear(),
            other => println!("unknown command {other:?}, try help"),
        }
    }
    Ok(())
}

fn parse_patch(command: &str, arg: &str) -> Result<StylePatch> {
    let arg = arg.trim();
    let patch = match command {
        "size" => StylePatch::size(arg.parse().with_context(|| format!("not a number: {arg:?}"))?),
        "fg" => StylePatch::foreground(arg.parse()?),
        _ => StylePatch::background(arg.parse()?),
    };
    Ok(patch)
}
