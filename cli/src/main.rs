// Usage:
// vmm-cli --kernel path=/path/to/vmlinux --memory size_mib=512 --vcpu num=2
// vmm-cli --format json --kernel path=/path/to/vmlinux
// VMM_CLI_FORMAT=json and RUST_LOG=debug may also come from a .env file

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use vmm_config::{ConfigBuilder, LaunchConfig, TokenList};

/// Resolve VMM launch configuration from command-line tokens
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// How to print the resolved configuration; must come before the tokens
    #[arg(long, value_enum, env = "VMM_CLI_FORMAT", default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Configuration tokens, e.g. `--kernel path=<image> --vcpu num=2`.
    /// Everything from the first token on is passed through verbatim.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn setup_logging() {
    let mut builder =
        &mut env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if std::env::var("RUST_LOG").is_err() && std::env::var("VERBOSE").is_err() {
        // Simplify log format
        builder = builder.format_timestamp(None).format_target(false);
    }
    builder.init();
}

fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).context("Failed to load .env file"),
    }
}

fn render(config: &LaunchConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")
        }
        OutputFormat::Text => {
            let kernel = config.kernel();
            Ok(format!(
                "Kernel: {}\nCmdline: {}\nHighmem start: {:#x}\nMemory: {} MiB\nvCPUs: {}",
                kernel.path().display(),
                kernel.cmdline(),
                kernel.highmem_start(),
                config.memory().size_mib(),
                config.vcpu().num()
            ))
        }
    }
}

fn run(args: Args) -> Result<()> {
    if args.tokens.iter().any(|token| token == "--format") {
        log::warn!("--format found among configuration tokens and ignored, pass it before them");
    }

    let tokens = TokenList::new(args.tokens);
    let config = ConfigBuilder::new()
        .build(&tokens)
        .context("Failed to parse VMM configuration")?;

    println!("{}", render(&config, args.format)?);
    Ok(())
}

fn main() -> ExitCode {
    if let Err(e) = load_dotenv() {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }
    setup_logging();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hyphenated_tokens() {
        let args = Args::try_parse_from([
            "vmm-cli",
            "--kernel",
            "path=/boot/vmlinux",
            "--vcpu",
            "num=2",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.tokens, ["--kernel", "path=/boot/vmlinux", "--vcpu", "num=2"]);
    }

    #[test]
    fn format_precedes_tokens() {
        let args =
            Args::try_parse_from(["vmm-cli", "--format", "json", "--memory", "size_mib=64"])
                .unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.tokens, ["--memory", "size_mib=64"]);
    }

    #[test]
    fn no_tokens() {
        let args = Args::try_parse_from(["vmm-cli"]).unwrap();
        assert!(args.tokens.is_empty());
    }
}
