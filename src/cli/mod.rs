use crate::files::OutputDir;
use crate::provider::{Provider, providers};
use crate::{Engine, GlobalConfig, Injector, Settings};
use clap::{CommandFactory, Parser};
use color_eyre::eyre::{Result, WrapErr};
use colored::Colorize;
use std::path::{Path, PathBuf};

const AFTER_HELP: &str = "\
Available Variable Expression Formats:
 * dollar             i.e. $MYVAR
 * dollar-curly       i.e. ${MYVAR} (default)
 * handlebars         i.e. {{MYVAR}}
 * dollar-handlebars  i.e. ${{MYVAR}}

e.g. DOPPLER_TOKEN=\"dp.st.dev_xxxxxxxxxxxxxxxxx\" secretsub ./files ./export dollar-curly";

/// Main CLI structure for the secretsub application.
///
/// All positionals are optional so that running without arguments prints
/// the usage instead of failing.
#[derive(Parser, Debug)]
#[command(name = "secretsub")]
#[command(about = "Inject secrets into text files by substituting placeholders", long_about = None)]
#[command(version)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Directory (or single file) to read templates from
    #[arg(value_name = "READ_DIR")]
    read_dir: Option<PathBuf>,
    /// Directory to write files with substituted secrets to
    #[arg(value_name = "WRITE_DIR")]
    write_dir: Option<PathBuf>,
    /// Variable expression format to target (default: dollar-curly)
    #[arg(value_name = "VARIABLE_EXPRESSION")]
    dialect: Option<String>,
    /// Provider to fetch secrets from (e.g. doppler://, dotenv:/path/.env, env://)
    #[arg(short, long, env = "SECRETSUB_PROVIDER")]
    provider: Option<String>,
    /// Access token for the provider
    #[arg(long, env = "DOPPLER_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Fall back to dollar-curly instead of failing on an unknown variable expression
    #[arg(long)]
    lenient: bool,
    /// Report what would be substituted without writing any file
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Input and output locations, or `None` when either is missing and the
    /// usage should be printed instead of running.
    fn dirs(&self) -> Option<(&Path, &Path)> {
        Some((self.read_dir.as_deref()?, self.write_dir.as_deref()?))
    }
}

fn print_usage() -> Result<()> {
    Cli::command().print_help()?;
    println!("\n\nAvailable providers:");
    for info in providers() {
        println!(" * {}", info.display_with_examples());
    }
    Ok(())
}

/// Main entry point for the secretsub CLI application.
///
/// Fetches the secrets once, then processes every input file. Fetch failures
/// and an output directory that cannot be created are fatal; per-file
/// failures are reported and the run continues.
pub fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some((read_dir, write_dir)) = cli.dirs() else {
        return print_usage();
    };

    let config = GlobalConfig::load().wrap_err("Failed to load secretsub configuration")?;
    let settings = Settings::resolve(
        config.as_ref(),
        cli.provider.clone(),
        cli.dialect.as_deref(),
        cli.lenient,
    )
    .wrap_err("Invalid options")?;

    println!(
        "Variable expression format to target: {} i.e. {}",
        settings.dialect.tag().cyan(),
        settings.dialect.placeholder("MYVAR")
    );

    let provider = Box::<dyn Provider>::try_from(settings.provider.as_str())
        .wrap_err("Failed to initialize provider")?;
    let secrets = provider
        .fetch(cli.token.as_deref())
        .wrap_err_with(|| format!("Failed to fetch secrets from {}", provider.name()))?;
    println!(
        "Fetched {} secrets from {}\n",
        secrets.len().to_string().green(),
        provider.name().blue()
    );

    let mut injector = Injector::new(Engine::new(settings.dialect)?, &secrets);
    if !cli.dry_run {
        let output = OutputDir::create(write_dir).wrap_err("Failed to prepare output directory")?;
        injector = injector.write_to(output);
    }

    injector
        .run(read_dir)
        .wrap_err("Failed to process input files")?;
    Ok(())
}
