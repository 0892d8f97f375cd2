use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "myls")]
#[command(
    version,
    about = "Angle rotation, duplicate guarding, and quality scoring for batched local SEO copy"
)]
pub struct Cli {
    /// Log engine decisions (rotation, similarity scores) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding state.json and myls.toml. Falls back to $MYLS_STATE_DIR, then .myls
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rotate, reset, or list the opening angles for a context
    Angle {
        #[command(subcommand)]
        command: AngleCommands,
    },
    /// Print the banned phrases for a context
    Banned { context: String },
    /// Append the variation block to a prompt
    Inject {
        #[arg(short, long, default_value = "about_the_area")]
        context: String,
        /// Angle to require. Takes the next angle in rotation when omitted
        #[arg(short, long)]
        angle: Option<String>,
        /// File containing the base prompt (or stdin if not provided)
        #[arg(short, long)]
        prompt_file: Option<PathBuf>,
    },
    /// Check generated HTML against the context's recent output
    Guard {
        context: String,
        /// Generated HTML
        file: PathBuf,
        /// Content to use if the input is a near-duplicate
        #[arg(short, long)]
        rewrite_file: Option<PathBuf>,
        /// Print the guard outcome as JSON to stderr
        #[arg(long)]
        report: bool,
    },
    /// Forget the rotation counter and duplicate history for a context
    Clear { context: String },
    /// Score finished HTML for templating signals and readability
    Analyze {
        file: PathBuf,
        /// e.g. "Tampa, FL"
        #[arg(long)]
        city_state: Option<String>,
        #[arg(short, long)]
        keyword: Option<String>,
        /// Include a cost estimate for this model
        #[arg(short, long)]
        model: Option<String>,
        /// Prompt size for the cost estimate
        #[arg(long, default_value = "0")]
        prompt_chars: usize,
        #[arg(long)]
        json: bool,
    },
    /// Estimate token usage and USD cost from character counts
    Cost {
        model: String,
        prompt_chars: usize,
        output_chars: usize,
        #[arg(long)]
        json: bool,
    },
    /// Run one item through rotation, prompt injection, duplicate guard and
    /// analysis, and print its item log as a JSON line
    Process {
        #[arg(short, long, default_value = "about_the_area")]
        context: String,
        /// Generated HTML for this item
        html_file: PathBuf,
        /// Label for the item in the log (defaults to the file name)
        #[arg(short, long)]
        item: Option<String>,
        /// Base prompt; only its size is used for the cost estimate
        #[arg(short, long)]
        prompt_file: Option<PathBuf>,
        #[arg(short, long)]
        model: Option<String>,
        #[arg(long)]
        city_state: Option<String>,
        #[arg(short, long)]
        keyword: Option<String>,
        /// Append the item log to this file instead of printing it
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum AngleCommands {
    /// Take the next angle in rotation
    Next {
        context: String,
        #[arg(long)]
        json: bool,
    },
    /// Restart rotation at the first angle
    Reset { context: String },
    /// Show the angle pool for a context, or every context
    List { context: Option<String> },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default myls.toml file
    Init,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let state_dir = cli.state_dir.as_deref();

    match &cli.command {
        Commands::Angle { command } => cmd::cmd_angle(state_dir, command)?,
        Commands::Banned { context } => cmd::cmd_banned(state_dir, context)?,
        Commands::Inject {
            context,
            angle,
            prompt_file,
        } => cmd::cmd_inject(state_dir, context, angle.as_deref(), prompt_file.as_deref())?,
        Commands::Guard {
            context,
            file,
            rewrite_file,
            report,
        } => cmd::cmd_guard(state_dir, context, file, rewrite_file.as_deref(), *report)?,
        Commands::Clear { context } => cmd::cmd_clear(state_dir, context)?,
        Commands::Analyze {
            file,
            city_state,
            keyword,
            model,
            prompt_chars,
            json,
        } => cmd::cmd_analyze(
            state_dir,
            file,
            cmd::AnalyzeArgs {
                city_state: city_state.clone(),
                keyword: keyword.clone(),
                model: model.clone(),
                prompt_chars: *prompt_chars,
                json: *json,
            },
        )?,
        Commands::Cost {
            model,
            prompt_chars,
            output_chars,
            json,
        } => cmd::cmd_cost(state_dir, model, *prompt_chars, *output_chars, *json)?,
        Commands::Process {
            context,
            html_file,
            item,
            prompt_file,
            model,
            city_state,
            keyword,
            log_file,
        } => cmd::cmd_process(
            state_dir,
            cmd::ProcessArgs {
                context,
                html_file,
                item: item.as_deref(),
                prompt_file: prompt_file.as_deref(),
                model: model.as_deref(),
                city_state: city_state.as_deref(),
                keyword: keyword.as_deref(),
                log_file: log_file.as_deref(),
            },
        )?,
        Commands::Config { command } => cmd::cmd_config(state_dir, command.clone())?,
    }

    Ok(())
}
