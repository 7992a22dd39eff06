use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use locality_brief::app::{self, Outcome};
use locality_brief::config::AppConfig;
use locality_brief::llm::{create_generator, TextGenerator};
use locality_brief::logging::configure_logging;
use locality_brief::prompt::{placeholders, DateRange, PromptKind, TimeFrame};
use locality_brief::session::SessionState;
use locality_brief::taxonomy::Taxonomy;
use locality_brief::TARGET_APP;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "City, micro market and civic news briefs generated with web-grounded LLMs",
    after_help = "Gemini credentials: GEMINI_API_KEY, or GOOGLE_CLOUD_PROJECT with a \
                  GOOGLE_ACCESS_TOKEN bearer token (e.g. `gcloud auth print-access-token`). \
                  Access tokens expire after about an hour and are not refreshed."
)]
struct Args {
    /// Session file holding the last generated descriptions
    #[arg(long, global = true, default_value = ".locality-brief-session.json")]
    session: PathBuf,

    /// CSV file with CItyName / micromarket / locality columns
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// More detailed logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a city description
    City {
        #[arg(short, long)]
        city: String,

        /// Replace the built-in prompt template
        #[arg(long)]
        prompt_file: Option<PathBuf>,
    },

    /// Generate a micro market description
    Micromarket {
        #[arg(short, long)]
        city: String,

        #[arg(short, long)]
        micromarket: String,

        /// Comma-separated localities to focus on
        #[arg(short, long, value_delimiter = ',')]
        localities: Vec<String>,

        /// Take the localities for this micro market from the CSV data
        #[arg(long, conflicts_with = "localities")]
        localities_from_csv: bool,

        #[arg(long)]
        prompt_file: Option<PathBuf>,
    },

    /// Summarise recent civic and infrastructure news for a city
    News {
        #[arg(short, long)]
        city: String,

        /// Last 24 hours instead of the last 7 days
        #[arg(long)]
        daily: bool,

        #[arg(long)]
        prompt_file: Option<PathBuf>,
    },

    /// Write the stored descriptions to a .docx file
    Export {
        /// Directory to write into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// List known cities
    Cities,

    /// List micro markets of a city
    Micromarkets {
        #[arg(short, long)]
        city: String,
    },

    /// List localities of a micro market
    Localities {
        #[arg(short, long)]
        city: String,

        #[arg(short, long)]
        micromarket: String,
    },

    /// Print the built-in prompt template for a variant
    Template {
        #[arg(value_enum)]
        kind: TemplateKind,
    },

    /// Forget all stored descriptions
    SessionClear,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TemplateKind {
    City,
    Micromarket,
    News,
}

impl From<TemplateKind> for PromptKind {
    fn from(kind: TemplateKind) -> Self {
        match kind {
            TemplateKind::City => PromptKind::City,
            TemplateKind::Micromarket => PromptKind::Micromarket,
            TemplateKind::News => PromptKind::News,
        }
    }
}

fn load_taxonomy(csv: Option<&Path>) -> Result<Taxonomy> {
    let taxonomy = match csv {
        Some(path) => Taxonomy::from_path(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Taxonomy::builtin()?,
    };
    Ok(taxonomy)
}

fn load_template(kind: PromptKind, prompt_file: Option<&Path>) -> Result<String> {
    let template = match prompt_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file {}", path.display()))?,
        None => kind.default_template(),
    };
    let names = placeholders(&template)
        .with_context(|| format!("Invalid {} template", kind.label()))?;
    info!(target: TARGET_APP, "{} template placeholders: {:?}", kind.label(), names);
    Ok(template)
}

fn print_list(items: &[String], empty: &str) {
    if items.is_empty() {
        eprintln!("{}", empty);
    }
    for item in items {
        println!("{}", item);
    }
}

/// Prints the outcome and reports whether it was a failure.
fn print_outcome(heading: &str, outcome: &Outcome) -> bool {
    match outcome {
        Outcome::Content(text) => {
            println!("### {}\n", heading);
            println!("{}", text);
            false
        }
        Outcome::Empty(notice) => {
            eprintln!("Notice: {}", notice);
            false
        }
        Outcome::Failed(message) => {
            eprintln!("{}", message);
            true
        }
    }
}

/// Configuration, LLM client and session for the commands that call the model.
struct Online {
    config: AppConfig,
    generator: Box<dyn TextGenerator>,
    state: SessionState,
}

fn go_online(session: &Path, verbose: bool) -> Result<Online> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory {}", config.log_dir.display()))?;
    configure_logging(&config.log_dir, verbose);
    info!(
        target: TARGET_APP,
        "locality-brief {} (built {}, git {}) using {} model {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        option_env!("GIT_HASH").unwrap_or("unknown"),
        config.provider.name(),
        config.model
    );

    let generator = create_generator(&config).context("Failed to set up the LLM client")?;
    let state = SessionState::load(session)?;
    Ok(Online {
        config,
        generator,
        state,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let failed = match args.command {
        Command::City { city, prompt_file } => {
            let online = go_online(&args.session, args.verbose)?;
            let template = load_template(PromptKind::City, prompt_file.as_deref())?;
            let (state, outcome) = app::describe_city(
                online.state,
                &online.config,
                online.generator.as_ref(),
                &city,
                &template,
            )
            .await?;
            state.save(&args.session)?;
            print_outcome("City Description", &outcome)
        }
        Command::Micromarket {
            city,
            micromarket,
            localities,
            localities_from_csv,
            prompt_file,
        } => {
            let online = go_online(&args.session, args.verbose)?;
            let template = load_template(PromptKind::Micromarket, prompt_file.as_deref())?;
            let localities = if localities_from_csv {
                load_taxonomy(args.csv.as_deref())?.localities(&city, &micromarket)
            } else {
                localities
            };
            let (state, outcome) = app::describe_micromarket(
                online.state,
                &online.config,
                online.generator.as_ref(),
                &city,
                &micromarket,
                &localities,
                &template,
            )
            .await?;
            state.save(&args.session)?;
            print_outcome("Micro Market Description", &outcome)
        }
        Command::News {
            city,
            daily,
            prompt_file,
        } => {
            let online = go_online(&args.session, args.verbose)?;
            let template = load_template(PromptKind::News, prompt_file.as_deref())?;
            let frame = if daily { TimeFrame::Daily } else { TimeFrame::Weekly };
            let range = DateRange::current(frame);
            let outcome = app::fetch_news(
                &online.config,
                online.generator.as_ref(),
                &city,
                &range,
                &template,
            )
            .await?;
            print_outcome("News Summaries", &outcome)
        }
        Command::Export { out_dir } => {
            let state = SessionState::load(&args.session)?;
            let Some(exported) = app::export_document(&state)? else {
                bail!("Nothing to export: generate a city or micro market description first");
            };
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            let path = out_dir.join(&exported.filename);
            fs::write(&path, &exported.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Wrote {} ({}, {} bytes)",
                path.display(),
                exported.mime,
                exported.bytes.len()
            );
            false
        }
        Command::Cities => {
            let taxonomy = load_taxonomy(args.csv.as_deref())?;
            print_list(&taxonomy.cities(), "No cities found");
            false
        }
        Command::Micromarkets { city } => {
            let taxonomy = load_taxonomy(args.csv.as_deref())?;
            print_list(
                &taxonomy.micromarkets(&city),
                &format!("No micro markets found for {}", city),
            );
            false
        }
        Command::Localities { city, micromarket } => {
            let taxonomy = load_taxonomy(args.csv.as_deref())?;
            print_list(
                &taxonomy.localities(&city, &micromarket),
                &format!("No localities found for {} in {}", micromarket, city),
            );
            false
        }
        Command::Template { kind } => {
            print!("{}", PromptKind::from(kind).default_template());
            false
        }
        Command::SessionClear => {
            let mut state = SessionState::load(&args.session)?;
            state.clear();
            state.save(&args.session)?;
            println!("Session cleared");
            false
        }
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
