//! JobHero command line.
//!
//! Generates career toolkits from a profile file and runs the local
//! utilities around them: share links, document export and the one-time
//! unlock.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

/// JobHero career toolkit generator
#[derive(Parser)]
#[command(name = "jobhero")]
#[command(about = "Generate resumes, cover letters, interview prep and roadmaps with Gemini")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Runtime config (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write results here instead of stdout
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    /// Local state file holding the unlock flag
    #[arg(long, global = true, default_value = ".jobhero/state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the full toolkit for a profile
    Generate {
        /// Profile file (YAML or JSON)
        #[arg(short, long)]
        profile: PathBuf,
    },

    /// Regenerate the career roadmap for a role
    Roadmap {
        #[arg(short, long)]
        profile: PathBuf,

        /// Target role (defaults to the profile's)
        #[arg(short, long)]
        role: Option<String>,

        /// Spend the thinking budget on this roadmap
        #[arg(long)]
        deep: bool,
    },

    /// Score a resume against a role
    Audit {
        /// Resume text file
        #[arg(short, long)]
        resume: PathBuf,

        #[arg(short, long)]
        role: String,
    },

    /// Get feedback on one interview answer
    Interview {
        #[arg(short, long)]
        question: String,

        /// Answer text, or `@file` to read it from a file
        #[arg(short, long)]
        answer: String,

        #[arg(short, long)]
        role: String,

        #[arg(long, default_value = "")]
        company: String,
    },

    /// Extract profile fields from free text
    Extract {
        /// Text file (a pasted resume, say)
        #[arg(short, long)]
        text: PathBuf,
    },

    /// Generate the elite extras (requires the unlock)
    Elite {
        #[arg(short, long)]
        profile: PathBuf,

        /// Existing toolkit to merge the extras into
        #[arg(short, long)]
        toolkit: Option<PathBuf>,
    },

    /// Research a company with web search
    Insights {
        #[arg(long)]
        company: String,
    },

    /// Encode or decode share links
    Share {
        #[command(subcommand)]
        action: ShareAction,
    },

    /// Prepare a resume or cover letter for download
    Export {
        /// Toolkit JSON produced by `generate`
        #[arg(short, long)]
        toolkit: PathBuf,

        #[arg(short, long, value_enum, default_value = "resume")]
        document: DocumentArg,

        #[arg(long, default_value = "Classic")]
        template: String,

        /// Characters per line
        #[arg(long, default_value = "90")]
        columns: usize,

        #[arg(long, default_value = "60")]
        lines_per_page: usize,
    },

    /// Buy the one-time elite unlock (simulated checkout)
    Unlock {
        /// Profile used to prefill the checkout
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },

    /// Show the unlock state and template access
    Status,
}

#[derive(Subcommand)]
enum ShareAction {
    /// Build a share link for a resume
    Encode {
        /// Resume text file
        #[arg(short, long)]
        resume: PathBuf,

        /// Profile supplying the contact fields
        #[arg(short, long)]
        profile: Option<PathBuf>,

        #[arg(long, default_value = "Classic")]
        template: String,

        #[arg(long, default_value = "https://jobhero.app/")]
        base_url: String,
    },

    /// Read a share link back
    Decode { link: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentArg {
    Resume,
    CoverLetter,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = commands::Context {
        config: cli.config,
        out: cli.out,
        state: cli.state,
    };

    match cli.command {
        Commands::Generate { profile } => commands::generate::toolkit(&ctx, &profile).await?,
        Commands::Roadmap {
            profile,
            role,
            deep,
        } => commands::generate::roadmap(&ctx, &profile, role.as_deref(), deep).await?,
        Commands::Audit { resume, role } => commands::generate::audit(&ctx, &resume, &role).await?,
        Commands::Interview {
            question,
            answer,
            role,
            company,
        } => commands::generate::interview(&ctx, &question, &answer, &role, &company).await?,
        Commands::Extract { text } => commands::generate::extract(&ctx, &text).await?,
        Commands::Elite { profile, toolkit } => {
            commands::generate::elite(&ctx, &profile, toolkit.as_deref()).await?
        }
        Commands::Insights { company } => commands::generate::insights(&ctx, &company).await?,
        Commands::Share { action } => match action {
            ShareAction::Encode {
                resume,
                profile,
                template,
                base_url,
            } => commands::share::encode(&ctx, &resume, profile.as_deref(), &template, &base_url)?,
            ShareAction::Decode { link } => commands::share::decode(&ctx, &link)?,
        },
        Commands::Export {
            toolkit,
            document,
            template,
            columns,
            lines_per_page,
        } => {
            let kind = match document {
                DocumentArg::Resume => jobhero_core::DocumentKind::Resume,
                DocumentArg::CoverLetter => jobhero_core::DocumentKind::CoverLetter,
            };
            let layout = jobhero_core::LayoutOptions {
                max_columns: columns,
                lines_per_page,
            };
            commands::export::run(&ctx, &toolkit, kind, &template, layout)?
        }
        Commands::Unlock { profile } => commands::unlock::unlock(&ctx, profile.as_deref()).await?,
        Commands::Status => commands::unlock::status(&ctx)?,
    }

    Ok(())
}
