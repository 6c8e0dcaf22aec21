use anyhow::Result;
use clap::{Parser, Subcommand};
use pathmarker::commands::*;
use tracing_subscriber::EnvFilter;

/// Command-line frontend for the PathMarker Java path-analysis service.
///
/// This CLI is a thin wrapper around `pathmarker-core` (exposed in code as
/// `pathmarker_core`). Page state, backend calls and the result store all
/// live in the library; each command drives one controller action.
#[derive(Parser, Debug)]
#[command(
    name = "pathmarker",
    version,
    about = "Upload Java archives, analyze method paths and package the results",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new workspace at the given root.
    ///
    /// This will:
    /// - Create a `.pathmarker` metadata directory and a `downloads` directory.
    /// - Write a `.pathmarker/config.json` config file.
    /// - Create the workspace database.
    Init {
        /// Workspace root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional workspace name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,

        /// Base URL of the analysis backend.
        #[arg(long)]
        backend_url: Option<String>,
    },

    /// Show information about an existing workspace and its sessions.
    Info {
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Upload a Java project archive (.zip, .rar, .7z, .tar, .gz).
    Upload {
        #[arg(long, default_value = ".")]
        root: String,

        /// Path to the archive.
        #[arg(long)]
        archive: String,
    },

    /// Print the file tree of an uploaded session.
    Tree {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        session: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the methods declared in a Java file.
    Methods {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        session: String,

        /// File path as shown by `tree`.
        #[arg(long)]
        file: String,
    },

    /// Print the source of one method.
    Source {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        session: String,

        #[arg(long)]
        file: String,

        #[arg(long)]
        method: String,
    },

    /// Analyze the execution paths of a method.
    ///
    /// Without --file and --method the previous analysis target is reused.
    Analyze {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        session: String,

        #[arg(long, requires = "method")]
        file: Option<String>,

        #[arg(long, requires = "file")]
        method: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Package paths (by index, from the last analysis) into a downloadable zip.
    Package {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        session: String,

        /// Path index as printed by `analyze`. Repeatable.
        #[arg(long = "path", required = true)]
        paths: Vec<usize>,
    },

    /// List packaged analysis results for a session.
    Results {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        session: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Remove every packaged result recorded for a session.
    ClearResults {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        session: String,
    },

    /// Download a packaged result.
    Download {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        session: String,

        /// Result id as printed by `results`.
        #[arg(long)]
        unique_id: String,

        /// Output file. Defaults to downloads/<session>/<zip name>.
        #[arg(long)]
        out: Option<String>,
    },

    /// Drive the image viewer from an event script and print the final frame.
    ///
    /// Example script: "+ + down:10,10 move:60,40 up wheel:-100 esc"
    View {
        #[arg(long, default_value = ".")]
        root: String,

        /// Image reference to open.
        #[arg(long)]
        image: String,

        /// Whitespace-separated viewer events.
        #[arg(long, default_value = "")]
        script: String,

        /// Take the image's sizing hint from this session's last analysis.
        #[arg(long)]
        session: Option<String>,

        /// Explicit aspect ratio (width / height).
        #[arg(long)]
        aspect_ratio: Option<f64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match cli.command {
        Command::Init { root, name, backend_url } => {
            init_workspace_command(&root, name, backend_url)?
        }
        Command::Info { root, json } => workspace_info_command(&root, json)?,
        Command::Upload { root, archive } => upload_command(&root, &archive)?,
        Command::Tree { root, session, json } => tree_command(&root, &session, json)?,
        Command::Methods { root, session, file } => methods_command(&root, &session, &file)?,
        Command::Source { root, session, file, method } => {
            source_command(&root, &session, &file, &method)?
        }
        Command::Analyze { root, session, file, method, json } => {
            analyze_command(&root, &session, file, method, json)?
        }
        Command::Package { root, session, paths } => package_command(&root, &session, &paths)?,
        Command::Results { root, session, json } => results_command(&root, &session, json)?,
        Command::ClearResults { root, session } => clear_results_command(&root, &session)?,
        Command::Download { root, session, unique_id, out } => {
            download_command(&root, &session, &unique_id, out)?
        }
        Command::View { root, image, script, session, aspect_ratio, json } => {
            view_command(&root, &image, &script, session, aspect_ratio, json)?
        }
    }

    Ok(())
}
