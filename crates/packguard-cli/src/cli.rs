use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "packguard",
    about = "Validate game data JSON and build a manifest for fast loading",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the data tree, check integrity, and emit the manifest
    Check {
        /// Tree root containing the data subtree and media roots
        #[arg(long, default_value = ".")]
        root: String,

        /// Name of the documents subtree under the root
        #[arg(long, default_value = "data")]
        data_dir: String,

        /// Schema directory (default: <root>/<data-dir>/schema)
        #[arg(long)]
        schema_dir: Option<String>,

        /// Where to write the manifest JSON (relative paths resolve
        /// against the root)
        #[arg(long, default_value = "build/data_manifest.json")]
        manifest: String,

        /// Optional Markdown report path
        #[arg(long)]
        report: Option<String>,

        /// Rewrite successfully parsed JSON with stable formatting
        #[arg(long)]
        fix: bool,

        /// Exit nonzero if warnings are present
        #[arg(long)]
        fail_on_warning: bool,

        /// Worker pool size for per-file work (default: available
        /// parallelism)
        #[arg(long)]
        jobs: Option<usize>,

        /// Pin the manifest header timestamp (RFC 3339) for
        /// reproducible output
        #[arg(long)]
        timestamp: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
