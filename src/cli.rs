use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "nslog-extract")]
#[clap(about = "NetScaler Log Keyword Extractor", long_about = None)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Path to log file or folder
    #[clap(long)]
    pub path: String,

    /// Comma-separated keywords or regex patterns
    #[clap(long)]
    pub keywords: String,

    /// Output file name
    #[clap(long, default_value = "filtered_logs.txt")]
    pub output: String,

    /// Enable regex-based search
    #[clap(long)]
    pub regex: bool,

    /// Comma-separated keywords to exclude
    #[clap(long)]
    pub exclude: Option<String>,

    /// Filter logs since this timestamp (e.g. 'Oct 28 10:00:00')
    #[clap(long)]
    pub since: Option<String>,

    /// Filter logs until this timestamp (e.g. 'Oct 28 18:00:00')
    #[clap(long)]
    pub until: Option<String>,
}
