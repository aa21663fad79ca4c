use clap::Parser;

/// Fast filename search on mounted volumes.
///
/// Matches against the final path component only. Prefix the term with `^`
/// to match the start of the filename, suffix it with `$` to match the end.
#[derive(Parser, Debug)]
#[command(name = "searchfs", author, version, about, long_about = None)]
pub struct Cli {
    /// Filename search term
    #[arg(value_name = "TERM", required_unless_present = "list")]
    pub term: Option<String>,

    /// Search only this volume (device identifier or mount path)
    #[arg(short = 'v', long, value_name = "DEVICE_OR_PATH")]
    pub volume: Option<String>,

    /// List mounted volumes and exit
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Match directories only
    #[arg(short = 'd', long = "dirs-only")]
    pub dirs_only: bool,

    /// Match files only
    #[arg(short = 'f', long = "files-only")]
    pub files_only: bool,

    /// Skip the contents of packages such as .app bundles
    #[arg(short = 'p', long = "skip-packages")]
    pub skip_packages: bool,

    /// Skip invisible (dot) files and directories
    #[arg(short = 'i', long = "skip-invisibles")]
    pub skip_invisibles: bool,

    /// Skip the protected system folders
    #[arg(short = 'x', long = "skip-inappropriate", visible_alias = "skip-system")]
    pub skip_inappropriate: bool,

    /// Match the whole filename exactly
    #[arg(short = 'e', long = "exact-match")]
    pub exact_match: bool,

    /// Case-sensitive matching
    #[arg(short = 's', long = "case-sensitive")]
    pub case_sensitive: bool,

    /// Match filenames that do NOT contain the term
    #[arg(short = 'n', long = "negate-params")]
    pub negate: bool,

    /// Stop after this many results
    #[arg(short = 'm', long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Log search progress to stderr
    #[arg(long)]
    pub verbose: bool,
}
