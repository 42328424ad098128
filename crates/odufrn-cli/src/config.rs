use clap::{Args, Parser, Subcommand, ValueEnum};
use odufrn_core::{DownloadOptions, EntityKind, FileConfig, HttpConfig};
use std::path::PathBuf;
use std::time::Duration;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "odufrn")]
#[command(
    author,
    version,
    about = "Lists, searches and downloads datasets from the UFRN open data portal"
)]
#[command(after_help = "Examples:
  odufrn list packages
  odufrn search discentes --tags
  odufrn package discentes docentes --years 2018,2019 --no-dictionary
  odufrn group pessoas --dest ./dados
  odufrn file pacotes.txt

Configuration:
  ~/.config/odufrn/config.toml (optional) - defaults for every flag below
  ODUFRN_BASE_URL                          - portal URL")]
pub struct Config {
    /// Portal base URL (defaults to http://dados.ufrn.br/)
    #[arg(long, env = "ODUFRN_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Custom path to config.toml
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Log debug details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    /// Portal URL: flag or environment, then config file, then the default portal.
    pub fn base_url(&self, file: &FileConfig) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| file.base_url().to_string())
    }

    pub fn http_config(&self, file: &FileConfig) -> HttpConfig {
        let config = file.http_config();
        match self.timeout {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every name of a catalog
    #[command(after_help = "Example: odufrn list groups")]
    List {
        #[arg(value_enum)]
        kind: CatalogKind,
    },
    /// Find packages (or groups) with names similar to a keyword
    #[command(after_help = "Examples:
  odufrn search discente          # Typo tolerant
  odufrn search centes --simple   # Substring match
  odufrn search ensino --tags     # Also packages tagged with similar tags
  odufrn search pessoa --groups   # Search groups instead of packages")]
    Search {
        keyword: String,
        /// Search groups instead of packages
        #[arg(long, conflicts_with = "tags")]
        groups: bool,
        /// Substring matching instead of fuzzy matching
        #[arg(long)]
        simple: bool,
        /// Include packages whose tags match the keyword
        #[arg(long)]
        tags: bool,
    },
    /// Download packages by name
    Package {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
        #[command(flatten)]
        download: DownloadArgs,
    },
    /// Download every package of the given groups
    Group {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
        #[command(flatten)]
        download: DownloadArgs,
    },
    /// Download every package of the portal
    All {
        #[command(flatten)]
        download: DownloadArgs,
    },
    /// Download the packages listed in a file, one name per line
    #[command(after_help = "Blank lines and lines starting with '#' are ignored.")]
    File {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        #[command(flatten)]
        download: DownloadArgs,
    },
}

/// Options shared by the download commands.
#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Destination directory (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Skip data dictionary resources
    #[arg(long)]
    pub no_dictionary: bool,

    /// Only download resources mentioning these years
    #[arg(long, value_name = "YEARS", value_delimiter = ',')]
    pub years: Option<Vec<u32>>,
}

impl DownloadArgs {
    /// Merges the flags with the config file; flags win.
    pub fn to_options(&self, file: &FileConfig) -> DownloadOptions {
        let destination = self
            .dest
            .clone()
            .or_else(|| file.destination.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let mut options = DownloadOptions::new(destination);
        if self.no_dictionary || file.dictionary == Some(false) {
            options = options.without_dictionary();
        }
        if let Some(years) = &self.years {
            options = options.with_years(years.clone());
        }
        options
    }
}

/// Catalogs that can be listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogKind {
    Packages,
    Groups,
    Tags,
}

impl From<CatalogKind> for EntityKind {
    fn from(kind: CatalogKind) -> Self {
        match kind {
            CatalogKind::Packages => EntityKind::Package,
            CatalogKind::Groups => EntityKind::Group,
            CatalogKind::Tags => EntityKind::Tag,
        }
    }
}
