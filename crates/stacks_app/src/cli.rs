//! Command line definitions for `stacks-agent`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "stacks-agent")]
#[command(about = "Adds \"Download\" controls to search and detail pages and sends picks to a Stacks queue server")]
#[command(version)]
pub(crate) struct Cli {
    /// Settings file
    #[arg(long, default_value = "stacks_agent.ron", global = true)]
    pub settings: PathBuf,

    /// Log file
    #[arg(long, default_value = agent_logging::DEFAULT_LOG_FILE, global = true)]
    pub log_file: PathBuf,

    /// Also log to the terminal; repeat for debug output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Augment a page and optionally click its controls
    Augment(AugmentArgs),

    /// Send one item to the queue
    Queue {
        /// 32-character md5, or a URL containing /md5/<id>
        item: String,
    },

    /// Show, change, test or reset the stored settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Args, Debug)]
pub(crate) struct AugmentArgs {
    /// HTML file or http(s) URL of the host page
    #[arg(long)]
    pub page: String,

    /// URL the page was served from (required for files)
    #[arg(long)]
    pub location: Option<String>,

    /// HTML fragment file appended after the first scan, like an infinite scroll load
    #[arg(long)]
    pub append: Vec<PathBuf>,

    /// Where appended fragments go
    #[arg(long, default_value = "body")]
    pub into: String,

    /// Control to click, by id (first control is 1)
    #[arg(long)]
    pub click: Vec<u64>,

    /// Write the augmented page here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum SettingsAction {
    /// Print the stored settings (the API key is never shown)
    Show,

    /// Change settings; omitted fields keep their stored value
    Set {
        #[arg(long)]
        server: Option<String>,

        #[arg(long)]
        api_key: Option<String>,

        #[arg(long, value_enum)]
        notifications: Option<Toggle>,
    },

    /// Check the server and key without saving them
    Test {
        #[arg(long)]
        server: Option<String>,

        #[arg(long)]
        api_key: Option<String>,
    },

    /// Restore defaults, clearing the API key
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Toggle::On
    }
}
