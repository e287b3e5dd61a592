//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use campus_events::services::filter::{CategoryFilter, EventQuery, StatusFilter};

/// Browse campus events and watch their status change in real time.
#[derive(Parser, Debug)]
#[command(name = "campus-events", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Read events from a JSON export instead of the API.
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,

    /// Backend base URL, overriding config and environment.
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    /// Distinguish ongoing events (uses the configured ongoing window).
    #[arg(long = "ongoing", global = true)]
    pub ongoing: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print event statistics.
    Stats {
        /// Also print participation statistics for this user id.
        #[arg(long = "user")]
        user: Option<String>,
    },
    /// List events matching a query.
    List(QueryArgs),
    /// Show one event with its countdown.
    Show {
        /// Event id.
        id: String,
    },
    /// Keep the dashboard up to date until Ctrl-C.
    Watch {
        #[command(flatten)]
        query: QueryArgs,

        /// Also run a live countdown to this event.
        #[arg(long = "countdown")]
        countdown: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Case-insensitive text to look for in event names.
    #[arg(short = 't', long = "text")]
    pub text: Option<String>,

    /// Category (seminar, workshop, competition, training, other or all).
    #[arg(long = "category", default_value = "all")]
    pub category: CategoryFilter,

    /// Status (upcoming, ongoing, finished or all).
    #[arg(long = "status", default_value = "all")]
    pub status: StatusFilter,

    /// Match the text against descriptions too.
    #[arg(long = "search-description")]
    pub search_description: bool,
}

impl QueryArgs {
    pub fn to_query(&self) -> EventQuery {
        EventQuery {
            text: self.text.clone().unwrap_or_default(),
            category: self.category,
            status: self.status,
            search_description: self.search_description,
        }
    }
}
