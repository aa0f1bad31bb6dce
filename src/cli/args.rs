//! Command-line arguments for the `brain` binary.

use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::ClientConfig;
use crate::diagram::DiagramTheme;
use crate::error::BrainResult;
use crate::models::{DataFilters, Gender};

/// Command-line client for the Brain mental-health admissions dashboard
#[derive(Parser, Debug)]
#[command(name = "brain", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API root, e.g. http://localhost:8000/api (overrides BRAIN_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds (overrides BRAIN_REQUEST_TIMEOUT_SECS)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Environment configuration with command-line overrides applied,
    /// validated as a whole.
    pub fn client_config(&self) -> BrainResult<ClientConfig> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.as_str());
        }
        if let Some(secs) = self.timeout {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Backend and database health
    Health {
        /// Include connection pool statistics
        #[arg(long)]
        pool: bool,
        /// Include AI assistant component status
        #[arg(long)]
        ai: bool,
    },
    /// Landing page insight metrics
    Insights,
    /// Diagnostic categories available as filters
    Categories,
    /// Aggregated admissions data
    Viz(VizArgs),
    /// Ask the AI assistant a question
    Chat(ChatArgs),
    /// Run an analytical query through the AI assistant
    Analyze {
        /// The analysis request
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Generate a Mermaid diagram from a description
    Diagram {
        /// What the diagram should show
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
        /// Renderer theme (default, dark, forest, neutral, base)
        #[arg(long, default_value = "default")]
        theme: DiagramTheme,
        /// Print the assistant's answer unchanged
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct VizArgs {
    /// First admission date (YYYY-MM-DD)
    #[arg(long = "from", value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    /// Last admission date (YYYY-MM-DD)
    #[arg(long = "to", value_name = "DATE")]
    pub end_date: Option<NaiveDate>,

    /// male/female (or 1/2)
    #[arg(long)]
    pub gender: Option<Gender>,

    #[arg(long, value_name = "YEARS")]
    pub age_min: Option<u32>,

    #[arg(long, value_name = "YEARS")]
    pub age_max: Option<u32>,

    /// Diagnostic category, exactly as listed by `brain categories`
    #[arg(long)]
    pub category: Option<String>,

    /// Only readmissions (true) or only first admissions (false)
    #[arg(long, value_name = "BOOL")]
    pub readmission: Option<bool>,
}

impl VizArgs {
    pub fn filters(&self) -> DataFilters {
        DataFilters {
            start_date: self.start_date,
            end_date: self.end_date,
            gender: self.gender,
            age_min: self.age_min,
            age_max: self.age_max,
            category: self.category.clone(),
            readmission: self.readmission,
        }
    }
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// The question; omit it to start an interactive session
    #[arg(num_args = 1..)]
    pub message: Vec<String>,

    /// Read questions from stdin, keeping the conversation history
    #[arg(short, long, conflicts_with = "message")]
    pub interactive: bool,

    /// Wait for the whole answer instead of streaming progress
    #[arg(long, requires = "message")]
    pub no_stream: bool,

    /// Only print the final answer
    #[arg(short, long)]
    pub quiet: bool,
}

impl ChatArgs {
    pub fn message(&self) -> String {
        self.message.join(" ")
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive || self.message.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_API_URL;
    use serial_test::serial;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_viz_filters() {
        let cli = parse(&[
            "brain",
            "viz",
            "--from",
            "2018-01-01",
            "--gender",
            "female",
            "--age-min",
            "18",
            "--category",
            "Esquizofrenia",
            "--readmission",
            "true",
        ]);

        let Commands::Viz(args) = cli.command else {
            panic!("Expected viz command");
        };
        let filters = args.filters();
        assert_eq!(filters.start_date, NaiveDate::from_ymd_opt(2018, 1, 1));
        assert_eq!(filters.gender, Some(Gender::Female));
        assert_eq!(filters.age_min, Some(18));
        assert_eq!(filters.age_max, None);
        assert_eq!(filters.readmission, Some(true));
    }

    #[test]
    fn test_parse_bad_date_fails() {
        assert!(Cli::try_parse_from(["brain", "viz", "--from", "01/02/2018"]).is_err());
    }

    #[test]
    fn test_parse_chat_joins_words() {
        let cli = parse(&["brain", "chat", "¿Cuántos", "ingresos", "hay?", "--no-stream"]);
        let Commands::Chat(args) = cli.command else {
            panic!("Expected chat command");
        };
        assert_eq!(args.message(), "¿Cuántos ingresos hay?");
        assert!(args.no_stream);
        assert!(!args.quiet);
        assert!(!args.is_interactive());
    }

    #[test]
    fn test_parse_chat_without_message_is_interactive() {
        let Commands::Chat(args) = parse(&["brain", "chat", "-q"]).command else {
            panic!("Expected chat command");
        };
        assert!(args.is_interactive());
        assert!(args.quiet);

        let Commands::Chat(args) = parse(&["brain", "chat", "--interactive"]).command else {
            panic!("Expected chat command");
        };
        assert!(args.is_interactive());

        assert!(Cli::try_parse_from(["brain", "chat", "-i", "hola"]).is_err());
        assert!(Cli::try_parse_from(["brain", "chat", "--no-stream"]).is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = parse(&[
            "brain",
            "health",
            "--ai",
            "--base-url",
            "http://remote/api",
            "--timeout",
            "5",
            "-v",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.base_url.as_deref(), Some("http://remote/api"));
        assert_eq!(cli.timeout, Some(5));
        assert!(matches!(cli.command, Commands::Health { pool: false, ai: true }));
    }

    #[test]
    fn test_parse_diagram_theme() {
        let cli = parse(&["brain", "diagram", "flujo", "de", "ingreso", "--theme", "dark"]);
        let Commands::Diagram {
            description, theme, ..
        } = cli.command
        else {
            panic!("Expected diagram command");
        };
        assert_eq!(description.join(" "), "flujo de ingreso");
        assert_eq!(theme, DiagramTheme::Dark);
    }

    #[test]
    #[serial]
    fn test_base_url_flag_overrides_invalid_env() {
        std::env::set_var(ENV_API_URL, "localhost:8000");
        let cli = parse(&["brain", "health", "--base-url", "http://ok.test/api"]);
        let config = cli.client_config();
        let without_flag = parse(&["brain", "health"]).client_config();
        std::env::remove_var(ENV_API_URL);

        assert_eq!(config.unwrap().base_url, "http://ok.test/api");
        assert_eq!(without_flag.unwrap_err().error_code(), "E_CONFIG");
    }
}
