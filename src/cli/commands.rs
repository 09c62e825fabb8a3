//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - create: build a model from a model file
//! - run: generate from a prompt, interactively or in batch
//! - pull / push: transfer a model with per-layer progress
//! - list: show local models

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Large language model runner
#[derive(Parser, Debug)]
#[command(name = "ollama")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (timings for generated responses)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a model from a Modelfile
    Create {
        /// Name of the model to create
        model: String,

        /// Name of the Modelfile
        #[arg(short, long, default_value = "Modelfile")]
        file: PathBuf,
    },

    /// Run a model
    Run {
        /// Model name or path
        model: String,

        /// Prompt; words are joined with spaces. Reads stdin when absent
        prompt: Vec<String>,
    },

    /// Pull a model from a registry
    Pull {
        /// Model name
        model: String,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Push a model to a registry
    Push {
        /// Model name
        model: String,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// List local models
    #[command(alias = "ls")]
    List,
}

/// Registry credentials, forwarded as given
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Registry username
    #[arg(short, long, default_value = "")]
    pub username: String,

    /// Registry password
    #[arg(short, long, default_value = "")]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["ollama"]).is_err());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["ollama", "run", "llama", "-v"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["ollama", "-c", "/path/to/ollama.yml", "list"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/ollama.yml")));
    }

    #[test]
    fn test_create_default_file() {
        let cli = Cli::try_parse_from(["ollama", "create", "mario"]).unwrap();
        match cli.command {
            Commands::Create { model, file } => {
                assert_eq!(model, "mario");
                assert_eq!(file, PathBuf::from("Modelfile"));
            }
            _ => panic!("Expected create command"),
        }
    }

    #[test]
    fn test_create_with_file() {
        let cli = Cli::try_parse_from(["ollama", "create", "-f", "models/Mario", "mario"]).unwrap();
        match cli.command {
            Commands::Create { model, file } => {
                assert_eq!(model, "mario");
                assert_eq!(file, PathBuf::from("models/Mario"));
            }
            _ => panic!("Expected create command"),
        }
    }

    #[test]
    fn test_run_without_prompt() {
        let cli = Cli::try_parse_from(["ollama", "run", "llama"]).unwrap();
        match cli.command {
            Commands::Run { model, prompt } => {
                assert_eq!(model, "llama");
                assert!(prompt.is_empty());
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_run_with_prompt_words() {
        let cli = Cli::try_parse_from(["ollama", "run", "llama", "why", "is", "the", "sky", "blue"]).unwrap();
        match cli.command {
            Commands::Run { prompt, .. } => {
                assert_eq!(prompt.join(" "), "why is the sky blue");
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_pull_without_credentials() {
        let cli = Cli::try_parse_from(["ollama", "pull", "llama"]).unwrap();
        match cli.command {
            Commands::Pull { model, credentials } => {
                assert_eq!(model, "llama");
                assert_eq!(credentials, Credentials::default());
            }
            _ => panic!("Expected pull command"),
        }
    }

    #[test]
    fn test_push_with_credentials() {
        let cli = Cli::try_parse_from(["ollama", "push", "me/llama", "-u", "me", "-p", "secret"]).unwrap();
        match cli.command {
            Commands::Push { model, credentials } => {
                assert_eq!(model, "me/llama");
                assert_eq!(credentials.username, "me");
                assert_eq!(credentials.password, "secret");
            }
            _ => panic!("Expected push command"),
        }
    }

    #[test]
    fn test_list_and_alias() {
        let cli = Cli::try_parse_from(["ollama", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List));

        let cli = Cli::try_parse_from(["ollama", "ls"]).unwrap();
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_help_works() {
        // Verify help doesn't panic
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["ollama", "--version"]);
        // Version flag causes early exit with error (expected)
        assert!(result.is_err());
    }
}
