//! Command-line argument parsing for termchat
//!
//! Flag surface mirrors the classic terminal-gpt tools: one positional
//! prompt, short mode switches, long provider/parameter overrides.

use clap::Parser;
use std::path::PathBuf;

/// termchat - AI chat in the terminal, no key required for the defaults
#[derive(Parser, Debug)]
#[command(name = "termchat")]
#[command(version)]
#[command(about = "Chat with AI models from the terminal", long_about = None)]
pub struct Args {
    /// Prompt to send (reads piped stdin too, appended to this)
    #[arg(value_name = "PROMPT", trailing_var_arg = true)]
    pub prompt: Vec<String>,

    /// Generate and optionally execute a shell command
    #[arg(short = 's', long)]
    pub shell: bool,

    /// Generate code only, no markdown
    #[arg(short = 'c', long)]
    pub code: bool,

    /// Plain response without loading animation
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Print the whole response at once when complete
    #[arg(short = 'w', long)]
    pub whole: bool,

    /// Start normal interactive mode
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Start interactive shell mode (responses may carry a runnable command)
    #[arg(long, visible_alias = "is")]
    pub interactive_shell: bool,

    /// Generate an image instead of text
    #[arg(long)]
    pub img: bool,

    /// Execute the generated shell command without confirmation
    #[arg(short = 'y', long = "yes")]
    pub auto_exec: bool,

    /// Provider to use (empty selects the default, phind)
    #[arg(long)]
    pub provider: Option<String>,

    /// Model override for the chosen provider
    #[arg(long)]
    pub model: Option<String>,

    /// API key, for the providers that need one
    #[arg(long)]
    pub key: Option<String>,

    /// Endpoint url override
    #[arg(long)]
    pub url: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<String>,

    /// Nucleus sampling top-p
    #[arg(long = "top_p")]
    pub top_p: Option<String>,

    /// Response length limit, for the providers that accept one
    #[arg(long = "max_length")]
    pub max_length: Option<String>,

    /// Extra system prompt prepended to every request
    #[arg(long)]
    pub preprompt: Option<String>,

    /// Log the conversation to this file
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Number of images to generate
    #[arg(long, default_value_t = 1)]
    pub img_count: u32,

    /// Negative prompt for image generation
    #[arg(long, default_value = "")]
    pub img_negative: String,

    /// Image aspect ratio, e.g. 1:1 or 16:9
    #[arg(long, default_value = "1:1")]
    pub img_ratio: String,
}

impl Args {
    /// The positional words joined back into one prompt string
    pub fn prompt_text(&self) -> String {
        self.prompt.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_and_overrides_parse() {
        let args = Args::parse_from([
            "termchat",
            "-s",
            "-y",
            "--provider",
            "openai",
            "--model",
            "gpt-4.1",
            "list",
            "all",
            "files",
        ]);
        assert!(args.shell);
        assert!(args.auto_exec);
        assert_eq!(args.provider.as_deref(), Some("openai"));
        assert_eq!(args.prompt_text(), "list all files");
    }

    #[test]
    fn test_interactive_shell_alias() {
        let args = Args::parse_from(["termchat", "--is"]);
        assert!(args.interactive_shell);
        assert!(!args.interactive);
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["termchat"]);
        assert!(!args.shell && !args.code && !args.quiet && !args.whole);
        assert_eq!(args.img_count, 1);
        assert_eq!(args.img_ratio, "1:1");
        assert_eq!(args.prompt_text(), "");
    }
}
