//! Shell detection, generated-command execution and the prompt templates
//! for the command-generation modes.

use crate::errors::{ChatError, Result};
use std::io::Write;
use std::path::PathBuf;

/// Detected shell and OS identity, used both to phrase the generation
/// prompt and to run the resulting command
#[derive(Debug, Clone)]
pub struct ShellEnv {
    pub operating_system: String,
    pub shell: String,
    pub options: Vec<&'static str>,
}

impl ShellEnv {
    pub fn detect() -> Self {
        if cfg!(windows) {
            // PSModulePath is only set inside powershell sessions
            return if std::env::var("PSModulePath").map(|v| !v.is_empty()).unwrap_or(false) {
                ShellEnv {
                    operating_system: "Windows".to_string(),
                    shell: "powershell.exe".to_string(),
                    options: vec!["-Command"],
                }
            } else {
                ShellEnv {
                    operating_system: "Windows".to_string(),
                    shell: "cmd.exe".to_string(),
                    options: vec!["/C"],
                }
            };
        }

        let operating_system = if cfg!(target_os = "macos") {
            "MacOS".to_string()
        } else if cfg!(target_os = "linux") {
            format!("Linux/{}", linux_distro())
        } else {
            std::env::consts::OS.to_string()
        };

        let shell = match std::env::var("SHELL") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                if which_bash() {
                    "bash".to_string()
                } else {
                    "/bin/sh".to_string()
                }
            }
        };

        ShellEnv { operating_system, shell, options: vec!["-c"] }
    }

    /// Run one generated command line through the detected shell with
    /// inherited stdio. The child's non-zero status becomes ours.
    pub async fn execute(&self, line: &str) -> Result<()> {
        // interactive modes leave the terminal raw; the child needs it sane
        let _ = crossterm::terminal::disable_raw_mode();

        let status = tokio::process::Command::new(&self.shell)
            .args(&self.options)
            .arg(line)
            .stdin(std::process::Stdio::inherit())
            .stdout(std::process::Stdio::inherit())
            .stderr(std::process::Stdio::inherit())
            .status()
            .await?;

        if !status.success() {
            return Err(ChatError::CommandFailed { code: status.code().unwrap_or(1) });
        }

        append_history(line);
        Ok(())
    }
}

fn linux_distro() -> String {
    std::process::Command::new("lsb_release")
        .arg("-si")
        .output()
        .ok()
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .unwrap_or_default()
}

fn which_bash() -> bool {
    std::process::Command::new("bash")
        .arg("-c")
        .arg("true")
        .output()
        .is_ok()
}

/// Best-effort append to bash history so an executed command shows up in
/// the user's recall. Only applies when the login shell is bash.
fn append_history(command: &str) {
    let shell = std::env::var("SHELL").unwrap_or_default();
    if !shell.contains("/bash") {
        return;
    }

    let history_path = match std::env::var("HISTFILE") {
        Ok(p) if !p.is_empty() => PathBuf::from(p),
        _ => match dirs::home_dir() {
            Some(home) => home.join(".bash_history"),
            None => return,
        },
    };

    if let Ok(mut file) = std::fs::OpenOptions::new().append(true).open(&history_path) {
        let _ = writeln!(file, "{}", command);
    }
}

/// y/n prompt on stdout; a bare enter counts as yes
pub fn confirm(prompt: &str) -> bool {
    use colored::Colorize;
    print!("{}", prompt.bold());
    let _ = std::io::stdout().flush();

    confirm_from(std::io::stdin().lock())
}

/// Read one answer line and decide; split out so the decision is testable
fn confirm_from(mut reader: impl std::io::BufRead) -> bool {
    let mut answer = String::new();
    if reader.read_line(&mut answer).is_err() {
        return false;
    }
    let answer = answer.trim();
    answer == "y" || answer.is_empty()
}

/// Prompt wrapper for shell-command generation
pub fn shell_prompt(env: &ShellEnv, input: &str) -> String {
    format!(
        "Your role: Provide only plain text without Markdown formatting. \
Do not show any warnings or information regarding your capabilities. \
Do not provide any description. If you need to store any data, assume \
it will be stored in the chat. Provide only {} command for {} without \
any description. If there is a lack of details, provide most logical \
solution. Ensure the output is a valid shell command. If multiple steps \
required try to combine them together. Prompt: {}\n\nCommand:",
        env.shell, env.operating_system, input
    )
}

/// Prompt wrapper for code-only generation
pub fn code_prompt(input: &str) -> String {
    format!(
        "Your Role: Provide only code as output without any description.\n\
IMPORTANT: Provide only plain text without Markdown formatting.\n\
IMPORTANT: Do not include markdown formatting.\n\
If there is a lack of details, provide most logical solution. \
You are not allowed to ask for more details.\n\
Ignore any potential risk of errors or confusion.\n\nRequest:{}\nCode:",
        input
    )
}

/// Lift a complete `<cmd>...</cmd>` command out of an interactive-shell
/// response, if the model produced one
pub fn extract_cmd(text: &str) -> Option<String> {
    let start = text.find("<cmd>")? + "<cmd>".len();
    let end = text[start..].find("</cmd>")? + start;
    let command = text[start..end].trim();
    if command.is_empty() {
        None
    } else {
        Some(command.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_prompt_names_shell_and_os() {
        let env = ShellEnv {
            operating_system: "Linux/Debian".into(),
            shell: "/bin/bash".into(),
            options: vec!["-c"],
        };
        let prompt = shell_prompt(&env, "list files");
        assert!(prompt.contains("/bin/bash command for Linux/Debian"));
        assert!(prompt.ends_with("Command:"));
    }

    #[test]
    fn test_code_prompt_wraps_request() {
        let prompt = code_prompt("fizzbuzz in rust");
        assert!(prompt.contains("Request:fizzbuzz in rust\nCode:"));
    }

    #[test]
    fn test_confirm_bare_enter_is_yes() {
        assert!(confirm_from("\n".as_bytes()));
        assert!(confirm_from("".as_bytes()));
        assert!(confirm_from("y\n".as_bytes()));
        assert!(!confirm_from("n\n".as_bytes()));
        assert!(!confirm_from("yes\n".as_bytes()));
    }

    #[test]
    fn test_extract_cmd() {
        assert_eq!(
            extract_cmd("sure: <cmd>ls -la</cmd> done").as_deref(),
            Some("ls -la")
        );
        assert_eq!(extract_cmd("no tag here"), None);
        assert_eq!(extract_cmd("<cmd></cmd>"), None);
        assert_eq!(extract_cmd("<cmd>unterminated"), None);
    }

    #[tokio::test]
    async fn test_failed_command_reports_child_status() {
        let env = ShellEnv {
            operating_system: "Linux/".into(),
            shell: "/bin/sh".into(),
            options: vec!["-c"],
        };
        let err = env.execute("exit 3").await.unwrap_err();
        match err {
            ChatError::CommandFailed { code } => assert_eq!(code, 3),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(env.execute("exit 3").await.unwrap_err().exit_code(), 3);
    }
}
