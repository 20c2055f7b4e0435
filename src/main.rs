//! termchat - CLI entry point and mode dispatch

use clap::{CommandFactory, Parser};
use colored::Colorize;
use reqwest::Client;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{IsTerminal, Read, Write};

use termchat::cli::Args;
use termchat::config::Config;
use termchat::errors::Result;
use termchat::imagegen::{self, ImageParams};
use termchat::providers::{self, WireAdapter};
use termchat::render::{writer, CmdRenderState, RenderState};
use termchat::session::Session;
use termchat::shell::{self, ShellEnv};
use termchat::spinner::Spinner;
use termchat::streaming::{send, DeltaStream};
use termchat::types::Params;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(err) = run(args).await {
        eprintln!("{}", err.to_string().red());
        std::process::exit(err.exit_code());
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load().unwrap_or_default();

    let provider = args
        .provider
        .clone()
        .or_else(|| std::env::var("AI_PROVIDER").ok())
        .or_else(|| config.default_provider().map(str::to_string))
        .unwrap_or_default();

    // Allow-list check happens before any prompt handling or network call
    let mut adapter = providers::select(&provider)?;

    let params = Params {
        provider: provider.clone(),
        api_model: args
            .model
            .clone()
            .or_else(|| config.default_model().map(str::to_string))
            .unwrap_or_default(),
        api_key: args.key.clone().unwrap_or_default(),
        url: args.url.clone().unwrap_or_default(),
        temperature: args.temperature.clone().unwrap_or_default(),
        top_p: args.top_p.clone().unwrap_or_default(),
        max_length: args.max_length.clone().unwrap_or_default(),
        system_prompt: args.preprompt.clone().unwrap_or_default(),
        prev_messages: Vec::new(),
    };

    let client = termchat::client::new_client()?;

    if args.interactive {
        return interactive_loop(adapter.as_mut(), &client, params, &args).await;
    }
    if args.interactive_shell {
        return interactive_shell_loop(adapter.as_mut(), &client, params, &args).await;
    }

    let input = full_input(&args);
    if input.trim().is_empty() {
        let _ = Args::command().print_help();
        println!();
        return Ok(());
    }

    if args.img {
        let image_params = ImageParams {
            model: params.api_model.clone(),
            count: args.img_count,
            negative_prompt: args.img_negative.clone(),
            ratio: args.img_ratio.clone(),
        };
        return imagegen::generate(&client, &input, &image_params, args.quiet).await;
    }

    if args.shell {
        return shell_mode(adapter.as_mut(), &client, &params, &input, &args).await;
    }
    if args.code {
        let prompt = shell::code_prompt(&input);
        let spinner = Spinner::start();
        let response = request(adapter.as_mut(), &client, &params, &prompt).await;
        spinner.stop();
        stream_raw(response?, adapter.as_ref()).await?;
        println!();
        return Ok(());
    }
    if args.quiet {
        let response = request(adapter.as_mut(), &client, &params, &input).await?;
        stream_raw(response, adapter.as_ref()).await?;
        println!();
        return Ok(());
    }
    if args.whole {
        let response = request(adapter.as_mut(), &client, &params, &input).await?;
        let full = DeltaStream::new(response, adapter.as_ref()).collect_text().await?;
        println!("{}", full);
        return Ok(());
    }

    // Normal mode: spinner until the first byte, markdown-styled stream
    let spinner = Spinner::start();
    let response = request(adapter.as_mut(), &client, &params, &input).await;
    spinner.stop();
    println!();
    stream_rendered(response?, adapter.as_ref()).await?;
    print!("\n\n");
    Ok(())
}

/// CLI prompt words plus anything piped on stdin
fn full_input(args: &Args) -> String {
    let prompt = args.prompt_text();

    let mut piped = String::new();
    if !std::io::stdin().is_terminal() {
        let _ = std::io::stdin().read_to_string(&mut piped);
    }
    let piped = piped.trim_end();

    if piped.is_empty() {
        prompt
    } else if prompt.is_empty() {
        piped.to_string()
    } else {
        format!("{}\n\n{}", prompt, piped)
    }
}

async fn request(
    adapter: &mut dyn WireAdapter,
    client: &Client,
    params: &Params,
    input: &str,
) -> Result<reqwest::Response> {
    let req = adapter.build_request(client, params, input).await?;
    let response = send(client, req).await?;
    adapter.observe_response(&response);
    Ok(response)
}

/// Stream deltas to stdout without any styling, returning the full text
async fn stream_raw(response: reqwest::Response, adapter: &dyn WireAdapter) -> Result<String> {
    let mut deltas = DeltaStream::new(response, adapter);
    let mut full = String::new();

    while let Some(delta) = deltas.next().await? {
        print!("{}", delta);
        let _ = std::io::stdout().flush();
        full.push_str(&delta);
    }
    Ok(full)
}

/// Stream deltas through the markdown renderer
async fn stream_rendered(
    response: reqwest::Response,
    adapter: &dyn WireAdapter,
) -> Result<String> {
    let mut state = RenderState::new(writer::terminal_width(), adapter.wrap_exempt());
    let mut deltas = DeltaStream::new(response, adapter);
    let mut full = String::new();

    while let Some(delta) = deltas.next().await? {
        writer::print_chunks(&state.push_delta(&delta));
        full.push_str(&delta);
    }
    Ok(full)
}

/// Stream deltas through the command-aware renderer (interactive shell)
async fn stream_cmd_rendered(
    response: reqwest::Response,
    adapter: &dyn WireAdapter,
) -> Result<String> {
    let mut state = CmdRenderState::new(writer::terminal_width(), adapter.wrap_exempt());
    let mut deltas = DeltaStream::new(response, adapter);
    let mut full = String::new();

    while let Some(delta) = deltas.next().await? {
        writer::print_chunks(&state.push_delta(&delta));
        full.push_str(&delta);
    }

    if state.pending_tag().is_some() {
        eprintln!("{}", "Warning: response ended inside an unterminated tag".yellow());
    }
    Ok(full)
}

/// One-shot shell mode: wrap the input in the command prompt, stream the
/// raw answer, then offer to run it if it came back as a single line
async fn shell_mode(
    adapter: &mut dyn WireAdapter,
    client: &Client,
    params: &Params,
    input: &str,
    args: &Args,
) -> Result<()> {
    let env = ShellEnv::detect();
    let prompt = shell::shell_prompt(&env, input);

    let spinner = Spinner::start();
    let response = request(adapter, client, params, &prompt).await;
    spinner.stop();

    let command = stream_raw(response?, adapter).await?;
    let command = command.trim().to_string();

    // multi-line output means the model ignored the format, never run that
    if command.is_empty() || command.lines().count() != 1 {
        println!();
        return Ok(());
    }

    if args.auto_exec {
        println!();
        env.execute(&command).await
    } else if shell::confirm("\n\nExecute shell command? [y/n]: ") {
        env.execute(&command).await
    } else {
        Ok(())
    }
}

/// Multi-turn conversation with markdown rendering
async fn interactive_loop(
    adapter: &mut dyn WireAdapter,
    client: &Client,
    mut params: Params,
    args: &Args,
) -> Result<()> {
    let mut session = Session::new(args.log.clone());
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Error: {}", err);
            return Ok(());
        }
    };

    loop {
        println!("{}", "╭─ You".bold().blue());
        let line = match editor.readline("┃ ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        };

        let input = line.trim().to_string();
        if input.is_empty() {
            continue;
        }
        if input == "exit" {
            break;
        }
        let _ = editor.add_history_entry(&input);

        params.prev_messages = session.history().to_vec();
        let response = request(adapter, client, &params, &input).await?;

        println!();
        println!("{}", "╭─ Bot".bold().magenta());
        let full = stream_rendered(response, adapter).await?;
        print!("\n\n");

        session.record(&input, &full);
    }
    Ok(())
}

/// Multi-turn conversation where the model may answer with a runnable
/// command wrapped in a tag; complete tags are offered for execution
async fn interactive_shell_loop(
    adapter: &mut dyn WireAdapter,
    client: &Client,
    mut params: Params,
    args: &Args,
) -> Result<()> {
    let env = ShellEnv::detect();
    let mut session = Session::new(args.log.clone());
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Error: {}", err);
            return Ok(());
        }
    };

    // The model is told up front how to mark commands
    if params.system_prompt.is_empty() {
        params.system_prompt = format!(
            "You are a helpful terminal assistant on {} using {}. When the \
user asks for something a shell command can do, reply with that command \
wrapped as <cmd>command</cmd>, otherwise answer normally.",
            env.operating_system, env.shell
        );
    }

    loop {
        println!("{}", "╭─ You".bold().blue());
        let line = match editor.readline("┃ ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        };

        let input = line.trim().to_string();
        if input.is_empty() {
            continue;
        }
        if input == "exit" {
            break;
        }
        let _ = editor.add_history_entry(&input);

        params.prev_messages = session.history().to_vec();
        let response = request(adapter, client, &params, &input).await?;

        println!();
        println!("{}", "╭─ Bot".bold().magenta());
        let full = stream_cmd_rendered(response, adapter).await?;
        print!("\n\n");

        if let Some(command) = shell::extract_cmd(&full) {
            let run = args.auto_exec
                || shell::confirm(&format!("Execute '{}'? [y/n]: ", command));
            if run {
                if let Err(err) = env.execute(&command).await {
                    eprintln!("{}", err.to_string().red());
                }
                println!();
            }
        }

        session.record(&input, &full);
    }
    Ok(())
}
