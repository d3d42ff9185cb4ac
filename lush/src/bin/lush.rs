// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! `lush`, a small front end over the shell engine.
//!
//! - `lush check-config` loads the type registry and prints every mode.
//! - `lush tokenize "echo 42"` shows how a line is tokenized and typed.
//! - `lush complete ca` runs the completion pipeline once and prints the grid.
//! - `lush run` is a line oriented REPL w/ job control.

use std::{io::Write,
          ops::ControlFlow,
          path::PathBuf,
          sync::Arc};

use clap::Parser;
use miette::IntoDiagnostic;
use r3bl_lush::{BuiltinCompletion, BuiltinProvider, CommonResult, CompletionPipeline,
                CompletionQuery, CtagsSymbolIndex, JOB_BUILTINS, JobController,
                JobNotice, MultiLine, ShellConfig, Token, TracingConfig, TypeRegistry,
                TypeTable, Viewport, build_grid, collect_argument_texts, fit_layout,
                flat_layout, normalize_with_types, ok, rotate_type, run_job_builtin,
                setup_default_miette_global_report_handler, spawn_job, tokenize};
use tokio::{io::{AsyncBufReadExt, BufReader},
            sync::mpsc::{UnboundedReceiver, unbounded_channel}};
use unicode_width::UnicodeWidthStr;

use crate::clap_config::{CLIArg, CLICommand};

const ISSUES_URL: &str = "https://github.com/r3bl-org/r3bl-open-core/issues/new";

const PROMPT: &str = "lush> ";

/// Shell builtins that live in the front end, next to the job builtins.
const FRONT_END_BUILTINS: &[(&str, &str)] = &[
    ("cd", "Change the working directory"),
    ("pwd", "Print the working directory"),
    ("exit", "Leave the shell"),
];

#[tokio::main]
async fn main() -> CommonResult<()> {
    setup_default_miette_global_report_handler(ISSUES_URL);

    let cli_arg = CLIArg::parse();

    let enable_logging = cli_arg.global_options.enable_logging;
    if enable_logging {
        TracingConfig::new_file(None, tracing_core::LevelFilter::DEBUG).install_global()?;
        // % is Display, ? is Debug.
        tracing::debug!(message = "Start logging...", cli_arg = ?cli_arg);
    }

    // A broken config is fatal: there are no types to fall back on.
    let config = ShellConfig::try_load(cli_arg.global_options.config.as_deref())?;
    let registry = TypeRegistry::try_from_config(&config)?;
    let mode = cli_arg
        .global_options
        .mode
        .clone()
        .unwrap_or_else(|| config.editor.default_mode.clone());
    let types = registry.try_table(&mode)?;

    match cli_arg.command {
        CLICommand::CheckConfig => check_config(&registry),
        CLICommand::Tokenize { text, rotate } => print_tokens(types, &text, rotate),
        CLICommand::Complete { prefix } => {
            complete(&config, Arc::new(types.clone()), prefix).await?;
        }
        CLICommand::Run => run_repl(types).await?,
    }

    if enable_logging {
        tracing::debug!(message = "Stop logging...");
    }

    ok!()
}

fn check_config(registry: &TypeRegistry) {
    for table in registry.tables() {
        println!("{}", table.mode());
        for it in table.descriptors() {
            println!(
                "  {:<16} priority {:>5}{}",
                it.name,
                it.priority,
                if it.secable { "" } else { "  (not secable)" }
            );
        }
    }
}

fn print_tokens(types: &TypeTable, text: &str, rotate: bool) {
    let mut line = tokenize(text);
    normalize_with_types(types, &mut line);
    if rotate {
        for token in line.tokens.iter_mut().filter(|it| !it.is_space()) {
            rotate_type(types, token);
        }
        normalize_with_types(types, &mut line);
    }
    for token in &line.tokens {
        print_token(types, token, 0);
    }
}

fn print_token(types: &TypeTable, token: &Token, depth: usize) {
    let indent = "  ".repeat(depth);
    let text = token.text();
    println!(
        "{indent}{:>3} {:<16} {}",
        token.x,
        token.type_name,
        types.paint(&token.type_name, &format!("{text:?}"))
    );
    for child in token.children().unwrap_or_default() {
        print_token(types, child, depth + 1);
    }
}

async fn complete(
    config: &ShellConfig,
    types: Arc<TypeTable>,
    prefix: String,
) -> CommonResult<()> {
    let pipeline = CompletionPipeline::with_default_stages(
        config,
        builtin_provider(),
        Arc::new(CtagsSymbolIndex::new()),
    );
    let query = CompletionQuery::new(prefix, current_dir());

    // Providers do blocking I/O.
    let candidates = tokio::task::spawn_blocking(move || {
        pipeline.collect(&query, &types, |progress| {
            eprintln!("[{}/{}] {}", progress.index, progress.total, progress.label);
            ControlFlow::Continue(())
        })
    })
    .await
    .into_diagnostic()?
    .unwrap_or_default();

    if candidates.is_empty() {
        eprintln!("no completions");
        return ok!();
    }

    let labels = candidates
        .iter()
        .map(|it| it.value.as_str())
        .collect::<Vec<_>>();
    let viewport = crossterm::terminal::size().map_or(
        Viewport {
            columns: 80,
            rows: 24,
        },
        |(columns, rows)| Viewport {
            columns: usize::from(columns),
            rows: usize::from(rows),
        },
    );
    let layout = fit_layout(&labels, config.completion.max_rows, viewport)
        .unwrap_or_else(|| flat_layout(labels.len()));
    let grid = build_grid(layout, labels.len());

    let widths = grid
        .columns
        .iter()
        .map(|column| column.iter().map(|it| labels[*it].width()).max().unwrap_or(0))
        .collect::<Vec<_>>();
    for row in grid.rows() {
        let mut line = String::new();
        for (cell, width) in row.iter().zip(&widths) {
            let label = cell.map_or("", |it| labels[it]);
            let padding = width.saturating_sub(label.width()) + 2;
            line.push_str(label);
            line.push_str(&" ".repeat(padding));
        }
        println!("{}", line.trim_end());
    }

    ok!()
}

fn builtin_provider() -> BuiltinProvider {
    BuiltinProvider::new(
        JOB_BUILTINS
            .iter()
            .chain(FRONT_END_BUILTINS)
            .map(|(name, help)| (*name, Some((*help).to_string()))),
    )
}

fn current_dir() -> PathBuf { std::env::current_dir().unwrap_or_else(|_| ".".into()) }

/// What the REPL does w/ one submitted line.
enum LineOutcome {
    Continue,
    Exit,
}

async fn run_repl(types: &TypeTable) -> CommonResult<()> {
    let (notice_sender, mut notices) = unbounded_channel();
    let mut controller = JobController::new(notice_sender);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_prompt();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.into_diagnostic()? else {
                    break;
                };
                let outcome = run_line(&mut controller, &mut notices, types, &line).await;
                controller.drain_events();
                controller.prune_done();
                print_notices(&mut notices);
                if let LineOutcome::Exit = outcome {
                    break;
                }
                print_prompt();
            }
            Some(event) = controller.recv_event() => {
                controller.handle_event(event);
                print_notices(&mut notices);
            }
            // Ctrl+C at the prompt drops the line instead of exiting the shell.
            Ok(()) = tokio::signal::ctrl_c() => {
                println!();
                print_prompt();
            }
        }
    }

    ok!()
}

async fn run_line(
    controller: &mut JobController,
    notices: &mut UnboundedReceiver<JobNotice>,
    types: &TypeTable,
    line: &str,
) -> LineOutcome {
    let mut token_line = tokenize(line);
    normalize_with_types(types, &mut token_line);
    let mut argv = collect_argument_texts(&MultiLine::new(vec![token_line]));

    let background = match argv.last_mut() {
        Some(last) if last.as_str() == "&" => {
            argv.pop();
            true
        }
        Some(last) if last.ends_with('&') => {
            last.pop();
            true
        }
        _ => false,
    };

    let Some((name, args)) = argv.split_first() else {
        return LineOutcome::Continue;
    };

    // % is Display, ? is Debug.
    tracing::debug!(message = "Running line", argv = ?argv, background = %background);

    match name.as_str() {
        "exit" => return LineOutcome::Exit,
        "pwd" => println!("{}", current_dir().display()),
        "cd" => change_dir(args.first().map(String::as_str)),
        _ => match run_job_builtin(controller, name, args) {
            Some(completion) => {
                print!("{}", completion.output());
                if let BuiltinCompletion::Deferred { task, .. } = completion {
                    await_foreground(controller, notices, task).await;
                }
            }
            None => match spawn_job(controller, &argv, background) {
                Ok(job_id) if !background => {
                    if let Some(waiter) = controller.wait(job_id) {
                        await_foreground(controller, notices, waiter.wait()).await;
                    }
                }
                Ok(_) => {}
                Err(error) => eprintln!("lush: {error}"),
            },
        },
    }

    LineOutcome::Continue
}

/// Applies job events until `task` is done. Ctrl+C goes to the foreground job.
async fn await_foreground(
    controller: &mut JobController,
    notices: &mut UnboundedReceiver<JobNotice>,
    task: impl Future<Output = ()>,
) {
    tokio::pin!(task);
    loop {
        tokio::select! {
            () = &mut task => break,
            Some(event) = controller.recv_event() => {
                controller.handle_event(event);
                print_notices(notices);
            }
            Ok(()) = tokio::signal::ctrl_c() => {
                controller.interrupt_foreground();
            }
        }
    }
}

fn change_dir(target: Option<&str>) {
    let target = match target {
        Some("~") | None => dirs::home_dir(),
        Some(it) => Some(PathBuf::from(it)),
    };
    let Some(target) = target else {
        eprintln!("cd: no home directory");
        return;
    };
    if let Err(error) = std::env::set_current_dir(&target) {
        eprintln!("cd: {}: {error}", target.display());
    }
}

fn print_notices(notices: &mut UnboundedReceiver<JobNotice>) {
    while let Ok(notice) = notices.try_recv() {
        match notice {
            JobNotice::Output(text) => print!("{text}"),
            JobNotice::RenderPrompt => print_prompt(),
        }
    }
    let _unused = std::io::stdout().flush();
}

fn print_prompt() {
    print!("{PROMPT}");
    let _unused = std::io::stdout().flush();
}

mod clap_config {
    use std::path::PathBuf;

    use clap::{Args, Parser, Subcommand};

    /// More info: <https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_2/index.html>
    #[derive(Debug, Parser)]
    #[command(bin_name = "lush")]
    #[command(about = "🐚 A shell that knows what you typed")]
    #[command(version)]
    #[command(next_line_help = true)]
    #[command(arg_required_else_help(true))]
    /// More info: <https://docs.rs/clap/latest/clap/struct.Command.html#method.help_template>
    #[command(
        help_template = "{about}\nVersion: {bin} {version} 💻\n\nUSAGE 📓:\n  lush [\x1b[32mCommand\x1b[0m] [\x1b[34mOptions\x1b[0m]\n\n{all-args}\n",
        subcommand_help_heading("Command")
    )]
    pub struct CLIArg {
        #[command(subcommand)]
        pub command: CLICommand,

        #[command(flatten)]
        pub global_options: GlobalOption,
    }

    #[derive(Debug, Args)]
    pub struct GlobalOption {
        #[arg(
            global = true,
            long,
            short = 'l',
            help = "Log app output to a file named `log.txt` for debugging"
        )]
        pub enable_logging: bool,

        #[arg(
            global = true,
            long,
            value_name = "PATH",
            help = "Shell config (JSON) to use instead of `lush.json` in the config folder"
        )]
        pub config: Option<PathBuf>,

        #[arg(
            global = true,
            long,
            value_name = "NAME",
            help = "Mode whose token types are used, defaults to `editor.default_mode`"
        )]
        pub mode: Option<String>,
    }

    #[derive(Debug, Subcommand)]
    pub enum CLICommand {
        #[clap(about = "✅ Load the shell config and print the token types of every mode")]
        CheckConfig,

        #[clap(about = "🧩 Tokenize some text and print the typed tokens")]
        Tokenize {
            text: String,

            #[arg(long, help = "Rotate the type of every word once")]
            rotate: bool,
        },

        #[clap(about = "💡 Print the completions of a prefix")]
        Complete {
            #[arg(default_value = "")]
            prefix: String,
        },

        #[clap(about = "🐚 Read commands from stdin and run them w/ job control")]
        Run,
    }
}
