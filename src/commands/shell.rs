//! Interactive shell
//!
//! A readline loop over one [`App`]. The HTTP client's cookie store lives
//! as long as the shell, so a login holds for every later command.

use std::borrow::Cow;
use std::path::PathBuf;

use colored::Colorize;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{ColorMode, Config, DefaultEditor, Editor, Helper};

use crate::commands::shell_commands::{parse_shell_command, print_help, ShellCommand};
use crate::config::DisplayConfig;
use crate::error::Result;
use crate::render;
use crate::state::{App, SelectOutcome};

/// Text to print after a command, and whether the shell should stop
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub text: String,
    pub exit: bool,
}

impl ShellOutput {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exit: false,
        }
    }

    fn error(message: &str) -> Self {
        Self::text(render::render_errors(&[message]))
    }
}

const NO_SELECTION: &str = "No dataset selected. Use 'select <id>' first";

/// Run the interactive shell until `exit`, Ctrl-C or Ctrl-D
pub async fn run_shell(mut app: App, display: &DisplayConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    app.start().await;
    println!("{}", "Chemical Equipment Visualizer".bold());
    println!("{}", render::render_identity(app.identity()));
    if app.identity().is_some() {
        println!("{}", render::render_datasets(app.registry.datasets()));
    }
    println!("Type 'help' for commands.\n");

    loop {
        let prompt = match app.identity() {
            Some(identity) => format!("chemviz({})> ", identity.username.green()),
            None => "chemviz> ".to_string(),
        };
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                let command = match parse_shell_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}\n", e);
                        continue;
                    }
                };

                match command {
                    ShellCommand::Login => {
                        if !prompt_credentials(&mut rl, &mut app, false)? {
                            continue;
                        }
                    }
                    ShellCommand::Register => {
                        if !prompt_credentials(&mut rl, &mut app, true)? {
                            continue;
                        }
                    }
                    ShellCommand::Help => {
                        print_help();
                        continue;
                    }
                    _ => {}
                }

                let output = execute(&mut app, command, display.chart_width).await;
                if !output.text.is_empty() {
                    println!("{}\n", output.text);
                }
                if output.exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Fill the session's credential form from the terminal
///
/// Returns `false` when the user aborted with Ctrl-C or Ctrl-D.
fn prompt_credentials(rl: &mut DefaultEditor, app: &mut App, register: bool) -> Result<bool> {
    app.session.form.clear();
    let fields: &[&str] = if register {
        &["Username", "Email", "Password"]
    } else {
        &["Username", "Password"]
    };
    for field in fields {
        let prompt = format!("{}: ", field);
        let line = if *field == "Password" {
            read_masked(&prompt)
        } else {
            rl.readline(&prompt)
        };
        let value = match line {
            Ok(value) => value.trim().to_string(),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                app.session.form.clear();
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        match *field {
            "Username" => app.session.form.username = value,
            "Email" => app.session.form.email = value,
            _ => app.session.form.password = value,
        }
    }
    Ok(true)
}

/// Line helper that echoes every typed character as `*`
#[derive(Debug, Default)]
struct MaskedInput;

impl Highlighter for MaskedInput {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned("*".repeat(line.chars().count()))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Completer for MaskedInput {
    type Candidate = String;
}

impl Hinter for MaskedInput {
    type Hint = String;
}

impl Validator for MaskedInput {}

impl Helper for MaskedInput {}

/// Read one line without echoing it; kept out of history
fn read_masked(prompt: &str) -> rustyline::Result<String> {
    let config = Config::builder()
        .color_mode(ColorMode::Forced)
        .auto_add_history(false)
        .build();
    let mut editor: Editor<MaskedInput, DefaultHistory> = Editor::with_config(config)?;
    editor.set_helper(Some(MaskedInput));
    editor.readline(prompt)
}

fn analysis(app: &App, width: usize) -> String {
    match app.selected() {
        Some(detail) => render::render_analysis(detail, &app.charts(), width),
        None => NO_SELECTION.to_string(),
    }
}

/// Apply one parsed command to the app
///
/// `Login` and `Register` submit whatever is already in `session.form`.
pub async fn execute(app: &mut App, command: ShellCommand, width: usize) -> ShellOutput {
    match command {
        ShellCommand::Login | ShellCommand::Register => {
            let ok = if command == ShellCommand::Login {
                app.submit_login().await
            } else {
                app.submit_register().await
            };
            if !ok {
                return ShellOutput::error(app.session.error().unwrap_or_default());
            }
            app.refresh().await;
            ShellOutput::text(format!(
                "{}\n{}",
                render::render_identity(app.identity()),
                render::render_datasets(app.registry.datasets())
            ))
        }
        ShellCommand::Logout => {
            app.logout().await;
            match app.session.error() {
                Some(message) => ShellOutput::error(message),
                None => ShellOutput::text("Logged out"),
            }
        }
        ShellCommand::Whoami => ShellOutput::text(render::render_identity(app.identity())),
        ShellCommand::Datasets => {
            app.refresh().await;
            let mut text = render::render_datasets(app.registry.datasets());
            if let Some(message) = app.registry.error() {
                text = format!("{}\n{}", render::render_errors(&[message]), text);
            }
            ShellOutput::text(text)
        }
        ShellCommand::Select(id) => match app.select(id).await {
            SelectOutcome::Applied => ShellOutput::text(analysis(app, width)),
            SelectOutcome::Failed => {
                ShellOutput::error(app.selection.error().unwrap_or_default())
            }
            SelectOutcome::Stale => ShellOutput::default(),
        },
        ShellCommand::File(path) => select_file(app, path),
        ShellCommand::Upload(path) => {
            if let Some(path) = path {
                let selected = select_file(app, path);
                if app.upload.file().is_none() {
                    return selected;
                }
            }
            match app.upload().await {
                Some(id) => ShellOutput::text(format!(
                    "Uploaded dataset {}\n{}",
                    id,
                    analysis(app, width)
                )),
                None => ShellOutput::error(app.upload.error().unwrap_or_default()),
            }
        }
        ShellCommand::Report(id) => {
            let Some(id) = id.or_else(|| app.selection.selected_id()) else {
                return ShellOutput::error(NO_SELECTION);
            };
            match app.request_report(id).await {
                Some(path) => ShellOutput::text(format!("Saved report to {}", path.display())),
                None => ShellOutput::error(app.selection.report_error().unwrap_or_default()),
            }
        }
        ShellCommand::Show => ShellOutput::text(analysis(app, width)),
        ShellCommand::Charts => ShellOutput::text(match app.selected() {
            Some(_) => render::render_charts(&app.charts(), width),
            None => NO_SELECTION.to_string(),
        }),
        ShellCommand::Table => ShellOutput::text(match app.selected() {
            Some(detail) => render::render_equipment(&detail.equipment),
            None => NO_SELECTION.to_string(),
        }),
        ShellCommand::Help => ShellOutput::default(),
        ShellCommand::Exit => ShellOutput {
            text: String::new(),
            exit: true,
        },
    }
}

fn select_file(app: &mut App, path: PathBuf) -> ShellOutput {
    if app.select_file(&path) {
        ShellOutput::text(format!("Selected {}", path.display()))
    } else {
        ShellOutput::error("An upload is already in progress")
    }
}
