//! Terminal view: a rustyline REPL over a [`ConversationController`].
//!
//! The view only reads session state and forwards user actions; every state
//! change goes through the controller.

use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use mealplan_chat::{ConversationController, RecipeBackend};
use mealplan_core::types::{Role, SurveyQuestion};

const COMMANDS: [&str; 3] = ["/skip", "/help", "/quit"];

// =============================================================================
// Commands
// =============================================================================

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Skip,
    Unknown(String),
    Input(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "" => Command::Empty,
            "/quit" | "/exit" => Command::Quit,
            "/help" => Command::Help,
            "/skip" => Command::Skip,
            s if s.starts_with('/') => Command::Unknown(s.to_string()),
            s => Command::Input(s.to_string()),
        }
    }
}

/// Map option numbers typed by the user to option values.
///
/// Numbers are 1-based and separated by spaces or commas.
pub fn parse_selection(question: &SurveyQuestion, input: &str) -> Result<Vec<String>, String> {
    let mut values = Vec::new();
    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let number: usize = token
            .parse()
            .map_err(|_| format!("'{token}' is not an option number."))?;
        let value = question
            .option_value_at(number)
            .ok_or_else(|| format!("There is no option {number}."))?;
        values.push(value.to_string());
    }

    if values.is_empty() {
        return Err("Pick at least one option by number.".to_string());
    }
    Ok(values)
}

// =============================================================================
// Readline helper
// =============================================================================

/// Completion, highlighting and hints for slash commands.
#[derive(Clone)]
struct CommandHelper {
    commands: Vec<String>,
}

impl CommandHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CommandHelper {}

// =============================================================================
// TerminalView
// =============================================================================

pub struct TerminalView {
    editor: Editor<CommandHelper, DefaultHistory>,
    /// Transcript messages already printed.
    shown: usize,
}

impl TerminalView {
    pub fn new() -> rustyline::Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(CommandHelper::new()));
        Ok(Self { editor, shown: 0 })
    }

    /// Run the REPL until `/quit` or end of input.
    pub async fn run<B>(
        &mut self,
        controller: &mut ConversationController,
        backend: &B,
    ) -> rustyline::Result<()>
    where
        B: RecipeBackend + ?Sized,
    {
        println!("{}", "=== Meal Planner ===".bright_magenta().bold());
        print_help();
        println!();

        loop {
            self.flush(controller);

            let prompt = if controller.state().survey().is_active() {
                "answer> "
            } else {
                "you> "
            };

            let line = match self.editor.readline(prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                Err(err) => return Err(err),
            };

            let command = Command::parse(&line);
            if !matches!(command, Command::Empty) {
                let _ = self.editor.add_history_entry(line.as_str());
            }

            match command {
                Command::Empty => {}
                Command::Quit => {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                Command::Help => print_help(),
                Command::Skip => {
                    if !controller.skip_survey() {
                        println!("{}", "There is no survey to skip.".bright_black());
                    }
                }
                Command::Unknown(cmd) => {
                    println!("{}", format!("Unknown command: {cmd}").bright_black());
                }
                Command::Input(text) => {
                    let selection = controller
                        .state()
                        .survey()
                        .current_question()
                        .map(|question| parse_selection(question, &text));

                    let request = match selection {
                        Some(Ok(values)) => {
                            controller.select_options(values);
                            controller.submit_survey()
                        }
                        Some(Err(hint)) => {
                            println!("{}", hint.yellow());
                            continue;
                        }
                        None => controller.submit_text(&text),
                    };

                    if let Some(request) = request {
                        self.flush(controller);
                        if let Some(placeholder) = controller.placeholder() {
                            println!("{}", placeholder.bright_black().italic());
                        }
                        controller.dispatch(backend, request).await;
                    }
                }
            }
        }

        Ok(())
    }

    /// Print transcript messages not shown yet. A new survey prompt is
    /// followed by its numbered options.
    fn flush(&mut self, controller: &ConversationController) {
        let state = controller.state();
        let messages = state.transcript().messages();
        if self.shown >= messages.len() {
            return;
        }

        for message in &messages[self.shown..] {
            match message.role {
                Role::User => println!("{}", format!("> {}", message.content).green()),
                Role::Bot => {
                    for line in message.content.lines() {
                        println!("{}", line.bright_blue());
                    }
                }
            }
        }
        self.shown = messages.len();

        if let Some(question) = state.survey().current_question() {
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}", format!("{}. {}", i + 1, option.label).cyan());
            }
            println!(
                "{}",
                "Answer with option numbers, e.g. 1 3, or /skip.".bright_black()
            );
        }
        println!();
    }
}

fn print_help() {
    println!(
        "{}",
        "Answer survey questions with option numbers. Afterwards, ask for recipe ideas \
         or for a specific recipe (\"how do I make ...\")."
            .bright_black()
    );
    println!(
        "{}",
        "Commands: /skip (skip the survey), /help, /quit (or Ctrl-D).".bright_black()
    );
}
