extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;
use crate::mach::{Listing, Scope, Val};
use crate::{error, lang::Error, lang::Type};
use ansi_term::Style;
use linefeed::{Completer, Completion, Interface, Prompter, ReadResult, Terminal};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_UNIT: &str = "main";
const FRAME: Duration = Duration::from_millis(16);

const COMMANDS: [&str; 12] = [
    ":load", ":save", ":new", ":run", ":list", ":vars", ":scripts", ":exports", ":animate",
    ":remove", ":help", ":quit",
];

const HELP: &str = "\
:load NAME FILE   load a script from a file
:save NAME FILE   save a script to a file
:new NAME         edit a script; following lines are appended to it
:run NAME         run a script
:list NAME        show the compiled code of a script
:vars NAME        show the variables of a script
:scripts          show every script and its state
:exports NAME     show the shared variables a script declares
:animate NAME     run a script every frame until ctrl-c
:remove NAME      delete a script
:quit             leave";

pub fn main() {
    let filter = EnvFilter::try_from_env("SCENE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");
    let files: Vec<String> = std::env::args().skip(1).collect();
    if let Err(error) = main_loop(interrupted, &files) {
        eprintln!("{}", error);
    }
}

/// A scope with the host globals a renderer provides.
pub fn host_scope() -> Scope {
    let mut scope = Scope::new();
    scope.add_shared("camera", Type::Matrix);
    scope.add_shared("projection", Type::Matrix);
    scope.add_shared("time", Type::Integer);
    scope
}

struct Session {
    scope: Scope,
    editing: String,
    interrupted: Arc<AtomicBool>,
}

fn main_loop(interrupted: Arc<AtomicBool>, files: &[String]) -> std::io::Result<()> {
    let mut session = Session {
        scope: host_scope(),
        editing: DEFAULT_UNIT.to_string(),
        interrupted,
    };
    let command = Interface::new("scene")?;
    for file in files {
        let name = unit_name(file);
        match read(file) {
            Ok(source) => {
                let _ = session.scope.set_source(&name, &source);
            }
            Err(error) => print_error(&command, &error)?,
        }
    }
    for (name, error) in session.scope.recompile_all() {
        command.write_fmt(format_args!("{}:\n", name))?;
        print_source_error(&command, &session.scope, &name, &error)?;
    }

    loop {
        command.set_prompt(&format!("{}> ", session.editing))?;
        let source = session
            .scope
            .unit(&session.editing)
            .map(|u| u.source().to_string())
            .unwrap_or_default();
        let words = session
            .scope
            .complete(&session.editing, &source, source.len())
            .candidates;
        command.set_completer(Arc::new(WordCompleter::new(words)));
        let string = match command.read_line()? {
            ReadResult::Input(string) => string,
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        let line = string.trim();
        if line.is_empty() {
            continue;
        }
        command.add_history_unique(string.clone());
        if line.starts_with(':') {
            if !session.command(&command, line)? {
                break;
            }
        } else {
            session.append(&command, &string)?;
        }
    }
    Ok(())
}

impl Session {
    /// Returns false when the session should end.
    fn command<T: Terminal>(&mut self, out: &Interface<T>, line: &str) -> std::io::Result<bool> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();
        let name = args.first().copied().unwrap_or(self.editing.as_str()).to_string();
        match verb {
            ":quit" => return Ok(false),
            ":help" => out.write_fmt(format_args!("{}\n", HELP))?,
            ":load" => match args.as_slice() {
                [name, file] => match read(file) {
                    Ok(source) => {
                        if let Err(error) = self.scope.set_source(name, &source) {
                            print_source_error(out, &self.scope, name, &error)?;
                        }
                    }
                    Err(error) => print_error(out, &error)?,
                },
                _ => print_error(out, &error!(Expected, "NAME FILE"))?,
            },
            ":save" => match args.as_slice() {
                [name, file] => {
                    let source = self.scope.unit(name).map(|u| u.source().to_string());
                    let result = match source {
                        Some(source) => write(file, &source),
                        None => Err(error!(ScriptNotFound, name)),
                    };
                    if let Err(error) = result {
                        print_error(out, &error)?;
                    }
                }
                _ => print_error(out, &error!(Expected, "NAME FILE"))?,
            },
            ":new" => {
                if self.scope.unit(&name).is_none() {
                    if let Err(error) = self.scope.set_source(&name, "") {
                        print_error(out, &error)?;
                    }
                }
                self.editing = name;
            }
            ":run" => {
                if let Err(error) = self.scope.run(&name) {
                    print_source_error(out, &self.scope, &name, &error)?;
                }
            }
            ":animate" => self.animate(out, &name)?,
            ":list" => match self.scope.unit(&name).and_then(|u| u.program()) {
                Some(program) => out.write_fmt(format_args!("{}", Listing::new(program)))?,
                None => print_error(out, &error!(ScriptNotFound, &name))?,
            },
            ":vars" => {
                for (var, val) in self.scope.values(&name) {
                    out.write_fmt(format_args!("{} = {}\n", var, val))?;
                }
            }
            ":exports" => {
                for (var, ty) in self.scope.exports(&name) {
                    out.write_fmt(format_args!("{} {}\n", ty, var))?;
                }
            }
            ":scripts" => {
                let names: Vec<_> = self.scope.names().cloned().collect();
                for name in names {
                    let state = match self.scope.unit(&name) {
                        Some(u) if u.error().is_some() => "error",
                        Some(u) if u.is_stale() => "stale",
                        Some(u) if u.program().is_some() => "ok",
                        _ => "empty",
                    };
                    out.write_fmt(format_args!("{:<16} {}\n", name, state))?;
                }
            }
            ":remove" => {
                if !self.scope.remove(&name) {
                    print_error(out, &error!(ScriptNotFound, &name))?;
                }
            }
            _ => print_error(out, &error!(Unexpected, verb; "try :help"))?,
        }
        Ok(true)
    }

    /// Appends a line to the script being edited and recompiles it.
    fn append<T: Terminal>(&mut self, out: &Interface<T>, line: &str) -> std::io::Result<()> {
        let mut source = self
            .scope
            .unit(&self.editing)
            .map(|u| u.source().to_string())
            .unwrap_or_default();
        source.push_str(line);
        source.push('\n');
        let name = self.editing.clone();
        if let Err(error) = self.scope.set_source(&name, &source) {
            print_source_error(out, &self.scope, &name, &error)?;
        }
        Ok(())
    }

    fn animate<T: Terminal>(&mut self, out: &Interface<T>, name: &str) -> std::io::Result<()> {
        self.interrupted.store(false, Ordering::SeqCst);
        let start = chrono::Local::now();
        let mut frames: u64 = 0;
        while !self.interrupted.load(Ordering::SeqCst) {
            let elapsed = (chrono::Local::now() - start).num_milliseconds();
            if let Err(error) = self.scope.set_shared("", "time", Val::Integer(elapsed as i32)) {
                print_error(out, &error)?;
                break;
            }
            if let Err(error) = self.scope.run(name) {
                print_source_error(out, &self.scope, name, &error)?;
                break;
            }
            frames += 1;
            std::thread::sleep(FRAME);
        }
        self.interrupted.store(false, Ordering::SeqCst);
        debug!(script = name, frames, "animation stopped");
        out.write_fmt(format_args!("{} frames\n", frames))?;
        Ok(())
    }
}

struct WordCompleter {
    words: Vec<String>,
}

impl WordCompleter {
    fn new(words: Vec<String>) -> WordCompleter {
        WordCompleter { words }
    }
}

impl<Term: Terminal> Completer<Term> for WordCompleter {
    fn complete(
        &self,
        word: &str,
        prompter: &Prompter<Term>,
        start: usize,
        _end: usize,
    ) -> Option<Vec<Completion>> {
        let candidates: Vec<&str> = if start == 0 && prompter.buffer().starts_with(':') {
            COMMANDS.iter().copied().filter(|c| c.starts_with(word)).collect()
        } else {
            self.words
                .iter()
                .map(String::as_str)
                .filter(|w| w.starts_with(word))
                .collect()
        };
        if candidates.is_empty() {
            None
        } else {
            Some(
                candidates
                    .into_iter()
                    .map(|c| Completion::simple(c.to_string()))
                    .collect(),
            )
        }
    }
}

fn print_error<T: Terminal>(out: &Interface<T>, error: &Error) -> std::io::Result<()> {
    out.write_fmt(format_args!("{}\n", Style::new().bold().paint(error.to_string())))
}

/// Prints an error followed by the offending source line with the error
/// column underlined.
fn print_source_error<T: Terminal>(
    out: &Interface<T>,
    scope: &Scope,
    name: &str,
    error: &Error,
) -> std::io::Result<()> {
    print_error(out, error)?;
    let position = match error.position() {
        Some(position) => position,
        None => return Ok(()),
    };
    let source = match scope.unit(name) {
        Some(unit) => unit.source(),
        None => return Ok(()),
    };
    if let Some(line) = source.lines().nth(position.row.saturating_sub(1)) {
        let col = position.col.saturating_sub(1);
        let len = position.len.max(1);
        out.write_fmt(format_args!("{}\n", decorate(line, &[col..col + len])))?;
    }
    Ok(())
}

fn decorate(ins: &str, columns: &[std::ops::Range<usize>]) -> String {
    let mut under_on = false;
    let mut out = String::new();
    let style = Style::new().underline();
    let prefix = format!("{}", style.prefix());
    let suffix = format!("{}", style.suffix());
    let mut index = 0;
    for char in ins.chars() {
        let do_under = columns.iter().any(|c| c.contains(&index));
        if under_on {
            if !do_under {
                out.push_str(&suffix);
            }
        } else if do_under {
            out.push_str(&prefix);
        }
        under_on = do_under;
        out.push(char);
        index += 1;
    }
    if columns.iter().any(|c| c.start == index) {
        under_on = true;
        out.push_str(&prefix);
        out.push(' ');
    }
    if under_on {
        out.push_str(&suffix);
    }
    out
}

/// Units loaded from files are named after the file stem.
pub fn unit_name(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string())
}

fn read(filename: &str) -> Result<String, Error> {
    match fs::read_to_string(filename) {
        Ok(source) => Ok(source),
        Err(error) => {
            let msg = error.to_string();
            match error.kind() {
                ErrorKind::NotFound => Err(error!(ScriptNotFound, filename; &msg)),
                _ => Err(error!(InternalError; &msg)),
            }
        }
    }
}

fn write(filename: &str, source: &str) -> Result<(), Error> {
    match fs::write(filename, source) {
        Ok(()) => Ok(()),
        Err(error) => Err(error!(InternalError; &error.to_string())),
    }
}
