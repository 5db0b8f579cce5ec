//! Line-oriented front-end driving a [`Session`].
//!
//! One action per line; blank lines and `#` comments are skipped. Every
//! failure is reported once and the loop carries on.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use mandelscope_core::{ColorTheme, PixelPoint};
use mandelscope_engine::{EngineError, PersistenceError, PngExporter, Session};

use crate::app_dir::{resolve, with_session_extension};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Reset,
    Pan(PixelPoint, PixelPoint),
    Zoom(PixelPoint, PixelPoint),
    Theme(ColorTheme),
    Cycle,
    Iterations(u32),
    Undo,
    Redo,
    Overlay,
    Save(PathBuf),
    Load(PathBuf),
    Export(PathBuf),
    Info,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("'{action}' expects {expected}")]
    WrongArguments {
        action: &'static str,
        expected: &'static str,
    },
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error(transparent)]
    Theme(#[from] mandelscope_core::CoreError),
}

fn args<'a>(
    action: &'static str,
    expected: &'static str,
    count: usize,
    rest: &[&'a str],
) -> Result<Vec<&'a str>, ParseError> {
    if rest.len() == count {
        Ok(rest.to_vec())
    } else {
        Err(ParseError::WrongArguments { action, expected })
    }
}

fn number<T: std::str::FromStr>(raw: &str) -> Result<T, ParseError> {
    raw.parse()
        .map_err(|_| ParseError::InvalidNumber(raw.to_string()))
}

fn points(
    action: &'static str,
    rest: &[&str],
) -> Result<(PixelPoint, PixelPoint), ParseError> {
    let a = args(action, "x1 y1 x2 y2", 4, rest)?;
    let press = PixelPoint::new(number(a[0])?, number(a[1])?);
    let release = PixelPoint::new(number(a[2])?, number(a[3])?);
    Ok((press, release))
}

/// Parse one input line. `Ok(None)` for blank lines and comments.
pub fn parse_action(line: &str) -> Result<Option<Action>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    let (name, rest) = (words[0], &words[1..]);
    let action = match name.to_ascii_lowercase().as_str() {
        "reset" => Action::Reset,
        "pan" => {
            let (press, release) = points("pan", rest)?;
            Action::Pan(press, release)
        }
        "zoom" => {
            let (press, release) = points("zoom", rest)?;
            Action::Zoom(press, release)
        }
        "theme" => Action::Theme(args("theme", "a theme name", 1, rest)?[0].parse()?),
        "cycle" => Action::Cycle,
        "iterations" => Action::Iterations(number(args("iterations", "a count", 1, rest)?[0])?),
        "undo" => Action::Undo,
        "redo" => Action::Redo,
        "overlay" => Action::Overlay,
        "save" => Action::Save(args("save", "a path", 1, rest)?[0].into()),
        "load" => Action::Load(args("load", "a path", 1, rest)?[0].into()),
        "export" => Action::Export(args("export", "a path", 1, rest)?[0].into()),
        "info" => Action::Info,
        "quit" | "exit" => Action::Quit,
        _ => return Err(ParseError::UnknownAction(name.to_string())),
    };
    Ok(Some(action))
}

fn describe(e: &EngineError) -> String {
    match e {
        EngineError::Persistence(p) => p.user_message().to_string(),
        other => other.to_string(),
    }
}

pub struct Console {
    session: Session,
    sessions_dir: PathBuf,
    export_dir: PathBuf,
    log_timings: bool,
}

impl Console {
    pub fn new(session: Session, sessions_dir: PathBuf, export_dir: PathBuf) -> Self {
        Self {
            session,
            sessions_dir,
            export_dir,
            log_timings: false,
        }
    }

    pub fn with_timings(mut self, enabled: bool) -> Self {
        self.log_timings = enabled;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read actions until end of input or `quit`, writing one response line
    /// per action to `out`.
    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let action = match parse_action(&line) {
                Ok(Some(action)) => action,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Could not parse '{line}': {e}");
                    writeln!(out, "error: {e}")?;
                    continue;
                }
            };
            if action == Action::Quit {
                info!("Quit requested");
                break;
            }
            let start = Instant::now();
            let reply = match self.execute(action) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Action failed: {e}");
                    format!("error: {}", describe(&e))
                }
            };
            if self.log_timings {
                info!(elapsed_ms = start.elapsed().as_millis(), "{}", line.trim());
            }
            writeln!(out, "{reply}")?;
        }
        out.flush()
    }

    /// Run one action and describe the outcome.
    pub fn execute(&mut self, action: Action) -> mandelscope_engine::Result<String> {
        debug!(?action, "Executing");
        let s = &mut self.session;
        let message = match action {
            Action::Reset => {
                s.reset_to_defaults()?;
                "reset to defaults".to_string()
            }
            Action::Pan(press, release) => changed(s.pan_by(press, release)?, "panned"),
            Action::Zoom(press, release) => changed(s.zoom_to(press, release)?, "zoomed"),
            Action::Theme(theme) => changed(s.set_color_theme(theme)?, &format!("theme {theme}")),
            Action::Cycle => format!("theme {}", s.cycle_color_theme()?),
            Action::Iterations(n) => {
                changed(s.set_max_iterations(n)?, &format!("max iterations {n}"))
            }
            Action::Undo => match s.undo()? {
                Some(command) => format!("undid {}", command.label()),
                None => "nothing to undo".to_string(),
            },
            Action::Redo => match s.redo()? {
                Some(command) => format!("redid {}", command.label()),
                None => "nothing to redo".to_string(),
            },
            Action::Overlay => {
                if s.toggle_overlay()? {
                    s.current_viewport().magnification_label()
                } else {
                    "overlay hidden".to_string()
                }
            }
            Action::Save(raw) => {
                let path = with_session_extension(resolve(&self.sessions_dir, &raw));
                create_parent(&path).map_err(PersistenceError::from)?;
                s.save_to(&path)?;
                format!("saved {}", path.display())
            }
            Action::Load(raw) => {
                let path = resolve(&self.sessions_dir, &raw);
                s.load_from(&path)?;
                format!("loaded {}", path.display())
            }
            Action::Export(raw) => {
                let path = resolve(&self.export_dir, &raw);
                create_parent(&path).map_err(|e| EngineError::Export {
                    reason: e.to_string(),
                })?;
                s.present(&mut PngExporter::new(&path))?;
                format!("exported {}", path.display())
            }
            Action::Info => info_text(s),
            Action::Quit => "bye".to_string(),
        };
        Ok(message)
    }
}

fn changed(did: bool, what: &str) -> String {
    if did {
        what.to_string()
    } else {
        "no change".to_string()
    }
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => std::fs::create_dir_all(parent),
        None => Ok(()),
    }
}

fn info_text(s: &Session) -> String {
    let vp = s.current_viewport();
    format!(
        "bounds {} | iterations {} | radius² {} | theme {} | magnification {}x | overlay {} | undo {} redo {}",
        vp.bounds(),
        vp.max_iterations(),
        vp.radius_squared(),
        vp.color_theme(),
        vp.magnification(),
        if s.overlay_visible() { "on" } else { "off" },
        s.history().undo_depth(),
        s.history().redo_depth(),
    )
}
