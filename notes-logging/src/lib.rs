//! Process-wide tracing setup for the component host.
//!
//! Everything is driven by environment variables so the host app, the CLI and
//! the tests share one configuration surface:
//!
//! - `LOG_LEVEL`: default filter directive when `RUST_LOG` is unset (`info`)
//! - `LOG_OUTPUT`: `console`, `file`, `both` or `none` (`console`)
//! - `LOG_FORMAT`: `human` or `json` (`human`)
//! - `LOG_FILE_PATH`: file used for the daily rolling appender

use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::MakeWriter, prelude::*, registry, EnvFilter};

const DEFAULT_LOG_FILE: &str = "notes-components.log";

// --- Custom "Tee" Writer ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A, B> Write for Tee<A, B>
where
    A: Write,
    B: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write(buf);
        let res_b = self.b.write(buf);
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B, W1, W2> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a, Writer = W1>,
    B: MakeWriter<'a, Writer = W2>,
    W1: Write + 'a,
    W2: Write + 'a,
{
    type Writer = Tee<W1, W2>;
    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

/// Where formatted log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    None,
}

impl LogOutput {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => LogOutput::File,
            "both" => LogOutput::Both,
            "none" | "off" => LogOutput::None,
            _ => LogOutput::Console,
        }
    }

    fn console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub output: LogOutput,
    pub json: bool,
    pub file_path: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Console,
            json: false,
            file_path: env::temp_dir().join(DEFAULT_LOG_FILE),
        }
    }
}

impl LogSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            level: lookup("LOG_LEVEL").unwrap_or(defaults.level),
            output: lookup("LOG_OUTPUT")
                .map(|v| LogOutput::parse(&v))
                .unwrap_or(defaults.output),
            json: lookup("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.json),
            file_path: lookup("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.file_path),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        for directive in ["tokio=warn", "hyper=warn", "reqwest=warn"] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    }
}

/// Initializes the global tracing subscriber from the environment.
///
/// Returns the appender guard when file output is enabled; dropping it flushes
/// and stops the background writer, so callers keep it alive for the process
/// lifetime.
pub fn init_subscriber() -> Option<WorkerGuard> {
    init_with(&LogSettings::from_env())
}

/// Initializes the global tracing subscriber with explicit settings.
pub fn init_with(settings: &LogSettings) -> Option<WorkerGuard> {
    let subscriber = registry().with(settings.env_filter());

    let log_dir = settings
        .file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let log_filename = settings
        .file_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.into());

    let output = settings.output;
    let mut guard: Option<WorkerGuard> = None;

    if output.console() && output.file() {
        let file_appender = tracing_appender::rolling::daily(&log_dir, &log_filename);
        let (non_blocking, worker) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker);

        let tee_writer = MakeTee {
            make_a: std::io::stdout,
            make_b: non_blocking,
        };
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(tee_writer);
        if settings.json {
            let _ = subscriber.with(fmt_layer.json()).try_init();
        } else {
            let _ = subscriber.with(fmt_layer).try_init();
        }
    } else if output.console() {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);
        if settings.json {
            let _ = subscriber.with(fmt_layer.json()).try_init();
        } else {
            let _ = subscriber.with(fmt_layer).try_init();
        }
    } else if output.file() {
        let file_appender = tracing_appender::rolling::daily(&log_dir, &log_filename);
        let (non_blocking, worker) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker);

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking);
        if settings.json {
            let _ = subscriber.with(fmt_layer.json()).try_init();
        } else {
            let _ = subscriber.with(fmt_layer).try_init();
        }
    } else {
        let _ = subscriber.try_init();
    }

    guard
}
