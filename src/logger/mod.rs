use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, LazyLock, Mutex, RwLock, Weak};

static GLOBAL_LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static INSTANCES: LazyLock<Mutex<Vec<Weak<LoggerInner>>>> =
    LazyLock::new(|| Mutex::new(Vec::new()));

type SharedLogHandler = Arc<dyn Fn(&Logger, LogLevel, &str) + Send + Sync + 'static>;

/// Named, leveled diagnostic channel with a swappable handler.
///
/// The guard layer writes its warnings and rejection notices here instead of
/// to a global console stream, so callers (and tests) can capture everything
/// that was emitted by installing their own handler.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    pub fn new(name: impl Into<String>) -> Self {
        let inner = Arc::new(LoggerInner::new(name.into()));
        track_instance(&inner);
        Self { inner }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_u8(self.inner.log_level.load(Ordering::SeqCst))
    }

    pub fn set_log_level<L>(&self, level: L) -> Result<(), LogError>
    where
        L: IntoLogLevel,
    {
        let level = level.into_log_level()?;
        self.inner.log_level.store(level as u8, Ordering::SeqCst);
        Ok(())
    }

    pub fn log_handler(&self) -> SharedLogHandler {
        self.inner.log_handler.read().unwrap().clone()
    }

    pub fn set_log_handler<F>(&self, handler: F)
    where
        F: Fn(&Logger, LogLevel, &str) + Send + Sync + 'static,
    {
        *self.inner.log_handler.write().unwrap() = Arc::new(handler);
    }

    pub fn reset_log_handler(&self) {
        *self.inner.log_handler.write().unwrap() = default_log_handler_arc();
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.dispatch(LogLevel::Debug, message.as_ref());
    }

    pub fn log(&self, message: impl AsRef<str>) {
        self.dispatch(LogLevel::Verbose, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.dispatch(LogLevel::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.dispatch(LogLevel::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.dispatch(LogLevel::Error, message.as_ref());
    }

    fn dispatch(&self, level: LogLevel, message: &str) {
        (self.log_handler())(self, level, message);
    }

    fn from_inner(inner: Arc<LoggerInner>) -> Self {
        Self { inner }
    }
}

struct LoggerInner {
    name: String,
    log_level: AtomicU8,
    log_handler: RwLock<SharedLogHandler>,
}

impl LoggerInner {
    fn new(name: String) -> Self {
        let level = GLOBAL_LOG_LEVEL.load(Ordering::SeqCst);
        Self {
            name,
            log_level: AtomicU8::new(level),
            log_handler: RwLock::new(default_log_handler_arc()),
        }
    }
}

fn track_instance(inner: &Arc<LoggerInner>) {
    INSTANCES.lock().unwrap().push(Arc::downgrade(inner));
}

fn default_log_handler_arc() -> SharedLogHandler {
    Arc::new(default_log_handler)
}

fn default_log_handler(logger: &Logger, level: LogLevel, message: &str) {
    if level < logger.log_level() || level == LogLevel::Silent {
        return;
    }

    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let header = format!("[{}]  {}:", now, logger.name());

    match level {
        LogLevel::Warn | LogLevel::Error => eprintln!("{header} {message}"),
        _ => println!("{header} {message}"),
    }
}

fn with_instances<F>(mut f: F)
where
    F: FnMut(Logger),
{
    let mut instances = INSTANCES.lock().unwrap();
    let mut i = 0;
    while i < instances.len() {
        match instances[i].upgrade() {
            Some(inner) => {
                f(Logger::from_inner(inner));
                i += 1;
            }
            None => {
                instances.swap_remove(i);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Verbose = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Silent = 5,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Verbose => "verbose",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Silent => "silent",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Debug,
            1 => LogLevel::Verbose,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Silent,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Verbose => "VERBOSE",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Silent => "SILENT",
        };
        f.write_str(label)
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "verbose" => Ok(LogLevel::Verbose),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "silent" => Ok(LogLevel::Silent),
            other => Err(LogError::InvalidLogLevel(other.to_string())),
        }
    }
}

pub trait IntoLogLevel {
    fn into_log_level(self) -> Result<LogLevel, LogError>;
}

impl IntoLogLevel for LogLevel {
    fn into_log_level(self) -> Result<LogLevel, LogError> {
        Ok(self)
    }
}

impl IntoLogLevel for &str {
    fn into_log_level(self) -> Result<LogLevel, LogError> {
        LogLevel::from_str(self)
    }
}

impl IntoLogLevel for String {
    fn into_log_level(self) -> Result<LogLevel, LogError> {
        LogLevel::from_str(&self)
    }
}

#[derive(Debug, Clone)]
pub enum LogError {
    InvalidLogLevel(String),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::InvalidLogLevel(level) => {
                write!(f, "Invalid value \"{level}\" assigned to `logLevel`")
            }
        }
    }
}

impl std::error::Error for LogError {}

/// Sets the level on every live logger instance and on loggers created later.
pub fn set_log_level<L>(level: L) -> Result<(), LogError>
where
    L: IntoLogLevel,
{
    let level = level.into_log_level()?;
    GLOBAL_LOG_LEVEL.store(level as u8, Ordering::SeqCst);
    with_instances(|logger| {
        let _ = logger.set_log_level(level);
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    static TEST_GUARD: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    fn capture(logger: &Logger) -> Arc<Mutex<Vec<(LogLevel, String)>>> {
        let records = Arc::new(Mutex::new(Vec::new()));
        let handler_records = Arc::clone(&records);
        logger.set_log_handler(move |instance, level, message| {
            if level < instance.log_level() {
                return;
            }
            handler_records
                .lock()
                .unwrap()
                .push((level, message.to_owned()));
        });
        records
    }

    #[test]
    fn log_methods_respect_instance_level() {
        let _guard = TEST_GUARD.lock().unwrap();
        let logger = Logger::new("@plausible/logger-level-test");
        logger.set_log_level(LogLevel::Debug).unwrap();
        let records = capture(&logger);

        logger.debug("debug message");
        logger.log("verbose message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");

        let stored = records.lock().unwrap();
        let levels: Vec<_> = stored.iter().map(|(level, _)| *level).collect();
        assert_eq!(
            levels,
            [
                LogLevel::Debug,
                LogLevel::Verbose,
                LogLevel::Info,
                LogLevel::Warn,
                LogLevel::Error,
            ]
        );
        assert_eq!(stored[0].1, "debug message");
    }

    #[test]
    fn log_level_string_filtering() {
        let _guard = TEST_GUARD.lock().unwrap();
        let logger = Logger::new("@plausible/logger-string-level");
        logger.set_log_level("warn").unwrap();
        let records = capture(&logger);

        logger.debug("debug message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");

        let stored = records.lock().unwrap();
        let levels: Vec<_> = stored.iter().map(|(level, _)| *level).collect();
        assert_eq!(levels, [LogLevel::Warn, LogLevel::Error]);
        assert_eq!(stored[0].1, "warn message");
    }

    #[test]
    fn global_level_applies_to_live_instances() {
        let _guard = TEST_GUARD.lock().unwrap();
        let logger = Logger::new("@plausible/logger-global-level");
        set_log_level(LogLevel::Error).unwrap();
        assert_eq!(logger.log_level(), LogLevel::Error);
        set_log_level(LogLevel::Info).unwrap();
        assert_eq!(logger.log_level(), LogLevel::Info);
    }

    #[test]
    fn invalid_level_string_is_rejected() {
        assert!(matches!(
            LogLevel::from_str("noisy"),
            Err(LogError::InvalidLogLevel(_))
        ));
    }
}
