//! Data model for `conf/logging.properties` — Tomcat's JULI configuration.
//!
//! A properties file has no fixed element list: file handlers and loggers
//! exist only as families of dotted keys (`1catalina.org.apache.juli.
//! AsyncFileHandler.level`, `org.apache.catalina.….level`). The model keeps
//! one struct per discovered group plus the two flat handler lists the file
//! declares (`handlers` and the root logger's `.handlers`).

/// The `logging.properties` aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoggingConfig {
    /// The global `handlers` declaration list.
    pub handlers: Vec<String>,
    /// The root logger's `.handlers` list.
    pub root_handlers: Vec<String>,
    pub file_handlers: Vec<FileHandler>,
    pub console_handler: Option<ConsoleHandler>,
    pub loggers: Vec<Logger>,
}

impl LoggingConfig {
    /// The configuration Tomcat ships: catalina and localhost file handlers
    /// plus a console handler, with the localhost handler fed by the
    /// per-host container logger.
    pub fn tomcat_default() -> Self {
        let catalina = FileHandler {
            prefix: "1catalina".to_string(),
            class_name: ASYNC_FILE_HANDLER.to_string(),
            level: Some("FINE".to_string()),
            directory: Some("${catalina.base}/logs".to_string()),
            file_prefix: Some("catalina.".to_string()),
            suffix: None,
            max_days: Some(90),
            encoding: Some("UTF-8".to_string()),
            rotatable: None,
        };
        let localhost = FileHandler {
            prefix: "2localhost".to_string(),
            file_prefix: Some("localhost.".to_string()),
            ..catalina.clone()
        };

        LoggingConfig {
            handlers: vec![
                catalina.handler_name(),
                localhost.handler_name(),
                CONSOLE_HANDLER.to_string(),
            ],
            root_handlers: vec![catalina.handler_name(), CONSOLE_HANDLER.to_string()],
            file_handlers: vec![catalina, localhost],
            console_handler: Some(ConsoleHandler {
                level: Some("FINE".to_string()),
                formatter: Some("org.apache.juli.OneLineFormatter".to_string()),
                encoding: Some("UTF-8".to_string()),
            }),
            loggers: vec![Logger {
                name: "org.apache.catalina.core.ContainerBase.[Catalina].[localhost]".to_string(),
                level: Some("INFO".to_string()),
                handlers: vec![format!("2localhost.{ASYNC_FILE_HANDLER}")],
                use_parent_handlers: None,
            }],
        }
    }
}

pub const ASYNC_FILE_HANDLER: &str = "org.apache.juli.AsyncFileHandler";
pub const CONSOLE_HANDLER: &str = "java.util.logging.ConsoleHandler";

/// One JULI file handler group. Identity is `prefix` alone for lookups; the
/// key family in the file is `<prefix>.<class_name>.<attribute>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileHandler {
    /// The ordering prefix, e.g. `1catalina`.
    pub prefix: String,
    /// `org.apache.juli.AsyncFileHandler` or `org.apache.juli.FileHandler`.
    pub class_name: String,
    pub level: Option<String>,
    pub directory: Option<String>,
    /// The handler's own `prefix` property — the log file name stem.
    pub file_prefix: Option<String>,
    pub suffix: Option<String>,
    pub max_days: Option<i64>,
    pub encoding: Option<String>,
    pub rotatable: Option<bool>,
}

impl FileHandler {
    /// A new async handler logging into `${catalina.base}/logs`.
    pub fn new(prefix: impl Into<String>, file_prefix: impl Into<String>) -> Self {
        FileHandler {
            prefix: prefix.into(),
            class_name: ASYNC_FILE_HANDLER.to_string(),
            level: Some("FINE".to_string()),
            directory: Some("${catalina.base}/logs".to_string()),
            file_prefix: Some(file_prefix.into()),
            ..FileHandler::default()
        }
    }

    /// The name this handler goes by in `handlers` lists:
    /// `<prefix>.<class_name>`.
    pub fn handler_name(&self) -> String {
        format!("{}.{}", self.prefix, self.class_name)
    }
}

/// The `java.util.logging.ConsoleHandler` group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleHandler {
    pub level: Option<String>,
    pub formatter: Option<String>,
    pub encoding: Option<String>,
}

/// A named logger: `<name>.level`, `<name>.handlers`,
/// `<name>.useParentHandlers`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Logger {
    pub name: String,
    pub level: Option<String>,
    pub handlers: Vec<String>,
    pub use_parent_handlers: Option<bool>,
}

impl Logger {
    pub fn new(name: impl Into<String>, level: impl Into<String>) -> Self {
        Logger {
            name: name.into(),
            level: Some(level.into()),
            ..Logger::default()
        }
    }
}
