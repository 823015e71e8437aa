//! Load/mutate/save service for `conf/logging.properties`.
//!
//! The properties format has no schema, so loading is a two-pass algorithm:
//! the first pass flattens the file into logical `key = value` pairs
//! (handling `\` line continuations and `#` comments) and discovers the
//! dynamic groups by pattern — one file handler per `<prefix>.<Class>.level`
//! key, one logger per remaining `<name>.level` / `<name>.handlers` key — and
//! the second pass hydrates each discovered group's fields.
//!
//! Saving regenerates the whole file from the model under banner-commented
//! sections. Comments and ordering from a hand-edited file are not preserved;
//! the timestamped backup taken before each save keeps the original
//! recoverable.

use std::path::{Path, PathBuf};

use log::debug;
use regex::Regex;

use crate::backup::backup_timestamped;
use crate::error::{Result, TomcatKitError};
use crate::keyed;
use crate::logging::{CONSOLE_HANDLER, ConsoleHandler, FileHandler, Logger, LoggingConfig};

pub struct LoggingService {
    base: PathBuf,
    config: Option<LoggingConfig>,
}

impl LoggingService {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        LoggingService {
            base: base.into(),
            config: None,
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.base.join("conf").join("logging.properties")
    }

    /// Read `conf/logging.properties`, or start from the stock two-handler
    /// configuration when the file does not exist.
    pub fn load(&mut self) -> Result<&LoggingConfig> {
        let path = self.file_path();
        let config = match std::fs::read_to_string(&path) {
            Ok(text) => parse(&text).map_err(|reason| TomcatKitError::Parse {
                path: path.clone(),
                reason,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, starting from defaults", path.display());
                LoggingConfig::tomcat_default()
            }
            Err(e) => return Err(TomcatKitError::io(&path, e)),
        };
        Ok(self.config.insert(config))
    }

    /// Back up the existing file (if any) and regenerate it from the model.
    /// Errors if never loaded or mutated.
    pub fn save(&self) -> Result<()> {
        let Some(config) = &self.config else {
            return Err(TomcatKitError::NotLoaded {
                file: "logging.properties",
            });
        };
        let path = self.file_path();
        backup_timestamped(&path)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TomcatKitError::io(parent, e))?;
        }
        std::fs::write(&path, generate(config)).map_err(|e| TomcatKitError::io(&path, e))?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    pub fn config(&self) -> Option<&LoggingConfig> {
        self.config.as_ref()
    }

    fn config_mut(&mut self) -> &mut LoggingConfig {
        self.config.get_or_insert_with(LoggingConfig::default)
    }

    // --- file handlers (keyed by prefix) ---

    pub fn file_handlers(&self) -> &[FileHandler] {
        self.config.as_ref().map_or(&[], |c| &c.file_handlers)
    }

    pub fn get_file_handler(&self, prefix: &str) -> Option<&FileHandler> {
        keyed::get(self.file_handlers(), prefix, |h| &h.prefix)
    }

    /// Add a handler group and register its computed name in the global
    /// `handlers` list (unless already listed).
    pub fn add_file_handler(&mut self, handler: FileHandler) -> Result<()> {
        let name = handler.handler_name();
        let config = self.config_mut();
        keyed::add(&mut config.file_handlers, handler, |h| &h.prefix, "file handler")?;
        if !config.handlers.contains(&name) {
            config.handlers.push(name);
        }
        Ok(())
    }

    /// Replace the handler group with the same prefix. If the class name
    /// changed, references in the `handlers` and `.handlers` lists are
    /// renamed to the new computed name.
    pub fn update_file_handler(&mut self, handler: FileHandler) -> Result<()> {
        let config = self.config_mut();
        let old_name = keyed::get(&config.file_handlers, &handler.prefix, |h| &h.prefix)
            .map(FileHandler::handler_name);
        let new_name = handler.handler_name();
        keyed::update(&mut config.file_handlers, handler, |h| &h.prefix, "file handler")?;

        if let Some(old_name) = old_name
            && old_name != new_name
        {
            for list in [&mut config.handlers, &mut config.root_handlers] {
                for entry in list.iter_mut() {
                    if *entry == old_name {
                        *entry = new_name.clone();
                    }
                }
            }
        }
        Ok(())
    }

    /// Remove a handler group and strip its name from the `handlers` and
    /// `.handlers` lists.
    pub fn remove_file_handler(&mut self, prefix: &str) -> Result<()> {
        let config = self.config_mut();
        let removed = keyed::remove(&mut config.file_handlers, prefix, |h| &h.prefix, "file handler")?;
        let name = removed.handler_name();
        config.handlers.retain(|h| *h != name);
        config.root_handlers.retain(|h| *h != name);
        Ok(())
    }

    // --- console handler ---

    pub fn console_handler(&self) -> Option<&ConsoleHandler> {
        self.config.as_ref().and_then(|c| c.console_handler.as_ref())
    }

    pub fn set_console_handler(&mut self, handler: ConsoleHandler) {
        let config = self.config_mut();
        config.console_handler = Some(handler);
        if !config.handlers.iter().any(|h| h == CONSOLE_HANDLER) {
            config.handlers.push(CONSOLE_HANDLER.to_string());
        }
    }

    pub fn remove_console_handler(&mut self) {
        let config = self.config_mut();
        config.console_handler = None;
        config.handlers.retain(|h| h != CONSOLE_HANDLER);
        config.root_handlers.retain(|h| h != CONSOLE_HANDLER);
    }

    // --- loggers (keyed by name) ---

    pub fn loggers(&self) -> &[Logger] {
        self.config.as_ref().map_or(&[], |c| &c.loggers)
    }

    pub fn get_logger(&self, name: &str) -> Option<&Logger> {
        keyed::get(self.loggers(), name, |l| &l.name)
    }

    pub fn add_logger(&mut self, logger: Logger) -> Result<()> {
        keyed::add(&mut self.config_mut().loggers, logger, |l| &l.name, "logger")
    }

    pub fn update_logger(&mut self, logger: Logger) -> Result<()> {
        keyed::update(&mut self.config_mut().loggers, logger, |l| &l.name, "logger")
    }

    pub fn remove_logger(&mut self, name: &str) -> Result<()> {
        keyed::remove(&mut self.config_mut().loggers, name, |l| &l.name, "logger")?;
        Ok(())
    }

    pub fn set_root_handlers(&mut self, handlers: Vec<String>) {
        self.config_mut().root_handlers = handlers;
    }

    /// Direct mutable access to the aggregate.
    pub fn edit(&mut self) -> &mut LoggingConfig {
        self.config_mut()
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

// --- parsing ---

/// Pass 0: flatten the file into logical `key = value` pairs. Handles `#`
/// and `!` comment lines, blank lines, and trailing-backslash continuations;
/// splits on the first `=`.
fn logical_pairs(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while logical.ends_with('\\') {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        if let Some((key, value)) = logical.split_once('=') {
            pairs.push((key.trim().to_string(), value.trim().to_string()));
        }
    }
    pairs
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse(text: &str) -> std::result::Result<LoggingConfig, String> {
    let pairs = logical_pairs(text);
    let lookup = |key: &str| -> Option<&str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    // Pass 1: discover the dynamic groups.
    let handler_re = Regex::new(r"^([A-Za-z0-9][\w-]*)\.([A-Za-z_][A-Za-z0-9_.]*FileHandler)\.level$")
        .map_err(|e| e.to_string())?;
    let logger_re = Regex::new(r"^(.+)\.(level|handlers)$").map_err(|e| e.to_string())?;

    let mut handler_groups: Vec<(String, String)> = Vec::new();
    for (key, _) in &pairs {
        if let Some(caps) = handler_re.captures(key) {
            let group = (caps[1].to_string(), caps[2].to_string());
            if !handler_groups.contains(&group) {
                handler_groups.push(group);
            }
        }
    }

    let handler_names: Vec<String> = handler_groups
        .iter()
        .map(|(prefix, class)| format!("{prefix}.{class}"))
        .collect();

    let mut logger_names: Vec<String> = Vec::new();
    for (key, _) in &pairs {
        if key == "handlers" || key == ".handlers" {
            continue;
        }
        let Some(caps) = logger_re.captures(key) else {
            continue;
        };
        let name = caps[1].to_string();
        if name.is_empty()
            || name == CONSOLE_HANDLER
            || handler_names.contains(&name)
            || logger_names.contains(&name)
        {
            continue;
        }
        logger_names.push(name);
    }

    // Pass 2: hydrate each group.
    let mut config = LoggingConfig {
        handlers: lookup("handlers").map(split_list).unwrap_or_default(),
        root_handlers: lookup(".handlers").map(split_list).unwrap_or_default(),
        ..LoggingConfig::default()
    };

    for (prefix, class) in &handler_groups {
        let field = |attr: &str| lookup(&format!("{prefix}.{class}.{attr}"));
        config.file_handlers.push(FileHandler {
            prefix: prefix.clone(),
            class_name: class.clone(),
            level: field("level").map(str::to_string),
            directory: field("directory").map(str::to_string),
            file_prefix: field("prefix").map(str::to_string),
            suffix: field("suffix").map(str::to_string),
            max_days: field("maxDays")
                .map(|v| {
                    v.parse::<i64>()
                        .map_err(|_| format!("{prefix}.{class}.maxDays is not an integer: '{v}'"))
                })
                .transpose()?,
            encoding: field("encoding").map(str::to_string),
            rotatable: field("rotatable")
                .map(|v| match v {
                    "true" => Ok(true),
                    "false" => Ok(false),
                    other => Err(format!(
                        "{prefix}.{class}.rotatable is not a boolean: '{other}'"
                    )),
                })
                .transpose()?,
        });
    }

    let console_key = |attr: &str| lookup(&format!("{CONSOLE_HANDLER}.{attr}"));
    if pairs
        .iter()
        .any(|(k, _)| k.starts_with(&format!("{CONSOLE_HANDLER}.")))
    {
        config.console_handler = Some(ConsoleHandler {
            level: console_key("level").map(str::to_string),
            formatter: console_key("formatter").map(str::to_string),
            encoding: console_key("encoding").map(str::to_string),
        });
    }

    for name in logger_names {
        let level = lookup(&format!("{name}.level")).map(str::to_string);
        let handlers = lookup(&format!("{name}.handlers"))
            .map(split_list)
            .unwrap_or_default();
        let use_parent = lookup(&format!("{name}.useParentHandlers"))
            .map(|v| match v {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(format!(
                    "{name}.useParentHandlers is not a boolean: '{other}'"
                )),
            })
            .transpose()?;
        config.loggers.push(Logger {
            name,
            level,
            handlers,
            use_parent_handlers: use_parent,
        });
    }

    Ok(config)
}

// --- generation ---

const BANNER: &str = "############################################################";

fn generate(config: &LoggingConfig) -> String {
    let mut out = String::new();
    out.push_str(BANNER);
    out.push_str("\n# Tomcat JULI logging configuration\n");
    out.push_str(BANNER);
    out.push_str("\n\n");

    if !config.handlers.is_empty() {
        out.push_str(&format!("handlers = {}\n\n", config.handlers.join(", ")));
    }
    if !config.root_handlers.is_empty() {
        out.push_str(&format!(".handlers = {}\n\n", config.root_handlers.join(", ")));
    }

    if !config.file_handlers.is_empty() {
        section(&mut out, "File Handler Configuration");
        for handler in &config.file_handlers {
            let name = handler.handler_name();
            push_prop(&mut out, &name, "level", handler.level.as_deref());
            push_prop(&mut out, &name, "directory", handler.directory.as_deref());
            push_prop(&mut out, &name, "prefix", handler.file_prefix.as_deref());
            push_prop(&mut out, &name, "suffix", handler.suffix.as_deref());
            push_prop(
                &mut out,
                &name,
                "maxDays",
                handler.max_days.map(|d| d.to_string()).as_deref(),
            );
            push_prop(&mut out, &name, "encoding", handler.encoding.as_deref());
            push_prop(
                &mut out,
                &name,
                "rotatable",
                handler.rotatable.map(bool_str).as_deref(),
            );
            out.push('\n');
        }
    }

    if let Some(console) = &config.console_handler {
        section(&mut out, "Console Handler Configuration");
        push_prop(&mut out, CONSOLE_HANDLER, "level", console.level.as_deref());
        push_prop(&mut out, CONSOLE_HANDLER, "formatter", console.formatter.as_deref());
        push_prop(&mut out, CONSOLE_HANDLER, "encoding", console.encoding.as_deref());
        out.push('\n');
    }

    if !config.loggers.is_empty() {
        section(&mut out, "Logger Configuration");
        for logger in &config.loggers {
            push_prop(&mut out, &logger.name, "level", logger.level.as_deref());
            if !logger.handlers.is_empty() {
                out.push_str(&format!(
                    "{}.handlers = {}\n",
                    logger.name,
                    logger.handlers.join(", ")
                ));
            }
            push_prop(
                &mut out,
                &logger.name,
                "useParentHandlers",
                logger.use_parent_handlers.map(bool_str).as_deref(),
            );
            out.push('\n');
        }
    }

    // drop the trailing blank line
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

fn section(out: &mut String, title: &str) {
    out.push_str(BANNER);
    out.push_str("\n# ");
    out.push_str(title);
    out.push('\n');
    out.push_str(BANNER);
    out.push_str("\n\n");
}

fn push_prop(out: &mut String, group: &str, attr: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!("{group}.{attr} = {value}\n"));
    }
}

fn bool_str(value: bool) -> String {
    value.to_string()
}
