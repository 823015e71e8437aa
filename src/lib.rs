//! Read, edit, and write Apache Tomcat's core configuration files as typed
//! Rust values.
//!
//! Tomcatkit models the four files a Tomcat administrator actually touches —
//! `conf/context.xml`, `conf/web.xml`, `conf/logging.properties`, and this
//! tool's own `settings.json` — and exposes one service per file with the
//! same load/mutate/save shape:
//!
//! ```ignore
//! let mut svc = ContextService::new("/opt/tomcat");
//! svc.load()?;
//! svc.add_resource(Resource::data_source("jdbc/MainDB"))?;
//! svc.save()?;
//! ```
//!
//! # Round-trip persistence
//!
//! Each service parses its file into a plain data model, lets you edit the
//! model through named CRUD operations (or directly via `edit()`), and
//! serializes the model back. Optional attributes are `Option`s end to end,
//! so values like `reloadable="false"` or `maxDays = 0` survive a load/save
//! cycle instead of collapsing into "absent". Serialization is canonical:
//! declaration, Apache license header, fixed element order and indentation.
//! Hand-written comments inside the Tomcat files are not preserved, which is
//! why every save of an existing file first copies it into `conf/backup/` —
//! `context.xml` to a fixed `.bak` name, `web.xml` and `logging.properties`
//! to timestamped names.
//!
//! # Missing files mean defaults
//!
//! Loading a file that does not exist is not an error: each service starts
//! from the stock content Tomcat ships (the default `<Context>`, the javaee
//! 4.0 descriptor, the two-handler JULI configuration), so a freshly
//! unpacked or partially stripped instance can be edited like any other.
//! Saving without ever loading or mutating is an error.
//!
//! # Modules
//!
//! - [`context`] / [`ContextService`] — `<Context>` resources, environments,
//!   valves, session manager.
//! - [`webapp`] / [`WebAppService`] — servlets, filters, mappings, security
//!   constraints of the default deployment descriptor.
//! - [`logging`] / [`LoggingService`] — JULI file/console handlers and
//!   loggers, discovered from the dotted property keys.
//! - [`settings`] / [`SettingsStore`] — recently used instances and UI
//!   preferences, as JSON in the platform config directory.

pub mod backup;
pub mod context;
pub mod error;
pub mod instance;
pub mod logging;
pub mod settings;
pub mod webapp;

mod context_service;
mod context_xml;
mod keyed;
mod logging_service;
mod webapp_service;
mod webapp_xml;
mod xml;

pub use context_service::ContextService;
pub use error::{Result, TomcatKitError};
pub use instance::TomcatInstance;
pub use logging_service::LoggingService;
pub use settings::{Settings, SettingsStore};
pub use webapp_service::WebAppService;
