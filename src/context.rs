//! Data model for `conf/context.xml`.
//!
//! Mirrors the `<Context>` element and the child elements this tool edits.
//! Every optional XML attribute is an `Option` so that an explicit
//! `reloadable="false"` survives a round-trip instead of vanishing with the
//! zero value, and every optional child element is an `Option` so "not
//! configured" stays distinct from "configured with defaults".

/// The `<Context>` aggregate — one web application's runtime configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub path: Option<String>,
    pub doc_base: Option<String>,
    pub reloadable: Option<bool>,
    pub cross_context: Option<bool>,
    pub privileged: Option<bool>,
    pub use_http_only: Option<bool>,
    pub session_cookie_name: Option<String>,
    pub cache_max_size: Option<i64>,

    pub watched_resources: Vec<String>,
    pub resources: Vec<Resource>,
    pub environments: Vec<Environment>,
    pub resource_links: Vec<ResourceLink>,
    pub parameters: Vec<Parameter>,
    pub valves: Vec<Valve>,

    pub manager: Option<Manager>,
    pub loader: Option<Loader>,
    pub jar_scanner: Option<JarScanner>,
    pub cookie_processor: Option<CookieProcessor>,
}

impl Context {
    /// The configuration Tomcat ships: no attributes, two watched resources.
    pub fn tomcat_default() -> Self {
        Context {
            watched_resources: vec![
                "WEB-INF/web.xml".to_string(),
                "${catalina.base}/conf/web.xml".to_string(),
            ],
            ..Context::default()
        }
    }
}

/// A `<Resource>` — a JNDI resource such as a DataSource, mail session, or
/// user database. Identity is the `name` attribute (the JNDI path).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    pub name: String,
    pub auth: Option<String>,
    pub type_name: Option<String>,
    pub description: Option<String>,
    pub factory: Option<String>,

    // DBCP pool attributes (DataSource)
    pub driver_class_name: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub max_total: Option<i64>,
    pub max_idle: Option<i64>,
    pub min_idle: Option<i64>,
    pub max_wait_millis: Option<i64>,
    pub test_on_borrow: Option<bool>,
    pub validation_query: Option<String>,

    // Mail session
    pub mail_smtp_host: Option<String>,

    // UserDatabase
    pub pathname: Option<String>,
    pub readonly: Option<bool>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Resource {
            name: name.into(),
            ..Resource::default()
        }
    }

    /// A container-managed JDBC DataSource with the DBCP pool defaults this
    /// tool suggests. Driver, URL, and credentials are left for the caller.
    pub fn data_source(name: impl Into<String>) -> Self {
        Resource {
            name: name.into(),
            auth: Some("Container".to_string()),
            type_name: Some("javax.sql.DataSource".to_string()),
            max_total: Some(100),
            max_idle: Some(30),
            max_wait_millis: Some(10_000),
            test_on_borrow: Some(true),
            validation_query: Some("SELECT 1".to_string()),
            ..Resource::default()
        }
    }

    /// A JavaMail session resource pointed at a local SMTP relay.
    pub fn mail_session(name: impl Into<String>) -> Self {
        Resource {
            name: name.into(),
            auth: Some("Container".to_string()),
            type_name: Some("javax.mail.Session".to_string()),
            mail_smtp_host: Some("localhost".to_string()),
            ..Resource::default()
        }
    }

    /// The memory user database backing `conf/tomcat-users.xml`.
    pub fn user_database(name: impl Into<String>) -> Self {
        Resource {
            name: name.into(),
            auth: Some("Container".to_string()),
            type_name: Some("org.apache.catalina.UserDatabase".to_string()),
            description: Some("User database that can be updated and saved".to_string()),
            factory: Some("org.apache.catalina.users.MemoryUserDatabaseFactory".to_string()),
            pathname: Some("conf/tomcat-users.xml".to_string()),
            ..Resource::default()
        }
    }
}

/// An `<Environment>` — a JNDI environment entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    pub name: String,
    pub value: String,
    pub type_name: Option<String>,
    pub description: Option<String>,
    /// The `override` attribute: whether a web.xml `env-entry` may override it.
    pub override_allowed: Option<bool>,
}

impl Environment {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Environment {
            name: name.into(),
            value: value.into(),
            type_name: Some("java.lang.String".to_string()),
            ..Environment::default()
        }
    }
}

/// A `<ResourceLink>` — an alias from this context into a global resource.
///
/// The `global` name is not validated against the server's global resources;
/// Tomcat resolves it at deploy time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceLink {
    pub name: String,
    pub global: String,
    pub type_name: Option<String>,
}

impl ResourceLink {
    pub fn new(name: impl Into<String>, global: impl Into<String>) -> Self {
        ResourceLink {
            name: name.into(),
            global: global.into(),
            type_name: None,
        }
    }
}

/// A `<Parameter>` — a context init parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
    pub override_allowed: Option<bool>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            value: value.into(),
            ..Parameter::default()
        }
    }
}

/// A `<Valve>` — a request-processing interceptor.
///
/// Valve attributes vary entirely by implementation class, so beyond
/// `className` they are kept as an ordered name/value list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Valve {
    pub class_name: String,
    pub attributes: Vec<(String, String)>,
}

impl Valve {
    pub fn new(class_name: impl Into<String>) -> Self {
        Valve {
            class_name: class_name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// The `<Manager>` session manager, optionally wrapping a `<Store>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manager {
    pub class_name: Option<String>,
    pub pathname: Option<String>,
    pub store: Option<SessionStore>,
}

/// A `<Store>` nested in `<Manager>` — persistent session storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStore {
    pub class_name: String,
    pub directory: Option<String>,
}

/// The `<Loader>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loader {
    pub class_name: Option<String>,
    pub delegate: Option<bool>,
    pub reloadable: Option<bool>,
}

/// The `<JarScanner>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JarScanner {
    pub class_name: Option<String>,
    pub scan_class_path: Option<bool>,
    pub scan_manifest: Option<bool>,
}

/// The `<CookieProcessor>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookieProcessor {
    pub class_name: Option<String>,
    pub same_site_cookies: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tomcat_default_watches_two_resources() {
        let ctx = Context::tomcat_default();
        assert_eq!(
            ctx.watched_resources,
            ["WEB-INF/web.xml", "${catalina.base}/conf/web.xml"]
        );
        assert!(ctx.resources.is_empty());
        assert!(ctx.manager.is_none());
    }

    #[test]
    fn default_context_is_empty_not_tomcat_default() {
        assert!(Context::default().watched_resources.is_empty());
        assert_ne!(Context::default(), Context::tomcat_default());
    }

    #[test]
    fn data_source_pool_defaults() {
        let r = Resource::data_source("jdbc/Test");
        assert_eq!(r.name, "jdbc/Test");
        assert_eq!(r.type_name.as_deref(), Some("javax.sql.DataSource"));
        assert_eq!(r.auth.as_deref(), Some("Container"));
        assert_eq!(r.max_total, Some(100));
        assert_eq!(r.test_on_borrow, Some(true));
        assert!(r.driver_class_name.is_none());
    }

    #[test]
    fn mail_session_points_at_localhost() {
        let r = Resource::mail_session("mail/Session");
        assert_eq!(r.type_name.as_deref(), Some("javax.mail.Session"));
        assert_eq!(r.mail_smtp_host.as_deref(), Some("localhost"));
    }

    #[test]
    fn user_database_uses_memory_factory() {
        let r = Resource::user_database("UserDatabase");
        assert_eq!(r.type_name.as_deref(), Some("org.apache.catalina.UserDatabase"));
        assert_eq!(r.pathname.as_deref(), Some("conf/tomcat-users.xml"));
    }

    #[test]
    fn environment_defaults_to_string_type() {
        let e = Environment::new("maxExemptions", "10");
        assert_eq!(e.type_name.as_deref(), Some("java.lang.String"));
        assert!(e.override_allowed.is_none());
    }

    #[test]
    fn valve_attr_lookup() {
        let v = Valve::new("org.apache.catalina.valves.AccessLogValve")
            .with_attr("directory", "logs")
            .with_attr("prefix", "access_log");
        assert_eq!(v.attr("prefix"), Some("access_log"));
        assert_eq!(v.attr("suffix"), None);
    }
}
