//! Data model for `conf/web.xml` — the default web application descriptor.
//!
//! Unlike `context.xml`, the servlet descriptor carries its values as child
//! elements rather than attributes, so most fields here round-trip through
//! `<tag>value</tag>` text. The optional descriptor sections (`LoginConfig`,
//! `SessionConfig`) are `Option`s; absence means "not declared".

/// The `<web-app>` root aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct WebApp {
    pub xmlns: String,
    pub xmlns_xsi: String,
    pub schema_location: String,
    pub version: String,

    pub display_name: Option<String>,
    pub context_params: Vec<InitParam>,
    pub servlets: Vec<Servlet>,
    pub servlet_mappings: Vec<ServletMapping>,
    pub filters: Vec<Filter>,
    pub filter_mappings: Vec<FilterMapping>,
    pub listeners: Vec<Listener>,
    pub session_config: Option<SessionConfig>,
    pub welcome_files: Vec<String>,
    pub error_pages: Vec<ErrorPage>,
    pub mime_mappings: Vec<MimeMapping>,
    pub security_constraints: Vec<SecurityConstraint>,
    pub login_config: Option<LoginConfig>,
    pub security_roles: Vec<SecurityRole>,
}

impl Default for WebApp {
    /// The descriptor Tomcat seeds for a new instance: javaee 4.0 namespace,
    /// three welcome files, a 30-minute session timeout.
    fn default() -> Self {
        WebApp {
            xmlns: "http://xmlns.jcp.org/xml/ns/javaee".to_string(),
            xmlns_xsi: "http://www.w3.org/2001/XMLSchema-instance".to_string(),
            schema_location: "http://xmlns.jcp.org/xml/ns/javaee \
                              http://xmlns.jcp.org/xml/ns/javaee/web-app_4_0.xsd"
                .to_string(),
            version: "4.0".to_string(),
            display_name: None,
            context_params: Vec::new(),
            servlets: Vec::new(),
            servlet_mappings: Vec::new(),
            filters: Vec::new(),
            filter_mappings: Vec::new(),
            listeners: Vec::new(),
            session_config: Some(SessionConfig {
                session_timeout: Some(30),
                ..SessionConfig::default()
            }),
            welcome_files: vec![
                "index.html".to_string(),
                "index.htm".to_string(),
                "index.jsp".to_string(),
            ],
            error_pages: Vec::new(),
            mime_mappings: Vec::new(),
            security_constraints: Vec::new(),
            login_config: None,
            security_roles: Vec::new(),
        }
    }
}

impl WebApp {
    /// An aggregate with no children at all, used as the lazy-init target for
    /// mutating operations on an unloaded service.
    pub fn empty() -> Self {
        WebApp {
            session_config: None,
            welcome_files: Vec::new(),
            ..WebApp::default()
        }
    }
}

/// A `<context-param>` or `<init-param>` name/value pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitParam {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
}

impl InitParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        InitParam {
            name: name.into(),
            value: value.into(),
            description: None,
        }
    }
}

/// A `<servlet>` declaration, keyed by `servlet-name`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Servlet {
    pub name: String,
    pub class_name: String,
    pub init_params: Vec<InitParam>,
    pub load_on_startup: Option<i64>,
    pub async_supported: Option<bool>,
}

impl Servlet {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Servlet {
            name: name.into(),
            class_name: class_name.into(),
            ..Servlet::default()
        }
    }
}

/// A `<servlet-mapping>` binding URL patterns to a servlet by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServletMapping {
    pub servlet_name: String,
    pub url_patterns: Vec<String>,
}

impl ServletMapping {
    pub fn new(servlet_name: impl Into<String>, url_pattern: impl Into<String>) -> Self {
        ServletMapping {
            servlet_name: servlet_name.into(),
            url_patterns: vec![url_pattern.into()],
        }
    }
}

/// A `<filter>` declaration, keyed by `filter-name`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub name: String,
    pub class_name: String,
    pub init_params: Vec<InitParam>,
    pub async_supported: Option<bool>,
}

impl Filter {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Filter {
            name: name.into(),
            class_name: class_name.into(),
            ..Filter::default()
        }
    }
}

/// A `<filter-mapping>` binding URL patterns and dispatcher types to a filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterMapping {
    pub filter_name: String,
    pub url_patterns: Vec<String>,
    pub dispatchers: Vec<String>,
}

impl FilterMapping {
    pub fn new(filter_name: impl Into<String>, url_pattern: impl Into<String>) -> Self {
        FilterMapping {
            filter_name: filter_name.into(),
            url_patterns: vec![url_pattern.into()],
            dispatchers: Vec::new(),
        }
    }
}

/// A `<listener>` declaration. Listeners have no identity key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listener {
    pub class_name: String,
}

impl Listener {
    pub fn new(class_name: impl Into<String>) -> Self {
        Listener {
            class_name: class_name.into(),
        }
    }
}

/// The `<session-config>` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionConfig {
    /// Minutes; Tomcat's stock descriptor uses 30.
    pub session_timeout: Option<i64>,
    pub cookie_http_only: Option<bool>,
    pub cookie_secure: Option<bool>,
    pub tracking_mode: Option<String>,
}

/// An `<error-page>` route. Exactly one of `error_code` or `exception_type`
/// is normally set; the descriptor also allows a bare default page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorPage {
    pub error_code: Option<i64>,
    pub exception_type: Option<String>,
    pub location: String,
}

/// A `<mime-mapping>`, keyed by `extension`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MimeMapping {
    pub extension: String,
    pub mime_type: String,
}

impl MimeMapping {
    pub fn new(extension: impl Into<String>, mime_type: impl Into<String>) -> Self {
        MimeMapping {
            extension: extension.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// A `<security-constraint>` with its single `<web-resource-collection>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityConstraint {
    pub display_name: Option<String>,
    pub web_resource_name: String,
    pub url_patterns: Vec<String>,
    pub http_methods: Vec<String>,
    /// `<auth-constraint>` role names; empty with `has_auth_constraint` set
    /// means "deny all".
    pub role_names: Vec<String>,
    pub has_auth_constraint: bool,
    /// `<transport-guarantee>`: NONE, INTEGRAL, or CONFIDENTIAL.
    pub transport_guarantee: Option<String>,
}

/// The `<login-config>` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginConfig {
    pub auth_method: Option<String>,
    pub realm_name: Option<String>,
    pub form_login_page: Option<String>,
    pub form_error_page: Option<String>,
}

/// A `<security-role>`, keyed by `role-name`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityRole {
    pub role_name: String,
    pub description: Option<String>,
}

impl SecurityRole {
    pub fn new(role_name: impl Into<String>) -> Self {
        SecurityRole {
            role_name: role_name.into(),
            description: None,
        }
    }
}
