//! The `web.xml` codec.
//!
//! The servlet descriptor is element-per-value, so parsing tracks the
//! enclosing section with pending builders and flags and dispatches each text
//! node on the innermost tag. Serialization writes the declaration, the full
//! ASF license block, then the `<web-app>` body at 4-space indentation in
//! descriptor order.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Result, TomcatKitError};
use crate::webapp::{
    ErrorPage, Filter, FilterMapping, InitParam, Listener, LoginConfig, MimeMapping,
    SecurityConstraint, SecurityRole, Servlet, ServletMapping, SessionConfig, WebApp,
};
use crate::xml::{RawResult, all_attrs, local_name_as_str, push_attr, push_text_element};

const LICENSE_BLOCK: &str = r#"<!--
  Licensed to the Apache Software Foundation (ASF) under one or more
  contributor license agreements.  See the NOTICE file distributed with
  this work for additional information regarding copyright ownership.
  The ASF licenses this file to You under the Apache License, Version 2.0
  (the "License"); you may not use this file except in compliance with
  the License.  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
-->"#;

pub(crate) fn parse(text: &str, path: &Path) -> Result<WebApp> {
    parse_inner(text).map_err(|reason| TomcatKitError::Parse {
        path: path.to_path_buf(),
        reason,
    })
}

/// Pending state while walking the descriptor. At most one of the section
/// builders is live at a time (the descriptor does not nest them).
#[derive(Default)]
struct Pending {
    param: Option<InitParam>,
    servlet: Option<Servlet>,
    servlet_mapping: Option<ServletMapping>,
    filter: Option<Filter>,
    filter_mapping: Option<FilterMapping>,
    listener_class: Option<String>,
    session: Option<SessionConfig>,
    error_page: Option<ErrorPage>,
    mime: Option<MimeMapping>,
    constraint: Option<SecurityConstraint>,
    login: Option<LoginConfig>,
    role: Option<SecurityRole>,
    in_cookie_config: bool,
    in_auth_constraint: bool,
}

fn parse_inner(text: &str) -> RawResult<WebApp> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut app = WebApp::empty();
    let mut seen_root = false;
    let mut pending = Pending::default();
    let mut active_tag: Option<String> = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(ref e) => {
                let name = e.local_name();
                let tag = local_name_as_str(&name).to_string();
                open(&tag, e, &mut app, &mut pending, &mut seen_root)?;
                active_tag = Some(tag);
            }
            // A self-closing element opens and ends in one event.
            Event::Empty(ref e) => {
                let name = e.local_name();
                let tag = local_name_as_str(&name).to_string();
                open(&tag, e, &mut app, &mut pending, &mut seen_root)?;
                commit(&tag, &mut app, &mut pending);
                active_tag = None;
            }
            Event::Text(e) => {
                if let Some(tag) = active_tag.as_deref() {
                    let text = e.unescape().map_err(|err| err.to_string())?;
                    dispatch_text(tag, text.trim(), &mut app, &mut pending)?;
                }
            }
            Event::End(ref e) => {
                let name = e.local_name();
                commit(local_name_as_str(&name), &mut app, &mut pending);
                active_tag = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err("no <web-app> root element".to_string());
    }
    Ok(app)
}

fn open(
    tag: &str,
    e: &quick_xml::events::BytesStart,
    app: &mut WebApp,
    pending: &mut Pending,
    seen_root: &mut bool,
) -> RawResult<()> {
    match tag {
        "web-app" => {
            *seen_root = true;
            for (attr_name, value) in all_attrs(e)? {
                match attr_name.as_str() {
                    "xmlns" => app.xmlns = value,
                    "xmlns:xsi" => app.xmlns_xsi = value,
                    "xsi:schemaLocation" => app.schema_location = value,
                    "version" => app.version = value,
                    _ => {}
                }
            }
        }
        "context-param" | "init-param" => pending.param = Some(InitParam::default()),
        "servlet" => pending.servlet = Some(Servlet::default()),
        "servlet-mapping" => pending.servlet_mapping = Some(ServletMapping::default()),
        "filter" => pending.filter = Some(Filter::default()),
        "filter-mapping" => pending.filter_mapping = Some(FilterMapping::default()),
        "listener" => pending.listener_class = Some(String::new()),
        "session-config" => pending.session = Some(SessionConfig::default()),
        "cookie-config" => pending.in_cookie_config = true,
        "error-page" => pending.error_page = Some(ErrorPage::default()),
        "mime-mapping" => pending.mime = Some(MimeMapping::default()),
        "security-constraint" => pending.constraint = Some(SecurityConstraint::default()),
        "auth-constraint" => {
            pending.in_auth_constraint = true;
            if let Some(c) = pending.constraint.as_mut() {
                c.has_auth_constraint = true;
            }
        }
        "login-config" => pending.login = Some(LoginConfig::default()),
        "security-role" => pending.role = Some(SecurityRole::default()),
        _ => {}
    }
    Ok(())
}

fn dispatch_text(tag: &str, text: &str, app: &mut WebApp, p: &mut Pending) -> RawResult<()> {
    match tag {
        "display-name" => {
            if let Some(c) = p.constraint.as_mut() {
                c.display_name = Some(text.to_string());
            } else {
                app.display_name = Some(text.to_string());
            }
        }
        "param-name" => {
            if let Some(param) = p.param.as_mut() {
                param.name = text.to_string();
            }
        }
        "param-value" => {
            if let Some(param) = p.param.as_mut() {
                param.value = text.to_string();
            }
        }
        "description" => {
            if let Some(param) = p.param.as_mut() {
                param.description = Some(text.to_string());
            } else if let Some(role) = p.role.as_mut() {
                role.description = Some(text.to_string());
            }
        }
        "servlet-name" => {
            if let Some(m) = p.servlet_mapping.as_mut() {
                m.servlet_name = text.to_string();
            } else if let Some(s) = p.servlet.as_mut() {
                s.name = text.to_string();
            }
        }
        "servlet-class" => {
            if let Some(s) = p.servlet.as_mut() {
                s.class_name = text.to_string();
            }
        }
        "load-on-startup" => {
            if let Some(s) = p.servlet.as_mut() {
                s.load_on_startup = Some(parse_i64(tag, text)?);
            }
        }
        "async-supported" => {
            let value = Some(parse_bool(tag, text)?);
            if let Some(s) = p.servlet.as_mut() {
                s.async_supported = value;
            } else if let Some(f) = p.filter.as_mut() {
                f.async_supported = value;
            }
        }
        "filter-name" => {
            if let Some(m) = p.filter_mapping.as_mut() {
                m.filter_name = text.to_string();
            } else if let Some(f) = p.filter.as_mut() {
                f.name = text.to_string();
            }
        }
        "filter-class" => {
            if let Some(f) = p.filter.as_mut() {
                f.class_name = text.to_string();
            }
        }
        "url-pattern" => {
            if let Some(m) = p.servlet_mapping.as_mut() {
                m.url_patterns.push(text.to_string());
            } else if let Some(m) = p.filter_mapping.as_mut() {
                m.url_patterns.push(text.to_string());
            } else if let Some(c) = p.constraint.as_mut() {
                c.url_patterns.push(text.to_string());
            }
        }
        "dispatcher" => {
            if let Some(m) = p.filter_mapping.as_mut() {
                m.dispatchers.push(text.to_string());
            }
        }
        "listener-class" => {
            if let Some(class) = p.listener_class.as_mut() {
                *class = text.to_string();
            }
        }
        "session-timeout" => {
            if let Some(s) = p.session.as_mut() {
                s.session_timeout = Some(parse_i64(tag, text)?);
            }
        }
        "http-only" => {
            if p.in_cookie_config
                && let Some(s) = p.session.as_mut()
            {
                s.cookie_http_only = Some(parse_bool(tag, text)?);
            }
        }
        "secure" => {
            if p.in_cookie_config
                && let Some(s) = p.session.as_mut()
            {
                s.cookie_secure = Some(parse_bool(tag, text)?);
            }
        }
        "tracking-mode" => {
            if let Some(s) = p.session.as_mut() {
                s.tracking_mode = Some(text.to_string());
            }
        }
        "welcome-file" => app.welcome_files.push(text.to_string()),
        "error-code" => {
            if let Some(page) = p.error_page.as_mut() {
                page.error_code = Some(parse_i64(tag, text)?);
            }
        }
        "exception-type" => {
            if let Some(page) = p.error_page.as_mut() {
                page.exception_type = Some(text.to_string());
            }
        }
        "location" => {
            if let Some(page) = p.error_page.as_mut() {
                page.location = text.to_string();
            }
        }
        "extension" => {
            if let Some(m) = p.mime.as_mut() {
                m.extension = text.to_string();
            }
        }
        "mime-type" => {
            if let Some(m) = p.mime.as_mut() {
                m.mime_type = text.to_string();
            }
        }
        "web-resource-name" => {
            if let Some(c) = p.constraint.as_mut() {
                c.web_resource_name = text.to_string();
            }
        }
        "http-method" => {
            if let Some(c) = p.constraint.as_mut() {
                c.http_methods.push(text.to_string());
            }
        }
        "role-name" => {
            if p.in_auth_constraint {
                if let Some(c) = p.constraint.as_mut() {
                    c.role_names.push(text.to_string());
                }
            } else if let Some(role) = p.role.as_mut() {
                role.role_name = text.to_string();
            }
        }
        "transport-guarantee" => {
            if let Some(c) = p.constraint.as_mut() {
                c.transport_guarantee = Some(text.to_string());
            }
        }
        "auth-method" => {
            if let Some(l) = p.login.as_mut() {
                l.auth_method = Some(text.to_string());
            }
        }
        "realm-name" => {
            if let Some(l) = p.login.as_mut() {
                l.realm_name = Some(text.to_string());
            }
        }
        "form-login-page" => {
            if let Some(l) = p.login.as_mut() {
                l.form_login_page = Some(text.to_string());
            }
        }
        "form-error-page" => {
            if let Some(l) = p.login.as_mut() {
                l.form_error_page = Some(text.to_string());
            }
        }
        _ => {}
    }
    Ok(())
}

fn commit(tag: &str, app: &mut WebApp, p: &mut Pending) {
    match tag {
        "context-param" => {
            if let Some(param) = p.param.take() {
                app.context_params.push(param);
            }
        }
        "init-param" => {
            if let Some(param) = p.param.take() {
                if let Some(s) = p.servlet.as_mut() {
                    s.init_params.push(param);
                } else if let Some(f) = p.filter.as_mut() {
                    f.init_params.push(param);
                }
            }
        }
        "servlet" => {
            if let Some(s) = p.servlet.take() {
                app.servlets.push(s);
            }
        }
        "servlet-mapping" => {
            if let Some(m) = p.servlet_mapping.take() {
                app.servlet_mappings.push(m);
            }
        }
        "filter" => {
            if let Some(f) = p.filter.take() {
                app.filters.push(f);
            }
        }
        "filter-mapping" => {
            if let Some(m) = p.filter_mapping.take() {
                app.filter_mappings.push(m);
            }
        }
        "listener" => {
            if let Some(class) = p.listener_class.take() {
                app.listeners.push(Listener { class_name: class });
            }
        }
        "session-config" => app.session_config = p.session.take(),
        "cookie-config" => p.in_cookie_config = false,
        "error-page" => {
            if let Some(page) = p.error_page.take() {
                app.error_pages.push(page);
            }
        }
        "mime-mapping" => {
            if let Some(m) = p.mime.take() {
                app.mime_mappings.push(m);
            }
        }
        "security-constraint" => {
            if let Some(c) = p.constraint.take() {
                app.security_constraints.push(c);
            }
        }
        "auth-constraint" => p.in_auth_constraint = false,
        "login-config" => app.login_config = p.login.take(),
        "security-role" => {
            if let Some(role) = p.role.take() {
                app.security_roles.push(role);
            }
        }
        _ => {}
    }
}

fn parse_i64(tag: &str, text: &str) -> RawResult<i64> {
    text.parse::<i64>()
        .map_err(|_| format!("<{tag}> is not an integer: '{text}'"))
}

fn parse_bool(tag: &str, text: &str) -> RawResult<bool> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("<{tag}> is not a boolean: '{other}'")),
    }
}

// --- serialization ---

const I1: &str = "    ";
const I2: &str = "        ";
const I3: &str = "            ";

pub(crate) fn serialize(app: &WebApp) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(LICENSE_BLOCK);
    out.push('\n');

    let mut root = String::from("<web-app");
    push_attr(&mut root, "xmlns", &app.xmlns);
    push_attr(&mut root, "xmlns:xsi", &app.xmlns_xsi);
    push_attr(&mut root, "xsi:schemaLocation", &app.schema_location);
    push_attr(&mut root, "version", &app.version);
    out.push_str(&root);
    out.push_str(">\n");

    if let Some(name) = &app.display_name {
        push_text_element(&mut out, I1, "display-name", name);
    }

    for param in &app.context_params {
        out.push_str(I1);
        out.push_str("<context-param>\n");
        write_param_body(&mut out, I2, param);
        out.push_str(I1);
        out.push_str("</context-param>\n");
    }

    for servlet in &app.servlets {
        out.push_str(I1);
        out.push_str("<servlet>\n");
        push_text_element(&mut out, I2, "servlet-name", &servlet.name);
        push_text_element(&mut out, I2, "servlet-class", &servlet.class_name);
        for param in &servlet.init_params {
            out.push_str(I2);
            out.push_str("<init-param>\n");
            write_param_body(&mut out, I3, param);
            out.push_str(I2);
            out.push_str("</init-param>\n");
        }
        if let Some(order) = servlet.load_on_startup {
            push_text_element(&mut out, I2, "load-on-startup", &order.to_string());
        }
        if let Some(async_supported) = servlet.async_supported {
            push_text_element(&mut out, I2, "async-supported", bool_str(async_supported));
        }
        out.push_str(I1);
        out.push_str("</servlet>\n");
    }

    for mapping in &app.servlet_mappings {
        out.push_str(I1);
        out.push_str("<servlet-mapping>\n");
        push_text_element(&mut out, I2, "servlet-name", &mapping.servlet_name);
        for pattern in &mapping.url_patterns {
            push_text_element(&mut out, I2, "url-pattern", pattern);
        }
        out.push_str(I1);
        out.push_str("</servlet-mapping>\n");
    }

    for filter in &app.filters {
        out.push_str(I1);
        out.push_str("<filter>\n");
        push_text_element(&mut out, I2, "filter-name", &filter.name);
        push_text_element(&mut out, I2, "filter-class", &filter.class_name);
        for param in &filter.init_params {
            out.push_str(I2);
            out.push_str("<init-param>\n");
            write_param_body(&mut out, I3, param);
            out.push_str(I2);
            out.push_str("</init-param>\n");
        }
        if let Some(async_supported) = filter.async_supported {
            push_text_element(&mut out, I2, "async-supported", bool_str(async_supported));
        }
        out.push_str(I1);
        out.push_str("</filter>\n");
    }

    for mapping in &app.filter_mappings {
        out.push_str(I1);
        out.push_str("<filter-mapping>\n");
        push_text_element(&mut out, I2, "filter-name", &mapping.filter_name);
        for pattern in &mapping.url_patterns {
            push_text_element(&mut out, I2, "url-pattern", pattern);
        }
        for dispatcher in &mapping.dispatchers {
            push_text_element(&mut out, I2, "dispatcher", dispatcher);
        }
        out.push_str(I1);
        out.push_str("</filter-mapping>\n");
    }

    for listener in &app.listeners {
        out.push_str(I1);
        out.push_str("<listener>\n");
        push_text_element(&mut out, I2, "listener-class", &listener.class_name);
        out.push_str(I1);
        out.push_str("</listener>\n");
    }

    if let Some(session) = &app.session_config {
        out.push_str(I1);
        out.push_str("<session-config>\n");
        if let Some(timeout) = session.session_timeout {
            push_text_element(&mut out, I2, "session-timeout", &timeout.to_string());
        }
        if session.cookie_http_only.is_some() || session.cookie_secure.is_some() {
            out.push_str(I2);
            out.push_str("<cookie-config>\n");
            if let Some(http_only) = session.cookie_http_only {
                push_text_element(&mut out, I3, "http-only", bool_str(http_only));
            }
            if let Some(secure) = session.cookie_secure {
                push_text_element(&mut out, I3, "secure", bool_str(secure));
            }
            out.push_str(I2);
            out.push_str("</cookie-config>\n");
        }
        if let Some(mode) = &session.tracking_mode {
            push_text_element(&mut out, I2, "tracking-mode", mode);
        }
        out.push_str(I1);
        out.push_str("</session-config>\n");
    }

    if !app.welcome_files.is_empty() {
        out.push_str(I1);
        out.push_str("<welcome-file-list>\n");
        for file in &app.welcome_files {
            push_text_element(&mut out, I2, "welcome-file", file);
        }
        out.push_str(I1);
        out.push_str("</welcome-file-list>\n");
    }

    for page in &app.error_pages {
        out.push_str(I1);
        out.push_str("<error-page>\n");
        if let Some(code) = page.error_code {
            push_text_element(&mut out, I2, "error-code", &code.to_string());
        }
        if let Some(exception) = &page.exception_type {
            push_text_element(&mut out, I2, "exception-type", exception);
        }
        push_text_element(&mut out, I2, "location", &page.location);
        out.push_str(I1);
        out.push_str("</error-page>\n");
    }

    for mapping in &app.mime_mappings {
        out.push_str(I1);
        out.push_str("<mime-mapping>\n");
        push_text_element(&mut out, I2, "extension", &mapping.extension);
        push_text_element(&mut out, I2, "mime-type", &mapping.mime_type);
        out.push_str(I1);
        out.push_str("</mime-mapping>\n");
    }

    for constraint in &app.security_constraints {
        out.push_str(I1);
        out.push_str("<security-constraint>\n");
        if let Some(name) = &constraint.display_name {
            push_text_element(&mut out, I2, "display-name", name);
        }
        out.push_str(I2);
        out.push_str("<web-resource-collection>\n");
        push_text_element(&mut out, I3, "web-resource-name", &constraint.web_resource_name);
        for pattern in &constraint.url_patterns {
            push_text_element(&mut out, I3, "url-pattern", pattern);
        }
        for method in &constraint.http_methods {
            push_text_element(&mut out, I3, "http-method", method);
        }
        out.push_str(I2);
        out.push_str("</web-resource-collection>\n");
        if constraint.has_auth_constraint {
            if constraint.role_names.is_empty() {
                out.push_str(I2);
                out.push_str("<auth-constraint/>\n");
            } else {
                out.push_str(I2);
                out.push_str("<auth-constraint>\n");
                for role in &constraint.role_names {
                    push_text_element(&mut out, I3, "role-name", role);
                }
                out.push_str(I2);
                out.push_str("</auth-constraint>\n");
            }
        }
        if let Some(guarantee) = &constraint.transport_guarantee {
            out.push_str(I2);
            out.push_str("<user-data-constraint>\n");
            push_text_element(&mut out, I3, "transport-guarantee", guarantee);
            out.push_str(I2);
            out.push_str("</user-data-constraint>\n");
        }
        out.push_str(I1);
        out.push_str("</security-constraint>\n");
    }

    if let Some(login) = &app.login_config {
        out.push_str(I1);
        out.push_str("<login-config>\n");
        if let Some(method) = &login.auth_method {
            push_text_element(&mut out, I2, "auth-method", method);
        }
        if let Some(realm) = &login.realm_name {
            push_text_element(&mut out, I2, "realm-name", realm);
        }
        if login.form_login_page.is_some() || login.form_error_page.is_some() {
            out.push_str(I2);
            out.push_str("<form-login-config>\n");
            if let Some(page) = &login.form_login_page {
                push_text_element(&mut out, I3, "form-login-page", page);
            }
            if let Some(page) = &login.form_error_page {
                push_text_element(&mut out, I3, "form-error-page", page);
            }
            out.push_str(I2);
            out.push_str("</form-login-config>\n");
        }
        out.push_str(I1);
        out.push_str("</login-config>\n");
    }

    for role in &app.security_roles {
        out.push_str(I1);
        out.push_str("<security-role>\n");
        if let Some(description) = &role.description {
            push_text_element(&mut out, I2, "description", description);
        }
        push_text_element(&mut out, I2, "role-name", &role.role_name);
        out.push_str(I1);
        out.push_str("</security-role>\n");
    }

    out.push_str("</web-app>\n");
    out
}

fn write_param_body(out: &mut String, indent: &str, param: &InitParam) {
    push_text_element(out, indent, "param-name", &param.name);
    push_text_element(out, indent, "param-value", &param.value);
    if let Some(description) = &param.description {
        push_text_element(out, indent, "description", description);
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("/tmp/test/conf/web.xml")
    }

    fn sample() -> WebApp {
        let mut app = WebApp::default();
        app.display_name = Some("Default".into());
        app.context_params.push(InitParam::new("company", "ACME"));

        let mut servlet = Servlet::new("dispatcher", "com.example.Dispatcher");
        servlet.init_params.push(InitParam::new("configFile", "/WEB-INF/app.conf"));
        servlet.load_on_startup = Some(1);
        app.servlets.push(servlet);
        app.servlet_mappings.push(ServletMapping::new("dispatcher", "/api/*"));

        let mut filter = Filter::new("audit", "com.example.AuditFilter");
        filter.async_supported = Some(false);
        app.filters.push(filter);
        let mut fm = FilterMapping::new("audit", "/*");
        fm.dispatchers.push("REQUEST".into());
        fm.dispatchers.push("FORWARD".into());
        app.filter_mappings.push(fm);

        app.listeners.push(Listener::new("com.example.StartupListener"));
        app.error_pages.push(ErrorPage {
            error_code: Some(404),
            exception_type: None,
            location: "/404.html".into(),
        });
        app.mime_mappings.push(MimeMapping::new("wasm", "application/wasm"));
        app.security_constraints.push(SecurityConstraint {
            display_name: None,
            web_resource_name: "Admin".into(),
            url_patterns: vec!["/admin/*".into()],
            http_methods: vec!["GET".into(), "POST".into()],
            role_names: vec!["admin".into()],
            has_auth_constraint: true,
            transport_guarantee: Some("CONFIDENTIAL".into()),
        });
        app.login_config = Some(LoginConfig {
            auth_method: Some("FORM".into()),
            realm_name: None,
            form_login_page: Some("/login.jsp".into()),
            form_error_page: Some("/login-error.jsp".into()),
        });
        app.security_roles.push(SecurityRole::new("admin"));
        app
    }

    #[test]
    fn serialize_emits_declaration_and_license_block() {
        let out = serialize(&WebApp::default());
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!--\n"));
        assert!(out.contains("http://www.apache.org/licenses/LICENSE-2.0"));
        assert!(out.contains("<web-app xmlns=\"http://xmlns.jcp.org/xml/ns/javaee\""));
    }

    #[test]
    fn serialize_uses_four_space_indent() {
        let out = serialize(&WebApp::default());
        assert!(out.contains("    <welcome-file-list>\n"));
        assert!(out.contains("        <welcome-file>index.html</welcome-file>\n"));
        assert!(out.contains("        <session-timeout>30</session-timeout>\n"));
    }

    #[test]
    fn round_trip_default_descriptor() {
        let app = WebApp::default();
        let reparsed = parse(&serialize(&app), &path()).unwrap();
        assert_eq!(reparsed, app);
    }

    #[test]
    fn round_trip_populated_descriptor() {
        let app = sample();
        let reparsed = parse(&serialize(&app), &path()).unwrap();
        assert_eq!(reparsed, app);
    }

    #[test]
    fn round_trip_preserves_false_values() {
        let mut app = WebApp::default();
        let mut servlet = Servlet::new("s", "c.S");
        servlet.async_supported = Some(false);
        servlet.load_on_startup = Some(0);
        app.servlets.push(servlet);
        app.session_config.as_mut().unwrap().cookie_secure = Some(false);

        let reparsed = parse(&serialize(&app), &path()).unwrap();
        assert_eq!(reparsed, app);
    }

    #[test]
    fn parses_deny_all_auth_constraint() {
        let doc = r#"<web-app version="4.0">
    <security-constraint>
        <web-resource-collection>
            <web-resource-name>Everything</web-resource-name>
            <url-pattern>/*</url-pattern>
        </web-resource-collection>
        <auth-constraint/>
    </security-constraint>
</web-app>"#;
        let app = parse(doc, &path()).unwrap();
        let c = &app.security_constraints[0];
        assert!(c.has_auth_constraint);
        assert!(c.role_names.is_empty());
    }

    #[test]
    fn distinguishes_servlet_name_in_mapping_and_declaration() {
        let doc = r#"<web-app version="4.0">
    <servlet>
        <servlet-name>jsp</servlet-name>
        <servlet-class>org.apache.jasper.servlet.JspServlet</servlet-class>
    </servlet>
    <servlet-mapping>
        <servlet-name>jsp</servlet-name>
        <url-pattern>*.jsp</url-pattern>
        <url-pattern>*.jspx</url-pattern>
    </servlet-mapping>
</web-app>"#;
        let app = parse(doc, &path()).unwrap();
        assert_eq!(app.servlets[0].name, "jsp");
        assert_eq!(app.servlet_mappings[0].servlet_name, "jsp");
        assert_eq!(app.servlet_mappings[0].url_patterns, ["*.jsp", "*.jspx"]);
    }

    #[test]
    fn constraint_display_name_does_not_clobber_app_display_name() {
        let doc = r#"<web-app version="4.0">
    <display-name>App</display-name>
    <security-constraint>
        <display-name>Lockdown</display-name>
        <web-resource-collection>
            <web-resource-name>All</web-resource-name>
        </web-resource-collection>
    </security-constraint>
</web-app>"#;
        let app = parse(doc, &path()).unwrap();
        assert_eq!(app.display_name.as_deref(), Some("App"));
        assert_eq!(
            app.security_constraints[0].display_name.as_deref(),
            Some("Lockdown")
        );
    }

    #[test]
    fn bad_session_timeout_is_a_parse_error() {
        let doc = r#"<web-app version="4.0">
    <session-config><session-timeout>soon</session-timeout></session-config>
</web-app>"#;
        let err = parse(doc, &path()).unwrap_err();
        assert!(err.to_string().contains("session-timeout"));
    }

    #[test]
    fn missing_root_is_a_parse_error() {
        let err = parse("<Context/>", &path()).unwrap_err();
        assert!(err.to_string().contains("web-app"));
    }

    #[test]
    fn escapes_text_content() {
        let mut app = WebApp::empty();
        app.context_params
            .push(InitParam::new("query", "a < b && c > d"));
        let out = serialize(&app);
        assert!(out.contains("a &lt; b &amp;&amp; c &gt; d"));
        let reparsed = parse(&out, &path()).unwrap();
        assert_eq!(reparsed.context_params[0].value, "a < b && c > d");
    }
}
