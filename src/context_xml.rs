//! The `context.xml` codec: event-driven parse, hand-written serialize.
//!
//! Output follows the layout Tomcat ships — XML declaration, one-line ASF
//! license comment, `<Context>` body at 2-space indentation. Attribute order
//! is fixed by the emit code, and unset `Option` attributes are omitted
//! entirely rather than written with default values.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::context::{
    Context, CookieProcessor, Environment, JarScanner, Loader, Manager, Parameter, Resource,
    ResourceLink, SessionStore, Valve,
};
use crate::error::{Result, TomcatKitError};
use crate::xml::{
    RawResult, all_attrs, attr, attr_bool, attr_i64, local_name_as_str, push_attr, push_attr_bool,
    push_attr_i64, push_attr_opt, xml_escape,
};

const LICENSE_COMMENT: &str = "<!-- Licensed to the Apache Software Foundation (ASF) under one \
or more contributor license agreements. See the NOTICE file distributed with this work for \
additional information regarding copyright ownership. -->";

pub(crate) fn parse(text: &str, path: &Path) -> Result<Context> {
    parse_inner(text).map_err(|reason| TomcatKitError::Parse {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_inner(text: &str) -> RawResult<Context> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut ctx = Context::default();
    let mut seen_root = false;
    let mut in_manager = false;
    let mut active_tag: Option<String> = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(ref e) => {
                let name = e.local_name();
                let tag = local_name_as_str(&name).to_string();
                match tag.as_str() {
                    "Context" => {
                        seen_root = true;
                        read_context_attrs(e, &mut ctx)?;
                    }
                    "WatchedResource" => active_tag = Some(tag),
                    "Manager" => {
                        ctx.manager = Some(read_manager(e)?);
                        in_manager = true;
                    }
                    _ => read_child(e, &mut ctx, in_manager)?,
                }
            }
            Event::Empty(ref e) => {
                let name = e.local_name();
                let tag = local_name_as_str(&name).to_string();
                match tag.as_str() {
                    "Context" => {
                        seen_root = true;
                        read_context_attrs(e, &mut ctx)?;
                    }
                    "Manager" => ctx.manager = Some(read_manager(e)?),
                    _ => read_child(e, &mut ctx, in_manager)?,
                }
            }
            Event::Text(e) => {
                if active_tag.as_deref() == Some("WatchedResource") {
                    let text = e.unescape().map_err(|err| err.to_string())?;
                    ctx.watched_resources.push(text.trim().to_string());
                }
            }
            Event::End(ref e) => {
                let name = e.local_name();
                if local_name_as_str(&name) == "Manager" {
                    in_manager = false;
                }
                active_tag = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err("no <Context> root element".to_string());
    }
    Ok(ctx)
}

fn read_context_attrs(e: &BytesStart, ctx: &mut Context) -> RawResult<()> {
    ctx.path = attr(e, "path")?;
    ctx.doc_base = attr(e, "docBase")?;
    ctx.reloadable = attr_bool(e, "reloadable")?;
    ctx.cross_context = attr_bool(e, "crossContext")?;
    ctx.privileged = attr_bool(e, "privileged")?;
    ctx.use_http_only = attr_bool(e, "useHttpOnly")?;
    ctx.session_cookie_name = attr(e, "sessionCookieName")?;
    ctx.cache_max_size = attr_i64(e, "cacheMaxSize")?;
    Ok(())
}

fn read_child(e: &BytesStart, ctx: &mut Context, in_manager: bool) -> RawResult<()> {
    let name = e.local_name();
    match local_name_as_str(&name) {
        "Resource" => ctx.resources.push(read_resource(e)?),
        "Environment" => ctx.environments.push(read_environment(e)?),
        "ResourceLink" => ctx.resource_links.push(read_resource_link(e)?),
        "Parameter" => ctx.parameters.push(read_parameter(e)?),
        "Valve" => ctx.valves.push(read_valve(e)?),
        "Loader" => {
            ctx.loader = Some(Loader {
                class_name: attr(e, "className")?,
                delegate: attr_bool(e, "delegate")?,
                reloadable: attr_bool(e, "reloadable")?,
            });
        }
        "JarScanner" => {
            ctx.jar_scanner = Some(JarScanner {
                class_name: attr(e, "className")?,
                scan_class_path: attr_bool(e, "scanClassPath")?,
                scan_manifest: attr_bool(e, "scanManifest")?,
            });
        }
        "CookieProcessor" => {
            ctx.cookie_processor = Some(CookieProcessor {
                class_name: attr(e, "className")?,
                same_site_cookies: attr(e, "sameSiteCookies")?,
            });
        }
        "Store" if in_manager => {
            if let Some(manager) = ctx.manager.as_mut() {
                manager.store = Some(SessionStore {
                    class_name: attr(e, "className")?.unwrap_or_default(),
                    directory: attr(e, "directory")?,
                });
            }
        }
        // Unknown elements are skipped; this tool edits a fixed subset.
        _ => {}
    }
    Ok(())
}

fn read_manager(e: &BytesStart) -> RawResult<Manager> {
    Ok(Manager {
        class_name: attr(e, "className")?,
        pathname: attr(e, "pathname")?,
        store: None,
    })
}

fn read_resource(e: &BytesStart) -> RawResult<Resource> {
    Ok(Resource {
        name: attr(e, "name")?.unwrap_or_default(),
        auth: attr(e, "auth")?,
        type_name: attr(e, "type")?,
        description: attr(e, "description")?,
        factory: attr(e, "factory")?,
        driver_class_name: attr(e, "driverClassName")?,
        url: attr(e, "url")?,
        username: attr(e, "username")?,
        password: attr(e, "password")?,
        max_total: attr_i64(e, "maxTotal")?,
        max_idle: attr_i64(e, "maxIdle")?,
        min_idle: attr_i64(e, "minIdle")?,
        max_wait_millis: attr_i64(e, "maxWaitMillis")?,
        test_on_borrow: attr_bool(e, "testOnBorrow")?,
        validation_query: attr(e, "validationQuery")?,
        mail_smtp_host: attr(e, "mail.smtp.host")?,
        pathname: attr(e, "pathname")?,
        readonly: attr_bool(e, "readonly")?,
    })
}

fn read_environment(e: &BytesStart) -> RawResult<Environment> {
    Ok(Environment {
        name: attr(e, "name")?.unwrap_or_default(),
        value: attr(e, "value")?.unwrap_or_default(),
        type_name: attr(e, "type")?,
        description: attr(e, "description")?,
        override_allowed: attr_bool(e, "override")?,
    })
}

fn read_resource_link(e: &BytesStart) -> RawResult<ResourceLink> {
    Ok(ResourceLink {
        name: attr(e, "name")?.unwrap_or_default(),
        global: attr(e, "global")?.unwrap_or_default(),
        type_name: attr(e, "type")?,
    })
}

fn read_parameter(e: &BytesStart) -> RawResult<Parameter> {
    Ok(Parameter {
        name: attr(e, "name")?.unwrap_or_default(),
        value: attr(e, "value")?.unwrap_or_default(),
        description: attr(e, "description")?,
        override_allowed: attr_bool(e, "override")?,
    })
}

fn read_valve(e: &BytesStart) -> RawResult<Valve> {
    let mut valve = Valve::default();
    for (name, value) in all_attrs(e)? {
        if name == "className" {
            valve.class_name = value;
        } else {
            valve.attributes.push((name, value));
        }
    }
    Ok(valve)
}

// --- serialization ---

pub(crate) fn serialize(ctx: &Context) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(LICENSE_COMMENT);
    out.push('\n');

    let mut root = String::from("<Context");
    push_attr_opt(&mut root, "path", ctx.path.as_deref());
    push_attr_opt(&mut root, "docBase", ctx.doc_base.as_deref());
    push_attr_bool(&mut root, "reloadable", ctx.reloadable);
    push_attr_bool(&mut root, "crossContext", ctx.cross_context);
    push_attr_bool(&mut root, "privileged", ctx.privileged);
    push_attr_bool(&mut root, "useHttpOnly", ctx.use_http_only);
    push_attr_opt(&mut root, "sessionCookieName", ctx.session_cookie_name.as_deref());
    push_attr_i64(&mut root, "cacheMaxSize", ctx.cache_max_size);

    let body = serialize_children(ctx);
    if body.is_empty() {
        out.push_str(&root);
        out.push_str("/>\n");
    } else {
        out.push_str(&root);
        out.push_str(">\n");
        out.push_str(&body);
        out.push_str("</Context>\n");
    }
    out
}

fn serialize_children(ctx: &Context) -> String {
    let mut out = String::new();

    for watched in &ctx.watched_resources {
        out.push_str("  <WatchedResource>");
        out.push_str(&xml_escape(watched));
        out.push_str("</WatchedResource>\n");
    }

    for resource in &ctx.resources {
        let mut e = String::from("  <Resource");
        push_attr(&mut e, "name", &resource.name);
        push_attr_opt(&mut e, "auth", resource.auth.as_deref());
        push_attr_opt(&mut e, "type", resource.type_name.as_deref());
        push_attr_opt(&mut e, "description", resource.description.as_deref());
        push_attr_opt(&mut e, "factory", resource.factory.as_deref());
        push_attr_opt(&mut e, "driverClassName", resource.driver_class_name.as_deref());
        push_attr_opt(&mut e, "url", resource.url.as_deref());
        push_attr_opt(&mut e, "username", resource.username.as_deref());
        push_attr_opt(&mut e, "password", resource.password.as_deref());
        push_attr_i64(&mut e, "maxTotal", resource.max_total);
        push_attr_i64(&mut e, "maxIdle", resource.max_idle);
        push_attr_i64(&mut e, "minIdle", resource.min_idle);
        push_attr_i64(&mut e, "maxWaitMillis", resource.max_wait_millis);
        push_attr_bool(&mut e, "testOnBorrow", resource.test_on_borrow);
        push_attr_opt(&mut e, "validationQuery", resource.validation_query.as_deref());
        push_attr_opt(&mut e, "mail.smtp.host", resource.mail_smtp_host.as_deref());
        push_attr_opt(&mut e, "pathname", resource.pathname.as_deref());
        push_attr_bool(&mut e, "readonly", resource.readonly);
        e.push_str("/>\n");
        out.push_str(&e);
    }

    for env in &ctx.environments {
        let mut e = String::from("  <Environment");
        push_attr(&mut e, "name", &env.name);
        push_attr(&mut e, "value", &env.value);
        push_attr_opt(&mut e, "type", env.type_name.as_deref());
        push_attr_opt(&mut e, "description", env.description.as_deref());
        push_attr_bool(&mut e, "override", env.override_allowed);
        e.push_str("/>\n");
        out.push_str(&e);
    }

    for link in &ctx.resource_links {
        let mut e = String::from("  <ResourceLink");
        push_attr(&mut e, "name", &link.name);
        push_attr(&mut e, "global", &link.global);
        push_attr_opt(&mut e, "type", link.type_name.as_deref());
        e.push_str("/>\n");
        out.push_str(&e);
    }

    for param in &ctx.parameters {
        let mut e = String::from("  <Parameter");
        push_attr(&mut e, "name", &param.name);
        push_attr(&mut e, "value", &param.value);
        push_attr_opt(&mut e, "description", param.description.as_deref());
        push_attr_bool(&mut e, "override", param.override_allowed);
        e.push_str("/>\n");
        out.push_str(&e);
    }

    if let Some(manager) = &ctx.manager {
        let mut e = String::from("  <Manager");
        push_attr_opt(&mut e, "className", manager.class_name.as_deref());
        push_attr_opt(&mut e, "pathname", manager.pathname.as_deref());
        match &manager.store {
            Some(store) => {
                e.push_str(">\n    <Store");
                push_attr(&mut e, "className", &store.class_name);
                push_attr_opt(&mut e, "directory", store.directory.as_deref());
                e.push_str("/>\n  </Manager>\n");
            }
            None => e.push_str("/>\n"),
        }
        out.push_str(&e);
    }

    if let Some(loader) = &ctx.loader {
        let mut e = String::from("  <Loader");
        push_attr_opt(&mut e, "className", loader.class_name.as_deref());
        push_attr_bool(&mut e, "delegate", loader.delegate);
        push_attr_bool(&mut e, "reloadable", loader.reloadable);
        e.push_str("/>\n");
        out.push_str(&e);
    }

    if let Some(scanner) = &ctx.jar_scanner {
        let mut e = String::from("  <JarScanner");
        push_attr_opt(&mut e, "className", scanner.class_name.as_deref());
        push_attr_bool(&mut e, "scanClassPath", scanner.scan_class_path);
        push_attr_bool(&mut e, "scanManifest", scanner.scan_manifest);
        e.push_str("/>\n");
        out.push_str(&e);
    }

    if let Some(processor) = &ctx.cookie_processor {
        let mut e = String::from("  <CookieProcessor");
        push_attr_opt(&mut e, "className", processor.class_name.as_deref());
        push_attr_opt(&mut e, "sameSiteCookies", processor.same_site_cookies.as_deref());
        e.push_str("/>\n");
        out.push_str(&e);
    }

    for valve in &ctx.valves {
        let mut e = String::from("  <Valve");
        push_attr(&mut e, "className", &valve.class_name);
        for (name, value) in &valve.attributes {
            push_attr(&mut e, name, value);
        }
        e.push_str("/>\n");
        out.push_str(&e);
    }

    out
}
