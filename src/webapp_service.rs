//! Load/mutate/save service for `conf/web.xml`.
//!
//! Same shape as [`ContextService`](crate::ContextService), with two
//! differences the descriptor forces: deleting a servlet or filter cascades
//! to its mappings (a dangling `<servlet-mapping>` makes Tomcat refuse the
//! descriptor), and backups are timestamped rather than rolling, since
//! web.xml edits are riskier and earlier revisions stay recoverable.

use std::path::{Path, PathBuf};

use log::debug;

use crate::backup::backup_timestamped;
use crate::error::{Result, TomcatKitError};
use crate::keyed;
use crate::webapp::{
    ErrorPage, Filter, FilterMapping, InitParam, Listener, LoginConfig, MimeMapping,
    SecurityConstraint, SecurityRole, Servlet, ServletMapping, SessionConfig, WebApp,
};
use crate::webapp_xml;

pub struct WebAppService {
    base: PathBuf,
    app: Option<WebApp>,
}

impl WebAppService {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        WebAppService {
            base: base.into(),
            app: None,
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.base.join("conf").join("web.xml")
    }

    /// Read `conf/web.xml`, or start from the stock javaee 4.0 descriptor
    /// when the file does not exist.
    pub fn load(&mut self) -> Result<&WebApp> {
        let path = self.file_path();
        let app = match std::fs::read_to_string(&path) {
            Ok(text) => webapp_xml::parse(&text, &path)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, starting from defaults", path.display());
                WebApp::default()
            }
            Err(e) => return Err(TomcatKitError::io(&path, e)),
        };
        Ok(self.app.insert(app))
    }

    /// Back up the existing file (if any) under a timestamped name and write
    /// the current model. Errors if never loaded or mutated.
    pub fn save(&self) -> Result<()> {
        let Some(app) = &self.app else {
            return Err(TomcatKitError::NotLoaded { file: "web.xml" });
        };
        let path = self.file_path();
        backup_timestamped(&path)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TomcatKitError::io(parent, e))?;
        }
        std::fs::write(&path, webapp_xml::serialize(app))
            .map_err(|e| TomcatKitError::io(&path, e))?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    pub fn web_app(&self) -> Option<&WebApp> {
        self.app.as_ref()
    }

    fn app_mut(&mut self) -> &mut WebApp {
        self.app.get_or_insert_with(WebApp::empty)
    }

    // --- servlets ---

    pub fn servlets(&self) -> &[Servlet] {
        self.app.as_ref().map_or(&[], |a| &a.servlets)
    }

    pub fn get_servlet(&self, name: &str) -> Option<&Servlet> {
        keyed::get(self.servlets(), name, |s| &s.name)
    }

    pub fn add_servlet(&mut self, servlet: Servlet) -> Result<()> {
        keyed::add(&mut self.app_mut().servlets, servlet, |s| &s.name, "servlet")
    }

    pub fn update_servlet(&mut self, servlet: Servlet) -> Result<()> {
        keyed::update(&mut self.app_mut().servlets, servlet, |s| &s.name, "servlet")
    }

    /// Delete a servlet and every mapping that references it by name.
    pub fn delete_servlet(&mut self, name: &str) -> Result<()> {
        let app = self.app_mut();
        keyed::remove(&mut app.servlets, name, |s| &s.name, "servlet")?;
        app.servlet_mappings.retain(|m| m.servlet_name != name);
        Ok(())
    }

    pub fn servlet_mappings(&self) -> &[ServletMapping] {
        self.app.as_ref().map_or(&[], |a| &a.servlet_mappings)
    }

    pub fn add_servlet_mapping(&mut self, mapping: ServletMapping) {
        self.app_mut().servlet_mappings.push(mapping);
    }

    pub fn delete_servlet_mapping(&mut self, index: usize) -> Result<()> {
        keyed::remove_at(&mut self.app_mut().servlet_mappings, index, "servlet mapping")?;
        Ok(())
    }

    // --- filters ---

    pub fn filters(&self) -> &[Filter] {
        self.app.as_ref().map_or(&[], |a| &a.filters)
    }

    pub fn get_filter(&self, name: &str) -> Option<&Filter> {
        keyed::get(self.filters(), name, |f| &f.name)
    }

    pub fn add_filter(&mut self, filter: Filter) -> Result<()> {
        keyed::add(&mut self.app_mut().filters, filter, |f| &f.name, "filter")
    }

    pub fn update_filter(&mut self, filter: Filter) -> Result<()> {
        keyed::update(&mut self.app_mut().filters, filter, |f| &f.name, "filter")
    }

    /// Delete a filter and every mapping that references it by name.
    pub fn delete_filter(&mut self, name: &str) -> Result<()> {
        let app = self.app_mut();
        keyed::remove(&mut app.filters, name, |f| &f.name, "filter")?;
        app.filter_mappings.retain(|m| m.filter_name != name);
        Ok(())
    }

    pub fn filter_mappings(&self) -> &[FilterMapping] {
        self.app.as_ref().map_or(&[], |a| &a.filter_mappings)
    }

    pub fn add_filter_mapping(&mut self, mapping: FilterMapping) {
        self.app_mut().filter_mappings.push(mapping);
    }

    pub fn delete_filter_mapping(&mut self, index: usize) -> Result<()> {
        keyed::remove_at(&mut self.app_mut().filter_mappings, index, "filter mapping")?;
        Ok(())
    }

    // --- listeners ---

    pub fn listeners(&self) -> &[Listener] {
        self.app.as_ref().map_or(&[], |a| &a.listeners)
    }

    pub fn add_listener(&mut self, listener: Listener) {
        self.app_mut().listeners.push(listener);
    }

    pub fn delete_listener(&mut self, index: usize) -> Result<()> {
        keyed::remove_at(&mut self.app_mut().listeners, index, "listener")?;
        Ok(())
    }

    // --- context params ---

    pub fn context_params(&self) -> &[InitParam] {
        self.app.as_ref().map_or(&[], |a| &a.context_params)
    }

    pub fn get_context_param(&self, name: &str) -> Option<&InitParam> {
        keyed::get(self.context_params(), name, |p| &p.name)
    }

    pub fn add_context_param(&mut self, param: InitParam) -> Result<()> {
        keyed::add(&mut self.app_mut().context_params, param, |p| &p.name, "context parameter")
    }

    pub fn update_context_param(&mut self, param: InitParam) -> Result<()> {
        keyed::update(&mut self.app_mut().context_params, param, |p| &p.name, "context parameter")
    }

    pub fn delete_context_param(&mut self, name: &str) -> Result<()> {
        keyed::remove(&mut self.app_mut().context_params, name, |p| &p.name, "context parameter")?;
        Ok(())
    }

    // --- welcome files ---

    pub fn welcome_files(&self) -> &[String] {
        self.app.as_ref().map_or(&[], |a| &a.welcome_files)
    }

    pub fn add_welcome_file(&mut self, file: impl Into<String>) -> Result<()> {
        keyed::add(
            &mut self.app_mut().welcome_files,
            file.into(),
            |f| f.as_str(),
            "welcome file",
        )
    }

    pub fn delete_welcome_file(&mut self, file: &str) -> Result<()> {
        keyed::remove(&mut self.app_mut().welcome_files, file, |f| f.as_str(), "welcome file")?;
        Ok(())
    }

    // --- mime mappings (keyed by extension) ---

    pub fn mime_mappings(&self) -> &[MimeMapping] {
        self.app.as_ref().map_or(&[], |a| &a.mime_mappings)
    }

    pub fn get_mime_mapping(&self, extension: &str) -> Option<&MimeMapping> {
        keyed::get(self.mime_mappings(), extension, |m| &m.extension)
    }

    pub fn add_mime_mapping(&mut self, mapping: MimeMapping) -> Result<()> {
        keyed::add(&mut self.app_mut().mime_mappings, mapping, |m| &m.extension, "MIME mapping")
    }

    pub fn update_mime_mapping(&mut self, mapping: MimeMapping) -> Result<()> {
        keyed::update(&mut self.app_mut().mime_mappings, mapping, |m| &m.extension, "MIME mapping")
    }

    pub fn delete_mime_mapping(&mut self, extension: &str) -> Result<()> {
        keyed::remove(&mut self.app_mut().mime_mappings, extension, |m| &m.extension, "MIME mapping")?;
        Ok(())
    }

    // --- error pages (positional) ---

    pub fn error_pages(&self) -> &[ErrorPage] {
        self.app.as_ref().map_or(&[], |a| &a.error_pages)
    }

    pub fn add_error_page(&mut self, page: ErrorPage) {
        self.app_mut().error_pages.push(page);
    }

    pub fn update_error_page(&mut self, index: usize, page: ErrorPage) -> Result<()> {
        keyed::replace_at(&mut self.app_mut().error_pages, index, page, "error page")
    }

    pub fn delete_error_page(&mut self, index: usize) -> Result<()> {
        keyed::remove_at(&mut self.app_mut().error_pages, index, "error page")?;
        Ok(())
    }

    // --- security constraints (positional) ---

    pub fn security_constraints(&self) -> &[SecurityConstraint] {
        self.app.as_ref().map_or(&[], |a| &a.security_constraints)
    }

    pub fn add_security_constraint(&mut self, constraint: SecurityConstraint) {
        self.app_mut().security_constraints.push(constraint);
    }

    pub fn update_security_constraint(
        &mut self,
        index: usize,
        constraint: SecurityConstraint,
    ) -> Result<()> {
        keyed::replace_at(
            &mut self.app_mut().security_constraints,
            index,
            constraint,
            "security constraint",
        )
    }

    pub fn delete_security_constraint(&mut self, index: usize) -> Result<()> {
        keyed::remove_at(&mut self.app_mut().security_constraints, index, "security constraint")?;
        Ok(())
    }

    // --- security roles ---

    pub fn security_roles(&self) -> &[SecurityRole] {
        self.app.as_ref().map_or(&[], |a| &a.security_roles)
    }

    pub fn add_security_role(&mut self, role: SecurityRole) -> Result<()> {
        keyed::add(&mut self.app_mut().security_roles, role, |r| &r.role_name, "security role")
    }

    pub fn delete_security_role(&mut self, role_name: &str) -> Result<()> {
        keyed::remove(
            &mut self.app_mut().security_roles,
            role_name,
            |r| &r.role_name,
            "security role",
        )?;
        Ok(())
    }

    // --- optional singletons ---

    pub fn session_config(&self) -> Option<&SessionConfig> {
        self.app.as_ref().and_then(|a| a.session_config.as_ref())
    }

    pub fn set_session_config(&mut self, config: SessionConfig) {
        self.app_mut().session_config = Some(config);
    }

    pub fn remove_session_config(&mut self) {
        self.app_mut().session_config = None;
    }

    pub fn login_config(&self) -> Option<&LoginConfig> {
        self.app.as_ref().and_then(|a| a.login_config.as_ref())
    }

    pub fn set_login_config(&mut self, config: LoginConfig) {
        self.app_mut().login_config = Some(config);
    }

    pub fn remove_login_config(&mut self) {
        self.app_mut().login_config = None;
    }

    /// Direct mutable access to the aggregate.
    pub fn edit(&mut self) -> &mut WebApp {
        self.app_mut()
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> WebAppService {
        WebAppService::new(dir.path())
    }

    // --- load defaults ---

    #[test]
    fn load_missing_file_yields_stock_descriptor() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        let app = svc.load().unwrap();
        assert_eq!(app.version, "4.0");
        assert_eq!(app.welcome_files.len(), 3);
        assert_eq!(
            app.session_config.as_ref().unwrap().session_timeout,
            Some(30)
        );
    }

    #[test]
    fn defaulting_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut a = service(&dir);
        let mut b = service(&dir);
        assert_eq!(a.load().unwrap(), b.load().unwrap());
    }

    // --- save + backup ---

    #[test]
    fn save_before_load_errors() {
        let dir = TempDir::new().unwrap();
        let err = service(&dir).save().unwrap_err();
        assert!(matches!(err, TomcatKitError::NotLoaded { .. }));
    }

    #[test]
    fn save_round_trips_through_load() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.load().unwrap();
        svc.add_servlet(Servlet::new("dispatcher", "com.example.Dispatcher"))
            .unwrap();
        svc.add_servlet_mapping(ServletMapping::new("dispatcher", "/api/*"));
        svc.save().unwrap();

        let mut fresh = service(&dir);
        fresh.load().unwrap();
        assert_eq!(fresh.web_app(), svc.web_app());
    }

    #[test]
    fn save_writes_timestamped_backup_of_previous_contents() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.load().unwrap();
        svc.save().unwrap();
        let original = fs::read_to_string(svc.file_path()).unwrap();

        svc.add_security_role(SecurityRole::new("admin")).unwrap();
        svc.save().unwrap();

        let backups: Vec<_> = fs::read_dir(dir.path().join("conf/backup"))
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(backups.len(), 1);
        let name = backups[0].file_name().to_string_lossy().into_owned();
        assert!(name.starts_with("web.xml."));
        assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), original);
    }

    #[test]
    fn first_save_produces_no_backup() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.load().unwrap();
        svc.save().unwrap();
        assert!(!dir.path().join("conf/backup").exists());
    }

    // --- cascade deletion ---

    #[test]
    fn deleting_servlet_cascades_to_its_mappings() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_servlet(Servlet::new("a", "c.A")).unwrap();
        svc.add_servlet(Servlet::new("b", "c.B")).unwrap();
        svc.add_servlet_mapping(ServletMapping::new("a", "/a/*"));
        svc.add_servlet_mapping(ServletMapping::new("b", "/b/*"));
        svc.add_servlet_mapping(ServletMapping::new("a", "/alias/*"));

        svc.delete_servlet("a").unwrap();

        assert!(svc.get_servlet("a").is_none());
        assert_eq!(svc.servlet_mappings().len(), 1);
        assert_eq!(svc.servlet_mappings()[0].servlet_name, "b");
    }

    #[test]
    fn deleting_filter_cascades_to_its_mappings() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_filter(Filter::new("audit", "c.Audit")).unwrap();
        svc.add_filter(Filter::new("gzip", "c.Gzip")).unwrap();
        svc.add_filter_mapping(FilterMapping::new("audit", "/*"));
        svc.add_filter_mapping(FilterMapping::new("gzip", "/static/*"));

        svc.delete_filter("audit").unwrap();

        assert!(svc.get_filter("audit").is_none());
        assert_eq!(svc.filter_mappings().len(), 1);
        assert_eq!(svc.filter_mappings()[0].filter_name, "gzip");
    }

    #[test]
    fn deleting_missing_servlet_leaves_mappings_alone() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_servlet_mapping(ServletMapping::new("ghost", "/g/*"));

        let err = svc.delete_servlet("ghost").unwrap_err();
        assert!(matches!(err, TomcatKitError::NotFound { .. }));
        assert_eq!(svc.servlet_mappings().len(), 1);
    }

    // --- uniqueness ---

    #[test]
    fn duplicate_servlet_rejected() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_servlet(Servlet::new("s", "c.S")).unwrap();
        let err = svc.add_servlet(Servlet::new("s", "c.Other")).unwrap_err();
        assert!(matches!(err, TomcatKitError::Duplicate { .. }));
        assert_eq!(svc.servlets().len(), 1);
        assert_eq!(svc.servlets()[0].class_name, "c.S");
    }

    #[test]
    fn duplicate_mime_extension_rejected() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_mime_mapping(MimeMapping::new("json", "application/json"))
            .unwrap();
        let err = svc
            .add_mime_mapping(MimeMapping::new("json", "text/json"))
            .unwrap_err();
        assert!(matches!(err, TomcatKitError::Duplicate { .. }));
    }

    #[test]
    fn duplicate_role_rejected() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_security_role(SecurityRole::new("admin")).unwrap();
        assert!(svc.add_security_role(SecurityRole::new("admin")).is_err());
    }

    // --- positional collections ---

    #[test]
    fn error_page_delete_shifts() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_error_page(ErrorPage {
            error_code: Some(404),
            exception_type: None,
            location: "/404.html".into(),
        });
        svc.add_error_page(ErrorPage {
            error_code: Some(500),
            exception_type: None,
            location: "/500.html".into(),
        });

        svc.delete_error_page(0).unwrap();
        assert_eq!(svc.error_pages().len(), 1);
        assert_eq!(svc.error_pages()[0].error_code, Some(500));
    }

    // --- singletons ---

    #[test]
    fn login_config_triple() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.load().unwrap();
        assert!(svc.login_config().is_none());

        svc.set_login_config(LoginConfig {
            auth_method: Some("BASIC".into()),
            ..LoginConfig::default()
        });
        assert_eq!(
            svc.login_config().unwrap().auth_method.as_deref(),
            Some("BASIC")
        );

        svc.remove_login_config();
        assert!(svc.login_config().is_none());
    }

    #[test]
    fn mutation_before_load_starts_from_empty_descriptor() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_servlet(Servlet::new("s", "c.S")).unwrap();
        // lazy-initialized aggregate is empty, not the stock descriptor
        assert!(svc.welcome_files().is_empty());
        assert!(svc.session_config().is_none());
        svc.save().unwrap();
        assert!(svc.file_path().exists());
    }
}
