//! Load/mutate/save service for `conf/context.xml`.
//!
//! The service owns one in-memory [`Context`] for one CATALINA_BASE. `load`
//! reads the file or falls back to the stock defaults when it is absent;
//! mutating operations lazily create an empty aggregate so a fresh service
//! can be populated without an explicit load; `save` refuses to run before
//! either has happened, takes a rolling `.bak` backup, and rewrites the file.

use std::path::{Path, PathBuf};

use log::debug;

use crate::backup::backup_fixed;
use crate::context::{
    Context, CookieProcessor, Environment, JarScanner, Loader, Manager, Parameter, Resource,
    ResourceLink, SessionStore, Valve,
};
use crate::context_xml;
use crate::error::{Result, TomcatKitError};
use crate::keyed;

pub struct ContextService {
    base: PathBuf,
    context: Option<Context>,
}

impl ContextService {
    /// A service rooted at a CATALINA_BASE directory. Nothing is read until
    /// [`load`](Self::load) or a mutating operation runs.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        ContextService {
            base: base.into(),
            context: None,
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.base.join("conf").join("context.xml")
    }

    /// Read `conf/context.xml`, or start from the stock defaults when the
    /// file does not exist. Malformed XML is an error; a missing file is not.
    pub fn load(&mut self) -> Result<&Context> {
        let path = self.file_path();
        let context = match std::fs::read_to_string(&path) {
            Ok(text) => context_xml::parse(&text, &path)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, starting from defaults", path.display());
                Context::tomcat_default()
            }
            Err(e) => return Err(TomcatKitError::io(&path, e)),
        };
        Ok(self.context.insert(context))
    }

    /// Back up the existing file (if any) and write the current model.
    ///
    /// Errors if the service has never been loaded or mutated — an empty
    /// service must not overwrite a real file with an empty document.
    pub fn save(&self) -> Result<()> {
        let Some(context) = &self.context else {
            return Err(TomcatKitError::NotLoaded {
                file: "context.xml",
            });
        };
        let path = self.file_path();
        backup_fixed(&path)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TomcatKitError::io(parent, e))?;
        }
        std::fs::write(&path, context_xml::serialize(context))
            .map_err(|e| TomcatKitError::io(&path, e))?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    fn context_mut(&mut self) -> &mut Context {
        self.context.get_or_insert_with(Context::default)
    }

    // --- resources ---

    pub fn resources(&self) -> &[Resource] {
        self.context.as_ref().map_or(&[], |c| &c.resources)
    }

    pub fn get_resource(&self, name: &str) -> Option<&Resource> {
        keyed::get(self.resources(), name, |r| &r.name)
    }

    pub fn add_resource(&mut self, resource: Resource) -> Result<()> {
        keyed::add(&mut self.context_mut().resources, resource, |r| &r.name, "resource")
    }

    pub fn update_resource(&mut self, resource: Resource) -> Result<()> {
        keyed::update(&mut self.context_mut().resources, resource, |r| &r.name, "resource")
    }

    pub fn delete_resource(&mut self, name: &str) -> Result<()> {
        keyed::remove(&mut self.context_mut().resources, name, |r| &r.name, "resource")?;
        Ok(())
    }

    // --- environments ---

    pub fn environments(&self) -> &[Environment] {
        self.context.as_ref().map_or(&[], |c| &c.environments)
    }

    pub fn get_environment(&self, name: &str) -> Option<&Environment> {
        keyed::get(self.environments(), name, |e| &e.name)
    }

    pub fn add_environment(&mut self, env: Environment) -> Result<()> {
        keyed::add(&mut self.context_mut().environments, env, |e| &e.name, "environment")
    }

    pub fn update_environment(&mut self, env: Environment) -> Result<()> {
        keyed::update(&mut self.context_mut().environments, env, |e| &e.name, "environment")
    }

    pub fn delete_environment(&mut self, name: &str) -> Result<()> {
        keyed::remove(&mut self.context_mut().environments, name, |e| &e.name, "environment")?;
        Ok(())
    }

    // --- resource links ---

    pub fn resource_links(&self) -> &[ResourceLink] {
        self.context.as_ref().map_or(&[], |c| &c.resource_links)
    }

    pub fn get_resource_link(&self, name: &str) -> Option<&ResourceLink> {
        keyed::get(self.resource_links(), name, |l| &l.name)
    }

    pub fn add_resource_link(&mut self, link: ResourceLink) -> Result<()> {
        keyed::add(&mut self.context_mut().resource_links, link, |l| &l.name, "resource link")
    }

    pub fn update_resource_link(&mut self, link: ResourceLink) -> Result<()> {
        keyed::update(&mut self.context_mut().resource_links, link, |l| &l.name, "resource link")
    }

    pub fn delete_resource_link(&mut self, name: &str) -> Result<()> {
        keyed::remove(&mut self.context_mut().resource_links, name, |l| &l.name, "resource link")?;
        Ok(())
    }

    // --- parameters ---

    pub fn parameters(&self) -> &[Parameter] {
        self.context.as_ref().map_or(&[], |c| &c.parameters)
    }

    pub fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        keyed::get(self.parameters(), name, |p| &p.name)
    }

    pub fn add_parameter(&mut self, param: Parameter) -> Result<()> {
        keyed::add(&mut self.context_mut().parameters, param, |p| &p.name, "parameter")
    }

    pub fn update_parameter(&mut self, param: Parameter) -> Result<()> {
        keyed::update(&mut self.context_mut().parameters, param, |p| &p.name, "parameter")
    }

    pub fn delete_parameter(&mut self, name: &str) -> Result<()> {
        keyed::remove(&mut self.context_mut().parameters, name, |p| &p.name, "parameter")?;
        Ok(())
    }

    // --- watched resources ---

    pub fn watched_resources(&self) -> &[String] {
        self.context.as_ref().map_or(&[], |c| &c.watched_resources)
    }

    pub fn add_watched_resource(&mut self, path: impl Into<String>) -> Result<()> {
        let path = path.into();
        keyed::add(
            &mut self.context_mut().watched_resources,
            path,
            |p| p.as_str(),
            "watched resource",
        )
    }

    pub fn delete_watched_resource(&mut self, path: &str) -> Result<()> {
        keyed::remove(
            &mut self.context_mut().watched_resources,
            path,
            |p| p.as_str(),
            "watched resource",
        )?;
        Ok(())
    }

    // --- valves (positional) ---

    pub fn valves(&self) -> &[Valve] {
        self.context.as_ref().map_or(&[], |c| &c.valves)
    }

    pub fn add_valve(&mut self, valve: Valve) {
        self.context_mut().valves.push(valve);
    }

    pub fn update_valve(&mut self, index: usize, valve: Valve) -> Result<()> {
        keyed::replace_at(&mut self.context_mut().valves, index, valve, "valve")
    }

    pub fn delete_valve(&mut self, index: usize) -> Result<()> {
        keyed::remove_at(&mut self.context_mut().valves, index, "valve")?;
        Ok(())
    }

    // --- optional singletons ---

    pub fn manager(&self) -> Option<&Manager> {
        self.context.as_ref().and_then(|c| c.manager.as_ref())
    }

    pub fn set_manager(&mut self, manager: Manager) {
        self.context_mut().manager = Some(manager);
    }

    pub fn remove_manager(&mut self) {
        self.context_mut().manager = None;
    }

    /// Set the session `<Store>`, creating a default `<Manager>` wrapper if
    /// none is configured yet.
    pub fn set_session_store(&mut self, store: SessionStore) {
        self.context_mut()
            .manager
            .get_or_insert_with(Manager::default)
            .store = Some(store);
    }

    pub fn remove_session_store(&mut self) {
        if let Some(manager) = self.context_mut().manager.as_mut() {
            manager.store = None;
        }
    }

    pub fn loader(&self) -> Option<&Loader> {
        self.context.as_ref().and_then(|c| c.loader.as_ref())
    }

    pub fn set_loader(&mut self, loader: Loader) {
        self.context_mut().loader = Some(loader);
    }

    pub fn remove_loader(&mut self) {
        self.context_mut().loader = None;
    }

    pub fn jar_scanner(&self) -> Option<&JarScanner> {
        self.context.as_ref().and_then(|c| c.jar_scanner.as_ref())
    }

    pub fn set_jar_scanner(&mut self, scanner: JarScanner) {
        self.context_mut().jar_scanner = Some(scanner);
    }

    pub fn remove_jar_scanner(&mut self) {
        self.context_mut().jar_scanner = None;
    }

    pub fn cookie_processor(&self) -> Option<&CookieProcessor> {
        self.context.as_ref().and_then(|c| c.cookie_processor.as_ref())
    }

    pub fn set_cookie_processor(&mut self, processor: CookieProcessor) {
        self.context_mut().cookie_processor = Some(processor);
    }

    pub fn remove_cookie_processor(&mut self) {
        self.context_mut().cookie_processor = None;
    }

    /// Direct mutable access to the aggregate, for attribute edits the
    /// collection methods don't cover.
    pub fn edit(&mut self) -> &mut Context {
        self.context_mut()
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

    fn service(dir: &TempDir) -> ContextService {
        ContextService::new(dir.path())
    }

    // --- load defaults ---

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        let ctx = svc.load().unwrap();
        assert_eq!(ctx.watched_resources.len(), 2);
    }

    #[test]
    fn defaulting_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut a = service(&dir);
        let mut b = service(&dir);
        assert_eq!(a.load().unwrap(), b.load().unwrap());
    }

    #[test]
    fn load_parses_existing_file() {
        let dir = TempDir::new().unwrap();
        let conf = dir.path().join("conf");
        fs::create_dir_all(&conf).unwrap();
        fs::write(
            conf.join("context.xml"),
            r#"<Context path="/app"><Resource name="jdbc/X" type="javax.sql.DataSource"/></Context>"#,
        )
        .unwrap();

        let mut svc = service(&dir);
        let ctx = svc.load().unwrap();
        assert_eq!(ctx.path.as_deref(), Some("/app"));
        assert!(svc.get_resource("jdbc/X").is_some());
    }

    #[test]
    fn load_malformed_file_errors() {
        let dir = TempDir::new().unwrap();
        let conf = dir.path().join("conf");
        fs::create_dir_all(&conf).unwrap();
        fs::write(conf.join("context.xml"), "<Context><oops").unwrap();

        assert!(service(&dir).load().is_err());
    }

    // --- save ---

    #[test]
    fn save_before_load_errors() {
        let dir = TempDir::new().unwrap();
        let err = service(&dir).save().unwrap_err();
        assert!(matches!(err, TomcatKitError::NotLoaded { .. }));
    }

    #[test]
    fn save_after_mutation_only_succeeds() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_resource(Resource::data_source("jdbc/Test")).unwrap();
        svc.save().unwrap();
        assert!(svc.file_path().exists());
    }

    #[test]
    fn save_round_trips_through_load() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.load().unwrap();
        svc.add_resource(Resource::data_source("jdbc/Test")).unwrap();
        svc.add_environment(Environment::new("mode", "prod")).unwrap();
        svc.save().unwrap();

        let mut fresh = service(&dir);
        fresh.load().unwrap();
        assert_eq!(fresh.context(), svc.context());
    }

    #[test]
    fn save_backs_up_existing_file() {
        let dir = TempDir::new().unwrap();
        let conf = dir.path().join("conf");
        fs::create_dir_all(&conf).unwrap();
        fs::write(conf.join("context.xml"), "<Context path=\"/old\"/>").unwrap();

        let mut svc = service(&dir);
        svc.load().unwrap();
        svc.edit().path = Some("/new".into());
        svc.save().unwrap();

        let backup = conf.join("backup").join("context.xml.bak");
        assert_eq!(
            fs::read_to_string(backup).unwrap(),
            "<Context path=\"/old\"/>"
        );
        assert!(fs::read_to_string(conf.join("context.xml"))
            .unwrap()
            .contains("/new"));
    }

    #[test]
    fn first_save_produces_no_backup() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.load().unwrap();
        svc.save().unwrap();
        assert!(!dir.path().join("conf/backup").exists());
    }

    // --- CRUD: add+retrieve DataSource scenario ---

    #[test]
    fn add_and_retrieve_data_source() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_resource(Resource::data_source("jdbc/Test")).unwrap();

        let r = svc.get_resource("jdbc/Test").unwrap();
        assert_eq!(r.type_name.as_deref(), Some("javax.sql.DataSource"));
        assert_eq!(r.max_total, Some(100));
        assert_eq!(r.test_on_borrow, Some(true));
    }

    #[test]
    fn duplicate_resource_rejected() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_resource(Resource::data_source("jdbc/Test")).unwrap();
        let before = svc.resources().to_vec();

        let err = svc.add_resource(Resource::new("jdbc/Test")).unwrap_err();
        assert!(matches!(err, TomcatKitError::Duplicate { .. }));
        assert_eq!(svc.resources(), before.as_slice());
    }

    #[test]
    fn update_missing_resource_errors() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        let err = svc.update_resource(Resource::new("jdbc/Nope")).unwrap_err();
        assert!(matches!(err, TomcatKitError::NotFound { .. }));
    }

    #[test]
    fn delete_resource_removes_it() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_resource(Resource::data_source("jdbc/A")).unwrap();
        svc.add_resource(Resource::data_source("jdbc/B")).unwrap();
        svc.delete_resource("jdbc/A").unwrap();
        assert!(svc.get_resource("jdbc/A").is_none());
        assert!(svc.get_resource("jdbc/B").is_some());
    }

    #[test]
    fn duplicate_watched_resource_rejected() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.load().unwrap();
        let err = svc.add_watched_resource("WEB-INF/web.xml").unwrap_err();
        assert!(matches!(err, TomcatKitError::Duplicate { .. }));
    }

    // --- valves ---

    #[test]
    fn valve_delete_shifts_indices() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.add_valve(Valve::new("a.B"));
        svc.add_valve(Valve::new("c.D"));
        svc.add_valve(Valve::new("e.F"));

        svc.delete_valve(0).unwrap();
        assert_eq!(svc.valves().len(), 2);
        assert_eq!(svc.valves()[0].class_name, "c.D");

        let err = svc.delete_valve(5).unwrap_err();
        assert!(matches!(err, TomcatKitError::IndexOutOfRange { .. }));
    }

    // --- singletons ---

    #[test]
    fn set_session_store_creates_manager() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.set_session_store(SessionStore {
            class_name: "org.apache.catalina.session.FileStore".into(),
            directory: None,
        });

        let manager = svc.manager().unwrap();
        assert!(manager.class_name.is_none());
        assert!(manager.store.is_some());
    }

    #[test]
    fn absent_singleton_is_none_not_default() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);
        svc.load().unwrap();
        assert!(svc.loader().is_none());

        svc.set_loader(Loader::default());
        assert!(svc.loader().is_some());
        svc.remove_loader();
        assert!(svc.loader().is_none());
    }
}
