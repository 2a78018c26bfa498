// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{CmsError, Result};
use crate::view::View;

use super::{ComponentInstance, Factory, Plugin, PluginInfo, Properties};

#[derive(Default)]
struct Registry {
    factories: HashMap<String, Factory>,
    plugins: HashMap<String, PluginInfo>,
}

/// Process-wide registry of component factories.
///
/// Registration normally happens once at startup; lookups happen on every
/// request and only take the read lock.
#[derive(Default)]
pub struct ComponentManager {
    registry: RwLock<Registry>,
}

impl ComponentManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every component of every plugin.
    pub fn load<'a, I>(&self, plugins: I)
    where
        I: IntoIterator<Item = &'a dyn Plugin>,
    {
        for plugin in plugins {
            self.register_plugin(plugin);
        }
    }

    /// Registers the components of one plugin.
    pub fn register_plugin(&self, plugin: &dyn Plugin) {
        let info = PluginInfo::of(plugin);
        let components = plugin.register_components();
        tracing::debug!(
            "Registering {} component(s) from plugin {}",
            components.len(),
            info.details.code
        );
        for (name, factory) in components {
            self.register_component(name, factory, Some(info.clone()));
        }
    }

    /// Registers a single factory; a later registration replaces an earlier
    /// one with the same name.
    pub fn register_component(&self, name: impl Into<String>, factory: Factory, plugin: Option<PluginInfo>) {
        let name = name.into();
        let mut registry = self.registry.write();
        if registry.factories.insert(name.clone(), factory).is_some() {
            tracing::warn!("Component {} registered twice, keeping the last one", name);
        }
        match plugin {
            Some(info) => {
                registry.plugins.insert(name, info);
            }
            None => {
                registry.plugins.remove(&name);
            }
        }
    }

    /// The factory registered under `name`.
    pub fn resolve(&self, name: &str) -> Option<Factory> {
        self.registry.read().factories.get(name).cloned()
    }

    /// True when a factory is registered under `name`.
    pub fn has(&self, name: &str) -> bool {
        self.registry.read().factories.contains_key(name)
    }

    /// Registered component names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.read().factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Builds a fresh instance of a registered component.
    pub fn make_component(&self, name: &str, view: &View, properties: Properties) -> Result<ComponentInstance> {
        let factory = self
            .resolve(name)
            .ok_or_else(|| CmsError::ComponentNotFound(name.to_string()))?;
        factory(view, properties)
    }

    /// The plugin that registered the component with the given code.
    pub fn find_plugin(&self, code: &str) -> Option<PluginInfo> {
        self.registry.read().plugins.get(code).cloned()
    }
}

impl std::fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentManager")
            .field("components", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{factory, Component, ComponentDetails, PluginDetails};
    use crate::view::ViewKind;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Menu;

    impl Component for Menu {
        fn details(&self) -> ComponentDetails {
            ComponentDetails::new("menu", "Menu")
        }
    }

    struct NavPlugin;

    impl Plugin for NavPlugin {
        fn details(&self) -> PluginDetails {
            PluginDetails {
                code: "nav".into(),
                name: "Navigation".into(),
                ..PluginDetails::default()
            }
        }

        fn dir(&self) -> PathBuf {
            PathBuf::from("plugins/nav")
        }

        fn register_components(&self) -> Vec<(String, Factory)> {
            vec![("menu".to_string(), factory::<Menu>())]
        }
    }

    fn page() -> View {
        View::parse(ViewKind::Page, "home", "<p></p>").unwrap()
    }

    #[test]
    fn test_load_and_make() {
        let manager = ComponentManager::new();
        manager.load([&NavPlugin as &dyn Plugin]);

        assert!(manager.has("menu"));
        assert_eq!(manager.names(), vec!["menu"]);

        let mut props = Properties::new();
        props.insert("depth".into(), "2".into());
        let instance = manager.make_component("menu", &page(), props).unwrap();
        assert_eq!(instance.details().code, "menu");
        assert_eq!(instance.property("depth"), "2");

        let plugin = manager.find_plugin("menu").unwrap();
        assert_eq!(plugin.details.code, "nav");
        assert_eq!(plugin.dir, PathBuf::from("plugins/nav"));
    }

    #[test]
    fn test_unknown_component() {
        let manager = ComponentManager::new();
        let err = manager
            .make_component("missing", &page(), Properties::new())
            .unwrap_err();
        assert!(matches!(err, CmsError::ComponentNotFound(ref name) if name == "missing"));
        assert!(manager.find_plugin("missing").is_none());
    }

    #[test]
    fn test_register_without_plugin() {
        let manager = ComponentManager::new();
        manager.register_component("menu", factory::<Menu>(), None);
        assert!(manager.resolve("menu").is_some());
        assert!(manager.find_plugin("menu").is_none());
    }
}
