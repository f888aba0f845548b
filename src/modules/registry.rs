// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Module Registry
 * Resolves configured module names to loaded module instances
 * © 2026 Bountyy Oy
 */

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

use super::login_report::LoginReport;
use super::ScanModule;

pub type ModuleFactory =
    Arc<dyn Fn(&HashMap<String, String>) -> Result<Arc<dyn ScanModule>> + Send + Sync>;

pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    /// Create a registry with the built-in modules
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(LoginReport::NAME, |_| Ok(Arc::new(LoginReport::new())));
        registry
    }

    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&HashMap<String, String>) -> Result<Arc<dyn ScanModule>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_lowercase(), Arc::new(factory));
    }

    pub fn exists(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Load each named module once.
    ///
    /// Unknown names and modules whose factory fails are reported and
    /// skipped.
    pub fn load(
        &self,
        names: &[String],
        options: &HashMap<String, HashMap<String, String>>,
    ) -> Vec<Arc<dyn ScanModule>> {
        let empty = HashMap::new();
        let mut loaded = Vec::new();

        for name in names {
            let key = name.to_lowercase();
            let Some(factory) = self.factories.get(&key) else {
                error!("Module {} not found", name);
                continue;
            };

            let module_options = options
                .iter()
                .find(|(module, _)| module.eq_ignore_ascii_case(&key))
                .map(|(_, opts)| opts)
                .unwrap_or(&empty);

            match factory(module_options) {
                Ok(module) => {
                    debug!("Loaded module {}", module.name());
                    loaded.push(module);
                }
                Err(e) => error!("Failed to load module {}: {:#}", name, e),
            }
        }

        loaded
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registered() {
        let registry = ModuleRegistry::new();
        assert!(registry.exists("LOGIN_REPORT"));
        assert_eq!(registry.names(), vec!["login_report".to_string()]);
    }

    #[test]
    fn test_load_skips_unknown_and_failing_modules() {
        let mut registry = ModuleRegistry::new();
        registry.register("broken", |_| Err(anyhow::anyhow!("missing option")));

        let loaded = registry.load(
            &[
                "login_report".to_string(),
                "nope".to_string(),
                "broken".to_string(),
            ],
            &HashMap::new(),
        );

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name(), "login_report");
    }

    #[test]
    fn test_factory_receives_options() {
        let mut registry = ModuleRegistry::empty();
        registry.register("needs_opt", |opts| {
            if opts.contains_key("LHOST") {
                Ok(Arc::new(LoginReport::new()) as Arc<dyn ScanModule>)
            } else {
                Err(anyhow::anyhow!("LHOST required"))
            }
        });

        let options = HashMap::from([(
            "needs_opt".to_string(),
            HashMap::from([("LHOST".to_string(), "10.0.0.250".to_string())]),
        )]);

        assert_eq!(registry.load(&["needs_opt".to_string()], &options).len(), 1);
        assert!(registry.load(&["needs_opt".to_string()], &HashMap::new()).is_empty());
    }
}
