//! Registry pattern for selecting integrators by name

use super::{Integrator, Pefrl, VelocityVerlet};
use std::collections::HashMap;

/// Resolves configured integrator names, including aliases, to instances
pub struct IntegratorRegistry {
    aliases: HashMap<String, String>,
}

impl IntegratorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            aliases: HashMap::new(),
        };

        for integrator in Self::standard_integrators() {
            for alias in integrator.aliases() {
                registry.add_alias(alias, integrator.name());
            }
        }

        registry
    }

    fn standard_integrators() -> [Box<dyn Integrator>; 2] {
        [Box::new(VelocityVerlet), Box::new(Pefrl)]
    }

    pub fn add_alias(&mut self, alias: &str, target: &str) {
        self.aliases.insert(alias.to_string(), target.to_string());
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Integrator>, String> {
        let resolved_name = self.aliases.get(name).map(|s| s.as_str()).unwrap_or(name);

        match resolved_name {
            "velocity_verlet" => Ok(Box::new(VelocityVerlet)),
            "pefrl" => Ok(Box::new(Pefrl)),
            _ => {
                let available = self.list_available();
                let aliases: Vec<String> =
                    self.list_aliases().into_iter().map(|(a, _)| a).collect();
                Err(format!(
                    "Unknown integrator: '{}'. Available integrators: {}. Aliases: {}",
                    name,
                    available.join(", "),
                    aliases.join(", ")
                ))
            }
        }
    }

    pub fn list_available(&self) -> Vec<String> {
        Self::standard_integrators()
            .iter()
            .map(|integrator| integrator.name().to_string())
            .collect()
    }

    pub fn list_aliases(&self) -> Vec<(String, String)> {
        let mut aliases: Vec<(String, String)> = self
            .aliases
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        aliases.sort_by(|a, b| a.0.cmp(&b.0));
        aliases
    }
}

impl Default for IntegratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
