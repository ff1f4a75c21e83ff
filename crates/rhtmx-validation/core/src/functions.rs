// File: src/functions.rs
// Purpose: Registry of named client validation functions used by Custom validators

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Arguments passed to a custom validation function
#[derive(Debug, Clone, Copy)]
pub struct CustomContext<'a> {
    pub validator_id: &'a str,
    pub value: &'a str,
}

pub type CustomFunction = Rc<dyn Fn(&CustomContext<'_>) -> bool>;

/// Named predicates looked up by `client_validation_function`
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, CustomFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a function
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&CustomContext<'_>) -> bool + 'static,
    {
        self.functions.insert(name.into(), Rc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<CustomFunction> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry")
            .field("functions", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_call() {
        let mut registry = FunctionRegistry::new();
        registry.register("isEven", |ctx| {
            ctx.value.parse::<i64>().map(|n| n % 2 == 0).unwrap_or(false)
        });

        let function = registry.get("isEven").unwrap();
        let ctx = CustomContext {
            validator_id: "v1",
            value: "4",
        };
        assert!(function(&ctx));
        assert!(registry.contains("isEven"));
        assert!(registry.get("isOdd").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = FunctionRegistry::new();
        registry.register("check", |_| false);
        registry.register("check", |_| true);

        assert_eq!(registry.len(), 1);
        let ctx = CustomContext {
            validator_id: "v1",
            value: "",
        };
        assert!(registry.get("check").unwrap()(&ctx));
    }
}
