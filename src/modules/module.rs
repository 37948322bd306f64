//! Loaded module values.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A single exported value. Typed access goes through [`downcast_export`].
pub type Export = Arc<dyn Any + Send + Sync>;

/// A module namespace: an optional default export plus named exports.
#[derive(Clone, Default)]
pub struct Module {
    default: Option<Export>,
    named: HashMap<String, Export>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module whose default export is `value`.
    pub fn with_default<T: Any + Send + Sync>(value: T) -> Self {
        Self::new().default_export(value)
    }

    pub fn default_export<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.default = Some(Arc::new(value));
        self
    }

    pub fn named_export<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.named.insert(name.into(), Arc::new(value));
        self
    }

    pub fn default_ref(&self) -> Option<&Export> {
        self.default.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&Export> {
        self.named.get(name)
    }

    /// Typed view of the default export.
    pub fn default_as<T: Any + Clone>(&self) -> Option<T> {
        self.default.as_ref().and_then(downcast_export)
    }

    /// Typed view of a named export.
    pub fn get_as<T: Any + Clone>(&self, name: &str) -> Option<T> {
        self.named.get(name).and_then(downcast_export)
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.named.keys().collect();
        names.sort();
        f.debug_struct("Module")
            .field("default", &self.default.is_some())
            .field("named", &names)
            .finish()
    }
}

/// Clone the value out of an export if it has type `T`.
pub fn downcast_export<T: Any + Clone>(export: &Export) -> Option<T> {
    export.downcast_ref::<T>().cloned()
}

/// What a load call hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSelection {
    /// Only the default export.
    Default,
    /// The whole namespace.
    Namespace,
}

/// Result of a load call, shaped by [`ExportSelection`].
#[derive(Clone)]
pub enum ModuleValue {
    Namespace(Arc<Module>),
    Default(Export),
}

impl ModuleValue {
    pub fn into_namespace(self) -> Option<Arc<Module>> {
        match self {
            ModuleValue::Namespace(module) => Some(module),
            ModuleValue::Default(_) => None,
        }
    }

    pub fn into_default(self) -> Option<Export> {
        match self {
            ModuleValue::Default(export) => Some(export),
            ModuleValue::Namespace(_) => None,
        }
    }
}

impl fmt::Debug for ModuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleValue::Namespace(module) => f.debug_tuple("Namespace").field(module).finish(),
            ModuleValue::Default(_) => f.write_str("Default(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_exports() {
        let module = Module::with_default(String::from("page"))
            .named_export("answer", 42u32);

        assert_eq!(module.default_as::<String>().as_deref(), Some("page"));
        assert_eq!(module.get_as::<u32>("answer"), Some(42));
        assert_eq!(module.get_as::<String>("answer"), None);
        assert!(module.get("missing").is_none());
    }

    #[test]
    fn test_new_module_is_empty() {
        let module = Module::new();
        assert!(module.default_ref().is_none());
        assert!(module.default_as::<String>().is_none());

        let module = Module::new().default_export(7u8);
        assert!(module.default_ref().is_some());
        assert_eq!(format!("{module:?}"), r#"Module { default: true, named: [] }"#);
    }
}
