use indexmap::IndexMap;

use crate::error::EmitError;

/// Type names already declared in one output document, with the shape each
/// was declared with.
///
/// One registry is owned by one emission run. Emitters stage a copy per
/// specification and [`commit`](NameRegistry::commit) it only when that
/// specification renders successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRegistry {
    names: IndexMap<String, String>,
}

/// Result of [`NameRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Not seen before; declare it.
    Fresh,
    /// Already declared with the same shape; skip it.
    Duplicate,
    /// Already declared with a different shape.
    Collision,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Record `name` with `shape` unless it is already present.
    pub fn register(&mut self, name: &str, shape: &str) -> Registration {
        match self.names.get(name) {
            Some(existing) if existing == shape => Registration::Duplicate,
            Some(_) => Registration::Collision,
            None => {
                self.names.insert(name.to_string(), shape.to_string());
                Registration::Fresh
            }
        }
    }

    /// [`register`](Self::register), turning a collision into an error.
    /// `Ok(true)` means the caller should declare the type.
    pub fn claim(&mut self, name: &str, shape: &str) -> Result<bool, EmitError> {
        match self.register(name, shape) {
            Registration::Fresh => Ok(true),
            Registration::Duplicate => Ok(false),
            Registration::Collision => Err(EmitError::NameCollision {
                name: name.to_string(),
            }),
        }
    }

    /// A copy to register one specification's names into.
    pub fn stage(&self) -> NameRegistry {
        self.clone()
    }

    /// Adopt a staged copy after its specification rendered successfully.
    pub fn commit(&mut self, staged: NameRegistry) {
        *self = staged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_outcomes() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.register("Pet", "{id:integer}"), Registration::Fresh);
        assert_eq!(registry.register("Pet", "{id:integer}"), Registration::Duplicate);
        assert_eq!(registry.register("Pet", "{id:string}"), Registration::Collision);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_claim_collision_is_error() {
        let mut registry = NameRegistry::new();
        assert!(registry.claim("Pet", "a").unwrap());
        assert!(!registry.claim("Pet", "a").unwrap());
        let err = registry.claim("Pet", "b").unwrap_err();
        assert!(matches!(err, EmitError::NameCollision { ref name } if name == "Pet"));
    }

    #[test]
    fn test_uncommitted_stage_leaves_no_names() {
        let mut registry = NameRegistry::new();
        registry.register("Pet", "a");

        let mut failed = registry.stage();
        failed.register("Order", "b");
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Pet"]);

        let mut ok = registry.stage();
        ok.register("User", "c");
        registry.commit(ok);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Pet", "User"]);
    }
}
