//! Scene registry
//!
//! Ordered scene names as offered by the scene selector. The position of a name
//! is its selection index.

/// Ordered list of selectable scenes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneRegistry {
    names: Vec<String>,
}

impl SceneRegistry {
    /// Create a registry from scene names in display order
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the number of scenes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check whether the registry has no scenes
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get the name at `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Get all names in selection order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Find the selection index of a scene by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_defines_indices() {
        let registry = SceneRegistry::new(["Cube And Spheres", "Cornell Box", "Lucy In One Weekend"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.name(1), Some("Cornell Box"));
        assert_eq!(registry.index_of("Lucy In One Weekend"), Some(2));
        assert_eq!(registry.name(3), None);
        assert_eq!(registry.index_of("Missing"), None);
    }

    #[test]
    fn test_empty_registry() {
        let registry = SceneRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
    }
}
