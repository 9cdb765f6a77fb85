use serde::{Deserialize, Serialize};

/// Annotations that make a code generator do work. A code generator
/// dependency whose annotations never show up in the consumer is unused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeGeneratorBinding {
    pub name: String,
    /// `group:name` of the processor artifact, or a module path
    pub coordinates: String,
    pub annotations: Vec<String>,
}

impl CodeGeneratorBinding {
    pub fn new(name: &str, coordinates: &str, annotations: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            coordinates: coordinates.to_string(),
            annotations: annotations.iter().map(|a| a.to_string()).collect(),
        }
    }
}

const ANVIL_ANNOTATIONS: &[&str] = &[
    "com.squareup.anvil.annotations.ContributesBinding",
    "com.squareup.anvil.annotations.ContributesMultibinding",
    "com.squareup.anvil.annotations.ContributesSubcomponent",
    "com.squareup.anvil.annotations.ContributesTo",
    "com.squareup.anvil.annotations.MergeComponent",
    "com.squareup.anvil.annotations.MergeSubcomponent",
    "com.squareup.anvil.annotations.compat.MergeInterfaces",
    "com.squareup.anvil.annotations.compat.MergeModules",
];

const DAGGER_ANNOTATIONS: &[&str] = &[
    "dagger.Binds",
    "dagger.BindsInstance",
    "dagger.Component",
    "dagger.Module",
    "dagger.assisted.Assisted",
    "dagger.assisted.AssistedFactory",
    "dagger.assisted.AssistedInject",
    "dagger.multibindings.IntoMap",
    "dagger.multibindings.IntoSet",
    "javax.inject.Inject",
];

/// Bindings for the code generators every Android build tends to use
pub fn default_bindings() -> Vec<CodeGeneratorBinding> {
    let anvil: Vec<&str> = ANVIL_ANNOTATIONS
        .iter()
        .chain(DAGGER_ANNOTATIONS)
        .copied()
        .collect();

    vec![
        CodeGeneratorBinding::new("Anvil", "com.squareup.anvil:compiler", &anvil),
        CodeGeneratorBinding::new("Dagger", "com.google.dagger:dagger-compiler", DAGGER_ANNOTATIONS),
        CodeGeneratorBinding::new("Kotlin Parcelize", "org.jetbrains.kotlin:kotlin-parcelize-compiler", &["kotlinx.parcelize.Parcelize"]),
        CodeGeneratorBinding::new(
            "Tangle",
            "com.rickbusarow.tangle:tangle-compiler",
            &["tangle.inject.TangleParam", "tangle.inject.TangleScope"],
        ),
    ]
}

/// Code generator bindings known to an analysis run
#[derive(Debug, Clone)]
pub struct CodeGenerators {
    bindings: Vec<CodeGeneratorBinding>,
}

impl CodeGenerators {
    pub fn new(bindings: Vec<CodeGeneratorBinding>) -> Self {
        Self { bindings }
    }

    /// Default bindings plus `additional`; later entries win on equal coordinates
    pub fn with_additional(additional: Vec<CodeGeneratorBinding>) -> Self {
        let mut bindings = default_bindings();
        for binding in additional {
            bindings.retain(|b| b.coordinates != binding.coordinates);
            bindings.push(binding);
        }
        Self { bindings }
    }

    pub fn binding_for(&self, coordinates: &str) -> Option<&CodeGeneratorBinding> {
        self.bindings.iter().find(|b| b.coordinates == coordinates)
    }

    pub fn bindings(&self) -> &[CodeGeneratorBinding] {
        &self.bindings
    }
}

impl Default for CodeGenerators {
    fn default() -> Self {
        Self::new(default_bindings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings_include_dagger() {
        let generators = CodeGenerators::default();
        let dagger = generators.binding_for("com.google.dagger:dagger-compiler").unwrap();
        assert!(dagger.annotations.contains(&"javax.inject.Inject".to_string()));
        assert!(generators.binding_for("com.example:unknown").is_none());
    }

    #[test]
    fn test_additional_binding_replaces_default() {
        let custom = CodeGeneratorBinding::new("Dagger", "com.google.dagger:dagger-compiler", &["dagger.Component"]);
        let generators = CodeGenerators::with_additional(vec![custom]);
        let dagger = generators.binding_for("com.google.dagger:dagger-compiler").unwrap();
        assert_eq!(dagger.annotations, vec!["dagger.Component".to_string()]);
    }
}
