//! Engine construction and extension hooks.

use std::path::Path;

use datamatic_core::{Banner, OutputFile};
use datamatic_spec::Spec;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    Result,
    emit::{self, Emitted},
    expand::Expander,
    methods::{MethodRegistry, register_builtin_methods},
    types::{TypeRenderer, register_builtin_types},
    validate,
};

/// The registries an [`Extension`] adds to.
#[derive(Debug, Default)]
pub struct Registries {
    pub types: TypeRenderer,
    pub methods: MethodRegistry,
}

/// A set of extra types and methods registered before any template runs.
///
/// # Example
///
/// ```ignore
/// struct Maths;
///
/// impl Extension for Maths {
///     fn name(&self) -> &'static str { "maths" }
///
///     fn register(&self, registries: &mut Registries) -> Result<()> {
///         registries.types.register("Maths::vec3", render_vec3)?;
///         Ok(())
///     }
/// }
///
/// let engine = Engine::builder().extension(Maths).build()?;
/// ```
pub trait Extension: Send + Sync {
    /// The name of this extension (for logging).
    fn name(&self) -> &'static str;

    /// Add types and methods.
    ///
    /// # Errors
    ///
    /// Registering a pattern or method that already exists fails the build.
    fn register(&self, registries: &mut Registries) -> Result<()>;
}

/// An [`Extension`] from a name and a closure.
pub struct FnExtension<F> {
    name: &'static str,
    register: F,
}

impl<F> FnExtension<F>
where
    F: Fn(&mut Registries) -> Result<()> + Send + Sync,
{
    pub fn new(name: &'static str, register: F) -> Self {
        Self { name, register }
    }
}

impl<F> Extension for FnExtension<F>
where
    F: Fn(&mut Registries) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn register(&self, registries: &mut Registries) -> Result<()> {
        (self.register)(registries)
    }
}

/// Collects extensions for an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    extensions: Vec<Box<dyn Extension>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an extension. Extensions register in the order they are added.
    pub fn extension(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Register the built-ins, then every extension.
    ///
    /// # Errors
    ///
    /// Fails on the first duplicate or malformed registration.
    pub fn build(self) -> Result<Engine> {
        let mut registries = Registries::default();
        register_builtin_types(&mut registries.types)?;
        register_builtin_methods(&mut registries.methods)?;

        for extension in &self.extensions {
            extension.register(&mut registries)?;
            debug!(extension = extension.name(), "registered extension");
        }

        Ok(Engine {
            types: registries.types,
            methods: registries.methods,
        })
    }
}

/// Immutable, fully registered expansion engine.
///
/// Safe to share across threads; templates can be expanded in any order.
#[derive(Debug, Clone)]
pub struct Engine {
    types: TypeRenderer,
    methods: MethodRegistry,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// An engine with only the built-in types and methods.
    pub fn with_builtins() -> Result<Self> {
        Self::builder().build()
    }

    pub fn types(&self) -> &TypeRenderer {
        &self.types
    }

    pub fn methods(&self) -> &MethodRegistry {
        &self.methods
    }

    /// Render a value as a literal of `type_name`.
    pub fn render_type(&self, type_name: &str, value: &Value) -> Result<String> {
        self.types.render(type_name, value)
    }

    /// Check every attribute default against its type.
    pub fn validate(&self, spec: &Spec) -> Result<()> {
        validate::validate_defaults(&self.types, spec)
    }

    /// Expand an in-memory template.
    pub fn expand(&self, template: &str, spec: &Spec) -> Result<String> {
        self.expand_named("<template>", template, spec)
    }

    /// Expand an in-memory template, naming it `name` in errors.
    pub fn expand_named(&self, name: &str, template: &str, spec: &Spec) -> Result<String> {
        Expander::new(&self.types, &self.methods).expand(name, template, spec)
    }

    /// Expand a template file into its destination file without writing it.
    pub fn render_file(
        &self,
        template: &Path,
        spec: &Spec,
        banner: &dyn Banner,
    ) -> Result<OutputFile> {
        let (destination, source) = emit::read_template(template)?;
        let body = self.expand_named(&template.display().to_string(), &source, spec)?;
        Ok(emit::assemble(destination, banner, &body))
    }

    /// Expand a template file and write its destination if it changed.
    pub fn emit(&self, template: &Path, spec: &Spec, banner: &dyn Banner) -> eyre::Result<Emitted> {
        let output = self.render_file(template, spec, banner)?;
        let result = output.write()?;
        info!(destination = %output.path().display(), ?result, "emitted template");

        Ok(Emitted {
            template: template.to_path_buf(),
            destination: output.path().to_path_buf(),
            result,
        })
    }
}
