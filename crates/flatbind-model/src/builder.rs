//! Programmatic construction of declaration models.
//!
//! `ModelBuilder` assembles the same entries a declaration file would carry
//! and runs them through [`DeclarationModel::build`], so a model built in
//! code is validated exactly like one loaded from disk.
//!
//! # Example
//!
//! ```rust
//! use flatbind_model::builder::ModelBuilder;
//!
//! let mut b = ModelBuilder::new("testapi");
//! b.class("Widget");
//! b.constructor("Widget", &[]);
//! b.method("Widget", "Resize", &[("width", "int32"), ("height", "int32")], None);
//!
//! let model = b.build().unwrap();
//! assert_eq!(model.classes().len(), 1);
//! ```

use crate::decl::{
    ClassEntry, DeclarationFile, EnumEntry, EnumMemberEntry, FieldEntry, InstantiationEntry,
    LibrarySection, MethodEntry, ParamEntry,
};
use crate::error::Result;
use crate::model::{DeclarationModel, MethodKind, Visibility};

/// A builder for declaration models.
///
/// Members added to a class that has not been declared yet implicitly declare
/// it, so the order of calls does not matter.
pub struct ModelBuilder {
    file: DeclarationFile,
}

impl ModelBuilder {
    /// Create a builder for the named library.
    pub fn new(library: &str) -> Self {
        Self {
            file: DeclarationFile {
                library: LibrarySection {
                    name: library.to_string(),
                    namespace: None,
                    headers: Vec::new(),
                },
                ..DeclarationFile::default()
            },
        }
    }

    /// Qualify native names with `namespace`.
    pub fn namespace(&mut self, namespace: &str) -> &mut Self {
        self.file.library.namespace = Some(namespace.to_string());
        self
    }

    pub fn header(&mut self, header: &str) -> &mut Self {
        self.file.library.headers.push(header.to_string());
        self
    }

    // === Classes ===

    /// Declare a plain class.
    pub fn class(&mut self, name: &str) -> &mut ClassEntry {
        self.class_entry(name)
    }

    /// Declare a container-adapter class over `container` (e.g. `vector<string>`).
    pub fn adapter(&mut self, name: &str, container: &str) -> &mut Self {
        self.class_entry(name).container = Some(container.to_string());
        self
    }

    /// Declare a generic template definition.
    pub fn template(&mut self, name: &str, params: &[&str]) -> &mut Self {
        self.class_entry(name).template_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Set the single base of `class`.
    pub fn base(&mut self, class: &str, base: &str) -> &mut Self {
        self.class_entry(class).bases = vec![base.to_string()];
        self
    }

    pub fn field(&mut self, class: &str, name: &str, ty: &str) -> &mut Self {
        self.class_entry(class).fields.push(FieldEntry {
            name: name.to_string(),
            ty: ty.to_string(),
            visibility: Visibility::Public,
        });
        self
    }

    pub fn constructor(&mut self, class: &str, params: &[(&str, &str)]) -> &mut Self {
        let mut entry = MethodEntry::new(class);
        entry.kind = MethodKind::Constructor;
        entry.params = param_entries(params);
        self.class_entry(class).methods.push(entry);
        self
    }

    /// Add a public instance method. `returns` is a type notation; `None` is `void`.
    pub fn method(
        &mut self,
        class: &str,
        name: &str,
        params: &[(&str, &str)],
        returns: Option<&str>,
    ) -> &mut Self {
        let mut entry = MethodEntry::new(name);
        entry.params = param_entries(params);
        entry.returns = returns.map(str::to_string);
        self.push_method(class, entry)
    }

    /// Add a fully specified method entry.
    pub fn push_method(&mut self, class: &str, entry: MethodEntry) -> &mut Self {
        self.class_entry(class).methods.push(entry);
        self
    }

    // === Enums, instantiations, free functions ===

    pub fn enumeration(
        &mut self,
        name: &str,
        underlying: &str,
        scoped: bool,
        members: &[(&str, i64)],
    ) -> &mut Self {
        self.file.enums.push(EnumEntry {
            name: name.to_string(),
            underlying: underlying.to_string(),
            scoped,
            members: members
                .iter()
                .map(|(name, value)| EnumMemberEntry {
                    name: name.to_string(),
                    value: *value,
                })
                .collect(),
        });
        self
    }

    /// Register `alias` as the linkable name of `template<argument>`.
    pub fn instantiate(&mut self, alias: &str, template: &str, argument: &str) -> &mut Self {
        self.class_entry(alias);
        self.file.instantiations.push(InstantiationEntry {
            alias: alias.to_string(),
            template: template.to_string(),
            argument: argument.to_string(),
        });
        self
    }

    pub fn function(
        &mut self,
        name: &str,
        params: &[(&str, &str)],
        returns: Option<&str>,
    ) -> &mut Self {
        let mut entry = MethodEntry::new(name);
        entry.params = param_entries(params);
        entry.returns = returns.map(str::to_string);
        self.file.functions.push(entry);
        self
    }

    // === Build ===

    /// Resolve and validate the model.
    pub fn build(self) -> Result<DeclarationModel> {
        DeclarationModel::build(self.file)
    }

    /// Return the raw declaration file without resolving it.
    pub fn into_file(self) -> DeclarationFile {
        self.file
    }

    fn class_entry(&mut self, name: &str) -> &mut ClassEntry {
        let index = match self.file.classes.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.file.classes.push(ClassEntry {
                    name: name.to_string(),
                    destructible: true,
                    ..ClassEntry::default()
                });
                self.file.classes.len() - 1
            }
        };
        &mut self.file.classes[index]
    }
}

fn param_entries(params: &[(&str, &str)]) -> Vec<ParamEntry> {
    params
        .iter()
        .map(|(name, ty)| ParamEntry {
            name: name.to_string(),
            ty: ty.to_string(),
        })
        .collect()
}
