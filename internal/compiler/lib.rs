// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

#![doc = include_str!("README.md")]
// It would be nice to keep the compiler free of unsafe code
#![deny(unsafe_code)]

pub mod diagnostics;
pub mod langtype;
pub mod object_tree;
pub mod property_cache;
pub mod typeregister;

pub mod passes;

#[cfg(test)]
mod testing;

use diagnostics::BuildDiagnostics;
use object_tree::Document;
use property_cache::PropertyCacheVector;
use typeregister::TypeRegister;

/// CompilerConfiguration allows configuring different aspects of the compiler.
#[derive(Clone, Debug)]
pub struct CompilerConfiguration {
    /// Warn when a `Component` is used where it would be implicitly wrapped anyway
    /// (as document root or inline component root)
    pub deprecation_warnings: bool,
    /// Resolve group properties that refer to an alias or an id instead of a property
    pub generalized_group_properties: bool,
}

impl CompilerConfiguration {
    /// The default configuration, adjusted by the `QML_COMPILER_NO_DEPRECATION_WARNINGS`
    /// and `QML_COMPILER_DISABLE_GENERALIZED_GROUPS` environment variables.
    pub fn new() -> Self {
        let deprecation_warnings = std::env::var_os("QML_COMPILER_NO_DEPRECATION_WARNINGS").is_none();
        let generalized_group_properties =
            std::env::var_os("QML_COMPILER_DISABLE_GENERALIZED_GROUPS").is_none();
        Self { deprecation_warnings, generalized_group_properties }
    }
}

impl Default for CompilerConfiguration {
    fn default() -> Self {
        Self { deprecation_warnings: true, generalized_group_properties: true }
    }
}

/// Create the property caches of the document and resolve its components and aliases.
///
/// Returns the property caches, including the synthesized components and the properties
/// created by aliases, and the diagnostics. The document is left in an unspecified state
/// if there is an error.
pub fn compile_document(
    doc: &mut Document,
    register: &mut TypeRegister,
    config: &CompilerConfiguration,
) -> (PropertyCacheVector, BuildDiagnostics) {
    let mut diag = BuildDiagnostics::default();
    let mut caches = match property_cache::create_property_caches(doc, register) {
        Ok(caches) => caches,
        Err(err) => {
            diag.push_compiler_error(err);
            return (PropertyCacheVector::default(), diag);
        }
    };
    passes::run_passes(doc, &mut caches, register, config, &mut diag);
    (caches, diag)
}
