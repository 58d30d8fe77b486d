// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

mod alias_cache;
mod alias_resolution;
pub mod component_and_alias_resolver;
mod generalized_group;
mod implicit_components;

use crate::CompilerConfiguration;
use crate::diagnostics::BuildDiagnostics;
use crate::object_tree::{Document, ObjectIndex};
use crate::property_cache::PropertyCacheVector;
use crate::typeregister::TypeRegister;
use component_and_alias_resolver::ComponentAndAliasResolver;

/// Resolve the components and aliases of the document: every inline component in
/// document order, and then the document root.
///
/// The caches must have been created for this document. Stops at the first error, which
/// is added to `diag`.
pub fn run_passes(
    doc: &mut Document,
    caches: &mut PropertyCacheVector,
    register: &mut TypeRegister,
    config: &CompilerConfiguration,
    diag: &mut BuildDiagnostics,
) {
    if doc.objects.is_empty() {
        return;
    }
    let inline_component_roots = doc.inline_component_roots().collect::<Vec<_>>();
    for root in inline_component_roots.into_iter().chain(std::iter::once(ObjectIndex::ROOT)) {
        let result =
            ComponentAndAliasResolver::new(doc, caches, register, config, diag).resolve(root);
        if let Err(err) = result {
            diag.push_compiler_error(err);
            return;
        }
    }
}
