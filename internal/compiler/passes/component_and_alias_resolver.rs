// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! Detect the component boundaries of a document, collect the ids of every component and
//! resolve the aliases declared in them.
//!
//! Components are either explicit (`Component { Item {} }`) or implicit: an object assigned
//! to a property of Component type gets wrapped into a synthesized `Component`.
//! Each component has its own id scope. Aliases are resolved per component, nested
//! components first, with a fixed point iteration that tolerates forward references.

use std::collections::HashMap;

use crate::CompilerConfiguration;
use crate::diagnostics::{BuildDiagnostics, Diagnostic};
use crate::object_tree::{BindingValue, Document, ObjectIndex};
use crate::property_cache::PropertyCacheVector;
use crate::typeregister::TypeRegister;
use itertools::Itertools;
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy)]
pub(super) struct NamedObject {
    pub index: ObjectIndex,
    pub id_number: usize,
}

/// The state that is collected for one component, and reset for the next one
#[derive(Default)]
pub(super) struct ComponentScope {
    pub id_to_object: HashMap<SmolStr, NamedObject>,
    /// Objects with an id, by id number
    pub named_objects: Vec<ObjectIndex>,
    pub objects_with_aliases: Vec<ObjectIndex>,
    /// `(object, binding index)` of group property bindings that do not match a property
    pub generalized_group_properties: Vec<(ObjectIndex, usize)>,
}

pub struct ComponentAndAliasResolver<'a> {
    pub(super) doc: &'a mut Document,
    pub(super) caches: &'a mut PropertyCacheVector,
    pub(super) register: &'a mut TypeRegister,
    pub(super) config: &'a CompilerConfiguration,
    /// Receives the warnings. Errors are returned.
    pub(super) diag: &'a mut BuildDiagnostics,
    pub(super) component_roots: Vec<ObjectIndex>,
    pub(super) scope: ComponentScope,
}

impl<'a> ComponentAndAliasResolver<'a> {
    pub fn new(
        doc: &'a mut Document,
        caches: &'a mut PropertyCacheVector,
        register: &'a mut TypeRegister,
        config: &'a CompilerConfiguration,
        diag: &'a mut BuildDiagnostics,
    ) -> Self {
        Self {
            doc,
            caches,
            register,
            config,
            diag,
            component_roots: Vec::new(),
            scope: ComponentScope::default(),
        }
    }

    /// Resolve the components and aliases of the document root (`root == ObjectIndex::ROOT`)
    /// or of the inline component starting at `root`.
    ///
    /// Everything that belongs to inline components is ignored when resolving the document
    /// root. Inline components must therefore be resolved on their own, before the root.
    pub fn resolve(&mut self, root: ObjectIndex) -> Result<(), Diagnostic> {
        if root != ObjectIndex::ROOT {
            self.resolve_components_in_inline_component_root(root)?;
        }

        for index in self.objects_in_scope(root) {
            let obj = &self.doc.objects[index];
            let has_cache = self.caches.get(index).is_some_and(Option::is_some);
            if obj.type_name.is_none() && !has_cache {
                continue;
            }

            if !self.is_explicit_component(index) {
                if has_cache {
                    self.find_and_register_implicit_components(index)?;
                }
                continue;
            }

            if index == ObjectIndex::ROOT {
                self.warn_deprecated(
                    index,
                    "Using a Component as the root of a qmldocument is deprecated: types defined \
                     in qml documents are automatically wrapped into Components when needed.",
                );
            }
            self.mark_as_component(index)?;

            // The root is processed after all the other components
            if index != ObjectIndex::ROOT {
                self.component_roots.push(index);
            }
        }
        log::debug!(
            "components found while resolving {root}: [{}]",
            self.component_roots.iter().join(", ")
        );

        let mut i = 0;
        while i < self.component_roots.len() {
            let component = self.component_roots[i];
            i += 1;
            let Some(content) =
                self.doc.objects[component].first_binding().and_then(|b| b.object_index())
            else {
                continue;
            };
            self.scope = ComponentScope::default();
            self.collect_ids_and_aliases(content, component)?;
            self.finish_component(component)?;
        }

        self.scope = ComponentScope::default();
        self.collect_ids_and_aliases(root, root)?;
        self.finish_component(root)?;

        for r in std::mem::take(&mut self.component_roots) {
            self.doc.push_component_root(r);
        }
        Ok(())
    }

    /// The objects of the document root that are not part of an inline component, or the
    /// objects of the inline component at `root` after `root` itself.
    pub(super) fn objects_in_scope(&self, root: ObjectIndex) -> Vec<ObjectIndex> {
        let objects = &self.doc.objects;
        if root == ObjectIndex::ROOT {
            return objects
                .iter_enumerated()
                .filter(|(_, o)| {
                    !o.flags.is_inline_component_root && !o.flags.is_part_of_inline_component
                })
                .map(|(i, _)| i)
                .collect();
        }
        // The implicit components of the inline components resolved before come after the
        // parsed objects. Nested inline components are not supported.
        objects
            .iter_enumerated()
            .skip(usize::from(root) + 1)
            .take_while(|(_, o)| {
                o.flags.is_part_of_inline_component
                    && !o.flags.is_inline_component_root
                    && !o.flags.is_implicit_component
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn finish_component(&mut self, component: ObjectIndex) -> Result<(), Diagnostic> {
        self.doc.objects[component].named_objects = self.scope.named_objects.clone();
        self.resolve_aliases(component)?;
        self.resolve_generalized_group_properties(component)
    }

    /// Register the ids of the object and its children in the current component scope, and
    /// collect the objects that declare aliases.
    ///
    /// `component` is the object the scope belongs to: the recursion stops at any other
    /// component object.
    pub(super) fn collect_ids_and_aliases(
        &mut self,
        object_index: ObjectIndex,
        component: ObjectIndex,
    ) -> Result<(), Diagnostic> {
        let obj = &self.doc.objects[object_index];

        if obj.flags.is_inline_component_root && object_index != component {
            return Err(Diagnostic::error(
                "Nested inline components are not supported",
                self.doc.source_location(obj.location),
            ));
        }

        if let Some(id) = &obj.id {
            if self.scope.id_to_object.contains_key(id) {
                return Err(Diagnostic::error(
                    "id is not unique",
                    self.doc.source_location(obj.id_location),
                ));
            }
            let id = id.clone();
            self.set_object_id(object_index, id);
        }

        let obj = &self.doc.objects[object_index];
        if !obj.aliases.is_empty() {
            self.scope.objects_with_aliases.push(object_index);
        }

        // Stop at Component boundary
        if obj.flags.is_component && object_index != component {
            return Ok(());
        }

        for binding_index in 0..obj.bindings.len() {
            let value = self.doc.objects[object_index].bindings[binding_index].value.clone();
            match value {
                BindingValue::GroupProperty(target) => {
                    if self.is_generalized_group_property(object_index, binding_index, target) {
                        self.scope.generalized_group_properties.push((object_index, binding_index));
                    }
                    self.collect_ids_and_aliases(target, component)?;
                }
                BindingValue::Object(target) | BindingValue::AttachedProperty(target) => {
                    self.collect_ids_and_aliases(target, component)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// A group property whose object has no type and that does not correspond to a
    /// property of the object it is declared in
    fn is_generalized_group_property(
        &self,
        owner: ObjectIndex,
        binding_index: usize,
        target: ObjectIndex,
    ) -> bool {
        if self.doc.objects[target].type_name.is_some() {
            return false;
        }
        let Some(name) = &self.doc.objects[owner].bindings[binding_index].property_name else {
            return false;
        };
        !self.caches[owner].as_ref().is_some_and(|cache| cache.property(name).is_some())
    }

    fn set_object_id(&mut self, object_index: ObjectIndex, id: SmolStr) {
        let id_number = self.scope.named_objects.len();
        self.scope.named_objects.push(object_index);
        self.scope.id_to_object.insert(id, NamedObject { index: object_index, id_number });
        self.doc.objects[object_index].id_number = Some(id_number);
    }

    pub(super) fn warn_deprecated(&mut self, object_index: ObjectIndex, message: &str) {
        if !self.config.deprecation_warnings {
            return;
        }
        let location = self.doc.source_location(self.doc.objects[object_index].location);
        self.diag.push_warning_with_span(message.into(), location);
    }
}
