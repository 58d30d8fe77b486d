// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! Classify objects as components, validate explicit `Component` declarations and wrap
//! objects assigned to Component typed properties into synthesized components.

use std::rc::Rc;

use super::component_and_alias_resolver::ComponentAndAliasResolver;
use crate::diagnostics::Diagnostic;
use crate::object_tree::{BindingValue, Object, ObjectIndex};
use crate::property_cache::PropertyCache;

impl ComponentAndAliasResolver<'_> {
    /// The object is declared with the Component type itself
    pub(super) fn is_explicit_component(&self, index: ObjectIndex) -> bool {
        self.doc.objects[index]
            .type_name
            .as_ref()
            .and_then(|name| self.register.lookup(name))
            .is_some_and(|ty| self.register.is_component(ty))
    }

    pub(super) fn resolve_components_in_inline_component_root(
        &mut self,
        root: ObjectIndex,
    ) -> Result<(), Diagnostic> {
        if self.is_explicit_component(root) {
            self.warn_deprecated(
                root,
                "Using a Component as the root of an inline component is deprecated: inline \
                 components are automatically wrapped into Components when needed.",
            );
        }
        if self.caches.get(root).is_some_and(Option::is_some) {
            self.find_and_register_implicit_components(root)?;
        }
        Ok(())
    }

    /// Wrap the objects bound to Component typed properties of this object
    pub(super) fn find_and_register_implicit_components(
        &mut self,
        index: ObjectIndex,
    ) -> Result<(), Diagnostic> {
        let Some(cache) = self.caches[index].clone() else { return Ok(()) };

        for binding_index in 0..self.doc.objects[index].bindings.len() {
            let binding = &self.doc.objects[index].bindings[binding_index];
            let BindingValue::Object(target) = binding.value else { continue };
            if binding.is_signal_handler_object {
                continue;
            }

            // Unknown types are reported when creating the property caches
            let Some(target_type) =
                self.doc.objects[target].type_name.as_ref().and_then(|n| self.register.lookup(n))
            else {
                continue;
            };
            if self.register.is_usable_component(target_type) {
                continue;
            }

            let property = match &binding.property_name {
                Some(name) => cache.property(name),
                None => cache.default_property(),
            };
            let Some(property_type) = property.and_then(|p| p.property_type.object_type()) else {
                continue;
            };
            let expects_component = self
                .register
                .first_builtin_type(property_type)
                .is_some_and(|ty| self.register.inherits_component(ty));
            if !expects_component {
                continue;
            }

            self.wrap_implicit_component(index, binding_index)?;
        }
        Ok(())
    }

    /// Insert a synthesized `Component` between the object and the value of its binding
    fn wrap_implicit_component(
        &mut self,
        owner: ObjectIndex,
        binding_index: usize,
    ) -> Result<(), Diagnostic> {
        let binding = self.doc.objects[owner].bindings[binding_index].clone();
        // The synthesized object needs a cache at the same index
        let in_sync = self.caches.len() == self.doc.objects.len();
        let Some(wrapped) = binding.object_index().filter(|_| in_sync) else {
            return Err(Diagnostic::error(
                "Cannot wrap implicit component",
                self.doc.source_location(binding.value_location),
            ));
        };

        let component_type = self.register.component_type();
        let type_name = self.register.qualified_component_name();
        if self.register.lookup(&type_name).is_none() {
            self.register.insert_type_with_name(component_type, type_name.clone());
        }

        let mut component = Object::new(Some(&type_name), binding.value_location);
        component.flags.is_component = true;
        component.flags.is_implicit_component = true;
        // Stays in the inline component of its owner
        component.flags.is_part_of_inline_component =
            self.doc.objects[owner].flags.is_part_of_inline_component;
        let mut content = binding;
        content.property_name = None;
        content.value = BindingValue::Object(wrapped);
        component.bindings.push(content);

        let component_index = self.doc.add_object(component);
        self.caches.push(Some(Rc::new(PropertyCache::for_type(self.register, component_type))));
        self.doc.objects[owner].bindings[binding_index].value =
            BindingValue::Object(component_index);
        log::debug!("wrapped object {wrapped} in implicit component {component_index}");
        self.component_roots.push(component_index);
        Ok(())
    }

    /// Check that an explicit `Component` declaration only contains one object, and flag it
    pub(super) fn mark_as_component(&mut self, index: ObjectIndex) -> Result<(), Diagnostic> {
        let obj = &self.doc.objects[index];
        let error = |message: &str, location| {
            Err(Diagnostic::error(message, self.doc.source_location(location)))
        };

        if !obj.functions.is_empty() {
            return error("Component objects cannot declare new functions.", obj.location);
        }
        if !obj.properties.is_empty() || !obj.aliases.is_empty() {
            return error("Component objects cannot declare new properties.", obj.location);
        }
        if !obj.signals.is_empty() {
            return error("Component objects cannot declare new signals.", obj.location);
        }
        let Some(first) = obj.first_binding() else {
            return error("Cannot create empty component specification", obj.location);
        };
        if obj.bindings.iter().any(|b| b.property_name.is_some()) {
            return error(
                "Component elements may not contain properties other than id",
                first.location,
            );
        }
        if obj.bindings.len() > 1 || !first.is_object_binding() {
            return error("Invalid component body specification", obj.location);
        }

        self.doc.objects[index].flags.is_component = true;
        Ok(())
    }
}
