// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! Group properties that do not match a property of their object when the property caches
//! are created, such as `anAlias.prop: value` or `someId.prop: value`.
//!
//! Once the aliases of the component are in the caches, these are resolved against the
//! alias properties, or against the ids of the component.

use std::rc::Rc;

use super::component_and_alias_resolver::ComponentAndAliasResolver;
use crate::diagnostics::Diagnostic;
use crate::object_tree::{BindingValue, ObjectIndex};
use crate::property_cache::{PropertyCache, group_property_cache};

impl ComponentAndAliasResolver<'_> {
    pub(super) fn resolve_generalized_group_properties(
        &mut self,
        component: ObjectIndex,
    ) -> Result<(), Diagnostic> {
        let pending = std::mem::take(&mut self.scope.generalized_group_properties);
        if !self.config.generalized_group_properties {
            return Ok(());
        }
        for (owner, binding_index) in pending {
            self.resolve_generalized_group_property(owner, binding_index)?;
        }
        log::trace!("generalized group properties resolved in component {component}");
        Ok(())
    }

    fn resolve_generalized_group_property(
        &mut self,
        owner: ObjectIndex,
        binding_index: usize,
    ) -> Result<(), Diagnostic> {
        let binding = &self.doc.objects[owner].bindings[binding_index];
        let (Some(name), BindingValue::GroupProperty(target)) =
            (binding.property_name.clone(), binding.value.clone())
        else {
            return Ok(());
        };
        let location = self.doc.source_location(binding.location);

        let owner_property = self.caches[owner].as_deref().and_then(|c| c.property(&name)).cloned();
        let cache: PropertyCache = if let Some(property) = owner_property {
            let Some(cache) = group_property_cache(self.register, &property) else {
                return Err(Diagnostic::error(
                    format!("Invalid grouped property access: \"{name}\" is not an object"),
                    location,
                ));
            };
            cache
        } else if let Some(cache) = self
            .scope
            .id_to_object
            .get(&name)
            .and_then(|named| self.caches[named.index].as_deref())
        {
            cache.clone()
        } else {
            return Err(Diagnostic::error(
                format!("Cannot assign to non-existent property \"{name}\""),
                location,
            ));
        };

        log::debug!(
            "group property '{name}' of {owner} resolved with {} properties",
            cache.property_count()
        );
        self.caches[target] = Some(Rc::new(cache));
        self.doc.objects[target].resolved_group = true;
        Ok(())
    }
}
