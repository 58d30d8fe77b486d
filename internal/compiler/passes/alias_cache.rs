// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! Appends the properties created by resolved aliases to the property cache of their object.

use crate::diagnostics::{Diagnostic, Location};
use crate::langtype::PropertyType;
use crate::object_tree::{AliasKind, Document, ObjectIndex};
use crate::property_cache::{self, PropertyCacheVector, PropertyData, PropertyFlags};
use crate::typeregister::TypeRegister;

pub(super) struct AliasCacheCreator<'a> {
    doc: &'a Document,
    caches: &'a mut PropertyCacheVector,
    register: &'a TypeRegister,
}

impl<'a> AliasCacheCreator<'a> {
    pub fn new(
        doc: &'a Document,
        caches: &'a mut PropertyCacheVector,
        register: &'a TypeRegister,
    ) -> Self {
        Self { doc, caches, register }
    }

    /// All the aliases of the object must be resolved.
    ///
    /// Aliases that are already in the cache are skipped, so calling this again is harmless.
    pub fn append_aliases_to_property_cache(
        &mut self,
        object_index: ObjectIndex,
    ) -> Result<(), Diagnostic> {
        let doc = self.doc;
        let object = &doc.objects[object_index];
        if object.aliases.is_empty() {
            return Ok(());
        }

        let mut new_properties = Vec::with_capacity(object.aliases.len());
        for alias_index in 0..object.aliases.len() {
            new_properties.push(self.property_data_for_alias(object_index, alias_index)?);
        }

        let cache = property_cache::own_at(self.caches, object_index);
        for (alias_index, (alias, (property_type, flags))) in
            object.aliases.iter().zip(new_properties).enumerate()
        {
            if cache.has_alias(&alias.name) {
                continue;
            }
            if object.default_alias == Some(alias_index) {
                cache.set_default_property_name(alias.name.clone());
            }
            cache.append_property(alias.name.clone(), property_type, flags);
        }
        log::trace!("aliases of {object_index} appended to its property cache");
        Ok(())
    }

    fn property_data_for_alias(
        &self,
        object_index: ObjectIndex,
        alias_index: usize,
    ) -> Result<(PropertyType, PropertyFlags), Diagnostic> {
        let objects = &self.doc.objects;
        let mut alias = &objects[object_index].aliases[alias_index];
        let mut read_only = alias.read_only;
        let mut seen = vec![(object_index, alias_index)];
        let mut flags = PropertyFlags { is_alias: true, ..Default::default() };

        loop {
            let Some(resolved) = alias.resolved() else {
                return Err(self.error("Invalid alias target", alias.location));
            };

            let property_type = match resolved.kind {
                AliasKind::LocalAlias { alias_index } => {
                    let next = (resolved.target_object, alias_index);
                    let target_alias = &objects[next.0].aliases[next.1];
                    if seen.contains(&next) {
                        return Err(self.error("Cyclic alias", target_alias.location));
                    }
                    seen.push(next);
                    alias = target_alias;
                    read_only |= alias.read_only;
                    continue;
                }
                AliasKind::PointerObject => {
                    let target = &objects[resolved.target_object];
                    let Some(ty) =
                        target.type_name.as_ref().and_then(|n| self.register.lookup(n))
                    else {
                        return Err(self.error("Invalid alias target", target.location));
                    };
                    PropertyType::Object(ty)
                }
                AliasKind::Property { core_index, value_type_index, .. } => {
                    let property = self.target_property(
                        resolved.target_object,
                        core_index,
                        alias.reference_location,
                    )?;
                    copy_property_flags(&mut flags, property);
                    match value_type_index {
                        None => property.property_type,
                        Some(index) => {
                            let Some(member) =
                                property.property_type.value_type().and_then(|vt| vt.property(index))
                            else {
                                return Err(
                                    self.error("Invalid alias target", alias.reference_location)
                                );
                            };
                            flags.is_resettable = flags.is_writable && member.resettable;
                            flags.is_writable = flags.is_writable && member.writable;
                            flags.is_bindable = true;
                            flags.is_var = member.ty == PropertyType::Var;
                            member.ty
                        }
                    }
                }
                AliasKind::DeepProperty { group_object, sub_core_index, .. } => {
                    let property =
                        self.target_property(group_object, sub_core_index, alias.reference_location)?;
                    copy_property_flags(&mut flags, property);
                    property.property_type
                }
            };

            flags.is_writable &= !read_only;
            return Ok((property_type, flags));
        }
    }

    fn target_property(
        &self,
        object: ObjectIndex,
        core_index: usize,
        location: Location,
    ) -> Result<&PropertyData, Diagnostic> {
        self.caches[object]
            .as_deref()
            .and_then(|cache| cache.property_at(core_index))
            .ok_or_else(|| self.error("Invalid alias target", location))
    }

    fn error(&self, message: &str, location: Location) -> Diagnostic {
        Diagnostic::error(message, self.doc.source_location(location))
    }
}

fn copy_property_flags(flags: &mut PropertyFlags, property: &PropertyData) {
    flags.is_writable = property.flags.is_writable;
    flags.is_resettable = property.flags.is_resettable;
    flags.is_bindable = property.flags.is_bindable;
    flags.is_var = property.flags.is_var;
}
