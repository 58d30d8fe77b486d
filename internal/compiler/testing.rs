// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! Helpers to build documents in tests, as the parser would produce them.
//! Every element gets a location on its own line.

use crate::CompilerConfiguration;
use crate::diagnostics::{BuildDiagnostics, Location};
use crate::langtype::PropertyType;
use crate::object_tree::{
    Alias, Binding, BindingValue, Document, Object, ObjectIndex, PropertyDeclaration,
};
use crate::property_cache::PropertyCacheVector;
use crate::typeregister::TypeRegister;

pub struct DocBuilder {
    pub doc: Document,
    pub register: TypeRegister,
    pub config: CompilerConfiguration,
    line: u32,
}

impl DocBuilder {
    pub fn new() -> Self {
        Self {
            doc: Document::new("test.qml"),
            register: TypeRegister::builtin(),
            config: CompilerConfiguration::default(),
            line: 0,
        }
    }

    fn next_location(&mut self) -> Location {
        self.line += 1;
        Location::new(self.line, 5)
    }

    pub fn object(&mut self, type_name: &str) -> ObjectIndex {
        let location = self.next_location();
        self.doc.add_object(Object::new(Some(type_name), location))
    }

    /// An object without type, for group properties
    pub fn group(&mut self) -> ObjectIndex {
        let location = self.next_location();
        self.doc.add_object(Object::new(None, location))
    }

    pub fn id(&mut self, object: ObjectIndex, id: &str) -> Location {
        let location = self.next_location();
        let obj = &mut self.doc.objects[object];
        obj.id = Some(id.into());
        obj.id_location = location;
        location
    }

    pub fn bind(&mut self, owner: ObjectIndex, name: Option<&str>, value: BindingValue) -> Location {
        let location = self.next_location();
        self.doc.objects[owner].bindings.push(Binding::new(name, value, location));
        location
    }

    pub fn bind_object(
        &mut self,
        owner: ObjectIndex,
        name: Option<&str>,
        child: ObjectIndex,
    ) -> Location {
        self.bind(owner, name, BindingValue::Object(child))
    }

    pub fn bind_group(&mut self, owner: ObjectIndex, name: &str, child: ObjectIndex) -> Location {
        self.bind(owner, Some(name), BindingValue::GroupProperty(child))
    }

    pub fn alias(&mut self, owner: ObjectIndex, name: &str, reference: &str) -> Location {
        let location = self.next_location();
        self.doc.objects[owner].aliases.push(Alias::new(name, reference, location));
        location
    }

    pub fn property(&mut self, owner: ObjectIndex, name: &str, ty: PropertyType) {
        let location = self.next_location();
        self.doc.objects[owner].properties.push(PropertyDeclaration::new(name, ty, location));
    }

    /// Flag `root` as the root of an inline component containing `objects`
    pub fn inline_component(&mut self, root: ObjectIndex, objects: &[ObjectIndex]) {
        let flags = &mut self.doc.objects[root].flags;
        flags.is_inline_component_root = true;
        flags.is_part_of_inline_component = true;
        for o in objects {
            self.doc.objects[*o].flags.is_part_of_inline_component = true;
        }
    }
}

/// Run the property cache creator and the resolver on the document
pub fn compile(b: DocBuilder) -> (Document, PropertyCacheVector, BuildDiagnostics) {
    let DocBuilder { mut doc, mut register, config, .. } = b;
    let (caches, diag) = crate::compile_document(&mut doc, &mut register, &config);
    (doc, caches, diag)
}
