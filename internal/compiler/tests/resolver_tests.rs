// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! This test runs the resolver on all the documents in `tests/cases/*.json` and checks
//! the reported diagnostics.
//!
//! Each file contains the objects of a document as the parser would have created them,
//! and the expected diagnostics:
//! ```ignore
//!  "expected": [{ "level": "error", "line": 4, "message": "some_regexp" }]
//! ```
//!
//! Every diagnostic must be expected, and every expected diagnostic must be reported.
//! Files can also list the expected component roots and the properties that the
//! resolved aliases add to the property caches.

use i_qml_compiler::diagnostics::{BuildDiagnostics, DiagnosticLevel, Location};
use i_qml_compiler::langtype::PropertyType;
use i_qml_compiler::object_tree::{
    Alias, Binding, BindingValue, Document, FunctionDeclaration, Object, ObjectIndex,
    PropertyDeclaration, SignalDeclaration,
};
use i_qml_compiler::property_cache::PropertyCacheVector;
use i_qml_compiler::typeregister::TypeRegister;
use i_qml_compiler::{CompilerConfiguration, compile_document};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TestCase {
    objects: Vec<ObjectDesc>,
    #[serde(default)]
    expected: Vec<ExpectedDiagnostic>,
    component_roots: Option<Vec<usize>>,
    #[serde(default)]
    alias_properties: Vec<ExpectedProperty>,
    #[serde(default)]
    disable_generalized_groups: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ObjectDesc {
    #[serde(rename = "type")]
    type_name: Option<String>,
    id: Option<String>,
    line: u32,
    #[serde(default)]
    bindings: Vec<BindingDesc>,
    #[serde(default)]
    aliases: Vec<AliasDesc>,
    #[serde(default)]
    properties: Vec<PropertyDesc>,
    #[serde(default)]
    signals: Vec<String>,
    #[serde(default)]
    functions: Vec<String>,
    default_alias: Option<usize>,
    #[serde(default)]
    inline_component_root: bool,
    #[serde(default)]
    part_of_inline_component: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BindingDesc {
    property: Option<String>,
    value: ValueDesc,
    line: u32,
    #[serde(default)]
    signal_handler: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum ValueDesc {
    Object(usize),
    Group(usize),
    Attached(usize),
    Script(String),
    Number(f64),
    String(String),
    Boolean(bool),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AliasDesc {
    name: String,
    reference: String,
    line: u32,
    #[serde(default)]
    read_only: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PropertyDesc {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    line: u32,
    #[serde(default)]
    default: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExpectedDiagnostic {
    level: String,
    line: usize,
    message: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExpectedProperty {
    object: usize,
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    writable: Option<bool>,
}

fn location(line: u32) -> Location {
    Location::new(line, 1)
}

fn build_document(path: &Path, case: &TestCase) -> Result<Document, String> {
    let mut doc = Document::new(path);
    for desc in &case.objects {
        let mut obj = Object::new(desc.type_name.as_deref(), location(desc.line));
        if let Some(id) = &desc.id {
            obj = obj.with_id(id.as_str(), location(desc.line));
        }
        obj.flags.is_inline_component_root = desc.inline_component_root;
        obj.flags.is_part_of_inline_component =
            desc.part_of_inline_component || desc.inline_component_root;
        for b in &desc.bindings {
            let value = match &b.value {
                ValueDesc::Object(i) => BindingValue::Object(ObjectIndex::from(*i)),
                ValueDesc::Group(i) => BindingValue::GroupProperty(ObjectIndex::from(*i)),
                ValueDesc::Attached(i) => BindingValue::AttachedProperty(ObjectIndex::from(*i)),
                ValueDesc::Script(s) => BindingValue::Script(s.into()),
                ValueDesc::Number(n) => BindingValue::Number(*n),
                ValueDesc::String(s) => BindingValue::String(s.into()),
                ValueDesc::Boolean(v) => BindingValue::Boolean(*v),
            };
            let mut binding = Binding::new(b.property.as_deref(), value, location(b.line));
            binding.is_signal_handler_object = b.signal_handler;
            if binding.object_index().is_some_and(|child| usize::from(child) >= case.objects.len()) {
                return Err(format!("binding on line {} refers to a missing object", b.line));
            }
            obj.bindings.push(binding);
        }
        for a in &desc.aliases {
            let mut alias = Alias::new(a.name.as_str(), a.reference.as_str(), location(a.line));
            alias.read_only = a.read_only;
            obj.aliases.push(alias);
        }
        for p in &desc.properties {
            let ty = PropertyType::from_basic_name(&p.type_name)
                .ok_or_else(|| format!("unknown property type {}", p.type_name))?;
            let mut decl = PropertyDeclaration::new(p.name.as_str(), ty, location(p.line));
            decl.is_default = p.default;
            obj.properties.push(decl);
        }
        obj.signals = desc
            .signals
            .iter()
            .map(|name| SignalDeclaration { name: name.into(), location: location(desc.line) })
            .collect();
        obj.functions = desc
            .functions
            .iter()
            .map(|name| FunctionDeclaration { name: name.into(), location: location(desc.line) })
            .collect();
        obj.default_alias = desc.default_alias;
        doc.add_object(obj);
    }
    Ok(doc)
}

fn check_diagnostics(path: &Path, case: &TestCase, diag: &BuildDiagnostics) -> bool {
    let mut success = true;
    let mut diags = diag.iter().collect::<Vec<_>>();

    for expected in &case.expected {
        let level = match expected.level.as_str() {
            "error" => DiagnosticLevel::Error,
            "warning" => DiagnosticLevel::Warning,
            other => {
                eprintln!("{path:?}: Invalid level {other:?}");
                return false;
            }
        };
        let r = match regex::Regex::new(&expected.message) {
            Err(e) => {
                eprintln!("{path:?}: Invalid regexp {:?} : {e:?}", expected.message);
                return false;
            }
            Ok(r) => r,
        };
        match diags.iter().position(|d| {
            d.level() == level && d.line_column().0 == expected.line && r.is_match(d.message())
        }) {
            Some(idx) => {
                diags.remove(idx);
            }
            None => {
                success = false;
                eprintln!(
                    "{path:?}: {} not found at line {}: {:?}",
                    expected.level, expected.line, expected.message
                );
            }
        }
    }

    if !diags.is_empty() {
        eprintln!("{path:?}: Unexpected diagnostics: {diags:#?}");
        success = false;
    }
    success
}

fn check_results(path: &Path, case: &TestCase, doc: &Document, caches: &PropertyCacheVector) -> bool {
    let mut success = true;
    if let Some(expected_roots) = &case.component_roots {
        let roots = doc.component_roots.iter().map(|r| usize::from(*r)).collect::<Vec<_>>();
        if &roots != expected_roots {
            eprintln!("{path:?}: component roots are {roots:?}, expected {expected_roots:?}");
            success = false;
        }
    }
    for expected in &case.alias_properties {
        let property = caches
            .get(ObjectIndex::from(expected.object))
            .and_then(|c| c.as_deref())
            .and_then(|c| c.property(&expected.name));
        let Some(property) = property else {
            eprintln!("{path:?}: no property {} on object {}", expected.name, expected.object);
            success = false;
            continue;
        };
        if !property.flags.is_alias || property.property_type.to_string() != expected.type_name {
            eprintln!(
                "{path:?}: property {} of object {} is {:?}, expected an alias of type {}",
                expected.name, expected.object, property, expected.type_name
            );
            success = false;
        }
        if expected.writable.is_some_and(|w| w != property.flags.is_writable) {
            eprintln!("{path:?}: wrong writability for {}", expected.name);
            success = false;
        }
    }
    success
}

fn process_file(path: &Path) -> std::io::Result<bool> {
    let source = std::fs::read_to_string(path)?;
    let case: TestCase = match serde_json::from_str(&source) {
        Ok(case) => case,
        Err(e) => {
            eprintln!("{path:?}: Invalid test case: {e}");
            return Ok(false);
        }
    };
    let mut doc = match build_document(path, &case) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{path:?}: {e}");
            return Ok(false);
        }
    };

    let mut register = TypeRegister::builtin();
    let config = CompilerConfiguration {
        generalized_group_properties: !case.disable_generalized_groups,
        ..CompilerConfiguration::default()
    };
    let (caches, diag) = compile_document(&mut doc, &mut register, &config);

    let mut success = check_diagnostics(path, &case, &diag);
    if !diag.has_errors() {
        success &= check_results(path, &case, &doc, &caches);
    }
    Ok(success)
}

fn case_files() -> std::io::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(format!("{}/tests/cases", env!("CARGO_MANIFEST_DIR")))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            entries.push(path);
        }
    }
    entries.sort();
    Ok(entries)
}

#[test]
fn resolver_tests() -> std::io::Result<()> {
    use rayon::prelude::*;

    if let Some(specific_test) = std::env::args().skip(1).find(|arg| arg.ends_with(".json")) {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("tests");
        path.push(specific_test);
        assert!(process_file(&path)?);
        return Ok(());
    }

    let test_entries = case_files()?;
    assert!(!test_entries.is_empty());

    let success = test_entries
        .par_iter()
        .try_fold(
            || true,
            |mut success, path| {
                success &= process_file(path)?;
                Ok::<bool, std::io::Error>(success)
            },
        )
        .try_reduce(|| true, |success, result| Ok(success & result))?;

    assert!(success);

    Ok(())
}
