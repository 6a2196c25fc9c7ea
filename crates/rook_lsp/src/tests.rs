//! Manager, manifest and query tests.

use pretty_assertions::assert_eq;
use rook_model::{Category, DeclKind, Declaration, DiagnosticCode, LibraryId};
use rook_syntax::build::file;
use rook_syntax::{FileSyntax, Location, Position, Visibility::*};
use rook_types::Target;

use crate::*;

// ---- Helpers ----

fn provider(files: Vec<FileSyntax>) -> MemoryProvider {
    files
        .into_iter()
        .fold(MemoryProvider::new(), |provider, syntax| provider.with_document(syntax))
}

fn open(manifest: ProjectManifest, provider: MemoryProvider) -> Manager<MemoryProvider> {
    let paths: Vec<String> = provider.paths().map(str::to_string).collect();
    let mut manager = Manager::new(manifest, provider).expect("manager");
    for path in &paths {
        manager.on_changed(path);
    }
    manager.rebuild().expect("rebuild");
    manager
}

fn project(files: Vec<FileSyntax>) -> Manager<MemoryProvider> {
    open(ProjectManifest::new_project("app"), provider(files))
}

fn decl(manager: &Manager<MemoryProvider>, path: &str, name: &str) -> Declaration {
    let unit = manager.unit(path).expect("unit");
    *unit
        .declarations
        .iter()
        .find(|id| {
            manager
                .libraries()
                .declaration(id)
                .is_some_and(|record| record.name == name)
        })
        .expect("declaration")
}

fn codes(manager: &Manager<MemoryProvider>, path: &str) -> Vec<DiagnosticCode> {
    manager.diagnostics(path).iter().map(|d| d.code).collect()
}

fn name_at(manager: &Manager<MemoryProvider>, declaration: &Declaration) -> Position {
    manager
        .libraries()
        .declaration(declaration)
        .expect("record")
        .name_range
        .start
}

/// Start of the first non-definition occurrence of `target` in `path`.
fn reference_at(manager: &Manager<MemoryProvider>, path: &str, target: Target) -> Position {
    manager
        .unit(path)
        .expect("unit")
        .occurrences
        .iter()
        .find(|occurrence| !occurrence.definition && occurrence.target == target)
        .expect("reference")
        .range
        .start
}

fn zoo() -> Vec<FileSyntax> {
    vec![
        file("a.rk", |s| {
            s.class(Public, "Animal", &[], |c| {
                c.function(Public, "Speak", &[], &["string"]);
            })
            .interface(Public, "Pet", &[], |i| {
                i.function(Public, "Name", &[], &["string"]);
            });
        }),
        file("b.rk", |s| {
            s.class(Public, "Dog", &["Animal", "Pet"], |c| {
                c.function(Public, "Speak", &[], &["string"])
                    .function(Public, "Name", &[], &["string"]);
            });
        }),
        file("c.rk", |s| {
            s.function(Public, "Feed", &["Animal"], &[]);
        }),
    ]
}

// ---- Manifest ----

#[test]
fn test_manifest_defaults() {
    let manifest: ProjectManifest = "[project]\nname = \"app\"\n".parse().expect("manifest");
    assert_eq!(manifest, ProjectManifest::new_project("app"));
    assert_eq!(manifest.analysis.kernel, "kernel");
    assert!(manifest.analysis.suggestions);
    assert!(manifest.imports.libraries.is_empty());
}

#[test]
fn test_manifest_full() {
    let manifest: ProjectManifest = r#"
[project]
name = "game"

[imports]
libraries = ["collections", "math"]

[analysis]
kernel = "core"
suggestions = false
"#
    .parse()
    .expect("manifest");
    assert_eq!(manifest.project.name, "game");
    assert!(manifest.imports("math"));
    assert!(!manifest.imports("net"));
    assert_eq!(manifest.analysis.kernel, "core");
    assert!(!manifest.analysis.suggestions);
}

#[test]
fn test_manifest_rejects_reserved_names() {
    let kernel = "[project]\nname = \"kernel\"\n".parse::<ProjectManifest>();
    assert!(matches!(kernel, Err(ManifestError::Invalid(_))));

    let import_self = "[project]\nname = \"app\"\n[imports]\nlibraries = [\"app\"]\n"
        .parse::<ProjectManifest>();
    assert!(matches!(import_self, Err(ManifestError::Invalid(_))));

    let broken = "[project\nname = 1".parse::<ProjectManifest>();
    assert!(matches!(broken, Err(ManifestError::Parse(_))));
}

#[test]
fn test_manifest_save_and_load_from_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(matches!(
        ProjectManifest::load_dir(dir.path()),
        Err(ManifestError::Missing(_))
    ));

    let mut manifest = ProjectManifest::new_project("app");
    manifest.imports.libraries.push("collections".to_string());
    manifest
        .save_to(&dir.path().join(crate::manifest::MANIFEST_FILE))
        .expect("save");
    let loaded = ProjectManifest::load_dir(dir.path()).expect("load");
    assert_eq!(loaded, manifest);
}

#[test]
fn test_open_reads_the_manifest_from_the_project_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(matches!(
        Manager::open(dir.path(), MemoryProvider::new()),
        Err(ManagerError::Manifest(ManifestError::Missing(_)))
    ));

    ProjectManifest::new_project("shop")
        .save_to(&dir.path().join(crate::manifest::MANIFEST_FILE))
        .expect("save");
    let mut manager = Manager::open(dir.path(), MemoryProvider::new()).expect("open");
    assert_eq!(manager.manifest().project.name, "shop");
    assert_eq!(manager.try_load_library("shop").expect("self"), LibraryId::SELF);
}

// ---- Libraries ----

#[test]
fn test_builtin_kernel_loads_cleanly() {
    let manager = project(vec![]);
    let lib = &manager.libraries().kernel;
    let structs: Vec<&str> = lib
        .iter(Category::Struct)
        .map(|record| record.name.as_str())
        .collect();
    assert_eq!(structs, kernel::PRIMITIVES.to_vec());
    assert_eq!(lib.iter(Category::Class).count(), 1);
    assert!(manager.diagnostics(kernel::BUILTIN_PATH).is_empty());
    assert!(manager.diagnostics("kernel/operators.rk").is_empty());
}

#[test]
fn test_try_load_library_resolution_order() {
    let mut manifest = ProjectManifest::new_project("app");
    manifest.imports.libraries = vec!["collections".to_string(), "missing".to_string()];
    let sources = MemoryProvider::new().with_library(
        "collections",
        vec![file("collections/list.rk", |s| {
            s.structure(Public, "List", |_| {});
        })],
    );
    let mut manager = Manager::new(manifest, sources).expect("manager");

    assert_eq!(manager.try_load_library("kernel").expect("kernel"), LibraryId::KERNEL);
    assert_eq!(manager.try_load_library("app").expect("self"), LibraryId::SELF);
    let first = manager.try_load_library("collections").expect("import");
    assert_eq!(first, LibraryId::import(0));
    assert_eq!(manager.try_load_library("collections").expect("cached"), first);
    assert!(matches!(
        manager.try_load_library("net"),
        Err(ManagerError::UnknownLibrary(_))
    ));
    assert!(matches!(
        manager.try_load_library("missing"),
        Err(ManagerError::LibraryUnavailable(_))
    ));
}

#[test]
fn test_imported_library_types_resolve() {
    let mut manifest = ProjectManifest::new_project("app");
    manifest.imports.libraries.push("collections".to_string());
    let sources = provider(vec![file("main.rk", |s| {
        s.import("collections.lists")
            .variable(Public, "List", "items");
    })])
    .with_library(
        "collections",
        vec![file("collections/lists.rk", |s| {
            s.namespace("lists", |n| {
                n.structure(Public, "List", |_| {});
            });
        })],
    );
    let manager = open(manifest, sources);

    assert!(manager.diagnostics("main.rk").is_empty());
    let items = decl(&manager, "main.rk", "items");
    match &manager.libraries().declaration(&items).expect("items").kind {
        DeclKind::Variable(var) => assert_eq!(var.ty.library, LibraryId::import(0)),
        other => panic!("expected a variable, got {:?}", other),
    }
    let list = Declaration::new(LibraryId::import(0), Category::Struct, 0, Public);
    let hover = manager
        .hover("main.rk", reference_at(&manager, "main.rk", Target::Declaration(list)))
        .expect("hover");
    assert_eq!(hover.library, "collections");
    assert_eq!(hover.name, "lists.List");
}

// ---- Rebuild ----

#[test]
fn test_linked_project_has_no_diagnostics() {
    let manager = project(zoo());
    assert!(manager.all_diagnostics().is_empty());

    let animal = decl(&manager, "a.rk", "Animal");
    let dog = decl(&manager, "b.rk", "Dog");
    let record = manager.libraries().declaration(&animal).expect("animal");
    assert_eq!(record.as_class().expect("class").implementors, vec![dog]);
    assert_eq!(record.references.len(), 2);
}

#[test]
fn test_editing_one_file_keeps_other_identities_and_links() {
    let mut manager = project(zoo());
    let a_before = manager.unit("a.rk").expect("a").declarations.clone();
    let c_before = manager.unit("c.rk").expect("c").declarations.clone();
    let dog_before = decl(&manager, "b.rk", "Dog");

    manager.provider_mut().insert(file("b.rk", |s| {
        s.class(Public, "Dog", &["Animal", "Pet"], |c| {
            c.function(Public, "Speak", &[], &["string"])
                .function(Public, "Name", &[], &["string"])
                .function(Public, "Bark", &[], &[]);
        });
    }));
    manager.on_changed("b.rk");
    let report = manager.rebuild().expect("rebuild");
    assert_eq!(report.torn_down, 1);
    assert_eq!(report.tidied, 1);
    assert_eq!(report.linked, 3);

    assert_eq!(manager.unit("a.rk").expect("a").declarations, a_before);
    assert_eq!(manager.unit("c.rk").expect("c").declarations, c_before);
    assert_eq!(decl(&manager, "b.rk", "Dog"), dog_before);
    assert!(manager.all_diagnostics().is_empty());

    let libraries = manager.libraries();
    let animal = decl(&manager, "a.rk", "Animal");
    let pet = decl(&manager, "a.rk", "Pet");
    let record = libraries.declaration(&animal).expect("animal");
    assert_eq!(record.references.len(), 2);
    assert_eq!(record.as_class().expect("class").implementors.len(), 1);
    let speak = &record.functions()[0];
    assert_eq!(speak.callable().expect("speak").overridden_by.len(), 1);
    let name = &libraries.declaration(&pet).expect("pet").functions()[0];
    assert_eq!(name.callable().expect("name").implemented_by.len(), 1);
}

#[test]
fn test_rebuild_without_changes_is_stable() {
    let mut manager = project(zoo());
    let before: Vec<Vec<Declaration>> = manager.units().map(|u| u.declarations.clone()).collect();
    let report = manager.rebuild().expect("rebuild");
    assert_eq!(report.torn_down, 0);
    assert_eq!(report.linked, 3);
    let after: Vec<Vec<Declaration>> = manager.units().map(|u| u.declarations.clone()).collect();
    assert_eq!(before, after);

    let animal = decl(&manager, "a.rk", "Animal");
    let record = manager.libraries().declaration(&animal).expect("animal");
    assert_eq!(record.references.len(), 2);
}

#[test]
fn test_removing_a_file_unresolves_its_users() {
    let mut manager = project(zoo());
    manager.on_remove("a.rk");
    assert!(manager.is_pending());
    manager.rebuild().expect("rebuild");

    assert!(manager.unit("a.rk").is_none());
    assert_eq!(manager.libraries().project.iter(Category::Class).count(), 1);
    assert!(codes(&manager, "b.rk").contains(&DiagnosticCode::NotFound));
    assert!(codes(&manager, "c.rk").contains(&DiagnosticCode::NotFound));
}

#[test]
fn test_unparseable_document_counts_as_removed() {
    let mut manager = project(zoo());
    manager.provider_mut().remove("c.rk");
    manager.on_changed("c.rk");
    manager.on_changed("ghost.rk");
    let report = manager.rebuild().expect("rebuild");

    assert_eq!(report.torn_down, 1);
    assert_eq!(report.tidied, 0);
    assert!(manager.unit("c.rk").is_none());
    assert!(manager.unit("ghost.rk").is_none());
    assert_eq!(manager.paths().collect::<Vec<_>>(), vec!["a.rk", "b.rk"]);
}

#[test]
fn test_duplicate_functions_across_files_are_reported() {
    let manager = project(vec![
        file("one.rk", |s| {
            s.function(Public, "foo", &[], &["integer"]);
        }),
        file("two.rk", |s| {
            s.function(Public, "foo", &[], &["integer"]);
        }),
    ]);

    let all = manager.all_diagnostics();
    assert_eq!(all.len(), 2);
    for (path, other) in [("one.rk", "two.rk"), ("two.rk", "one.rk")] {
        let diagnostics = &all[path];
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::InvalidOverload);
        assert_eq!(diagnostics[0].related[0].location.document, other);
    }
}

#[test]
fn test_not_found_carries_a_suggestion() {
    let manager = project(vec![file("a.rk", |s| {
        s.variable(Public, "integr", "count");
    })]);
    let diagnostics = manager.diagnostics("a.rk");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("`integer`"));
}

// ---- Queries ----

fn shapes() -> Manager<MemoryProvider> {
    project(vec![file("q.rk", |s| {
        s.namespace("geo", |g| {
            g.structure(Public, "Point", |m| {
                m.variable(Public, "integer", "x");
            })
            .variable(Public, "Point", "origin")
            .function(Public, "Move", &["Point"], &["Point"]);
        });
    })])
}

#[test]
fn test_hover_describes_declarations() {
    let manager = shapes();
    let point = decl(&manager, "q.rk", "Point");
    let origin = decl(&manager, "q.rk", "origin");
    let shift = decl(&manager, "q.rk", "Move");

    let hover = manager.hover("q.rk", name_at(&manager, &point)).expect("hover");
    assert_eq!(hover.kind, "struct");
    assert_eq!(hover.name, "geo.Point");
    assert_eq!(hover.library, "app");

    let hover = manager.hover("q.rk", name_at(&manager, &origin)).expect("hover");
    assert_eq!(hover.ty.as_deref(), Some("geo.Point"));

    let hover = manager.hover("q.rk", name_at(&manager, &shift)).expect("hover");
    assert_eq!(hover.params, vec!["geo.Point".to_string()]);
    assert_eq!(hover.returns, vec!["geo.Point".to_string()]);
}

#[test]
fn test_definition_references_and_highlight() {
    let manager = shapes();
    let point = decl(&manager, "q.rk", "Point");
    let target = Target::Declaration(point);
    let usage = reference_at(&manager, "q.rk", target);
    let record = manager.libraries().declaration(&point).expect("point");

    assert_eq!(
        manager.definition("q.rk", usage),
        Some(Location::new("q.rk", record.name_range))
    );
    assert_eq!(manager.references("q.rk", usage).len(), 3);
    let highlights = manager.highlight("q.rk", usage);
    assert_eq!(highlights.len(), 4);
    assert!(highlights.contains(&record.name_range));
}

#[test]
fn test_namespace_queries() {
    let manager = shapes();
    let unit = manager.unit("q.rk").expect("unit");
    let namespace = unit.syntax.root.children[0].name.clone().expect("name");

    let hover = manager.hover("q.rk", namespace.range.start).expect("hover");
    assert_eq!(hover.kind, "namespace");
    assert_eq!(hover.name, "geo");
    assert_eq!(
        manager.definition("q.rk", namespace.range.start),
        Some(Location::new("q.rk", namespace.range))
    );
}

#[test]
fn test_queries_outside_any_name_are_empty() {
    let manager = shapes();
    let nowhere = Position::new(999, 0);
    assert!(manager.hover("q.rk", nowhere).is_none());
    assert!(manager.definition("q.rk", nowhere).is_none());
    assert!(manager.references("q.rk", nowhere).is_empty());
    assert!(manager.highlight("missing.rk", nowhere).is_empty());
}

#[test]
fn test_document_symbols_outline() {
    let manager = project(vec![file("s.rk", |s| {
        s.namespace("geo", |g| {
            g.structure(Public, "Point", |m| {
                m.variable(Public, "integer", "x")
                    .function(Public, "Length", &[], &["real"]);
            });
        })
        .constant(Public, "integer", "Zero");
    })]);

    let symbols = manager.document_symbols("s.rk");
    assert_eq!(symbols.len(), 2);
    assert_eq!(symbols[0].kind, SymbolKind::Namespace);
    assert_eq!(symbols[0].name, "geo");

    let point = &symbols[0].children[0];
    assert_eq!(point.kind, SymbolKind::Struct);
    let members: Vec<(&str, SymbolKind, Option<&str>)> = point
        .children
        .iter()
        .map(|m| (m.name.as_str(), m.kind, m.detail.as_deref()))
        .collect();
    assert_eq!(
        members,
        vec![
            ("x", SymbolKind::Field, Some("integer")),
            ("Length", SymbolKind::Method, Some("() -> real")),
        ]
    );

    assert_eq!(symbols[1].kind, SymbolKind::Constant);
    assert_eq!(symbols[1].detail.as_deref(), Some("integer"));
}
