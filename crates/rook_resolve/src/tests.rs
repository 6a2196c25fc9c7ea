//! Name and visibility resolution tests.

use pretty_assertions::assert_eq;
use rook_model::*;
use rook_syntax::{Ident, Range, Visibility};

use crate::context::Context;

// ---- Helpers ----

struct Fixture {
    libraries: LibrarySet,
    line: u32,
}

impl Fixture {
    fn new() -> Self {
        Self {
            libraries: LibrarySet::new("app", "kernel"),
            line: 0,
        }
    }

    fn ident(&mut self, name: &str) -> Ident {
        self.line += 1;
        Ident::new(name, Range::on_line(self.line, 0, name.len() as u32))
    }

    fn space(&mut self, library: LibraryId, dotted: &str) -> SpaceRef {
        let lib = self.libraries.get_mut(library).expect("library");
        let mut space = lib.spaces.root();
        for segment in dotted.split('.').filter(|s| !s.is_empty()) {
            space = lib.spaces.child(space, segment);
        }
        SpaceRef::new(library, space)
    }

    fn declare(
        &mut self,
        space: SpaceRef,
        category: Category,
        name: &str,
        visibility: Visibility,
        document: &str,
    ) -> Declaration {
        let ident = self.ident(name);
        let lib = self.libraries.get_mut(space.library).expect("library");
        let id = Declaration::new(space.library, category, lib.table_len(category), visibility);
        lib.insert(AbstractDeclaration::new(&ident, document, space.space, id))
            .expect("insert");
        lib.spaces.declare(space.space, name, id);
        id
    }

    fn member(
        &mut self,
        owner: Declaration,
        category: Category,
        name: &str,
        visibility: Visibility,
    ) -> Declaration {
        let ident = self.ident(name);
        let record = self.libraries.declaration_mut(&owner).expect("owner");
        let document = record.document.clone();
        let space = record.space;
        let list = record.members_mut(category).expect("member list");
        let id = Declaration::member(owner.library, category, list.len() as u32, owner.index, visibility);
        list.push(AbstractDeclaration::new(&ident, &document, space, id));
        id
    }

    fn set_parent(&mut self, class: Declaration, parent: Declaration) {
        let record = self.libraries.declaration_mut(&class).expect("class");
        if let DeclKind::Class(info) = &mut record.kind {
            info.parent = Some(Type::of(&parent));
        }
    }

    fn ctx<'a>(&'a self, document: &'a str, space: SpaceRef) -> Context<'a> {
        Context::new(&self.libraries, document, space)
    }
}

fn name(text: &str) -> Ident {
    Ident::new(text, Range::on_line(100, 0, text.len() as u32))
}

// ---- Simple lookups ----

#[test]
fn test_nearest_enclosing_namespace_wins() {
    let mut fx = Fixture::new();
    let root = fx.space(LibraryId::SELF, "");
    let inner = fx.space(LibraryId::SELF, "a.b");
    let outer_decl = fx.declare(root, Category::Struct, "Point", Visibility::Public, "x.rk");
    let inner_decl = fx.declare(inner, Category::Struct, "Point", Visibility::Public, "y.rk");

    let mut diags = vec![];
    assert_eq!(fx.ctx("z.rk", inner).find_declaration(&name("Point"), &mut diags), vec![inner_decl]);
    assert_eq!(fx.ctx("z.rk", root).find_declaration(&name("Point"), &mut diags), vec![outer_decl]);
    assert!(diags.is_empty());
}

#[test]
fn test_imports_searched_in_order_after_namespaces() {
    let mut fx = Fixture::new();
    let here = fx.space(LibraryId::SELF, "app");
    let first = fx.space(LibraryId::SELF, "lib.first");
    let second = fx.space(LibraryId::SELF, "lib.second");
    let a = fx.declare(first, Category::Class, "Widget", Visibility::Public, "f.rk");
    fx.declare(second, Category::Class, "Widget", Visibility::Public, "s.rk");

    let imports = [first, second];
    let mut diags = vec![];
    let found = fx
        .ctx("main.rk", here)
        .with_imports(&imports)
        .find_declaration(&name("Widget"), &mut diags);
    assert_eq!(found, vec![a]);
}

#[test]
fn test_kernel_declarations_always_reachable() {
    let mut fx = Fixture::new();
    let kernel = fx.space(LibraryId::KERNEL, "");
    let integer = fx.declare(kernel, Category::Struct, "integer", Visibility::None, "kernel.rk");
    let here = fx.space(LibraryId::SELF, "deep.down");

    let mut diags = vec![];
    let found = fx.ctx("main.rk", here).find_declaration(&name("integer"), &mut diags);
    assert_eq!(found, vec![integer]);
}

#[test]
fn test_not_found_suggests_close_name() {
    let mut fx = Fixture::new();
    let root = fx.space(LibraryId::SELF, "");
    fx.declare(root, Category::Struct, "Vector", Visibility::Public, "v.rk");

    let mut diags = vec![];
    let found = fx.ctx("main.rk", root).find_declaration(&name("Vectr"), &mut diags);
    assert!(found.is_empty());
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, DiagnosticCode::NotFound);
    assert!(diags[0].message.contains("Did you mean `Vector`?"), "{}", diags[0].message);

    let mut quiet = vec![];
    fx.ctx("main.rk", root)
        .with_suggestions(false)
        .find_declaration(&name("Vectr"), &mut quiet);
    assert!(!quiet[0].message.contains("Did you mean"));
}

#[test]
fn test_suggestions_skip_unreachable_names() {
    let mut fx = Fixture::new();
    let root = fx.space(LibraryId::SELF, "");
    fx.declare(root, Category::Function, "Helper", Visibility::None, "a.rk");

    let mut diags = vec![];
    fx.ctx("b.rk", root).find_declaration(&name("Helpr"), &mut diags);
    assert_eq!(diags[0].code, DiagnosticCode::NotFound);
    assert!(!diags[0].message.contains("Did you mean"), "{}", diags[0].message);

    let mut local = vec![];
    fx.ctx("a.rk", root).find_declaration(&name("Helpr"), &mut local);
    assert!(local[0].message.contains("Did you mean `Helper`?"), "{}", local[0].message);
}

#[test]
fn test_private_declaration_in_other_document_is_not_accessible() {
    let mut fx = Fixture::new();
    let root = fx.space(LibraryId::SELF, "");
    fx.declare(root, Category::Function, "helper", Visibility::None, "a.rk");

    let mut diags = vec![];
    assert!(fx.ctx("b.rk", root).find_declaration(&name("helper"), &mut diags).is_empty());
    assert!(diags[0].message.contains("not accessible"));
}

// ---- Member lookups ----

#[test]
fn test_class_members_hide_namespace_declarations() {
    let mut fx = Fixture::new();
    let root = fx.space(LibraryId::SELF, "");
    fx.declare(root, Category::Variable, "value", Visibility::Public, "a.rk");
    let class = fx.declare(root, Category::Class, "Box", Visibility::Public, "a.rk");
    let member = fx.member(class, Category::ClassVariable, "value", Visibility::None);

    let mut diags = vec![];
    let found = fx
        .ctx("a.rk", root)
        .within(Some(class))
        .find_declaration(&name("value"), &mut diags);
    assert_eq!(found, vec![member]);
}

#[test]
fn test_constructors_do_not_hide_their_class() {
    let mut fx = Fixture::new();
    let root = fx.space(LibraryId::SELF, "");
    let class = fx.declare(root, Category::Class, "Node", Visibility::Public, "a.rk");
    fx.member(class, Category::Constructor, "Node", Visibility::Public);
    fx.member(class, Category::Constructor, "Node", Visibility::Public);

    let mut diags = vec![];
    let found = fx
        .ctx("a.rk", root)
        .within(Some(class))
        .find_declaration(&name("Node"), &mut diags);
    assert_eq!(found, vec![class]);
    assert!(diags.is_empty());
}

#[test]
fn test_member_lookup_walks_parent_chain() {
    let mut fx = Fixture::new();
    let root = fx.space(LibraryId::SELF, "");
    let animal = fx.declare(root, Category::Class, "Animal", Visibility::Public, "a.rk");
    let dog = fx.declare(root, Category::Class, "Dog", Visibility::Public, "b.rk");
    fx.set_parent(dog, animal);
    let speak = fx.member(animal, Category::ClassFunction, "Speak", Visibility::Protected);

    let mut diags = vec![];
    let found = fx
        .ctx("b.rk", root)
        .within(Some(dog))
        .find_declaration(&name("Speak"), &mut diags);
    assert_eq!(found, vec![speak]);
}

#[test]
fn test_circular_parent_chain_terminates() {
    let mut fx = Fixture::new();
    let root = fx.space(LibraryId::SELF, "");
    let a = fx.declare(root, Category::Class, "A", Visibility::Public, "a.rk");
    let b = fx.declare(root, Category::Class, "B", Visibility::Public, "a.rk");
    fx.set_parent(a, b);
    fx.set_parent(b, a);
    assert_eq!(crate::class_ancestors(&fx.libraries, &a), vec![b]);
}

// ---- Namespaces and paths ----

#[test]
fn test_find_space_prefers_enclosing_chain() {
    let mut fx = Fixture::new();
    let inner = fx.space(LibraryId::SELF, "outer.util");
    let top_util = fx.space(LibraryId::SELF, "util");
    let here = fx.space(LibraryId::SELF, "outer.code");

    let mut diags = vec![];
    assert_eq!(fx.ctx("a.rk", here).find_space(&name("util"), &mut diags), Some(inner));
    let elsewhere = fx.space(LibraryId::SELF, "other");
    assert_eq!(fx.ctx("a.rk", elsewhere).find_space(&name("util"), &mut diags), Some(top_util));
    assert!(diags.is_empty());
}

#[test]
fn test_ambiguous_space_diagnosed_and_first_used() {
    let mut fx = Fixture::new();
    fx.libraries.add_import("left");
    fx.libraries.add_import("right");
    let left = fx.space(LibraryId::import(0), "");
    let right = fx.space(LibraryId::import(1), "");
    let left_io = fx.space(LibraryId::import(0), "io");
    fx.space(LibraryId::import(1), "io");
    let here = fx.space(LibraryId::SELF, "main");

    let imports = [left, right];
    let mut diags = vec![];
    let found = fx
        .ctx("a.rk", here)
        .with_imports(&imports)
        .find_space(&name("io"), &mut diags);
    assert_eq!(found, Some(left_io));
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, DiagnosticCode::Ambiguous);
}

#[test]
fn test_library_name_resolves_to_its_root() {
    let mut fx = Fixture::new();
    let lib = fx.libraries.add_import("collections");
    let list = fx.space(lib, "list");
    let decl = fx.declare(list, Category::Class, "List", Visibility::Public, "list.rk");
    let here = fx.space(LibraryId::SELF, "");

    let path = vec![name("collections"), name("list"), name("List")];
    let mut diags = vec![];
    let resolution = fx.ctx("a.rk", here).find_declaration_path(&path, &mut diags);
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(resolution.declarations, vec![decl]);
    assert_eq!(resolution.spaces.len(), 2);
    assert_eq!(resolution.spaces[1].1, list);
}

#[test]
fn test_path_with_missing_segment_reports_segment() {
    let mut fx = Fixture::new();
    fx.space(LibraryId::SELF, "geo");
    let here = fx.space(LibraryId::SELF, "");
    let path = vec![name("geo"), name("shapes"), name("Point")];
    let mut diags = vec![];
    let resolution = fx.ctx("a.rk", here).find_declaration_path(&path, &mut diags);
    assert!(resolution.declarations.is_empty());
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("namespace `shapes`"));
}

#[test]
fn test_find_operation_merges_scopes() {
    let mut fx = Fixture::new();
    let kernel = fx.space(LibraryId::KERNEL, "");
    let k = fx.declare(kernel, Category::Native, "+", Visibility::Public, "kernel.rk");
    let root = fx.space(LibraryId::SELF, "");
    let r = fx.declare(root, Category::Function, "+", Visibility::Public, "a.rk");
    let math = fx.space(LibraryId::SELF, "math");
    let m = fx.declare(math, Category::Function, "+", Visibility::Public, "m.rk");
    let here = fx.space(LibraryId::SELF, "app");

    let imports = [math, root];
    let found = fx.ctx("x.rk", here).with_imports(&imports).find_operation("+");
    assert_eq!(found, vec![k, r, m]);
}

// ---- Visibility ----

#[test]
fn test_public_visible_everywhere() {
    let mut fx = Fixture::new();
    let lib = fx.libraries.add_import("ext");
    let ext = fx.space(lib, "x");
    let public = fx.declare(ext, Category::Struct, "P", Visibility::Public, "p.rk");
    let internal = fx.declare(ext, Category::Struct, "I", Visibility::Internal, "p.rk");
    let here = fx.space(LibraryId::SELF, "anywhere");
    let ctx = fx.ctx("main.rk", here);
    assert!(ctx.is_visible(&public));
    assert!(!ctx.is_visible(&internal));
}

#[test]
fn test_self_library_modifiers() {
    let mut fx = Fixture::new();
    let geo = fx.space(LibraryId::SELF, "geo");
    let below = fx.space(LibraryId::SELF, "geo.shapes");
    let other = fx.space(LibraryId::SELF, "net");
    let internal = fx.declare(geo, Category::Class, "I", Visibility::Internal, "g.rk");
    let space = fx.declare(geo, Category::Class, "S", Visibility::Space, "g.rk");
    let private = fx.declare(geo, Category::Class, "N", Visibility::None, "g.rk");

    assert!(fx.ctx("n.rk", other).is_visible(&internal));
    assert!(fx.ctx("n.rk", below).is_visible(&space));
    assert!(!fx.ctx("n.rk", other).is_visible(&space));
    assert!(fx.ctx("g.rk", other).is_visible(&private));
    assert!(!fx.ctx("n.rk", geo).is_visible(&private));
}

#[test]
fn test_foreign_protected_member_needs_subclass() {
    let mut fx = Fixture::new();
    let lib = fx.libraries.add_import("ext");
    let ext = fx.space(lib, "");
    let base = fx.declare(ext, Category::Class, "Base", Visibility::Public, "b.rk");
    let guarded = fx.member(base, Category::ClassFunction, "Guarded", Visibility::Protected);
    let open = fx.member(base, Category::ClassFunction, "Open", Visibility::Public);
    let hidden = fx.member(base, Category::ClassFunction, "Hidden", Visibility::Internal);

    let here = fx.space(LibraryId::SELF, "");
    let derived = fx.declare(here, Category::Class, "Derived", Visibility::Public, "d.rk");
    let stranger = fx.declare(here, Category::Class, "Stranger", Visibility::Public, "d.rk");
    fx.set_parent(derived, base);

    let in_derived = fx.ctx("d.rk", here).within(Some(derived));
    let in_stranger = fx.ctx("d.rk", here).within(Some(stranger));
    assert!(in_derived.is_visible(&guarded));
    assert!(!in_stranger.is_visible(&guarded));
    assert!(in_stranger.is_visible(&open));
    assert!(!in_derived.is_visible(&hidden));
}

#[test]
fn test_self_member_private_visible_to_owner_and_subclasses() {
    let mut fx = Fixture::new();
    let root = fx.space(LibraryId::SELF, "");
    let base = fx.declare(root, Category::Class, "Base", Visibility::Public, "a.rk");
    let secret = fx.member(base, Category::ClassVariable, "secret", Visibility::None);
    let child = fx.declare(root, Category::Class, "Child", Visibility::Public, "b.rk");
    let other = fx.declare(root, Category::Class, "Other", Visibility::Public, "b.rk");
    fx.set_parent(child, base);

    assert!(fx.ctx("a.rk", root).within(Some(base)).is_visible(&secret));
    assert!(fx.ctx("b.rk", root).within(Some(child)).is_visible(&secret));
    assert!(!fx.ctx("b.rk", root).within(Some(other)).is_visible(&secret));
}

#[test]
fn test_levenshtein_and_suggest() {
    assert_eq!(crate::levenshtein("kitten", "sitting"), 3);
    assert_eq!(crate::suggest("Strng", &["string", "Strong", "Other"]).as_deref(), Some("Strong"));
    assert_eq!(crate::suggest("zzz", &["string"]), None);
}
