//! Builders for assembling declaration trees by hand.
//!
//! Used by the built-in kernel and by tests. Every identifier and type
//! reference the builder creates is placed on its own source line, so
//! ranges are distinct and ordered by creation.

use crate::common::*;
use crate::item::*;
use crate::types::TypeRef;

/// Hands out one fresh line per created name.
#[derive(Debug, Default)]
struct Cursor {
    line: u32,
}

impl Cursor {
    fn next_line(&mut self) -> u32 {
        let line = self.line;
        self.line += 1;
        line
    }

    fn ident(&mut self, name: &str) -> Ident {
        let line = self.next_line();
        Ident::new(name, Range::on_line(line, 4, name.chars().count() as u32))
    }

    /// Parse `a.b.Name[][]` into a type reference laid out on one line.
    fn type_ref(&mut self, text: &str) -> TypeRef {
        let line = self.next_line();
        let mut base = text.trim();
        let mut dimension = 0;
        while let Some(stripped) = base.strip_suffix("[]") {
            base = stripped;
            dimension += 1;
        }
        let mut column = 4;
        let mut path = Vec::new();
        for segment in base.split('.') {
            let len = segment.chars().count() as u32;
            path.push(Ident::new(segment, Range::on_line(line, column, len)));
            column += len + 1;
        }
        TypeRef::new(path, dimension)
    }

    fn params(&mut self, types: &[&str]) -> Vec<ParamNode> {
        types
            .iter()
            .enumerate()
            .map(|(i, ty)| ParamNode {
                ty: self.type_ref(ty),
                name: Some(self.ident(&format!("arg{}", i))),
            })
            .collect()
    }

    fn types(&mut self, types: &[&str]) -> Vec<TypeRef> {
        types.iter().map(|ty| self.type_ref(ty)).collect()
    }

    fn path(&mut self, dotted: &str) -> (Vec<Ident>, Range) {
        let line = self.next_line();
        let mut column = 7;
        let mut path = Vec::new();
        for segment in dotted.split('.') {
            let len = segment.chars().count() as u32;
            path.push(Ident::new(segment, Range::on_line(line, column, len)));
            column += len + 1;
        }
        (path, Range::on_line(line, 0, column - 1))
    }
}

/// Builds one [`FileSyntax`].
#[derive(Debug)]
pub struct FileBuilder {
    path: String,
    cursor: Cursor,
    root: SpaceNode,
}

impl FileBuilder {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cursor: Cursor::default(),
            root: SpaceNode::default(),
        }
    }

    /// Populate the file's top level.
    pub fn top(mut self, fill: impl FnOnce(&mut SpaceBuilder<'_>)) -> Self {
        let mut builder = SpaceBuilder {
            cursor: &mut self.cursor,
            node: &mut self.root,
        };
        fill(&mut builder);
        self
    }

    pub fn build(self) -> FileSyntax {
        FileSyntax {
            path: self.path,
            root: self.root,
        }
    }
}

/// Populates one namespace node.
pub struct SpaceBuilder<'a> {
    cursor: &'a mut Cursor,
    node: &'a mut SpaceNode,
}

impl SpaceBuilder<'_> {
    pub fn import(&mut self, dotted: &str) -> &mut Self {
        let (path, range) = self.cursor.path(dotted);
        self.node.imports.push(ImportNode { path, range });
        self
    }

    pub fn namespace(&mut self, name: &str, fill: impl FnOnce(&mut SpaceBuilder<'_>)) -> &mut Self {
        let mut child = SpaceNode {
            name: Some(self.cursor.ident(name)),
            ..SpaceNode::default()
        };
        {
            let mut builder = SpaceBuilder {
                cursor: &mut *self.cursor,
                node: &mut child,
            };
            fill(&mut builder);
        }
        self.node.children.push(child);
        self
    }

    pub fn variable(&mut self, visibility: Visibility, ty: &str, name: &str) -> &mut Self {
        let node = variable_node(self.cursor, visibility, false, ty, name);
        self.node.declarations.push(DeclNode::Variable(node));
        self
    }

    pub fn constant(&mut self, visibility: Visibility, ty: &str, name: &str) -> &mut Self {
        let node = variable_node(self.cursor, visibility, true, ty, name);
        self.node.declarations.push(DeclNode::Variable(node));
        self
    }

    pub fn function(
        &mut self,
        visibility: Visibility,
        name: &str,
        params: &[&str],
        returns: &[&str],
    ) -> &mut Self {
        let node = function_node(self.cursor, visibility, name, params, returns);
        self.node.declarations.push(DeclNode::Function(node));
        self
    }

    pub fn native(
        &mut self,
        visibility: Visibility,
        name: &str,
        params: &[&str],
        returns: &[&str],
    ) -> &mut Self {
        let node = function_node(self.cursor, visibility, name, params, returns);
        self.node.declarations.push(DeclNode::Native(node));
        self
    }

    pub fn enumeration(&mut self, visibility: Visibility, name: &str, elements: &[&str]) -> &mut Self {
        let name = self.cursor.ident(name);
        let elements = elements.iter().map(|e| self.cursor.ident(e)).collect();
        self.node.declarations.push(DeclNode::Enum(EnumNode {
            visibility,
            name,
            elements,
        }));
        self
    }

    pub fn structure(
        &mut self,
        visibility: Visibility,
        name: &str,
        fill: impl FnOnce(&mut MemberBuilder<'_>),
    ) -> &mut Self {
        let ident = self.cursor.ident(name);
        let members = collect_members(self.cursor, name, fill);
        self.node.declarations.push(DeclNode::Struct(StructNode {
            visibility,
            name: ident,
            variables: members.variables,
            functions: members.functions,
        }));
        self
    }

    pub fn interface(
        &mut self,
        visibility: Visibility,
        name: &str,
        inherits: &[&str],
        fill: impl FnOnce(&mut MemberBuilder<'_>),
    ) -> &mut Self {
        let ident = self.cursor.ident(name);
        let inherits = self.cursor.types(inherits);
        let members = collect_members(self.cursor, name, fill);
        self.node.declarations.push(DeclNode::Interface(InterfaceNode {
            visibility,
            name: ident,
            inherits,
            functions: members.functions,
        }));
        self
    }

    pub fn class(
        &mut self,
        visibility: Visibility,
        name: &str,
        inherits: &[&str],
        fill: impl FnOnce(&mut MemberBuilder<'_>),
    ) -> &mut Self {
        let ident = self.cursor.ident(name);
        let inherits = self.cursor.types(inherits);
        let members = collect_members(self.cursor, name, fill);
        self.node.declarations.push(DeclNode::Class(ClassNode {
            visibility,
            name: ident,
            inherits,
            variables: members.variables,
            constructors: members.constructors,
            functions: members.functions,
        }));
        self
    }

    pub fn delegate(
        &mut self,
        visibility: Visibility,
        name: &str,
        params: &[&str],
        returns: &[&str],
    ) -> &mut Self {
        let name = self.cursor.ident(name);
        let params = self.cursor.params(params);
        let returns = self.cursor.types(returns);
        self.node.declarations.push(DeclNode::Delegate(DelegateNode {
            visibility,
            name,
            params,
            returns,
        }));
        self
    }

    pub fn task(&mut self, visibility: Visibility, name: &str, returns: &[&str]) -> &mut Self {
        let name = self.cursor.ident(name);
        let returns = self.cursor.types(returns);
        self.node.declarations.push(DeclNode::Task(TaskNode {
            visibility,
            name,
            returns,
        }));
        self
    }
}

/// Populates the member lists of a struct, interface or class.
pub struct MemberBuilder<'a> {
    cursor: &'a mut Cursor,
    owner: String,
    variables: Vec<VariableNode>,
    constructors: Vec<ConstructorNode>,
    functions: Vec<FunctionNode>,
}

impl MemberBuilder<'_> {
    pub fn variable(&mut self, visibility: Visibility, ty: &str, name: &str) -> &mut Self {
        let node = variable_node(self.cursor, visibility, false, ty, name);
        self.variables.push(node);
        self
    }

    pub fn function(
        &mut self,
        visibility: Visibility,
        name: &str,
        params: &[&str],
        returns: &[&str],
    ) -> &mut Self {
        let node = function_node(self.cursor, visibility, name, params, returns);
        self.functions.push(node);
        self
    }

    pub fn constructor(&mut self, visibility: Visibility, params: &[&str]) -> &mut Self {
        let name = self.cursor.ident(&self.owner);
        let params = self.cursor.params(params);
        self.constructors.push(ConstructorNode {
            visibility,
            name,
            params,
        });
        self
    }
}

struct Members {
    variables: Vec<VariableNode>,
    constructors: Vec<ConstructorNode>,
    functions: Vec<FunctionNode>,
}

fn collect_members(
    cursor: &mut Cursor,
    owner: &str,
    fill: impl FnOnce(&mut MemberBuilder<'_>),
) -> Members {
    let mut builder = MemberBuilder {
        cursor,
        owner: owner.to_string(),
        variables: vec![],
        constructors: vec![],
        functions: vec![],
    };
    fill(&mut builder);
    Members {
        variables: builder.variables,
        constructors: builder.constructors,
        functions: builder.functions,
    }
}

fn variable_node(
    cursor: &mut Cursor,
    visibility: Visibility,
    constant: bool,
    ty: &str,
    name: &str,
) -> VariableNode {
    let ty = cursor.type_ref(ty);
    VariableNode {
        visibility,
        constant,
        name: cursor.ident(name),
        ty,
    }
}

fn function_node(
    cursor: &mut Cursor,
    visibility: Visibility,
    name: &str,
    params: &[&str],
    returns: &[&str],
) -> FunctionNode {
    let returns = cursor.types(returns);
    let name = cursor.ident(name);
    let params = cursor.params(params);
    FunctionNode {
        visibility,
        name,
        params,
        returns,
    }
}

/// Shorthand for a file whose top level is filled by `fill`.
pub fn file(path: &str, fill: impl FnOnce(&mut SpaceBuilder<'_>)) -> FileSyntax {
    FileBuilder::new(path).top(fill).build()
}
