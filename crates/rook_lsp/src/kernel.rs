//! Built-in kernel library, used when the provider ships none.

use rook_syntax::build::file;
use rook_syntax::{FileSyntax, Visibility::Public};

/// Value types every library can name without an import.
pub const PRIMITIVES: &[&str] = &[
    "bool", "byte", "char", "integer", "real", "string", "type", "entity",
];

/// Root class of every handle type.
pub const HANDLE: &str = "handle";

const ARITHMETIC: &[&str] = &["+", "-", "*", "/"];
const COMPARISON: &[&str] = &["<", "<=", ">", ">="];
const EQUALITY: &[&str] = &["==", "!="];

pub const BUILTIN_PATH: &str = "kernel/builtin.rk";

/// The built-in kernel sources.
pub fn builtin() -> Vec<FileSyntax> {
    let types = file(BUILTIN_PATH, |s| {
        for name in PRIMITIVES {
            s.structure(Public, name, |m| {
                m.function(Public, "ToString", &[], &["string"]);
            });
        }
        s.class(Public, HANDLE, &[], |c| {
            c.function(Public, "ToString", &[], &["string"]);
        });
    });

    let operators = file("kernel/operators.rk", |s| {
        for number in ["integer", "real"] {
            for op in ARITHMETIC {
                s.native(Public, op, &[number, number], &[number]);
            }
            for op in COMPARISON {
                s.native(Public, op, &[number, number], &["bool"]);
            }
            s.native(Public, "-", &[number], &[number]);
        }
        s.native(Public, "%", &["integer", "integer"], &["integer"]);
        for op in ["&", "|", "^", "<<", ">>"] {
            s.native(Public, op, &["integer", "integer"], &["integer"]);
        }
        s.native(Public, "~", &["integer"], &["integer"]);

        for ty in ["bool", "byte", "char", "integer", "real", "string", "type", "entity", HANDLE] {
            for op in EQUALITY {
                s.native(Public, op, &[ty, ty], &["bool"]);
            }
        }
        s.native(Public, "&&", &["bool", "bool"], &["bool"])
            .native(Public, "||", &["bool", "bool"], &["bool"])
            .native(Public, "!", &["bool"], &["bool"])
            .native(Public, "+", &["string", "string"], &["string"]);
    });

    vec![types, operators]
}
