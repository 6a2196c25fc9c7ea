//! Identifier rules for declared names.

/// Reserved words of the language.
pub const KEYWORDS: &[&str] = &[
    "namespace", "import", "native", "public", "internal", "space", "protected", "private",
    "const", "global", "var", "struct", "class", "interface", "enum", "delegate", "task",
    "function", "return", "if", "elseif", "else", "while", "for", "break", "continue", "true",
    "false", "null", "this", "base", "new", "is", "as", "and", "or", "start", "wait", "exit",
    "try", "catch", "finally",
];

/// Placeholder name that discards a value.
pub const DISCARD: &str = "_";

const OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "&", "|", "^", "~", "!", "<", "<=", ">", ">=", "==", "!=", "<<",
    ">>", "&&", "||",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Whether `name` may name a declaration: starts with a letter or `_`,
/// continues with letters, digits or `_`, and is neither a keyword nor
/// the discard placeholder.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return false;
    }
    name != DISCARD && !is_keyword(name)
}

/// Operator symbols a function or native may overload.
pub fn is_operator(name: &str) -> bool {
    OPERATORS.contains(&name)
}
