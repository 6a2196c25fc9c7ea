//! Resolution diagnostics and "did you mean" suggestions.

use rook_model::{Diagnostic, DiagnosticCode};
use rook_syntax::{Ident, Location};

pub(crate) fn not_found(name: &Ident, what: &str, suggestion: Option<String>) -> Diagnostic {
    let mut message = format!("cannot find {} `{}`", what, name.name);
    if let Some(sug) = suggestion {
        message.push_str(&format!(". Did you mean `{}`?", sug));
    }
    Diagnostic::error(name.range, DiagnosticCode::NotFound, message)
}

pub(crate) fn not_accessible(name: &Ident) -> Diagnostic {
    Diagnostic::error(
        name.range,
        DiagnosticCode::NotFound,
        format!("`{}` is not accessible here", name.name),
    )
}

pub(crate) fn ambiguous(name: &Ident, candidates: &[(String, Option<Location>)]) -> Diagnostic {
    let mut diagnostic = Diagnostic::error(
        name.range,
        DiagnosticCode::Ambiguous,
        format!(
            "`{}` is ambiguous between {} namespaces, using `{}`",
            name.name,
            candidates.len(),
            candidates.first().map(|(full, _)| full.as_str()).unwrap_or_default()
        ),
    );
    for (full, location) in candidates {
        if let Some(location) = location {
            diagnostic = diagnostic.with_related(location.clone(), format!("candidate `{}`", full));
        }
    }
    diagnostic
}

/// Compute Levenshtein distance between two strings.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Find the best "did you mean" suggestion from a list of candidates.
/// Returns `None` if no candidate is within distance 2.
pub fn suggest(name: &str, candidates: &[&str]) -> Option<String> {
    let mut best: Option<(usize, &str)> = None;

    for &candidate in candidates {
        let dist = levenshtein(name, candidate);
        if dist == 0 || dist > 2 {
            continue;
        }
        match best {
            Some((best_dist, _)) if best_dist <= dist => {}
            _ => best = Some((dist, candidate)),
        }
    }

    best.map(|(_, s)| s.to_string())
}
