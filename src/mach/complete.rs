use super::{Compiler, Globals, SharedTable, Units};
use crate::lang::Word;

/// Candidates for the identifier being typed at the cursor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Completion {
    pub prefix: String,
    pub candidates: Vec<String>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Finds the identifier prefix ending at `cursor` and offers every name
/// visible there. The text before the prefix is compiled against a copy
/// of the shared table, so nothing the scope owns is touched. Compile
/// errors only cut the list of local names short.
pub fn complete(
    unit: &str,
    globals: &Globals,
    units: &dyn Units,
    shared: &SharedTable,
    source: &str,
    cursor: usize,
) -> Completion {
    let mut cursor = cursor.min(source.len());
    while !source.is_char_boundary(cursor) {
        cursor -= 1;
    }
    let head = &source[..cursor];
    let start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map_or(cursor, |(i, _)| i);
    let prefix = &head[start..];
    let mut scratch = shared.clone();
    let locals = Compiler::new(unit, globals, units, &mut scratch).declarations(&head[..start]);
    let mut candidates: Vec<String> = locals
        .iter()
        .map(|s| s.to_string())
        .chain(globals.names().map(|s| s.to_string()))
        .chain(Word::ALL.iter().map(|w| w.as_str().to_string()))
        .chain(units.names().iter().map(|s| s.to_string()))
        .filter(|c| c.starts_with(prefix))
        .collect();
    candidates.sort();
    candidates.dedup();
    Completion {
        prefix: prefix.to_string(),
        candidates,
    }
}
