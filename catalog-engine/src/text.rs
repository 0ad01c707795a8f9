// ---------------------------------------------------------------------------
// Normalization — the single definition of category keys and search tokens
// ---------------------------------------------------------------------------
//
// Every index boundary (category writes, token extraction, queries, filter
// category comparison) goes through these functions so the same input always
// lands on the same key.
// ---------------------------------------------------------------------------

/// Category written to items whose category bucket was removed.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Lowercase, turn whitespace runs into `_`, drop everything that is not
/// alphanumeric or `_`, then trim surrounding underscores.
fn normalize_key(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut pending_space = false;
	for c in input.trim().chars() {
		if c.is_whitespace() {
			pending_space = true;
			continue;
		}
		if !(c.is_alphanumeric() || c == '_') {
			continue;
		}
		if pending_space && !out.is_empty() {
			out.push('_');
		}
		pending_space = false;
		out.extend(c.to_lowercase());
	}
	out.trim_matches('_').to_string()
}

/// Normalize a category name for storage and lookup.
///
/// `"Base Cabinets"` and `"base_cabinets"` both become `"base_cabinets"`.
pub fn normalize_category(name: &str) -> String {
	normalize_key(name)
}

/// Normalize a single search token or a query term.
///
/// Multi-word queries collapse into one underscore-joined token, which lets
/// `"Base Cabinet"` substring-match the `base_cabinets` category token.
pub fn normalize_token(term: &str) -> String {
	normalize_key(term)
}

/// Split a display name into normalized word tokens, dropping empties.
pub fn tokenize_words(text: &str) -> Vec<String> {
	text.split_whitespace()
		.map(normalize_token)
		.filter(|t| !t.is_empty())
		.collect()
}

/// Case-insensitive substring containment.
pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
	haystack.to_lowercase().contains(needle_lower)
}
