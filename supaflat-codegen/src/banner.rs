//! Leading comment banner replacement.

/// Banner placed at the top of generated files.
pub const DEFAULT_BANNER: &str = "// Generated by supaflat. Do not edit.";

/// Replaces everything before the first `import` line with `banner`.
///
/// Source without an import line is returned unchanged.
#[must_use]
pub fn replace_banner(source: &str, banner: &str) -> String {
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        if is_import(line) {
            return format!("{}\n{}", banner, &source[offset..]);
        }
        offset += line.len();
    }
    source.to_string()
}

fn is_import(line: &str) -> bool {
    line.trim_start()
        .strip_prefix("import")
        .is_some_and(|rest| rest.starts_with([' ', '{', '*', '"', '\'']))
}
