use std::path::Path;

/// Find the smallest nonnegative counter that makes `name` unique according to
/// `is_taken`, and return the resulting final path component.
///
/// Counter `0` means "no suffix" - `name` itself is tried first. From `1` onward the
/// suffix is `" (N)"` inserted before the extension, matching the disambiguation
/// style callers expect from a Windows-style collision-renaming filesystem
/// primitive (§4.3 step g, §6's `StdFsRenamePrimitive`).
pub fn disambiguate(name: &str, mut is_taken: impl FnMut(&str) -> bool) -> String {
    if !is_taken(name) {
        return name.to_string();
    }

    let (stem, ext) = split_stem_ext(name);
    let mut counter: u64 = 1;
    loop {
        let candidate = if ext.is_empty() {
            format!("{stem} ({counter})")
        } else {
            format!("{stem} ({counter}).{ext}")
        };
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn split_stem_ext(name: &str) -> (&str, &str) {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    (stem, ext)
}

/// `true` if `parent.join(candidate)` exists on disk. Used as the base `is_taken`
/// predicate by both the preview worker (read-only check) and the filesystem
/// primitive (re-checked right before the real rename, see §6).
pub fn exists_on_disk(parent: &Path, candidate: &str) -> bool {
    parent.join(candidate).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_collision_returns_name_unchanged() {
        assert_eq!(disambiguate("a.txt", |_| false), "a.txt");
    }

    #[test]
    fn first_collision_gets_suffix_one() {
        let mut calls = 0;
        let result = disambiguate("a.txt", |candidate| {
            calls += 1;
            candidate == "a.txt"
        });
        assert_eq!(result, "a (1).txt");
        assert_eq!(calls, 2);
    }

    #[test]
    fn skips_already_claimed_counters() {
        let result = disambiguate("a.txt", |candidate| {
            candidate == "a.txt" || candidate == "a (1).txt"
        });
        assert_eq!(result, "a (2).txt");
    }

    #[test]
    fn handles_extensionless_names() {
        let result = disambiguate("README", |candidate| candidate == "README");
        assert_eq!(result, "README (1)");
    }
}
