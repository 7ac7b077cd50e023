use std::io;
use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path: drops `.` components and trailing
/// separators, folds `..` into its parent where one is present.
///
/// No filesystem access is performed, so symlinks are not resolved.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                // ".." at the root is the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

/// Qualifies `path` against the current working directory, then cleans it.
pub fn absolute_clean(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    Ok(clean_path(&absolute))
}

/// Splits user supplied path lists on commas and whitespace, dropping empties.
pub fn split_path_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| {
            value
                .as_ref()
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path_drops_dot_and_trailing_separator() {
        assert_eq!(clean_path(Path::new("./a/b")), PathBuf::from("a/b"));
        assert_eq!(clean_path(Path::new("a/b/")), PathBuf::from("a/b"));
        assert_eq!(clean_path(Path::new("a/./b/.")), PathBuf::from("a/b"));
    }

    #[test]
    fn test_clean_path_folds_parent_components() {
        assert_eq!(clean_path(Path::new("/var/log/../tmp")), PathBuf::from("/var/tmp"));
        assert_eq!(clean_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(clean_path(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(clean_path(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_absolute_clean_equates_spellings() {
        let dotted = absolute_clean(Path::new("./a/b")).unwrap();
        let trailing = absolute_clean(Path::new("a/b/")).unwrap();
        assert_eq!(dotted, trailing);
        assert!(dotted.is_absolute());
    }

    #[test]
    fn test_split_path_list() {
        let values = vec!["/tmp/a,/tmp/b".to_string(), "/tmp/c /tmp/d".to_string()];
        assert_eq!(
            split_path_list(&values),
            vec!["/tmp/a", "/tmp/b", "/tmp/c", "/tmp/d"]
        );
        assert!(split_path_list(&[" , "]).is_empty());
    }
}
