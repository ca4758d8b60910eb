/// Replace a leading home directory with `~`
pub fn abbreviate_path(path: &str) -> String {
    if let Ok(home) = std::env::var("HOME")
        && !home.is_empty()
        && let Some(rest) = path.strip_prefix(&home)
        && (rest.is_empty() || rest.starts_with('/'))
    {
        return format!("~{}", rest);
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviates_home() {
        let home = std::env::var("HOME").unwrap_or_default();
        if home.is_empty() || home == "/" {
            return;
        }
        assert_eq!(abbreviate_path(&format!("{}/code/api", home)), "~/code/api");
        assert_eq!(abbreviate_path(&home), "~");
        // A sibling that merely shares the prefix is left alone
        let sibling = format!("{}-other/api", home);
        assert_eq!(abbreviate_path(&sibling), sibling);
    }

    #[test]
    fn other_paths_unchanged() {
        assert_eq!(abbreviate_path("/srv/api"), "/srv/api");
    }
}
