#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use tempfile::TempDir;

    /// A synthetic environment, so tests never touch the process one.
    pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Write `content` to `dir/name` and return the full path.
    pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn env_fixture_builds_map() {
        let vars = env(&[("A", "1"), ("B", "")]);
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["B"], "");
    }
}
