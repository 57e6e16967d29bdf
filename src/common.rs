use tracing::info;

use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn create_path_if_not_exists(path: &Path) -> anyhow::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if !parent.as_os_str().is_empty() && !parent.exists() {
        info!("Creating path: {:?}", parent);
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn write_string_to_file(path: &Path, content: &str) -> anyhow::Result<()> {
    create_path_if_not_exists(path)?;
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("migrat.yaml");
        write_string_to_file(&path, "migrations_dir: migrations\n").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "migrations_dir: migrations\n"
        );
    }
}
