use crate::error::{BlazerError, Result};
use std::path::Path;
use zeroize::Zeroize;

/// Read one private key per line, skipping blank lines
pub fn load_keys(path: &Path) -> Result<Vec<String>> {
    let mut contents = std::fs::read_to_string(path).map_err(|e| {
        BlazerError::Wallet(format!("Failed to read keys file {}: {}", path.display(), e))
    })?;

    let keys = parse_keys(&contents);
    contents.zeroize();

    if keys.is_empty() {
        return Err(BlazerError::Wallet(format!(
            "No private keys found in {}",
            path.display()
        )));
    }

    Ok(keys)
}

fn parse_keys(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
