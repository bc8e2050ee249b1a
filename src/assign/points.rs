//! Point-list loading.

use std::path::Path;

use anyhow::{Context, Result};

use mortar::models::PharmacyPoint;

/// Load a point list stored as a JSON array of `[lon, lat, status]` triples.
pub fn load_points(path: &Path) -> Result<Vec<PharmacyPoint>> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read point list {}", path.display()))?;
    let raw: Vec<(f64, f64, i64)> =
        serde_json::from_str(&body).context("Failed to parse point list")?;
    Ok(raw.into_iter().map(PharmacyPoint::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_triples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.json");
        std::fs::write(&path, r#"[[-86.47,32.47,0],[-118.24,34.05,3]]"#).unwrap();

        let points = load_points(&path).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], PharmacyPoint::new(-86.47, 32.47, 0));
        assert_eq!(points[1].status_code, 3);
    }

    #[test]
    fn test_malformed_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.json");
        std::fs::write(&path, r#"[[1.0, 2.0]]"#).unwrap();
        assert!(load_points(&path).is_err());
    }
}
