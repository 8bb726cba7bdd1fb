use std::path::Path;

use relief_core::error::ReliefError;
use relief_core::texture::TextureImage;

use crate::runner::BenchmarkResult;

/// A complete baseline containing results from all scenes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub timestamp: String,
    pub adapter: String,
    pub results: Vec<BenchmarkResult>,
}

/// Load a baseline from a JSON file. Returns None if the file doesn't exist
/// or cannot be parsed.
pub fn load_baseline(path: &Path) -> Option<Baseline> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(baseline) => Some(baseline),
        Err(e) => {
            log::warn!("Ignoring unreadable baseline {}: {e}", path.display());
            None
        }
    }
}

/// Save a baseline to a JSON file.
pub fn save_baseline(path: &Path, baseline: &Baseline) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(baseline).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// A scene whose mean frame time grew past the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Regression {
    pub scene: String,
    pub baseline_ms: f64,
    pub current_ms: f64,
}

impl Regression {
    pub fn percent(&self) -> f64 {
        (self.current_ms - self.baseline_ms) / self.baseline_ms * 100.0
    }
}

/// Scenes slower than their baseline entry by more than `threshold_pct`.
/// Scenes missing from the baseline, or with a zero baseline, are skipped.
pub fn compare(
    current: &[BenchmarkResult],
    baseline: &Baseline,
    threshold_pct: f64,
) -> Vec<Regression> {
    current
        .iter()
        .filter_map(|r| {
            let base = baseline.results.iter().find(|b| b.scene_name == r.scene_name)?;
            (base.timings.mean_ms > 0.0).then(|| Regression {
                scene: r.scene_name.clone(),
                baseline_ms: base.timings.mean_ms,
                current_ms: r.timings.mean_ms,
            })
        })
        .filter(|reg| reg.percent() > threshold_pct)
        .collect()
}

/// Markdown table, one row per scene.
pub fn format_markdown(results: &[BenchmarkResult]) -> String {
    let mut out = String::from(
        "| Scene | Triangles | Relief | Mean (ms) | P95 (ms) |\n|---|---|---|---|---|\n",
    );
    for r in results {
        out.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} | {:.2} |\n",
            r.scene_name, r.triangle_count, r.terrain_relief, r.timings.mean_ms, r.timings.p95_ms,
        ));
    }
    out
}

pub fn format_comparison(regressions: &[Regression], threshold_pct: f64) -> String {
    if regressions.is_empty() {
        return format!("No scene slower than baseline by more than {threshold_pct:.0}%.\n");
    }
    regressions
        .iter()
        .map(|r| {
            format!(
                "{}: {:.2} ms -> {:.2} ms (+{:.1}%)\n",
                r.scene,
                r.baseline_ms,
                r.current_ms,
                r.percent()
            )
        })
        .collect()
}

/// Write a captured frame as PNG.
pub fn save_png(path: &Path, frame: &TextureImage) -> Result<(), ReliefError> {
    let failed = |reason: String| ReliefError::CaptureFailed(format!("{}: {reason}", path.display()));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
    }
    let buffer = image::RgbaImage::from_raw(frame.width(), frame.height(), frame.as_bytes().to_vec())
        .ok_or_else(|| failed("pixel buffer does not match dimensions".into()))?;
    buffer.save(path).map_err(|e| failed(e.to_string()))?;
    log::info!("Saved capture to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{compute_timings, TimingSeries};
    use relief_core::texture::TextureEncoding;

    fn result(name: &str, mean: f64) -> BenchmarkResult {
        BenchmarkResult {
            scene_name: name.into(),
            vertex_count: 4,
            triangle_count: 2,
            terrain_relief: 1.0,
            frame_count: 1,
            timings: TimingSeries {
                mean_ms: mean,
                ..compute_timings(&[mean])
            },
        }
    }

    fn baseline(results: Vec<BenchmarkResult>) -> Baseline {
        Baseline {
            timestamp: "t".into(),
            adapter: "test".into(),
            results,
        }
    }

    #[test]
    fn test_compare_flags_regressions_over_threshold() {
        let base = baseline(vec![result("a", 10.0), result("b", 10.0)]);
        let current = vec![result("a", 10.5), result("b", 12.0)];
        let regressions = compare(&current, &base, 10.0);
        assert_eq!(regressions.len(), 1);
        assert_eq!(regressions[0].scene, "b");
        assert!((regressions[0].percent() - 20.0).abs() < 1e-9);
        assert!(format_comparison(&regressions, 10.0).starts_with("b: 10.00 ms -> 12.00 ms"));
    }

    #[test]
    fn test_zero_baseline_skipped() {
        let base = baseline(vec![result("a", 0.0)]);
        assert!(compare(&[result("a", 5.0)], &base, 10.0).is_empty());
    }

    #[test]
    fn test_compare_ignores_unknown_scenes() {
        let base = baseline(vec![result("a", 10.0)]);
        assert!(compare(&[result("new", 100.0)], &base, 10.0).is_empty());
    }

    #[test]
    fn test_baseline_json_file() {
        let dir = std::env::temp_dir().join(format!("relief-bench-{}", std::process::id()));
        let path = dir.join("baseline.json");
        save_baseline(&path, &baseline(vec![result("a", 3.0)])).unwrap();
        let loaded = load_baseline(&path).unwrap();
        assert_eq!(loaded.results[0].scene_name, "a");
        assert_eq!(loaded.results[0].timings.mean_ms, 3.0);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_baseline() {
        assert!(load_baseline(Path::new("no/such/baseline.json")).is_none());
    }

    #[test]
    fn test_markdown_has_row_per_scene() {
        let table = format_markdown(&[result("a", 1.0), result("b", 2.0)]);
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("| a |"));
    }

    #[test]
    fn test_save_png_writes_decodable_file() {
        let frame = TextureImage::solid([10, 20, 30, 255], TextureEncoding::Srgb);
        let path = std::env::temp_dir().join(format!("relief-capture-{}.png", std::process::id()));
        save_png(&path, &frame).unwrap();
        let decoded = TextureImage::load(&path, TextureEncoding::Srgb).unwrap();
        assert_eq!(decoded.texel(0, 0), [10, 20, 30, 255]);
        std::fs::remove_file(&path).unwrap();
    }
}
