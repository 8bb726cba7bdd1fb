use relief_core::assets::SceneAssets;
use relief_core::config::SceneConfig;

/// Side length of the procedural heightmap and color textures.
pub const SYNTHETIC_TEXTURE_SIZE: u32 = 512;

/// One benchmark scene: a scene configuration rendered with procedural textures.
pub struct BenchScene {
    pub name: String,
    pub config: SceneConfig,
}

impl BenchScene {
    /// Assets that need no files on disk.
    pub fn assets(&self) -> SceneAssets {
        SceneAssets::synthetic(SYNTHETIC_TEXTURE_SIZE)
    }
}

/// Return the standard suite: both presets plus a denser grid.
pub fn standard_scenes() -> Vec<BenchScene> {
    let harbour = SceneConfig::harbour();

    let mut dense = SceneConfig::harbour();
    dense.terrain.segments_x = 512;
    dense.terrain.segments_y = 512;

    vec![
        BenchScene {
            name: "harbour".into(),
            config: harbour,
        },
        BenchScene {
            name: "miniature".into(),
            config: SceneConfig::miniature(),
        },
        BenchScene {
            name: "harbour-512".into(),
            config: dense,
        },
    ]
}

/// Scenes whose names are in `names`, or the whole suite when `names` is empty.
pub fn select_scenes(names: &[String]) -> Vec<BenchScene> {
    standard_scenes()
        .into_iter()
        .filter(|s| names.is_empty() || names.iter().any(|n| n == &s.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scenes_validate() {
        for scene in standard_scenes() {
            scene.config.validate().unwrap();
        }
    }

    #[test]
    fn test_scene_names_unique() {
        let scenes = standard_scenes();
        for (i, a) in scenes.iter().enumerate() {
            for b in &scenes[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_select_scenes() {
        assert_eq!(select_scenes(&[]).len(), standard_scenes().len());
        let picked = select_scenes(&["miniature".to_string()]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "miniature");
    }
}
