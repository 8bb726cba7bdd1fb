use std::path::PathBuf;

use relief_core::config::SceneConfig;
use relief_core::error::ReliefError;

pub const USAGE: &str = "\
Usage: relief-viewer [OPTIONS]
  --config <path>     Load the scene from a RON file
  --preset <name>     Built-in scene: harbour (default) or miniature
  --frames <n>        Exit after rendering n frames
  --seconds <s>       Exit after s seconds of wall time
  --width <px>        Initial window width in logical pixels (default: 1280)
  --height <px>       Initial window height in logical pixels (default: 720)";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerArgs {
    pub config_path: Option<PathBuf>,
    pub preset: String,
    pub frames: Option<u64>,
    pub seconds: Option<f64>,
    pub width: u32,
    pub height: u32,
    pub help: bool,
}

impl Default for ViewerArgs {
    fn default() -> Self {
        Self {
            config_path: None,
            preset: "harbour".into(),
            frames: None,
            seconds: None,
            width: 1280,
            height: 720,
            help: false,
        }
    }
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    let raw = value(args, i, flag)?;
    raw.parse()
        .map_err(|_| format!("invalid {flag} value: {raw}"))
}

impl ViewerArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut parsed = Self::default();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--config" => {
                    i += 1;
                    parsed.config_path = Some(PathBuf::from(value(args, i, flag)?));
                }
                "--preset" => {
                    i += 1;
                    parsed.preset = value(args, i, flag)?.to_string();
                }
                "--frames" => {
                    i += 1;
                    parsed.frames = Some(number(args, i, flag)?);
                }
                "--seconds" => {
                    i += 1;
                    let secs: f64 = number(args, i, flag)?;
                    if !secs.is_finite() || secs < 0.0 {
                        return Err(format!("invalid {flag} value: {secs}"));
                    }
                    parsed.seconds = Some(secs);
                }
                "--width" => {
                    i += 1;
                    parsed.width = number::<u32>(args, i, flag)?.max(1);
                }
                "--height" => {
                    i += 1;
                    parsed.height = number::<u32>(args, i, flag)?.max(1);
                }
                "--help" | "-h" => parsed.help = true,
                other => return Err(format!("unknown argument: {other}")),
            }
            i += 1;
        }
        Ok(parsed)
    }

    /// Scene from `--config` when given, otherwise the named preset.
    pub fn scene_config(&self) -> Result<SceneConfig, ReliefError> {
        let config = match &self.config_path {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::preset(&self.preset)?,
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let parsed = ViewerArgs::parse(&[]).unwrap();
        assert_eq!(parsed, ViewerArgs::default());
        assert_eq!(parsed.scene_config().unwrap().name, "harbour");
    }

    #[test]
    fn test_all_flags() {
        let parsed = ViewerArgs::parse(&args(&[
            "--preset",
            "miniature",
            "--frames",
            "10",
            "--width",
            "640",
            "--height",
            "480",
        ]))
        .unwrap();
        assert_eq!(parsed.preset, "miniature");
        assert_eq!(parsed.frames, Some(10));
        assert_eq!((parsed.width, parsed.height), (640, 480));
        assert!(parsed.scene_config().unwrap().water.attached);
    }

    #[test]
    fn test_seconds_limit() {
        let parsed = ViewerArgs::parse(&args(&["--seconds", "2.5"])).unwrap();
        assert_eq!(parsed.seconds, Some(2.5));
        assert!(ViewerArgs::parse(&args(&["--seconds", "-1"])).is_err());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(ViewerArgs::parse(&args(&["--frames"])).is_err());
        assert!(ViewerArgs::parse(&args(&["--frames", "many"])).is_err());
        assert!(ViewerArgs::parse(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_unknown_preset_is_config_error() {
        let parsed = ViewerArgs::parse(&args(&["--preset", "atlantis"])).unwrap();
        assert!(matches!(
            parsed.scene_config(),
            Err(ReliefError::Config(_))
        ));
    }
}
