use std::path::PathBuf;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use relief_bench::report;
use relief_bench::runner::BenchmarkRunner;
use relief_bench::scenes;

fn usage() {
    eprintln!("Usage: bench-runner [OPTIONS]");
    eprintln!("  --baseline <path>              Load baseline JSON for comparison");
    eprintln!("  --output <path>                Save current results as JSON baseline");
    eprintln!("  --regression-threshold <pct>   Regression threshold percentage (default: 10)");
    eprintln!("  --frames <n>                   Frames per scene (default: 120)");
    eprintln!("  --width <px>                   Render width (default: 1280)");
    eprintln!("  --height <px>                  Render height (default: 720)");
    eprintln!("  --scene <name>                 Run only this scene (repeatable)");
    eprintln!("  --capture <dir>                Write the last frame of each scene as PNG");
}

fn next_value(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i) {
        Some(v) => v.clone(),
        None => {
            eprintln!("missing value for {flag}");
            process::exit(1);
        }
    }
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    let raw = next_value(args, i, flag);
    match raw.parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("invalid {flag} value: {raw}");
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut capture_dir: Option<PathBuf> = None;
    let mut regression_threshold = 10.0f64;
    let mut frame_count = 120u32;
    let mut width = 1280u32;
    let mut height = 720u32;
    let mut scene_names: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--baseline" => {
                i += 1;
                baseline_path = Some(PathBuf::from(next_value(&args, i, flag)));
            }
            "--output" => {
                i += 1;
                output_path = Some(PathBuf::from(next_value(&args, i, flag)));
            }
            "--capture" => {
                i += 1;
                capture_dir = Some(PathBuf::from(next_value(&args, i, flag)));
            }
            "--regression-threshold" => {
                i += 1;
                regression_threshold = parse_value(&args, i, flag);
            }
            "--frames" => {
                i += 1;
                frame_count = parse_value(&args, i, flag);
            }
            "--width" => {
                i += 1;
                width = parse_value::<u32>(&args, i, flag).max(1);
            }
            "--height" => {
                i += 1;
                height = parse_value::<u32>(&args, i, flag).max(1);
            }
            "--scene" => {
                i += 1;
                scene_names.push(next_value(&args, i, flag));
            }
            "--help" | "-h" => {
                usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let scene_list = scenes::select_scenes(&scene_names);
    if scene_list.is_empty() {
        log::error!("No scenes match {:?}", scene_names);
        process::exit(1);
    }

    log::info!("Initializing GPU...");
    let runner = match BenchmarkRunner::new(frame_count, width, height) {
        Ok(runner) => runner,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };

    let mut results = Vec::new();
    for scene in &scene_list {
        match runner.run_scene(scene, capture_dir.is_some()) {
            Ok((result, frame)) => {
                if let (Some(dir), Some(frame)) = (&capture_dir, frame) {
                    let path = dir.join(format!("{}.png", scene.name));
                    if let Err(e) = report::save_png(&path, &frame) {
                        log::error!("{e}");
                        process::exit(1);
                    }
                }
                results.push(result);
            }
            Err(e) => {
                log::error!("Scene '{}' failed: {e}", scene.name);
                process::exit(1);
            }
        }
    }

    // Print markdown summary
    println!("\n## Benchmark Results ({})\n", runner.adapter_name());
    println!("{}", report::format_markdown(&results));

    // Save output baseline
    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            timestamp: timestamp(),
            adapter: runner.adapter_name().to_string(),
            results: results.clone(),
        };
        if let Err(e) = report::save_baseline(path, &baseline) {
            log::error!("Failed to save baseline {}: {e}", path.display());
            process::exit(1);
        }
        log::info!("Saved baseline to {}", path.display());
    }

    // Compare against baseline
    if let Some(ref path) = baseline_path {
        if let Some(baseline) = report::load_baseline(path) {
            let regressions = report::compare(&results, &baseline, regression_threshold);
            println!(
                "{}",
                report::format_comparison(&regressions, regression_threshold)
            );
            if !regressions.is_empty() {
                log::error!(
                    "{} regressions detected, exiting with code 1",
                    regressions.len()
                );
                process::exit(1);
            }
        } else {
            log::warn!("Baseline file not found: {}", path.display());
        }
    }

    log::info!("Benchmark complete.");
}

/// Seconds since the Unix epoch, prefixed for readability in baseline files.
fn timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("unix-{secs}")
}
