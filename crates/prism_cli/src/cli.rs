//! Command-line parsing for the `prism` binary.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use prism_renderer::{RenderSettings, WorkUnit};

pub const USAGE: &str = r#"usage: prism <scene.json> <output> <width> <height> [options]

    -s, --samples <N>   samples per pixel (default 500)
    -b, --bounces <N>   maximum bounces per path (default 50)
    -t, --threads <N>   worker threads (default: all cores)
        --seed <N>      base random seed (default 0)
        --bucket <N>    render square tiles of N pixels instead of scanlines
    -h, --help          print this message
"#;

/// Everything the binary needs to run one render.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub scene: PathBuf,
    pub output: PathBuf,
    pub settings: RenderSettings,
}

/// Outcome of parsing: either a render to run or a request for help.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Render(CliOptions),
    Help,
}

/// Parse `args` (without the program name).
///
/// Unknown options are logged and skipped. Numeric values must be positive.
pub fn parse_args<I, S>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut positional = Vec::new();
    let mut settings = RenderSettings::default();
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-s" | "--samples" => settings.samples_per_pixel = positive(&arg, args.next())?,
            "-b" | "--bounces" => settings.max_bounces = positive(&arg, args.next())?,
            "-t" | "--threads" => settings.threads = positive(&arg, args.next())?,
            "--seed" => {
                let value = args.next().ok_or_else(|| anyhow!("{arg} expects a value"))?;
                settings.seed = value
                    .parse()
                    .with_context(|| format!("{arg} expects an unsigned integer, got {value:?}"))?;
            }
            "--bucket" => {
                settings.work_unit = WorkUnit::Bucket {
                    size: positive(&arg, args.next())?,
                }
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                log::warn!("Ignoring unknown option {flag}");
            }
            _ => positional.push(arg),
        }
    }

    let [scene, output, width, height]: [String; 4] = positional.try_into().map_err(
        |rest: Vec<String>| anyhow!("expected 4 positional arguments, got {}\n\n{USAGE}", rest.len()),
    )?;

    settings.width = positive("width", Some(width))?;
    settings.height = positive("height", Some(height))?;

    Ok(Command::Render(CliOptions {
        scene: PathBuf::from(scene),
        output: PathBuf::from(output),
        settings,
    }))
}

fn positive<T>(name: &str, value: Option<String>) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(value) = value else {
        bail!("{name} expects a value");
    };
    match value.parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => bail!("{name} must be a positive integer, got {value:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(args: &[&str]) -> CliOptions {
        match parse_args(args.iter().copied()).unwrap() {
            Command::Render(options) => options,
            Command::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn test_positional_only() {
        let options = render(&["scene.json", "out.png", "320", "240"]);

        assert_eq!(options.scene, PathBuf::from("scene.json"));
        assert_eq!(options.output, PathBuf::from("out.png"));
        assert_eq!((options.settings.width, options.settings.height), (320, 240));
        assert_eq!(options.settings.samples_per_pixel, 500);
        assert_eq!(options.settings.max_bounces, 50);
        assert_eq!(options.settings.work_unit, WorkUnit::Scanline);
    }

    #[test]
    fn test_options_anywhere() {
        let options = render(&[
            "-s", "16", "scene.json", "--threads", "3", "out.ppm", "64", "-b", "8", "48",
            "--seed", "9", "--bucket", "16",
        ]);

        assert_eq!(options.settings.samples_per_pixel, 16);
        assert_eq!(options.settings.max_bounces, 8);
        assert_eq!(options.settings.threads, 3);
        assert_eq!(options.settings.seed, 9);
        assert_eq!(options.settings.work_unit, WorkUnit::Bucket { size: 16 });
        assert_eq!((options.settings.width, options.settings.height), (64, 48));
    }

    #[test]
    fn test_unknown_option_skipped() {
        let options = render(&["--fast", "scene.json", "out.png", "10", "10"]);
        assert_eq!(options.settings.width, 10);
    }

    #[test]
    fn test_non_positive_rejected() {
        assert!(parse_args(["a.json", "b.png", "0", "10"]).is_err());
        assert!(parse_args(["a.json", "b.png", "10", "-3"]).is_err());
        assert!(parse_args(["a.json", "b.png", "10", "10", "-s", "0"]).is_err());
        assert!(parse_args(["a.json", "b.png", "10", "10", "-t", "many"]).is_err());
        assert!(parse_args(["a.json", "b.png", "10", "10", "--bounces"]).is_err());
    }

    #[test]
    fn test_wrong_positional_count() {
        let err = parse_args(["a.json", "b.png", "10"]).unwrap_err();
        assert!(err.to_string().contains("expected 4 positional arguments"));
    }

    #[test]
    fn test_help() {
        assert_eq!(parse_args(["--help"]).unwrap(), Command::Help);
    }
}
