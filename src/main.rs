// Command-line front end: analyze one URL and print the records as JSON

use std::path::PathBuf;

use video_meta_resolver::{analyze_url, ResolverConfig, ToolMode};

const USAGE: &str = "Usage: video-meta-resolver <url> [--cookies <path>] [--mode auto|python|cli]";

struct Args {
    url: String,
    cookies: Option<PathBuf>,
    mode: Option<ToolMode>,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut url = None;
    let mut cookies = None;
    let mut mode = None;

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--cookies" => {
                let path = raw.next().ok_or("--cookies needs a path")?;
                cookies = Some(PathBuf::from(path));
            }
            "--mode" => {
                let value = raw.next().ok_or("--mode needs a value")?;
                mode = Some(value.parse::<ToolMode>()?);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if other.starts_with("--") => {
                return Err(format!("Unknown option: {}\n{}", other, USAGE))
            }
            other => {
                if url.is_some() {
                    return Err(format!("Unexpected argument: {}\n{}", other, USAGE));
                }
                url = Some(other.to_string());
            }
        }
    }

    Ok(Args {
        url: url.ok_or_else(|| USAGE.to_string())?,
        cookies,
        mode,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Info);
    clog.init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    let mut config = ResolverConfig::from_env();
    if let Some(path) = args.cookies {
        config = config.with_cookies_path(Some(path));
    }
    if let Some(mode) = args.mode {
        config = config.with_tool_mode(mode);
    }

    let context = analyze_url(&args.url, &config).await?;
    println!("{}", serde_json::to_string_pretty(&context)?);
    Ok(())
}
