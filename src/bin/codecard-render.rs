use codecard::{capture, render_card, CaptureOptions, Field, ViewState};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Config {
    source: Option<String>,
    language: Option<String>,
    theme: Option<String>,
    no_background: bool,
    no_glass: bool,
    out: String,
    dump_tree: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            language: None,
            theme: None,
            no_background: false,
            no_glass: false,
            out: "card.png".to_string(),
            dump_tree: false,
        }
    }
}

impl Config {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut config = Config::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--language" => config.language = Some(value(&mut iter, "--language")?),
                "--theme" => config.theme = Some(value(&mut iter, "--theme")?),
                "--no-background" => config.no_background = true,
                "--no-glass" => config.no_glass = true,
                "--out" => config.out = value(&mut iter, "--out")?,
                "--dump-tree" => config.dump_tree = true,
                "--help" | "-h" => {
                    usage();
                    process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(format!("Unknown flag: {}", flag)),
                path => {
                    if config.source.is_some() {
                        return Err("More than one source file given".to_string());
                    }
                    config.source = Some(path.to_string());
                }
            }
        }
        Ok(config)
    }
}

fn value(iter: &mut std::slice::Iter<String>, flag: &str) -> Result<String, String> {
    iter.next()
        .cloned()
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn usage() {
    eprintln!("Usage: codecard-render [source-file] [options]");
    eprintln!();
    eprintln!("Renders a code card to a PNG. Without a source file the");
    eprintln!("built-in demo snippet is used.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --language <id>   Language id for highlighting and the badge");
    eprintln!("  --theme <id>      Color theme (dracula, vsDark, atomDark)");
    eprintln!("  --no-background   Drop the gradient frame");
    eprintln!("  --no-glass        Solid window instead of glass");
    eprintln!("  --out <path>      Output PNG path (default card.png)");
    eprintln!("  --dump-tree       Print the visual tree as JSON");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  codecard-render snippet.py --language python --theme vsDark");
    eprintln!("  codecard-render --dump-tree --out hello.png");
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = ViewState::default();
    if let Some(path) = &config.source {
        state = state.with(Field::Code(fs::read_to_string(path)?));
    }
    if let Some(language) = config.language {
        state = state.with(Field::Language(language));
    }
    if let Some(theme) = config.theme {
        state = state.with(Field::Theme(theme));
    }
    if config.no_background {
        state = state.with(Field::ShowBackground(false));
    }
    if config.no_glass {
        state = state.with(Field::GlassEffect(false));
    }

    let tree = render_card(&state);
    if config.dump_tree {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    }

    let artifact = capture(&tree, &CaptureOptions::default()).await?;
    fs::write(&config.out, &artifact.png)?;
    println!(
        "✓ {} written ({}x{}, {} bytes)",
        config.out,
        artifact.width,
        artifact.height,
        artifact.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let config = match Config::parse(&args[1..]) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("✗ {}", message);
            eprintln!();
            usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        eprintln!("✗ render failed: {}", e);
        process::exit(1);
    }
}
