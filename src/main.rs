use clap::{Parser, Subcommand};
use person_gallery::config::{self, GalleryConfig};
use person_gallery::gallery::{self, GalleryOptions};
use person_gallery::resolve::Resolver;
use person_gallery::{loader, output, page};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "person-gallery")]
#[command(about = "Build a person's photo page from whichever image files exist")]
#[command(long_about = "\
Build a person's photo page from whichever image files exist

Assets are named <prefix><index>.<ext>. Index 0 is the main photo, indices
1..9 (configurable) form the gallery. For every index the extensions are
tried in priority order and the first file that loads wins:

  assets/
  ├── A0.avif        # main photo
  ├── A1.jpg         # gallery 1
  ├── A3.webp        # gallery 3 (2 is missing: skipped)
  └── A4.PNG         # gallery 4

The base path may be a directory or an http(s):// URL. A relative directory
is written into the page unchanged, so it is resolved from the directory of
the output file, the same way a browser will resolve it.

Run 'person-gallery gen-config' to generate a documented gallery.toml.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults when it does not exist)
    #[arg(long, default_value = "gallery.toml", global = true)]
    config: PathBuf,

    /// Asset directory or URL, with trailing slash (overrides gallery.base_path)
    #[arg(long, global = true)]
    base_path: Option<String>,

    /// Per-probe timeout in milliseconds (overrides probe.timeout_ms)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Person prefix, e.g. A
    #[arg(long)]
    prefix: Option<String>,

    /// First gallery index (overrides gallery.from)
    #[arg(long)]
    from: Option<u32>,

    /// Last gallery index, inclusive (overrides gallery.to)
    #[arg(long)]
    to: Option<u32>,

    /// Base alt text (overrides gallery.alt_base)
    #[arg(long)]
    alt: Option<String>,

    /// Page title (defaults to the alt text, then the prefix)
    #[arg(long)]
    title: Option<String>,

    /// HTML file to write
    #[arg(long, default_value = "index.html")]
    output: PathBuf,

    /// Also write the build report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve main photo and gallery, then write the HTML page
    Build(BuildArgs),
    /// Show every probe for one base name (e.g. A0)
    Probe {
        /// Base name to resolve
        base_name: String,

        /// Directory of the page the assets are referenced from
        #[arg(long, default_value = ".")]
        page_dir: PathBuf,
    },
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Build(args) => {
            let config = load_config(&cli, Some(args))?;
            build(&config, args)?;
        }
        Command::Probe {
            base_name,
            page_dir,
        } => {
            let config = load_config(&cli, None)?;
            let base_path = &config.gallery.base_path;
            let resolver = Resolver::new(
                loader::loader_for(base_path, page_dir)?,
                config.probe.extension_order(),
                config.probe.timeout(),
            );
            let resolution = resolver.resolve(base_path, base_name);
            output::print_resolution(base_name, &resolution);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and layer command-line overrides on top.
fn load_config(cli: &Cli, build: Option<&BuildArgs>) -> Result<GalleryConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(base_path) = &cli.base_path {
        config.gallery.base_path = base_path.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.probe.timeout_ms = timeout_ms;
    }
    if let Some(args) = build {
        if let Some(from) = args.from {
            config.gallery.from = from;
        }
        if let Some(to) = args.to {
            config.gallery.to = to;
        }
        if let Some(alt) = &args.alt {
            config.gallery.alt_base = alt.clone();
        }
    }
    config.validate()?;
    Ok(config)
}

fn build(config: &GalleryConfig, args: &BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let opts = GalleryOptions::from_config(args.prefix.as_deref(), config);
    let title = args
        .title
        .clone()
        .or_else(|| (!opts.alt_base.is_empty()).then(|| opts.alt_base.clone()))
        .or_else(|| opts.prefix.clone())
        .unwrap_or_default();
    let mut person_page = gallery::person_page(&title, &opts);

    // Relative asset paths are written into the page as is, so look them up
    // from where the page will live.
    let page_dir = args.output.parent().unwrap_or(Path::new(""));
    let resolver = Resolver::new(
        loader::loader_for(&opts.base_path, page_dir)?,
        config.probe.extension_order(),
        config.probe.timeout(),
    );

    println!("==> Resolving photos from {}", opts.base_path);
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_gallery_event(&event) {
                println!("{}", line);
            }
        }
    });
    let report = gallery::build_person_gallery(&mut person_page, &resolver, &opts, Some(tx));
    printer.join().map_err(|_| "output thread panicked")?;
    output::print_report(&report);

    if report.prefix.is_none() {
        return Ok(());
    }

    let grid_selector = opts.gallery_selector.as_deref().unwrap_or(".gallery");
    let css = config::generate_css(&config.theme, grid_selector);
    let html = page::render_page(&person_page, &css);
    if !page_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(page_dir)?;
    }
    std::fs::write(&args.output, html.into_string())?;
    println!("==> Wrote {}", args.output.display());

    if let Some(report_path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(report_path, json)?;
        println!("==> Wrote {}", report_path.display());
    }

    Ok(())
}
