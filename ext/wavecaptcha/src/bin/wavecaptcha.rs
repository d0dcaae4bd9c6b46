use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::Level;
use wavecaptcha::{BundledFonts, Color, DirectoryFonts, FontProvider, Options};

#[derive(Parser, Debug)]
#[command(name = "wavecaptcha", version, about = "Generate a CAPTCHA PNG")]
struct Cli {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// JSON options file; flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Characters the answer is drawn from.
    #[arg(long)]
    alphabet: Option<String>,

    /// Answer length.
    #[arg(long)]
    length: Option<usize>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Number of sine curves.
    #[arg(long)]
    curves: Option<usize>,

    /// Background as `#rrggbb`, `#rrggbbaa` or `transparent`.
    #[arg(long)]
    background: Option<Color>,

    #[arg(long)]
    font_dpi: Option<f64>,

    #[arg(long)]
    font_scale: Option<f64>,

    /// Noise density multiplier.
    #[arg(long)]
    noise: Option<f64>,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Use fonts from this directory instead of the bundled ones.
    #[arg(long)]
    font_dir: Option<PathBuf>,

    /// Log pipeline details to stderr.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn flag_options(&self) -> Options {
        Options {
            alphabet: self.alphabet.clone(),
            length: self.length,
            width: self.width,
            height: self.height,
            curves: self.curves,
            background: self.background,
            font_dpi: self.font_dpi,
            font_scale: self.font_scale,
            noise: self.noise,
        }
    }
}

fn read_options_json(path: &Path) -> anyhow::Result<Options> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let opts: Options = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse config JSON '{}'", path.display()))?;
    Ok(opts)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let base = match &cli.config {
        Some(path) => read_options_json(path)?,
        None => Options::default(),
    };
    let config = base.merge(cli.flag_options()).normalize()?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let fonts: Box<dyn FontProvider> = match &cli.font_dir {
        Some(dir) => Box::new(DirectoryFonts::new(dir)),
        None => Box::new(BundledFonts),
    };

    let captcha = wavecaptcha::generate(&config, &fonts, &mut rng)?;

    if let Some(parent) = cli.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let file = File::create(&cli.out)
        .with_context(|| format!("create png '{}'", cli.out.display()))?;
    let mut sink = BufWriter::new(file);
    captcha
        .write_png(&mut sink)
        .with_context(|| format!("write png '{}'", cli.out.display()))?;
    sink.flush()?;

    println!("{}", captcha.text());
    Ok(())
}
