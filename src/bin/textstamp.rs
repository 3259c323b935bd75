use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "textstamp", version)]
struct Cli {
    /// JSON preset with default form values, delay and font directories.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print tracing output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the first text line onto the image and write it as a PNG.
    Preview(PreviewArgs),
    /// Write one PNG per text line, named after the line.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Source image.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Text block; one output per line.
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,

    /// Read the text block from a file.
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Text anchor x in pixels.
    #[arg(long, allow_hyphen_values = true)]
    x: Option<String>,

    /// Text baseline y in pixels.
    #[arg(long, allow_hyphen_values = true)]
    y: Option<String>,

    /// Font size in pixels.
    #[arg(long)]
    font_size: Option<String>,

    /// CSS color, e.g. `#ff0000` or `rgb(255 0 0)`.
    #[arg(long)]
    color: Option<String>,

    /// CSS font-family list, e.g. `"Noto Sans, sans-serif"`.
    #[arg(long)]
    font_family: Option<String>,

    /// Extra directory to load `.ttf`/`.otf`/`.ttc` fonts from. Repeatable.
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Print the resolved font family and SHA-256 of its bytes.
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Directory receiving one PNG per line.
    #[arg(long)]
    out_dir: PathBuf,

    /// Delay between images in milliseconds (default 500).
    #[arg(long)]
    delay_ms: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => textstamp::ToolConfig::load(path)?,
        None => textstamp::ToolConfig::default(),
    };

    match cli.cmd {
        Command::Preview(args) => cmd_preview(&config, args),
        Command::Export(args) => cmd_export(&config, args),
    }
}

fn init_logging(verbose: bool) {
    if !verbose {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_form(config: &textstamp::ToolConfig, input: &InputArgs) -> anyhow::Result<textstamp::StampForm> {
    let text = match (&input.text, &input.text_file) {
        (Some(t), _) => t.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("read text file '{}'", path.display()))?,
        (None, None) => String::new(),
    };

    let flags = textstamp::PartialFields {
        x: input.x.clone(),
        y: input.y.clone(),
        font_size: input.font_size.clone(),
        color: input.color.clone(),
        font_family: input.font_family.clone(),
    };

    Ok(textstamp::StampForm {
        image: input.image.clone(),
        text,
        fields: config.resolve_fields(&flags),
    })
}

fn make_compositor(config: &textstamp::ToolConfig, input: &InputArgs) -> textstamp::CpuCompositor {
    let fonts = textstamp::FontLibrary::new(&config.font_opts(&input.font_dirs));
    textstamp::CpuCompositor::new(fonts)
}

fn cmd_preview(config: &textstamp::ToolConfig, args: PreviewArgs) -> anyhow::Result<()> {
    let form = read_form(config, &args.input)?;
    let mut compositor = make_compositor(config, &args.input);

    if args.dump_fonts {
        dump_font_diagnostics(&mut compositor, &form.fields.font_family)?;
    }

    let mut previewer = textstamp::Previewer::new();
    previewer.preview(&form, &mut compositor)?;
    previewer.save(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(config: &textstamp::ToolConfig, args: ExportArgs) -> anyhow::Result<()> {
    let form = read_form(config, &args.input)?;
    let mut compositor = make_compositor(config, &args.input);

    let exporter = textstamp::BatchExporter::new(config.pacing(args.delay_ms));
    let mut sink = textstamp::DirectorySink::new(&args.out_dir);
    let mut status = |s: &textstamp::ExportStatus| eprintln!("{s}");
    let mut pacer = textstamp::ThreadPacer;

    let report = exporter.export(
        &form,
        &mut compositor,
        textstamp::ExportTargets {
            sink: &mut sink,
            status: &mut status,
            pacer: &mut pacer,
        },
    )?;

    eprintln!(
        "wrote {} of {} images to {}",
        report.exported,
        report.total,
        display_dir(&args.out_dir)
    );
    Ok(())
}

fn display_dir(dir: &Path) -> String {
    if dir.as_os_str().is_empty() {
        ".".to_string()
    } else {
        dir.display().to_string()
    }
}

fn dump_font_diagnostics(
    compositor: &mut textstamp::CpuCompositor,
    font_family: &str,
) -> anyhow::Result<()> {
    let fonts = compositor.fonts_mut();
    eprintln!("font diagnostics:");
    eprintln!("  faces:     {}", fonts.face_count());
    let font = fonts
        .resolve(font_family)
        .with_context(|| format!("resolve font family '{font_family}'"))?;
    eprintln!("  requested: {font_family}");
    eprintln!("  family:    {}", font.family);
    eprintln!("  exact:     {}", font.exact);
    eprintln!("  index:     {}", font.index);
    eprintln!("  sha256:    {}", sha256_hex(&font.bytes));
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
