//! repage CLI - reflow page content descriptions from the terminal

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use repage::{
    ContentRun, FocusData, Progress, ReflowMode, ReflowPage, Rotation, StaticPage,
};

#[derive(Parser)]
#[command(name = "repage")]
#[command(version)]
#[command(about = "Reflow parsed page content into arbitrary viewports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reflow a page description and print the laid-out blocks
    Reflow {
        /// Input page description (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Viewport width
        #[arg(short = 'W', long, default_value = "320")]
        width: f32,

        /// Viewport height
        #[arg(short = 'H', long, default_value = "480")]
        height: f32,

        /// Paging mode
        #[arg(long, value_enum, default_value = "normal")]
        mode: ModeArg,

        /// Additional inter-line gap
        #[arg(long, default_value = "0")]
        line_space: f32,

        /// Vertical offset before the first line
        #[arg(long, default_value = "0")]
        top_space: f32,

        /// Emit blocks as JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },

    /// Resolve the focus data under a device point, and back
    Focus {
        /// Input page description (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Viewport width
        #[arg(short = 'W', long, default_value = "320")]
        width: f32,

        /// Viewport height
        #[arg(short = 'H', long, default_value = "480")]
        height: f32,

        /// Device X coordinate
        #[arg(short, long)]
        x: f32,

        /// Device Y coordinate
        #[arg(short, long)]
        y: f32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Continuous strip, no page boundaries
    Normal,
    /// Screen-paged; blocks may straddle a boundary
    Image,
    /// Paged; blocks are never cut at a boundary
    NoTruncate,
}

impl From<ModeArg> for ReflowMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Normal => ReflowMode::Normal,
            ModeArg::Image => ReflowMode::Image,
            ModeArg::NoTruncate => ReflowMode::NoTruncate,
        }
    }
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Reflow {
            input,
            width,
            height,
            mode,
            line_space,
            top_space,
            json,
        } => {
            let source = load_page(&input)?;
            let mut page = ReflowPage::new(&source)?;
            page.set_size(width, height)?;
            page.set_line_space(line_space)?;
            page.set_top_space(top_space)?;
            drive_layout(&mut page, mode.into())?;

            if json {
                print_json(&page)?;
            } else {
                print_summary(&page, width, height)?;
            }
        }
        Commands::Focus {
            input,
            width,
            height,
            x,
            y,
        } => {
            let source = load_page(&input)?;
            let mut page = ReflowPage::new(&source)?;
            page.set_size(width, height)?;
            drive_layout(&mut page, ReflowMode::Normal)?;

            let matrix = page.matrix(0.0, 0.0, width, height, Rotation::None)?;
            let focus = page.focus_data(&matrix, x, y)?;
            let bytes = focus.to_bytes()?;
            let position = page.focus_position(&matrix, &focus)?;

            println!("{} {}", "run ordinal:".cyan(), focus.run());
            println!("{} {:.3}", "offset:".cyan(), focus.offset());
            println!("{} {}", "encoded:".cyan(), String::from_utf8_lossy(&bytes));
            println!(
                "{} ({:.1}, {:.1})",
                "resolves to:".cyan(),
                position.x,
                position.y
            );

            // Demonstrate stability: decode the bytes and resolve again.
            let decoded = FocusData::from_bytes(&bytes)?;
            let again = page.focus_position(&matrix, &decoded)?;
            log::debug!("re-resolved focus to ({:.1}, {:.1})", again.x, again.y);
        }
    }
    Ok(())
}

fn load_page(path: &PathBuf) -> Result<StaticPage, Box<dyn std::error::Error>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Drive the pagination operation under a progress bar.
fn drive_layout(page: &mut ReflowPage<'_>, mode: ReflowMode) -> repage::Result<()> {
    let mut progress = page.start_parse(mode)?;
    let bar = ProgressBar::new(progress.total_runs() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} laying out [{bar:30}] {pos}/{len} runs")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    loop {
        match progress.step()? {
            Progress::InProgress { done, .. } => bar.set_position(done as u64),
            Progress::Finished => break,
        }
    }
    bar.finish_and_clear();
    Ok(())
}

fn print_summary(
    page: &ReflowPage<'_>,
    width: f32,
    height: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let size = page.content_size()?;
    let blocks = page.blocks()?;
    let runs = page.runs()?;

    println!(
        "{} {}x{} viewport, content {:.1}x{:.1}, {} page(s), {} block(s)",
        "reflowed:".green().bold(),
        width,
        height,
        size.width,
        size.height,
        page.page_count()?,
        blocks.len()
    );

    for (i, block) in blocks.iter().enumerate() {
        let text: String = block
            .segments
            .iter()
            .map(|seg| match &runs[seg.run] {
                ContentRun::Text(t) => t.text.clone(),
                ContentRun::Image(img) => format!("[image {}]", img.bitmap.id),
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{} p{} y={:<7.1} {}",
            format!("#{i:<3}").dimmed(),
            block.page,
            block.rect.y,
            text
        );
    }
    Ok(())
}

fn print_json(page: &ReflowPage<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let blocks = page.blocks()?;
    println!("{}", serde_json::to_string_pretty(blocks)?);
    Ok(())
}
