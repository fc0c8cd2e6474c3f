//! Genlib Layout - Entry Point
//!
//! Läser släktdata (JSON eller GEDCOM) och skriver trädlayouten som JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use genlib_layout::gedcom;
use genlib_layout::services::find_highest_ancestor;
use genlib_layout::{FamilyData, LayoutCallbacks, LayoutConfig, Orientation, TreeLayoutService};

#[derive(Parser, Debug)]
#[command(name = "genlib-layout", version, about = "Beräkna layout för ett släktträd")]
struct Args {
    /// Indatafil: JSON med people/marriages eller GEDCOM (.ged), '-' för stdin
    input: PathBuf,

    /// ID för rotpersonen
    #[arg(short, long)]
    root: String,

    /// Trädets riktning
    #[arg(long, value_enum, default_value = "vertical")]
    orientation: OrientationArg,

    /// Utdatafil, annars stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Layoutinställningar (TOML), annars standardsökvägen
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Börja från rotpersonens äldsta kända ana
    #[arg(long)]
    from_highest_ancestor: bool,

    /// Visa felsökningsloggar
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OrientationArg {
    Vertical,
    Horizontal,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Vertical => Orientation::Vertical,
            OrientationArg::Horizontal => Orientation::Horizontal,
        }
    }
}

fn load_input(path: &Path) -> Result<FamilyData> {
    if path == Path::new("-") {
        return Ok(FamilyData::from_reader(std::io::stdin().lock())?);
    }

    let is_gedcom = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("ged"))
        .unwrap_or(false);

    if is_gedcom {
        gedcom::load_family_data(path)
    } else {
        FamilyData::load_json(path)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initiera logging
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Startar Genlib Layout v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => LayoutConfig::load_from(path)?,
        None => LayoutConfig::load(),
    };

    let data = load_input(&args.input)?;
    tracing::info!(
        "Läste {} personer och {} äktenskap från {:?}",
        data.people.len(),
        data.marriages.len(),
        args.input
    );

    let root = if args.from_highest_ancestor {
        find_highest_ancestor(&args.root, &data.people, &data.marriages)
    } else {
        args.root.clone()
    };

    let layout = TreeLayoutService::new(config).calculate_layout(
        &root,
        &data.people,
        &data.marriages,
        &LayoutCallbacks::noop(),
        args.orientation.into(),
    )?;

    let (min_x, min_y, max_x, max_y) = layout.bounds();
    tracing::info!(
        "Trädets utsträckning: x {:.0}..{:.0}, y {:.0}..{:.0}",
        min_x,
        max_x,
        min_y,
        max_y
    );

    for diagnostic in &layout.diagnostics {
        tracing::warn!("{}", diagnostic);
    }

    let json = serde_json::to_string_pretty(&layout).context("Kunde inte serialisera layouten")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Kunde inte skriva {:?}", path))?;
            tracing::info!("Layout sparad till {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
