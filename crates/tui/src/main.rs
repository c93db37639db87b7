mod export;
mod renderer;

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use icefield_core::StoryConfig;
use icefield_core::etl::{
    self, MuseumRecord, collected_year, found_spots, gallery, geojson, locations, pages,
    portraits, specimens,
};
use icefield_core::model::{AiSummary, FinalizedPortrait, PortraitRecord};
use icefield_core::views::StoryData;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "icefield", version, about = "Antarctic meteorite story toolkit")]
struct Cli {
    /// Story config JSON (fade threshold, timeline geometry, chart sizes).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Continent shares of the museum records.
    Locations(Io),
    /// Record counts per collection date, newest first.
    CollectedYears(Io),
    /// Antarctic found spots with numeric coordinates.
    FoundSpots(Io),
    /// Specimen table, cleansed unless `--raw`.
    Specimens(SpecimenArgs),
    /// Drop small islands from an outline and rewind its rings.
    Geojson(GeojsonArgs),
    /// Portrait records from the museum export.
    Portraits(Io),
    /// Join AI biographies onto portraits.
    Finalize(FinalizeArgs),
    /// Gallery filter facets of finalized portraits.
    Facets(Io),
    /// Page requests needed to fetch a whole search result.
    PagePlan(PagePlanArgs),
    /// Merge saved search pages into one record array.
    MergePages(MergePagesArgs),
    /// Bundle ETL outputs into the story's data file.
    Bundle(BundleArgs),
    /// Export a portrait's life timeline as SVG.
    Timeline(export::TimelineArgs),
    /// Export a year or weight histogram as SVG.
    Histogram(export::HistogramArgs),
    /// Export a labelled hexbin heatmap of meteorite positions as SVG.
    Heatmap(export::HeatmapArgs),
    /// Export one story step at a given scroll progress as SVG.
    Step(export::StepArgs),
    /// Scroll through the story in the terminal.
    Story(StoryArgs),
}

#[derive(Args, Debug)]
struct Io {
    /// Input JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SpecimenArgs {
    #[command(flatten)]
    io: Io,

    /// Emit extracted rows without cleansing.
    #[arg(long, default_value_t = false)]
    raw: bool,

    /// Fail on the first row that does not cleanse instead of skipping it.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct GeojsonArgs {
    #[command(flatten)]
    io: Io,

    /// Smallest exterior ring kept.
    #[arg(long, default_value_t = geojson::DEFAULT_MIN_POINTS)]
    min_points: usize,
}

#[derive(Args, Debug)]
struct FinalizeArgs {
    /// AI summaries JSON array.
    #[arg(long)]
    summaries: PathBuf,

    /// Extracted portraits JSON array.
    #[arg(long)]
    portraits: PathBuf,

    /// Latest plausible birth or death year; defaults to this year.
    #[arg(long)]
    year: Option<i32>,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PagePlanArgs {
    /// First saved page of the search.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long, default_value_t = 1000)]
    page_size: usize,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MergePagesArgs {
    /// Saved page responses, in order.
    #[arg(required = true)]
    pages: Vec<PathBuf>,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BundleArgs {
    /// Output of `locations`.
    #[arg(long)]
    locations: PathBuf,

    /// Output of `found-spots`.
    #[arg(long)]
    found_spots: PathBuf,

    /// Continent outline GeoJSON, ideally run through `geojson`.
    #[arg(long)]
    outline: Option<PathBuf>,

    /// Elevation contours GeoJSON with an `elevation` property.
    #[arg(long)]
    elevation: Option<PathBuf>,

    /// Blue ice area GeoJSON.
    #[arg(long)]
    blue_ice: Option<PathBuf>,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StoryArgs {
    /// Output of `bundle`.
    #[arg(long)]
    data: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Locations(io) => {
            let records = read_records(&io.in_path)?;
            write_json(io.out.as_deref(), &locations::attributed_locations(&records))
        }
        Command::CollectedYears(io) => {
            let records = read_records(&io.in_path)?;
            write_json(io.out.as_deref(), &collected_year::collected_years(&records))
        }
        Command::FoundSpots(io) => {
            let records = read_records(&io.in_path)?;
            write_json(io.out.as_deref(), &found_spots::antarctic_found_spots(&records))
        }
        Command::Specimens(args) => cmd_specimens(&args),
        Command::Geojson(args) => cmd_geojson(&args),
        Command::Portraits(io) => {
            let records = read_records(&io.in_path)?;
            write_json(io.out.as_deref(), &portraits::extract_portraits(&records))
        }
        Command::Finalize(args) => cmd_finalize(&args),
        Command::Facets(io) => {
            let finalized: Vec<FinalizedPortrait> = read_array(&io.in_path)?;
            write_json(io.out.as_deref(), &gallery::facets(&finalized))
        }
        Command::PagePlan(args) => cmd_page_plan(&args),
        Command::MergePages(args) => cmd_merge_pages(&args),
        Command::Bundle(args) => cmd_bundle(&args),
        Command::Timeline(args) => export::cmd_timeline(&args, &config),
        Command::Histogram(args) => export::cmd_histogram(&args, &config),
        Command::Heatmap(args) => export::cmd_heatmap(&args, &config),
        Command::Step(args) => export::cmd_step(&args, &config),
        Command::Story(args) => {
            let data = read_story_data(&args.data)?;
            renderer::run_story(&data, &config)
        }
    }
}

fn cmd_specimens(args: &SpecimenArgs) -> anyhow::Result<()> {
    let records = read_records(&args.io.in_path)?;
    let rows = specimens::extract_specimens(&records);
    if args.raw {
        return write_json(args.io.out.as_deref(), &rows);
    }
    let meteorites = if args.strict {
        specimens::cleanse_strict(&rows).map_err(etl::EtlError::from)?
    } else {
        specimens::cleanse(&rows)
    };
    write_json(args.io.out.as_deref(), &meteorites)
}

fn cmd_geojson(args: &GeojsonArgs) -> anyhow::Result<()> {
    let data = read(&args.io.in_path)?;
    let collection = geojson::parse_feature_collection(&data)
        .map_err(etl::EtlError::from)
        .with_context(|| format!("parse '{}'", args.io.in_path.display()))?;
    let mut simplified = geojson::simplify(&collection, args.min_points);
    geojson::strip_crs(&mut simplified);
    geojson::rewind(&mut simplified);
    tracing::info!(
        before = collection.features.len(),
        after = simplified.features.len(),
        "simplified outline"
    );
    write_json(args.io.out.as_deref(), &simplified)
}

fn cmd_finalize(args: &FinalizeArgs) -> anyhow::Result<()> {
    let summaries: Vec<AiSummary> = read_array(&args.summaries)?;
    let extracted: Vec<PortraitRecord> = read_array(&args.portraits)?;
    let year = args.year.unwrap_or_else(portraits::current_year);
    let finalized =
        portraits::finalize(summaries, extracted, year).map_err(etl::EtlError::from)?;
    write_json(args.out.as_deref(), &finalized)
}

fn cmd_page_plan(args: &PagePlanArgs) -> anyhow::Result<()> {
    let first = read_value(&args.in_path)?;
    let rows = pages::row_count(&first).map_err(etl::EtlError::from)?;
    let plan = pages::page_plan(rows, args.page_size).map_err(etl::EtlError::from)?;
    write_json(args.out.as_deref(), &plan)
}

fn cmd_merge_pages(args: &MergePagesArgs) -> anyhow::Result<()> {
    let saved = args
        .pages
        .iter()
        .map(PathBuf::as_path)
        .map(read_value)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let rows = pages::merge_pages(&saved).map_err(etl::EtlError::from)?;
    tracing::info!(pages = saved.len(), rows = rows.len(), "merged pages");
    write_json(args.out.as_deref(), &rows)
}

fn cmd_bundle(args: &BundleArgs) -> anyhow::Result<()> {
    let geometry = |path: Option<&Path>| -> anyhow::Result<_> {
        path.map(|path| {
            let data = read(path)?;
            geojson::parse_feature_collection(&data)
                .map_err(etl::EtlError::from)
                .with_context(|| format!("parse '{}'", path.display()))
        })
        .transpose()
    };
    let data = StoryData {
        locations: read_array(&args.locations)?,
        found_spots: read_array(&args.found_spots)?,
        outline: geometry(args.outline.as_deref())?,
        elevation: geometry(args.elevation.as_deref())?,
        blue_ice: geometry(args.blue_ice.as_deref())?,
    };
    if data.outline.is_some() && data.map_projection().is_none() {
        tracing::warn!("outline has no usable coordinates, maps will be empty");
    }
    write_json(args.out.as_deref(), &data)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StoryConfig> {
    match path {
        Some(path) => {
            StoryConfig::load(path).with_context(|| format!("load config '{}'", path.display()))
        }
        None => Ok(StoryConfig::default()),
    }
}

pub(crate) fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn read_value(path: &Path) -> anyhow::Result<serde_json::Value> {
    serde_json::from_slice(&read(path)?).with_context(|| format!("parse '{}'", path.display()))
}

fn read_records(path: &Path) -> anyhow::Result<Vec<MuseumRecord>> {
    let data = read(path)?;
    let records = etl::parse_records(&data)
        .map_err(etl::EtlError::from)
        .with_context(|| format!("parse '{}'", path.display()))?;
    tracing::info!(path = %path.display(), records = records.len(), "read museum export");
    Ok(records)
}

/// A JSON array of `T`, skipping elements that do not fit.
pub(crate) fn read_array<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let data = read(path)?;
    etl::parse_array(&data)
        .map_err(etl::EtlError::from)
        .with_context(|| format!("parse '{}'", path.display()))
}

pub(crate) fn read_story_data(path: &Path) -> anyhow::Result<StoryData> {
    serde_json::from_slice(&read(path)?).with_context(|| format!("parse '{}'", path.display()))
}

pub(crate) fn write_output(out: Option<&Path>, body: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            fs::write(path, body).with_context(|| format!("write '{}'", path.display()))?;
            tracing::info!(path = %path.display(), bytes = body.len(), "wrote output");
            Ok(())
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{body}").context("write stdout")
        }
    }
}

fn write_json<T: Serialize + ?Sized>(out: Option<&Path>, value: &T) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(value).context("serialize output")?;
    write_output(out, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_specimen_flags() {
        let cli = Cli::try_parse_from([
            "icefield",
            "specimens",
            "--in",
            "records.json",
            "--strict",
        ])
        .unwrap();
        match cli.cmd {
            Command::Specimens(args) => {
                assert!(args.strict);
                assert!(!args.raw);
                assert!(args.io.out.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn merge_pages_needs_at_least_one_page() {
        assert!(Cli::try_parse_from(["icefield", "merge-pages"]).is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from([
            "icefield",
            "story",
            "--data",
            "story.json",
            "--config",
            "story-config.json",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("story-config.json")));
    }
}
