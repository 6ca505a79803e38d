//! TOML configuration describing the grid and the structure and crop catalog.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use homestead_core::{
    Catalog, CellRectSize, CropDefinition, CropKind, ReadyAt, StructureDefinition, WaterProfile,
    MAX_GRID_DIMENSION,
};
use serde::Deserialize;

/// Configuration shipped with the binary.
pub(crate) const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Grid dimensions requested by the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub(crate) struct GridConfig {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    #[serde(default = "default_cell_size")]
    pub(crate) cell_size: f32,
}

/// Fully validated configuration.
#[derive(Clone, Debug)]
pub(crate) struct HomesteadConfig {
    pub(crate) grid: GridConfig,
    pub(crate) catalog: Catalog,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    grid: GridConfig,
    #[serde(default)]
    structures: Vec<RawStructure>,
    #[serde(default)]
    crops: Vec<RawCrop>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStructure {
    id: String,
    display_name: Option<String>,
    #[serde(default)]
    category: String,
    width: u32,
    depth: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCrop {
    id: String,
    kind: String,
    growth_stages: Option<u32>,
    growth_time_per_stage: Option<f64>,
    harvest_yield: Option<u32>,
    growth_speed_multiplier: Option<f32>,
    tool_animation: Option<f64>,
    ready_at: Option<ReadyAt>,
    watering: Option<RawWatering>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWatering {
    growth_bonus: f32,
    duration: f64,
    yield_bonus: u32,
}

fn default_cell_size() -> f32 {
    1.0
}

/// Reads and validates the configuration stored at `path`.
pub(crate) fn load(path: &Path) -> Result<HomesteadConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
}

/// Parses and validates a configuration document.
pub(crate) fn parse(contents: &str) -> Result<HomesteadConfig> {
    let raw: RawConfig =
        toml::from_str(contents).context("failed to parse configuration toml contents")?;

    if raw.grid.columns == 0 || raw.grid.rows == 0 {
        bail!(
            "grid must have at least one column and row, got {}x{}",
            raw.grid.columns,
            raw.grid.rows
        );
    }
    if raw.grid.columns > MAX_GRID_DIMENSION || raw.grid.rows > MAX_GRID_DIMENSION {
        bail!(
            "grid may have at most {MAX_GRID_DIMENSION} columns and rows, got {}x{}",
            raw.grid.columns,
            raw.grid.rows
        );
    }
    if !raw.grid.cell_size.is_finite() || raw.grid.cell_size <= 0.0 {
        bail!("grid cell_size must be positive, got {}", raw.grid.cell_size);
    }

    let mut catalog = Catalog::new();
    for structure in raw.structures {
        let id = structure.id.clone();
        let definition = StructureDefinition::new(
            structure.id,
            structure.display_name.unwrap_or_else(|| id.clone()),
            structure.category,
            CellRectSize::new(structure.width, structure.depth),
        );
        catalog
            .add_structure(definition)
            .with_context(|| format!("rejected structure `{id}`"))?;
    }
    for crop in raw.crops {
        let id = crop.id.clone();
        let definition = crop_definition(crop).with_context(|| format!("rejected crop `{id}`"))?;
        catalog.add_crop(definition)?;
    }

    Ok(HomesteadConfig {
        grid: raw.grid,
        catalog,
    })
}

fn crop_definition(raw: RawCrop) -> Result<CropDefinition> {
    let kind = parse_crop_kind(&raw.kind)?;
    let mut definition = CropDefinition::new(raw.id, kind);
    if let Some(stages) = raw.growth_stages {
        definition = definition.with_growth_stages(stages);
    }
    if let Some(seconds) = raw.growth_time_per_stage {
        definition = definition.with_growth_time_per_stage(seconds_to_duration(seconds)?);
    }
    if let Some(harvest_yield) = raw.harvest_yield {
        definition = definition.with_harvest_yield(harvest_yield);
    }
    if let Some(multiplier) = raw.growth_speed_multiplier {
        definition = definition.with_growth_speed_multiplier(multiplier);
    }
    if let Some(seconds) = raw.tool_animation {
        definition = definition.with_tool_animation(seconds_to_duration(seconds)?);
    }
    if let Some(ready_at) = raw.ready_at {
        definition = definition.with_ready_at(ready_at);
    }
    if let Some(watering) = raw.watering {
        if !watering.growth_bonus.is_finite() || watering.growth_bonus < 0.0 {
            bail!("watering growth_bonus must be non-negative");
        }
        definition = definition.with_watering(WaterProfile::new(
            watering.growth_bonus,
            seconds_to_duration(watering.duration)?,
            watering.yield_bonus,
        ));
    }
    Ok(definition)
}

fn parse_crop_kind(name: &str) -> Result<CropKind> {
    match name {
        "broccoli" => Ok(CropKind::Broccoli),
        "corn" => Ok(CropKind::Corn),
        _ => bail!("unknown crop kind `{name}`"),
    }
}

fn seconds_to_duration(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("`{seconds}` is not a valid number of seconds"))
}
