//! Immutable structure and crop definitions keyed by identifier.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{CellRectSize, CropKind, Footprint, Rotation};

const DEFAULT_GROWTH_STAGES: u32 = 3;
const DEFAULT_GROWTH_TIME_PER_STAGE: Duration = Duration::from_secs(10);
const DEFAULT_HARVEST_YIELD: u32 = 4;
const DEFAULT_TOOL_ANIMATION: Duration = Duration::from_millis(1_500);

const DEFAULT_WATER_GROWTH_BONUS: f32 = 0.2;
const DEFAULT_WATER_DURATION: Duration = Duration::from_secs(30);
const DEFAULT_WATER_YIELD_BONUS: u32 = 2;

/// Placement data for a structure that can be built on the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureDefinition {
    id: String,
    display_name: String,
    category: String,
    size: CellRectSize,
}

impl StructureDefinition {
    /// Creates a new structure definition.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        category: impl Into<String>,
        size: CellRectSize,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            category: category.into(),
            size,
        }
    }

    /// Identifier used to look the definition up.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name presented to players.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Grouping used by build menus.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Declared, unrotated footprint size.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Footprint of the structure at the provided rotation.
    #[must_use]
    pub const fn footprint(&self, rotation: Rotation) -> Footprint {
        Footprint::new(self.size, rotation)
    }
}

/// Stage index at which a crop counts as fully grown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyAt {
    /// Ready once the stage counter reaches `growth_stages - 1`.
    #[default]
    FinalStage,
    /// Ready once the stage counter reaches `growth_stages`; the counter is
    /// then clamped back to the final stage.
    PastFinalStage,
}

impl ReadyAt {
    /// Stage counter value that triggers the ready transition.
    #[must_use]
    pub const fn threshold(self, growth_stages: u32) -> u32 {
        match self {
            Self::FinalStage => growth_stages.saturating_sub(1),
            Self::PastFinalStage => growth_stages,
        }
    }
}

/// Temporary bonus granted to crops that can be watered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterProfile {
    growth_bonus: f32,
    duration: Duration,
    yield_bonus: u32,
}

impl WaterProfile {
    /// Creates a watering profile.
    #[must_use]
    pub const fn new(growth_bonus: f32, duration: Duration, yield_bonus: u32) -> Self {
        Self {
            growth_bonus,
            duration,
            yield_bonus,
        }
    }

    /// Fraction added to the growth speed while the bonus lasts.
    #[must_use]
    pub const fn growth_bonus(&self) -> f32 {
        self.growth_bonus
    }

    /// Length of the bonus countdown.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Extra items produced by a harvest while the bonus lasts.
    #[must_use]
    pub const fn yield_bonus(&self) -> u32 {
        self.yield_bonus
    }
}

impl Default for WaterProfile {
    fn default() -> Self {
        Self::new(
            DEFAULT_WATER_GROWTH_BONUS,
            DEFAULT_WATER_DURATION,
            DEFAULT_WATER_YIELD_BONUS,
        )
    }
}

/// Growth and yield parameters for a crop kind.
#[derive(Clone, Debug, PartialEq)]
pub struct CropDefinition {
    id: String,
    kind: CropKind,
    growth_stages: u32,
    growth_time_per_stage: Duration,
    harvest_yield: u32,
    growth_speed_multiplier: f32,
    tool_animation: Duration,
    ready_at: ReadyAt,
    watering: Option<WaterProfile>,
}

impl CropDefinition {
    /// Creates a crop definition populated with default growth parameters.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: CropKind) -> Self {
        Self {
            id: id.into(),
            kind,
            growth_stages: DEFAULT_GROWTH_STAGES,
            growth_time_per_stage: DEFAULT_GROWTH_TIME_PER_STAGE,
            harvest_yield: DEFAULT_HARVEST_YIELD,
            growth_speed_multiplier: 1.0,
            tool_animation: DEFAULT_TOOL_ANIMATION,
            ready_at: ReadyAt::FinalStage,
            watering: None,
        }
    }

    /// Overrides the number of growth stages.
    #[must_use]
    pub fn with_growth_stages(mut self, growth_stages: u32) -> Self {
        self.growth_stages = growth_stages;
        self
    }

    /// Overrides the growth time required per stage.
    #[must_use]
    pub fn with_growth_time_per_stage(mut self, growth_time_per_stage: Duration) -> Self {
        self.growth_time_per_stage = growth_time_per_stage;
        self
    }

    /// Overrides the base harvest yield.
    #[must_use]
    pub fn with_harvest_yield(mut self, harvest_yield: u32) -> Self {
        self.harvest_yield = harvest_yield;
        self
    }

    /// Overrides the base growth speed multiplier.
    #[must_use]
    pub fn with_growth_speed_multiplier(mut self, multiplier: f32) -> Self {
        self.growth_speed_multiplier = multiplier;
        self
    }

    /// Overrides the length of the harvest and watering tool animations.
    #[must_use]
    pub fn with_tool_animation(mut self, tool_animation: Duration) -> Self {
        self.tool_animation = tool_animation;
        self
    }

    /// Overrides the stage at which the crop counts as fully grown.
    #[must_use]
    pub fn with_ready_at(mut self, ready_at: ReadyAt) -> Self {
        self.ready_at = ready_at;
        self
    }

    /// Allows the crop to be watered using the provided profile.
    #[must_use]
    pub fn with_watering(mut self, watering: WaterProfile) -> Self {
        self.watering = Some(watering);
        self
    }

    /// Identifier used to look the definition up.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Crop kind described by the definition.
    #[must_use]
    pub const fn kind(&self) -> CropKind {
        self.kind
    }

    /// Number of growth stages, at least one.
    #[must_use]
    pub const fn growth_stages(&self) -> u32 {
        self.growth_stages
    }

    /// Growth time required to advance one stage at unit speed.
    #[must_use]
    pub const fn growth_time_per_stage(&self) -> Duration {
        self.growth_time_per_stage
    }

    /// Base number of items produced by a harvest.
    #[must_use]
    pub const fn harvest_yield(&self) -> u32 {
        self.harvest_yield
    }

    /// Base growth speed multiplier.
    #[must_use]
    pub const fn growth_speed_multiplier(&self) -> f32 {
        self.growth_speed_multiplier
    }

    /// Length of the harvest and watering tool animations.
    #[must_use]
    pub const fn tool_animation(&self) -> Duration {
        self.tool_animation
    }

    /// Stage at which the crop counts as fully grown.
    #[must_use]
    pub const fn ready_at(&self) -> ReadyAt {
        self.ready_at
    }

    /// Watering profile, when the crop can be watered.
    #[must_use]
    pub const fn watering(&self) -> Option<&WaterProfile> {
        self.watering.as_ref()
    }
}

/// Reasons a catalog lookup or insertion may fail.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// No structure definition uses the identifier.
    #[error("structure definition `{0}` not found")]
    UnknownStructure(String),
    /// No crop definition exists for the kind.
    #[error("no crop definition configured for {}", .0.name())]
    UnknownCrop(CropKind),
    /// A structure definition with the identifier already exists.
    #[error("structure definition `{0}` is declared more than once")]
    DuplicateStructure(String),
    /// A crop definition for the kind already exists.
    #[error("crop kind {} is declared more than once", .0.name())]
    DuplicateCrop(CropKind),
    /// The structure declares a footprint without any cells.
    #[error("structure definition `{0}` has an empty footprint")]
    EmptyFootprint(String),
    /// The crop declares zero growth stages.
    #[error("crop definition `{0}` must have at least one growth stage")]
    NoGrowthStages(String),
    /// The crop declares a negative or non-finite growth multiplier.
    #[error("crop definition `{0}` has an invalid growth speed multiplier")]
    InvalidMultiplier(String),
    /// The crop's watering profile declares a negative or non-finite growth bonus.
    #[error("crop definition `{0}` has an invalid watering growth bonus")]
    InvalidWaterBonus(String),
}

/// Registry of every structure and crop definition available to the world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    structures: BTreeMap<String, StructureDefinition>,
    crops: BTreeMap<CropKind, CropDefinition>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the stock farm structures and crops.
    #[must_use]
    pub fn builtin() -> Self {
        let structures = [
            StructureDefinition::new("shed", "Tool Shed", "storage", CellRectSize::new(2, 1)),
            StructureDefinition::new("barn", "Barn", "storage", CellRectSize::new(3, 2)),
            StructureDefinition::new("silo", "Silo", "storage", CellRectSize::new(1, 1)),
            StructureDefinition::new("coop", "Chicken Coop", "animals", CellRectSize::new(2, 2)),
        ];
        let crops = [
            CropDefinition::new("broccoli", CropKind::Broccoli),
            CropDefinition::new("corn", CropKind::Corn).with_watering(WaterProfile::default()),
        ];

        Self {
            structures: structures
                .into_iter()
                .map(|definition| (definition.id.clone(), definition))
                .collect(),
            crops: crops
                .into_iter()
                .map(|definition| (definition.kind, definition))
                .collect(),
        }
    }

    /// Registers a structure definition after validating it.
    pub fn add_structure(&mut self, definition: StructureDefinition) -> Result<(), CatalogError> {
        if definition.size.area() == 0 {
            return Err(CatalogError::EmptyFootprint(definition.id));
        }
        if self.structures.contains_key(&definition.id) {
            return Err(CatalogError::DuplicateStructure(definition.id));
        }

        let _ = self.structures.insert(definition.id.clone(), definition);
        Ok(())
    }

    /// Registers a crop definition after validating it.
    pub fn add_crop(&mut self, definition: CropDefinition) -> Result<(), CatalogError> {
        if definition.growth_stages == 0 {
            return Err(CatalogError::NoGrowthStages(definition.id));
        }
        let multiplier = definition.growth_speed_multiplier;
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(CatalogError::InvalidMultiplier(definition.id));
        }
        if let Some(profile) = definition.watering {
            if !profile.growth_bonus.is_finite() || profile.growth_bonus < 0.0 {
                return Err(CatalogError::InvalidWaterBonus(definition.id));
            }
        }
        if self.crops.contains_key(&definition.kind) {
            return Err(CatalogError::DuplicateCrop(definition.kind));
        }

        let _ = self.crops.insert(definition.kind, definition);
        Ok(())
    }

    /// Looks up a structure definition by identifier.
    pub fn structure(&self, id: &str) -> Result<&StructureDefinition, CatalogError> {
        self.structures
            .get(id)
            .ok_or_else(|| CatalogError::UnknownStructure(id.to_owned()))
    }

    /// Looks up the crop definition for a kind.
    pub fn crop(&self, kind: CropKind) -> Result<&CropDefinition, CatalogError> {
        self.crops.get(&kind).ok_or(CatalogError::UnknownCrop(kind))
    }

    /// Iterates over structure definitions ordered by identifier.
    pub fn structures(&self) -> impl Iterator<Item = &StructureDefinition> {
        self.structures.values()
    }

    /// Iterates over crop definitions ordered by kind.
    pub fn crops(&self) -> impl Iterator<Item = &CropDefinition> {
        self.crops.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_contains_stock_definitions() {
        let catalog = Catalog::builtin();
        let shed = catalog.structure("shed").expect("shed definition");
        assert_eq!(shed.size(), CellRectSize::new(2, 1));
        assert!(catalog.crop(CropKind::Corn).expect("corn").watering().is_some());
        assert!(catalog
            .crop(CropKind::Broccoli)
            .expect("broccoli")
            .watering()
            .is_none());
    }

    #[test]
    fn unknown_structure_reports_identifier() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.structure("windmill"),
            Err(CatalogError::UnknownStructure("windmill".to_owned()))
        );
    }

    #[test]
    fn add_structure_rejects_empty_footprint_and_duplicates() {
        let mut catalog = Catalog::new();
        assert_eq!(
            catalog.add_structure(StructureDefinition::new(
                "flat",
                "Flat",
                "misc",
                CellRectSize::new(0, 3),
            )),
            Err(CatalogError::EmptyFootprint("flat".to_owned()))
        );

        let well = StructureDefinition::new("well", "Well", "misc", CellRectSize::new(1, 1));
        assert_eq!(catalog.add_structure(well.clone()), Ok(()));
        assert_eq!(
            catalog.add_structure(well),
            Err(CatalogError::DuplicateStructure("well".to_owned()))
        );
    }

    #[test]
    fn add_crop_validates_growth_parameters() {
        let mut catalog = Catalog::new();
        assert_eq!(
            catalog.add_crop(CropDefinition::new("dud", CropKind::Broccoli).with_growth_stages(0)),
            Err(CatalogError::NoGrowthStages("dud".to_owned()))
        );
        assert_eq!(
            catalog.add_crop(
                CropDefinition::new("slow", CropKind::Broccoli).with_growth_speed_multiplier(-1.0)
            ),
            Err(CatalogError::InvalidMultiplier("slow".to_owned()))
        );
        assert_eq!(
            catalog.add_crop(CropDefinition::new("broccoli", CropKind::Broccoli)),
            Ok(())
        );
        assert_eq!(
            catalog.add_crop(CropDefinition::new("broccoli-2", CropKind::Broccoli)),
            Err(CatalogError::DuplicateCrop(CropKind::Broccoli))
        );
    }

    #[test]
    fn add_crop_rejects_broken_watering_profiles() {
        let mut catalog = Catalog::new();
        for bonus in [-5.0, f32::NAN, f32::INFINITY] {
            let corn = CropDefinition::new("soggy", CropKind::Corn).with_watering(WaterProfile::new(
                bonus,
                Duration::from_secs(30),
                2,
            ));
            assert_eq!(
                catalog.add_crop(corn),
                Err(CatalogError::InvalidWaterBonus("soggy".to_owned())),
                "bonus {bonus} must be refused",
            );
        }
        assert!(catalog.crops().next().is_none());
    }

    #[test]
    fn ready_threshold_follows_convention() {
        assert_eq!(ReadyAt::FinalStage.threshold(3), 2);
        assert_eq!(ReadyAt::PastFinalStage.threshold(3), 3);
        assert_eq!(ReadyAt::FinalStage.threshold(1), 0);
    }
}
