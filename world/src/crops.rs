//! Crop growth state machine.

use std::time::Duration;

use homestead_core::{
    CellCoord, CellRect, CellRectSize, CropDefinition, CropId, CropKind, CropSnapshot, CropState,
    Event, InteractionError, Occupant, ToolKind,
};
use tracing::debug;

use crate::{animation::ToolAnimation, grid::Grid, occupancy};

/// Crop planted on a single grid cell.
#[derive(Clone, Debug)]
pub struct Crop {
    id: CropId,
    definition: CropDefinition,
    cell: CellCoord,
    state: CropState,
    stage: u32,
    growth_timer: Duration,
    water_remaining: Option<Duration>,
    animation: Option<ToolAnimation>,
}

impl Crop {
    /// Sows a crop on `cell`, claiming it in the grid.
    pub(crate) fn plant(
        id: CropId,
        definition: &CropDefinition,
        cell: CellCoord,
        grid: &mut Grid,
    ) -> Result<Self, InteractionError> {
        let slot = grid.cell(cell).ok_or(InteractionError::OutOfBounds)?;
        if slot.is_occupied() {
            return Err(InteractionError::Occupied);
        }
        occupancy::commit(grid, &cell_region(cell), Occupant::Crop(id));

        let mut crop = Self {
            id,
            definition: definition.clone(),
            cell,
            state: CropState::Seed,
            stage: 0,
            growth_timer: Duration::ZERO,
            water_remaining: None,
            animation: None,
        };
        crop.set_state(CropState::Growing);
        Ok(crop)
    }

    /// Identifier allocated by the field.
    #[must_use]
    pub const fn id(&self) -> CropId {
        self.id
    }

    /// Kind of crop.
    #[must_use]
    pub const fn kind(&self) -> CropKind {
        self.definition.kind()
    }

    /// Definition the crop was sown from.
    #[must_use]
    pub const fn definition(&self) -> &CropDefinition {
        &self.definition
    }

    /// Cell claimed by the crop.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Current growth state.
    #[must_use]
    pub const fn state(&self) -> CropState {
        self.state
    }

    /// Zero-based growth stage, always below the declared stage count.
    #[must_use]
    pub const fn stage(&self) -> u32 {
        self.stage
    }

    /// Growth accumulated toward the next stage.
    #[must_use]
    pub const fn growth_timer(&self) -> Duration {
        self.growth_timer
    }

    /// Remaining watering bonus, if any.
    #[must_use]
    pub const fn water_remaining(&self) -> Option<Duration> {
        self.water_remaining
    }

    /// Reports whether a watering bonus is active.
    #[must_use]
    pub const fn is_watered(&self) -> bool {
        self.water_remaining.is_some()
    }

    /// Running tool animation, if any.
    #[must_use]
    pub const fn animation(&self) -> Option<&ToolAnimation> {
        self.animation.as_ref()
    }

    /// Reports whether a tool animation blocks interaction.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.animation.is_some()
    }

    /// Growth multiplier in effect, including any watering bonus.
    #[must_use]
    pub fn effective_multiplier(&self) -> f32 {
        let base = self.definition.growth_speed_multiplier();
        match (self.is_watered(), self.definition.watering()) {
            (true, Some(profile)) => base * (1.0 + profile.growth_bonus()),
            _ => base,
        }
    }

    /// Items a harvest would produce right now.
    #[must_use]
    pub fn harvest_yield(&self) -> u32 {
        let base = self.definition.harvest_yield();
        match (self.is_watered(), self.definition.watering()) {
            (true, Some(profile)) => base.saturating_add(profile.yield_bonus()),
            _ => base,
        }
    }

    /// Captures an immutable snapshot for queries.
    #[must_use]
    pub fn snapshot(&self) -> CropSnapshot {
        CropSnapshot {
            id: self.id,
            kind: self.kind(),
            cell: self.cell,
            state: self.state,
            stage: self.stage,
            growth_timer: self.growth_timer,
            watered: self.is_watered(),
            busy: self.is_busy(),
            harvest_yield: self.harvest_yield(),
        }
    }

    /// Accumulates growth, then decays the watering bonus.
    pub(crate) fn grow(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.state == CropState::Growing {
            let scaled = scale(dt, self.effective_multiplier());
            self.growth_timer = self.growth_timer.saturating_add(scaled);
            let per_stage = self.definition.growth_time_per_stage();
            while self.state == CropState::Growing && self.growth_timer >= per_stage {
                self.growth_timer -= per_stage;
                self.advance_stage(out_events);
            }
        }

        if let Some(remaining) = self.water_remaining {
            let left = remaining.saturating_sub(dt);
            if left.is_zero() {
                self.water_remaining = None;
                debug!(crop = self.id.get(), "water bonus expired");
                out_events.push(Event::WaterBonusExpired { crop: self.id });
            } else {
                self.water_remaining = Some(left);
            }
        }
    }

    /// Applies the watering bonus and starts the pour animation.
    pub(crate) fn water(&mut self, out_events: &mut Vec<Event>) -> Result<(), InteractionError> {
        match self.state {
            CropState::Ready => return Err(InteractionError::AlreadyReady),
            CropState::Harvested => return Err(InteractionError::AlreadyHarvested),
            CropState::Seed | CropState::Growing => {}
        }
        if self.is_busy() {
            return Err(InteractionError::AlreadyBusy);
        }
        let duration = self
            .definition
            .watering()
            .map(|profile| profile.duration())
            .ok_or(InteractionError::NotWaterable)?;

        self.water_remaining = Some(duration).filter(|duration| !duration.is_zero());
        out_events.push(Event::CropWatered {
            crop: self.id,
            duration,
        });
        self.start_animation(ToolKind::Watering, out_events);
        Ok(())
    }

    /// Starts the harvest swing; the crop is collected once it finishes.
    pub(crate) fn begin_harvest(
        &mut self,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InteractionError> {
        match self.state {
            CropState::Ready => {}
            CropState::Harvested => return Err(InteractionError::AlreadyHarvested),
            CropState::Seed | CropState::Growing => return Err(InteractionError::NotReady),
        }
        if self.is_busy() {
            return Err(InteractionError::AlreadyBusy);
        }
        self.start_animation(ToolKind::Harvest, out_events);
        Ok(())
    }

    /// Advances the running animation, returning its tool when it completes.
    pub(crate) fn advance_animation(
        &mut self,
        dt: Duration,
        out_events: &mut Vec<Event>,
    ) -> Option<ToolKind> {
        let animation = self.animation.as_mut()?;
        if !animation.advance(dt) {
            return None;
        }
        let tool = animation.tool();
        self.animation = None;
        out_events.push(Event::AnimationFinished {
            crop: self.id,
            tool,
        });
        Some(tool)
    }

    /// Marks the crop harvested and releases its cell, returning the yield.
    pub(crate) fn finish_harvest(&mut self, grid: &mut Grid) -> u32 {
        let quantity = self.harvest_yield();
        self.set_state(CropState::Harvested);
        let _ = occupancy::release_region(grid, &cell_region(self.cell), Occupant::Crop(self.id));
        quantity
    }

    fn start_animation(&mut self, tool: ToolKind, out_events: &mut Vec<Event>) {
        let duration = self.definition.tool_animation();
        self.animation = Some(ToolAnimation::new(tool, duration));
        out_events.push(Event::AnimationStarted {
            crop: self.id,
            tool,
            duration,
        });
    }

    fn advance_stage(&mut self, out_events: &mut Vec<Event>) {
        let threshold = self.definition.ready_at().threshold(self.definition.growth_stages());
        let next = self.stage.saturating_add(1);
        if next >= threshold {
            self.set_state(CropState::Ready);
            out_events.push(Event::CropReady { crop: self.id });
            return;
        }
        self.stage = next;
        out_events.push(Event::CropStageAdvanced {
            crop: self.id,
            stage: next,
        });
    }

    fn set_state(&mut self, state: CropState) {
        self.state = state;
        match state {
            CropState::Seed => {
                self.stage = 0;
                self.growth_timer = Duration::ZERO;
            }
            CropState::Ready => {
                self.stage = self.definition.growth_stages().saturating_sub(1);
                self.growth_timer = Duration::ZERO;
            }
            CropState::Growing | CropState::Harvested => {}
        }
        debug!(crop = self.id.get(), ?state, stage = self.stage, "crop state changed");
    }
}

const fn cell_region(cell: CellCoord) -> CellRect {
    CellRect::from_origin_and_size(cell, CellRectSize::new(1, 1))
}

/// Negative or NaN products grow nothing; only positive overflow saturates.
fn scale(dt: Duration, multiplier: f32) -> Duration {
    let seconds = dt.as_secs_f64() * f64::from(multiplier);
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use homestead_core::{ReadyAt, WaterProfile};

    fn corn() -> CropDefinition {
        CropDefinition::new("corn", CropKind::Corn).with_watering(WaterProfile::default())
    }

    fn planted(definition: &CropDefinition) -> (Crop, Grid) {
        let mut grid = Grid::new(4, 4, 1.0);
        let crop = Crop::plant(CropId::new(0), definition, CellCoord::new(1, 1), &mut grid)
            .expect("cell is free");
        (crop, grid)
    }

    #[test]
    fn planting_enters_growing_and_claims_cell() {
        let (crop, grid) = planted(&corn());
        assert_eq!(crop.state(), CropState::Growing);
        assert_eq!(crop.stage(), 0);
        assert_eq!(
            grid.cell(CellCoord::new(1, 1)).and_then(|cell| cell.occupant()),
            Some(Occupant::Crop(CropId::new(0)))
        );
    }

    #[test]
    fn planting_refuses_claimed_and_outside_cells() {
        let definition = corn();
        let (_, mut grid) = planted(&definition);
        assert_eq!(
            Crop::plant(CropId::new(1), &definition, CellCoord::new(1, 1), &mut grid).err(),
            Some(InteractionError::Occupied)
        );
        assert_eq!(
            Crop::plant(CropId::new(1), &definition, CellCoord::new(9, 1), &mut grid).err(),
            Some(InteractionError::OutOfBounds)
        );
    }

    #[test]
    fn one_interval_advances_one_stage() {
        let (mut crop, _) = planted(&corn());
        let mut events = Vec::new();
        crop.grow(Duration::from_secs(10), &mut events);
        assert_eq!(crop.stage(), 1);
        assert_eq!(crop.state(), CropState::Growing);
        assert_eq!(
            events,
            vec![Event::CropStageAdvanced {
                crop: CropId::new(0),
                stage: 1
            }]
        );
    }

    #[test]
    fn large_step_consumes_several_stages_and_reaches_ready() {
        let (mut crop, _) = planted(&corn());
        let mut events = Vec::new();
        crop.grow(Duration::from_secs(25), &mut events);
        assert_eq!(crop.state(), CropState::Ready);
        assert_eq!(crop.stage(), 2);
        assert_eq!(crop.growth_timer(), Duration::ZERO);
        assert!(events.contains(&Event::CropReady {
            crop: CropId::new(0)
        }));
    }

    #[test]
    fn past_final_stage_needs_an_extra_interval_and_clamps() {
        let definition = corn().with_ready_at(ReadyAt::PastFinalStage);
        let (mut crop, _) = planted(&definition);
        let mut events = Vec::new();
        crop.grow(Duration::from_secs(20), &mut events);
        assert_eq!(crop.state(), CropState::Growing);
        assert_eq!(crop.stage(), 2);

        crop.grow(Duration::from_secs(10), &mut events);
        assert_eq!(crop.state(), CropState::Ready);
        assert_eq!(crop.stage(), 2, "stage must stay below the stage count");
    }

    #[test]
    fn watering_boosts_growth_and_yield_until_it_expires() {
        let (mut crop, _) = planted(&corn());
        let mut events = Vec::new();
        crop.water(&mut events).expect("growing corn accepts water");
        assert!(crop.is_busy());
        assert_eq!(crop.harvest_yield(), 6);
        assert!((crop.effective_multiplier() - 1.2).abs() < 1e-6);

        crop.grow(Duration::from_secs(5), &mut events);
        assert!((crop.growth_timer().as_secs_f64() - 6.0).abs() < 1e-3);

        crop.grow(Duration::from_secs(25), &mut events);
        assert!(!crop.is_watered());
        assert_eq!(crop.harvest_yield(), 4);
        assert!(events.contains(&Event::WaterBonusExpired {
            crop: CropId::new(0)
        }));
    }

    #[test]
    fn busy_crop_refuses_water_until_animation_finishes() {
        let (mut crop, _) = planted(&corn());
        let mut events = Vec::new();
        crop.water(&mut events).expect("first watering succeeds");
        assert_eq!(crop.water(&mut events), Err(InteractionError::AlreadyBusy));

        assert_eq!(
            crop.advance_animation(Duration::from_secs(2), &mut events),
            Some(ToolKind::Watering)
        );
        assert_eq!(crop.advance_animation(Duration::from_secs(2), &mut events), None);
        assert!(crop.water(&mut events).is_ok());
    }

    #[test]
    fn broccoli_cannot_be_watered() {
        let broccoli = CropDefinition::new("broccoli", CropKind::Broccoli);
        let (mut crop, _) = planted(&broccoli);
        assert_eq!(
            crop.water(&mut Vec::new()),
            Err(InteractionError::NotWaterable)
        );
        assert!(!crop.is_busy());
    }

    #[test]
    fn harvest_requires_ready_state() {
        let (mut crop, mut grid) = planted(&corn());
        let mut events = Vec::new();
        assert_eq!(
            crop.begin_harvest(&mut events),
            Err(InteractionError::NotReady)
        );

        crop.grow(Duration::from_secs(30), &mut events);
        crop.begin_harvest(&mut events).expect("ripe crop can be harvested");
        assert_eq!(
            crop.begin_harvest(&mut events),
            Err(InteractionError::AlreadyBusy)
        );

        assert_eq!(crop.finish_harvest(&mut grid), 4);
        assert_eq!(crop.state(), CropState::Harvested);
        assert!(grid.iter().all(|(_, cell)| !cell.is_occupied()));
    }

    #[test]
    fn shrinking_multiplier_never_ripens_a_crop() {
        let definition = CropDefinition::new("corn", CropKind::Corn).with_watering(
            WaterProfile::new(-5.0, Duration::from_secs(30), 2),
        );
        let (mut crop, _) = planted(&definition);
        let mut events = Vec::new();
        crop.water(&mut events).expect("growing corn accepts water");

        crop.grow(Duration::from_millis(1), &mut events);
        assert_eq!(crop.state(), CropState::Growing);
        assert_eq!(crop.stage(), 0);
        assert_eq!(crop.growth_timer(), Duration::ZERO);
    }

    #[test]
    fn scale_clamps_unusable_products() {
        let second = Duration::from_secs(1);
        assert_eq!(scale(second, -2.0), Duration::ZERO);
        assert_eq!(scale(second, f32::NAN), Duration::ZERO);
        assert_eq!(scale(second, f32::INFINITY), Duration::MAX);
        assert_eq!(scale(second, 0.5), Duration::from_millis(500));
    }
}
