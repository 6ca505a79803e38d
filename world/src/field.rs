//! Crop field bookkeeping: which crop grows where, the busy guard and the harvest tally.

use std::{collections::BTreeMap, time::Duration};

use homestead_core::{
    Catalog, CellCoord, CropId, CropKind, CropState, Event, InteractionError, InteractionGuard,
    Occupant, ToolKind,
};
use tracing::{debug, info};

use crate::{crops::Crop, grid::Grid};

/// Every crop that has not been harvested yet, indexed by cell.
#[derive(Debug)]
pub struct CropField {
    crops: BTreeMap<CropId, Crop>,
    by_cell: BTreeMap<CellCoord, CropId>,
    next_crop_id: CropId,
    selected_kind: CropKind,
    guard: InteractionGuard,
    harvested: BTreeMap<CropKind, u32>,
}

impl CropField {
    pub(crate) fn new() -> Self {
        Self {
            crops: BTreeMap::new(),
            by_cell: BTreeMap::new(),
            next_crop_id: CropId::new(0),
            selected_kind: CropKind::default(),
            guard: InteractionGuard::default(),
            harvested: BTreeMap::new(),
        }
    }

    /// Crop kind sown by plant intents.
    #[must_use]
    pub const fn selected_kind(&self) -> CropKind {
        self.selected_kind
    }

    /// Busy guard applied before every interaction.
    #[must_use]
    pub const fn guard(&self) -> InteractionGuard {
        self.guard
    }

    /// Crop growing on the cell.
    #[must_use]
    pub fn crop_at(&self, cell: CellCoord) -> Option<&Crop> {
        self.by_cell.get(&cell).and_then(|id| self.crops.get(id))
    }

    /// Crop with the identifier.
    #[must_use]
    pub fn crop(&self, id: CropId) -> Option<&Crop> {
        self.crops.get(&id)
    }

    /// Iterates over crops in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Crop> {
        self.crops.values()
    }

    /// Number of crops in the field.
    #[must_use]
    pub fn len(&self) -> usize {
        self.crops.len()
    }

    /// Reports whether nothing grows in the field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    /// Total yield harvested so far for the kind.
    #[must_use]
    pub fn harvested(&self, kind: CropKind) -> u32 {
        self.harvested.get(&kind).copied().unwrap_or(0)
    }

    /// Reports whether any crop is mid-animation.
    #[must_use]
    pub fn any_busy(&self) -> bool {
        self.crops.values().any(Crop::is_busy)
    }

    pub(crate) fn select_kind(&mut self, kind: CropKind, out_events: &mut Vec<Event>) {
        self.selected_kind = kind;
        info!(kind = kind.name(), "crop kind selected");
        out_events.push(Event::CropKindSelected { kind });
    }

    pub(crate) fn set_guard(&mut self, guard: InteractionGuard) {
        self.guard = guard;
    }

    /// Drops every crop; the grid is expected to be rebuilt alongside.
    pub(crate) fn clear(&mut self) {
        self.crops.clear();
        self.by_cell.clear();
    }

    /// Plants, waters or harvests depending on what the cell holds.
    pub(crate) fn interact(
        &mut self,
        cell: CellCoord,
        grid: &mut Grid,
        catalog: &Catalog,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InteractionError> {
        let occupant = grid
            .cell(cell)
            .ok_or(InteractionError::OutOfBounds)?
            .occupant();
        self.ensure_idle(cell)?;

        match occupant {
            None => self.sow(cell, grid, catalog, out_events),
            Some(Occupant::Structure(_)) => Err(InteractionError::OccupiedByStructure),
            Some(Occupant::Crop(_)) => {
                let state = self
                    .crop_at(cell)
                    .map(Crop::state)
                    .ok_or(InteractionError::NoCrop)?;
                match state {
                    CropState::Ready => self.start_harvest(cell, grid, out_events),
                    CropState::Seed | CropState::Growing => self.start_watering(cell, out_events),
                    CropState::Harvested => Err(InteractionError::AlreadyHarvested),
                }
            }
        }
    }

    pub(crate) fn plant(
        &mut self,
        cell: CellCoord,
        grid: &mut Grid,
        catalog: &Catalog,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InteractionError> {
        self.ensure_idle(cell)?;
        self.sow(cell, grid, catalog, out_events)
    }

    pub(crate) fn water(
        &mut self,
        cell: CellCoord,
        grid: &Grid,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InteractionError> {
        self.ensure_crop(cell, grid)?;
        self.ensure_idle(cell)?;
        self.start_watering(cell, out_events)
    }

    pub(crate) fn harvest(
        &mut self,
        cell: CellCoord,
        grid: &mut Grid,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InteractionError> {
        self.ensure_crop(cell, grid)?;
        self.ensure_idle(cell)?;
        self.start_harvest(cell, grid, out_events)
    }

    /// Grows every crop and advances tool animations, collecting finished harvests.
    pub(crate) fn tick(&mut self, dt: Duration, grid: &mut Grid, out_events: &mut Vec<Event>) {
        let mut finished = Vec::new();
        for crop in self.crops.values_mut() {
            crop.grow(dt, out_events);
            if crop.advance_animation(dt, out_events) == Some(ToolKind::Harvest) {
                finished.push(crop.id());
            }
        }

        for id in finished {
            self.complete_harvest(id, grid, out_events);
        }
    }

    fn ensure_idle(&self, cell: CellCoord) -> Result<(), InteractionError> {
        let busy = match self.guard {
            InteractionGuard::PerCell => self.crop_at(cell).is_some_and(Crop::is_busy),
            InteractionGuard::Global => self.any_busy(),
        };
        if busy {
            return Err(InteractionError::AlreadyBusy);
        }
        Ok(())
    }

    fn ensure_crop(&self, cell: CellCoord, grid: &Grid) -> Result<(), InteractionError> {
        match grid.cell(cell).map(|slot| slot.occupant()) {
            None => Err(InteractionError::OutOfBounds),
            Some(Some(Occupant::Structure(_))) => Err(InteractionError::OccupiedByStructure),
            Some(_) if self.crop_at(cell).is_none() => Err(InteractionError::NoCrop),
            Some(_) => Ok(()),
        }
    }

    fn sow(
        &mut self,
        cell: CellCoord,
        grid: &mut Grid,
        catalog: &Catalog,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InteractionError> {
        let kind = self.selected_kind;
        let definition = catalog
            .crop(kind)
            .map_err(|_| InteractionError::MissingDefinition(kind))?;
        let id = self.next_crop_id;
        let crop = Crop::plant(id, definition, cell, grid)?;
        self.next_crop_id = CropId::new(id.get().saturating_add(1));

        info!(
            crop = id.get(),
            kind = kind.name(),
            column = cell.column(),
            row = cell.row(),
            "crop planted"
        );
        out_events.push(Event::CropPlanted {
            crop: id,
            kind,
            cell,
        });
        let _ = self.by_cell.insert(cell, id);
        let _ = self.crops.insert(id, crop);
        Ok(())
    }

    fn start_watering(
        &mut self,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InteractionError> {
        let crop = self.crop_at_mut(cell).ok_or(InteractionError::NoCrop)?;
        crop.water(out_events)?;
        debug!(crop = crop.id().get(), "crop watered");
        let _ = crop.advance_animation(Duration::ZERO, out_events);
        Ok(())
    }

    fn start_harvest(
        &mut self,
        cell: CellCoord,
        grid: &mut Grid,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InteractionError> {
        let crop = self.crop_at_mut(cell).ok_or(InteractionError::NoCrop)?;
        crop.begin_harvest(out_events)?;
        let id = crop.id();
        debug!(crop = id.get(), "harvest started");
        if crop.advance_animation(Duration::ZERO, out_events) == Some(ToolKind::Harvest) {
            self.complete_harvest(id, grid, out_events);
        }
        Ok(())
    }

    fn complete_harvest(&mut self, id: CropId, grid: &mut Grid, out_events: &mut Vec<Event>) {
        let Some(mut crop) = self.crops.remove(&id) else {
            return;
        };
        let _ = self.by_cell.remove(&crop.cell());
        let quantity = crop.finish_harvest(grid);
        let kind = crop.kind();
        let total = self.harvested.entry(kind).or_insert(0);
        *total = total.saturating_add(quantity);

        info!(
            crop = id.get(),
            kind = kind.name(),
            quantity,
            total = *total,
            "crop harvested"
        );
        out_events.push(Event::CropHarvested {
            crop: id,
            kind,
            cell: crop.cell(),
            quantity,
        });
    }

    fn crop_at_mut(&mut self, cell: CellCoord) -> Option<&mut Crop> {
        let id = self.by_cell.get(&cell)?;
        self.crops.get_mut(id)
    }
}
