use std::collections::HashMap;

use thiserror::Error;

use crate::world::{neighbourhood, Cell, CellLookup, Vec2};

use super::crops::{CropCatalog, CropId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlotState {
    #[default]
    Empty,
    Tilled,
    Planted(CropId),
}

/// One farmable cell. `age` only means something while `Planted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmPlot {
    pub cell: Cell,
    pub state: PlotState,
    pub moist: bool,
    pub age: u32,
}

impl FarmPlot {
    pub fn new(cell: Cell) -> Self {
        Self {
            cell,
            state: PlotState::Empty,
            moist: false,
            age: 0,
        }
    }

    pub fn crop(&self) -> Option<CropId> {
        match self.state {
            PlotState::Planted(crop) => Some(crop),
            PlotState::Empty | PlotState::Tilled => None,
        }
    }

    pub fn is_harvestable(&self, catalog: &CropCatalog) -> bool {
        match self.state {
            PlotState::Planted(crop) => catalog
                .max_stage(crop)
                .is_some_and(|max_stage| self.age >= max_stage),
            PlotState::Empty | PlotState::Tilled => false,
        }
    }
}

/// Inventory-side collaborator for seed debits and harvest credits.
pub trait CropLedger {
    fn seed_count(&self, crop: CropId) -> u32;
    /// Removes one seed; returns `false` (and changes nothing) when none are left.
    fn take_seed(&mut self, crop: CropId) -> bool;
    fn credit_harvest(&mut self, crop: CropId, quantity: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FarmActionError {
    #[error("no farm plot at ({}, {})", .cell.x, .cell.y)]
    NoPlot { cell: Cell },
    #[error("plot ({}, {}) is {state:?}; digging needs an empty plot", .cell.x, .cell.y)]
    NotEmpty { cell: Cell, state: PlotState },
    #[error("plot ({}, {}) is {state:?}; planting needs tilled soil", .cell.x, .cell.y)]
    NotTilled { cell: Cell, state: PlotState },
    #[error("no {crop:?} seeds left")]
    NoSeed { crop: CropId },
    #[error("crop {crop:?} is not in the catalog")]
    UnknownCrop { crop: CropId },
    #[error("plot ({}, {}) has nothing planted", .cell.x, .cell.y)]
    NotPlanted { cell: Cell },
    #[error("plot ({}, {}) is at age {age}, harvest needs {needed}", .cell.x, .cell.y)]
    NotReady { cell: Cell, age: u32, needed: u32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayReport {
    pub plots: usize,
    pub grown: usize,
}

/// Arena of farm plots addressed by cell; plots are re-stated in place and
/// never removed.
#[derive(Debug, Clone, Default)]
pub struct FarmPlots {
    plots: Vec<FarmPlot>,
    index: HashMap<Cell, usize>,
}

impl CellLookup for FarmPlots {
    fn has_cell(&self, cell: Cell) -> bool {
        self.index.contains_key(&cell)
    }
}

impl FarmPlots {
    /// Registers an empty plot at `cell`; an existing plot there is kept as-is.
    pub fn insert_empty(&mut self, cell: Cell) {
        if self.index.contains_key(&cell) {
            return;
        }
        self.index.insert(cell, self.plots.len());
        self.plots.push(FarmPlot::new(cell));
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    pub fn get(&self, cell: Cell) -> Option<&FarmPlot> {
        self.index.get(&cell).map(|&slot| &self.plots[slot])
    }

    fn get_mut(&mut self, cell: Cell) -> Result<&mut FarmPlot, FarmActionError> {
        match self.index.get(&cell) {
            Some(&slot) => Ok(&mut self.plots[slot]),
            None => Err(FarmActionError::NoPlot { cell }),
        }
    }

    /// Plots in load order.
    pub fn iter(&self) -> impl Iterator<Item = &FarmPlot> {
        self.plots.iter()
    }

    /// First plot in the 3x3 neighbourhood of `point` whose rectangle is
    /// touched by a circle of `radius` around it.
    pub fn plot_near(&self, point: Vec2, radius: f32, tile_size: f32) -> Option<Cell> {
        neighbourhood(self, point, tile_size)
            .into_iter()
            .find(|rect| rect.intersects_circle(point, radius))
            .map(|rect| Cell::containing(rect.center(), tile_size))
    }

    pub fn till(&mut self, cell: Cell) -> Result<(), FarmActionError> {
        let plot = self.get_mut(cell)?;
        if plot.state != PlotState::Empty {
            return Err(FarmActionError::NotEmpty {
                cell,
                state: plot.state,
            });
        }
        plot.state = PlotState::Tilled;
        Ok(())
    }

    pub fn plant(
        &mut self,
        cell: Cell,
        crop: CropId,
        catalog: &CropCatalog,
        ledger: &mut dyn CropLedger,
    ) -> Result<(), FarmActionError> {
        if catalog.get(crop).is_none() {
            return Err(FarmActionError::UnknownCrop { crop });
        }
        let plot = self.get_mut(cell)?;
        if plot.state != PlotState::Tilled {
            return Err(FarmActionError::NotTilled {
                cell,
                state: plot.state,
            });
        }
        if !ledger.take_seed(crop) {
            return Err(FarmActionError::NoSeed { crop });
        }
        plot.state = PlotState::Planted(crop);
        plot.age = 0;
        Ok(())
    }

    pub fn water(&mut self, cell: Cell) -> Result<(), FarmActionError> {
        self.get_mut(cell)?.moist = true;
        Ok(())
    }

    /// Collects a ripe crop: one unit to the ledger, plot back to tilled soil.
    pub fn harvest(
        &mut self,
        cell: Cell,
        catalog: &CropCatalog,
        ledger: &mut dyn CropLedger,
    ) -> Result<CropId, FarmActionError> {
        let plot = self.get_mut(cell)?;
        let PlotState::Planted(crop) = plot.state else {
            return Err(FarmActionError::NotPlanted { cell });
        };
        let needed = catalog
            .max_stage(crop)
            .ok_or(FarmActionError::UnknownCrop { crop })?;
        if plot.age < needed {
            return Err(FarmActionError::NotReady {
                cell,
                age: plot.age,
                needed,
            });
        }
        plot.state = PlotState::Tilled;
        plot.age = 0;
        ledger.credit_harvest(crop, 1);
        Ok(crop)
    }

    /// Overnight growth: moist plots age by one, then every plot dries out.
    pub fn advance_day(&mut self) -> DayReport {
        let mut grown = 0;
        for plot in &mut self.plots {
            if plot.moist {
                plot.age += 1;
                grown += 1;
            }
            plot.moist = false;
        }
        DayReport {
            plots: self.plots.len(),
            grown,
        }
    }
}
