use thiserror::Error;
use tracing::debug;

use crate::world::{Cell, TileMap, Vec2};

use super::crops::{CropCatalog, CropId};
use super::plots::{CropLedger, DayReport, FarmActionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Water,
    Shovel,
    Axe,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Water, ToolKind::Shovel, ToolKind::Axe];

    /// Next tool in the Water -> Shovel -> Axe cycle.
    pub fn next(self) -> Self {
        match self {
            ToolKind::Water => ToolKind::Shovel,
            ToolKind::Shovel => ToolKind::Axe,
            ToolKind::Axe => ToolKind::Water,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Water => "water",
            ToolKind::Shovel => "shovel",
            ToolKind::Axe => "axe",
        }
    }

    /// Farm action performed when the tool swing completes, if any.
    pub fn farm_action(self) -> Option<FarmAction> {
        match self {
            ToolKind::Water => Some(FarmAction::Water),
            ToolKind::Shovel => Some(FarmAction::Dig),
            ToolKind::Axe => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FarmAction {
    Dig,
    Water,
    Plant(CropId),
    Harvest,
    AdvanceDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FarmOutcome {
    Tilled(Cell),
    Watered(Cell),
    Planted { cell: Cell, crop: CropId },
    Harvested { cell: Cell, crop: CropId },
    DayAdvanced(DayReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ActionRejected {
    #[error("no farm plot within reach of ({}, {})", .point.x, .point.y)]
    OutOfReach { point: Vec2 },
    #[error("({}, {}) is not a bed", .cell.x, .cell.y)]
    NotOnBed { cell: Cell },
    #[error(transparent)]
    Farm(#[from] FarmActionError),
}

/// Applies `action` at the interaction `point`. Plot actions target the
/// first plot whose rectangle the `radius` circle around `point` touches;
/// day-advance needs `point` to lie on a bed cell.
pub fn apply_farm_action(
    map: &mut TileMap,
    action: FarmAction,
    point: Vec2,
    radius: f32,
    catalog: &CropCatalog,
    ledger: &mut dyn CropLedger,
) -> Result<FarmOutcome, ActionRejected> {
    let outcome = match action {
        FarmAction::AdvanceDay => {
            let cell = map.cell_at(point);
            if !map.is_bed(cell) {
                return Err(ActionRejected::NotOnBed { cell });
            }
            FarmOutcome::DayAdvanced(map.plots_mut().advance_day())
        }
        FarmAction::Dig => {
            let cell = plot_in_reach(map, point, radius)?;
            map.plots_mut().till(cell)?;
            FarmOutcome::Tilled(cell)
        }
        FarmAction::Water => {
            let cell = plot_in_reach(map, point, radius)?;
            map.plots_mut().water(cell)?;
            FarmOutcome::Watered(cell)
        }
        FarmAction::Plant(crop) => {
            let cell = plot_in_reach(map, point, radius)?;
            map.plots_mut().plant(cell, crop, catalog, ledger)?;
            FarmOutcome::Planted { cell, crop }
        }
        FarmAction::Harvest => {
            let cell = plot_in_reach(map, point, radius)?;
            let crop = map.plots_mut().harvest(cell, catalog, ledger)?;
            FarmOutcome::Harvested { cell, crop }
        }
    };
    debug!(?outcome, "farm_action_applied");
    Ok(outcome)
}

fn plot_in_reach(map: &TileMap, point: Vec2, radius: f32) -> Result<Cell, ActionRejected> {
    map.plots()
        .plot_near(point, radius, map.tile_size_f32())
        .ok_or(ActionRejected::OutOfReach { point })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::{CropDef, PlotState};
    use crate::world::MapDocument;
    use serde_json::json;
    use std::path::Path;

    const TILE: f32 = 48.0;

    struct Seeds(u32, u32);

    impl CropLedger for Seeds {
        fn seed_count(&self, _crop: CropId) -> u32 {
            self.0
        }

        fn take_seed(&mut self, _crop: CropId) -> bool {
            if self.0 == 0 {
                return false;
            }
            self.0 -= 1;
            true
        }

        fn credit_harvest(&mut self, _crop: CropId, quantity: u32) {
            self.1 += quantity;
        }
    }

    /// 3x1 map: farm plot at (0,0), bed at (2,0).
    fn map() -> TileMap {
        let raw = json!({
            "tilewidth": 16,
            "tileheight": 16,
            "width": 3,
            "height": 1,
            "layers": [
                { "name": "farm_tile", "data": [1, 0, 0], "properties": [{ "name": "z", "value": 0 }] },
                { "name": "bed", "data": [0, 0, 1], "properties": [{ "name": "z", "value": 0 }] },
            ],
        })
        .to_string();
        let document = MapDocument::parse(&raw, Path::new("inline")).expect("parse");
        TileMap::from_document(&document, 48).expect("map")
    }

    fn catalog() -> CropCatalog {
        CropCatalog::new(vec![CropDef {
            name: "wheat".to_string(),
            max_stage: 1,
        }])
    }

    #[test]
    fn tools_cycle_back_to_water() {
        assert_eq!(ToolKind::Water.next(), ToolKind::Shovel);
        assert_eq!(ToolKind::Shovel.next(), ToolKind::Axe);
        assert_eq!(ToolKind::Axe.next(), ToolKind::Water);
        assert_eq!(ToolKind::Axe.farm_action(), None);
    }

    #[test]
    fn full_season_through_actions() {
        let mut map = map();
        let catalog = catalog();
        let mut seeds = Seeds(1, 0);
        let plot_point = Vec2::new(TILE + 3.0, TILE * 0.5);
        let bed_point = Vec2::new(TILE * 2.5, TILE * 0.5);
        let wheat = CropId(0);

        let mut apply = |map: &mut TileMap, action, point| {
            apply_farm_action(map, action, point, 5.0, &catalog, &mut seeds)
        };

        assert_eq!(apply(&mut map, FarmAction::Dig, plot_point), Ok(FarmOutcome::Tilled(Cell::new(0, 0))));
        assert_eq!(
            apply(&mut map, FarmAction::Plant(wheat), plot_point),
            Ok(FarmOutcome::Planted {
                cell: Cell::new(0, 0),
                crop: wheat
            })
        );
        apply(&mut map, FarmAction::Water, plot_point).expect("water");
        let day = apply(&mut map, FarmAction::AdvanceDay, bed_point).expect("sleep");
        assert_eq!(day, FarmOutcome::DayAdvanced(DayReport { plots: 1, grown: 1 }));
        assert_eq!(
            apply(&mut map, FarmAction::Harvest, plot_point),
            Ok(FarmOutcome::Harvested {
                cell: Cell::new(0, 0),
                crop: wheat
            })
        );
        assert_eq!(map.plots().get(Cell::new(0, 0)).expect("plot").state, PlotState::Tilled);
        assert_eq!((seeds.0, seeds.1), (0, 1));
    }

    #[test]
    fn actions_out_of_reach_or_off_bed_are_rejected() {
        let mut map = map();
        let catalog = catalog();
        let mut seeds = Seeds(0, 0);
        let far = Vec2::new(TILE * 2.5, TILE * 0.5);

        assert_eq!(
            apply_farm_action(&mut map, FarmAction::Dig, far, 5.0, &catalog, &mut seeds),
            Err(ActionRejected::OutOfReach { point: far })
        );
        assert_eq!(
            apply_farm_action(
                &mut map,
                FarmAction::AdvanceDay,
                Vec2::new(10.0, 10.0),
                5.0,
                &catalog,
                &mut seeds
            ),
            Err(ActionRejected::NotOnBed {
                cell: Cell::new(0, 0)
            })
        );
    }

    #[test]
    fn rejected_transition_surfaces_farm_error() {
        let mut map = map();
        let catalog = catalog();
        let mut seeds = Seeds(0, 0);
        let point = Vec2::new(10.0, 10.0);
        apply_farm_action(&mut map, FarmAction::Dig, point, 5.0, &catalog, &mut seeds).expect("dig");
        let err = apply_farm_action(&mut map, FarmAction::Plant(CropId(0)), point, 5.0, &catalog, &mut seeds)
            .expect_err("no seeds");
        assert_eq!(err, ActionRejected::Farm(FarmActionError::NoSeed { crop: CropId(0) }));
    }
}
