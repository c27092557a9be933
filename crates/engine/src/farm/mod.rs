mod actions;
mod crops;
mod plots;
mod visuals;

pub use actions::{apply_farm_action, ActionRejected, FarmAction, FarmOutcome, ToolKind};
pub use crops::{growth_frame, CropCatalog, CropDef, CropId};
pub use plots::{CropLedger, DayReport, FarmActionError, FarmPlot, FarmPlots, PlotState};
pub use visuals::FarmVisuals;
