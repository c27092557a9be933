use std::collections::HashMap;

use crate::app::Texture;
use crate::strip::StripSheet;

use super::crops::{CropCatalog, CropId};

/// Textures used to draw tilled soil and crop growth stages.
#[derive(Debug, Clone, Default)]
pub struct FarmVisuals {
    soil: Option<Texture>,
    crops: HashMap<CropId, StripSheet>,
}

impl FarmVisuals {
    /// Keys crop strips by catalog id; strips for crops outside the catalog
    /// are dropped.
    pub fn new(
        soil: Option<Texture>,
        strips: HashMap<String, StripSheet>,
        catalog: &CropCatalog,
    ) -> Self {
        let crops = strips
            .into_iter()
            .filter_map(|(name, sheet)| catalog.id_of(&name).map(|id| (id, sheet)))
            .collect();
        Self { soil, crops }
    }

    pub fn soil(&self) -> Option<&Texture> {
        self.soil.as_ref()
    }

    pub fn crop_sheet(&self, crop: CropId) -> Option<&StripSheet> {
        self.crops.get(&crop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::CropDef;
    use image::RgbaImage;

    #[test]
    fn strips_are_keyed_by_catalog_id() {
        let catalog = CropCatalog::new(vec![
            CropDef {
                name: "wheat".to_string(),
                max_stage: 3,
            },
            CropDef {
                name: "carrot".to_string(),
                max_stage: 4,
            },
        ]);
        let sheet = StripSheet::new(Texture::from_image(RgbaImage::new(10, 2)), 5).expect("sheet");
        let strips = HashMap::from([
            ("carrot".to_string(), sheet.clone()),
            ("pumpkin".to_string(), sheet),
        ]);

        let visuals = FarmVisuals::new(None, strips, &catalog);
        assert!(visuals.crop_sheet(CropId(1)).is_some());
        assert!(visuals.crop_sheet(CropId(0)).is_none());
        assert!(visuals.soil().is_none());
    }
}
