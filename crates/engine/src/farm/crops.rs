use serde::Deserialize;

/// Index into a `CropCatalog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CropId(pub u16);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CropDef {
    pub name: String,
    /// Growth age at which the crop becomes harvestable.
    pub max_stage: u32,
}

/// Crops known to the simulation, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CropCatalog {
    crops: Vec<CropDef>,
}

impl CropCatalog {
    pub fn new(crops: Vec<CropDef>) -> Self {
        Self { crops }
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    pub fn get(&self, id: CropId) -> Option<&CropDef> {
        self.crops.get(id.0 as usize)
    }

    pub fn id_of(&self, name: &str) -> Option<CropId> {
        self.crops
            .iter()
            .position(|crop| crop.name == name)
            .map(|index| CropId(index as u16))
    }

    pub fn name(&self, id: CropId) -> Option<&str> {
        self.get(id).map(|crop| crop.name.as_str())
    }

    pub fn max_stage(&self, id: CropId) -> Option<u32> {
        self.get(id).map(|crop| crop.max_stage)
    }

    pub fn ids(&self) -> impl Iterator<Item = CropId> + '_ {
        (0..self.crops.len()).map(|index| CropId(index as u16))
    }
}

/// Visual growth frame for a plot of `age`, clamped to the frames the crop's
/// strip actually has.
pub fn growth_frame(age: u32, frames_available: usize) -> usize {
    if frames_available == 0 {
        return 0;
    }
    (age as usize).min(frames_available - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CropCatalog {
        CropCatalog::new(vec![
            CropDef {
                name: "wheat".to_string(),
                max_stage: 3,
            },
            CropDef {
                name: "carrot".to_string(),
                max_stage: 4,
            },
        ])
    }

    #[test]
    fn lookup_by_name_and_id() {
        let catalog = catalog();
        let carrot = catalog.id_of("carrot").expect("carrot");
        assert_eq!(carrot, CropId(1));
        assert_eq!(catalog.max_stage(carrot), Some(4));
        assert_eq!(catalog.name(CropId(0)), Some("wheat"));
        assert_eq!(catalog.id_of("pumpkin"), None);
        assert_eq!(catalog.get(CropId(7)), None);
    }

    #[test]
    fn growth_frame_clamps_over_age() {
        assert_eq!(growth_frame(0, 5), 0);
        assert_eq!(growth_frame(3, 5), 3);
        assert_eq!(growth_frame(9, 5), 4);
        assert_eq!(growth_frame(2, 0), 0);
    }
}
