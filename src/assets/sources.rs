use std::sync::Arc;

use crate::{assets::raster::SourceRaster, projection::face::CubeFace};

/// Shared handle to a source raster.
pub type SharedRaster = Arc<dyn SourceRaster>;

fn describe(slot: &Option<SharedRaster>) -> Option<(u32, u32)> {
    slot.as_ref().map(|r| (r.width(), r.height()))
}

/// The six cube-face slots; any of them may be empty.
#[derive(Clone, Default)]
pub struct CubeFaces {
    slots: [Option<SharedRaster>; 6],
}

impl CubeFaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`CubeFaces::insert`].
    pub fn with(mut self, face: CubeFace, raster: impl SourceRaster + 'static) -> Self {
        self.insert(face, Arc::new(raster));
        self
    }

    /// Bind `raster` to `face`, returning the previous binding.
    pub fn insert(&mut self, face: CubeFace, raster: SharedRaster) -> Option<SharedRaster> {
        self.slots[face.index()].replace(raster)
    }

    pub fn remove(&mut self, face: CubeFace) -> Option<SharedRaster> {
        self.slots[face.index()].take()
    }

    pub fn get(&self, face: CubeFace) -> Option<&dyn SourceRaster> {
        self.slots[face.index()].as_deref()
    }

    pub fn contains(&self, face: CubeFace) -> bool {
        self.slots[face.index()].is_some()
    }

    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Faces in `wanted` with no raster bound.
    pub fn missing(&self, wanted: &[CubeFace]) -> Vec<CubeFace> {
        wanted
            .iter()
            .copied()
            .filter(|f| !self.contains(*f))
            .collect()
    }

    pub(crate) fn iter_present(&self) -> impl Iterator<Item = (CubeFace, &dyn SourceRaster)> {
        CubeFace::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|r| (f, r)))
    }
}

impl std::fmt::Debug for CubeFaces {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("CubeFaces");
        for face in CubeFace::ALL {
            s.field(face.name(), &describe(&self.slots[face.index()]));
        }
        s.finish()
    }
}

/// Ordered image slots evenly spaced around 360 degrees of yaw.
///
/// Slot `i` covers yaw `[i, i + 1) * 360 / len()`. Empty slots keep their share of the ring.
#[derive(Clone, Default)]
pub struct RingImages {
    slots: Vec<Option<SharedRaster>>,
}

impl RingImages {
    /// Ring with every slot filled.
    pub fn new(images: Vec<SharedRaster>) -> Self {
        Self {
            slots: images.into_iter().map(Some).collect(),
        }
    }

    /// Ring with explicit, possibly empty, slots.
    pub fn with_slots(slots: Vec<Option<SharedRaster>>) -> Self {
        Self { slots }
    }

    /// Builder-style append of a filled slot.
    pub fn with(mut self, raster: impl SourceRaster + 'static) -> Self {
        self.slots.push(Some(Arc::new(raster)));
        self
    }

    pub fn push(&mut self, raster: Option<SharedRaster>) {
        self.slots.push(raster);
    }

    /// Number of slots the ring is divided into, empty ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn SourceRaster> {
        self.slots.get(index).and_then(|s| s.as_deref())
    }

    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn missing_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_none().then_some(i))
            .collect()
    }

    pub(crate) fn iter_present(&self) -> impl Iterator<Item = (usize, &dyn SourceRaster)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_deref().map(|r| (i, r)))
    }
}

impl std::fmt::Debug for RingImages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.slots.iter().map(describe))
            .finish()
    }
}

/// Every source raster a run reads from.
#[derive(Clone, Debug)]
pub enum SourceSet {
    Cube(CubeFaces),
    Ring(RingImages),
}

impl SourceSet {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cube(_) => "cube",
            Self::Ring(_) => "ring",
        }
    }
}

impl From<CubeFaces> for SourceSet {
    fn from(faces: CubeFaces) -> Self {
        Self::Cube(faces)
    }
}

impl From<RingImages> for SourceSet {
    fn from(ring: RingImages) -> Self {
        Self::Ring(ring)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/sources.rs"]
mod tests;
