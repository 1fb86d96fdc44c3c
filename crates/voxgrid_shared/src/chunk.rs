use glam::IVec3;

use crate::coords::{local_to_index, ChunkPos, LocalPos, CHUNK_SIZE, CHUNK_VOLUME};
use crate::voxel::VoxelId;

/// Dense `CHUNK_SIZE`^3 grid of voxel ids placed at a chunk-space position.
///
/// Cloning gives an independent snapshot, which is what background meshing
/// works on while the live chunk keeps receiving edits.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkData {
    pub position: ChunkPos,
    pub blocks: Box<[VoxelId; CHUNK_VOLUME]>,
}

impl ChunkData {
    pub fn new_empty(position: ChunkPos) -> Self {
        Self::new_filled(position, VoxelId::AIR)
    }

    pub fn new_filled(position: ChunkPos, voxel: VoxelId) -> Self {
        Self {
            position,
            blocks: Box::new([voxel; CHUNK_VOLUME]),
        }
    }

    pub fn size(&self) -> usize {
        CHUNK_SIZE
    }

    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// Fast lookup for coordinates already known to be inside the chunk.
    ///
    /// Neighbor sampling must go through [`ChunkData::get_checked`] instead.
    ///
    /// # Panics
    ///
    /// Panics if any component of `local` is outside `0..CHUNK_SIZE`.
    #[inline]
    pub fn get(&self, local: LocalPos) -> VoxelId {
        self.blocks[in_bounds_index(local)]
    }

    /// Lookup that treats everything outside the chunk as air. Adjacent
    /// chunks are never consulted, so boundary faces always render.
    #[inline]
    pub fn get_checked(&self, pos: IVec3) -> VoxelId {
        match LocalPos::from_ivec(pos) {
            Some(local) => self.blocks[local_to_index(local)],
            None => VoxelId::AIR,
        }
    }

    /// # Panics
    ///
    /// Panics if any component of `local` is outside `0..CHUNK_SIZE`.
    pub fn set(&mut self, local: LocalPos, voxel: VoxelId) {
        self.blocks[in_bounds_index(local)] = voxel;
    }

    pub fn get_index(&self, index: usize) -> VoxelId {
        self.blocks[index]
    }

    pub fn set_index(&mut self, index: usize, voxel: VoxelId) {
        self.blocks[index] = voxel;
    }

    pub fn fill(&mut self, voxel: VoxelId) {
        self.blocks.fill(voxel);
    }

    pub fn non_empty_count(&self) -> usize {
        self.blocks.iter().filter(|id| !id.is_air()).count()
    }
}

// An out-of-range x or z would otherwise alias a different cell.
#[inline]
fn in_bounds_index(local: LocalPos) -> usize {
    assert!(
        usize::from(local.x) < CHUNK_SIZE
            && usize::from(local.y) < CHUNK_SIZE
            && usize::from(local.z) < CHUNK_SIZE,
        "local position out of chunk bounds: {local:?}"
    );
    local_to_index(local)
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::ChunkData;
    use crate::coords::{local_to_index, ChunkPos, LocalPos, CHUNK_SIZE, CHUNK_VOLUME};
    use crate::voxel::VoxelId;

    #[test]
    fn chunk_creation_and_get_set_work() {
        let mut chunk = ChunkData::new_empty(ChunkPos::new(1, 2, 3));
        let pos = LocalPos::new(3, 7, 11);
        assert_eq!(chunk.get(pos), VoxelId::AIR);
        assert_eq!(chunk.position(), ChunkPos::new(1, 2, 3));
        assert_eq!(chunk.size(), CHUNK_SIZE);

        chunk.set(pos, VoxelId(2));
        assert_eq!(chunk.get(pos), VoxelId(2));
        assert_eq!(chunk.get_index(local_to_index(pos)), VoxelId(2));

        chunk.set_index(0, VoxelId(10));
        assert_eq!(chunk.get_index(0), VoxelId(10));
        assert_eq!(chunk.non_empty_count(), 2);
    }

    #[test]
    fn checked_lookup_returns_air_outside_every_axis() {
        let chunk = ChunkData::new_filled(ChunkPos::default(), VoxelId::STONE);
        let edge = CHUNK_SIZE as i32;

        assert_eq!(chunk.get_checked(IVec3::new(0, 0, 0)), VoxelId::STONE);
        assert_eq!(chunk.get_checked(IVec3::new(edge - 1, edge - 1, edge - 1)), VoxelId::STONE);
        for outside in [
            IVec3::new(-1, 0, 0),
            IVec3::new(edge, 0, 0),
            IVec3::new(0, -1, 0),
            IVec3::new(0, edge, 0),
            IVec3::new(0, 0, -1),
            IVec3::new(0, 0, edge),
            IVec3::new(-1, edge, -1),
        ] {
            assert_eq!(chunk.get_checked(outside), VoxelId::AIR, "at {outside}");
        }
    }

    #[test]
    fn clone_is_an_independent_snapshot() {
        let mut chunk = ChunkData::new_empty(ChunkPos::default());
        let snapshot = chunk.clone();
        chunk.fill(VoxelId::DIRT);

        assert_eq!(snapshot.non_empty_count(), 0);
        assert_eq!(chunk.non_empty_count(), CHUNK_VOLUME);
    }

    #[test]
    #[should_panic(expected = "out of chunk bounds")]
    fn fast_get_past_the_x_edge_panics_instead_of_aliasing() {
        let mut chunk = ChunkData::new_empty(ChunkPos::default());
        // (16, 0, 0) would fold onto (0, 0, 1) without the bounds check.
        chunk.set(LocalPos::new(0, 0, 1), VoxelId::STONE);
        let _ = chunk.get(LocalPos::new(CHUNK_SIZE as u8, 0, 0));
    }

    #[test]
    #[should_panic(expected = "out of chunk bounds")]
    fn fast_set_past_the_x_edge_panics_instead_of_aliasing() {
        let mut chunk = ChunkData::new_empty(ChunkPos::default());
        chunk.set(LocalPos::new(20, 0, 0), VoxelId::DIRT);
    }

    #[test]
    #[should_panic(expected = "out of chunk bounds")]
    fn fast_set_past_the_z_edge_panics() {
        let mut chunk = ChunkData::new_empty(ChunkPos::default());
        chunk.set(LocalPos::new(0, 0, CHUNK_SIZE as u8), VoxelId::DIRT);
    }
}
