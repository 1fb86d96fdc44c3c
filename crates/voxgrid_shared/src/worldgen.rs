//! Small height-field terrain used to populate the demo world and benchmarks.

use noise::{NoiseFn, Perlin};

use crate::chunk::ChunkData;
use crate::coords::{chunk_to_world, ChunkPos, LocalPos, CHUNK_SIZE};
use crate::voxel::VoxelId;

pub const SEA_LEVEL: i32 = 6;
const HEIGHT_OFFSET: f64 = 8.0;
const HEIGHT_AMPLITUDE: f64 = 7.0;
const DIRT_DEPTH: i32 = 3;

#[derive(Debug, Clone)]
pub struct WorldGenerator {
    seed: u64,
    terrain: Perlin,
}

impl WorldGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            terrain: Perlin::new(seed as u32),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Surface height (the y of the topmost solid voxel) at a world column.
    pub fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        let wx = f64::from(world_x);
        let wz = f64::from(world_z);
        let coarse = self.terrain.get([wx * 0.03, wz * 0.03]);
        let detail = self.terrain.get([wx * 0.11 + 101.3, wz * 0.11 - 73.7]) * 0.3;
        (HEIGHT_OFFSET + (coarse + detail) * HEIGHT_AMPLITUDE).floor() as i32
    }

    pub fn generate_chunk(&self, pos: ChunkPos) -> ChunkData {
        let mut chunk = ChunkData::new_empty(pos);

        for z in 0..CHUNK_SIZE as u8 {
            for x in 0..CHUNK_SIZE as u8 {
                let column = chunk_to_world(pos, LocalPos::new(x, 0, z));
                let surface = self.surface_height(column.x, column.z);

                for y in 0..CHUNK_SIZE as u8 {
                    let local = LocalPos::new(x, y, z);
                    let world_y = column.y + i32::from(y);
                    let voxel = column_voxel(world_y, surface);
                    if !voxel.is_air() {
                        chunk.set(local, voxel);
                    }
                }
            }
        }

        chunk
    }
}

fn column_voxel(world_y: i32, surface: i32) -> VoxelId {
    if world_y > surface {
        if world_y <= SEA_LEVEL {
            VoxelId::WATER
        } else {
            VoxelId::AIR
        }
    } else if world_y == surface {
        if surface < SEA_LEVEL {
            VoxelId::SAND
        } else {
            VoxelId::GRASS
        }
    } else if world_y > surface - DIRT_DEPTH {
        VoxelId::DIRT
    } else {
        VoxelId::STONE
    }
}

pub fn generate_chunk(seed: u64, pos: ChunkPos) -> ChunkData {
    WorldGenerator::new(seed).generate_chunk(pos)
}
