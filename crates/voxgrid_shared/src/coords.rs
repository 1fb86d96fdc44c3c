use glam::IVec3;

pub const CHUNK_SIZE: usize = 16;
pub const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Position of a chunk in chunk space (one unit per `CHUNK_SIZE` blocks).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Block position inside a chunk, every component in `0..CHUNK_SIZE`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl ChunkPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// World-space block coordinate of this chunk's (0, 0, 0) corner.
    pub fn world_origin(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z) * CHUNK_SIZE_I32
    }
}

impl LocalPos {
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Returns `None` when any component falls outside the chunk.
    pub fn from_ivec(pos: IVec3) -> Option<Self> {
        if in_chunk_bounds(pos.x) && in_chunk_bounds(pos.y) && in_chunk_bounds(pos.z) {
            Some(Self {
                x: pos.x as u8,
                y: pos.y as u8,
                z: pos.z as u8,
            })
        } else {
            None
        }
    }

    pub fn as_ivec(self) -> IVec3 {
        IVec3::new(i32::from(self.x), i32::from(self.y), i32::from(self.z))
    }
}

pub fn in_chunk_bounds(value: i32) -> bool {
    (0..CHUNK_SIZE_I32).contains(&value)
}

fn div_rem_floor(value: i32, divisor: i32) -> (i32, i32) {
    let mut q = value / divisor;
    let mut r = value % divisor;
    if r < 0 {
        q -= 1;
        r += divisor;
    }
    (q, r)
}

pub fn world_to_chunk(world_pos: IVec3) -> (ChunkPos, LocalPos) {
    let (chunk_x, local_x) = div_rem_floor(world_pos.x, CHUNK_SIZE_I32);
    let (chunk_y, local_y) = div_rem_floor(world_pos.y, CHUNK_SIZE_I32);
    let (chunk_z, local_z) = div_rem_floor(world_pos.z, CHUNK_SIZE_I32);

    (
        ChunkPos::new(chunk_x, chunk_y, chunk_z),
        LocalPos::new(local_x as u8, local_y as u8, local_z as u8),
    )
}

pub fn chunk_to_world(chunk_pos: ChunkPos, local: LocalPos) -> IVec3 {
    chunk_pos.world_origin() + local.as_ivec()
}

pub fn local_to_index(local: LocalPos) -> usize {
    usize::from(local.x)
        + usize::from(local.z) * CHUNK_SIZE
        + usize::from(local.y) * CHUNK_SIZE * CHUNK_SIZE
}

pub fn index_to_local(index: usize) -> LocalPos {
    assert!(index < CHUNK_VOLUME, "chunk index out of bounds: {index}");

    let y = index / (CHUNK_SIZE * CHUNK_SIZE);
    let rem = index % (CHUNK_SIZE * CHUNK_SIZE);
    let z = rem / CHUNK_SIZE;
    let x = rem % CHUNK_SIZE;

    LocalPos::new(x as u8, y as u8, z as u8)
}
