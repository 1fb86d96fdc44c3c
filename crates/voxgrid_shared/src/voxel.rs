use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chunk::ChunkData;

#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
pub struct VoxelId(pub u16);

impl VoxelId {
    pub const AIR: Self = Self(0);
    pub const STONE: Self = Self(1);
    pub const DIRT: Self = Self(2);
    pub const GRASS: Self = Self(3);
    pub const WATER: Self = Self(4);
    pub const SAND: Self = Self(5);
    pub const LOG: Self = Self(6);
    pub const LEAVES: Self = Self(7);
    pub const LAVA: Self = Self(8);

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoxelKind {
    Empty,
    Solid,
    Fluid,
}

/// Which of a voxel's three atlas entries a face uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Side,
    Top,
    Bottom,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoxelProperties {
    pub name: String,
    pub kind: VoxelKind,
    pub side_texture: u16,
    pub top_texture: u16,
    pub bottom_texture: u16,
}

impl VoxelProperties {
    pub fn new(name: &str, kind: VoxelKind, texture: u16) -> Self {
        Self::with_textures(name, kind, texture, texture, texture)
    }

    pub fn with_textures(name: &str, kind: VoxelKind, side: u16, top: u16, bottom: u16) -> Self {
        Self {
            name: name.to_string(),
            kind,
            side_texture: side,
            top_texture: top,
            bottom_texture: bottom,
        }
    }

    pub fn texture(&self, slot: TextureSlot) -> u16 {
        match slot {
            TextureSlot::Side => self.side_texture,
            TextureSlot::Top => self.top_texture,
            TextureSlot::Bottom => self.bottom_texture,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.kind == VoxelKind::Solid
    }

    /// Air-like and fluid voxels let the faces of their neighbors show through.
    pub fn is_see_through(&self) -> bool {
        matches!(self.kind, VoxelKind::Empty | VoxelKind::Fluid)
    }
}

#[derive(Debug)]
pub enum VoxelTableError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        source: toml::de::Error,
    },
    DuplicateId {
        id: VoxelId,
    },
    DuplicateName {
        name: String,
    },
    MissingAir,
    AirNotEmpty {
        kind: VoxelKind,
    },
    TextureOutOfRange {
        name: String,
        texture: u16,
        capacity: u32,
    },
    UnknownVoxel {
        id: VoxelId,
        index: usize,
    },
}

impl fmt::Display for VoxelTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read voxel table {}: {source}", path.display())
            }
            Self::Parse { source } => write!(f, "failed to parse voxel table: {source}"),
            Self::DuplicateId { id } => write!(f, "voxel id {} is defined twice", id.0),
            Self::DuplicateName { name } => write!(f, "voxel name '{name}' is defined twice"),
            Self::MissingAir => write!(f, "voxel id 0 (air) is not defined"),
            Self::AirNotEmpty { kind } => {
                write!(f, "voxel id 0 must be of kind empty, found {kind:?}")
            }
            Self::TextureOutOfRange {
                name,
                texture,
                capacity,
            } => write!(
                f,
                "voxel '{name}' uses texture {texture} but the atlas holds {capacity} tiles"
            ),
            Self::UnknownVoxel { id, index } => write!(
                f,
                "chunk cell {index} holds voxel id {} which the table does not define",
                id.0
            ),
        }
    }
}

impl std::error::Error for VoxelTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VoxelTableFile {
    #[serde(default)]
    voxel: Vec<VoxelEntry>,
}

#[derive(Debug, Deserialize)]
struct VoxelEntry {
    id: u16,
    name: String,
    kind: VoxelKind,
    side: u16,
    top: Option<u16>,
    bottom: Option<u16>,
}

/// Static per-voxel properties, indexed by id. Built once at load time and
/// shared read-only (usually behind an `Arc`) by every meshing call.
#[derive(Default, Debug, Clone)]
pub struct VoxelTable {
    properties: Vec<Option<VoxelProperties>>,
    by_name: FxHashMap<String, VoxelId>,
}

impl VoxelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `props` at the next free id, or returns the id already bound to its name.
    pub fn register(&mut self, props: VoxelProperties) -> VoxelId {
        if let Some(existing) = self.by_name.get(props.name.as_str()) {
            return *existing;
        }

        let id = VoxelId(
            u16::try_from(self.properties.len())
                .expect("voxel table exceeded VoxelId capacity (u16::MAX)"),
        );
        self.by_name.insert(props.name.clone(), id);
        self.properties.push(Some(props));
        id
    }

    /// Binds `props` to an explicit id, as content files do.
    pub fn insert(&mut self, id: VoxelId, props: VoxelProperties) -> Result<(), VoxelTableError> {
        let idx = usize::from(id.0);
        if self.properties.get(idx).is_some_and(Option::is_some) {
            return Err(VoxelTableError::DuplicateId { id });
        }
        if self.by_name.contains_key(props.name.as_str()) {
            return Err(VoxelTableError::DuplicateName { name: props.name });
        }

        if self.properties.len() <= idx {
            self.properties.resize(idx + 1, None);
        }
        self.by_name.insert(props.name.clone(), id);
        self.properties[idx] = Some(props);
        Ok(())
    }

    /// Looks up a voxel that is known to be defined.
    ///
    /// # Panics
    ///
    /// Panics when `id` is not in the table. Chunks are checked with
    /// [`VoxelTable::validate_chunk`] when they are loaded, so reaching this
    /// panic means the chunk and the content are out of sync.
    pub fn get(&self, id: VoxelId) -> &VoxelProperties {
        match self.try_get(id) {
            Some(props) => props,
            None => panic!("voxel id {} is not defined in the voxel table", id.0),
        }
    }

    pub fn try_get(&self, id: VoxelId) -> Option<&VoxelProperties> {
        self.properties
            .get(usize::from(id.0))
            .and_then(Option::as_ref)
    }

    pub fn get_by_name(&self, name: &str) -> Option<VoxelId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, id: VoxelId) -> bool {
        self.try_get(id).is_some()
    }

    pub fn is_solid(&self, id: VoxelId) -> bool {
        self.get(id).is_solid()
    }

    pub fn is_see_through(&self, id: VoxelId) -> bool {
        self.get(id).is_see_through()
    }

    /// Number of defined voxels.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VoxelId, &VoxelProperties)> {
        self.properties
            .iter()
            .enumerate()
            .filter_map(|(idx, props)| props.as_ref().map(|props| (VoxelId(idx as u16), props)))
    }

    pub fn from_toml_str(source: &str) -> Result<Self, VoxelTableError> {
        let file: VoxelTableFile =
            toml::from_str(source).map_err(|source| VoxelTableError::Parse { source })?;

        let mut table = Self::new();
        for entry in file.voxel {
            let props = VoxelProperties::with_textures(
                &entry.name,
                entry.kind,
                entry.side,
                entry.top.unwrap_or(entry.side),
                entry.bottom.unwrap_or(entry.side),
            );
            table.insert(VoxelId(entry.id), props)?;
        }
        table.validate_air()?;
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, VoxelTableError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| VoxelTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_toml_str(&source)?;
        info!("Loaded {} voxel definitions from {}", table.len(), path.display());
        Ok(table)
    }

    fn validate_air(&self) -> Result<(), VoxelTableError> {
        match self.try_get(VoxelId::AIR) {
            None => Err(VoxelTableError::MissingAir),
            Some(air) if air.kind != VoxelKind::Empty => {
                Err(VoxelTableError::AirNotEmpty { kind: air.kind })
            }
            Some(_) => Ok(()),
        }
    }

    /// Checks that every texture index fits in an atlas of `capacity` tiles.
    pub fn validate_textures(&self, capacity: u32) -> Result<(), VoxelTableError> {
        for (_, props) in self.iter() {
            for slot in [TextureSlot::Side, TextureSlot::Top, TextureSlot::Bottom] {
                let texture = props.texture(slot);
                if u32::from(texture) >= capacity {
                    return Err(VoxelTableError::TextureOutOfRange {
                        name: props.name.clone(),
                        texture,
                        capacity,
                    });
                }
            }
        }
        Ok(())
    }

    /// Load-time check that meshing `chunk` will never hit an undefined id.
    pub fn validate_chunk(&self, chunk: &ChunkData) -> Result<(), VoxelTableError> {
        match chunk
            .blocks
            .iter()
            .position(|&id| !self.contains(id))
        {
            Some(index) => Err(VoxelTableError::UnknownVoxel {
                id: chunk.get_index(index),
                index,
            }),
            None => Ok(()),
        }
    }
}

pub fn register_default_voxels() -> VoxelTable {
    use VoxelKind::{Empty, Fluid, Solid};

    let mut table = VoxelTable::new();

    let defaults = [
        VoxelProperties::new("air", Empty, 0),
        VoxelProperties::new("stone", Solid, 1),
        VoxelProperties::new("dirt", Solid, 2),
        VoxelProperties::with_textures("grass", Solid, 3, 4, 2),
        VoxelProperties::new("water", Fluid, 5),
        VoxelProperties::new("sand", Solid, 6),
        VoxelProperties::with_textures("log", Solid, 7, 8, 8),
        VoxelProperties::new("leaves", Solid, 9),
        VoxelProperties::new("lava", Fluid, 10),
    ];

    for (idx, props) in defaults.into_iter().enumerate() {
        let id = table.register(props);
        debug_assert_eq!(usize::from(id.0), idx, "default voxel IDs must be stable");
    }

    table
}

#[cfg(test)]
mod tests {
    use super::{
        register_default_voxels, TextureSlot, VoxelId, VoxelKind, VoxelProperties, VoxelTable,
        VoxelTableError,
    };
    use crate::chunk::ChunkData;
    use crate::coords::{ChunkPos, LocalPos};

    #[test]
    fn default_table_matches_named_constants() {
        let table = register_default_voxels();

        assert_eq!(table.get_by_name("air"), Some(VoxelId::AIR));
        assert_eq!(table.get_by_name("stone"), Some(VoxelId::STONE));
        assert_eq!(table.get_by_name("grass"), Some(VoxelId::GRASS));
        assert_eq!(table.get_by_name("water"), Some(VoxelId::WATER));
        assert_eq!(table.get_by_name("lava"), Some(VoxelId::LAVA));
        assert_eq!(table.len(), 9);

        assert_eq!(table.get(VoxelId::AIR).kind, VoxelKind::Empty);
        assert_eq!(table.get(VoxelId::WATER).kind, VoxelKind::Fluid);
        assert!(table.is_solid(VoxelId::LEAVES));
        assert!(table.is_see_through(VoxelId::WATER));
        assert!(table.is_see_through(VoxelId::AIR));
        assert!(!table.is_see_through(VoxelId::STONE));
    }

    #[test]
    fn texture_slots_select_side_top_and_bottom() {
        let table = register_default_voxels();
        let grass = table.get(VoxelId::GRASS);

        assert_eq!(grass.texture(TextureSlot::Side), 3);
        assert_eq!(grass.texture(TextureSlot::Top), 4);
        assert_eq!(grass.texture(TextureSlot::Bottom), 2);
    }

    #[test]
    fn register_returns_existing_id_for_duplicate_name() {
        let mut table = VoxelTable::new();
        let air = table.register(VoxelProperties::new("air", VoxelKind::Empty, 0));
        let again = table.register(VoxelProperties::new("air", VoxelKind::Solid, 9));

        assert_eq!(air, again);
        assert_eq!(table.get(air).kind, VoxelKind::Empty);
    }

    #[test]
    #[should_panic(expected = "voxel id 42 is not defined")]
    fn get_panics_on_unknown_id() {
        let table = register_default_voxels();
        let _ = table.get(VoxelId(42));
    }

    #[test]
    fn toml_table_defaults_top_and_bottom_to_side() {
        let table = VoxelTable::from_toml_str(
            r#"
            [[voxel]]
            id = 0
            name = "air"
            kind = "empty"
            side = 0

            [[voxel]]
            id = 7
            name = "brick"
            kind = "solid"
            side = 12
            top = 13
            "#,
        )
        .expect("valid table");

        let brick = table.get(VoxelId(7));
        assert_eq!(brick.name, "brick");
        assert_eq!(brick.texture(TextureSlot::Side), 12);
        assert_eq!(brick.texture(TextureSlot::Top), 13);
        assert_eq!(brick.texture(TextureSlot::Bottom), 12);
        assert_eq!(table.len(), 2);
        assert!(table.try_get(VoxelId(3)).is_none());
    }

    #[test]
    fn toml_table_rejects_duplicates_and_bad_air() {
        let duplicate = VoxelTable::from_toml_str(
            r#"
            [[voxel]]
            id = 0
            name = "air"
            kind = "empty"
            side = 0

            [[voxel]]
            id = 0
            name = "void"
            kind = "empty"
            side = 0
            "#,
        );
        assert!(matches!(
            duplicate,
            Err(VoxelTableError::DuplicateId { id: VoxelId(0) })
        ));

        let missing_air = VoxelTable::from_toml_str(
            r#"
            [[voxel]]
            id = 1
            name = "stone"
            kind = "solid"
            side = 1
            "#,
        );
        assert!(matches!(missing_air, Err(VoxelTableError::MissingAir)));

        let solid_air = VoxelTable::from_toml_str(
            r#"
            [[voxel]]
            id = 0
            name = "air"
            kind = "solid"
            side = 0
            "#,
        );
        assert!(matches!(
            solid_air,
            Err(VoxelTableError::AirNotEmpty {
                kind: VoxelKind::Solid
            })
        ));

        let garbage = VoxelTable::from_toml_str("voxel = 3");
        assert!(matches!(garbage, Err(VoxelTableError::Parse { .. })));
    }

    #[test]
    fn validate_textures_reports_indices_past_the_atlas() {
        let table = register_default_voxels();
        assert!(table.validate_textures(256).is_ok());

        let err = table.validate_textures(10).expect_err("lava uses tile 10");
        assert!(matches!(
            err,
            VoxelTableError::TextureOutOfRange { texture: 10, .. }
        ));
        assert!(err.to_string().contains("lava"));
    }

    #[test]
    fn validate_chunk_finds_the_first_unknown_voxel() {
        let table = register_default_voxels();
        let mut chunk = ChunkData::new_filled(ChunkPos::default(), VoxelId::STONE);
        assert!(table.validate_chunk(&chunk).is_ok());

        chunk.set(LocalPos::new(2, 0, 0), VoxelId(200));
        match table.validate_chunk(&chunk) {
            Err(VoxelTableError::UnknownVoxel { id, index }) => {
                assert_eq!(id, VoxelId(200));
                assert_eq!(index, 2);
            }
            other => panic!("expected unknown voxel error, got {other:?}"),
        }
    }
}
