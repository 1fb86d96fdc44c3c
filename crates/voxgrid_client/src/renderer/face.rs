use glam::IVec3;
use voxgrid_shared::voxel::TextureSlot;

/// Geometry for one side of a unit cube: four corners as 0/1 offsets
/// (x, y, z per corner) and the constant shade baked into that side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshFace {
    pub corners: [f32; 12],
    pub shade: f32,
}

impl MeshFace {
    pub fn corner(&self, index: usize) -> [f32; 3] {
        let base = index * 3;
        [
            self.corners[base],
            self.corners[base + 1],
            self.corners[base + 2],
        ]
    }
}

pub const FRONT_FACE: MeshFace = MeshFace {
    corners: [1., 1., 1., 0., 1., 1., 0., 0., 1., 1., 0., 1.],
    shade: 0.8,
};
pub const LEFT_FACE: MeshFace = MeshFace {
    corners: [0., 1., 1., 0., 1., 0., 0., 0., 0., 0., 0., 1.],
    shade: 0.6,
};
pub const BACK_FACE: MeshFace = MeshFace {
    corners: [0., 1., 0., 1., 1., 0., 1., 0., 0., 0., 0., 0.],
    shade: 0.8,
};
pub const RIGHT_FACE: MeshFace = MeshFace {
    corners: [1., 1., 0., 1., 1., 1., 1., 0., 1., 1., 0., 0.],
    shade: 0.6,
};
pub const TOP_FACE: MeshFace = MeshFace {
    corners: [1., 1., 0., 0., 1., 0., 0., 1., 1., 1., 1., 1.],
    shade: 1.0,
};
pub const BOTTOM_FACE: MeshFace = MeshFace {
    corners: [0., 0., 0., 1., 0., 0., 1., 0., 1., 0., 0., 1.],
    shade: 0.4,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceDirection {
    /// -X
    Left,
    /// +X
    Right,
    /// +Z
    Front,
    /// -Z
    Back,
    /// -Y
    Bottom,
    /// +Y
    Top,
}

impl FaceDirection {
    pub const ALL: [FaceDirection; 6] = [
        FaceDirection::Left,
        FaceDirection::Right,
        FaceDirection::Front,
        FaceDirection::Back,
        FaceDirection::Bottom,
        FaceDirection::Top,
    ];

    pub fn normal(self) -> IVec3 {
        match self {
            Self::Left => IVec3::NEG_X,
            Self::Right => IVec3::X,
            Self::Front => IVec3::Z,
            Self::Back => IVec3::NEG_Z,
            Self::Bottom => IVec3::NEG_Y,
            Self::Top => IVec3::Y,
        }
    }

    pub fn descriptor(self) -> &'static MeshFace {
        match self {
            Self::Left => &LEFT_FACE,
            Self::Right => &RIGHT_FACE,
            Self::Front => &FRONT_FACE,
            Self::Back => &BACK_FACE,
            Self::Bottom => &BOTTOM_FACE,
            Self::Top => &TOP_FACE,
        }
    }

    pub fn texture_slot(self) -> TextureSlot {
        match self {
            Self::Top => TextureSlot::Top,
            Self::Bottom => TextureSlot::Bottom,
            Self::Left | Self::Right | Self::Front | Self::Back => TextureSlot::Side,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::FaceDirection;

    fn corner(direction: FaceDirection, index: usize) -> Vec3 {
        Vec3::from_array(direction.descriptor().corner(index))
    }

    #[test]
    fn every_corner_lies_on_the_side_its_direction_names() {
        for direction in FaceDirection::ALL {
            let normal = direction.normal().as_vec3();
            // Plane offset of the face along its normal: 1 for positive sides, 0 for negative.
            let plane = if normal.max_element() > 0.0 { 1.0 } else { 0.0 };
            for index in 0..4 {
                let along = corner(direction, index).dot(normal.abs());
                assert_eq!(along, plane, "{direction:?} corner {index}");
            }
        }
    }

    #[test]
    fn winding_faces_outward() {
        for direction in FaceDirection::ALL {
            let a = corner(direction, 0);
            let b = corner(direction, 1);
            let c = corner(direction, 2);
            let cross = (b - a).cross(c - a).normalize();
            assert_eq!(cross, direction.normal().as_vec3(), "{direction:?}");
        }
    }

    #[test]
    fn corners_span_a_full_unit_square() {
        for direction in FaceDirection::ALL {
            let mut min = Vec3::splat(f32::MAX);
            let mut max = Vec3::splat(f32::MIN);
            for index in 0..4 {
                min = min.min(corner(direction, index));
                max = max.max(corner(direction, index));
            }
            let extent = max - min;
            assert_eq!(extent.element_sum(), 2.0, "{direction:?}");
        }
    }

    #[test]
    fn shades_are_in_unit_range_with_top_brightest() {
        for direction in FaceDirection::ALL {
            let shade = direction.descriptor().shade;
            assert!(shade > 0.0 && shade <= 1.0);
            assert!(shade <= FaceDirection::Top.descriptor().shade);
        }
        assert_eq!(FaceDirection::Bottom.descriptor().shade, 0.4);
    }
}
