use bytemuck::{Pod, Zeroable};
use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Width and height of the texture atlas, in cells.
pub const ATLAS_CELLS: f32 = 16.0;

#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Pod,
    Zeroable,
)]
pub struct BlockId(pub u8);

impl BlockId {
    pub const AIR: Self = Self(0);
    pub const GRASS: Self = Self(1);
    pub const DIRT: Self = Self(2);
    pub const STONE: Self = Self(3);

    /// Transparent blocks neither occlude faces nor collide. Only air is.
    pub fn is_transparent(self) -> bool {
        block_properties(self).is_some_and(|props| props.transparent)
    }

    pub fn is_solid(self) -> bool {
        !self.is_transparent()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_TABLE
            .iter()
            .position(|props| props.name.eq_ignore_ascii_case(name))
            .map(|idx| Self(idx as u8))
    }

    pub fn name(self) -> &'static str {
        block_properties(self).map_or("unknown", |props| props.name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    PosZ = 0,
    NegZ = 1,
    PosY = 2,
    NegY = 3,
    PosX = 4,
    NegX = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosZ,
        Face::NegZ,
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn normal_ivec3(self) -> IVec3 {
        match self {
            Face::PosX => IVec3::X,
            Face::NegX => IVec3::NEG_X,
            Face::PosY => IVec3::Y,
            Face::NegY => IVec3::NEG_Y,
            Face::PosZ => IVec3::Z,
            Face::NegZ => IVec3::NEG_Z,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AtlasTiles {
    pub top: (u8, u8),
    pub bottom: (u8, u8),
    pub side: (u8, u8),
}

impl AtlasTiles {
    const fn uniform(cell: (u8, u8)) -> Self {
        Self {
            top: cell,
            bottom: cell,
            side: cell,
        }
    }

    pub fn for_face(&self, face: Face) -> (u8, u8) {
        match face {
            Face::PosY => self.top,
            Face::NegY => self.bottom,
            _ => self.side,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct BlockProperties {
    pub name: &'static str,
    pub transparent: bool,
    pub tiles: AtlasTiles,
}

const BLOCK_TABLE: [BlockProperties; 4] = [
    BlockProperties {
        name: "air",
        transparent: true,
        tiles: AtlasTiles::uniform((0, 0)),
    },
    BlockProperties {
        name: "grass",
        transparent: false,
        tiles: AtlasTiles {
            top: (0, 0),
            bottom: (2, 0),
            side: (1, 0),
        },
    },
    BlockProperties {
        name: "dirt",
        transparent: false,
        tiles: AtlasTiles::uniform((2, 0)),
    },
    BlockProperties {
        name: "stone",
        transparent: false,
        tiles: AtlasTiles::uniform((3, 0)),
    },
];

pub fn block_properties(id: BlockId) -> Option<&'static BlockProperties> {
    BLOCK_TABLE.get(usize::from(id.0))
}

/// Normalized atlas rectangle `(u0, v0, u1, v1)` for one face of a block.
/// Unknown ids fall back to cell (0, 0).
pub fn face_uv_rect(id: BlockId, face: Face) -> [f32; 4] {
    let (cell_x, cell_y) = block_properties(id)
        .map(|props| props.tiles.for_face(face))
        .unwrap_or((0, 0));
    let unit = 1.0 / ATLAS_CELLS;
    let u0 = f32::from(cell_x) * unit;
    let v0 = f32::from(cell_y) * unit;
    [u0, v0, (f32::from(cell_x) + 1.0) * unit, (f32::from(cell_y) + 1.0) * unit]
}

pub fn face_tex_coords(id: BlockId, face: Face) -> [[f32; 2]; 4] {
    let [u0, v0, u1, v1] = face_uv_rect(id, face);
    [[u0, v0], [u1, v0], [u1, v1], [u0, v1]]
}

pub const CUBE_FACE_VERTICES: [[[f32; 3]; 4]; 6] = [
    // +Z
    [
        [-0.5, -0.5, 0.5],
        [0.5, -0.5, 0.5],
        [0.5, 0.5, 0.5],
        [-0.5, 0.5, 0.5],
    ],
    // -Z
    [
        [-0.5, -0.5, -0.5],
        [-0.5, 0.5, -0.5],
        [0.5, 0.5, -0.5],
        [0.5, -0.5, -0.5],
    ],
    // +Y
    [
        [-0.5, 0.5, -0.5],
        [-0.5, 0.5, 0.5],
        [0.5, 0.5, 0.5],
        [0.5, 0.5, -0.5],
    ],
    // -Y
    [
        [-0.5, -0.5, -0.5],
        [0.5, -0.5, -0.5],
        [0.5, -0.5, 0.5],
        [-0.5, -0.5, 0.5],
    ],
    // +X
    [
        [0.5, -0.5, -0.5],
        [0.5, 0.5, -0.5],
        [0.5, 0.5, 0.5],
        [0.5, -0.5, 0.5],
    ],
    // -X
    [
        [-0.5, -0.5, -0.5],
        [-0.5, -0.5, 0.5],
        [-0.5, 0.5, 0.5],
        [-0.5, 0.5, -0.5],
    ],
];

pub const CUBE_FACE_INDICES: [u32; 36] = [
    0, 1, 2, 2, 3, 0, // +Z
    4, 5, 6, 6, 7, 4, // -Z
    8, 9, 10, 10, 11, 8, // +Y
    12, 13, 14, 14, 15, 12, // -Y
    16, 17, 18, 18, 19, 16, // +X
    20, 21, 22, 22, 23, 20, // -X
];
