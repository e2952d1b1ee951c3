pub mod block;
pub mod chunk;
pub mod coords;
pub mod inventory;
pub mod mesh;
pub mod physics;
pub mod player;
pub mod world;
pub mod worldgen;
