// Library exports for the Battlesnake bot
// The server binary, the replay tool and the report tool all share the engine through here

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod engine;
pub mod error;
pub mod grid;
pub mod pathfinding;
pub mod replay;
pub mod report;
pub mod resolver;
pub mod safety;
pub mod target;
pub mod types;
