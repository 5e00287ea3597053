pub use crate::{
    msg, send_msg, Action, Config, Entity, Impossible, InputSource, Instant,
    Location, Receiver, Runtime, ScenarioStatus, Script, Ticket, Tile,
    TurnQueue, WorldSpec,
};
pub use glam::{ivec2, IVec2};
pub use util::{HashMap, HashSet, VecExt, DIR_8};
