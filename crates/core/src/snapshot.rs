use jelly_crush_types::{FRUIT_COUNT, GRID_SIZE};

/// Flat copy of everything a presentation layer needs to draw a frame.
///
/// Board cells encode as 0 = empty, 1..=7 = fruit, 8..=11 = special, the
/// same encoding the wire protocol ships. Jelly cells are 1 where jelly
/// remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionSnapshot {
    pub board: [[u8; GRID_SIZE]; GRID_SIZE],
    pub jelly: [[u8; GRID_SIZE]; GRID_SIZE],
    pub goal_target: u32,
    pub goal_collected: [u32; FRUIT_COUNT],
    pub level: u32,
    pub score: u32,
    pub time_left_ms: u64,
    pub max_time_ms: u64,
    pub busy: bool,
    pub level_completing: bool,
    pub game_over: bool,
    pub seed: u32,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            board: [[0u8; GRID_SIZE]; GRID_SIZE],
            jelly: [[0u8; GRID_SIZE]; GRID_SIZE],
            goal_target: 0,
            goal_collected: [0; FRUIT_COUNT],
            level: 0,
            score: 0,
            time_left_ms: 0,
            max_time_ms: 0,
            busy: false,
            level_completing: false,
            game_over: false,
            seed: 0,
        }
    }
}

impl SessionSnapshot {
    pub fn playable(&self) -> bool {
        !self.game_over && !self.level_completing && !self.busy
    }
}
