//! Scoring - pure point formulas
//!
//! All point values flow through here so the session only ever adds deltas.
//! The batch multiplier is deliberate: resolving several simultaneous
//! matches multiplies their combined value by the match count, so cascades
//! that land multi-matches pay off disproportionately.

use jelly_crush_types::{
    SpecialKind, BOMB_SWEEP_BONUS, COLOR_BOMB_EXTRA_BONUS, COLOR_BOMB_SWEEP_BONUS,
    LEVEL_BONUS_PER_LEVEL, MATCH_UNIT_SCORE, ROCKET_SWEEP_BONUS, SPECIAL_ACTIVATION_BONUS,
};

use crate::matcher::Match;

/// Points for a single match: 10 per cell, scaled by how far past the
/// minimum run length it reaches. A 3-run is worth 30, a 4-run 80, a
/// 5-run 150.
pub fn match_points(len: usize) -> u32 {
    (len as u32) * MATCH_UNIT_SCORE * (len as u32).saturating_sub(2)
}

/// Points for a batch of simultaneous matches.
pub fn batch_points(matches: &[Match]) -> u32 {
    let base: u32 = matches.iter().map(|m| match_points(m.len())).sum();
    base * matches.len() as u32
}

/// Immediate bonus granted the moment a special fires. Color bombs carry an
/// extra premium on top of the flat activation bonus.
pub fn activation_bonus(kind: SpecialKind) -> u32 {
    match kind {
        SpecialKind::ColorBomb => SPECIAL_ACTIVATION_BONUS + COLOR_BOMB_EXTRA_BONUS,
        _ => SPECIAL_ACTIVATION_BONUS,
    }
}

/// Flat completion-sweep value of a leftover special.
pub fn sweep_bonus(kind: SpecialKind) -> u32 {
    match kind {
        SpecialKind::RocketH | SpecialKind::RocketV => ROCKET_SWEEP_BONUS,
        SpecialKind::Bomb => BOMB_SWEEP_BONUS,
        SpecialKind::ColorBomb => COLOR_BOMB_SWEEP_BONUS,
    }
}

/// Remaining time converted to points: 10 per second, i.e. 1 per 100ms.
pub fn time_bonus(time_left_ms: u64) -> u32 {
    (time_left_ms / 100) as u32
}

pub fn level_bonus(level: u32) -> u32 {
    level * LEVEL_BONUS_PER_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrayvec::ArrayVec;
    use jelly_crush_types::{Axis, Coord, Fruit};

    use crate::matcher::MatchShape;

    fn line_match(len: usize) -> Match {
        let mut cells: ArrayVec<Coord, { crate::matcher::MAX_MATCH_CELLS }> = ArrayVec::new();
        for col in 0..len as u8 {
            cells.push(Coord::new(0, col));
        }
        Match {
            fruit: Fruit::Banana,
            cells,
            shape: MatchShape::Line(Axis::Horizontal),
        }
    }

    #[test]
    fn match_points_scale_with_length() {
        assert_eq!(match_points(3), 30);
        assert_eq!(match_points(4), 80);
        assert_eq!(match_points(5), 150);
    }

    #[test]
    fn batch_multiplies_by_match_count() {
        let matches = vec![line_match(3), line_match(3)];
        // (30 + 30) * 2
        assert_eq!(batch_points(&matches), 120);
    }

    #[test]
    fn single_match_batch_is_just_its_points() {
        let matches = vec![line_match(4)];
        assert_eq!(batch_points(&matches), 80);
    }

    #[test]
    fn time_bonus_rounds_down() {
        assert_eq!(time_bonus(0), 0);
        assert_eq!(time_bonus(99), 0);
        assert_eq!(time_bonus(12_345), 123);
    }

    #[test]
    fn activation_bonus_premium_for_color_bomb() {
        assert_eq!(activation_bonus(SpecialKind::Bomb), 50);
        assert_eq!(activation_bonus(SpecialKind::RocketV), 50);
        assert_eq!(activation_bonus(SpecialKind::ColorBomb), 150);
    }

    #[test]
    fn sweep_values() {
        assert_eq!(sweep_bonus(SpecialKind::RocketH), 500);
        assert_eq!(sweep_bonus(SpecialKind::RocketV), 500);
        assert_eq!(sweep_bonus(SpecialKind::Bomb), 750);
        assert_eq!(sweep_bonus(SpecialKind::ColorBomb), 1000);
    }
}
