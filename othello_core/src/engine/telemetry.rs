use crate::logic::board::Side;
use crate::logic::game::Outcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePerformance {
    /// Position of the move in the game, from 0.
    pub move_index: usize,
    pub side: Side,
    pub time_ms: u64,
    /// Root moves the search actually weighed (after trimming); all legal
    /// moves for a human.
    pub valid_moves: usize,
}

/// Summary of one finished game, in the shape telemetry consumers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: Uuid,
    pub black_controller: String,
    pub white_controller: String,
    pub black_disks: u32,
    pub white_disks: u32,
    pub winner: Outcome,
    pub final_board_state: String,
    pub board_size: usize,
    pub performance: Vec<MovePerformance>,
}

impl MatchRecord {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    pub fn total_time_ms(&self, side: Side) -> u64 {
        self.performance
            .iter()
            .filter(|p| p.side == side)
            .map(|p| p.time_ms)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let record = MatchRecord {
            match_id: Uuid::new_v4(),
            black_controller: "Human".to_string(),
            white_controller: "AIMinimax|0.30|Rust||".to_string(),
            black_disks: 40,
            white_disks: 24,
            winner: Outcome::Won(Side::Black),
            final_board_state: "0".repeat(40) + &"1".repeat(24),
            board_size: 8,
            performance: vec![
                MovePerformance { move_index: 0, side: Side::Black, time_ms: 12, valid_moves: 4 },
                MovePerformance { move_index: 1, side: Side::White, time_ms: 30, valid_moves: 3 },
                MovePerformance { move_index: 2, side: Side::Black, time_ms: 5, valid_moves: 5 },
            ],
        };
        let json = record.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["black_disks"], 40);
        assert_eq!(value["winner"]["Won"], "Black");
        assert_eq!(value["performance"][1]["valid_moves"], 3);
        assert_eq!(MatchRecord::from_json(&json).unwrap(), record);
        assert_eq!(record.total_time_ms(Side::Black), 17);
    }
}
