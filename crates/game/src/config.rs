//! Match configuration (loop pacing, network, level, roster). Loaded from config.ron at startup.

use movement::{CharacterKind, MovementConfig, Powerups, TalentRanks, TalentStat};
use netsync::ReconcileConfig;
use serde::{Deserialize, Serialize};

/// Persistent match settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of owner frames to simulate.
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Shortest frame the loop will produce, in seconds.
    #[serde(default = "default_min_frame_time")]
    pub min_frame_time: f32,
    /// Longest frame the loop will produce, in seconds.
    #[serde(default = "default_max_frame_time")]
    pub max_frame_time: f32,
    /// Owner ticks between snapshots of the same character.
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: u32,
    /// Seed for frame pacing, network jitter and scripted input.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub level: LevelConfig,
    #[serde(default = "default_roster")]
    pub roster: Vec<RosterEntry>,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

fn default_frames() -> u32 {
    1800
}
fn default_min_frame_time() -> f32 {
    1.0 / 144.0
}
fn default_max_frame_time() -> f32 {
    1.0 / 30.0
}
fn default_snapshot_interval() -> u32 {
    3
}
fn default_seed() -> u64 {
    0x6e69_6768_74
}

fn default_roster() -> Vec<RosterEntry> {
    vec![
        RosterEntry {
            kind: CharacterKind::DoubleJumpExplorer,
            spawn: [-8.0, 0.6],
            talents: vec![(TalentStat::JumpHeight, 2), (TalentStat::WallResetMovement, 1)],
            powerups: Powerups::default(),
        },
        RosterEntry {
            kind: CharacterKind::JetpackExplorer,
            spawn: [-6.0, 0.6],
            talents: vec![(TalentStat::ReducedGravity, 1)],
            powerups: Powerups {
                third_jump: true,
                ..Default::default()
            },
        },
        RosterEntry {
            kind: CharacterKind::Goblin,
            spawn: [6.0, 0.6],
            talents: vec![(TalentStat::MovementSpeed, 3), (TalentStat::CooldownReduction, 2)],
            powerups: Powerups::default(),
        },
        RosterEntry {
            kind: CharacterKind::Specter,
            spawn: [0.0, 6.0],
            talents: vec![(TalentStat::Acceleration, 4)],
            powerups: Powerups::default(),
        },
    ]
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            min_frame_time: default_min_frame_time(),
            max_frame_time: default_max_frame_time(),
            snapshot_interval: default_snapshot_interval(),
            seed: default_seed(),
            network: NetworkConfig::default(),
            level: LevelConfig::default(),
            roster: default_roster(),
            movement: MovementConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }

    /// Frame time bounds, ordered and kept strictly positive.
    pub fn frame_time_range(&self) -> (f32, f32) {
        let a = self.min_frame_time.max(1e-4);
        let b = self.max_frame_time.max(1e-4);
        (a.min(b), a.max(b))
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("config.ron")
}

/// Simulated link between the owner and the replica peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// One-way delay of every message, in seconds.
    pub latency: f32,
    /// Extra random delay on unordered messages; large values reorder snapshots.
    pub jitter: f32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            latency: 0.06,
            jitter: 0.04,
        }
    }
}

/// Axis-aligned solid block, by corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolidBlock {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

/// Circular zone that hurts whoever stands in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardZone {
    pub center: [f32; 2],
    pub radius: f32,
    pub damage: i32,
    /// Speed the victim is thrown away from the center at.
    pub knockback: f32,
    pub stun_time: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub solids: Vec<SolidBlock>,
    pub hazards: Vec<HazardZone>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let block = |min: [f32; 2], max: [f32; 2]| SolidBlock { min, max };
        Self {
            solids: vec![
                // Floor, side walls and ceiling of a 24 x 12 arena.
                block([-13.0, -1.0], [13.0, 0.0]),
                block([-13.0, 0.0], [-12.0, 12.0]),
                block([12.0, 0.0], [13.0, 12.0]),
                block([-13.0, 12.0], [13.0, 13.0]),
                // Ledge and pillar.
                block([-4.0, 3.0], [0.0, 3.5]),
                block([4.0, 0.0], [5.0, 4.0]),
            ],
            hazards: vec![HazardZone {
                center: [9.0, 0.5],
                radius: 0.8,
                damage: 30,
                knockback: 8.0,
                stun_time: 0.4,
            }],
        }
    }
}

/// One character of the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub kind: CharacterKind,
    pub spawn: [f32; 2],
    #[serde(default)]
    pub talents: Vec<(TalentStat, i32)>,
    #[serde(default)]
    pub powerups: Powerups,
}

impl RosterEntry {
    pub fn talent_ranks(&self) -> TalentRanks {
        self.talents
            .iter()
            .fold(TalentRanks::new(), |ranks, &(stat, rank)| ranks.with(stat, rank))
    }
}
