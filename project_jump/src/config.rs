use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use engine_core::tick::TickConfig;
use parkour::ParkourConfig;
use space::{BlockPos, VoxelConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TickSection {
    pub tps: u32,
}

impl Default for TickSection {
    fn default() -> Self {
        Self { tps: 20 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldSection {
    pub min_y: i32,
    pub max_y: i32,
}

impl Default for WorldSection {
    fn default() -> Self {
        let voxel = VoxelConfig::default();
        Self {
            min_y: voxel.min_y,
            max_y: voxel.max_y,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameSection {
    pub history_capacity: usize,
    pub max_generation_attempts: u32,
    pub spawn_attempts: u32,
    pub spawn_elevation: i32,
    pub spawn_radius: i32,
    pub fall_threshold: i32,
    pub neutral_position: [i32; 3],
    pub seed: Option<u64>,
}

impl Default for GameSection {
    fn default() -> Self {
        let game = ParkourConfig::default();
        let neutral = game.neutral_position;
        Self {
            history_capacity: game.history_capacity,
            max_generation_attempts: game.max_generation_attempts,
            spawn_attempts: game.spawn_attempts,
            spawn_elevation: game.spawn_elevation,
            spawn_radius: game.spawn_radius,
            fall_threshold: game.fall_threshold,
            neutral_position: [neutral.x, neutral.y, neutral.z],
            seed: game.seed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceSection {
    pub highscore_path: String,
}

impl Default for PersistenceSection {
    fn default() -> Self {
        Self {
            highscore_path: "highscores.json".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// Command line of `jump_server`: `[--config <path>] [--seed <n>]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    /// Overrides `[game] seed` from the file.
    pub seed: Option<u64>,
}

impl CliArgs {
    /// Parse arguments, program name already stripped. Both `--flag value`
    /// and `--flag=value` are accepted.
    pub fn parse<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            match flag.as_str() {
                "--config" => {
                    let value = inline
                        .or_else(|| args.next())
                        .ok_or(ConfigError::MissingValue("--config"))?;
                    cli.config_path = Some(PathBuf::from(value));
                }
                "--seed" => {
                    let value = inline
                        .or_else(|| args.next())
                        .ok_or(ConfigError::MissingValue("--seed"))?;
                    let seed = value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue { flag: "--seed", value })?;
                    cli.seed = Some(seed);
                }
                _ => return Err(ConfigError::UnknownArgument(flag)),
            }
        }
        Ok(cli)
    }
}

/// Top-level jump and run server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub tick: TickSection,
    pub world: WorldSection,
    pub game: GameSection,
    pub persistence: PersistenceSection,
}

impl ServerConfig {
    /// Load configuration from an optional TOML file path. A missing file
    /// means defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)?
            }
            _ => Self::default(),
        };
        Ok(config)
    }

    /// Convert tick section to engine_core's TickConfig.
    pub fn to_tick_config(&self) -> TickConfig {
        TickConfig { tps: self.tick.tps }
    }

    /// Convert world section to space crate's VoxelConfig.
    pub fn to_voxel_config(&self) -> VoxelConfig {
        VoxelConfig {
            min_y: self.world.min_y,
            max_y: self.world.max_y,
        }
    }

    /// Convert game section to parkour crate's ParkourConfig.
    pub fn to_parkour_config(&self) -> ParkourConfig {
        let [x, y, z] = self.game.neutral_position;
        ParkourConfig {
            history_capacity: self.game.history_capacity,
            max_generation_attempts: self.game.max_generation_attempts,
            spawn_attempts: self.game.spawn_attempts,
            spawn_elevation: self.game.spawn_elevation,
            spawn_radius: self.game.spawn_radius,
            fall_threshold: self.game.fall_threshold,
            neutral_position: BlockPos::new(x, y, z),
            seed: self.game.seed,
        }
    }

    /// Load the file named on the command line, then apply CLI overrides.
    pub fn from_cli(cli: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::load(cli.config_path.as_deref())?;
        if let Some(seed) = cli.seed {
            config.game.seed = Some(seed);
        }
        Ok(config)
    }
}
