// Story layout
pub const PHASE_COUNT: usize = 10;
pub const LAST_PHASE_INDEX: u8 = (PHASE_COUNT - 1) as u8;
/// Set in Nullhaven, read aboard the ghost ship. Older saves stored it as a
/// dedicated field.
pub const HELPED_SAILOR_FLAG: &str = "helped_sailor";

// Save format
pub const SAVE_MAGIC: u64 = 0x5A4F_5247_5341_5645; // "ZORGSAVE"
pub const SAVE_FORMAT_VERSION: u32 = 2;
pub const LEGACY_SAVE_FORMAT_VERSION: u32 = 1;
pub const SUPPORTED_SAVE_VERSIONS: [u32; 2] = [LEGACY_SAVE_FORMAT_VERSION, SAVE_FORMAT_VERSION];
pub const SAVE_HEADER_LEN: usize = 8 + 4 + 4;
pub const SAVE_CHECKSUM_LEN: usize = 32;
pub const SAVE_FILE_NAME: &str = "zorg_save.dat";
pub const SAVE_DIR_ENV: &str = "ZORG_SAVE_DIR";

// Character defaults
pub const STARTING_LEVEL: u32 = 1;
pub const STARTING_HP: u32 = 50;
pub const STARTING_MP: u32 = 20;
pub const STARTING_STRENGTH: u32 = 7;
pub const STARTING_DEFENSE: u32 = 2;
pub const STARTING_SPEED: u32 = 10;
pub const STARTING_MAGIC: u32 = 5;

// Logging
pub const LOG_ENV: &str = "ZORG_LOG";
