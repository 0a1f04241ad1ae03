//! Key lifecycle: loading, first-run generation and rotation

pub mod manager;
pub mod schedule;

pub use manager::{
    active_name, is_key_entry, is_rotated, rotated_name, KeyManager, KeyManagerError, KeySet,
    KEY_SUFFIX, ROTATED_PREFIX,
};
pub use schedule::spawn_scheduled_rotation;
