//! System-wide constants for the SIMBUS workspace.
//!
//! Single source of truth for all numeric limits and protocol constants.
//! Imported by all crates; no duplication permitted.

/// Magic bytes identifying a valid simulation segment, including the
/// layout revision (`'1'`). Written by the server when it creates the
/// segment; checked by the client on every attach. A mismatch means the
/// server is not running or speaks an incompatible layout revision.
pub const SEGMENT_MAGIC: u64 = u64::from_le_bytes(*b"SIMBUS1\0");

/// Default shared segment key used when no key is configured.
pub const DEFAULT_SEGMENT_KEY: u32 = 24601;

/// Capacity of each bulk stream region (client→server and server→client)
/// in bytes. Payloads larger than one region never transfer partially;
/// the sender must page or reject.
pub const STREAM_CAPACITY: usize = 256 * 1024;

/// Fixed size of the command slot argument area in bytes.
/// Every command's argument struct must fit (checked by const assertions).
pub const COMMAND_PAYLOAD_BYTES: usize = 2112;

/// Fixed size of the status slot argument area in bytes.
pub const STATUS_PAYLOAD_BYTES: usize = 2112;

/// Maximum length of a model file path carried in a command, including
/// the NUL terminator.
pub const MODEL_PATH_BYTES: usize = 1024;

/// Maximum number of generalized position coordinates carried in a
/// desired/actual state payload (floating base pose included).
pub const MAX_GENERALIZED_COORDS: usize = 128;

/// Maximum number of generalized velocity coordinates (DOFs) carried in a
/// desired/actual state payload.
pub const MAX_GENERALIZED_VELOCITIES: usize = 128;

/// Bytes occupied by one debug line in a page: three 3×f32 triples
/// (from-point, to-point, color).
pub const DEBUG_LINE_BYTES: usize = 3 * 3 * core::mem::size_of::<f32>();

/// Maximum number of debug lines a single page can carry, bounded by the
/// server→client stream region.
pub const DEBUG_LINES_PER_PAGE: usize = STREAM_CAPACITY / DEBUG_LINE_BYTES;

/// CPU cache line size in bytes, used for segment block alignment.
pub const CACHE_LINE_SIZE: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_embeds_layout_revision() {
        let bytes = SEGMENT_MAGIC.to_le_bytes();
        assert_eq!(&bytes[..6], b"SIMBUS");
        assert_eq!(bytes[6], b'1');
        assert_eq!(bytes[7], 0);
    }

    #[test]
    fn payload_areas_hold_largest_args() {
        // The state vectors are the largest payloads on either side.
        let state_bytes = 16 + 8 * (MAX_GENERALIZED_COORDS + MAX_GENERALIZED_VELOCITIES);
        assert!(state_bytes <= COMMAND_PAYLOAD_BYTES);
        assert!(state_bytes <= STATUS_PAYLOAD_BYTES);
        assert!(MODEL_PATH_BYTES < COMMAND_PAYLOAD_BYTES);
    }

    #[test]
    fn debug_line_page_bounds() {
        assert_eq!(DEBUG_LINE_BYTES, 36);
        assert!(DEBUG_LINES_PER_PAGE * DEBUG_LINE_BYTES <= STREAM_CAPACITY);
        assert!(DEBUG_LINES_PER_PAGE > 0);
    }
}
