//! Simulation wire protocol.
//!
//! This module contains:
//! - `block`: The fixed shared-segment layout (`SegmentBlock`).
//! - `command`: Client→server commands and the command slot.
//! - `status`: Server→client statuses and the status slot.
//!
//! Commands and statuses are closed sum types; each variant's arguments
//! are a fixed-size `#[repr(C)]` POD struct copied into the slot's
//! argument area. A slot is therefore always a (kind tag, argument bytes)
//! pair with a deterministic byte image: the argument area is zeroed
//! before the variant's struct is written.

pub mod block;
pub mod command;
pub mod status;

pub use block::{SEGMENT_SIZE, SegmentBlock};
pub use command::{
    Command, CommandKind, CommandSlot, ControlMode, DataStreamArgs, DesiredStateArgs,
    LoadModelArgs, RequestDebugLinesArgs,
};
pub use status::{
    ActualStateArgs, SceneStreamArgs, SendDebugLinesArgs, Status, StatusKind, StatusSlot,
};

/// Marker for argument structs that may cross the wire verbatim.
///
/// Implementors must be `#[repr(C)]` with only numeric primitives, byte
/// arrays, or arrays thereof: every bit pattern the peer can produce is a
/// valid value, and the all-zero pattern is a valid default.
pub(crate) trait WireArgs: Copy {}

/// Copy an argument struct into a slot's argument area.
///
/// Zeroes the whole area first so the slot's byte image depends only on
/// the encoded value, never on what a previous command left behind.
pub(crate) fn write_args<T: WireArgs>(args: &T, payload: &mut [u8]) {
    let size = core::mem::size_of::<T>();
    debug_assert!(size <= payload.len());
    payload.fill(0);
    // SAFETY: `T: WireArgs` guarantees a plain repr(C) POD; the fit is
    // verified by const assertions at the definition site.
    unsafe {
        core::ptr::copy_nonoverlapping(args as *const T as *const u8, payload.as_mut_ptr(), size);
    }
}

/// Copy an argument struct out of a slot's argument area.
pub(crate) fn read_args<T: WireArgs>(payload: &[u8]) -> T {
    let size = core::mem::size_of::<T>();
    debug_assert!(size <= payload.len());
    // SAFETY: `T: WireArgs` guarantees all-zeros is a valid value and that
    // any bytes the peer wrote form a valid value.
    let mut value: T = unsafe { core::mem::zeroed() };
    unsafe {
        core::ptr::copy_nonoverlapping(payload.as_ptr(), &mut value as *mut T as *mut u8, size);
    }
    value
}

// Large wire structs use mem::zeroed() for Default to avoid deep stack
// usage. This is safe because all fields are plain numeric types or arrays
// thereof, and zero is a valid value for every field.
macro_rules! impl_default_zeroed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Default for $ty {
                fn default() -> Self {
                    // SAFETY: All fields are numeric primitives or fixed-size arrays
                    // of numeric primitives. Zero is a valid value for every field.
                    unsafe { core::mem::zeroed() }
                }
            }
        )*
    };
}

pub(crate) use impl_default_zeroed;
