//! Debug line stream reassembly.
//!
//! The server transfers its debug line array in bounded-size pages, each
//! landing at the start of the download region as three back-to-back
//! arrays of 3×f32 triples (from-points, to-points, colors). Pages arrive
//! at a server-given global offset, so the buffers grow to the final
//! extent up front and fill in as pages land.

use simbus_common::consts::DEBUG_LINE_BYTES;

/// Three parallel line buffers indexed by the server's global line index.
///
/// Invariant: the three buffers always have equal length. Entries between
/// the current extent and an unarrived page are zero until that page lands.
#[derive(Debug, Default)]
pub struct DebugLineSet {
    from: Vec<[f32; 3]>,
    to: Vec<[f32; 3]>,
    color: Vec<[f32; 3]>,
}

impl DebugLineSet {
    /// Number of lines currently addressable.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.from.len(), self.to.len());
        debug_assert_eq!(self.from.len(), self.color.len());
        self.from.len()
    }

    /// Whether no lines are held.
    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }

    /// Line start points.
    pub fn from_points(&self) -> &[[f32; 3]] {
        &self.from
    }

    /// Line end points.
    pub fn to_points(&self) -> &[[f32; 3]] {
        &self.to
    }

    /// Line colors.
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.color
    }

    /// Apply one page of line data at its global offset.
    ///
    /// `bytes` must hold exactly `line_count` triples of each of the three
    /// arrays (`line_count * 36` bytes). Buffers grow to
    /// `starting_index + line_count` if currently shorter; they never
    /// shrink here.
    pub fn apply_page(&mut self, bytes: &[u8], starting_index: usize, line_count: usize) {
        debug_assert_eq!(bytes.len(), line_count * DEBUG_LINE_BYTES);

        let extent = starting_index + line_count;
        if self.from.len() < extent {
            self.from.resize(extent, [0.0; 3]);
            self.to.resize(extent, [0.0; 3]);
            self.color.resize(extent, [0.0; 3]);
        }

        let stride = line_count * 3 * core::mem::size_of::<f32>();
        let window = starting_index..extent;
        read_triples(&bytes[..stride], &mut self.from[window.clone()]);
        read_triples(&bytes[stride..2 * stride], &mut self.to[window.clone()]);
        read_triples(&bytes[2 * stride..3 * stride], &mut self.color[window]);
    }

    /// Drop every line. The only retraction path: overflow failure or an
    /// explicit reset.
    pub fn clear_all(&mut self) {
        self.from.clear();
        self.to.clear();
        self.color.clear();
    }
}

/// Decode native-endian f32 triples out of a packed byte array.
fn read_triples(bytes: &[u8], out: &mut [[f32; 3]]) {
    for (chunk, dst) in bytes.chunks_exact(12).zip(out.iter_mut()) {
        for (scalar, value) in chunk.chunks_exact(4).zip(dst.iter_mut()) {
            *value = f32::from_ne_bytes([scalar[0], scalar[1], scalar[2], scalar[3]]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pack a page the way the server lays it out: all from-points, then
    /// all to-points, then all colors.
    fn pack_page(lines: &[([f32; 3], [f32; 3], [f32; 3])]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(lines.len() * DEBUG_LINE_BYTES);
        for (from, _, _) in lines {
            for v in from {
                bytes.extend_from_slice(&v.to_ne_bytes());
            }
        }
        for (_, to, _) in lines {
            for v in to {
                bytes.extend_from_slice(&v.to_ne_bytes());
            }
        }
        for (_, _, color) in lines {
            for v in color {
                bytes.extend_from_slice(&v.to_ne_bytes());
            }
        }
        bytes
    }

    #[test]
    fn single_page_populates_all_buffers() {
        let page = pack_page(&[
            ([0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [1.0, 0.0, 0.0]),
            ([6.0, 7.0, 8.0], [9.0, 10.0, 11.0], [0.0, 1.0, 0.0]),
        ]);

        let mut set = DebugLineSet::default();
        set.apply_page(&page, 0, 2);

        assert_eq!(set.len(), 2);
        assert_eq!(set.from_points()[0], [0.0, 1.0, 2.0]);
        assert_eq!(set.to_points()[0], [3.0, 4.0, 5.0]);
        assert_eq!(set.colors()[0], [1.0, 0.0, 0.0]);
        assert_eq!(set.from_points()[1], [6.0, 7.0, 8.0]);
        assert_eq!(set.to_points()[1], [9.0, 10.0, 11.0]);
        assert_eq!(set.colors()[1], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn pages_land_at_global_offsets() {
        let page1 = pack_page(&[
            ([1.0; 3], [2.0; 3], [3.0; 3]),
            ([4.0; 3], [5.0; 3], [6.0; 3]),
        ]);
        let page2 = pack_page(&[
            ([7.0; 3], [8.0; 3], [9.0; 3]),
            ([10.0; 3], [11.0; 3], [12.0; 3]),
        ]);

        let mut set = DebugLineSet::default();
        set.apply_page(&page1, 0, 2);
        set.apply_page(&page2, 2, 2);

        assert_eq!(set.len(), 4);
        assert_eq!(set.from_points()[1], [4.0; 3]);
        assert_eq!(set.from_points()[2], [7.0; 3]);
        assert_eq!(set.colors()[3], [12.0; 3]);
    }

    #[test]
    fn out_of_order_page_pregrows() {
        let page = pack_page(&[([1.5; 3], [2.5; 3], [3.5; 3])]);

        let mut set = DebugLineSet::default();
        set.apply_page(&page, 5, 1);

        // Grown to the final extent; earlier entries defined as zero.
        assert_eq!(set.len(), 6);
        assert_eq!(set.from_points()[0], [0.0; 3]);
        assert_eq!(set.from_points()[5], [1.5; 3]);
    }

    #[test]
    fn rewrite_never_shrinks() {
        let big = pack_page(&[([1.0; 3], [1.0; 3], [1.0; 3]); 4]);
        let small = pack_page(&[([9.0; 3], [9.0; 3], [9.0; 3])]);

        let mut set = DebugLineSet::default();
        set.apply_page(&big, 0, 4);
        set.apply_page(&small, 0, 1);

        assert_eq!(set.len(), 4);
        assert_eq!(set.from_points()[0], [9.0; 3]);
        assert_eq!(set.from_points()[3], [1.0; 3]);
    }

    #[test]
    fn clear_all_empties_every_buffer() {
        let page = pack_page(&[([1.0; 3], [2.0; 3], [3.0; 3]); 3]);
        let mut set = DebugLineSet::default();
        set.apply_page(&page, 0, 3);
        assert_eq!(set.len(), 3);

        set.clear_all();
        assert_eq!(set.len(), 0);
        assert!(set.is_empty());
        assert!(set.from_points().is_empty());
        assert!(set.to_points().is_empty());
        assert!(set.colors().is_empty());
    }
}
