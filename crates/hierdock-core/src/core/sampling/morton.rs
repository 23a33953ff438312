//! Bit interleaving for the z-order paths of the sampling hierarchies.
//!
//! A path at level `L` carries one bit per dimension per level. With `dims` dimensions, bit `d`
//! of each `dims`-bit group belongs to dimension `d`, and earlier (coarser) levels occupy the
//! more significant groups.

/// Gathers every `dims`-th bit of `v` (starting at bit 0) into the low `nbits` bits.
#[inline]
pub fn undilate(v: u64, nbits: u32, dims: u32) -> u64 {
    let mut out = 0;
    for i in 0..nbits {
        out |= ((v >> (dims * i)) & 1) << i;
    }
    out
}

/// Grid coordinate of dimension `dim` encoded in the z-order path `hier` of a `level`-deep cell.
#[inline]
pub fn coordinate(hier: u64, dim: u32, level: u32, dims: u32) -> u64 {
    undilate(hier >> dim, level, dims)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Spreads the low `nbits` bits of `v` so that bit `i` lands at bit `dims * i`.
    fn dilate(v: u64, nbits: u32, dims: u32) -> u64 {
        let mut out = 0;
        for i in 0..nbits {
            out |= ((v >> i) & 1) << (dims * i);
        }
        out
    }

    /// Interleaves per-dimension coordinates (each `< 2^level`) into a z-order path.
    pub(crate) fn interleave(coords: &[u64], level: u32) -> u64 {
        let dims = coords.len() as u32;
        coords
            .iter()
            .enumerate()
            .fold(0, |acc, (d, &c)| acc | (dilate(c, level, dims) << d))
    }

    #[test]
    fn dilate_and_undilate_are_inverse() {
        for dims in [1, 4, 6] {
            for v in [0u64, 1, 2, 5, 255, 1023] {
                assert_eq!(undilate(dilate(v, 10, dims), 10, dims), v);
            }
        }
    }

    #[test]
    fn interleave_matches_coordinate_extraction() {
        let coords = [3, 0, 7, 1, 6, 2];
        let h = interleave(&coords, 3);
        for (d, &c) in coords.iter().enumerate() {
            assert_eq!(coordinate(h, d as u32, 3, 6), c);
        }
        let coords = [1, 3, 0, 2];
        let h = interleave(&coords, 2);
        for (d, &c) in coords.iter().enumerate() {
            assert_eq!(coordinate(h, d as u32, 2, 4), c);
        }
    }

    #[test]
    fn coarser_levels_are_more_significant() {
        // Parent group 0b000001 (dim 0 set), child group 0.
        let h = 0b000001 << 6;
        assert_eq!(coordinate(h, 0, 2, 6), 2);
        let h = 0b0010 << 4;
        assert_eq!(coordinate(h, 1, 2, 4), 2);
    }
}
