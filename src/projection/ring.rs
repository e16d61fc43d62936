/// Ring slot and fractional position within it for output column `x`.
///
/// `x * slots / width` split into its integer part (wrapped into `0..slots`) and fraction.
/// `slots` must be non-zero.
pub fn ring_slot(x: u32, width: u32, slots: usize) -> (usize, f64) {
    debug_assert!(slots > 0, "ring needs at least one slot");
    let idx_f = f64::from(x) * slots as f64 / f64::from(width);
    let whole = idx_f.floor();
    (whole as usize % slots.max(1), idx_f - whole)
}
