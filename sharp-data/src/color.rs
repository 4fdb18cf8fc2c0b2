//! Spherical harmonics DC coefficients to 8-bit RGB.

use glam::DVec3;

/// Normalization of the degree-0 real spherical harmonic, `1 / (2 * sqrt(pi))`.
pub const SH_C0: f64 = 0.282_094_791_773_878_14;

/// Convert the `f_dc_0..2` coefficients of a Gaussian to its base RGB color.
///
/// Each channel is `clamp(0.5 + SH_C0 * f_dc, 0, 1) * 255`, truncated.
/// A NaN coefficient saturates its channel to 255.
pub fn sh_dc_to_rgb(dc: DVec3) -> [u8; 3] {
    let linear = DVec3::splat(0.5) + SH_C0 * dc;
    let linear = DVec3::select(linear.is_nan_mask(), DVec3::ONE, linear);
    let rgb = linear.clamp(DVec3::ZERO, DVec3::ONE) * 255.0;
    [rgb.x as u8, rgb.y as u8, rgb.z as u8]
}
