//! Squared Euclidean distance kernels.
//!
//! The index orders candidates by squared L2 distance; the square root is
//! never taken because it preserves ordering. Beam search spends most of its
//! time here, so the hot path is vectorized: the widest available lane width
//! is detected once at startup and every call dispatches to that kernel, with
//! a scalar loop covering the tail elements that do not fill a full register.
//!
//! [`l2_squared_scalar`] is the reference implementation; the SIMD kernels
//! must agree with it to within accumulation-order rounding. Both storage
//! backends hand out plain `&[f32]` views, so a single slice-pair kernel
//! serves resident-vs-resident and resident-vs-query alike.
//!
//! Mismatched slice lengths are a caller bug (debug assertion, not a runtime
//! error). NaN and infinity propagate through untouched.

use std::sync::OnceLock;

/// SIMD capability detected on the running CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdCapability {
    /// Scalar fallback, one element per iteration.
    Scalar,
    /// SSE4.1, 4 f32 lanes.
    Sse41,
    /// AVX2 + FMA, 8 f32 lanes.
    Avx2,
    /// NEON, 4 f32 lanes (always present on aarch64).
    Neon,
}

impl SimdCapability {
    /// Probe the CPU once. Prefers the widest supported lane width.
    #[allow(unreachable_code)]
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
                return SimdCapability::Avx2;
            }
            if is_x86_feature_detected!("sse4.1") {
                return SimdCapability::Sse41;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            return SimdCapability::Neon;
        }
        SimdCapability::Scalar
    }

    /// Number of f32 elements processed per SIMD iteration.
    pub fn lanes(&self) -> usize {
        match self {
            SimdCapability::Scalar => 1,
            SimdCapability::Sse41 | SimdCapability::Neon => 4,
            SimdCapability::Avx2 => 8,
        }
    }
}

static CAPABILITY: OnceLock<SimdCapability> = OnceLock::new();

/// The capability every [`l2_squared`] call dispatches on.
pub fn capability() -> SimdCapability {
    *CAPABILITY.get_or_init(SimdCapability::detect)
}

/// Squared Euclidean distance `Σ (a[i] - b[i])²`.
///
/// Dispatches to the widest kernel the CPU supports. Slices must be the same
/// length.
#[inline]
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    match capability() {
        #[cfg(target_arch = "x86_64")]
        SimdCapability::Avx2 => unsafe { l2_squared_avx2(a, b) },
        #[cfg(target_arch = "x86_64")]
        SimdCapability::Sse41 => unsafe { l2_squared_sse41(a, b) },
        #[cfg(target_arch = "aarch64")]
        SimdCapability::Neon => unsafe { l2_squared_neon(a, b) },
        _ => l2_squared_scalar(a, b),
    }
}

/// Scalar reference implementation.
#[inline]
pub fn l2_squared_scalar(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// AVX2 kernel: 8 lanes per iteration, FMA accumulation, scalar tail.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn l2_squared_avx2(a: &[f32], b: &[f32]) -> f32 {
    use std::arch::x86_64::*;

    let n = a.len();
    let chunks = n / 8;
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc = _mm256_setzero_ps();
    for i in 0..chunks {
        let offset = i * 8;
        let va = _mm256_loadu_ps(a_ptr.add(offset));
        let vb = _mm256_loadu_ps(b_ptr.add(offset));
        let diff = _mm256_sub_ps(va, vb);
        acc = _mm256_fmadd_ps(diff, diff, acc);
    }

    // Horizontal reduce-add of the 8-lane accumulator.
    let hi = _mm256_extractf128_ps(acc, 1);
    let lo = _mm256_castps256_ps128(acc);
    let sum128 = _mm_add_ps(lo, hi);
    let sum64 = _mm_add_ps(sum128, _mm_movehl_ps(sum128, sum128));
    let sum32 = _mm_add_ss(sum64, _mm_shuffle_ps(sum64, sum64, 1));
    let mut sum = _mm_cvtss_f32(sum32);

    for i in (chunks * 8)..n {
        let d = *a.get_unchecked(i) - *b.get_unchecked(i);
        sum += d * d;
    }
    sum
}

/// SSE4.1 kernel: 4 lanes per iteration, scalar tail.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse4.1")]
pub unsafe fn l2_squared_sse41(a: &[f32], b: &[f32]) -> f32 {
    use std::arch::x86_64::*;

    let n = a.len();
    let chunks = n / 4;
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc = _mm_setzero_ps();
    for i in 0..chunks {
        let offset = i * 4;
        let va = _mm_loadu_ps(a_ptr.add(offset));
        let vb = _mm_loadu_ps(b_ptr.add(offset));
        let diff = _mm_sub_ps(va, vb);
        acc = _mm_add_ps(acc, _mm_mul_ps(diff, diff));
    }

    let sum64 = _mm_add_ps(acc, _mm_movehl_ps(acc, acc));
    let sum32 = _mm_add_ss(sum64, _mm_shuffle_ps(sum64, sum64, 1));
    let mut sum = _mm_cvtss_f32(sum32);

    for i in (chunks * 4)..n {
        let d = *a.get_unchecked(i) - *b.get_unchecked(i);
        sum += d * d;
    }
    sum
}

/// NEON kernel: 4 lanes per iteration, fused multiply-add, scalar tail.
#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
pub unsafe fn l2_squared_neon(a: &[f32], b: &[f32]) -> f32 {
    use std::arch::aarch64::*;

    let n = a.len();
    let chunks = n / 4;
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut acc = vdupq_n_f32(0.0);
    for i in 0..chunks {
        let offset = i * 4;
        let va = vld1q_f32(a_ptr.add(offset));
        let vb = vld1q_f32(b_ptr.add(offset));
        let diff = vsubq_f32(va, vb);
        acc = vfmaq_f32(acc, diff, diff);
    }

    let mut sum = vaddvq_f32(acc);
    for i in (chunks * 4)..n {
        let d = *a.get_unchecked(i) - *b.get_unchecked(i);
        sum += d * d;
    }
    sum
}
