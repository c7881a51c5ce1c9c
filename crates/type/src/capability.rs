//! SIMD capability gating.
//!
//! A `CapabilityDescriptor` names which x86_64 SIMD tiers a caller is
//! permitted to use, independent of what the host CPU actually supports.
//! The highest allowed tier never implies the lower ones are also allowed:
//! each field is an independent boolean, and callers that want "AVX2 and
//! everything below it" must set every field themselves.

use std::fmt;

/// Independently-gated SIMD tiers available to the bulk codec paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilityDescriptor {
    pub sse2: bool,
    pub ssse3: bool,
    pub avx: bool,
    pub avx2: bool,
    pub avx512f: bool,
    pub avx512bw: bool,
}

/// Ranks the highest tier a descriptor allows, for kernels that walk a
/// ladder from most to least capable instead of re-deriving the ranking
/// on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Scalar,
    Sse2,
    Ssse3,
    Avx,
    Avx2,
    Avx512F,
    Avx512Bw,
}

impl CapabilityDescriptor {
    /// All tiers disabled. Useful as a baseline for tests and for any
    /// non-x86_64 target, where no SIMD path is ever eligible.
    pub fn none() -> Self {
        Self::default()
    }

    /// All tiers enabled, irrespective of hardware. For benchmarks and
    /// tests that want to force the widest kernel without probing the CPU.
    pub fn all() -> Self {
        CapabilityDescriptor {
            sse2: true,
            ssse3: true,
            avx: true,
            avx2: true,
            avx512f: true,
            avx512bw: true,
        }
    }

    /// Probe the running CPU for actual SIMD support.
    ///
    /// On non-x86_64 targets this always returns `none()`; every bulk
    /// kernel falls back to the scalar path.
    #[cfg(target_arch = "x86_64")]
    pub fn detect() -> Self {
        let descriptor = CapabilityDescriptor {
            sse2: is_x86_feature_detected!("sse2"),
            ssse3: is_x86_feature_detected!("ssse3"),
            avx: is_x86_feature_detected!("avx"),
            avx2: is_x86_feature_detected!("avx2"),
            avx512f: is_x86_feature_detected!("avx512f"),
            avx512bw: is_x86_feature_detected!("avx512bw"),
        };
        tracing::trace!(
            sse2 = descriptor.sse2,
            ssse3 = descriptor.ssse3,
            avx = descriptor.avx,
            avx2 = descriptor.avx2,
            avx512f = descriptor.avx512f,
            avx512bw = descriptor.avx512bw,
            "detected CPU SIMD capabilities"
        );
        descriptor
    }

    #[cfg(not(target_arch = "x86_64"))]
    pub fn detect() -> Self {
        tracing::trace!("non-x86_64 target: SIMD capabilities all disabled");
        Self::none()
    }

    /// Elementwise AND against another descriptor: a tier is allowed only
    /// if both descriptors allow it. Used to intersect "what the hardware
    /// supports" with "what the caller has opted into".
    pub fn constrained_by(&self, allow: &CapabilityDescriptor) -> Self {
        CapabilityDescriptor {
            sse2: self.sse2 && allow.sse2,
            ssse3: self.ssse3 && allow.ssse3,
            avx: self.avx && allow.avx,
            avx2: self.avx2 && allow.avx2,
            avx512f: self.avx512f && allow.avx512f,
            avx512bw: self.avx512bw && allow.avx512bw,
        }
    }

    /// The highest tier this descriptor allows. Bulk kernels walk this
    /// ranking from the top down to pick their implementation.
    pub fn highest_allowed(&self) -> Tier {
        if self.avx512bw {
            Tier::Avx512Bw
        } else if self.avx512f {
            Tier::Avx512F
        } else if self.avx2 {
            Tier::Avx2
        } else if self.avx {
            Tier::Avx
        } else if self.ssse3 {
            Tier::Ssse3
        } else if self.sse2 {
            Tier::Sse2
        } else {
            Tier::Scalar
        }
    }
}

impl fmt::Display for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tiers = Vec::new();
        if self.sse2 {
            tiers.push("sse2");
        }
        if self.ssse3 {
            tiers.push("ssse3");
        }
        if self.avx {
            tiers.push("avx");
        }
        if self.avx2 {
            tiers.push("avx2");
        }
        if self.avx512f {
            tiers.push("avx512f");
        }
        if self.avx512bw {
            tiers.push("avx512bw");
        }
        if tiers.is_empty() {
            write!(f, "scalar-only")
        } else {
            write!(f, "{}", tiers.join("+"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_allows_nothing() {
        let d = CapabilityDescriptor::none();
        assert_eq!(d.highest_allowed(), Tier::Scalar);
        assert_eq!(d.to_string(), "scalar-only");
    }

    #[test]
    fn all_allows_everything() {
        let d = CapabilityDescriptor::all();
        assert_eq!(d.highest_allowed(), Tier::Avx512Bw);
    }

    #[test]
    fn constrained_by_is_elementwise_and() {
        let hw = CapabilityDescriptor::all();
        let mut allow = CapabilityDescriptor::none();
        allow.avx2 = true;
        allow.sse2 = true;
        let effective = hw.constrained_by(&allow);
        assert!(effective.avx2);
        assert!(effective.sse2);
        assert!(!effective.avx512bw);
        assert_eq!(effective.highest_allowed(), Tier::Avx2);
    }

    #[test]
    fn highest_tier_does_not_imply_lower_tiers() {
        // A descriptor with only avx512bw set does not mean avx2 is usable:
        // each field is independent and kernels must check their own tier,
        // not assume "highest allowed" implies every lower one is also set.
        let mut d = CapabilityDescriptor::none();
        d.avx512bw = true;
        assert!(!d.avx2);
        assert_eq!(d.highest_allowed(), Tier::Avx512Bw);
    }
}
