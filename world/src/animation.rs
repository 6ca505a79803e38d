//! Tool animations modelled as step machines advanced once per tick.

use std::time::Duration;

use homestead_core::ToolKind;

/// Phase of a three-part tool motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationPhase {
    /// The tool swings or tilts toward the crop.
    Strike,
    /// The tool holds its pose.
    Hold,
    /// The tool returns to rest.
    Recover,
}

#[derive(Clone, Copy, Debug)]
struct PhaseSpec {
    phase: AnimationPhase,
    share: f32,
    from_degrees: f32,
    to_degrees: f32,
}

const HARVEST_PHASES: [PhaseSpec; 3] = [
    PhaseSpec {
        phase: AnimationPhase::Strike,
        share: 0.5,
        from_degrees: 45.0,
        to_degrees: -45.0,
    },
    PhaseSpec {
        phase: AnimationPhase::Hold,
        share: 0.2,
        from_degrees: -45.0,
        to_degrees: -45.0,
    },
    PhaseSpec {
        phase: AnimationPhase::Recover,
        share: 0.3,
        from_degrees: -45.0,
        to_degrees: 45.0,
    },
];

const WATERING_PHASES: [PhaseSpec; 3] = [
    PhaseSpec {
        phase: AnimationPhase::Strike,
        share: 0.3,
        from_degrees: 0.0,
        to_degrees: -60.0,
    },
    PhaseSpec {
        phase: AnimationPhase::Hold,
        share: 0.4,
        from_degrees: -60.0,
        to_degrees: -60.0,
    },
    PhaseSpec {
        phase: AnimationPhase::Recover,
        share: 0.3,
        from_degrees: -60.0,
        to_degrees: 0.0,
    },
];

const fn phases(tool: ToolKind) -> &'static [PhaseSpec; 3] {
    match tool {
        ToolKind::Harvest => &HARVEST_PHASES,
        ToolKind::Watering => &WATERING_PHASES,
    }
}

/// Running tool animation attached to a crop.
///
/// [`ToolAnimation::advance`] reports completion exactly once, on the call
/// that carries the elapsed time past the total duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolAnimation {
    tool: ToolKind,
    duration: Duration,
    elapsed: Duration,
    finished: bool,
}

impl ToolAnimation {
    /// Starts an animation of the tool lasting `duration`.
    #[must_use]
    pub const fn new(tool: ToolKind, duration: Duration) -> Self {
        Self {
            tool,
            duration,
            elapsed: Duration::ZERO,
            finished: false,
        }
    }

    /// Tool being animated.
    #[must_use]
    pub const fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Total length of the animation.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Time played so far.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Reports whether the animation still blocks interaction.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        !self.finished
    }

    /// Fraction of the animation played, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Phase currently playing, or `None` once finished.
    #[must_use]
    pub fn phase(&self) -> Option<AnimationPhase> {
        if self.finished {
            return None;
        }
        Some(self.locate().0.phase)
    }

    /// Tool angle in degrees, interpolated within the current phase.
    #[must_use]
    pub fn tool_angle(&self) -> f32 {
        let (spec, local) = self.locate();
        spec.from_degrees + (spec.to_degrees - spec.from_degrees) * local
    }

    /// Advances the animation, returning `true` on the call that completes it.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.finished {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
        if self.elapsed >= self.duration {
            self.finished = true;
            return true;
        }
        false
    }

    fn locate(&self) -> (PhaseSpec, f32) {
        let specs = phases(self.tool);
        let progress = self.progress();
        let mut start = 0.0;
        for spec in specs.iter() {
            let end = start + spec.share;
            if progress < end {
                let local = if spec.share > 0.0 {
                    (progress - start) / spec.share
                } else {
                    1.0
                };
                return (*spec, local.clamp(0.0, 1.0));
            }
            start = end;
        }
        (specs[2], 1.0)
    }
}
