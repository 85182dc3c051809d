//! Ordered segment timeline handed to the assembler.
//!
//! A non-empty timeline always starts and ends with a clip and holds exactly
//! one silence between consecutive clips, so `N` clips give `2N - 1`
//! segments. The only way to build one is [`Timeline::interleave`], which
//! makes the shape hold by construction.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clip::{ClipPlan, SilenceSpec};

/// A unit of the final timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Clip(ClipPlan),
    Silence(SilenceSpec),
}

impl Segment {
    /// Rendered length of this segment.
    pub fn length(&self) -> Duration {
        match self {
            Segment::Clip(clip) => clip.length,
            Segment::Silence(silence) => silence.length,
        }
    }

    pub fn as_clip(&self) -> Option<&ClipPlan> {
        match self {
            Segment::Clip(clip) => Some(clip),
            Segment::Silence(_) => None,
        }
    }

    pub fn is_silence(&self) -> bool {
        matches!(self, Segment::Silence(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    /// Timeline with nothing to render.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lay `clips` out in the given order with `silence` between each pair.
    pub fn interleave(clips: Vec<ClipPlan>, silence: SilenceSpec) -> Self {
        let mut segments = Vec::with_capacity(clips.len().saturating_mul(2).saturating_sub(1));

        for (i, clip) in clips.into_iter().enumerate() {
            if i > 0 {
                segments.push(Segment::Silence(silence));
            }
            segments.push(Segment::Clip(clip));
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Clips in playback order.
    pub fn clips(&self) -> impl Iterator<Item = &ClipPlan> {
        self.segments.iter().filter_map(Segment::as_clip)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of every segment's length.
    pub fn total_duration(&self) -> Duration {
        self.segments.iter().map(Segment::length).sum()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{FetchedMedia, MediaDescriptor};

    fn clip(id: &str, secs: u64) -> ClipPlan {
        ClipPlan {
            source: FetchedMedia::new(
                MediaDescriptor::new(id, id),
                format!("/tmp/{id}.mp4"),
                Duration::from_secs(secs),
            ),
            start_offset: Duration::ZERO,
            length: Duration::from_secs(secs),
        }
    }

    #[test]
    fn test_interleave_empty() {
        let timeline = Timeline::interleave(Vec::new(), SilenceSpec::new(Duration::from_secs(1)));
        assert!(timeline.is_empty());
        assert_eq!(timeline, Timeline::empty());
    }

    #[test]
    fn test_interleave_single_clip_has_no_silence() {
        let timeline = Timeline::interleave(vec![clip("a", 5)], SilenceSpec::new(Duration::from_secs(1)));
        assert_eq!(timeline.len(), 1);
        assert!(!timeline.segments()[0].is_silence());
    }

    #[test]
    fn test_interleave_alternates() {
        let silence = SilenceSpec::new(Duration::from_secs(1));
        let timeline = Timeline::interleave(vec![clip("a", 5), clip("b", 6), clip("c", 7)], silence);

        assert_eq!(timeline.len(), 5);
        for (i, segment) in timeline.segments().iter().enumerate() {
            assert_eq!(segment.is_silence(), i % 2 == 1, "segment {i}");
        }
        let ids: Vec<_> = timeline.clips().map(|c| c.source.id().to_string()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(timeline.total_duration(), Duration::from_secs(20));
    }
}
