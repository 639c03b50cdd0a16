//! IMTN animation container
//!
//! Same header shape as IMDL; the regions are dictionary, an unused block,
//! the u16 tick table, a second unused block and the f32 value table. Each
//! `nodK` record describes one channel of one bone.

use crate::cursor::ByteCursor;
use crate::error::{FormatError, Result};
use crate::section::{ContainerHeader, KeyframeRecord, Section, SectionScanner, VisibilityRecord};

pub const IMTN_MAGIC: &str = "IMTN";

/// Ticks per second of the tick table
pub const DEFAULT_FRAME_RATE: f32 = 24.0;

/// Absolute offsets of the IMTN data regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionOffsets {
    pub dictionary: usize,
    pub block1: usize,
    /// u16 ticks, addressed in u16 units
    pub times: usize,
    pub block3: usize,
    /// f32 values, addressed in f32 units
    pub values: usize,
}

impl From<&ContainerHeader> for MotionOffsets {
    fn from(header: &ContainerHeader) -> Self {
        let [dictionary, block1, times, block3, values] = header.regions.map(|r| r as usize);
        Self {
            dictionary,
            block1,
            times,
            block3,
            values,
        }
    }
}

/// Animated property of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Translation,
    Rotation,
}

impl ChannelKind {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            2 => Ok(Self::Translation),
            14 => Ok(Self::Rotation),
            _ => Err(FormatError::UnsupportedVariant {
                what: "animation channel",
                value: code,
            }),
        }
    }
}

/// Keyframe values of a track
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValues {
    Translation(Vec<[f32; 3]>),
    /// Quaternions, xyzw
    Rotation(Vec<[f32; 4]>),
}

impl ChannelValues {
    pub fn kind(&self) -> ChannelKind {
        match self {
            ChannelValues::Translation(_) => ChannelKind::Translation,
            ChannelValues::Rotation(_) => ChannelKind::Rotation,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChannelValues::Translation(v) => v.len(),
            ChannelValues::Rotation(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sampled curve of one bone channel; `times.len() == values.len()`
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTrack {
    pub bone: String,
    /// Seconds
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

/// A parsed IMTN file borrowing the raw bytes
#[derive(Debug, Clone)]
pub struct Motion<'a> {
    data: &'a [u8],
    pub header: ContainerHeader,
    pub offsets: MotionOffsets,
    pub keyframes: Vec<KeyframeRecord>,
    pub visibility: Vec<VisibilityRecord>,
}

impl<'a> Motion<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = ContainerHeader::parse(data, IMTN_MAGIC)?;
        let offsets = MotionOffsets::from(&header);
        let mut keyframes = Vec::new();
        let mut visibility = Vec::new();

        for section in SectionScanner::for_container(data, &header)? {
            match section? {
                Section::Keyframes(k) => keyframes = k,
                Section::Visibility(v) => visibility = v,
                Section::Unknown(_) => {}
                other => {
                    tracing::debug!(kind = other.kind(), "ignoring model section in motion");
                }
            }
        }

        tracing::debug!(
            keyframes = keyframes.len(),
            visibility = visibility.len(),
            "parsed IMTN"
        );
        Ok(Self {
            data,
            header,
            offsets,
            keyframes,
            visibility,
        })
    }

    /// Decode one keyframe record
    pub fn track(&self, record: &KeyframeRecord, frame_rate: f32) -> Result<AnimationTrack> {
        let kind = ChannelKind::from_code(record.channel)?;
        let count = record.keyframe_count as usize;

        let ticks = ByteCursor::at(self.data, self.offsets.times + record.time_offset as usize * 2)?
            .read_u16_vec(count)?;
        let times = ticks.iter().map(|&t| t as f32 / frame_rate).collect();

        let mut values =
            ByteCursor::at(self.data, self.offsets.values + record.value_offset as usize * 4)?;
        let values = match kind {
            ChannelKind::Translation => ChannelValues::Translation(values.read_f32_vecs::<3>(count)?),
            ChannelKind::Rotation => ChannelValues::Rotation(values.read_f32_vecs::<4>(count)?),
        };

        Ok(AnimationTrack {
            bone: record.bone.clone(),
            times,
            values,
        })
    }

    /// Decode every track with a supported channel
    ///
    /// Records with other channel codes are dropped with a warning.
    pub fn tracks(&self, frame_rate: f32) -> Result<Vec<AnimationTrack>> {
        let mut tracks = Vec::with_capacity(self.keyframes.len());
        for record in &self.keyframes {
            match self.track(record, frame_rate) {
                Ok(track) => tracks.push(track),
                Err(err @ FormatError::UnsupportedVariant { .. }) => {
                    tracing::warn!(bone = %record.bone, "dropping track: {err}");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(tracks)
    }
}
