//! Animation construction: one linear sampler per node channel

use crate::buffer::{AccessorIndex, BufferBuilder};

/// Animated node property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Translation,
    Rotation,
}

/// Sampler output of one track
#[derive(Debug, Clone, PartialEq)]
pub enum TrackOutput {
    Translation(Vec<[f32; 3]>),
    Rotation(Vec<[f32; 4]>),
}

/// Packed accessors of one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAccessors {
    pub node: u32,
    pub property: Property,
    pub input: AccessorIndex,
    pub output: AccessorIndex,
}

/// Accessor indices for an animation
#[derive(Debug, Clone)]
pub struct AnimationAccessors {
    pub name: String,
    pub channels: Vec<ChannelAccessors>,
}

/// Builder for animation tracks
pub struct AnimationBuilder {
    name: String,
    tracks: Vec<(u32, Vec<f32>, TrackOutput)>,
}

impl AnimationBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tracks: Vec::new(),
        }
    }

    /// Add a track targeting `node`; `times` are seconds
    pub fn track(mut self, node: u32, times: Vec<f32>, output: TrackOutput) -> Self {
        self.tracks.push((node, times, output));
        self
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Build and pack into buffer
    pub fn build(self, buffer: &mut BufferBuilder) -> AnimationAccessors {
        let channels = self
            .tracks
            .iter()
            .map(|(node, times, output)| {
                let input = buffer.pack_times(times);
                let (property, output) = match output {
                    TrackOutput::Translation(v) => {
                        (Property::Translation, buffer.pack_sampler_output(v))
                    }
                    TrackOutput::Rotation(v) => (Property::Rotation, buffer.pack_sampler_output(v)),
                };
                ChannelAccessors {
                    node: *node,
                    property,
                    input,
                    output,
                }
            })
            .collect();

        AnimationAccessors {
            name: self.name,
            channels,
        }
    }
}
