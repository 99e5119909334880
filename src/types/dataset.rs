//! Raw recordings: named sensor channels grouped into a dataset

use serde::{Deserialize, Serialize};

/// Column-name prefix that marks a sensor channel.
pub const SENSOR_PREFIX: &str = "sensor";

/// One physical sensor's samples at a uniform sampling rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorChannel {
    /// Normalized column name (e.g. "sensor1")
    pub name: String,
    pub samples: Vec<f64>,
}

impl SensorChannel {
    pub fn new(name: impl Into<String>, samples: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    /// True when the name starts with "sensor", ignoring case.
    pub fn is_sensor(&self) -> bool {
        is_sensor_name(&self.name)
    }
}

/// Check whether a column name denotes a sensor channel.
pub fn is_sensor_name(name: &str) -> bool {
    name.get(..SENSOR_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SENSOR_PREFIX))
}

/// A recording: channels in input column order.
///
/// Channels are assumed (not enforced) to share sample count and rate.
/// Inserting a channel whose name already exists replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    channels: Vec<SensorChannel>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a channel.
    pub fn insert(&mut self, name: impl Into<String>, samples: Vec<f64>) {
        let name = name.into();
        if let Some(existing) = self.channels.iter_mut().find(|c| c.name == name) {
            existing.samples = samples;
        } else {
            self.channels.push(SensorChannel { name, samples });
        }
    }

    /// Builder-style [`Dataset::insert`].
    #[must_use]
    pub fn with_channel(mut self, name: impl Into<String>, samples: Vec<f64>) -> Self {
        self.insert(name, samples);
        self
    }

    pub fn channel(&self, name: &str) -> Option<&SensorChannel> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn samples(&self, name: &str) -> Option<&[f64]> {
        self.channel(name).map(|c| c.samples.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channel(name).is_some()
    }

    pub fn channels(&self) -> &[SensorChannel] {
        &self.channels
    }

    /// All channel names in column order.
    pub fn names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name.clone()).collect()
    }

    /// Names of the sensor channels, in column order.
    pub fn sensor_names(&self) -> Vec<String> {
        self.channels
            .iter()
            .filter(|c| c.is_sensor())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl FromIterator<SensorChannel> for Dataset {
    fn from_iter<I: IntoIterator<Item = SensorChannel>>(iter: I) -> Self {
        let mut dataset = Self::new();
        for channel in iter {
            dataset.insert(channel.name, channel.samples);
        }
        dataset
    }
}
