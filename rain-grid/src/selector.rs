//! Channel selection: which matrix columns are rainfall channels.

use crate::channel::Channel;
use log::debug;

/// Return the ordered subset of `labels` that parse as `"<number>,<number>"`.
///
/// Labels that do not parse are dropped; extra columns such as a
/// timestamp or station note are expected and are not an error.
pub fn select_channels<S: AsRef<str>>(labels: &[S]) -> Vec<Channel> {
    let mut channels = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.as_ref();
        match Channel::parse(label) {
            Some(channel) => channels.push(channel),
            None => debug!("selector: ignoring non-channel column {:?}", label),
        }
    }
    debug!(
        "selector: {} of {} columns are rainfall channels",
        channels.len(),
        labels.len()
    );
    channels
}
