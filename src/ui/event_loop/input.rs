use tracing::debug;

use super::Channels;
use crate::input::decoder::KeyDecoder;

pub(super) async fn run_input_loop(mut decoder: KeyDecoder, channels: Channels) {
    debug!("Input loop started");

    while !channels.is_exiting() {
        match decoder.next_key().await {
            Ok(Some(token)) => channels.enqueue_key(token),
            Ok(None) => {}
            Err(err) => channels.report_error(err),
        }
    }

    debug!("Input loop stopped");
}
