use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::presentation::domain::display::{DisplayCommand, DisplaySink};

/// Single-slot channel from the capture worker to the display owner.
///
/// Publishing never blocks: if the consumer has not picked up the previous
/// command yet, that command is discarded and replaced.
pub struct LatestDisplaySender {
    tx: Sender<DisplayCommand>,
    evict: Receiver<DisplayCommand>,
}

pub fn display_channel() -> (LatestDisplaySender, Receiver<DisplayCommand>) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let sender = LatestDisplaySender {
        tx,
        evict: rx.clone(),
    };
    (sender, rx)
}

impl DisplaySink for LatestDisplaySender {
    fn publish(&self, command: DisplayCommand) {
        let mut pending = command;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    if self.evict.try_recv().is_ok() {
                        log::trace!("Display behind; dropped stale frame");
                    }
                    pending = back;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::domain::display::TextStyle;
    use image::RgbImage;

    fn show(text: &str) -> DisplayCommand {
        DisplayCommand::Show {
            image: RgbImage::new(2, 2),
            text: text.to_string(),
            style: TextStyle::Detected,
        }
    }

    #[test]
    fn test_consumer_keeping_up_sees_every_command() {
        let (tx, rx) = display_channel();
        tx.publish(show("a"));
        assert_eq!(rx.try_recv().unwrap(), show("a"));
        tx.publish(DisplayCommand::Clear);
        assert_eq!(rx.try_recv().unwrap(), DisplayCommand::Clear);
    }

    #[test]
    fn test_last_write_wins_when_consumer_is_behind() {
        let (tx, rx) = display_channel();
        tx.publish(show("1"));
        tx.publish(show("2"));
        tx.publish(show("3"));
        assert_eq!(rx.try_recv().unwrap(), show("3"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_from_worker_thread() {
        let (tx, rx) = display_channel();
        let handle = std::thread::spawn(move || {
            for i in 0..50 {
                tx.publish(show(&i.to_string()));
            }
            tx.publish(DisplayCommand::Clear);
        });
        handle.join().unwrap();
        let last = rx.try_iter().last().unwrap();
        assert_eq!(last, DisplayCommand::Clear);
    }
}
