use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError};

/// What a [CompletionReceiver] has seen so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Completion {
    Pending,
    Finished(f32),
    Cancelled,
}

/// Render-thread end of the completion channel; delivers at most one fps value.
pub struct CompletionSender {
    sender: Option<SyncSender<f32>>,
}

/// Controller end of the completion channel.
pub struct CompletionReceiver {
    receiver: Receiver<f32>,
    received: Option<f32>,
}

/// Creates a single-shot channel carrying the average fps of a finished run.
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    let (sender, receiver) = sync_channel(1);
    (
        CompletionSender {
            sender: Some(sender),
        },
        CompletionReceiver {
            receiver,
            received: None,
        },
    )
}

impl CompletionSender {
    /// Sends `fps` the first time; later calls do nothing and return `false`.
    pub fn complete(&mut self, fps: f32) -> bool {
        match self.sender.take() {
            Some(sender) => sender.try_send(fps).is_ok(),
            None => false,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.sender.is_none()
    }
}

impl CompletionReceiver {
    /// Checks for the result without blocking.
    pub fn poll(&mut self) -> Completion {
        if let Some(fps) = self.received {
            return Completion::Finished(fps);
        }
        match self.receiver.try_recv() {
            Ok(fps) => {
                self.received = Some(fps);
                Completion::Finished(fps)
            }
            Err(TryRecvError::Empty) => Completion::Pending,
            Err(TryRecvError::Disconnected) => Completion::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn delivers_across_threads() {
        let (mut sender, mut receiver) = completion_channel();
        assert_eq!(receiver.poll(), Completion::Pending);
        let handle = thread::spawn(move || {
            let first = sender.complete(30.0);
            let second = sender.complete(12.0);
            (first, second)
        });
        assert_eq!(handle.join().unwrap(), (true, false));
        assert_eq!(receiver.poll(), Completion::Finished(30.0));
        assert_eq!(receiver.poll(), Completion::Finished(30.0));
    }

    #[test]
    fn dropped_sender_cancels() {
        let (sender, mut receiver) = completion_channel();
        drop(sender);
        assert_eq!(receiver.poll(), Completion::Cancelled);
    }
}
