//! Typed multi-producer, single-consumer queues used for commands flowing into
//! the frame loop and for results flowing back from worker threads.

use std::sync::mpsc;

pub struct EventSender<T> {
    tx: mpsc::Sender<T>,
}

pub struct EventReceiver<T> {
    rx: mpsc::Receiver<T>,
}

pub fn channel<T>() -> (EventSender<T>, EventReceiver<T>) {
    let (tx, rx) = mpsc::channel();
    (EventSender { tx }, EventReceiver { rx })
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> EventSender<T> {
    pub fn send(&self, event: T) -> Result<(), mpsc::SendError<T>> {
        self.tx.send(event)
    }
}

impl<T> EventReceiver<T> {
    /// Blocks for the next event. `None` once every sender is gone and the
    /// queue is empty, so a worker that died cannot hang the caller.
    pub fn wait(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Takes everything queued right now without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::channel;

    #[test]
    fn drain_returns_events_in_send_order() {
        let (tx, rx) = channel();
        let other = tx.clone();
        tx.send(1).expect("send");
        other.send(2).expect("send");
        tx.send(3).expect("send");

        assert_eq!(rx.drain(), vec![1, 2, 3]);
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn wait_delivers_queued_events_before_reporting_disconnect() {
        let (tx, rx) = channel::<u8>();
        tx.send(7).expect("send");
        drop(tx);

        assert_eq!(rx.wait(), Some(7));
        assert_eq!(rx.wait(), None);
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn events_cross_threads() {
        let (tx, rx) = channel();
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let tx = tx.clone();
                std::thread::spawn(move || tx.send(worker).expect("send"))
            })
            .collect();
        drop(tx);
        for handle in handles {
            handle.join().expect("sender thread");
        }

        let mut received: Vec<i32> = std::iter::from_fn(|| rx.wait()).collect();
        received.sort_unstable();
        assert_eq!(received, vec![0, 1, 2, 3]);
    }
}
