use std::collections::VecDeque;
use std::time::{Duration, Instant};

use moongate_events::{HostAction, Location, MoveDestination, Serial};

/// One pending item relocation
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRequest {
    pub serial: Serial,
    pub destination: MoveDestination,
    /// 0 moves the whole stack
    pub amount: u16,
    pub position: Option<Location>,
}

impl MoveRequest {
    /// Move into a container, letting the host choose where it lands
    pub fn to_container(serial: Serial, container: Serial) -> Self {
        Self {
            serial,
            destination: MoveDestination::Container { serial: container },
            amount: 0,
            position: None,
        }
    }

    /// Drop on the ground at an absolute location
    pub fn to_ground(serial: Serial, location: Location, osi: bool) -> Self {
        Self {
            serial,
            destination: MoveDestination::Ground { osi },
            amount: 0,
            position: Some(location),
        }
    }

    pub fn amount(mut self, amount: u16) -> Self {
        self.amount = amount;
        self
    }

    /// Place at `x, y` inside the destination container
    pub fn at(mut self, x: u16, y: u16) -> Self {
        self.position = Some(Location::new(x, y, 0));
        self
    }

    pub fn to_action(&self) -> HostAction {
        HostAction::MoveItem {
            serial: self.serial,
            destination: self.destination,
            amount: self.amount,
            position: self.position,
        }
    }
}

/// A script's private FIFO of relocations
#[derive(Debug, Default)]
pub struct MoveQueue {
    entries: VecDeque<MoveRequest>,
}

impl MoveQueue {
    pub fn push(&mut self, request: MoveRequest) {
        self.entries.push_back(request);
    }

    pub fn pop(&mut self) -> Option<MoveRequest> {
        self.entries.pop_front()
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Minimum gap between relocations, shared by every script
#[derive(Debug)]
pub struct MovePacer {
    interval: Duration,
    last_move: Option<Instant>,
}

impl MovePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_move: None,
        }
    }

    pub fn ready(&self, now: Instant) -> bool {
        match self.last_move {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    pub fn mark(&mut self, now: Instant) {
        self.last_move = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = MoveQueue::default();
        for serial in 1..=3 {
            queue.push(MoveRequest::to_container(Serial(serial), Serial(100)));
        }

        let order: Vec<u32> = std::iter::from_fn(|| queue.pop()).map(|r| r.serial.0).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_pacer_waits_full_interval() {
        let start = Instant::now();
        let mut pacer = MovePacer::new(Duration::from_millis(1000));
        assert!(pacer.ready(start));

        pacer.mark(start);
        assert!(!pacer.ready(start + Duration::from_millis(999)));
        assert!(pacer.ready(start + Duration::from_millis(1000)));
    }

    #[test]
    fn test_request_builders() {
        let request = MoveRequest::to_container(Serial(1), Serial(2)).amount(5).at(40, 60);
        assert_eq!(
            request.to_action(),
            HostAction::MoveItem {
                serial: Serial(1),
                destination: MoveDestination::Container { serial: Serial(2) },
                amount: 5,
                position: Some(Location::new(40, 60, 0)),
            }
        );
    }
}
