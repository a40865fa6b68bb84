//! One-shot notifications fired by the core for audio/UI layers
//!
//! Dispatch never blocks: events are queued during the frame and delivered to
//! registered handlers when the driver flushes.

use glam::Vec2;

use crate::sim::types::GadgetType;

/// Events raised by the simulation
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Springs broke this frame (aggregated per medium)
    Break { is_underwater: bool, count: u32 },
    /// Points were destroyed by a tool
    Destroy { is_underwater: bool, count: u32 },
    BombPlaced { gadget_type: GadgetType, is_underwater: bool },
    BombRemoved { gadget_type: GadgetType, is_underwater: bool },
    BombExplosion { gadget_type: GadgetType, is_underwater: bool, count: u32 },
    TimerBombFuse { is_underwater: bool },
    TimerBombDefused { is_underwater: bool },
    AntiMatterBombImploding,
    WaterTaken { quantity: f32 },
    AirBubbleSurfaced { count: u32 },
    TsunamiNotification { x: f32 },
    SilenceStarted,
    SilenceLifted,
    ThanosSnap { center: Vec2 },
}

/// Receives flushed events
pub trait GameEventHandler {
    fn on_game_event(&mut self, event: &GameEvent);
}

#[derive(Default)]
pub struct GameEventDispatcher {
    queue: Vec<GameEvent>,
    /// Break counts aggregated until flush: [above water, underwater]
    pending_breaks: [u32; 2],
    pending_water_taken: f32,
    handlers: Vec<Box<dyn GameEventHandler>>,
}

impl std::fmt::Debug for GameEventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEventDispatcher")
            .field("queue", &self.queue)
            .field("pending_breaks", &self.pending_breaks)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl GameEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_handler(&mut self, handler: Box<dyn GameEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn dispatch(&mut self, event: GameEvent) {
        self.queue.push(event);
    }

    pub fn on_break(&mut self, is_underwater: bool, count: u32) {
        self.pending_breaks[is_underwater as usize] += count;
    }

    pub fn on_water_taken(&mut self, quantity: f32) {
        self.pending_water_taken += quantity;
    }

    pub fn on_bomb_explosion(&mut self, gadget_type: GadgetType, is_underwater: bool, count: u32) {
        self.dispatch(GameEvent::BombExplosion {
            gadget_type,
            is_underwater,
            count,
        });
    }

    pub fn on_tsunami_notification(&mut self, x: f32) {
        self.dispatch(GameEvent::TsunamiNotification { x });
    }

    pub fn on_silence_started(&mut self) {
        self.dispatch(GameEvent::SilenceStarted);
    }

    pub fn on_silence_lifted(&mut self) {
        self.dispatch(GameEvent::SilenceLifted);
    }

    /// Events queued so far, excluding not-yet-aggregated ones
    pub fn pending(&self) -> &[GameEvent] {
        &self.queue
    }

    fn materialize_aggregates(&mut self) {
        for (is_underwater, count) in [(false, self.pending_breaks[0]), (true, self.pending_breaks[1])] {
            if count > 0 {
                self.queue.push(GameEvent::Break { is_underwater, count });
            }
        }
        self.pending_breaks = [0; 2];

        if self.pending_water_taken > 0.0 {
            self.queue.push(GameEvent::WaterTaken {
                quantity: self.pending_water_taken,
            });
            self.pending_water_taken = 0.0;
        }
    }

    /// Take all events, aggregates included
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.materialize_aggregates();
        std::mem::take(&mut self.queue)
    }

    /// Deliver all events to the registered handlers
    pub fn flush(&mut self) {
        let events = self.drain();
        for handler in &mut self.handlers {
            for event in &events {
                handler.on_game_event(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<GameEvent>>>);

    impl GameEventHandler for Recorder {
        fn on_game_event(&mut self, event: &GameEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn test_breaks_aggregate_per_medium() {
        let mut d = GameEventDispatcher::new();
        d.on_break(false, 2);
        d.on_break(false, 3);
        d.on_break(true, 1);
        assert!(d.pending().is_empty());

        let events = d.drain();
        assert_eq!(
            events,
            vec![
                GameEvent::Break { is_underwater: false, count: 5 },
                GameEvent::Break { is_underwater: true, count: 1 },
            ]
        );
        assert!(d.drain().is_empty());
    }

    #[test]
    fn test_flush_delivers_to_handlers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut d = GameEventDispatcher::new();
        d.register_handler(Box::new(Recorder(log.clone())));

        d.on_silence_started();
        d.on_tsunami_notification(12.0);
        d.flush();

        assert_eq!(
            *log.borrow(),
            vec![GameEvent::SilenceStarted, GameEvent::TsunamiNotification { x: 12.0 }]
        );
        assert!(d.pending().is_empty());
    }
}
