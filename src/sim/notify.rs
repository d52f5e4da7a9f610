//! Transient on-screen messages
//!
//! At most `MAX_NOTIFICATIONS` are shown; pushing past the cap drops the
//! oldest. Offsets are restacked whenever the set changes so the survivors
//! close the gap left by an expired message.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
    pub color: [u8; 3],
    pub life_ms: f32,
    pub max_life_ms: f32,
    /// Vertical screen offset from the top of the message stack
    pub offset: f32,
}

impl Notification {
    /// Fade out over the last quarter of its life
    pub fn alpha(&self) -> f32 {
        let fade = self.max_life_ms * 0.25;
        if fade <= 0.0 {
            return 1.0;
        }
        (self.life_ms / fade).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn push(&mut self, text: impl Into<String>, color: [u8; 3]) {
        let text = text.into();
        log::info!("{}", text);
        self.items.push(Notification {
            text,
            color,
            life_ms: NOTIFICATION_LIFE_MS,
            max_life_ms: NOTIFICATION_LIFE_MS,
            offset: 0.0,
        });
        if self.items.len() > MAX_NOTIFICATIONS {
            let excess = self.items.len() - MAX_NOTIFICATIONS;
            self.items.drain(..excess);
        }
        self.restack();
    }

    /// Age every message by `dt_ms` and drop the expired ones
    pub fn update(&mut self, dt_ms: f32) {
        let before = self.items.len();
        for item in &mut self.items {
            item.life_ms -= dt_ms;
        }
        self.items.retain(|n| n.life_ms > 0.0);
        if self.items.len() != before {
            self.restack();
        }
    }

    fn restack(&mut self) {
        for (i, item) in self.items.iter_mut().enumerate() {
            item.offset = i as f32 * NOTIFICATION_SPACING;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_drops_oldest() {
        let mut notes = Notifications::default();
        for i in 0..(MAX_NOTIFICATIONS + 2) {
            notes.push(format!("msg {i}"), [255, 255, 255]);
        }
        assert_eq!(notes.len(), MAX_NOTIFICATIONS);
        assert_eq!(notes.iter().next().map(|n| n.text.as_str()), Some("msg 2"));
    }

    #[test]
    fn test_expiry_restacks_offsets() {
        let mut notes = Notifications::default();
        notes.push("old", [255, 255, 255]);
        notes.update(NOTIFICATION_LIFE_MS - 100.0);
        notes.push("new", [255, 255, 255]);
        let offsets: Vec<f32> = notes.iter().map(|n| n.offset).collect();
        assert_eq!(offsets, vec![0.0, NOTIFICATION_SPACING]);

        notes.update(200.0);
        assert_eq!(notes.len(), 1);
        let first = notes.iter().next().cloned();
        assert_eq!(first.as_ref().map(|n| n.text.as_str()), Some("new"));
        assert_eq!(first.map(|n| n.offset), Some(0.0));
    }

    #[test]
    fn test_alpha_fades_at_end() {
        let mut notes = Notifications::default();
        notes.push("x", [0, 0, 0]);
        let fresh = notes.iter().next().map(|n| n.alpha());
        assert_eq!(fresh, Some(1.0));
        notes.update(NOTIFICATION_LIFE_MS * 0.875);
        let fading = notes.iter().next().map(|n| n.alpha()).unwrap_or(0.0);
        assert!((fading - 0.5).abs() < 1e-3);
    }
}
