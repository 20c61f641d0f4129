//! ReinforcementUpdater - folds one decision into a new identity version.
//!
//! The rule is closed-form and applied per event:
//!
//! ```text
//! rate      = base_rate / (1 + version)
//! w'        = clamp(w + rate * delta(action) * w_item, -1, 1)
//! stability = 1 - min(1, |w' - w| / stability_distance_scale)
//! ```
//!
//! Order matters. A sequence of events must be folded left to right; there
//! is no batch shortcut.

use crate::domain::foundation::Timestamp;
use crate::domain::taste::{DecisionAction, DecisionEvent, ItemAttributes, TasteIdentity};

use super::ReinforcementTuning;

/// Stateless update service.
#[derive(Debug, Clone, Default)]
pub struct ReinforcementUpdater {
    tuning: ReinforcementTuning,
}

impl ReinforcementUpdater {
    pub fn new(tuning: ReinforcementTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &ReinforcementTuning {
        &self.tuning
    }

    /// Applies `event` to `identity`, stamping the result with the current time.
    pub fn apply(
        &self,
        identity: &TasteIdentity,
        event: &DecisionEvent,
        attributes: &ItemAttributes,
    ) -> TasteIdentity {
        self.apply_at(identity, event, attributes, Timestamp::now())
    }

    /// Applies `event` to `identity` with an explicit `updated_at`.
    ///
    /// The input is never touched; the returned identity owns an independent
    /// copy of the vector.
    pub fn apply_at(
        &self,
        identity: &TasteIdentity,
        event: &DecisionEvent,
        attributes: &ItemAttributes,
        updated_at: Timestamp,
    ) -> TasteIdentity {
        let previous = identity.vector();
        let mut vector = previous.clone();

        let rate = self.tuning.learning_rate(identity.version());
        let delta = self.tuning.signed_delta(event.action());

        for (axis, item_weight) in &attributes.weights {
            // axes outside the taxonomy are dropped here
            if let Some(current) = previous.weight(axis) {
                vector.set_weight(axis, current.value() + rate * delta * item_weight.value());
            }
        }

        let tags = attributes.normalized_tags();
        match event.action() {
            DecisionAction::NotForMe => vector.avoids_mut().extend(tags.iter().map(String::as_str)),
            DecisionAction::Bought => {
                vector.influences_mut().extend(tags.iter().map(String::as_str))
            }
            DecisionAction::Aligned => {}
        }

        let stability = self.stability(previous.distance(&vector));

        identity.next_revision(vector, stability, updated_at)
    }

    /// Folds `events` left to right, each with its own item attributes.
    pub fn apply_all<'a>(
        &self,
        identity: &TasteIdentity,
        events: impl IntoIterator<Item = (&'a DecisionEvent, &'a ItemAttributes)>,
    ) -> TasteIdentity {
        events
            .into_iter()
            .fold(identity.clone(), |current, (event, attributes)| {
                self.apply_at(&current, event, attributes, event.occurred_at())
            })
    }

    fn stability(&self, distance: f64) -> f64 {
        let scale = self.tuning.stability_distance_scale;
        if !(distance.is_finite() && scale > 0.0) {
            return 0.0;
        }
        1.0 - (distance / scale).min(1.0)
    }
}
