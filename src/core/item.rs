//! Content payloads, per-surface options, and materialized items.

use crate::core::condition::Condition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Identity of a schedulable item: payload id plus the surface and variant
/// of its chosen option. Two items with the same identity are the same item
/// for reconciliation, storage counters, and history purposes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct ItemIdentity {
    pub id: String,
    pub surface: String,
    pub variant: String,
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.id, self.surface, self.variant)
    }
}

/// Per (surface, variant) presentation policy.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct OptionPolicy {
    /// Named display location in the host application.
    pub surface: String,
    /// Presentation variant within the surface.
    pub variant: String,
    /// Ordinal in a multi-step reveal; staged items sort before unstaged.
    pub stage: Option<u32>,
    /// Stop showing after this many impressions.
    pub max_impressions: Option<u32>,
    /// Minimum minutes between showings.
    pub cooldown_minutes: Option<i64>,
    /// Whether the user may dismiss the presentation.
    pub is_dismissible: bool,
    /// Exempt from caps, cooldowns, and dismissal while eligible.
    pub always_on_if_eligible: bool,
}

impl OptionPolicy {
    /// Policy with no stage, caps, or cooldown; dismissible by default.
    pub fn new<S: Into<String>, V: Into<String>>(surface: S, variant: V) -> Self {
        Self {
            surface: surface.into(),
            variant: variant.into(),
            stage: None,
            max_impressions: None,
            cooldown_minutes: None,
            is_dismissible: true,
            always_on_if_eligible: false,
        }
    }

    pub fn stage(mut self, stage: u32) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn max_impressions(mut self, cap: u32) -> Self {
        self.max_impressions = Some(cap);
        self
    }

    pub fn cooldown_minutes(mut self, minutes: i64) -> Self {
        self.cooldown_minutes = Some(minutes);
        self
    }

    pub fn dismissible(mut self, is_dismissible: bool) -> Self {
        self.is_dismissible = is_dismissible;
        self
    }

    pub fn always_on(mut self) -> Self {
        self.always_on_if_eligible = true;
        self
    }
}

/// Content envelope produced by the content source.
///
/// Immutable once materialized; a superseding payload replaces it wholesale.
/// `metadata` carries opaque host strings compared only for change detection.
///
/// # Example
///
/// ```rust
/// use billboard::core::{Condition, OptionPolicy, Payload};
///
/// let payload = Payload::with_id("spring-sale", 10, Condition::always())
///     .option(OptionPolicy::new("home_banner", "standard").max_impressions(3))
///     .metadata("headline", "Spring sale is on");
///
/// assert_eq!(payload.options.len(), 1);
/// assert_eq!(payload.metadata.get("headline").map(String::as_str), Some("Spring sale is on"));
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Payload {
    /// Globally unique content id.
    pub id: String,
    /// Higher wins when scheduling.
    pub priority: i32,
    /// Opaque host metadata, compared only for change detection.
    pub metadata: BTreeMap<String, String>,
    /// Eligibility gate shared by all of the payload's options.
    pub condition: Condition,
    /// Per (surface, variant) policies this payload can materialize into.
    pub options: Vec<OptionPolicy>,
}

impl Payload {
    /// Payload with a freshly minted UUID v4 id.
    pub fn new(priority: i32, condition: Condition) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), priority, condition)
    }

    /// Payload with a caller-supplied id.
    pub fn with_id<I: Into<String>>(id: I, priority: i32, condition: Condition) -> Self {
        Self {
            id: id.into(),
            priority,
            metadata: BTreeMap::new(),
            condition,
            options: Vec::new(),
        }
    }

    /// Append an option policy.
    pub fn option(mut self, option: OptionPolicy) -> Self {
        self.options.push(option);
        self
    }

    /// Insert one metadata entry.
    pub fn metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A payload bound to one chosen option: the unit the pipeline schedules.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Item {
    pub payload: Payload,
    pub option: OptionPolicy,
}

impl Item {
    pub fn new(payload: Payload, option: OptionPolicy) -> Self {
        Self { payload, option }
    }

    /// Identity used for reconciliation, counters, and history.
    pub fn identity(&self) -> ItemIdentity {
        ItemIdentity {
            id: self.payload.id.clone(),
            surface: self.option.surface.clone(),
            variant: self.option.variant.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.payload.id
    }

    pub fn surface(&self) -> &str {
        &self.option.surface
    }

    pub fn priority(&self) -> i32 {
        self.payload.priority
    }

    pub fn condition(&self) -> &Condition {
        &self.payload.condition
    }
}
