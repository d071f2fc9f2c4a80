//! Domain layer: boost records, the per-category registry, and events.
//!
//! This module contains the scheduler's domain model: business identity,
//! category slugs, boost records with their pending queues, the event bus
//! for broadcasting lifecycle transitions, and the partitioned registry
//! that serializes mutations per category.

pub mod boost_event;
pub mod boost_record;
pub mod boost_registry;
pub mod business_id;
pub mod category;
pub mod event_bus;

pub use boost_event::{BoostEvent, PromotionSource};
pub use boost_record::{BoostRecord, BoostWindow, QueuedBoost};
pub use boost_registry::{BoostRegistry, CategoryShard};
pub use business_id::BusinessId;
pub use category::CategorySlug;
pub use event_bus::EventBus;
