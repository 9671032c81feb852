//! Intent-to-action dispatch and reply generation.
//!
//! Every supported intent has one row in [`ACTION_TABLE`]: the slots it needs,
//! the prompt to send when they are missing, and a builder that turns filled
//! slots into an [`InventoryAction`]. Resolution is split into a pure planning
//! step ([`ActionResolver::plan`]) and an execution step that talks to the
//! inventory store. Neither step can fail the turn: every path ends in a reply.

use chrono::{Days, NaiveDate};
use medstock_core::clock::{Clock, SystemClock};
use medstock_core::domain::entity::{Entity, EntityKind};
use medstock_core::domain::intent::Intent;
use medstock_core::store::InventoryStore;
use thiserror::Error;
use tracing::{debug, warn};

use crate::context::DialogueContext;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const FALLBACK_REPLY: &str = "I'm not sure how to handle that request. Can you please rephrase?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotContract {
    /// No entities required.
    Nothing,
    /// First entity must be an item.
    Item,
    /// First entity must be a date.
    Date,
    /// First entity an item, second a quantity.
    ItemThenQuantity,
}

/// Entity text bound to the slots of a contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slots<'a> {
    Empty,
    Item(&'a str),
    Date(&'a str),
    ItemQuantity { item: &'a str, quantity: &'a str },
}

impl SlotContract {
    /// Binds entities by position. `None` means a required slot is absent or
    /// holds the wrong entity kind.
    pub fn fill<'a>(&self, entities: &'a [Entity]) -> Option<Slots<'a>> {
        match self {
            Self::Nothing => Some(Slots::Empty),
            Self::Item => entities
                .first()
                .filter(|entity| entity.is(&EntityKind::Item))
                .map(|entity| Slots::Item(entity.text.as_str())),
            Self::Date => entities
                .first()
                .filter(|entity| entity.is(&EntityKind::Date))
                .map(|entity| Slots::Date(entity.text.as_str())),
            Self::ItemThenQuantity => match entities {
                [item, quantity, ..]
                    if item.is(&EntityKind::Item) && quantity.is(&EntityKind::Quantity) =>
                {
                    Some(Slots::ItemQuantity { item: &item.text, quantity: &quantity.text })
                }
                _ => None,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InventoryAction {
    CheckStock { item: String },
    ReorderCheck,
    CheckExpiry { by: NaiveDate },
    SetAlert { item: String, threshold: i64 },
    UpdateStock { item: String, quantity: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Execute(InventoryAction),
    Clarify(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolutionFailure {
    #[error("intent `{0}` has no action")]
    UnsupportedIntent(Intent),
    #[error("required slots missing for `{0}`")]
    MissingSlots(Intent),
    #[error("quantity `{text}` for `{intent}` is not a whole number")]
    InvalidQuantity { intent: Intent, text: String },
}

impl ResolutionFailure {
    pub fn reply(&self) -> String {
        match self {
            Self::UnsupportedIntent(_) => FALLBACK_REPLY.to_string(),
            Self::MissingSlots(intent) => clarification_for(*intent).to_string(),
            Self::InvalidQuantity { intent, text } => {
                format!("\"{text}\" is not a valid quantity. {}", clarification_for(*intent))
            }
        }
    }
}

/// Inputs an action builder may need besides the slots.
#[derive(Clone, Copy, Debug)]
pub struct PlanContext {
    pub today: NaiveDate,
    pub expiry_default_days: u32,
}

pub struct ActionSpec {
    pub intent: Intent,
    pub contract: SlotContract,
    pub clarification: &'static str,
    build: fn(Slots<'_>, &PlanContext) -> Result<InventoryAction, ResolutionFailure>,
}

pub static ACTION_TABLE: [ActionSpec; 5] = [
    ActionSpec {
        intent: Intent::CheckStock,
        contract: SlotContract::Item,
        clarification: "Which item would you like to check?",
        build: build_check_stock,
    },
    ActionSpec {
        intent: Intent::ReorderCheck,
        contract: SlotContract::Nothing,
        clarification: "",
        build: build_reorder_check,
    },
    ActionSpec {
        intent: Intent::CheckExpiry,
        contract: SlotContract::Date,
        clarification: "For which date would you like to check expiring items? (Format: YYYY-MM-DD)",
        build: build_check_expiry,
    },
    ActionSpec {
        intent: Intent::SetAlert,
        contract: SlotContract::ItemThenQuantity,
        clarification: "Please specify the item and quantity for the alert.",
        build: build_set_alert,
    },
    ActionSpec {
        intent: Intent::UpdateStock,
        contract: SlotContract::ItemThenQuantity,
        clarification: "Please specify the item and new quantity to update the stock.",
        build: build_update_stock,
    },
];

pub fn action_spec(intent: Intent) -> Option<&'static ActionSpec> {
    ACTION_TABLE.iter().find(|spec| spec.intent == intent)
}

fn clarification_for(intent: Intent) -> &'static str {
    action_spec(intent).map(|spec| spec.clarification).unwrap_or(FALLBACK_REPLY)
}

fn build_check_stock(
    slots: Slots<'_>,
    _: &PlanContext,
) -> Result<InventoryAction, ResolutionFailure> {
    match slots {
        Slots::Item(item) => Ok(InventoryAction::CheckStock { item: item.to_string() }),
        _ => Err(ResolutionFailure::MissingSlots(Intent::CheckStock)),
    }
}

fn build_reorder_check(
    _: Slots<'_>,
    _: &PlanContext,
) -> Result<InventoryAction, ResolutionFailure> {
    Ok(InventoryAction::ReorderCheck)
}

fn build_check_expiry(
    slots: Slots<'_>,
    context: &PlanContext,
) -> Result<InventoryAction, ResolutionFailure> {
    match slots {
        Slots::Date(text) => Ok(InventoryAction::CheckExpiry { by: expiry_cutoff(text, context) }),
        _ => Err(ResolutionFailure::MissingSlots(Intent::CheckExpiry)),
    }
}

fn build_set_alert(
    slots: Slots<'_>,
    _: &PlanContext,
) -> Result<InventoryAction, ResolutionFailure> {
    match slots {
        Slots::ItemQuantity { item, quantity } => Ok(InventoryAction::SetAlert {
            item: item.to_string(),
            threshold: parse_quantity(Intent::SetAlert, quantity)?,
        }),
        _ => Err(ResolutionFailure::MissingSlots(Intent::SetAlert)),
    }
}

fn build_update_stock(
    slots: Slots<'_>,
    _: &PlanContext,
) -> Result<InventoryAction, ResolutionFailure> {
    match slots {
        Slots::ItemQuantity { item, quantity } => Ok(InventoryAction::UpdateStock {
            item: item.to_string(),
            quantity: parse_quantity(Intent::UpdateStock, quantity)?,
        }),
        _ => Err(ResolutionFailure::MissingSlots(Intent::UpdateStock)),
    }
}

/// Unreadable dates fall back to `today + expiry_default_days`.
pub fn expiry_cutoff(text: &str, context: &PlanContext) -> NaiveDate {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).unwrap_or_else(|_| {
        context
            .today
            .checked_add_days(Days::new(u64::from(context.expiry_default_days)))
            .unwrap_or(context.today)
    })
}

/// Quantities must be non-negative whole numbers.
fn parse_quantity(intent: Intent, text: &str) -> Result<i64, ResolutionFailure> {
    text.trim()
        .parse::<u32>()
        .map(i64::from)
        .map_err(|_| ResolutionFailure::InvalidQuantity { intent, text: text.to_string() })
}

#[derive(Clone, Copy, Debug)]
pub struct ResolverSettings {
    pub expiry_default_days: u32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self { expiry_default_days: 30 }
    }
}

pub struct ActionResolver<S, K = SystemClock> {
    store: S,
    clock: K,
    settings: ResolverSettings,
}

impl<S> ActionResolver<S, SystemClock>
where
    S: InventoryStore,
{
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock, ResolverSettings::default())
    }
}

impl<S, K> ActionResolver<S, K>
where
    S: InventoryStore,
    K: Clock,
{
    pub fn with_clock(store: S, clock: K, settings: ResolverSettings) -> Self {
        Self { store, clock, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Chooses an action for the turn without touching storage.
    pub fn plan(
        &self,
        intent: Intent,
        entities: &[Entity],
        context: &DialogueContext,
    ) -> Resolution {
        debug!(
            event_name = "agent.resolver.plan",
            intent = intent.as_str(),
            entity_count = entities.len(),
            previous_intent = context.last_intent().map(|previous| previous.as_str()),
            "planning inventory action"
        );

        let plan_context = PlanContext {
            today: self.clock.today(),
            expiry_default_days: self.settings.expiry_default_days,
        };

        let outcome = action_spec(intent)
            .ok_or(ResolutionFailure::UnsupportedIntent(intent))
            .and_then(|spec| {
                let slots =
                    spec.contract.fill(entities).ok_or(ResolutionFailure::MissingSlots(intent))?;
                (spec.build)(slots, &plan_context)
            });

        match outcome {
            Ok(action) => Resolution::Execute(action),
            Err(failure) => {
                debug!(
                    event_name = "agent.resolver.clarify",
                    intent = intent.as_str(),
                    reason = %failure,
                    "turn needs clarification"
                );
                Resolution::Clarify(failure.reply())
            }
        }
    }

    pub async fn resolve(
        &self,
        intent: Intent,
        entities: &[Entity],
        context: &DialogueContext,
    ) -> String {
        match self.plan(intent, entities, context) {
            Resolution::Execute(action) => self.execute(&action).await,
            Resolution::Clarify(reply) => reply,
        }
    }

    /// Runs an action against the store. Store failures become replies.
    pub async fn execute(&self, action: &InventoryAction) -> String {
        match action {
            InventoryAction::CheckStock { item } => match self.store.stock_level(item).await {
                Ok(Some(quantity)) => format!("We currently have {quantity} {item} in stock."),
                Ok(None) => no_information(item),
                Err(error) => {
                    warn!(event_name = "agent.store.failure", action = "check_stock", %error);
                    no_information(item)
                }
            },
            InventoryAction::ReorderCheck => match self.store.items_below_threshold().await {
                Ok(items) if items.is_empty() => {
                    "All items are currently above their reorder thresholds.".to_string()
                }
                Ok(items) => {
                    let mut lines =
                        vec!["The following items are below the reorder threshold:".to_string()];
                    lines.extend(items.iter().map(|low| {
                        format!("- {}: {} (threshold: {})", low.item, low.quantity, low.threshold)
                    }));
                    lines.join("\n")
                }
                Err(error) => {
                    warn!(event_name = "agent.store.failure", action = "reorder_check", %error);
                    "I couldn't retrieve reorder information right now. Please try again later."
                        .to_string()
                }
            },
            InventoryAction::CheckExpiry { by } => {
                let date = by.format(DATE_FORMAT);
                match self.store.expiring_by(*by).await {
                    Ok(batches) if batches.is_empty() => {
                        format!("No items are expiring by {date}.")
                    }
                    Ok(batches) => {
                        let mut lines = vec![format!("The following items are expiring by {date}:")];
                        lines.extend(batches.iter().map(|batch| {
                            format!(
                                "- {}: expires on {}",
                                batch.item,
                                batch.expiry_date.format(DATE_FORMAT)
                            )
                        }));
                        lines.join("\n")
                    }
                    Err(error) => {
                        warn!(event_name = "agent.store.failure", action = "check_expiry", %error);
                        "I couldn't retrieve expiry information right now. Please try again later."
                            .to_string()
                    }
                }
            }
            InventoryAction::SetAlert { item, threshold } => {
                match self.store.set_threshold(item, *threshold).await {
                    Ok(true) => {
                        format!("Alert set for {item} when stock drops below {threshold}.")
                    }
                    Ok(false) => no_information(item),
                    Err(error) => {
                        warn!(event_name = "agent.store.failure", action = "set_alert", %error);
                        format!("I couldn't set the alert for {item} right now. Please try again later.")
                    }
                }
            }
            InventoryAction::UpdateStock { item, quantity } => {
                match self.store.set_stock(item, *quantity).await {
                    Ok(true) => format!("Stock updated for {item}. New quantity: {quantity}."),
                    Ok(false) => no_information(item),
                    Err(error) => {
                        warn!(event_name = "agent.store.failure", action = "update_stock", %error);
                        format!(
                            "I couldn't update the stock for {item} right now. Please try again later."
                        )
                    }
                }
            }
        }
    }
}

fn no_information(item: &str) -> String {
    format!("I couldn't find any information about {item} in our inventory.")
}
