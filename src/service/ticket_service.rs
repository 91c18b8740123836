//! Ticket service: event creation, purchases and refunds.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::purchase::validate_quantity;
use crate::domain::{
    Account, AccountDirectory, AccountId, Event, EventBus, EventId, EventRegistry, EventSummary,
    NewEvent, Purchase, PurchaseId, PurchaseLedger, PurchaseStatus, Reservation, Role, TicketHolding,
    TicketingEvent, TierKind,
};
use crate::error::TicketingError;

/// Public contact details of an event's organizer.
#[derive(Debug, Clone)]
pub struct OrganizerContact {
    /// Organizer name.
    pub name: String,
    /// Organizer email.
    pub email: String,
}

/// Event listing entry for the public catalogue.
#[derive(Debug, Clone)]
pub struct PublicEvent {
    /// Event data.
    pub summary: EventSummary,
    /// `None` if the organizer account is gone.
    pub organizer: Option<OrganizerContact>,
}

/// Sales overview for an event's organizer.
#[derive(Debug, Clone)]
pub struct EventDashboard {
    /// Event state at the time of the request.
    pub event: Event,
    /// Purchases still in effect.
    pub completed_purchases: usize,
    /// Purchases that were refunded.
    pub refunded_purchases: usize,
}

/// A purchase request after parsing.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    /// Event to buy from.
    pub event_id: EventId,
    /// Tier to buy.
    pub tier: TierKind,
    /// Number of tickets.
    pub quantity: u32,
    /// Client-chosen retry key.
    pub idempotency_key: Option<String>,
}

/// Result of [`TicketService::purchase`].
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    /// The purchase record.
    pub purchase: Purchase,
    /// `true` if an earlier request with the same idempotency key
    /// produced it.
    pub replayed: bool,
}

/// Point-in-time copy of every event, purchase and account.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    /// Events, by ID.
    pub events: Vec<Event>,
    /// All purchases.
    pub purchases: Vec<Purchase>,
    /// All accounts.
    pub accounts: Vec<Account>,
}

/// Orchestration layer for event and ticket operations.
///
/// Every inventory mutation follows the pattern: acquire the event's
/// write lock → validate → mutate event, ledger and account → emit
/// events → return result. Locks are taken in the order event → ledger
/// → accounts.
///
/// Purchases and refunds run on their own task, so a caller that is
/// dropped mid-request never leaves a half-applied sale behind.
#[derive(Debug, Clone)]
pub struct TicketService {
    registry: Arc<EventRegistry>,
    ledger: Arc<PurchaseLedger>,
    accounts: Arc<AccountDirectory>,
    event_bus: EventBus,
}

impl TicketService {
    /// Creates a new `TicketService`.
    #[must_use]
    pub fn new(
        registry: Arc<EventRegistry>,
        ledger: Arc<PurchaseLedger>,
        accounts: Arc<AccountDirectory>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            registry,
            ledger,
            accounts,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`EventRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    /// Returns a reference to the inner [`PurchaseLedger`].
    #[must_use]
    pub fn ledger(&self) -> &Arc<PurchaseLedger> {
        &self.ledger
    }

    /// Creates an event owned by `organizer`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Forbidden`] unless `organizer` is an
    /// organizer account, or [`TicketingError::InvalidRequest`] for
    /// invalid event data.
    pub async fn create_event(
        &self,
        organizer: AccountId,
        input: NewEvent,
    ) -> Result<Event, TicketingError> {
        let account = self.accounts.get(organizer).await?;
        if account.role != Role::Organizer {
            return Err(TicketingError::Forbidden(
                "only organizers can create events".to_string(),
            ));
        }

        let event = Event::create(organizer, input)?;
        self.registry.insert(event.clone()).await?;

        tracing::info!(event_id = %event.id, organizer_id = %organizer, "event created");
        let _ = self.event_bus.publish(TicketingEvent::EventCreated {
            event_id: event.id,
            organizer_id: organizer,
            name: event.name.clone(),
            capacity: event.capacity(),
            timestamp: event.created_at,
        });
        Ok(event)
    }

    /// Events owned by `organizer`, by date.
    pub async fn my_events(&self, organizer: AccountId) -> Vec<EventSummary> {
        self.registry.list(Some(organizer)).await
    }

    /// All events by date, each with its organizer's contact details.
    pub async fn public_events(&self) -> Vec<PublicEvent> {
        let summaries = self.registry.list(None).await;
        let mut listing = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let organizer = self
                .accounts
                .get(summary.organizer_id)
                .await
                .ok()
                .map(|account| OrganizerContact {
                    name: account.name,
                    email: account.email,
                });
            listing.push(PublicEvent { summary, organizer });
        }
        listing
    }

    /// Returns a copy of the event.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`] for an unknown ID.
    pub async fn get_event(&self, event_id: EventId) -> Result<Event, TicketingError> {
        let entry_lock = self.registry.get(event_id).await?;
        let event = entry_lock.read().await.clone();
        Ok(event)
    }

    /// Sales overview for the event's own organizer.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`] for an unknown ID and
    /// [`TicketingError::Forbidden`] if `organizer` does not own it.
    pub async fn dashboard(
        &self,
        organizer: AccountId,
        event_id: EventId,
    ) -> Result<EventDashboard, TicketingError> {
        let event = self.get_event(event_id).await?;
        if event.organizer_id != organizer {
            return Err(TicketingError::Forbidden(
                "only the event's organizer can view its dashboard".to_string(),
            ));
        }
        let purchases = self.ledger.for_event(event_id).await;
        let refunded_purchases = purchases
            .iter()
            .filter(|p| p.status == PurchaseStatus::Refunded)
            .count();
        Ok(EventDashboard {
            event,
            completed_purchases: purchases.len() - refunded_purchases,
            refunded_purchases,
        })
    }

    /// Buys tickets for `buyer`.
    ///
    /// A request carrying an idempotency key that already completed
    /// returns the original purchase without selling more tickets.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::InvalidQuantity`] outside 1..=50.
    /// - [`TicketingError::EventNotFound`] for an unknown event.
    /// - [`TicketingError::InsufficientTickets`] if the tier cannot cover
    ///   the request.
    /// - [`TicketingError::IdempotencyConflict`] if the key is in flight
    ///   or was used for a different request.
    pub async fn purchase(
        &self,
        buyer: AccountId,
        request: PurchaseRequest,
    ) -> Result<PurchaseOutcome, TicketingError> {
        let service = self.clone();
        run_to_completion(async move { service.purchase_now(buyer, request).await }).await
    }

    async fn purchase_now(
        &self,
        buyer: AccountId,
        request: PurchaseRequest,
    ) -> Result<PurchaseOutcome, TicketingError> {
        let quantity = validate_quantity(request.quantity)?;
        let entry_lock = self.registry.get(request.event_id).await?;
        let mut event = entry_lock.write().await;

        let key = request.idempotency_key.as_deref();
        if let Reservation::Replay(existing) = self.ledger.begin(buyer, key).await? {
            if existing.matches_request(request.event_id, request.tier, quantity) {
                tracing::debug!(purchase_id = %existing.id, "idempotent purchase replayed");
                return Ok(PurchaseOutcome {
                    purchase: existing,
                    replayed: true,
                });
            }
            return Err(TicketingError::IdempotencyConflict(format!(
                "key '{}' was already used for a different purchase",
                key.unwrap_or_default()
            )));
        }

        match self.sell(&mut event, buyer, &request, quantity).await {
            Ok(purchase) => Ok(PurchaseOutcome {
                purchase,
                replayed: false,
            }),
            Err(err) => {
                self.ledger.abort(buyer, key).await;
                Err(err)
            }
        }
    }

    async fn sell(
        &self,
        event: &mut Event,
        buyer: AccountId,
        request: &PurchaseRequest,
        quantity: u32,
    ) -> Result<Purchase, TicketingError> {
        let tier = request.tier;
        let was_break_even = event.break_even_reached();
        event.reserve(tier, quantity)?;

        let Some((unit_price, remaining)) = event.tier(tier).map(|t| (t.price, t.available))
        else {
            return Err(TicketingError::InvalidTier(tier.to_string()));
        };
        let purchase = Purchase::completed(
            buyer,
            event.id,
            tier,
            quantity,
            unit_price,
            request.idempotency_key.clone(),
        );
        let holding = TicketHolding {
            purchase_id: purchase.id,
            event_id: event.id,
            tier,
            quantity,
        };

        if let Err(err) = self
            .accounts
            .update(buyer, |account| account.tickets.push(holding))
            .await
        {
            if let Err(release_err) = event.release(tier, quantity) {
                tracing::error!(event_id = %event.id, error = %release_err, "rollback failed");
            }
            return Err(err);
        }
        self.ledger.commit(purchase.clone()).await;

        tracing::info!(
            event_id = %event.id,
            purchase_id = %purchase.id,
            tier = %tier,
            quantity,
            remaining,
            "tickets purchased"
        );

        let _ = self.event_bus.publish(TicketingEvent::TicketsPurchased {
            event_id: event.id,
            purchase_id: purchase.id,
            tier,
            quantity,
            remaining,
            version: event.version,
            timestamp: purchase.created_at,
        });
        if remaining == 0 {
            let _ = self.event_bus.publish(TicketingEvent::TierSoldOut {
                event_id: event.id,
                tier,
                timestamp: Utc::now(),
            });
        }
        if !was_break_even && event.break_even_reached() {
            let _ = self.event_bus.publish(TicketingEvent::BreakEvenReached {
                event_id: event.id,
                gross_revenue: event.gross_revenue(),
                target: event.target,
                timestamp: Utc::now(),
            });
        }
        Ok(purchase)
    }

    /// Refunds a purchase and puts its tickets back on sale.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::PurchaseNotFound`] for an unknown ID.
    /// - [`TicketingError::Forbidden`] unless `actor` is the buyer or the
    ///   event's organizer.
    /// - [`TicketingError::AlreadyRefunded`] on a second refund.
    pub async fn refund(
        &self,
        actor: AccountId,
        purchase_id: PurchaseId,
    ) -> Result<Purchase, TicketingError> {
        let service = self.clone();
        run_to_completion(async move { service.refund_now(actor, purchase_id).await }).await
    }

    async fn refund_now(
        &self,
        actor: AccountId,
        purchase_id: PurchaseId,
    ) -> Result<Purchase, TicketingError> {
        let event_id = self.ledger.get(purchase_id).await?.event_id;
        let entry_lock = self.registry.get(event_id).await?;
        let mut event = entry_lock.write().await;

        let current = self.ledger.get(purchase_id).await?;
        if current.account_id != actor && event.organizer_id != actor {
            return Err(TicketingError::Forbidden(
                "only the buyer or the event's organizer can refund a purchase".to_string(),
            ));
        }
        if current.status == PurchaseStatus::Refunded {
            return Err(TicketingError::AlreadyRefunded(*purchase_id.as_uuid()));
        }

        event.release(current.tier, current.quantity)?;
        let refunded = self
            .ledger
            .update(purchase_id, |purchase| {
                purchase.mark_refunded()?;
                Ok(purchase.clone())
            })
            .await?;
        let removed = self
            .accounts
            .update(current.account_id, |account| {
                account.remove_holding(purchase_id)
            })
            .await;
        if !matches!(removed, Ok(true)) {
            tracing::warn!(%purchase_id, "refunded purchase had no holding to remove");
        }

        let remaining = event.tier(current.tier).map_or(0, |t| t.available);
        tracing::info!(
            event_id = %event.id,
            %purchase_id,
            tier = %current.tier,
            quantity = current.quantity,
            remaining,
            "purchase refunded"
        );
        let _ = self.event_bus.publish(TicketingEvent::PurchaseRefunded {
            event_id: event.id,
            purchase_id,
            tier: current.tier,
            quantity: current.quantity,
            remaining,
            version: event.version,
            timestamp: refunded.refunded_at.unwrap_or_else(Utc::now),
        });
        Ok(refunded)
    }

    /// Purchase history of `account`, oldest first.
    pub async fn purchases_for(&self, account: AccountId) -> Vec<Purchase> {
        self.ledger.for_account(account).await
    }

    /// Copies events, purchases and accounts as one consistent cut.
    ///
    /// Read locks on every event are held while the ledger and then the
    /// directory are copied, so no sale or refund lands between the three.
    pub async fn state_snapshot(&self) -> StateSnapshot {
        let entries = self.registry.entries().await;
        let mut guards = Vec::with_capacity(entries.len());
        for entry_lock in &entries {
            guards.push(entry_lock.read().await);
        }
        let events = guards.iter().map(|event| (**event).clone()).collect();
        let purchases = self.ledger.snapshot().await;
        let accounts = self.accounts.snapshot().await;
        drop(guards);

        StateSnapshot {
            events,
            purchases,
            accounts,
        }
    }
}

/// Drives `work` on its own task and waits for it. Dropping the returned
/// future does not cancel `work`.
async fn run_to_completion<T, F>(work: F) -> Result<T, TicketingError>
where
    F: Future<Output = Result<T, TicketingError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work).await.map_err(|err| {
        tracing::error!(error = %err, "ticket operation task failed");
        TicketingError::Internal(format!("ticket operation aborted: {err}"))
    })?
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::event::tests::new_event;
    use std::time::Duration;

    use crate::domain::NewAccount;

    struct Fixture {
        service: Arc<TicketService>,
        organizer: AccountId,
        event_id: EventId,
    }

    async fn add_account(directory: &AccountDirectory, role: Role, email: &str) -> AccountId {
        let Ok(account) = Account::create(NewAccount {
            role,
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            age: None,
            gender: None,
            city: None,
            phone: None,
        }) else {
            panic!("valid account");
        };
        let Ok(id) = directory.insert(account).await else {
            panic!("insert failed");
        };
        id
    }

    async fn fixture(vip: u32) -> Fixture {
        let accounts = Arc::new(AccountDirectory::new());
        let organizer = add_account(&accounts, Role::Organizer, "org@example.com").await;
        let service = Arc::new(TicketService::new(
            Arc::new(EventRegistry::new()),
            Arc::new(PurchaseLedger::new()),
            accounts,
            EventBus::new(1000),
        ));
        let Ok(event) = service.create_event(organizer, new_event(vip, 50, 20)).await else {
            panic!("event creation failed");
        };
        Fixture {
            service,
            organizer,
            event_id: event.id,
        }
    }

    fn request(event_id: EventId, quantity: u32, key: Option<&str>) -> PurchaseRequest {
        PurchaseRequest {
            event_id,
            tier: TierKind::Vip,
            quantity,
            idempotency_key: key.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn attendees_cannot_create_events() {
        let f = fixture(5).await;
        let attendee = add_account(&f.service.accounts, Role::Attendee, "a@example.com").await;
        let result = f.service.create_event(attendee, new_event(1, 1, 1)).await;
        assert!(matches!(result, Err(TicketingError::Forbidden(_))));
    }

    #[tokio::test]
    async fn purchase_updates_inventory_holdings_and_emits_events() {
        let f = fixture(2).await;
        let buyer = add_account(&f.service.accounts, Role::Attendee, "b@example.com").await;
        let mut rx = f.service.event_bus().subscribe();

        let Ok(outcome) = f.service.purchase(buyer, request(f.event_id, 2, None)).await else {
            panic!("purchase failed");
        };
        assert!(!outcome.replayed);
        assert_eq!(outcome.purchase.total, rust_decimal::Decimal::from(200));

        let Ok(event) = f.service.get_event(f.event_id).await else {
            panic!("event missing");
        };
        assert_eq!(event.tier(TierKind::Vip).map(|t| t.available), Some(0));

        let Ok(account) = f.service.accounts.get(buyer).await else {
            panic!("account missing");
        };
        assert_eq!(account.tickets.len(), 1);

        let Ok(first) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(first.event_type_str(), "tickets_purchased");
        let Ok(second) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(second.event_type_str(), "tier_sold_out");
    }

    #[tokio::test]
    async fn break_even_is_announced_once() {
        let f = fixture(10).await;
        let buyer = add_account(&f.service.accounts, Role::Attendee, "be@example.com").await;
        let mut rx = f.service.event_bus().subscribe();

        // Target is 500 and VIP costs 100.
        assert!(f.service.purchase(buyer, request(f.event_id, 5, None)).await.is_ok());
        assert!(f.service.purchase(buyer, request(f.event_id, 1, None)).await.is_ok());

        let mut break_even = 0;
        while let Ok(event) = rx.try_recv() {
            if event.event_type_str() == "break_even_reached" {
                break_even += 1;
            }
        }
        assert_eq!(break_even, 1);
    }

    #[tokio::test]
    async fn concurrent_purchases_never_oversell() {
        let f = fixture(10).await;
        let buyer = add_account(&f.service.accounts, Role::Attendee, "c@example.com").await;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let service = Arc::clone(&f.service);
            let event_id = f.event_id;
            handles.push(tokio::spawn(async move {
                service.purchase(buyer, request(event_id, 1, None)).await
            }));
        }

        let mut sold = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(_)) => sold += 1,
                Ok(Err(TicketingError::InsufficientTickets { .. })) => rejected += 1,
                other => panic!("unexpected result: {other:?}"),
            }
        }
        assert_eq!(sold, 10);
        assert_eq!(rejected, 10);

        let Ok(event) = f.service.get_event(f.event_id).await else {
            panic!("event missing");
        };
        assert_eq!(event.tier(TierKind::Vip).map(|t| t.available), Some(0));
        assert_eq!(f.service.ledger().for_event(f.event_id).await.len(), 10);
    }

    #[tokio::test]
    async fn idempotent_retry_returns_same_purchase() {
        let f = fixture(5).await;
        let buyer = add_account(&f.service.accounts, Role::Attendee, "d@example.com").await;

        let Ok(first) = f.service.purchase(buyer, request(f.event_id, 2, Some("k1"))).await else {
            panic!("purchase failed");
        };
        let Ok(second) = f.service.purchase(buyer, request(f.event_id, 2, Some("k1"))).await else {
            panic!("replay failed");
        };
        assert!(second.replayed);
        assert_eq!(first.purchase.id, second.purchase.id);

        let Ok(event) = f.service.get_event(f.event_id).await else {
            panic!("event missing");
        };
        assert_eq!(event.tier(TierKind::Vip).map(|t| t.available), Some(3));

        let mismatch = f.service.purchase(buyer, request(f.event_id, 1, Some("k1"))).await;
        assert!(matches!(mismatch, Err(TicketingError::IdempotencyConflict(_))));
    }

    #[tokio::test]
    async fn failed_purchase_releases_key() {
        let f = fixture(1).await;
        let buyer = add_account(&f.service.accounts, Role::Attendee, "e@example.com").await;

        let too_many = f.service.purchase(buyer, request(f.event_id, 2, Some("k2"))).await;
        assert!(matches!(too_many, Err(TicketingError::InsufficientTickets { .. })));

        let retry = f.service.purchase(buyer, request(f.event_id, 1, Some("k2"))).await;
        assert!(retry.is_ok());
    }

    #[tokio::test]
    async fn unknown_buyer_rolls_back_reservation() {
        let f = fixture(5).await;
        let ghost = AccountId::new();

        let first = f.service.purchase(ghost, request(f.event_id, 2, Some("g1"))).await;
        assert!(matches!(first, Err(TicketingError::AccountNotFound(_))));

        let Ok(event) = f.service.get_event(f.event_id).await else {
            panic!("event missing");
        };
        assert_eq!(event.tier(TierKind::Vip).map(|t| t.available), Some(5));
        assert!(f.service.ledger().for_event(f.event_id).await.is_empty());

        // The key was released, so the retry fails the same way.
        let retry = f.service.purchase(ghost, request(f.event_id, 2, Some("g1"))).await;
        assert!(matches!(retry, Err(TicketingError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn abandoned_purchase_still_completes() {
        let f = fixture(5).await;
        let buyer = add_account(&f.service.accounts, Role::Attendee, "t@example.com").await;

        let held = f.service.accounts.hold_read().await;
        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            f.service.purchase(buyer, request(f.event_id, 2, Some("k3"))),
        )
        .await;
        assert!(abandoned.is_err());
        drop(held);

        let Ok(retry) = f.service.purchase(buyer, request(f.event_id, 2, Some("k3"))).await else {
            panic!("retry failed");
        };
        assert!(retry.replayed);

        let Ok(event) = f.service.get_event(f.event_id).await else {
            panic!("event missing");
        };
        assert_eq!(event.tier(TierKind::Vip).map(|t| t.available), Some(3));
        assert_eq!(f.service.ledger().for_event(f.event_id).await.len(), 1);

        let Ok(account) = f.service.accounts.get(buyer).await else {
            panic!("account missing");
        };
        assert_eq!(account.tickets.len(), 1);
    }

    #[tokio::test]
    async fn state_snapshot_covers_every_kind() {
        let f = fixture(5).await;
        let buyer = add_account(&f.service.accounts, Role::Attendee, "snap@example.com").await;
        assert!(f.service.purchase(buyer, request(f.event_id, 1, None)).await.is_ok());

        let snapshot = f.service.state_snapshot().await;
        assert_eq!(snapshot.events.len(), 1);
        assert_eq!(snapshot.purchases.len(), 1);
        assert_eq!(snapshot.accounts.len(), 2);
        let sold = snapshot.events.first().map(Event::tickets_sold);
        assert_eq!(sold, Some(1));
    }

    #[tokio::test]
    async fn quantity_bounds_are_enforced() {
        let f = fixture(5).await;
        let buyer = add_account(&f.service.accounts, Role::Attendee, "q@example.com").await;
        for quantity in [0, 51] {
            let result = f.service.purchase(buyer, request(f.event_id, quantity, None)).await;
            assert!(matches!(result, Err(TicketingError::InvalidQuantity(_))));
        }
    }

    #[tokio::test]
    async fn refund_restores_inventory_once() {
        let f = fixture(3).await;
        let buyer = add_account(&f.service.accounts, Role::Attendee, "r@example.com").await;
        let stranger = add_account(&f.service.accounts, Role::Attendee, "s@example.com").await;

        let Ok(outcome) = f.service.purchase(buyer, request(f.event_id, 2, None)).await else {
            panic!("purchase failed");
        };
        let id = outcome.purchase.id;

        let denied = f.service.refund(stranger, id).await;
        assert!(matches!(denied, Err(TicketingError::Forbidden(_))));

        let Ok(refunded) = f.service.refund(buyer, id).await else {
            panic!("refund failed");
        };
        assert_eq!(refunded.status, PurchaseStatus::Refunded);

        let Ok(event) = f.service.get_event(f.event_id).await else {
            panic!("event missing");
        };
        assert_eq!(event.tier(TierKind::Vip).map(|t| t.available), Some(3));

        let Ok(account) = f.service.accounts.get(buyer).await else {
            panic!("account missing");
        };
        assert!(account.tickets.is_empty());

        let again = f.service.refund(f.organizer, id).await;
        assert!(matches!(again, Err(TicketingError::AlreadyRefunded(_))));
    }

    #[tokio::test]
    async fn dashboard_is_owner_only() {
        let f = fixture(3).await;
        let buyer = add_account(&f.service.accounts, Role::Attendee, "dash@example.com").await;
        assert!(f.service.purchase(buyer, request(f.event_id, 1, None)).await.is_ok());

        let Ok(dashboard) = f.service.dashboard(f.organizer, f.event_id).await else {
            panic!("dashboard failed");
        };
        assert_eq!(dashboard.completed_purchases, 1);
        assert_eq!(dashboard.event.tickets_sold(), 1);

        let denied = f.service.dashboard(buyer, f.event_id).await;
        assert!(matches!(denied, Err(TicketingError::Forbidden(_))));
    }

    #[tokio::test]
    async fn public_events_carry_organizer_contact() {
        let f = fixture(3).await;
        let listing = f.service.public_events().await;
        assert_eq!(listing.len(), 1);
        let contact = listing.first().and_then(|e| e.organizer.clone());
        assert_eq!(contact.map(|c| c.email), Some("org@example.com".to_string()));
        assert_eq!(f.service.my_events(f.organizer).await.len(), 1);
    }
}
