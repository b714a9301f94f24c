//! The wizard session: one customer's draft, cursor and in-flight lookups.
//!
//! All edits are synchronous and go through `&mut self`. The three calls that
//! leave the process (catalog load, postal lookup, submission) are split so the
//! await does not borrow the session:
//!
//! ```text
//!   let ticket = session.begin_postal_lookup()?;     // captures the generation
//!   let result = lookup_postal(&service, &ticket, timeout).await;
//!   session.apply_postal_lookup(ticket, result);     // ignored if superseded
//! ```

use chrono::{Local, NaiveDate, NaiveTime};
use common::{AccessoryId, MenuId, ProductId};
use domain::{
    AccessorySelection, Catalog, CategoryKey, CustomerType, GuestCountChange, Menu,
    NavigationOutcome, OrderDraft, PaymentMethod, PriceBreakdown, QuantityChange, Selection,
    SelectionError, SelectionStore, ServiceType, StepPlan, StepStatus, SystemConstraints,
    ValidationContext, WizardStep,
};
use domain::draft::{CardDetails, ContactInfo};
use domain::validation::is_valid_postal_code;
use services::{
    CatalogService, OrderGateway, OrderReceipt, PostalLookupService, ServiceError,
    SystemStatusService, load_catalog, load_constraints,
};
use services::postal::Locality;

use crate::checkout::CheckoutService;
use crate::config::WizardConfig;
use crate::error::{CheckoutError, WizardError};
use crate::notice::Notice;

/// Captured catalog generation for an in-flight catalog load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogTicket {
    generation: u64,
}

/// Captured lookup generation and postal code for an in-flight postal lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalTicket {
    generation: u64,
    postal_code: String,
}

impl PostalTicket {
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }
}

/// What happened to a postal lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostalOutcome {
    /// City and state were filled in.
    Applied(Locality),
    /// The code is not in the directory; the address is unchanged.
    NotFound,
    /// The lookup failed; a notice was recorded.
    Failed,
    /// A newer lookup or a postal code change superseded this one.
    Discarded,
}

/// Runs a postal lookup under a timeout without touching the session.
pub async fn lookup_postal<P: PostalLookupService + ?Sized>(
    service: &P,
    ticket: &PostalTicket,
    timeout: std::time::Duration,
) -> Result<Option<Locality>, ServiceError> {
    tokio::time::timeout(timeout, service.lookup_postal_code(&ticket.postal_code))
        .await
        .unwrap_or(Err(ServiceError::Timeout {
            operation: "postal lookup",
            after: timeout,
        }))
}

/// Loads the catalog under a timeout without touching the session.
pub async fn fetch_catalog<C: CatalogService + ?Sized>(
    service: &C,
    timeout: std::time::Duration,
) -> Result<Catalog, ServiceError> {
    tokio::time::timeout(timeout, load_catalog(service))
        .await
        .unwrap_or(Err(ServiceError::Timeout {
            operation: "catalog load",
            after: timeout,
        }))
}

/// One customer's order configuration.
#[derive(Debug, Clone)]
pub struct WizardSession {
    config: WizardConfig,
    catalog: Catalog,
    constraints: SystemConstraints,
    draft: OrderDraft,
    plan: StepPlan,
    cursor: usize,
    today: NaiveDate,
    /// Bumped on every draft edit.
    revision: u64,
    catalog_generation: u64,
    postal_generation: u64,
    notice: Option<Notice>,
    receipt: Option<OrderReceipt>,
}

impl WizardSession {
    pub fn new(config: WizardConfig) -> Self {
        Self::with_catalog(config, Catalog::default())
    }

    pub fn with_catalog(config: WizardConfig, catalog: Catalog) -> Self {
        Self {
            config,
            catalog,
            constraints: SystemConstraints::default(),
            draft: OrderDraft::new(),
            plan: StepPlan::build(None),
            cursor: 0,
            today: Local::now().date_naive(),
            revision: 0,
            catalog_generation: 0,
            postal_generation: 0,
            notice: None,
            receipt: None,
        }
    }

    /// Resumes a session from a draft handed over by the UI layer.
    ///
    /// Product and accessory records in the draft are replaced by the
    /// catalog's, so prices and minimums never come from the caller. An id
    /// the catalog does not sell (or the selected menu does not offer) is
    /// rejected. Selections without a step in the resulting plan are dropped.
    pub fn resume(
        config: WizardConfig,
        catalog: Catalog,
        constraints: SystemConstraints,
        draft: OrderDraft,
        cursor: usize,
    ) -> Result<Self, WizardError> {
        let mut session = Self::with_catalog(config, catalog);
        session.constraints = constraints;
        session.draft = draft;
        if let Some((_, err)) = session.rebind_draft().into_iter().next() {
            return Err(err);
        }
        session.rebuild_plan();
        session.draft.selections.retain_for_plan(&session.plan);
        session.cursor = session.plan.clamp_cursor(cursor);
        Ok(session)
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn constraints(&self) -> &SystemConstraints {
        &self.constraints
    }

    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_step(&self) -> Option<WizardStep> {
        self.plan.step_at(self.cursor)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Overrides the date lead times are measured from.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Receipt of the last successful submission.
    pub fn receipt(&self) -> Option<&OrderReceipt> {
        self.receipt.as_ref()
    }

    pub fn set_constraints(&mut self, constraints: SystemConstraints) {
        self.constraints = constraints;
    }

    // ---- derived views -------------------------------------------------

    pub fn context(&self) -> ValidationContext<'_> {
        ValidationContext::new(
            &self.draft,
            &self.catalog,
            &self.plan,
            &self.constraints,
            &self.config.policy,
            self.today,
        )
    }

    pub fn quote(&self) -> PriceBreakdown {
        self.context().breakdown().clone()
    }

    pub fn step_statuses(&self) -> Vec<StepStatus> {
        domain::step_statuses(&self.context())
    }

    // ---- event details -------------------------------------------------

    pub fn set_occasion(&mut self, occasion: impl Into<String>) {
        self.draft.event.occasion = Some(occasion.into());
        self.touch();
    }

    pub fn set_service_type(&mut self, service_type: ServiceType) {
        self.draft.event.service_type = Some(service_type);
        self.touch();
    }

    pub fn set_event_time(&mut self, time: NaiveTime) {
        self.draft.event.time = Some(time);
        self.touch();
    }

    /// Sets the event date; rejected if it violates the current lead time.
    pub fn set_event_date(&mut self, date: NaiveDate) -> Result<(), WizardError> {
        domain::schedule::set_event_date(&mut self.draft.event, date, self.today, &self.config.policy)?;
        self.touch();
        Ok(())
    }

    /// Sets the guest count and clears a date the new lead time rules out.
    pub fn set_guest_count(&mut self, guest_count: u32) -> GuestCountChange {
        let change = domain::apply_guest_count(
            &mut self.draft.event,
            guest_count,
            self.today,
            &self.config.policy,
        );
        self.touch();
        change
    }

    /// Changes the postal code. Any lookup in flight for the old code is superseded.
    pub fn set_postal_code(&mut self, postal_code: impl Into<String>) {
        let postal_code = postal_code.into();
        if self.draft.event.address.postal_code != postal_code {
            self.postal_generation += 1;
        }
        self.draft.event.address.postal_code = postal_code;
        self.touch();
    }

    pub fn set_street(&mut self, street: impl Into<String>) {
        self.draft.event.address.street = street.into();
        self.touch();
    }

    // ---- menu and selections -------------------------------------------

    /// Selects a menu (or clears it), rebuilds the step plan and drops
    /// selections the new plan has no step for. Returns the dropped selections.
    pub fn select_menu(&mut self, menu_id: Option<MenuId>) -> Result<Vec<Selection>, WizardError> {
        if let Some(id) = &menu_id {
            if self.catalog.menu(id).is_none() {
                return Err(WizardError::UnknownMenu(id.clone()));
            }
        }
        if self.draft.menu_id == menu_id {
            return Ok(Vec::new());
        }

        self.draft.menu_id = menu_id;
        self.rebuild_plan();
        let dropped = self.draft.selections.retain_for_plan(&self.plan);
        if !dropped.is_empty() {
            tracing::debug!(dropped = dropped.len(), "selections dropped after menu change");
        }
        self.touch();
        Ok(dropped)
    }

    /// Adds a product to the step for `key`, or replaces its quantity.
    pub fn add_selection(
        &mut self,
        key: CategoryKey,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<u32, WizardError> {
        let product = self.selectable_product(key, product_id)?.clone();
        let stored = self
            .draft
            .selections
            .add_or_replace(key, &product, quantity)?
            .quantity;
        self.touch();
        Ok(stored)
    }

    /// Sets a quantity; below the product minimum removes the selection.
    pub fn set_selection_quantity(
        &mut self,
        key: CategoryKey,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<QuantityChange, WizardError> {
        let product = self.selectable_product(key, product_id)?.clone();
        let change = self.draft.selections.set_quantity(key, &product, quantity)?;
        self.touch();
        Ok(change)
    }

    pub fn remove_selection(&mut self, product_id: &ProductId) -> Option<Selection> {
        let removed = self.draft.selections.remove(product_id);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Sets an accessory quantity, clamped up to its minimum. Returns the stored quantity.
    pub fn set_accessory(&mut self, id: &AccessoryId, quantity: u32) -> Result<u32, WizardError> {
        let accessory = self
            .catalog
            .accessory(id)
            .ok_or_else(|| WizardError::UnknownAccessory(id.clone()))?
            .clone();
        let stored = self.draft.set_accessory(&accessory, quantity);
        self.touch();
        Ok(stored)
    }

    pub fn remove_accessory(&mut self, id: &AccessoryId) -> bool {
        let removed = self.draft.remove_accessory(id).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    // ---- checkout fields -----------------------------------------------

    pub fn edit_contact(&mut self, edit: impl FnOnce(&mut ContactInfo)) {
        edit(&mut self.draft.contact);
        self.touch();
    }

    pub fn set_customer_type(&mut self, customer_type: CustomerType) {
        self.draft.customer_type = customer_type;
        self.touch();
    }

    /// Sets the payment method; card details are dropped for other methods.
    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.draft.payment_method = Some(method);
        if method != PaymentMethod::Card {
            self.draft.card = None;
        }
        self.touch();
    }

    pub fn set_card(&mut self, card: CardDetails) {
        self.draft.card = Some(card);
        self.touch();
    }

    pub fn accept_terms(&mut self, accepted: bool) {
        self.draft.terms_accepted = accepted;
        self.touch();
    }

    // ---- navigation ----------------------------------------------------

    /// Requests a move to `target` and applies the resulting cursor.
    #[tracing::instrument(skip(self), fields(current = self.cursor))]
    pub fn go_to(&mut self, target: usize) -> NavigationOutcome {
        let outcome = domain::navigate(&self.context(), self.cursor, target);
        let label = match &outcome {
            NavigationOutcome::Moved { .. } => "moved",
            NavigationOutcome::Blocked { .. } => "blocked",
            NavigationOutcome::Rejected { .. } => "rejected",
        };
        metrics::counter!("wizard_navigation_total", "outcome" => label).increment(1);
        if let NavigationOutcome::Blocked { reason, .. } = &outcome {
            metrics::counter!("wizard_navigation_blocked_total", "reason" => reason.message_key())
                .increment(1);
        }
        self.cursor = outcome.cursor();
        outcome
    }

    pub fn next(&mut self) -> NavigationOutcome {
        self.go_to(self.cursor.saturating_add(1))
    }

    pub fn back(&mut self) -> NavigationOutcome {
        self.go_to(self.cursor.saturating_sub(1))
    }

    // ---- catalog and status --------------------------------------------

    /// Starts a catalog load; any earlier load still in flight is superseded.
    pub fn begin_catalog_load(&mut self) -> CatalogTicket {
        self.catalog_generation += 1;
        CatalogTicket {
            generation: self.catalog_generation,
        }
    }

    /// Applies a catalog load result. Returns false if the ticket was superseded.
    pub fn apply_catalog(
        &mut self,
        ticket: CatalogTicket,
        result: Result<Catalog, ServiceError>,
    ) -> bool {
        if ticket.generation != self.catalog_generation {
            tracing::debug!(ticket = ticket.generation, current = self.catalog_generation, "stale catalog discarded");
            return false;
        }
        match result {
            Ok(catalog) => {
                self.catalog = catalog;
                let mut dropped: Vec<String> = self
                    .rebind_draft()
                    .into_iter()
                    .map(|(name, _)| name)
                    .collect();
                self.rebuild_plan();
                dropped.extend(
                    self.draft
                        .selections
                        .retain_for_plan(&self.plan)
                        .into_iter()
                        .map(|s| s.product.name),
                );
                if !dropped.is_empty() {
                    tracing::info!(dropped = dropped.len(), "draft entries dropped after catalog change");
                    self.notice = Some(Notice::warning("notice.selections_dropped", dropped.join(", ")));
                    self.touch();
                }
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "catalog load failed");
                self.notice = Some(Notice::error("notice.catalog_load_failed", err.to_string()));
                true
            }
        }
    }

    /// Loads the catalog in one go.
    pub async fn load_catalog<C: CatalogService + ?Sized>(&mut self, service: &C) {
        let ticket = self.begin_catalog_load();
        let result = fetch_catalog(service, self.config.lookup_timeout).await;
        self.apply_catalog(ticket, result);
    }

    /// Refreshes the pause flag and closed dates. On failure the previous
    /// values are kept and a notice is recorded.
    pub async fn refresh_constraints<S: SystemStatusService + ?Sized>(&mut self, service: &S) {
        let timeout = self.config.lookup_timeout;
        let result = tokio::time::timeout(timeout, load_constraints(service))
            .await
            .unwrap_or(Err(ServiceError::Timeout {
                operation: "status refresh",
                after: timeout,
            }));
        match result {
            Ok(constraints) => self.constraints = constraints,
            Err(err) => {
                tracing::warn!(error = %err, "status refresh failed");
                self.notice = Some(Notice::warning("notice.status_refresh_failed", err.to_string()));
            }
        }
    }

    // ---- postal lookup -------------------------------------------------

    /// Starts a lookup for the current postal code, superseding any lookup in
    /// flight. `None` if the code is not a 5-digit code.
    pub fn begin_postal_lookup(&mut self) -> Option<PostalTicket> {
        let postal_code = self.draft.event.address.postal_code.trim().to_string();
        if !is_valid_postal_code(&postal_code) {
            return None;
        }
        self.postal_generation += 1;
        Some(PostalTicket {
            generation: self.postal_generation,
            postal_code,
        })
    }

    /// Applies a lookup result if the ticket is still current.
    pub fn apply_postal_lookup(
        &mut self,
        ticket: PostalTicket,
        result: Result<Option<Locality>, ServiceError>,
    ) -> PostalOutcome {
        if ticket.generation != self.postal_generation
            || ticket.postal_code != self.draft.event.address.postal_code.trim()
        {
            metrics::counter!("postal_lookups_discarded_total").increment(1);
            tracing::debug!(postal_code = %ticket.postal_code, "stale postal lookup discarded");
            return PostalOutcome::Discarded;
        }

        match result {
            Ok(Some(locality)) => {
                let address = &mut self.draft.event.address;
                address.city = locality.city.clone();
                address.state = locality.state.clone();
                self.touch();
                PostalOutcome::Applied(locality)
            }
            Ok(None) => PostalOutcome::NotFound,
            Err(err) => {
                tracing::warn!(error = %err, postal_code = %ticket.postal_code, "postal lookup failed");
                self.notice = Some(Notice::warning("notice.postal_lookup_failed", err.to_string()));
                PostalOutcome::Failed
            }
        }
    }

    /// Looks up the current postal code in one go.
    pub async fn lookup_postal_code<P: PostalLookupService + ?Sized>(
        &mut self,
        service: &P,
    ) -> Option<PostalOutcome> {
        let ticket = self.begin_postal_lookup()?;
        let result = lookup_postal(service, &ticket, self.config.lookup_timeout).await;
        Some(self.apply_postal_lookup(ticket, result))
    }

    // ---- submission ----------------------------------------------------

    /// Submits the order. On failure the draft is unchanged and a notice is recorded.
    pub async fn submit<G: OrderGateway>(
        &mut self,
        checkout: &CheckoutService<G>,
    ) -> Result<OrderReceipt, CheckoutError> {
        let result = {
            let ctx = self.context();
            checkout.submit(&self.draft, &ctx).await
        };

        match &result {
            Ok(receipt) => {
                self.receipt = Some(*receipt);
                self.notice = None;
            }
            Err(err) => {
                if let CheckoutError::Invalid(step) = err {
                    self.cursor = self.plan.clamp_cursor(step.step);
                }
                self.notice = Some(Notice::error(err.message_key(), err.to_string()));
            }
        }
        result
    }

    // ---- internals -----------------------------------------------------

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Rebuilds the step plan from the selected menu and clamps the cursor.
    fn rebuild_plan(&mut self) {
        let menu = self.draft.menu_id.as_ref().and_then(|id| self.catalog.menu(id));
        self.plan = StepPlan::build(menu);
        self.cursor = self.plan.clamp_cursor(self.cursor);
    }

    /// Replaces every product and accessory record in the draft with the
    /// current catalog's. Entries that cannot be rebound are removed and
    /// returned by display name with the reason.
    fn rebind_draft(&mut self) -> Vec<(String, WizardError)> {
        let menu = self.draft.menu_id.as_ref().and_then(|id| self.catalog.menu(id));
        let mut stale = Vec::new();

        let mut selections = SelectionStore::new();
        for selection in self.draft.selections.iter() {
            if let Err(err) = rebind_selection(&self.catalog, menu, selection, &mut selections) {
                tracing::debug!(product_id = %selection.product_id(), error = %err, "selection not rebound");
                stale.push((selection.product.name.clone(), err));
            }
        }

        let mut accessories = Vec::with_capacity(self.draft.accessories.len());
        for entry in &self.draft.accessories {
            match self.catalog.accessory(&entry.accessory.id) {
                Some(accessory) => accessories.push(AccessorySelection {
                    accessory: accessory.clone(),
                    quantity: entry.quantity.max(accessory.minimum()),
                }),
                None => stale.push((
                    entry.accessory.name.clone(),
                    WizardError::UnknownAccessory(entry.accessory.id.clone()),
                )),
            }
        }

        self.draft.selections = selections;
        self.draft.accessories = accessories;
        stale
    }

    fn selectable_product(
        &self,
        key: CategoryKey,
        product_id: &ProductId,
    ) -> Result<&domain::Product, WizardError> {
        let product = self
            .catalog
            .product(product_id)
            .ok_or_else(|| WizardError::UnknownProduct(product_id.clone()))?;
        if !self.plan.is_active(key) {
            return Err(WizardError::InactiveCategory(key));
        }
        if let Some(menu) = self.draft.menu_id.as_ref().and_then(|id| self.catalog.menu(id)) {
            if !menu.offers(product_id) {
                return Err(WizardError::NotOffered {
                    product_id: product_id.clone(),
                    menu_id: menu.id.clone(),
                });
            }
        }
        Ok(product)
    }
}

/// Re-adds one selection to `store` under the catalog's record for its product.
fn rebind_selection(
    catalog: &Catalog,
    menu: Option<&Menu>,
    selection: &Selection,
    store: &mut SelectionStore,
) -> Result<(), WizardError> {
    let id = selection.product_id();
    let product = catalog
        .product(id)
        .ok_or_else(|| WizardError::UnknownProduct(id.clone()))?;
    if let Some(menu) = menu {
        if !menu.offers(id) {
            return Err(WizardError::NotOffered {
                product_id: id.clone(),
                menu_id: menu.id.clone(),
            });
        }
    }
    let key = product
        .primary_category()
        .ok_or_else(|| SelectionError::UnknownCategory {
            product_id: id.clone(),
            label: product.category.clone(),
        })?;
    store.add_or_replace(key, product, selection.quantity)?;
    Ok(())
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new(WizardConfig::default())
    }
}
