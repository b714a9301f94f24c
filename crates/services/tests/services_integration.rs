//! Integration tests for the in-memory collaborators working together.

use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveTime};
use domain::{
    Catalog, CategoryKey, Menu, MenuId, Money, OrderDraft, OrderPayload, PaymentMethod,
    PricingPolicy, Product, ServiceType, StepPlan, ValidationContext, assemble,
};
use services::{
    InMemoryCatalogService, InMemoryOrderGateway, InMemorySystemStatusService, OrderGateway,
    ServiceError, load_catalog, load_constraints,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn demo_catalog() -> Catalog {
    Catalog {
        menus: vec![Menu::new("bistro", "Bistro", Money::from_euros(32)).with_step("mains", 1)],
        products: vec![Product::new("ragout", "Ragout", "main", Money::from_cents(1400))],
        accessories: vec![],
    }
}

async fn payload() -> OrderPayload {
    let catalog = load_catalog(&InMemoryCatalogService::new(demo_catalog()))
        .await
        .unwrap();
    let constraints = load_constraints(&InMemorySystemStatusService::new())
        .await
        .unwrap();

    let mut draft = OrderDraft::new();
    draft.event.occasion = Some("anniversary".to_string());
    draft.event.service_type = Some(ServiceType::DropOff);
    draft.event.date = today().checked_add_days(Days::new(5));
    draft.event.time = NaiveTime::from_hms_opt(13, 0, 0);
    draft.event.guest_count = 15;
    draft.event.address.postal_code = "01067".to_string();
    draft.menu_id = Some(MenuId::new("bistro"));
    draft
        .selections
        .add_or_replace(CategoryKey::Main, &catalog.products[0], 1)
        .unwrap();
    draft.contact.first_name = "Hedy".to_string();
    draft.contact.last_name = "Lamarr".to_string();
    draft.contact.email = "hedy@example.com".to_string();
    draft.contact.phone = "0351 445566".to_string();
    draft.payment_method = Some(PaymentMethod::Paypal);
    draft.terms_accepted = true;

    let plan = StepPlan::build(catalog.menu(&MenuId::new("bistro")));
    let policy = PricingPolicy::default();
    let ctx = ValidationContext::new(&draft, &catalog, &plan, &constraints, &policy, today());
    assemble(&draft, &ctx).unwrap()
}

mod order_gateway {
    use super::*;

    #[tokio::test]
    async fn create_order_stores_payload() {
        let gateway = InMemoryOrderGateway::new();
        let payload = payload().await;

        let receipt = gateway.create_order(&payload).await.unwrap();
        assert_eq!(gateway.order_count(), 1);
        assert_eq!(gateway.order(receipt.id), Some(payload));
    }

    #[tokio::test]
    async fn rejected_order_is_not_stored() {
        let gateway = InMemoryOrderGateway::new();
        gateway.set_fail_on_create(true);

        let err = gateway.create_order(&payload().await).await.unwrap_err();
        assert!(matches!(err, ServiceError::Rejected { .. }));
        assert_eq!(gateway.order_count(), 0);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_the_receipt() {
        let gateway = InMemoryOrderGateway::new();
        gateway.set_latency(Some(Duration::from_secs(30)));
        let payload = payload().await;

        let result =
            tokio::time::timeout(Duration::from_secs(5), gateway.create_order(&payload)).await;
        assert!(result.is_err());
        assert_eq!(gateway.order_count(), 0);
    }
}
