use chrono::{NaiveDate, NaiveTime};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Catalog, Menu, MenuId, Money, OrderDraft, PricingInput, PricingPolicy, Product,
    ServiceType, StepPlan, SystemConstraints, ValidationContext, navigate, quote, step_statuses,
};

const CORE: [&str; 5] = ["starter", "main", "side", "dessert", "beverage"];

fn large_catalog() -> Catalog {
    let mut menu = Menu::new("gala", "Gala", Money::from_euros(45)).with_min_guests(20);
    for label in CORE {
        menu = menu.with_step(label, 2);
    }
    menu = menu.with_step("vegetarian", 1);

    let mut products = Vec::new();
    for label in CORE {
        for n in 0..40 {
            let mut product = Product::new(
                format!("{label}-{n}"),
                format!("{label} {n}"),
                label,
                Money::from_cents(300 + 25 * n),
            );
            if n % 7 == 0 {
                product = product.with_tags(["vegetarian"]);
            }
            products.push(product);
        }
    }

    Catalog {
        menus: vec![menu],
        products,
        accessories: vec![],
    }
}

fn full_draft(catalog: &Catalog) -> OrderDraft {
    let mut draft = OrderDraft::new();
    draft.event.occasion = Some("gala".to_string());
    draft.event.service_type = Some(ServiceType::FullService);
    draft.event.date = NaiveDate::from_ymd_opt(2026, 12, 1);
    draft.event.time = NaiveTime::from_hms_opt(19, 0, 0);
    draft.event.guest_count = 150;
    draft.event.address.postal_code = "10117".to_string();
    draft.menu_id = Some(MenuId::new("gala"));
    for product in catalog.products.iter().step_by(3) {
        if let Some(key) = product.primary_category() {
            draft
                .selections
                .add_or_replace(key, product, 2)
                .expect("generated products are valid");
        }
    }
    draft
}

fn bench_step_plan(c: &mut Criterion) {
    let catalog = large_catalog();
    let menu = catalog.menus.first();

    c.bench_function("pricing/build_step_plan", |b| {
        b.iter(|| StepPlan::build(menu));
    });
}

fn bench_quote(c: &mut Criterion) {
    let catalog = large_catalog();
    let draft = full_draft(&catalog);
    let menu = catalog.menus.first();
    let plan = StepPlan::build(menu);
    let policy = PricingPolicy::default();

    c.bench_function("pricing/quote_full_draft", |b| {
        b.iter(|| quote(&PricingInput::from_draft(&draft, menu, &plan), &policy));
    });
}

fn bench_validation(c: &mut Criterion) {
    let catalog = large_catalog();
    let draft = full_draft(&catalog);
    let plan = StepPlan::build(catalog.menus.first());
    let constraints = SystemConstraints::default();
    let policy = PricingPolicy::default();
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");

    c.bench_function("pricing/step_statuses", |b| {
        b.iter(|| {
            let ctx = ValidationContext::new(&draft, &catalog, &plan, &constraints, &policy, today);
            step_statuses(&ctx)
        });
    });

    c.bench_function("pricing/navigate_to_checkout", |b| {
        b.iter(|| {
            let ctx = ValidationContext::new(&draft, &catalog, &plan, &constraints, &policy, today);
            navigate(&ctx, 0, plan.checkout_index())
        });
    });
}

criterion_group!(benches, bench_step_plan, bench_quote, bench_validation);
criterion_main!(benches);
