//! Integration tests for building and exporting a proposal

use encoding_rs::GBK;
use rust_decimal::Decimal;
use testresult::TestResult;

use hamper::{
    products::ProductId,
    report::BOM,
    store::{Store, StoreError},
    tiers::TierSettings,
};

const SUPPLIER_SHEET: &str = "编号,名称,规格,单位,成本价,渠道价,零售价,图片,分类\r\n\
                              A1,禅意茶具,一壶四杯,套,200,299,600,https://x/a.png,茶具\r\n\
                              A2,桂花月饼,六枚装,盒,40,60,¥100.00,,食品\r\n";

fn imported_ids(store: &Store, count: usize) -> Vec<ProductId> {
    store
        .catalog()
        .iter()
        .take(count)
        .map(|p| p.id.clone())
        .collect()
}

#[test]
fn gbk_sheet_to_exported_report() -> TestResult {
    let (bytes, _, _) = GBK.encode(SUPPLIER_SHEET);

    let mut store = Store::new();
    assert_eq!(store.import_csv(&bytes)?, 2);

    let set = store.create_gift_set("中秋")?.id.clone();
    let tier = store.add_tier(&set, TierSettings::default())?;

    for id in imported_ids(&store, 2) {
        store.select_product(&set, &tier, &id)?;
    }

    let breakdown = store.breakdown(&set, &tier)?;

    assert_eq!(breakdown.product_discounted_price, Decimal::from(560));
    assert_eq!(breakdown.final_unit_selling_price, Decimal::new(6413, 1));
    assert!(breakdown.is_over_budget);
    assert_eq!(breakdown.budget_deviation, Decimal::from(60));

    let report = store.export(&set)?;
    let lines: Vec<&str> = report.lines().collect();

    assert!(report.starts_with(BOM));
    assert_eq!(
        lines.get(1..),
        Some(
            [
                "中秋,500,80%,100,禅意茶具,A1,一壶四杯,套,600,480.00,200,https://x/a.png,45.00,36.30,641.30,64130.00",
                ",,,,桂花月饼,A2,六枚装,盒,100,80.00,40,,,,,",
            ]
            .as_slice()
        )
    );

    Ok(())
}

#[test]
fn deleting_a_product_reprices_every_tier() -> TestResult {
    let mut store = Store::new();
    store.import_csv(SUPPLIER_SHEET.as_bytes())?;

    let set = store.create_gift_set("中秋")?.id.clone();
    let ids = imported_ids(&store, 2);

    let small = store.add_tier(&set, TierSettings::default())?;
    let large = store.add_tier(
        &set,
        TierSettings {
            target_tier_price: Decimal::from(800),
            ..TierSettings::default()
        },
    )?;

    for tier in [&small, &large] {
        for id in &ids {
            store.select_product(&set, tier, id)?;
        }
    }

    let tea_set = ids.first().ok_or("no imported products")?;
    store.remove_product(tea_set)?;

    for tier in [&small, &large] {
        let breakdown = store.breakdown(&set, tier)?;

        assert_eq!(breakdown.total_retail, Decimal::from(100));
        assert_eq!(breakdown.dangling_count, 1);
    }

    let report = store.export(&set)?;
    assert!(!report.contains("禅意茶具"));

    Ok(())
}

#[test]
fn rejected_import_keeps_catalog() {
    let mut store = Store::new();
    let before = store.catalog().clone();

    let result = store.import_csv("编号,名称\r\n\r\n".as_bytes());

    assert!(matches!(result, Err(StoreError::Import(_))));
    assert_eq!(store.catalog(), &before);
}
