use notice_parser::calc::premium::{PremiumCalculator, PremiumRates};
use notice_parser::core::synonyms::CompiledSynonyms;
use notice_parser::extract_record;

fn rates() -> PremiumRates {
    PremiumRates { reference_year: Some(2024), ..PremiumRates::default() }
}

#[test]
fn rows_are_priced_from_the_health_column() {
    let xml = "<Notice><Items><Item><Name>山田太郎</Name><Health>300</Health></Item><Item><Name>鈴木花子</Name><Health>450千円</Health></Item></Items></Notice>";
    let record = extract_record(xml).unwrap();
    let rates = rates();
    let summary = PremiumCalculator::new(&rates, CompiledSynonyms::builtin())
        .calculate(&record)
        .unwrap();

    assert_eq!(summary.section, "Items");
    assert_eq!(summary.rows.len(), 2);
    assert_eq!(summary.rows[0].health_amount, 300);
    assert_eq!(summary.rows[1].health_amount, 450_000);
    assert_eq!(summary.rows[1].health, 44_910);
    assert_eq!(summary.rows[1].pension, 0);
    assert_eq!(summary.rows[1].care, 0);
    assert_eq!(summary.total_health, 29 + 44_910);
}

#[test]
fn pension_and_care_follow_columns_and_age_band() {
    let xml = "<決定通知書><一覧>\
        <被保険者><生年月日>S50.04.01</生年月日><健保標準報酬月額>300千円</健保標準報酬月額><厚年標準報酬月額>300千円</厚年標準報酬月額></被保険者>\
        <被保険者><生年月日>H10.01.01</生年月日><健保標準報酬月額>200千円</健保標準報酬月額><厚年標準報酬月額>200千円</厚年標準報酬月額></被保険者>\
        <被保険者><生年月日>不明</生年月日><健保標準報酬月額>abc</健保標準報酬月額></被保険者>\
        </一覧></決定通知書>";
    let record = extract_record(xml).unwrap();
    let rates = rates();
    let summary = PremiumCalculator::new(&rates, CompiledSynonyms::builtin())
        .calculate(&record)
        .unwrap();

    let first = &summary.rows[0];
    assert_eq!(first.age, Some(49));
    assert_eq!(first.health, 29_940);
    assert_eq!(first.pension, 54_900);
    assert_eq!(first.care, 4_800);
    assert_eq!(first.total, 89_640);
    assert_eq!(first.employee_share, 44_820);

    let second = &summary.rows[1];
    assert_eq!(second.age, Some(26));
    assert_eq!(second.care, 0);
    assert_eq!(second.pension, 36_600);

    let third = &summary.rows[2];
    assert_eq!(third.age, None);
    assert_eq!(third.total, 0);

    assert_eq!(summary.total, first.total + second.total);
}

#[test]
fn records_without_an_amount_table_have_no_premiums() {
    let record = extract_record("<R><L><I><Name>a</Name></I><I><Name>b</Name></I></L></R>").unwrap();
    let rates = rates();
    assert!(PremiumCalculator::new(&rates, CompiledSynonyms::builtin())
        .calculate(&record)
        .is_none());
}
