use notice_parser::calc::premium::parse_amount;
use notice_parser::{extract_record, Parser, RecordBuilder, XmlTreeParser};

const SIMPLE: &str = "<Notice><Office>社名A</Office><Items><Item><Name>山田太郎</Name><Health>300</Health></Item><Item><Name>鈴木花子</Name><Health>450千円</Health></Item></Items></Notice>";

#[test]
fn end_to_end_items_become_one_table() {
    let record = extract_record(SIMPLE).unwrap();
    assert_eq!(record.title, "Notice");
    assert_eq!(record.sections.len(), 1);

    let section = &record.sections[0];
    assert_eq!(section.name, "Items");
    assert!(section.is_table);
    assert_eq!(section.headers, ["Name", "Health"]);
    assert_eq!(section.rows.len(), 2);
    assert_eq!(section.cell(0, "Name"), Some("山田太郎"));
    assert_eq!(section.cell(0, "Health"), Some("300"));
    assert_eq!(section.cell(1, "Name"), Some("鈴木花子"));
    assert_eq!(section.cell(1, "Health"), Some("450千円"));
    assert_eq!(section.rows[1].len(), 2);

    assert_eq!(section.cell(1, "Health").and_then(parse_amount), Some(450_000));
    assert_eq!(record.headers.get("Notice_Office").map(String::as_str), Some("社名A"));
    assert_eq!(record.fields.company_name.as_deref(), Some("社名A"));
    assert_eq!(record.fields.office_name, None);
}

#[test]
fn well_known_fields_across_vocabularies() {
    let xml = r#"<通知書>
      <鑑>
        <到達番号>201900000123</到達番号>
        <T002>100-0001</T002>
        <事業所所在地>東京都千代田区千代田1-1</事業所所在地>
        <事業所名称>株式会社サンプル</事業所名称>
        <宛名>代表取締役 山田一郎 様</宛名>
        <作成年月日>令和5年4月1日</作成年月日>
        <管轄年金事務所名>千代田年金事務所</管轄年金事務所名>
        <事業所整理記号>01-イロハ</事業所整理記号>
        <OfficeCode>12345</OfficeCode>
      </鑑>
    </通知書>"#;
    let record = extract_record(xml).unwrap();
    let f = &record.fields;
    assert_eq!(f.arrival_number.as_deref(), Some("201900000123"));
    assert_eq!(f.postal_code.as_deref(), Some("100-0001"));
    assert_eq!(f.address.as_deref(), Some("東京都千代田区千代田1-1"));
    assert_eq!(f.company_name.as_deref(), Some("株式会社サンプル"));
    assert_eq!(f.recipient_name.as_deref(), Some("代表取締役 山田一郎 様"));
    assert_eq!(f.creation_date.as_deref(), Some("令和5年4月1日"));
    assert_eq!(f.office_name.as_deref(), Some("千代田年金事務所"));

    let office: Vec<(&str, &str)> = record
        .office_info
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(office, [("事業所整理記号", "01-イロハ"), ("OfficeCode", "12345")]);

    // everything scalar also lands in headers
    assert_eq!(record.headers.len(), 9);
    assert!(record.sections.is_empty());
}

#[test]
fn later_address_overwrites_earlier_one() {
    let xml = "<R><Head><住所>A</住所></Head><Body><T003>B</T003></Body></R>";
    assert_eq!(extract_record(xml).unwrap().fields.address.as_deref(), Some("B"));
}

#[test]
fn empty_leaves_are_kept_in_rows_but_not_headers() {
    let xml = "<R><Memo></Memo><L><I><A></A><B>1</B></I><I><A>x</A></I></L></R>";
    let record = extract_record(xml).unwrap();
    assert!(!record.headers.contains_key("R_Memo"));
    let section = &record.sections[0];
    assert_eq!(section.cell(0, "A"), Some(""));
    assert_eq!(section.cell(1, "B"), None);
    assert_eq!(section.headers, ["A", "B"]);
}

#[test]
fn nested_tables_and_prefixes() {
    let xml = "<R><G><被保険者><氏名>a</氏名><報酬><健保>300</健保><厚年>300</厚年></報酬></被保険者><被保険者><氏名>b</氏名><報酬><健保>410</健保></報酬></被保険者></G></R>";
    let record = extract_record(xml).unwrap();
    assert_eq!(record.sections[0].name, "G");
    assert_eq!(record.sections[0].headers, ["氏名", "報酬_健保", "報酬_厚年"]);
}

#[test]
fn unknown_shapes_never_fail() {
    for xml in ["<A/>", "<A>text</A>", "<A><B><C><D>deep</D></C></B></A>", "<A><B/><B/></A>"] {
        let record = extract_record(xml).unwrap();
        assert_eq!(record.title, "A");
    }
    let repeated_empty = extract_record("<A><B/><B/></A>").unwrap();
    assert_eq!(repeated_empty.sections[0].rows.len(), 2);
    assert_eq!(repeated_empty.sections[0].cell(0, "B"), Some(""));
}

#[test]
fn builder_on_prebuilt_tree_matches_text_path() {
    let tree = XmlTreeParser.parse(SIMPLE).unwrap();
    assert_eq!(RecordBuilder::default().build(&tree), extract_record(SIMPLE).unwrap());
}

#[test]
fn record_serializes_with_camel_case_keys() {
    let record = extract_record("<R><事業所名称>S</事業所名称><L><I>1</I><I>2</I></L></R>").unwrap();
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["companyName"], "S");
    assert_eq!(value["sections"][0]["isTable"], true);
    assert!(value.get("officeInfo").is_some());
    assert!(value.get("address").is_none());
}

#[test]
fn prefixed_tags_match_like_their_local_names() {
    let xml = r#"<N:R xmlns:N="urn:n"><N:T003>A</N:T003><N:年金事務所名>X</N:年金事務所名><N:OfficeCode>9</N:OfficeCode></N:R>"#;
    let record = extract_record(xml).unwrap();
    assert_eq!(record.fields.address.as_deref(), Some("A"));
    assert_eq!(record.fields.office_name.as_deref(), Some("X"));
    // keys keep the qualified tag name
    assert_eq!(record.office_info.get("N:OfficeCode").map(String::as_str), Some("9"));
    assert_eq!(record.headers.get("N:R_N:T003").map(String::as_str), Some("A"));
}
