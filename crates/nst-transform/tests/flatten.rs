//! End-to-end tests for deduplication, flattening and topic projection.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};
use nst_model::specification::{
    Balanseregnskap, BalanseverdiGruppe, Driftsinntekt, GjeldGruppe, GjeldOgEgenkapital,
    InntektGruppe, KapitalGruppe, KostnadGruppe, Resultatregnskap,
};
use nst_model::{AccountingEvent, Naeringsspesifikasjon, Post};
use nst_transform::{
    RULES, Topic, TopicKind, flatten_events, latest_per_entity_year, project,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn ts(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 18, hour, 0, 0).unwrap()
}

fn event(json: &str, hour: u32, position: usize) -> AccountingEvent {
    let spec = Naeringsspesifikasjon::from_json(json).expect("valid specification");
    AccountingEvent::new(spec, ts(hour), position as i64, position)
}

fn full_specification(entity: &str) -> String {
    format!(
        r#"{{
        "norskIdentifikator": "{entity}", "inntektsaar": 2023,
        "resultatregnskap": {{
            "driftsinntekt": {{
                "sumDriftsinntekt": 1500,
                "salgsinntekt": {{ "inntekt": [ {{ "type": "3000", "beloep": 1000 }} ] }},
                "annenDriftsinntekt": {{ "inntekt": [ {{ "type": "3600", "beloep": 500 }} ] }}
            }},
            "driftskostnad": {{
                "sumDriftskostnad": 700,
                "varekostnad": {{ "kostnad": [ {{ "type": "4005", "beloep": 300 }} ] }},
                "loennskostnad": {{ "kostnad": [ {{ "type": "5000", "beloep": 200 }} ] }},
                "annenDriftskostnad": {{ "kostnad": [ {{ "type": "6300", "beloep": 200 }} ] }}
            }},
            "finansinntekt": {{ "inntekt": [ {{ "type": "8050", "beloep": 10 }} ] }},
            "finanskostnad": {{ "kostnad": [ {{ "type": "8150", "beloep": 5 }} ] }},
            "sumFinansinntekt": 10, "sumFinanskostnad": 5, "aarsresultat": 805
        }},
        "balanseregnskap": {{
            "anleggsmiddel": {{
                "sumBalanseverdiForAnleggsmiddel": 100,
                "balanseverdiForAnleggsmiddel": {{ "balanseverdi": [ {{ "type": "1000", "beloep": 100 }} ] }}
            }},
            "omloepsmiddel": {{
                "sumBalanseverdiForOmloepsmiddel": 50,
                "balanseverdiForOmloepsmiddel": {{ "balanseverdi": [ {{ "type": "1920", "beloep": 50 }} ] }}
            }},
            "gjeldOgEgenkapital": {{
                "sumEgenkapital": 60, "sumLangsiktigGjeld": 40, "sumKortsiktigGjeld": 45,
                "sumGjeldInnenBankOgForsikring": 5,
                "egenkapital": {{ "kapital": [ {{ "type": "2000", "beloep": 60 }} ] }},
                "langsiktigGjeld": {{ "gjeld": [ {{ "type": "2220", "beloep": 40 }} ] }},
                "kortsiktigGjeld": {{ "gjeld": [ {{ "type": "2400", "beloep": 45 }} ] }},
                "gjeldInnenBankOgForsikring": {{ "gjeld": [ {{ "type": "2500", "beloep": 5 }} ] }}
            }},
            "sumBalanseverdiForEiendel": 150,
            "sumGjeldOgEgenkapital": 150
        }}
    }}"#
    )
}

#[test]
fn later_event_wins_for_same_entity_year() {
    let a = event(
        r#"{"norskIdentifikator":"X","inntektsaar":2023,
            "resultatregnskap":{"aarsresultat":1}}"#,
        9,
        0,
    );
    let b = event(
        r#"{"norskIdentifikator":"X","inntektsaar":2023,
            "resultatregnskap":{"aarsresultat":2}}"#,
        10,
        1,
    );
    let kept = latest_per_entity_year(vec![a, b]);
    let fields = flatten_events(&kept, RULES);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].amount, Decimal::new(2, 0));
    assert_eq!(fields[0].registration_timestamp, ts(10));
}

#[test]
fn zero_sales_line_is_dropped() {
    let events = vec![event(
        r#"{"norskIdentifikator":"X","inntektsaar":2023,
            "resultatregnskap":{"driftsinntekt":{"salgsinntekt":{"inntekt":[
                {"type":"3000","beloep":1000.0},{"type":"3100","beloep":0.0}]}}}}"#,
        9,
        0,
    )];
    let fields = project(&events, Topic::Driftsinntekt);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].field_name, "3000");
    assert_eq!(fields[0].amount, Decimal::new(1000, 0));
}

#[test]
fn null_balance_total_emits_nothing() {
    let events = vec![event(
        r#"{"norskIdentifikator":"X","inntektsaar":2023,
            "balanseregnskap":{"sumBalanseverdiForEiendel":null}}"#,
        9,
        0,
    )];
    assert!(project(&events, Topic::SumBalanseverdiForEiendel).is_empty());
    assert!(flatten_events(&events, RULES).is_empty());
}

#[test]
fn detail_topics_cover_full_flattener() {
    let events = latest_per_entity_year(vec![
        event(&full_specification("A"), 9, 0),
        event(&full_specification("B"), 9, 1),
    ]);
    let full: BTreeSet<(String, i32, String)> = flatten_events(&events, RULES)
        .into_iter()
        .map(|f| (f.entity_id, f.fiscal_year, f.field_name))
        .collect();

    let mut union = BTreeSet::new();
    let mut total = 0;
    for topic in Topic::detail_topics() {
        let fields = project(&events, topic);
        total += fields.len();
        union.extend(
            fields
                .into_iter()
                .map(|f| (f.entity_id, f.fiscal_year, f.field_name)),
        );
    }
    assert_eq!(union, full);
    assert_eq!(total, full.len());
    assert_eq!(full.len(), 2 * 26);
}

#[test]
fn composite_topics_duplicate_detail_fields() {
    let events = vec![event(&full_specification("A"), 9, 0)];
    let naering = project(&events, Topic::Naering);
    let names: BTreeSet<String> = naering.iter().map(|f| f.field_name.clone()).collect();
    assert!(names.contains("3000"));
    assert!(names.contains("sumEgenkapital"));
    assert!(!names.contains("sumGjeldInnenBankOgForsikring"));
    assert!(!names.contains("2000"));

    let balance = project(&events, Topic::Balanseregnskap);
    assert_eq!(balance.len(), Topic::Balanseregnskap.rule_keys().len());
    assert_eq!(Topic::Balanseregnskap.kind(), TopicKind::Composite);
}

#[test]
fn flattening_is_idempotent() {
    let events = vec![
        event(&full_specification("A"), 9, 0),
        event(&full_specification("B"), 11, 1),
    ];
    assert_eq!(flatten_events(&events, RULES), flatten_events(&events, RULES));
}

#[test]
fn topic_catalogue_order() {
    let prefixes: Vec<&str> = Topic::ALL.iter().map(|t| t.file_prefix()).collect();
    insta::assert_snapshot!(prefixes.join(","), @"naering,driftsinntekt,driftskostnad,finansinntekt,finanskostnad,sum_resultatregnskap,balanseregnskap,sum-balanseregnskap-anleggsmiddel,balanseverdi-anleggsmiddel,sum-balanseregnskap-omloepsmiddel,balanseverdi-omloepsmiddel,sum-langsiktig-gjeld,sum-kortsiktig-gjeld,sum-egenkapital,langsiktig-gjeld,kortsiktig-gjeld,egenkapital,sum-gjeld-innen-bank-og-forsikring,gjeld-innen-bank-og-forsikring,sum-balanseverdi-for-eiendel,sum-gjeld-og-egenkapital");
}

fn amount() -> impl Strategy<Value = Option<Decimal>> {
    prop_oneof![
        Just(None),
        Just(Some(Decimal::ZERO)),
        (-500i64..500, 0u32..3).prop_map(|(mantissa, scale)| Some(Decimal::new(mantissa, scale))),
    ]
}

fn posts() -> impl Strategy<Value = Vec<Post>> {
    prop::collection::vec(
        (prop::option::of(prop::sample::select(vec!["3000", "4005", "2000"])), amount()),
        0..4,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .map(|(code, beloep)| Post {
                type_code: code.map(str::to_string),
                beloep,
            })
            .collect()
    })
}

prop_compose! {
    fn specification()(
        salg in posts(),
        varer in posts(),
        anlegg in posts(),
        kapital in posts(),
        gjeld in posts(),
        sum_drift in amount(),
        resultat in amount(),
        eiendel in amount(),
    ) -> Naeringsspesifikasjon {
        Naeringsspesifikasjon {
            norsk_identifikator: Some("P".to_string()),
            inntektsaar: Some(2023),
            resultatregnskap: Some(Resultatregnskap {
                driftsinntekt: Some(Driftsinntekt {
                    sum_driftsinntekt: sum_drift,
                    salgsinntekt: Some(InntektGruppe { inntekt: salg }),
                    annen_driftsinntekt: None,
                }),
                driftskostnad: Some(nst_model::specification::Driftskostnad {
                    varekostnad: Some(KostnadGruppe { kostnad: varer }),
                    ..Default::default()
                }),
                aarsresultat: resultat,
                ..Default::default()
            }),
            balanseregnskap: Some(Balanseregnskap {
                anleggsmiddel: Some(nst_model::specification::Anleggsmiddel {
                    sum_balanseverdi_for_anleggsmiddel: None,
                    balanseverdi_for_anleggsmiddel: Some(BalanseverdiGruppe { balanseverdi: anlegg }),
                }),
                gjeld_og_egenkapital: Some(GjeldOgEgenkapital {
                    egenkapital: Some(KapitalGruppe { kapital }),
                    langsiktig_gjeld: Some(GjeldGruppe { gjeld }),
                    ..Default::default()
                }),
                sum_balanseverdi_for_eiendel: eiendel,
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

proptest! {
    #[test]
    fn never_emits_zero_or_null_amounts(spec in specification()) {
        let expected = RULES
            .iter()
            .flat_map(|rule| rule.extract(&spec))
            .filter(|(_, amount)| !amount.is_zero())
            .count();
        let events = vec![AccountingEvent::new(spec, ts(9), 1, 0)];
        let fields = flatten_events(&events, RULES);
        prop_assert_eq!(fields.len(), expected);
        for field in &fields {
            prop_assert!(!field.amount.is_zero());
        }
    }
}
