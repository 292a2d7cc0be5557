//! Typed model of the næringsspesifikasjon document.
//!
//! Every group is optional and every leaf array is a sequence of [`Post`]
//! values, so extraction rules can be written as plain accessor functions
//! instead of runtime path lookups. Field names follow the reporting schema
//! (camelCase JSON keys, Norwegian vocabulary).

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::{opt_string, opt_year, value_to_string, vec_or_null};
use crate::error::Result;

/// One leaf item: a type code and an amount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "type", default, deserialize_with = "opt_string")]
    pub type_code: Option<String>,
    #[serde(default)]
    pub beloep: Option<Decimal>,
}

impl Post {
    pub fn new(type_code: impl Into<String>, beloep: Decimal) -> Self {
        Self {
            type_code: Some(type_code.into()),
            beloep: Some(beloep),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InntektGruppe {
    #[serde(default, deserialize_with = "vec_or_null")]
    pub inntekt: Vec<Post>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KostnadGruppe {
    #[serde(default, deserialize_with = "vec_or_null")]
    pub kostnad: Vec<Post>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanseverdiGruppe {
    #[serde(default, deserialize_with = "vec_or_null")]
    pub balanseverdi: Vec<Post>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GjeldGruppe {
    #[serde(default, deserialize_with = "vec_or_null")]
    pub gjeld: Vec<Post>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KapitalGruppe {
    #[serde(default, deserialize_with = "vec_or_null")]
    pub kapital: Vec<Post>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Driftsinntekt {
    pub sum_driftsinntekt: Option<Decimal>,
    pub salgsinntekt: Option<InntektGruppe>,
    pub annen_driftsinntekt: Option<InntektGruppe>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Driftskostnad {
    pub sum_driftskostnad: Option<Decimal>,
    pub varekostnad: Option<KostnadGruppe>,
    pub loennskostnad: Option<KostnadGruppe>,
    pub annen_driftskostnad: Option<KostnadGruppe>,
}

/// Income statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resultatregnskap {
    pub driftsinntekt: Option<Driftsinntekt>,
    pub driftskostnad: Option<Driftskostnad>,
    pub finansinntekt: Option<InntektGruppe>,
    pub finanskostnad: Option<KostnadGruppe>,
    pub sum_finansinntekt: Option<Decimal>,
    pub sum_finanskostnad: Option<Decimal>,
    pub aarsresultat: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Anleggsmiddel {
    pub sum_balanseverdi_for_anleggsmiddel: Option<Decimal>,
    pub balanseverdi_for_anleggsmiddel: Option<BalanseverdiGruppe>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Omloepsmiddel {
    pub sum_balanseverdi_for_omloepsmiddel: Option<Decimal>,
    pub balanseverdi_for_omloepsmiddel: Option<BalanseverdiGruppe>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GjeldOgEgenkapital {
    pub sum_egenkapital: Option<Decimal>,
    pub sum_langsiktig_gjeld: Option<Decimal>,
    pub sum_kortsiktig_gjeld: Option<Decimal>,
    pub sum_gjeld_innen_bank_og_forsikring: Option<Decimal>,
    pub egenkapital: Option<KapitalGruppe>,
    pub langsiktig_gjeld: Option<GjeldGruppe>,
    pub kortsiktig_gjeld: Option<GjeldGruppe>,
    pub gjeld_innen_bank_og_forsikring: Option<GjeldGruppe>,
}

/// Balance sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Balanseregnskap {
    pub anleggsmiddel: Option<Anleggsmiddel>,
    pub omloepsmiddel: Option<Omloepsmiddel>,
    pub gjeld_og_egenkapital: Option<GjeldOgEgenkapital>,
    pub sum_balanseverdi_for_eiendel: Option<Decimal>,
    pub sum_gjeld_og_egenkapital: Option<Decimal>,
}

/// A forestry fund attached to a forestry account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skogfond {
    #[serde(default, deserialize_with = "opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub kommunenummer: Option<String>,
    /// Remaining columns; numeric ones are amounts.
    #[serde(flatten)]
    pub columns: BTreeMap<String, Value>,
}

impl Skogfond {
    /// Numeric columns as (name, amount), in column-name order.
    pub fn amounts(&self) -> Vec<(&str, Decimal)> {
        numeric_columns(&self.columns)
    }
}

/// Forestry and timber account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkogOgToemmerkonto {
    #[serde(default, deserialize_with = "opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub driftsenhet: Option<Value>,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub skogfond: Vec<Skogfond>,
    /// Remaining columns; numeric ones are amounts.
    #[serde(flatten)]
    pub columns: BTreeMap<String, Value>,
}

impl SkogOgToemmerkonto {
    pub fn amounts(&self) -> Vec<(&str, Decimal)> {
        numeric_columns(&self.columns)
    }

    /// Operating unit rendered as text, whatever its JSON shape.
    pub fn driftsenhet_label(&self) -> Option<String> {
        match self.driftsenhet.as_ref()? {
            Value::Null => None,
            value @ (Value::Object(_) | Value::Array(_)) => Some(value.to_string()),
            scalar => value_to_string(scalar),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Skogbruk {
    #[serde(deserialize_with = "vec_or_null")]
    pub skog_og_toemmerkonto: Vec<SkogOgToemmerkonto>,
}

/// Entity classification carried on the specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Virksomhet {
    #[serde(default, deserialize_with = "opt_string")]
    pub virksomhetstype: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub regnskapspliktstype: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub slutt: Option<String>,
}

/// The business specification body of an accounting event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Naeringsspesifikasjon {
    #[serde(default, deserialize_with = "opt_string")]
    pub norsk_identifikator: Option<String>,
    #[serde(default, deserialize_with = "opt_year")]
    pub inntektsaar: Option<i32>,
    #[serde(default)]
    pub virksomhet: Option<Virksomhet>,
    #[serde(default)]
    pub resultatregnskap: Option<Resultatregnskap>,
    #[serde(default)]
    pub balanseregnskap: Option<Balanseregnskap>,
    #[serde(default)]
    pub skogbruk: Option<Skogbruk>,
}

impl Naeringsspesifikasjon {
    /// Decode a specification from its embedded JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    fn driftsinntekt(&self) -> Option<&Driftsinntekt> {
        self.resultatregnskap.as_ref()?.driftsinntekt.as_ref()
    }

    fn driftskostnad(&self) -> Option<&Driftskostnad> {
        self.resultatregnskap.as_ref()?.driftskostnad.as_ref()
    }

    fn anleggsmiddel(&self) -> Option<&Anleggsmiddel> {
        self.balanseregnskap.as_ref()?.anleggsmiddel.as_ref()
    }

    fn omloepsmiddel(&self) -> Option<&Omloepsmiddel> {
        self.balanseregnskap.as_ref()?.omloepsmiddel.as_ref()
    }

    fn gjeld_og_egenkapital(&self) -> Option<&GjeldOgEgenkapital> {
        self.balanseregnskap.as_ref()?.gjeld_og_egenkapital.as_ref()
    }

    // Income statement items.

    pub fn salgsinntekt(&self) -> &[Post] {
        inntekt(self.driftsinntekt().and_then(|d| d.salgsinntekt.as_ref()))
    }

    pub fn annen_driftsinntekt(&self) -> &[Post] {
        inntekt(self.driftsinntekt().and_then(|d| d.annen_driftsinntekt.as_ref()))
    }

    pub fn varekostnad(&self) -> &[Post] {
        kostnad(self.driftskostnad().and_then(|d| d.varekostnad.as_ref()))
    }

    pub fn loennskostnad(&self) -> &[Post] {
        kostnad(self.driftskostnad().and_then(|d| d.loennskostnad.as_ref()))
    }

    pub fn annen_driftskostnad(&self) -> &[Post] {
        kostnad(self.driftskostnad().and_then(|d| d.annen_driftskostnad.as_ref()))
    }

    pub fn finansinntekt(&self) -> &[Post] {
        inntekt(
            self.resultatregnskap
                .as_ref()
                .and_then(|r| r.finansinntekt.as_ref()),
        )
    }

    pub fn finanskostnad(&self) -> &[Post] {
        kostnad(
            self.resultatregnskap
                .as_ref()
                .and_then(|r| r.finanskostnad.as_ref()),
        )
    }

    // Income statement subtotals.

    pub fn sum_driftsinntekt(&self) -> Option<Decimal> {
        self.driftsinntekt()?.sum_driftsinntekt
    }

    pub fn sum_driftskostnad(&self) -> Option<Decimal> {
        self.driftskostnad()?.sum_driftskostnad
    }

    pub fn sum_finansinntekt(&self) -> Option<Decimal> {
        self.resultatregnskap.as_ref()?.sum_finansinntekt
    }

    pub fn sum_finanskostnad(&self) -> Option<Decimal> {
        self.resultatregnskap.as_ref()?.sum_finanskostnad
    }

    pub fn aarsresultat(&self) -> Option<Decimal> {
        self.resultatregnskap.as_ref()?.aarsresultat
    }

    // Balance sheet subtotals.

    pub fn sum_balanseverdi_for_anleggsmiddel(&self) -> Option<Decimal> {
        self.anleggsmiddel()?.sum_balanseverdi_for_anleggsmiddel
    }

    pub fn sum_balanseverdi_for_omloepsmiddel(&self) -> Option<Decimal> {
        self.omloepsmiddel()?.sum_balanseverdi_for_omloepsmiddel
    }

    pub fn sum_langsiktig_gjeld(&self) -> Option<Decimal> {
        self.gjeld_og_egenkapital()?.sum_langsiktig_gjeld
    }

    pub fn sum_kortsiktig_gjeld(&self) -> Option<Decimal> {
        self.gjeld_og_egenkapital()?.sum_kortsiktig_gjeld
    }

    pub fn sum_egenkapital(&self) -> Option<Decimal> {
        self.gjeld_og_egenkapital()?.sum_egenkapital
    }

    pub fn sum_gjeld_innen_bank_og_forsikring(&self) -> Option<Decimal> {
        self.gjeld_og_egenkapital()?
            .sum_gjeld_innen_bank_og_forsikring
    }

    pub fn sum_balanseverdi_for_eiendel(&self) -> Option<Decimal> {
        self.balanseregnskap.as_ref()?.sum_balanseverdi_for_eiendel
    }

    pub fn sum_gjeld_og_egenkapital(&self) -> Option<Decimal> {
        self.balanseregnskap.as_ref()?.sum_gjeld_og_egenkapital
    }

    // Balance sheet items.

    pub fn balanseverdi_for_anleggsmiddel(&self) -> &[Post] {
        balanseverdi(
            self.anleggsmiddel()
                .and_then(|a| a.balanseverdi_for_anleggsmiddel.as_ref()),
        )
    }

    pub fn balanseverdi_for_omloepsmiddel(&self) -> &[Post] {
        balanseverdi(
            self.omloepsmiddel()
                .and_then(|o| o.balanseverdi_for_omloepsmiddel.as_ref()),
        )
    }

    pub fn langsiktig_gjeld(&self) -> &[Post] {
        gjeld(
            self.gjeld_og_egenkapital()
                .and_then(|g| g.langsiktig_gjeld.as_ref()),
        )
    }

    pub fn kortsiktig_gjeld(&self) -> &[Post] {
        gjeld(
            self.gjeld_og_egenkapital()
                .and_then(|g| g.kortsiktig_gjeld.as_ref()),
        )
    }

    pub fn gjeld_innen_bank_og_forsikring(&self) -> &[Post] {
        gjeld(
            self.gjeld_og_egenkapital()
                .and_then(|g| g.gjeld_innen_bank_og_forsikring.as_ref()),
        )
    }

    pub fn egenkapital(&self) -> &[Post] {
        self.gjeld_og_egenkapital()
            .and_then(|g| g.egenkapital.as_ref())
            .map(|k| k.kapital.as_slice())
            .unwrap_or_default()
    }

    // Forestry.

    pub fn skog_og_toemmerkonto(&self) -> &[SkogOgToemmerkonto] {
        self.skogbruk
            .as_ref()
            .map(|s| s.skog_og_toemmerkonto.as_slice())
            .unwrap_or_default()
    }
}

fn inntekt(group: Option<&InntektGruppe>) -> &[Post] {
    group.map(|g| g.inntekt.as_slice()).unwrap_or_default()
}

fn kostnad(group: Option<&KostnadGruppe>) -> &[Post] {
    group.map(|g| g.kostnad.as_slice()).unwrap_or_default()
}

fn balanseverdi(group: Option<&BalanseverdiGruppe>) -> &[Post] {
    group.map(|g| g.balanseverdi.as_slice()).unwrap_or_default()
}

fn gjeld(group: Option<&GjeldGruppe>) -> &[Post] {
    group.map(|g| g.gjeld.as_slice()).unwrap_or_default()
}

fn numeric_columns(columns: &BTreeMap<String, Value>) -> Vec<(&str, Decimal)> {
    columns
        .iter()
        .filter_map(|(name, value)| json_decimal(value).map(|amount| (name.as_str(), amount)))
        .collect()
}

/// Exact decimal for a JSON number; `None` for anything else.
pub fn json_decimal(value: &Value) -> Option<Decimal> {
    let Value::Number(number) = value else {
        return None;
    };
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
