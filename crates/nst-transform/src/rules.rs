//! Declarative extraction rule table.
//!
//! Each rule names one structural position in the specification and how it
//! becomes output field names: scalar subtotals carry a fixed synthetic
//! label, item arrays take the field name from each element's type code.
//! Topics select subsets of this table.

use std::fmt;

use nst_model::{Naeringsspesifikasjon, Post};
use rust_decimal::Decimal;

/// Stable identifier of an extraction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKey {
    // Income statement items
    Salgsinntekt,
    AnnenDriftsinntekt,
    Varekostnad,
    Loennskostnad,
    AnnenDriftskostnad,
    Finansinntekt,
    Finanskostnad,
    // Income statement sums
    SumDriftsinntekt,
    SumDriftskostnad,
    SumFinansinntekt,
    SumFinanskostnad,
    Aarsresultat,
    // Balance sheet sums
    SumBalanseverdiForAnleggsmiddel,
    SumBalanseverdiForOmloepsmiddel,
    SumLangsiktigGjeld,
    SumKortsiktigGjeld,
    SumEgenkapital,
    SumGjeldInnenBankOgForsikring,
    SumBalanseverdiForEiendel,
    SumGjeldOgEgenkapital,
    // Balance sheet items
    BalanseverdiForAnleggsmiddel,
    BalanseverdiForOmloepsmiddel,
    LangsiktigGjeld,
    KortsiktigGjeld,
    Egenkapital,
    GjeldInnenBankOgForsikring,
}

impl RuleKey {
    /// The rule registered under this key.
    pub fn rule(self) -> ExtractionRule {
        // RULES is declared in key order.
        RULES[self as usize]
    }
}

/// Where a rule takes its amounts from.
#[derive(Clone, Copy)]
pub enum Source {
    /// A pre-computed subtotal emitted under a fixed label.
    Scalar {
        label: &'static str,
        select: fn(&Naeringsspesifikasjon) -> Option<Decimal>,
    },
    /// An array of type-coded items; each type code becomes a field name.
    Items {
        select: fn(&Naeringsspesifikasjon) -> &[Post],
    },
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Scalar { label, .. } => f.debug_struct("Scalar").field("label", label).finish(),
            Source::Items { .. } => f.write_str("Items"),
        }
    }
}

/// One entry of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRule {
    pub key: RuleKey,
    /// Dotted source path, for diagnostics.
    pub path: &'static str,
    pub source: Source,
}

impl ExtractionRule {
    /// Non-null (field name, amount) pairs before zero filtering.
    pub fn extract(&self, spec: &Naeringsspesifikasjon) -> Vec<(String, Decimal)> {
        match self.source {
            Source::Scalar { label, select } => select(spec)
                .map(|amount| vec![(label.to_string(), amount)])
                .unwrap_or_default(),
            Source::Items { select } => select(spec)
                .iter()
                .filter_map(|post| Some((post.type_code.clone()?, post.beloep?)))
                .collect(),
        }
    }
}

const fn items(
    key: RuleKey,
    path: &'static str,
    select: fn(&Naeringsspesifikasjon) -> &[Post],
) -> ExtractionRule {
    ExtractionRule {
        key,
        path,
        source: Source::Items { select },
    }
}

const fn scalar(
    key: RuleKey,
    path: &'static str,
    label: &'static str,
    select: fn(&Naeringsspesifikasjon) -> Option<Decimal>,
) -> ExtractionRule {
    ExtractionRule {
        key,
        path,
        source: Source::Scalar { label, select },
    }
}

type N = Naeringsspesifikasjon;

/// The full rule table, in output order.
pub static RULES: &[ExtractionRule] = &[
    items(
        RuleKey::Salgsinntekt,
        "resultatregnskap.driftsinntekt.salgsinntekt.inntekt",
        N::salgsinntekt,
    ),
    items(
        RuleKey::AnnenDriftsinntekt,
        "resultatregnskap.driftsinntekt.annenDriftsinntekt.inntekt",
        N::annen_driftsinntekt,
    ),
    items(
        RuleKey::Varekostnad,
        "resultatregnskap.driftskostnad.varekostnad.kostnad",
        N::varekostnad,
    ),
    items(
        RuleKey::Loennskostnad,
        "resultatregnskap.driftskostnad.loennskostnad.kostnad",
        N::loennskostnad,
    ),
    items(
        RuleKey::AnnenDriftskostnad,
        "resultatregnskap.driftskostnad.annenDriftskostnad.kostnad",
        N::annen_driftskostnad,
    ),
    items(
        RuleKey::Finansinntekt,
        "resultatregnskap.finansinntekt.inntekt",
        N::finansinntekt,
    ),
    items(
        RuleKey::Finanskostnad,
        "resultatregnskap.finanskostnad.kostnad",
        N::finanskostnad,
    ),
    scalar(
        RuleKey::SumDriftsinntekt,
        "resultatregnskap.driftsinntekt.sumDriftsinntekt",
        "sumDriftsinntekt",
        N::sum_driftsinntekt,
    ),
    scalar(
        RuleKey::SumDriftskostnad,
        "resultatregnskap.driftskostnad.sumDriftskostnad",
        "sumDriftskostnad",
        N::sum_driftskostnad,
    ),
    scalar(
        RuleKey::SumFinansinntekt,
        "resultatregnskap.sumFinansinntekt",
        "sumFinansinntekt",
        N::sum_finansinntekt,
    ),
    scalar(
        RuleKey::SumFinanskostnad,
        "resultatregnskap.sumFinanskostnad",
        "sumFinanskostnad",
        N::sum_finanskostnad,
    ),
    scalar(
        RuleKey::Aarsresultat,
        "resultatregnskap.aarsresultat",
        "aarsresultat",
        N::aarsresultat,
    ),
    scalar(
        RuleKey::SumBalanseverdiForAnleggsmiddel,
        "balanseregnskap.anleggsmiddel.sumBalanseverdiForAnleggsmiddel",
        "sumBalanseverdiForAnleggsmiddel",
        N::sum_balanseverdi_for_anleggsmiddel,
    ),
    scalar(
        RuleKey::SumBalanseverdiForOmloepsmiddel,
        "balanseregnskap.omloepsmiddel.sumBalanseverdiForOmloepsmiddel",
        "sumBalanseverdiForOmloepsmiddel",
        N::sum_balanseverdi_for_omloepsmiddel,
    ),
    scalar(
        RuleKey::SumLangsiktigGjeld,
        "balanseregnskap.gjeldOgEgenkapital.sumLangsiktigGjeld",
        "sumLangsiktigGjeld",
        N::sum_langsiktig_gjeld,
    ),
    scalar(
        RuleKey::SumKortsiktigGjeld,
        "balanseregnskap.gjeldOgEgenkapital.sumKortsiktigGjeld",
        "sumKortsiktigGjeld",
        N::sum_kortsiktig_gjeld,
    ),
    scalar(
        RuleKey::SumEgenkapital,
        "balanseregnskap.gjeldOgEgenkapital.sumEgenkapital",
        "sumEgenkapital",
        N::sum_egenkapital,
    ),
    scalar(
        RuleKey::SumGjeldInnenBankOgForsikring,
        "balanseregnskap.gjeldOgEgenkapital.sumGjeldInnenBankOgForsikring",
        "sumGjeldInnenBankOgForsikring",
        N::sum_gjeld_innen_bank_og_forsikring,
    ),
    scalar(
        RuleKey::SumBalanseverdiForEiendel,
        "balanseregnskap.sumBalanseverdiForEiendel",
        "sumBalanseverdiForEiendel",
        N::sum_balanseverdi_for_eiendel,
    ),
    scalar(
        RuleKey::SumGjeldOgEgenkapital,
        "balanseregnskap.sumGjeldOgEgenkapital",
        "sumGjeldOgEgenkapital",
        N::sum_gjeld_og_egenkapital,
    ),
    items(
        RuleKey::BalanseverdiForAnleggsmiddel,
        "balanseregnskap.anleggsmiddel.balanseverdiForAnleggsmiddel.balanseverdi",
        N::balanseverdi_for_anleggsmiddel,
    ),
    items(
        RuleKey::BalanseverdiForOmloepsmiddel,
        "balanseregnskap.omloepsmiddel.balanseverdiForOmloepsmiddel.balanseverdi",
        N::balanseverdi_for_omloepsmiddel,
    ),
    items(
        RuleKey::LangsiktigGjeld,
        "balanseregnskap.gjeldOgEgenkapital.langsiktigGjeld.gjeld",
        N::langsiktig_gjeld,
    ),
    items(
        RuleKey::KortsiktigGjeld,
        "balanseregnskap.gjeldOgEgenkapital.kortsiktigGjeld.gjeld",
        N::kortsiktig_gjeld,
    ),
    items(
        RuleKey::Egenkapital,
        "balanseregnskap.gjeldOgEgenkapital.egenkapital.kapital",
        N::egenkapital,
    ),
    items(
        RuleKey::GjeldInnenBankOgForsikring,
        "balanseregnskap.gjeldOgEgenkapital.gjeldInnenBankOgForsikring.gjeld",
        N::gjeld_innen_bank_og_forsikring,
    ),
];
