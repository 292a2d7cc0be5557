//! Topic catalogue.
//!
//! A topic is a named subset of the rule table written to its own snapshot.
//! Detail topics partition the table; composite topics repeat fields from
//! several detail topics for consumers that want one wide extract.

use std::fmt;
use std::str::FromStr;

use nst_model::{AccountingEvent, FlatField, NstError};

use crate::flatten::flatten_events;
use crate::rules::{ExtractionRule, RuleKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    /// Every rule belongs to exactly one detail topic.
    Detail,
    /// Intentional duplicates of detail fields.
    Composite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    Naering,
    Driftsinntekt,
    Driftskostnad,
    Finansinntekt,
    Finanskostnad,
    SumResultatregnskap,
    Balanseregnskap,
    SumAnleggsmiddel,
    BalanseverdiAnleggsmiddel,
    SumOmloepsmiddel,
    BalanseverdiOmloepsmiddel,
    SumLangsiktigGjeld,
    SumKortsiktigGjeld,
    SumEgenkapital,
    LangsiktigGjeld,
    KortsiktigGjeld,
    Egenkapital,
    SumGjeldInnenBankOgForsikring,
    GjeldInnenBankOgForsikring,
    SumBalanseverdiForEiendel,
    SumGjeldOgEgenkapital,
}

const INCOME_ITEMS: [RuleKey; 7] = [
    RuleKey::Salgsinntekt,
    RuleKey::AnnenDriftsinntekt,
    RuleKey::Varekostnad,
    RuleKey::Loennskostnad,
    RuleKey::AnnenDriftskostnad,
    RuleKey::Finansinntekt,
    RuleKey::Finanskostnad,
];

const INCOME_SUMS: [RuleKey; 5] = [
    RuleKey::SumDriftsinntekt,
    RuleKey::SumDriftskostnad,
    RuleKey::SumFinansinntekt,
    RuleKey::SumFinanskostnad,
    RuleKey::Aarsresultat,
];

const NAERING: [RuleKey; 19] = [
    INCOME_ITEMS[0],
    INCOME_ITEMS[1],
    INCOME_ITEMS[2],
    INCOME_ITEMS[3],
    INCOME_ITEMS[4],
    INCOME_ITEMS[5],
    INCOME_ITEMS[6],
    INCOME_SUMS[0],
    INCOME_SUMS[1],
    INCOME_SUMS[2],
    INCOME_SUMS[3],
    INCOME_SUMS[4],
    RuleKey::SumBalanseverdiForAnleggsmiddel,
    RuleKey::SumBalanseverdiForOmloepsmiddel,
    RuleKey::SumLangsiktigGjeld,
    RuleKey::SumKortsiktigGjeld,
    RuleKey::SumEgenkapital,
    RuleKey::SumBalanseverdiForEiendel,
    RuleKey::SumGjeldOgEgenkapital,
];

const BALANSEREGNSKAP: [RuleKey; 12] = [
    RuleKey::SumBalanseverdiForAnleggsmiddel,
    RuleKey::BalanseverdiForAnleggsmiddel,
    RuleKey::SumBalanseverdiForOmloepsmiddel,
    RuleKey::BalanseverdiForOmloepsmiddel,
    RuleKey::SumLangsiktigGjeld,
    RuleKey::SumKortsiktigGjeld,
    RuleKey::SumEgenkapital,
    RuleKey::LangsiktigGjeld,
    RuleKey::KortsiktigGjeld,
    RuleKey::Egenkapital,
    RuleKey::SumBalanseverdiForEiendel,
    RuleKey::SumGjeldOgEgenkapital,
];

impl Topic {
    /// Every topic, in run order.
    pub const ALL: [Topic; 21] = [
        Topic::Naering,
        Topic::Driftsinntekt,
        Topic::Driftskostnad,
        Topic::Finansinntekt,
        Topic::Finanskostnad,
        Topic::SumResultatregnskap,
        Topic::Balanseregnskap,
        Topic::SumAnleggsmiddel,
        Topic::BalanseverdiAnleggsmiddel,
        Topic::SumOmloepsmiddel,
        Topic::BalanseverdiOmloepsmiddel,
        Topic::SumLangsiktigGjeld,
        Topic::SumKortsiktigGjeld,
        Topic::SumEgenkapital,
        Topic::LangsiktigGjeld,
        Topic::KortsiktigGjeld,
        Topic::Egenkapital,
        Topic::SumGjeldInnenBankOgForsikring,
        Topic::GjeldInnenBankOgForsikring,
        Topic::SumBalanseverdiForEiendel,
        Topic::SumGjeldOgEgenkapital,
    ];

    /// File name prefix of the topic snapshot.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Topic::Naering => "naering",
            Topic::Driftsinntekt => "driftsinntekt",
            Topic::Driftskostnad => "driftskostnad",
            Topic::Finansinntekt => "finansinntekt",
            Topic::Finanskostnad => "finanskostnad",
            Topic::SumResultatregnskap => "sum_resultatregnskap",
            Topic::Balanseregnskap => "balanseregnskap",
            Topic::SumAnleggsmiddel => "sum-balanseregnskap-anleggsmiddel",
            Topic::BalanseverdiAnleggsmiddel => "balanseverdi-anleggsmiddel",
            Topic::SumOmloepsmiddel => "sum-balanseregnskap-omloepsmiddel",
            Topic::BalanseverdiOmloepsmiddel => "balanseverdi-omloepsmiddel",
            Topic::SumLangsiktigGjeld => "sum-langsiktig-gjeld",
            Topic::SumKortsiktigGjeld => "sum-kortsiktig-gjeld",
            Topic::SumEgenkapital => "sum-egenkapital",
            Topic::LangsiktigGjeld => "langsiktig-gjeld",
            Topic::KortsiktigGjeld => "kortsiktig-gjeld",
            Topic::Egenkapital => "egenkapital",
            Topic::SumGjeldInnenBankOgForsikring => "sum-gjeld-innen-bank-og-forsikring",
            Topic::GjeldInnenBankOgForsikring => "gjeld-innen-bank-og-forsikring",
            Topic::SumBalanseverdiForEiendel => "sum-balanseverdi-for-eiendel",
            Topic::SumGjeldOgEgenkapital => "sum-gjeld-og-egenkapital",
        }
    }

    pub fn kind(self) -> TopicKind {
        match self {
            Topic::Naering | Topic::Balanseregnskap => TopicKind::Composite,
            _ => TopicKind::Detail,
        }
    }

    /// Keys of the rules this topic selects, in output order.
    pub fn rule_keys(self) -> &'static [RuleKey] {
        match self {
            Topic::Naering => &NAERING,
            Topic::Balanseregnskap => &BALANSEREGNSKAP,
            Topic::Driftsinntekt => &[RuleKey::Salgsinntekt, RuleKey::AnnenDriftsinntekt],
            Topic::Driftskostnad => &[
                RuleKey::Varekostnad,
                RuleKey::Loennskostnad,
                RuleKey::AnnenDriftskostnad,
            ],
            Topic::Finansinntekt => &[RuleKey::Finansinntekt],
            Topic::Finanskostnad => &[RuleKey::Finanskostnad],
            Topic::SumResultatregnskap => &INCOME_SUMS,
            Topic::SumAnleggsmiddel => &[RuleKey::SumBalanseverdiForAnleggsmiddel],
            Topic::BalanseverdiAnleggsmiddel => &[RuleKey::BalanseverdiForAnleggsmiddel],
            Topic::SumOmloepsmiddel => &[RuleKey::SumBalanseverdiForOmloepsmiddel],
            Topic::BalanseverdiOmloepsmiddel => &[RuleKey::BalanseverdiForOmloepsmiddel],
            Topic::SumLangsiktigGjeld => &[RuleKey::SumLangsiktigGjeld],
            Topic::SumKortsiktigGjeld => &[RuleKey::SumKortsiktigGjeld],
            Topic::SumEgenkapital => &[RuleKey::SumEgenkapital],
            Topic::LangsiktigGjeld => &[RuleKey::LangsiktigGjeld],
            Topic::KortsiktigGjeld => &[RuleKey::KortsiktigGjeld],
            Topic::Egenkapital => &[RuleKey::Egenkapital],
            Topic::SumGjeldInnenBankOgForsikring => &[RuleKey::SumGjeldInnenBankOgForsikring],
            Topic::GjeldInnenBankOgForsikring => &[RuleKey::GjeldInnenBankOgForsikring],
            Topic::SumBalanseverdiForEiendel => &[RuleKey::SumBalanseverdiForEiendel],
            Topic::SumGjeldOgEgenkapital => &[RuleKey::SumGjeldOgEgenkapital],
        }
    }

    pub fn rules(self) -> Vec<ExtractionRule> {
        self.rule_keys().iter().map(|key| key.rule()).collect()
    }

    pub fn detail_topics() -> impl Iterator<Item = Topic> {
        Topic::ALL
            .into_iter()
            .filter(|topic| topic.kind() == TopicKind::Detail)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_prefix())
    }
}

impl FromStr for Topic {
    type Err = NstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Topic::ALL
            .into_iter()
            .find(|topic| topic.file_prefix().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| NstError::UnknownTopic(s.to_string()))
    }
}

/// Flatten a deduplicated event set restricted to one topic.
pub fn project(events: &[AccountingEvent], topic: Topic) -> Vec<FlatField> {
    flatten_events(events, &topic.rules())
}
