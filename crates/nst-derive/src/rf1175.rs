//! RF-1175 derivation tables.
//!
//! Each `O_*` variable is the sum of the amounts reported under its source
//! field names, signed per term.

use nst_transform::Topic;

use crate::table::{Derivation, DerivationTable, minus, plus};

macro_rules! copy {
    ($variable:literal, $code:literal) => {
        Derivation {
            variable: $variable,
            terms: &[plus($code)],
        }
    };
}

pub static SALGSINNTEKT: DerivationTable = DerivationTable {
    name: "salgsinntekt",
    source_topics: &[Topic::Driftsinntekt],
    derivations: &[
        copy!("O_7360", "3000"),
        copy!("O_7362", "3100"),
        copy!("O_7364", "3200"),
        copy!("O_15843", "3300"),
    ],
};

pub static ANNEN_DRIFTSINNTEKT: DerivationTable = DerivationTable {
    name: "annenDriftsinntekt",
    // 7911 is reported as a cost but folded into O_37279.
    source_topics: &[Topic::Driftsinntekt, Topic::Driftskostnad],
    derivations: &[
        copy!("O_7368", "3400"),
        copy!("O_39729", "3410"),
        copy!("O_7370", "3600"),
        copy!("O_17163", "3650"),
        copy!("O_32864", "3695"),
        copy!("O_7374", "3700"),
        copy!("O_737475", "3710"),
        copy!("O_13676", "3890"),
        copy!("O_7266", "3895"),
        copy!("O_7376", "3900"),
        Derivation {
            variable: "O_37279",
            terms: &[plus("3910"), plus("7911")],
        },
    ],
};

pub static VAREKOSTNAD: DerivationTable = DerivationTable {
    name: "varekostnad",
    source_topics: &[Topic::Driftskostnad],
    derivations: &[
        copy!("O_7378", "4005"),
        copy!("O_7380", "4295"),
        copy!("O_7382", "4500"),
        copy!("O_7384", "4995"),
    ],
};

pub static LOENNSKOSTNAD: DerivationTable = DerivationTable {
    name: "loennskostnad",
    source_topics: &[Topic::Driftskostnad],
    derivations: &[
        copy!("O_15844", "5000"),
        copy!("O_15845", "5300"),
        copy!("O_15846", "5400"),
        copy!("O_7392", "5420"),
        copy!("O_7396", "5900"),
        copy!("O_27426", "5950"),
    ],
};

pub static ANNEN_DRIFTSKOSTNAD: DerivationTable = DerivationTable {
    name: "annenDriftskostnad",
    source_topics: &[Topic::Driftskostnad],
    derivations: &[
        copy!("O_15847", "6000"),
        copy!("O_7400", "6100"),
        copy!("O_15848", "6200"),
        copy!("O_7404", "6300"),
        copy!("O_7408", "6340"),
        copy!("O_7406", "6395"),
        copy!("O_15849", "6400"),
        copy!("O_2812175", "6440"),
        copy!("O_15850", "6500"),
        copy!("O_7269", "6600"),
        copy!("O_15836", "6695"),
        copy!("O_7414", "6700"),
        copy!("O_7416", "6995"),
        copy!("O_3283675", "6998"),
        copy!("O_7418", "7000"),
        copy!("O_7422", "7020"),
        copy!("O_15851", "7040"),
        copy!("O_7273", "7080"),
        copy!("O_15801", "7099"),
        copy!("O_7424", "7155"),
        copy!("O_7426", "7165"),
        copy!("O_7428", "7295"),
        copy!("O_7275", "7330"),
        copy!("O_7277", "7350"),
        copy!("O_727975", "7400"),
        copy!("O_728075", "7420"),
        copy!("O_11334", "7500"),
        copy!("O_7430", "7565"),
        copy!("O_7432", "7600"),
        copy!("O_15837", "7700"),
        copy!("O_1202", "7890"),
        copy!("O_3405675", "7830"),
        copy!("O_3405875", "7860"),
        copy!("O_7283", "7897"),
        copy!("O_37281", "7910"),
        copy!("O_757911", "7911"),
    ],
};

pub static FINANSINNTEKT: DerivationTable = DerivationTable {
    name: "finansinntekt",
    source_topics: &[Topic::Finansinntekt],
    derivations: &[
        copy!("O_38885", "8005"),
        copy!("O_38887", "8050"),
        copy!("O_38888", "8074"),
        copy!("O_15852", "8060"),
        copy!("O_15853", "8079"),
        copy!("O_38889", "8090"),
        copy!("O_88888", "8091"),
    ],
};

pub static FINANSKOSTNAD: DerivationTable = DerivationTable {
    name: "finanskostnad",
    source_topics: &[Topic::Finanskostnad],
    derivations: &[
        copy!("O_758105", "8105"),
        copy!("O_38891", "8150"),
        copy!("O_15854", "8160"),
        copy!("O_38890", "8174"),
        copy!("O_7441", "8179"),
    ],
};

pub static BALANSEVERDI_FOR_ANLEGGSMIDDEL: DerivationTable = DerivationTable {
    name: "balanseverdiForAnleggsmiddel",
    source_topics: &[Topic::BalanseverdiAnleggsmiddel],
    derivations: &[
        copy!("O_7445", "1000"),
        copy!("O_2400", "1020"),
        copy!("O_7447", "1080"),
        copy!("O_15796", "1105"),
        copy!("O_15795", "1115"),
        copy!("O_36968", "1117"),
        copy!("O_32838", "1120"),
        copy!("O_7451", "1130"),
        copy!("O_7454", "1150"),
        copy!("O_7456", "1160"),
        copy!("O_15792", "1205"),
        copy!("O_15793", "1221"),
        copy!("O_15794", "1225"),
        copy!("O_15791", "1238"),
        copy!("O_37283", "1239"),
        copy!("O_15790", "1280"),
        copy!("O_26535", "1290"),
        copy!("O_7306", "1295"),
        copy!("O_15838", "1296"),
        copy!("O_37285", "1298"),
        copy!("O_38915", "1350"),
        Derivation {
            variable: "O_38916",
            terms: &[plus("1360"), plus("1350")],
        },
        copy!("O_38917", "1370"),
        copy!("O_38918", "1380"),
        copy!("O_38919", "1390"),
    ],
};

pub static BALANSEVERDI_FOR_OMLOEPSMIDDEL: DerivationTable = DerivationTable {
    name: "balanseverdiForOmloepsmiddel",
    source_topics: &[Topic::BalanseverdiOmloepsmiddel],
    derivations: &[
        copy!("O_1576875", "1400"),
        copy!("O_140175", "1401"),
        copy!("O_18116", "1500"),
        copy!("O_26537", "1530"),
        copy!("O_38924", "1565"),
        copy!("O_38925", "1570"),
        copy!("O_7471", "1780"),
        copy!("O_38927", "1800"),
        copy!("O_51810", "1810"),
        copy!("O_38928", "1830"),
        copy!("O_7474", "1880"),
        copy!("O_15789", "1895"),
        copy!("O_15812", "1900"),
        copy!("O_7477", "1920"),
        copy!("O_7315", "1950"),
    ],
};

pub static EGENKAPITAL: DerivationTable = DerivationTable {
    name: "Egenkapital",
    source_topics: &[Topic::Egenkapital],
    derivations: &[
        copy!("O_7479", "2015"),
        copy!("O_7481", "2050"),
        copy!("O_7483", "2080"),
        copy!("O_1471", "2095"),
        copy!("O_15839", "2096"),
        copy!("O_15803", "2097"),
        copy!("O_37287", "2098"),
        copy!("O_38936", "2000"),
    ],
};

pub static LANGSIKTIG_GJELD: DerivationTable = DerivationTable {
    name: "LangsiktigGjeld",
    source_topics: &[Topic::LangsiktigGjeld],
    derivations: &[
        copy!("O_7485", "2220"),
        copy!("O_7327", "2290"),
        Derivation {
            variable: "O_7487",
            terms: &[plus("2280"), plus("2289")],
        },
        copy!("O_38945", "2250"),
        copy!("O_38947", "2290"),
    ],
};

pub static KORTSIKTIG_GJELD: DerivationTable = DerivationTable {
    name: "KortsiktigGjeld",
    source_topics: &[Topic::KortsiktigGjeld],
    derivations: &[
        copy!("O_7489", "2380"),
        copy!("O_7491", "2400"),
        copy!("O_7493", "2600"),
        copy!("O_7495", "2740"),
        copy!("O_7497", "2770"),
        copy!("O_7499", "2790"),
        copy!("O_29065", "2800"),
        copy!("O_7501", "2900"),
        copy!("O_7503", "2910"),
        copy!("O_7505", "2949"),
        copy!("O_7507", "2950"),
        copy!("O_750975", "2990"),
    ],
};

pub static SUM_RESULTATREGNSKAP: DerivationTable = DerivationTable {
    name: "sum_resultatregnskap",
    source_topics: &[Topic::SumResultatregnskap],
    derivations: &[
        copy!("O_15799", "sumDriftsinntekt"),
        copy!("O_7286", "sumDriftskostnad"),
        Derivation {
            variable: "O_6686",
            terms: &[plus("sumDriftsinntekt"), minus("sumDriftskostnad")],
        },
        copy!("O_13962", "sumFinansinntekt"),
        copy!("O_13964", "sumFinanskostnad"),
        copy!("O_6675", "aarsresultat"),
    ],
};

pub static SUM_BALANSEREGNSKAP: DerivationTable = DerivationTable {
    name: "sum_balanseregnskap",
    source_topics: &[Topic::Balanseregnskap],
    derivations: &[
        copy!("O_15797", "sumBalanseverdiForEiendel"),
        copy!("O_75250", "sumEgenkapital"),
        copy!("O_38948", "sumLangsiktigGjeld"),
        copy!("O_38958", "sumKortsiktigGjeld"),
        copy!("O_7511", "sumGjeldOgEgenkapital"),
        copy!("O_38920", "sumBalanseverdiForAnleggsmiddel"),
        copy!("O_38934", "sumBalanseverdiForOmloepsmiddel"),
        Derivation {
            variable: "kontroll",
            terms: &[
                plus("sumBalanseverdiForEiendel"),
                minus("sumGjeldOgEgenkapital"),
            ],
        },
    ],
};

/// Every RF-1175 table, in run order.
pub static TABLES: [&DerivationTable; 14] = [
    &SALGSINNTEKT,
    &ANNEN_DRIFTSINNTEKT,
    &VAREKOSTNAD,
    &LOENNSKOSTNAD,
    &ANNEN_DRIFTSKOSTNAD,
    &FINANSINNTEKT,
    &FINANSKOSTNAD,
    &BALANSEVERDI_FOR_ANLEGGSMIDDEL,
    &BALANSEVERDI_FOR_OMLOEPSMIDDEL,
    &EGENKAPITAL,
    &LANGSIKTIG_GJELD,
    &KORTSIKTIG_GJELD,
    &SUM_RESULTATREGNSKAP,
    &SUM_BALANSEREGNSKAP,
];

/// Look a table up by name, ignoring case.
pub fn table_by_name(name: &str) -> Option<&'static DerivationTable> {
    TABLES
        .iter()
        .copied()
        .find(|table| table.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn variables_are_unique_per_table() {
        for table in TABLES {
            let vars: BTreeSet<&str> = table.variables().into_iter().collect();
            assert_eq!(vars.len(), table.derivations.len(), "{}", table.name);
        }
    }

    #[test]
    fn every_derivation_has_terms() {
        for table in TABLES {
            for derivation in table.derivations {
                assert!(!derivation.terms.is_empty(), "{}", derivation.variable);
            }
        }
    }

    #[test]
    fn finds_tables_by_name() {
        assert_eq!(table_by_name("egenkapital").map(|t| t.name), Some("Egenkapital"));
        assert!(table_by_name("fordeltBeregnetNaeringsinntekt").is_none());
    }
}
