//! Column names of the Parquet snapshots.

pub const ENTITY_ID: &str = "norskIdentifikator";
pub const FISCAL_YEAR: &str = "inntektsaar";
pub const FIELD_NAME: &str = "felt";
pub const AMOUNT: &str = "beloep";
pub const REGISTRATION_TIMESTAMP: &str = "registreringstidspunkt";
pub const SEQUENCE_NUMBER: &str = "sekvensnummer";

pub const ENTITY_TYPE: &str = "virksomhetstype";
pub const OBLIGATION_TYPE: &str = "regnskapspliktstype";
pub const START: &str = "start";
pub const END: &str = "slutt";

pub const ACCOUNT_ID: &str = "skogOgToemmerkontoId";
pub const OPERATING_UNIT: &str = "driftsenhet";
pub const FUND_ID: &str = "skogfondId";
pub const MUNICIPALITY: &str = "kommunenummer";

pub const RAW_HEADER: &str = "hendelse";
pub const RAW_SPECIFICATION: &str = "naeringsspesifikasjon";
pub const POSITION: &str = "posisjon";

/// Entity column of derived tables.
pub const ORGNR: &str = "orgnr";
