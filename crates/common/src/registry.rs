use crate::types::Frequency;

/// Static metadata for one logical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub freq: Frequency,
    pub unit: &'static str,
    /// Primary source hint, informational only. Actual source selection is
    /// the router's job.
    pub source: &'static str,
}

/// Registry of all logical series the system knows how to store.
pub const REGISTRY: &[SeriesSpec] = &[
    SeriesSpec {
        id: "USDARS_OFFICIAL",
        name: "USD/ARS official (wholesale reference)",
        freq: Frequency::Daily,
        unit: "ARS per USD",
        source: "BCRA",
    },
    SeriesSpec {
        id: "USDARS_PARALLEL",
        name: "USD/ARS parallel (blue)",
        freq: Frequency::Daily,
        unit: "ARS per USD",
        source: "BLUELYTICS",
    },
    SeriesSpec {
        id: "USDARS_OFFICIAL_BLUELYTICS",
        name: "USD/ARS official (Bluelytics mirror)",
        freq: Frequency::Daily,
        unit: "ARS per USD",
        source: "BLUELYTICS",
    },
    SeriesSpec {
        id: "RESERVES_USD",
        name: "BCRA international reserves",
        freq: Frequency::Daily,
        unit: "USD millions",
        source: "BCRA",
    },
    SeriesSpec {
        id: "CPI_HEADLINE",
        name: "CPI national headline index",
        freq: Frequency::Monthly,
        unit: "Index",
        source: "INDEC",
    },
    SeriesSpec {
        id: "CPI_CORE",
        name: "CPI national core index",
        freq: Frequency::Monthly,
        unit: "Index",
        source: "INDEC",
    },
    SeriesSpec {
        id: "EMBI_AR",
        name: "EMBI Argentina spread",
        freq: Frequency::Daily,
        unit: "Basis points",
        source: "LOCAL",
    },
    SeriesSpec {
        id: "CDS_ARG_5Y_USD",
        name: "Argentina 5Y USD CDS",
        freq: Frequency::Daily,
        unit: "Basis points",
        source: "LOCAL",
    },
    SeriesSpec {
        id: "NDF_1M",
        name: "USD/ARS NDF 1M forward",
        freq: Frequency::Daily,
        unit: "ARS per USD",
        source: "SYNTHETIC",
    },
    SeriesSpec {
        id: "NDF_3M",
        name: "USD/ARS NDF 3M forward",
        freq: Frequency::Daily,
        unit: "ARS per USD",
        source: "SYNTHETIC",
    },
    SeriesSpec {
        id: "NDF_6M",
        name: "USD/ARS NDF 6M forward",
        freq: Frequency::Daily,
        unit: "ARS per USD",
        source: "SYNTHETIC",
    },
    SeriesSpec {
        id: "NDF_12M",
        name: "USD/ARS NDF 12M forward",
        freq: Frequency::Daily,
        unit: "ARS per USD",
        source: "SYNTHETIC",
    },
    SeriesSpec {
        id: "POLICY_RATE",
        name: "BCRA policy rate (LELIQ)",
        freq: Frequency::Daily,
        unit: "Annualized percent",
        source: "BCRA",
    },
];

/// Look up a series spec by id.
pub fn series_spec(id: &str) -> Option<&'static SeriesSpec> {
    REGISTRY.iter().find(|s| s.id == id)
}
